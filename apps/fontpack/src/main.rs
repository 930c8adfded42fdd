//! `fontpack [--config FILE] [--resources DIR] ATLAS_DIR CACHE_DIR`
//!
//! Runs one pipeline pass and prints the addon path. With `--resources`,
//! the stock E0/E1 atlases are read from DIR when the atlas or cache
//! directory has to be created.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glyph_pack::{
    DirResources, GlyphPackError, MemoryResources, PackResult, PipelineConfig,
    PipelineConfigBuilder, RecordingSink, ResourceReader, run,
};

const USAGE: &str = "usage: fontpack [--config FILE] [--resources DIR] ATLAS_DIR CACHE_DIR";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    resources: Option<PathBuf>,
    atlas_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config = Some(args.next().ok_or("--config needs a file")?.into());
            }
            "--resources" => {
                parsed.resources = Some(args.next().ok_or("--resources needs a directory")?.into());
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let mut positional = positional.into_iter();
    parsed.atlas_dir = positional.next();
    parsed.cache_dir = positional.next();
    if positional.next().is_some() {
        return Err("too many arguments".to_string());
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> PackResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None if args.resources.is_some() => {
            let defaults = PipelineConfig::default();
            PipelineConfigBuilder::new(defaults.atlas_dir, defaults.cache_dir)
                .with_bundled_defaults()?
                .build()?
        }
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.atlas_dir {
        config.atlas_dir = dir.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn execute(args: &Args) -> PackResult<()> {
    let config = load_config(args)?;
    let resources: Box<dyn ResourceReader> = match &args.resources {
        Some(dir) => Box::new(DirResources::new(dir)),
        None => Box::new(MemoryResources::new()),
    };

    let mut sink = RecordingSink::new();
    let report = run(&config, resources.as_ref(), &mut sink)?;

    for failure in &report.failures {
        log::warn!(
            "Skipped {} during {}: {}",
            failure.path.display(),
            failure.stage,
            failure.error
        );
    }

    match report.archive_path() {
        Some(path) => println!("{}", path.display()),
        None if report.matched_default => println!("glyph groups match the default addon"),
        None => println!("no glyph groups in {}", config.atlas_dir.display()),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("fontpack failed ({}): {}", error.category(), error);
            report_hint(&error, args.config.as_deref());
            ExitCode::FAILURE
        }
    }
}

fn report_hint(error: &GlyphPackError, config: Option<&Path>) {
    match error {
        GlyphPackError::Resource { .. } => {
            eprintln!("hint: pass --resources DIR containing the bundled glyph_E0.png/glyph_E1.png")
        }
        GlyphPackError::Config(_) if config.is_some() => {
            eprintln!("hint: check the JSON in the --config file")
        }
        _ => {}
    }
}
