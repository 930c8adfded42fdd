pub mod conversions;
pub mod types;

pub use types::{ErrorSeverity, GlyphPackError, PackResult};
