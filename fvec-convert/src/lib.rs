pub mod convert;
pub mod render;

pub use convert::{convert, convert_file, ConversionSummary, ConvertError};
