//! Reading and writing of texmex/SIFT `fvecs` files.
//!
//! Every record is a little-endian `i32` dimension followed by that many
//! little-endian `f32` components. All records in a file share the same
//! dimension.

pub mod error;
pub mod file;
pub mod loader;
pub mod writer;

pub use error::FvecError;
pub use file::FvecFile;
pub use loader::SequentialFvecLoader;
pub use writer::FvecWriter;

/// Byte size of the dimension header and of a single component.
pub const COMPONENT_BYTE_SIZE: u64 = 4;

/// Byte size of one record holding `dim` components.
pub fn record_byte_size(dim: usize) -> u64 {
    COMPONENT_BYTE_SIZE * (dim as u64 + 1)
}
