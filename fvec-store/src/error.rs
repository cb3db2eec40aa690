use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FvecError {
    #[error("could not open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "file {} has the wrong format, {size} bytes is too short for a dimension header",
        .path.display()
    )]
    MissingHeader { path: PathBuf, size: u64 },
    #[error(
        "file {} has the wrong format, got negative dimension: {dim}",
        .path.display()
    )]
    NegativeDimension { path: PathBuf, dim: i32 },
    #[error(
        "file {} has the wrong format, {size} bytes is not a whole number of records, expected dim = {dim}",
        .path.display()
    )]
    SizeMismatch { path: PathBuf, size: u64, dim: usize },
    #[error(
        "file {} has the wrong format, got wrong dimension: {actual} expect: {expected} row {row}",
        .path.display()
    )]
    DimensionDrift {
        path: PathBuf,
        expected: usize,
        actual: i32,
        row: usize,
    },
    #[error("vector has {actual} components, expected {expected}")]
    VectorLength { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}
