use std::{
    fs::{File, OpenOptions},
    io::{Seek, SeekFrom},
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::{
    error::FvecError, loader::SequentialFvecLoader, record_byte_size, COMPONENT_BYTE_SIZE,
};

/// An fvecs file whose size has been checked against its header.
///
/// The handle is positioned at the start of the first record.
pub struct FvecFile {
    path: PathBuf,
    file: File,
    dim: usize,
    num_vecs: usize,
}

impl FvecFile {
    fn new(path: PathBuf, file: File, dim: usize, num_vecs: usize) -> Self {
        Self {
            path,
            file,
            dim,
            num_vecs,
        }
    }

    /// Opens `path`, reads the dimension of the first record and checks
    /// that the file size is a whole number of records of that dimension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FvecError> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().read(true).open(&path) {
            Ok(file) => file,
            Err(source) => return Err(FvecError::Open { path, source }),
        };
        let byte_size = file.metadata()?.size();
        if byte_size < COMPONENT_BYTE_SIZE {
            return Err(FvecError::MissingHeader {
                path,
                size: byte_size,
            });
        }

        let header = file.read_i32::<LittleEndian>()?;
        let dim = match usize::try_from(header) {
            Ok(dim) => dim,
            Err(_) => return Err(FvecError::NegativeDimension { path, dim: header }),
        };

        let stride = record_byte_size(dim);
        if byte_size % stride != 0 {
            return Err(FvecError::SizeMismatch {
                path,
                size: byte_size,
                dim,
            });
        }
        file.seek(SeekFrom::Start(0))?;

        let num_vecs = (byte_size / stride) as usize;
        debug!(path = %path.display(), dim, num_vecs, "probed fvecs file");

        Ok(Self::new(path, file, dim, num_vecs))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_vecs(&self) -> usize {
        self.num_vecs
    }

    pub fn record_byte_size(&self) -> u64 {
        record_byte_size(self.dim)
    }

    pub fn into_records(self) -> SequentialFvecLoader {
        SequentialFvecLoader::new(self.path, self.file, self.dim, self.num_vecs)
    }
}
