use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    os::fd::AsRawFd,
    path::PathBuf,
};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::warn;

use crate::error::FvecError;

/// Reads the records of a validated fvecs file front to back.
pub struct SequentialFvecLoader {
    path: PathBuf,
    reader: BufReader<File>,
    dim: usize,
    num_vecs: usize,
    row: usize,
}

impl SequentialFvecLoader {
    pub fn new(path: PathBuf, file: File, dim: usize, num_vecs: usize) -> Self {
        let fd = file.as_raw_fd();
        let ret = unsafe { libc::posix_fadvise(fd, 0, 0, libc::POSIX_FADV_SEQUENTIAL) };
        if ret != 0 {
            warn!(
                path = %path.display(),
                error = %std::io::Error::from_raw_os_error(ret),
                "fadvise failed"
            );
        }

        Self {
            path,
            reader: BufReader::new(file),
            dim,
            num_vecs,
            row: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_vecs(&self) -> usize {
        self.num_vecs
    }

    /// Number of records read so far.
    pub fn rows_read(&self) -> usize {
        self.row
    }

    /// Decodes the next record into `buf`, which must hold exactly `dim`
    /// components. Returns `false` once every record has been read.
    pub fn load_record_into(&mut self, buf: &mut [f32]) -> Result<bool, FvecError> {
        if buf.len() != self.dim {
            return Err(FvecError::VectorLength {
                expected: self.dim,
                actual: buf.len(),
            });
        }
        if self.row == self.num_vecs {
            return Ok(false);
        }

        let declared = self.reader.read_i32::<LittleEndian>()?;
        if usize::try_from(declared).ok() != Some(self.dim) {
            return Err(FvecError::DimensionDrift {
                path: self.path.clone(),
                expected: self.dim,
                actual: declared,
                row: self.row + 1,
            });
        }
        match self.reader.read_f32_into::<LittleEndian>(buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                warn!(row = self.row + 1, "file shrank while reading");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        self.row += 1;
        Ok(true)
    }

    pub fn load_record(&mut self) -> Result<Option<Vec<f32>>, FvecError> {
        let mut data = vec![0.0_f32; self.dim];
        if self.load_record_into(&mut data)? {
            Ok(Some(data))
        } else {
            Ok(None)
        }
    }
}

impl Iterator for SequentialFvecLoader {
    type Item = Result<Vec<f32>, FvecError>;

    fn next(&mut self) -> Option<Self::Item> {
        // switch the option and the result of load_record
        match self.load_record() {
            Ok(None) => None,
            Ok(Some(v)) => Some(Ok(v)),
            Err(e) => Some(Err(e)),
        }
    }
}
