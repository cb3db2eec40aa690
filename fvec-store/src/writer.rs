use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::FvecError;

/// Writes fvecs records of a fixed dimension.
pub struct FvecWriter<W: Write> {
    inner: W,
    dim: usize,
    num_vecs: usize,
}

impl<W: Write> FvecWriter<W> {
    /// # Panics
    /// If `dim` does not fit in the `i32` record header.
    pub fn new(inner: W, dim: usize) -> Self {
        assert!(
            i32::try_from(dim).is_ok(),
            "dimension {dim} does not fit in an fvecs header"
        );
        Self {
            inner,
            dim,
            num_vecs: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_vecs(&self) -> usize {
        self.num_vecs
    }

    pub fn append_vector(&mut self, vector: &[f32]) -> Result<(), FvecError> {
        if vector.len() != self.dim {
            return Err(FvecError::VectorLength {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        self.inner.write_i32::<LittleEndian>(self.dim as i32)?;
        for x in vector {
            self.inner.write_f32::<LittleEndian>(*x)?;
        }
        self.num_vecs += 1;

        Ok(())
    }

    pub fn append_vectors<'a, I: IntoIterator<Item = &'a [f32]>>(
        &mut self,
        vectors: I,
    ) -> Result<usize, FvecError> {
        let mut count = 0;
        for vector in vectors {
            self.append_vector(vector)?;
            count += 1;
        }

        Ok(count)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
