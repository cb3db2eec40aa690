use std::{
    io::{self, Write},
    path::Path,
};

use fvec_store::{FvecError, FvecFile};
use thiserror::Error;
use tracing::{debug, info};

use crate::render::write_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub dim: usize,
    pub rows: usize,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Format(#[from] FvecError),
    #[error("could not write output")]
    Output(#[source] io::Error),
}

impl ConvertError {
    /// True when the reader of our output went away, as with `| head`.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ConvertError::Output(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Converts the fvecs file at `path` to text, one vector per line.
///
/// The file size is validated before anything is written. Rows preceding
/// a record with the wrong dimension are written and flushed before the
/// error is returned.
pub fn convert_file<P: AsRef<Path>, W: Write>(
    path: P,
    out: W,
) -> Result<ConversionSummary, ConvertError> {
    let file = FvecFile::open(path)?;
    convert(file, out)
}

pub fn convert<W: Write>(file: FvecFile, mut out: W) -> Result<ConversionSummary, ConvertError> {
    let dim = file.dim();
    info!(path = %file.path().display(), dim, rows = file.num_vecs(), "converting");

    let mut records = file.into_records();
    let mut row = vec![0.0_f32; dim];
    loop {
        match records.load_record_into(&mut row) {
            Ok(true) => write_row(&mut out, &row).map_err(ConvertError::Output)?,
            Ok(false) => break,
            Err(e) => {
                debug!(rows = records.rows_read(), "flushing rows before failure");
                if let Err(flush) = out.flush() {
                    debug!(%flush, "could not flush rows before failure");
                }
                return Err(e.into());
            }
        }
    }
    out.flush().map_err(ConvertError::Output)?;

    Ok(ConversionSummary {
        dim,
        rows: records.rows_read(),
    })
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;
    use byteorder::{LittleEndian, WriteBytesExt};
    use fvec_store::FvecWriter;
    use tempfile::NamedTempFile;

    use super::*;

    fn fixture(dim: usize, rows: &[Vec<f32>]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut writer = FvecWriter::new(file.reopen().unwrap(), dim);
        writer.append_vectors(rows.iter().map(|r| &r[..])).unwrap();
        writer.flush().unwrap();
        file
    }

    fn raw_fixture(records: &[(i32, &[f32])]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut out = file.reopen().unwrap();
        for (dim, values) in records {
            out.write_i32::<LittleEndian>(*dim).unwrap();
            for x in values.iter() {
                out.write_f32::<LittleEndian>(*x).unwrap();
            }
        }
        file
    }

    fn run(path: &Path) -> (Result<ConversionSummary, ConvertError>, String) {
        let mut out = Vec::new();
        let result = convert_file(path, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn values_survive_conversion() {
        let rows: Vec<Vec<f32>> = (0..7)
            .map(|i| (0..5).map(|j| (i * 5 + j) as f32 / 7.0 - 2.0).collect())
            .collect();
        let file = fixture(5, &rows);

        let (result, text) = run(file.path());
        assert_eq!(ConversionSummary { dim: 5, rows: 7 }, result.unwrap());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), lines.len());
        for (expected, line) in rows.iter().zip(lines) {
            let parsed: Vec<f32> = line.split(' ').map(|t| t.parse().unwrap()).collect();
            assert_eq!(expected.len(), parsed.len());
            for (e, p) in expected.iter().zip(parsed) {
                assert_float_absolute_eq!(*e, p, f32::EPSILON);
            }
        }
    }

    #[test]
    fn ten_rows_of_four() {
        let rows: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.5, -1.0, 2.25]).collect();
        let file = fixture(4, &rows);
        assert_eq!(200, file.as_file().metadata().unwrap().len());

        let (result, text) = run(file.path());
        result.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(10, lines.len());
        for line in lines {
            assert_eq!(4, line.split(' ').count());
        }
        assert!(text.starts_with("0.0 0.5 -1.0 2.25\n1.0 0.5 -1.0 2.25\n"));
    }

    #[test]
    fn size_mismatch_writes_nothing() {
        let file = raw_fixture(&[(3, &[1.0, 2.0, 3.0][..]), (3, &[4.0, 5.0][..])]);

        let (result, text) = run(file.path());
        assert!(matches!(
            result,
            Err(ConvertError::Format(FvecError::SizeMismatch { dim: 3, .. }))
        ));
        assert!(text.is_empty());
    }

    #[test]
    fn dimension_drift_keeps_preceding_rows() {
        let file = raw_fixture(&[
            (2, &[1.0, 1.5]),
            (2, &[2.0, 2.5]),
            (3, &[3.0, 3.5]),
            (2, &[4.0, 4.5]),
            (2, &[5.0, 5.5]),
        ]);

        let (result, text) = run(file.path());
        assert_eq!("1.0 1.5\n2.0 2.5\n", text);
        match result {
            Err(ConvertError::Format(FvecError::DimensionDrift {
                expected,
                actual,
                row,
                ..
            })) => {
                assert_eq!((2, 3, 3), (expected, actual, row));
            }
            other => panic!("expected dimension drift, got {other:?}"),
        }
    }

    #[test]
    fn drift_is_flushed_through_buffered_output() {
        let file = raw_fixture(&[(1, &[1.0]), (7, &[2.0])]);

        let mut out = Vec::new();
        let result = convert_file(file.path(), io::BufWriter::new(&mut out));
        assert!(result.is_err());
        assert_eq!(b"1.0\n", &out[..]);
    }

    #[test]
    fn zero_dimension_gives_empty_lines() {
        let file = fixture(0, &[vec![], vec![], vec![]]);

        let (result, text) = run(file.path());
        assert_eq!(ConversionSummary { dim: 0, rows: 3 }, result.unwrap());
        assert_eq!("\n\n\n", text);
    }

    #[test]
    fn conversion_is_deterministic() {
        let rows: Vec<Vec<f32>> = (0..50)
            .map(|i| (0..16).map(|j| ((i * 31 + j * 17) % 97) as f32 * 0.013).collect())
            .collect();
        let file = fixture(16, &rows);

        let (first, first_text) = run(file.path());
        let (second, second_text) = run(file.path());
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(first_text, second_text);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drift_wins_over_failed_flush_into_closed_pipe() {
        let file = raw_fixture(&[(1, &[1.0]), (1, &[2.0]), (4, &[3.0])]);

        let err = convert_file(file.path(), io::BufWriter::new(ClosedPipe)).unwrap_err();
        assert!(!err.is_broken_pipe());
        assert!(matches!(
            err,
            ConvertError::Format(FvecError::DimensionDrift { row: 3, .. })
        ));
    }

    #[test]
    fn closed_output_is_reported_as_broken_pipe() {
        let file = fixture(2, &[vec![1.0, 2.0]]);

        let err = convert_file(file.path(), ClosedPipe).unwrap_err();
        assert!(err.is_broken_pipe());
    }

    #[test]
    fn format_errors_are_not_broken_pipes() {
        let file = raw_fixture(&[]);

        let err = convert_file(file.path(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Format(FvecError::MissingHeader { size: 0, .. })
        ));
        assert!(!err.is_broken_pipe());
    }
}
