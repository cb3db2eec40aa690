use std::io::{self, Write};

use itertools::Itertools;

/// Writes `row` as one line of space-separated values.
///
/// Each value is printed as the shortest decimal that parses back to the
/// same `f32`, always with a fractional part or an exponent.
pub fn write_row<W: Write>(out: &mut W, row: &[f32]) -> io::Result<()> {
    writeln!(out, "{:?}", row.iter().format(" "))
}
