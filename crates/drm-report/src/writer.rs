use std::io::Write;

use csv::{Terminator, WriterBuilder};

use crate::error::Result;
use crate::rows::{ReportRow, report_headers};

/// Write a header line followed by every row.
pub fn write_report_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut csv = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(report_headers())?;
    for row in rows {
        csv.write_record(row.record())?;
    }
    csv.flush()?;
    Ok(())
}

/// The report as a CSV string.
pub fn report_csv_string(rows: &[ReportRow]) -> Result<String> {
    let mut buffer = Vec::new();
    write_report_csv(rows, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
