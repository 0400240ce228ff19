//! Reading a runsheet exported from the workbook as CSV.
//!
//! Row 0 is always the header; blank rows are dropped. Cells stay textual
//! (counts are coerced later), so postcodes and leading zeros survive.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use drm_model::{Cell, FileMeta, ManifestTable};

use crate::error::{IngestError, Result};

/// A parsed sheet together with the metadata recorded for it on merge.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub table: ManifestTable,
    pub meta: FileMeta,
}

/// Read a runsheet CSV from disk.
pub fn read_manifest_csv(path: &Path) -> Result<LoadedSheet> {
    let bytes = read_bytes(path)?;
    let table = parse_manifest_csv(&bytes).map_err(|source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    })?;
    if table.is_empty() {
        return Err(IngestError::EmptySheet {
            path: path.to_path_buf(),
        });
    }
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();
    let meta = FileMeta::new(name, table.len()).with_sha256(sha256_hex(&bytes));
    info!(
        path = %path.display(),
        rows = table.len(),
        "loaded runsheet"
    );
    Ok(LoadedSheet { table, meta })
}

/// Parse CSV bytes into a table. Short rows are kept as-is; missing cells read as empty.
pub fn parse_manifest_csv(bytes: &[u8]) -> std::result::Result<ManifestTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut raw_rows: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(Cell::from_raw).collect());
    }
    let before = raw_rows.len();
    let table = ManifestTable::from(raw_rows);
    debug!(
        raw_rows = before,
        data_rows = table.len(),
        "parsed runsheet rows"
    );
    Ok(table)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(bytes)
}

/// Lowercase hex SHA-256 of the given bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
