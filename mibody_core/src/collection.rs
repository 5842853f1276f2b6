//! The parsed collection of weigh-ins.
//!
//! `BodyData` owns the parse-then-wrap pipeline: it reads the whole source
//! under a size bound, decodes it with [`crate::record::parse_records`] and
//! keeps the resulting rows in file order together with the parse report.

use crate::export::{self, ExportOptions};
use crate::record::{parse_records, ParseReport};
use crate::{BodyDataRow, Error, Result};
use fs2::FileExt;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Largest export accepted by default (16 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;

/// Ordered, immutable set of weigh-ins from one export file
#[derive(Clone, Debug)]
pub struct BodyData {
    rows: Vec<BodyDataRow>,
    report: ParseReport,
    source: String,
}

impl BodyData {
    /// Parse the export at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_limit(path, DEFAULT_MAX_INPUT_BYTES)
    }

    /// Parse the export at `path`, refusing sources larger than `limit` bytes
    pub fn open_with_limit(path: impl AsRef<Path>, limit: u64) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let unreadable = |e| Error::SourceUnreadable {
            source_name: source.clone(),
            source: e,
        };

        let file = File::open(path).map_err(unreadable)?;
        // Held for the duration of the read
        file.lock_shared().map_err(unreadable)?;
        let data = read_bounded(&file, limit, &source);
        file.unlock()?;

        let data = data?;
        tracing::info!("Read {} bytes from {:?}", data.len(), path);
        Ok(Self::from_bytes_named(&data, source))
    }

    /// Parse an already-open stream
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::from_reader_with_limit(reader, DEFAULT_MAX_INPUT_BYTES)
    }

    pub fn from_reader_with_limit(reader: impl Read, limit: u64) -> Result<Self> {
        let source = "<stream>".to_string();
        let data = read_bounded(reader, limit, &source)?;
        Ok(Self::from_bytes_named(&data, source))
    }

    /// Parse an in-memory export
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_bytes_named(data, "<bytes>".to_string())
    }

    fn from_bytes_named(data: &[u8], source: String) -> Self {
        let outcome = parse_records(data);
        if outcome.records.is_empty() {
            tracing::warn!("File, '{}' has yielded no weigh-ins", source);
        }

        Self {
            rows: outcome.records.into_iter().map(BodyDataRow::new).collect(),
            report: outcome.report,
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`, or `IndexOutOfRange`
    pub fn get(&self, index: usize) -> Result<&BodyDataRow> {
        self.rows.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BodyDataRow> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[BodyDataRow] {
        &self.rows
    }

    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    /// Path or stream label the data was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fail with `StrictParse` if any record was rejected
    pub fn ensure_clean(&self) -> Result<()> {
        if self.report.is_clean() {
            Ok(())
        } else {
            Err(Error::StrictParse {
                skipped: self.report.skipped.len(),
            })
        }
    }

    /// Export into a readable in-memory stream
    pub fn export(&self, options: &ExportOptions) -> Result<Cursor<Vec<u8>>> {
        let mut buffer = Vec::new();
        export::write(self, options, &mut buffer)?;
        Ok(Cursor::new(buffer))
    }
}

impl<'a> IntoIterator for &'a BodyData {
    type Item = &'a BodyDataRow;
    type IntoIter = std::slice::Iter<'a, BodyDataRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for BodyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str("No weight entries found");
        }

        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\r\n")?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

fn read_bounded(reader: impl Read, limit: u64, source: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|e| Error::SourceUnreadable {
            source_name: source.to_string(),
            source: e,
        })?;

    if data.len() as u64 > limit {
        return Err(Error::SourceTooLarge { limit });
    }
    Ok(data)
}
