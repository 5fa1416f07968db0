//! Exporters from canonical QSO records to upload-ready files.
//!
//! Every exporter is a pure function from records plus options to a named
//! set of text files ([`Artifacts`]). Exporters that split output by
//! summit, park or date assume records for the same key arrive
//! contiguously and flush a buffer on every key change; they never
//! re-sort the input.

use hashbrown::HashMap;
use thiserror::Error;

use crate::types::RemarkSlot;

/// ADIF rendering and per-reference fan-out.
pub mod adif;
/// AirHamLog CSV.
pub mod airham;
/// FLE session download bundle.
pub mod bundle;
/// HAMLOG CSV back-export.
pub mod hamlog;
/// SOTA V2 CSV.
pub mod sota;
/// Zlog contest file.
pub mod zlog;

pub use adif::pota_convert;
pub use airham::airham_convert;
pub use bundle::generate_bundle;
pub use sota::{sota_activator, sota_chaser};

/// Export failure. Writing to in-memory buffers only fails on malformed
/// UTF-8 slipping through the CSV writer, which indicates a bug upstream.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    /// A finished CSV buffer was not valid UTF-8.
    #[error("export buffer is not valid UTF-8")]
    Encoding,
}

/// Caller-supplied conversion settings, mirroring the upload form of the
/// conversion service.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Which column carries the contacted station's QTH/references.
    pub qth: RemarkSlot,
    /// Which column carries the logging station's references.
    pub my_qth: RemarkSlot,
    /// Fixed summit reference when `my_qth` is not a remark column.
    pub summit: String,
    /// Fixed park reference when `my_qth` is not a remark column.
    pub park: String,
    /// Fixed QTH text for [`RemarkSlot::UserDefined`].
    pub location: String,
    /// Activation callsign for SOTA export.
    pub sota_activator: String,
    /// Activation callsign for POTA/ADIF export.
    pub pota_activator: String,
    /// Operator callsign for POTA export; defaults to the activator base.
    pub pota_operator: String,
    /// Activation callsign for WWFF export.
    pub wwff_activator: String,
    /// Operator callsign for WWFF export.
    pub wwff_operator: String,
    /// Fixed WWFF reference.
    pub wwff_ref: String,
}

/// Named output files in insertion order.
///
/// Filenames map to text content; [`Artifacts::append`] creates the file
/// on first use, which is how ADIF exporters accumulate records into
/// per-reference files across the input stream.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    files: HashMap<String, String>,
    order: Vec<String>,
}

impl Artifacts {
    /// Creates an empty artifact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `content` under `name`, replacing any previous content.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        if !self.files.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.files.insert(name, content.into());
    }

    /// Appends `content` to `name`, creating the file when absent.
    pub fn append(&mut self, name: &str, content: &str) {
        match self.files.get_mut(name) {
            Some(buf) => buf.push_str(content),
            None => self.insert(name, content),
        }
    }

    /// Returns the content stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// True when `name` already exists.
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Filenames in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no file has been produced.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the set, yielding `(name, content)` pairs in insertion
    /// order.
    pub fn into_files(mut self) -> Vec<(String, String)> {
        self.order
            .drain(..)
            .filter_map(|name| {
                let content = self.files.remove(&name)?;
                Some((name, content))
            })
            .collect()
    }
}

/// Splits `items` into maximal runs of equal keys, preserving order.
/// Non-contiguous occurrences of the same key yield separate runs.
pub fn segment_by_key<T, K, F>(items: &[T], key: F) -> Vec<(K, &[T])>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut out = Vec::new();
    let mut start = 0;
    while start < items.len() {
        let k = key(&items[start]);
        let mut end = start + 1;
        while end < items.len() && key(&items[end]) == k {
            end += 1;
        }
        out.push((k, &items[start..end]));
        start = end;
    }
    out
}

/// Reads CSV rows from `input`, skipping blank lines. Rows may have
/// varying widths; column-count validation belongs to the decoders.
pub fn read_rows(input: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());
    reader
        .records()
        .filter_map(|row| row.ok())
        .map(|row| row.iter().map(str::to_string).collect::<Vec<String>>())
        .filter(|row| !(row.len() == 1 && row[0].is_empty()))
        .collect()
}

/// In-memory CSV builder used by every exporter.
pub(crate) struct CsvBuf {
    writer: csv::Writer<Vec<u8>>,
    delimiter: u8,
    quote_all: bool,
    rows: usize,
}

impl CsvBuf {
    pub fn new() -> Self {
        Self::with(b',', false)
    }

    pub fn with(delimiter: u8, quote_all: bool) -> Self {
        Self {
            writer: Self::make(delimiter, quote_all),
            delimiter,
            quote_all,
            rows: 0,
        }
    }

    fn make(delimiter: u8, quote_all: bool) -> csv::Writer<Vec<u8>> {
        csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .quote_style(if quote_all {
                csv::QuoteStyle::Always
            } else {
                csv::QuoteStyle::Necessary
            })
            .from_writer(Vec::new())
    }

    pub fn row<I, S>(&mut self, fields: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer.write_record(fields)?;
        self.rows += 1;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Finishes the buffer and resets it for the next segment.
    pub fn take(&mut self) -> Result<String, ExportError> {
        let writer = std::mem::replace(&mut self.writer, Self::make(self.delimiter, self.quote_all));
        self.rows = 0;
        let bytes = writer.into_inner().map_err(|_| ExportError::Encoding)?;
        String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_keep_insertion_order() {
        let mut a = Artifacts::new();
        a.insert("b.csv", "1");
        a.insert("a.csv", "2");
        a.append("b.csv", "3");
        let names: Vec<&str> = a.names().collect();
        assert_eq!(names, vec!["b.csv", "a.csv"]);
        assert_eq!(a.get("b.csv"), Some("13"));
    }

    #[test]
    fn append_creates_missing_file() {
        let mut a = Artifacts::new();
        a.append("x.adi", "hdr");
        assert_eq!(a.get("x.adi"), Some("hdr"));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn segments_are_contiguous_runs() {
        let keys = ["A", "A", "B", "A"];
        let segs = segment_by_key(&keys, |k| k.to_string());
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].1.len(), 2);
        assert_eq!(segs[1].0, "B");
        assert_eq!(segs[2].0, "A");
    }

    #[test]
    fn read_rows_skips_blank_lines() {
        let rows = read_rows("a,b,c\n\nd,e\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["d", "e"]);
    }

    #[test]
    fn csv_buf_quotes_only_when_needed() {
        let mut buf = CsvBuf::new();
        buf.row(["a b", "c,d", "e"]).unwrap();
        assert_eq!(buf.take().unwrap(), "a b,\"c,d\",e\n");
    }

    #[test]
    fn csv_buf_quote_all() {
        let mut buf = CsvBuf::with(b',', true);
        buf.row(["JH1XYZ", "0"]).unwrap();
        assert_eq!(buf.take().unwrap(), "\"JH1XYZ\",\"0\"\n");
    }
}
