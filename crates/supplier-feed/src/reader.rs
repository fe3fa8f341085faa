use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::record::RawRecord;
use crate::sniff;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while opening or streaming a CSV feed.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("unable to open CSV file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV appears empty")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

type Source<R> = Chain<Cursor<Vec<u8>>, BufReader<R>>;

/// Lazy, single-pass stream of [`RawRecord`]s from CSV bytes.
///
/// Construction reads only the first line (to sniff the delimiter) and the
/// first record (to decide between named and positional columns). Every
/// later row is pulled from the underlying reader on demand.
pub struct CsvRows<R: Read> {
    reader: csv::Reader<Source<R>>,
    keys: Vec<String>,
    delimiter: u8,
    has_header: bool,
    pending: Option<RawRecord>,
    record: csv::ByteRecord,
    done: bool,
}

impl CsvRows<File> {
    /// Open a CSV file on disk.
    pub fn open(path: &Path, default_delimiter: u8) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, default_delimiter)
    }
}

impl<R: Read> CsvRows<R> {
    pub fn from_reader(source: R, default_delimiter: u8) -> Result<Self, ReadError> {
        let mut buffered = BufReader::new(source);

        let mut first_line = Vec::new();
        buffered.read_until(b'\n', &mut first_line)?;
        if first_line.is_empty() {
            return Err(ReadError::Empty);
        }
        if first_line.starts_with(UTF8_BOM) {
            first_line.drain(..UTF8_BOM.len());
        }

        let delimiter =
            sniff::detect_delimiter(&String::from_utf8_lossy(&first_line), default_delimiter);

        // The sniffed line is replayed in front of the rest of the stream.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(first_line).chain(buffered));

        let mut first = csv::ByteRecord::new();
        if !reader.read_byte_record(&mut first)? {
            return Err(ReadError::Empty);
        }

        let cells: Vec<String> = first.iter().map(lossy).collect();
        let normalized: Vec<String> = cells.iter().map(|c| sniff::normalize_header(c)).collect();
        let has_header = sniff::is_likely_header(&normalized);

        let (keys, pending) = if has_header {
            (normalized, None)
        } else {
            let keys = sniff::positional_keys(cells.len());
            let row = keys.iter().cloned().zip(cells).collect();
            (keys, Some(row))
        };

        tracing::debug!(
            delimiter = %char::from(delimiter).escape_default(),
            has_header,
            columns = keys.len(),
            "sniffed CSV layout"
        );

        Ok(Self {
            reader,
            keys,
            delimiter,
            has_header,
            pending,
            record: csv::ByteRecord::new(),
            done: false,
        })
    }

    /// The delimiter chosen for the whole stream.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Whether the first record was consumed as column names.
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Keys rows are emitted under, in column order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn current_row(&self) -> RawRecord {
        // Short rows leave trailing keys absent; long rows drop the extras.
        self.keys
            .iter()
            .zip(self.record.iter())
            .map(|(key, value)| (key.as_str(), lossy(value)))
            .collect()
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<RawRecord, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.pending.take() {
            return Some(Ok(row));
        }
        if self.done {
            return None;
        }

        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.current_row())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rows(input: &str) -> Vec<RawRecord> {
        CsvRows::from_reader(input.as_bytes(), b',')
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn header_row_names_columns() {
        let rows = rows("sku,name,price\nA-1,Widget,9.99\nA-2,Gadget,4.50\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("sku"), Some("A-1"));
        assert_eq!(rows[1].get("price"), Some("4.50"));
    }

    #[test]
    fn header_cells_are_normalized() {
        let rows = rows("\u{feff}SKU,Product Name,Incoming Qty\nA-1,Widget,3\n");
        assert_eq!(rows[0].get("sku"), Some("A-1"));
        assert_eq!(rows[0].get("product_name"), Some("Widget"));
        assert_eq!(rows[0].get("incoming_qty"), Some("3"));
    }

    #[test]
    fn unrecognized_first_row_is_data() {
        let mut reader = CsvRows::from_reader("SKU-1,Widget,9.99\nSKU-2,Gadget,1\n".as_bytes(), b',')
            .unwrap();
        assert!(!reader.has_header());
        assert_eq!(reader.keys(), ["col_0", "col_1", "col_2"]);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.get("col_0"), Some("SKU-1"));
        assert_eq!(first.get("col_1"), Some("Widget"));
        assert_eq!(first.get("col_2"), Some("9.99"));

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.get("col_0"), Some("SKU-2"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn sniffed_delimiter_applies_to_whole_stream() {
        let reader =
            CsvRows::from_reader("sku;name;price;stock;currency;note, x\nA;B;1;2;EUR;n\n".as_bytes(), b',')
                .unwrap();
        assert_eq!(reader.delimiter(), b';');

        let rows: Vec<RawRecord> = reader.map(Result::unwrap).collect();
        assert_eq!(rows[0].get("currency"), Some("EUR"));
        assert_eq!(rows[0].get("note_x"), Some("n"));
    }

    #[test]
    fn short_rows_leave_keys_absent_and_long_rows_drop_extras() {
        let rows = rows("sku,name,price\nA-1,Widget\nA-2,Gadget,2,extra,more\n");
        assert_eq!(rows[0].get("name"), Some("Widget"));
        assert_eq!(rows[0].get("price"), None);
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1].get("price"), Some("2"));
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let rows = rows("sku,name,description\nA-1,\"Widget, large\",\"says \"\"hi\"\"\"\n");
        assert_eq!(rows[0].get("name"), Some("Widget, large"));
        assert_eq!(rows[0].get("description"), Some("says \"hi\""));
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = CsvRows::from_reader("".as_bytes(), b',');
        assert!(matches!(result, Err(ReadError::Empty)));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let result = CsvRows::open(&path, b',');
        match result {
            Err(e @ ReadError::Open { .. }) => assert!(e.to_string().contains("nope.csv")),
            _ => panic!("expected open error"),
        }
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sku|name\nA-1|Widget\n").unwrap();

        let reader = CsvRows::open(file.path(), b',').unwrap();
        assert_eq!(reader.delimiter(), b'|');
        let rows: Vec<RawRecord> = reader.map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Widget"));
    }
}
