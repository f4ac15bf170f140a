//! Delimited tabular text (CSV) codec over the `csv` crate.
//!
//! `decode` turns a fully-read response body into a [`Grid`] whose first row is
//! the header; `encode` is its left inverse. Quoting follows RFC 4180: quoted
//! fields may hold delimiters, line breaks and doubled quotes. Blank lines
//! carry no record and are skipped.

use thiserror::Error;

use crate::grid::{Grid, Row};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("tabular data is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("malformed record on line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("failed to write tabular data: {0}")]
    Write(String),
}

impl CodecError {
    fn malformed(err: &csv::Error) -> Self {
        Self::Malformed {
            line: err.position().map_or(0, csv::Position::line),
            message: err.to_string(),
        }
    }
}

/// Encoder/decoder for delimited tabular text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularCodec {
    delimiter: u8,
}

impl Default for TabularCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularCodec {
    /// Comma-delimited, double-quoted.
    #[must_use]
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Decode a complete body. Cells stay strings; no type coercion.
    pub fn decode(&self, bytes: &[u8]) -> Result<Grid, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());

        let rows = reader
            .records()
            .map(|record| {
                let record = record.map_err(|err| CodecError::malformed(&err))?;
                Ok(record.iter().map(str::to_owned).collect::<Row>())
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        Ok(Grid::from_rows(rows))
    }

    /// Encode a grid as `\r\n`-terminated records.
    pub fn encode(&self, grid: &Grid) -> Result<Vec<u8>, CodecError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());

        for row in grid.rows() {
            writer
                .write_record(row)
                .map_err(|err| CodecError::Write(err.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|err| CodecError::Write(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn decode_keeps_header_first_and_cells_as_strings() {
        let decoded = TabularCodec::new()
            .decode(b"name,orders\nAlice,12\nBob,9\n")
            .unwrap();
        assert_eq!(
            decoded,
            grid(&[&["name", "orders"], &["Alice", "12"], &["Bob", "9"]])
        );
        assert_eq!(decoded.data_row_count(), 2);
    }

    #[test]
    fn decode_handles_crlf_and_missing_trailing_newline() {
        let decoded = TabularCodec::new().decode(b"a,b\r\n1,2\r\n3,4").unwrap();
        assert_eq!(decoded, grid(&[&["a", "b"], &["1", "2"], &["3", "4"]]));
    }

    #[test]
    fn decode_quoted_fields_with_delimiters_quotes_and_newlines() {
        let body = "id,note\n1,\"hello, world\"\n2,\"say \"\"hi\"\"\"\n3,\"two\nlines\"\n";
        let decoded = TabularCodec::new().decode(body.as_bytes()).unwrap();
        assert_eq!(
            decoded,
            grid(&[
                &["id", "note"],
                &["1", "hello, world"],
                &["2", "say \"hi\""],
                &["3", "two\nlines"],
            ])
        );
    }

    #[test]
    fn decode_skips_blank_lines_but_keeps_quoted_empty_cell() {
        let decoded = TabularCodec::new().decode(b"h\n\nx\n\"\"\n").unwrap();
        assert_eq!(decoded, grid(&[&["h"], &["x"], &[""]]));
    }

    #[test]
    fn decode_keeps_ragged_rows() {
        let decoded = TabularCodec::new().decode(b"a,b,c\n1\n2,3\n").unwrap();
        assert_eq!(decoded, grid(&[&["a", "b", "c"], &["1"], &["2", "3"]]));
    }

    #[test]
    fn decode_empty_body_is_empty_grid() {
        assert!(TabularCodec::new().decode(b"").unwrap().is_empty());
    }

    #[test]
    fn decode_strips_byte_order_mark() {
        let decoded = TabularCodec::new().decode("\u{feff}a,b\n".as_bytes()).unwrap();
        assert_eq!(decoded, grid(&[&["a", "b"]]));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = TabularCodec::new().decode(&[b'a', b',', 0xff, 0xfe]).unwrap_err();
        assert_eq!(err, CodecError::InvalidUtf8 { valid_up_to: 2 });
    }

    #[test]
    fn decode_runs_unterminated_quote_to_end_of_body() {
        let decoded = TabularCodec::new()
            .decode(b"a,b\n1,2\n3,\"open\n")
            .unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.rows()[2][0], "3");
        assert!(decoded.rows()[2][1].starts_with("open"));
    }

    #[test]
    fn encode_then_decode_restores_plain_grid() {
        let codec = TabularCodec::new();
        let original = grid(&[&["name", "orders"], &["Alice", "12"], &["Bob", "9"]]);
        let encoded = codec.encode(&original).unwrap();
        assert_eq!(encoded, b"name,orders\r\nAlice,12\r\nBob,9\r\n".to_vec());
        assert_eq!(codec.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn encode_then_decode_restores_fields_needing_escapes() {
        let codec = TabularCodec::new();
        let original = grid(&[
            &["col", "other"],
            &["a,b", "quote \" inside"],
            &["multi\r\nline", " padded "],
            &[""],
            &["", ""],
        ]);
        let encoded = codec.encode(&original).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn row_without_cells_round_trips_as_single_empty_cell() {
        let codec = TabularCodec::new();
        let original = Grid::from_rows(vec![
            vec!["a".to_string()],
            Vec::new(),
            vec!["b".to_string()],
        ]);
        let encoded = codec.encode(&original).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), original);
        assert_eq!(original.rows()[1], vec![String::new()]);
    }

    #[test]
    fn custom_delimiter_round_trips() {
        let codec = TabularCodec::new().with_delimiter(b';');
        let original = grid(&[&["a", "b"], &["1,5", "2;5"]]);
        let encoded = codec.encode(&original).unwrap();
        assert_eq!(
            String::from_utf8(encoded.clone()).unwrap(),
            "a;b\r\n1,5;\"2;5\"\r\n"
        );
        assert_eq!(codec.decode(&encoded).unwrap(), original);
    }
}
