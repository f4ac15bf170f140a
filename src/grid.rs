use serde::{Deserialize, Serialize};

/// One row of string cells.
pub type Row = Vec<String>;

/// Ordered rows of string cells. Row 0, when present, is the header.
///
/// Every row holds at least one cell: a row built without cells is stored as a
/// single empty cell, which is also how delimited text represents it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Row>", into = "Vec<Row>")]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter().map(normalize_row).collect(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header, unmodified.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of data rows; the header is not counted.
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

}

fn normalize_row(row: Row) -> Row {
    if row.is_empty() {
        vec![String::new()]
    } else {
        row
    }
}

impl From<Vec<Row>> for Grid {
    fn from(rows: Vec<Row>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Row> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

impl<S: Into<String>> FromIterator<Vec<S>> for Grid {
    fn from_iter<I: IntoIterator<Item = Vec<S>>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|row| normalize_row(row.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}
