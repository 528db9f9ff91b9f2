//! Example tables accumulated from scenario outline examples blocks.
//!
//! A scenario outline may carry several examples blocks. Each block becomes a
//! dataset of one shared [`ExampleTable`]: the rows of every block are stored
//! in declaration order and each dataset remembers its own title and
//! description.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::StoryError;
use crate::model::ExamplesNode;

/// One data row of an examples table, keyed by column header.
///
/// Cells keep the header order of the table they were read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExampleRow {
    cells: Vec<(String, String)>,
}

impl ExampleRow {
    /// Pair headers with cell values.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::examples::ExampleRow;
    ///
    /// let row = ExampleRow::new(["item", "price"], ["apple", "3"]);
    /// assert_eq!(row.get("price"), Some("3"));
    /// assert_eq!(row.get("colour"), None);
    /// ```
    #[must_use]
    pub fn new<H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let cells = headers
            .into_iter()
            .map(Into::into)
            .zip(values.into_iter().map(Into::into))
            .collect();
        Self { cells }
    }

    /// Look up the value stored under `header`.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(header, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    /// Number of cells in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build a copy holding the values of `headers`, in that order.
    ///
    /// Headers absent from this row are skipped.
    #[must_use]
    pub fn project(&self, headers: &[String]) -> Self {
        let cells = headers
            .iter()
            .filter_map(|header| {
                self.get(header)
                    .map(|value| (header.clone(), value.to_string()))
            })
            .collect();
        Self { cells }
    }
}

impl fmt::Display for ExampleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (header, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{header}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for ExampleRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Rows contributed by a single examples block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExampleDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start_row: usize,
    row_count: usize,
}

impl ExampleDataset {
    fn new(title: Option<String>, description: Option<String>, start_row: usize) -> Self {
        Self {
            title,
            description,
            start_row,
            row_count: 0,
        }
    }

    /// Block title, when the block was named.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Block description, when present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Index of the first table row belonging to this dataset.
    #[must_use]
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Number of rows contributed by this dataset.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

/// Tabular example data attached to a scenario outline test.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExampleTable {
    headers: Vec<String>,
    rows: Vec<ExampleRow>,
    datasets: Vec<ExampleDataset>,
}

impl ExampleTable {
    /// Create a table whose first dataset holds `rows`.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::examples::{ExampleRow, ExampleTable};
    ///
    /// let headers = vec!["n".to_string()];
    /// let mut table = ExampleTable::new(
    ///     headers.clone(),
    ///     vec![ExampleRow::new(["n"], ["1"])],
    ///     Some("small".into()),
    ///     None,
    /// );
    /// table.start_new_dataset(Some("large".into()), None);
    /// table.add_row(ExampleRow::new(["n"], ["1000"]));
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.datasets().len(), 2);
    /// assert_eq!(table.datasets()[1].start_row(), 1);
    /// ```
    #[must_use]
    pub fn new(
        headers: Vec<String>,
        rows: Vec<ExampleRow>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        let mut table = Self {
            headers,
            rows: Vec::with_capacity(rows.len()),
            datasets: Vec::new(),
        };
        table.start_new_dataset(title, description);
        for row in rows {
            table.add_row(row);
        }
        table
    }

    /// Open a new dataset; subsequent rows belong to it.
    pub fn start_new_dataset(&mut self, title: Option<String>, description: Option<String>) {
        self.datasets
            .push(ExampleDataset::new(title, description, self.rows.len()));
    }

    /// Append a row to the most recent dataset.
    pub fn add_row(&mut self, row: ExampleRow) {
        if self.datasets.is_empty() {
            self.start_new_dataset(None, None);
        }
        if let Some(dataset) = self.datasets.last_mut() {
            dataset.row_count += 1;
        }
        self.rows.push(row);
    }

    /// Column headers.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Every row, across all datasets, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[ExampleRow] {
        &self.rows
    }

    /// Datasets in declaration order.
    #[must_use]
    pub fn datasets(&self) -> &[ExampleDataset] {
        &self.datasets
    }

    /// Total number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An examples block split into headers and keyed rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedExamples {
    /// Column headers taken from the first table row.
    pub headers: Vec<String>,
    /// Data rows keyed by header, in table order.
    pub rows: Vec<ExampleRow>,
    /// Block title, when named.
    pub title: Option<String>,
    /// Block description, when present.
    pub description: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Split an examples block into headers and keyed rows.
///
/// # Errors
///
/// - [`StoryError::MissingExampleHeader`] when the table has no rows at all.
/// - [`StoryError::UnevenExampleRow`] when a data row has more or fewer cells
///   than the header row. Row numbers are 1-based and count the header.
pub fn parse_examples(block: &ExamplesNode) -> Result<ParsedExamples, StoryError> {
    let mut raw_rows = block.rows.iter();
    let headers = raw_rows
        .next()
        .cloned()
        .ok_or_else(|| StoryError::MissingExampleHeader {
            block: block.name.clone(),
        })?;
    let mut rows = Vec::with_capacity(block.rows.len().saturating_sub(1));
    for (index, cells) in raw_rows.enumerate() {
        if cells.len() != headers.len() {
            return Err(StoryError::UnevenExampleRow {
                row_number: index + 2,
                expected: headers.len(),
                actual: cells.len(),
            });
        }
        rows.push(ExampleRow::new(headers.iter().cloned(), cells.iter().cloned()));
    }
    Ok(ParsedExamples {
        headers,
        rows,
        title: non_empty(&block.name),
        description: non_empty(&block.description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> ExamplesNode {
        ExamplesNode::new("fruit")
            .with_row(["item", "price"])
            .with_row(["apple", "3"])
            .with_row(["pear", "4"])
    }

    #[test]
    fn parses_header_and_rows() {
        let parsed = match parse_examples(&block()) {
            Ok(parsed) => parsed,
            Err(error) => panic!("block should parse: {error}"),
        };
        assert_eq!(parsed.headers, ["item", "price"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.title.as_deref(), Some("fruit"));
        assert!(parsed.description.is_none());
        let values: Vec<_> = parsed.rows.iter().filter_map(|row| row.get("item")).collect();
        assert_eq!(values, ["apple", "pear"]);
    }

    #[test]
    fn short_rows_are_rejected() {
        let uneven = block().with_row(["plum"]);
        match parse_examples(&uneven) {
            Err(StoryError::UnevenExampleRow {
                row_number,
                expected,
                actual,
            }) => assert_eq!((row_number, expected, actual), (4, 2, 1)),
            other => panic!("expected uneven row error, got {other:?}"),
        }
    }

    #[test]
    fn empty_block_has_no_header() {
        assert!(matches!(
            parse_examples(&ExamplesNode::new("empty")),
            Err(StoryError::MissingExampleHeader { block }) if block == "empty"
        ));
    }

    #[test]
    fn header_only_block_has_no_rows() {
        let parsed = match parse_examples(&ExamplesNode::new("").with_row(["a"])) {
            Ok(parsed) => parsed,
            Err(error) => panic!("header-only block should parse: {error}"),
        };
        assert!(parsed.rows.is_empty());
        assert!(parsed.title.is_none());
    }

    #[test]
    fn projection_follows_requested_header_order() {
        let row = ExampleRow::new(["a", "b"], ["1", "2"]);
        let projected = row.project(&["b".to_string(), "a".to_string()]);
        assert_eq!(projected.to_string(), "{b: 2, a: 1}");
    }

    #[test]
    fn rows_serialize_as_ordered_maps() {
        let row = ExampleRow::new(["z", "a"], ["26", "1"]);
        let json = match serde_json::to_string(&row) {
            Ok(json) => json,
            Err(error) => panic!("row should serialize: {error}"),
        };
        assert_eq!(json, r#"{"z":"26","a":"1"}"#);
    }
}
