// ============================================================
// DATASET
// ============================================================
// In-memory table produced by the tabular loader

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::error::{AppError, Result};

/// Ordered rows sharing one column set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    /// Column names in file order, unique
    columns: Vec<String>,

    /// Row values, each exactly `columns.len()` long
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// A dataset with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset from a header and its records.
    ///
    /// Short records are padded with empty cells so every row carries the
    /// full column set. A record longer than the header is rejected.
    /// Repeated header names get `.1`, `.2`, ... suffixes.
    pub fn from_records<H, S, R, F, V>(headers: H, records: R) -> Result<Self>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = F>,
        F: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let columns = dedupe_headers(headers.into_iter().map(Into::into).collect());
        let width = columns.len();

        let mut rows = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let mut values: Vec<String> = record.into_iter().map(Into::into).collect();
            if values.len() > width {
                return Err(AppError::ParseError(format!(
                    "Row {} has {} fields, expected at most {}",
                    index + 1,
                    values.len(),
                    width
                )));
            }
            values.resize(width, String::new());
            rows.push(values);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<DatasetRow<'_>> {
        self.rows.get(index).map(|values| DatasetRow {
            dataset: self,
            index,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = DatasetRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, values)| DatasetRow {
                dataset: self,
                index,
                values,
            })
    }

    /// First row whose trimmed `column` value equals the trimmed `value`
    pub fn find_row(&self, column: &str, value: &str) -> Option<DatasetRow<'_>> {
        let wanted = value.trim();
        self.rows()
            .find(|row| row.get(column).map(str::trim) == Some(wanted))
    }

    /// Distinct non-blank trimmed values of `column`, in first-seen order
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows()
            .filter_map(|row| row.get(column))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .filter(|value| seen.insert(value.to_string()))
            .map(str::to_string)
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Borrowed view of one dataset row
#[derive(Debug, Clone, Copy)]
pub struct DatasetRow<'a> {
    dataset: &'a Dataset,
    index: usize,
    values: &'a [String],
}

impl<'a> DatasetRow<'a> {
    /// Row index (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw cell value, `None` only when the column does not exist
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.dataset
            .column_index(column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(headers.len());

    for header in headers {
        if taken.insert(header.clone()) {
            columns.push(header);
            continue;
        }

        let counter = counters.entry(header.clone()).or_insert(0);
        let renamed = loop {
            *counter += 1;
            let candidate = format!("{}.{}", header, counter);
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(renamed.clone());
        columns.push(renamed);
    }

    columns
}
