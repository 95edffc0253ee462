use crate::error::Error;
use ahash::{AHashMap, AHashSet};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';

/// In-memory table of string cells. Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Result of deduplicating a table on a key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// Number of rows dropped because their key had already been seen.
    Removed(usize),
    /// The key column does not exist; the table was left untouched.
    MissingKeyColumn,
}

impl DedupOutcome {
    pub fn removed(&self) -> usize {
        match self {
            DedupOutcome::Removed(count) => *count,
            DedupOutcome::MissingKeyColumn => 0,
        }
    }
}

impl Table {
    /// Builds a table from a header and rows. Rows narrower than the header are
    /// padded with empty cells, wider rows are cut to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::parse(path, e))?;
        Self::from_reader(path, BufReader::new(file))
    }

    /// Parses comma separated text whose first record is the header.
    ///
    /// `source` is only used to label errors.
    pub fn from_reader<R: Read>(source: &Path, reader: R) -> Result<Self, Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().map_err(|e| Error::parse(source, e))?.clone();
        if headers.is_empty() {
            return Err(Error::parse(source, "no columns to parse from file"));
        }
        let columns = unique_column_names(&headers);
        let width = columns.len();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| Error::parse(source, e))?;
            if is_blank_line(&record) {
                continue;
            }
            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(Error::parse(
                    source,
                    format!(
                        "expected {} fields on line {}, saw {}",
                        width,
                        line,
                        record.len()
                    ),
                ));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        debug!(
            "Loaded {} rows, {} columns from {}",
            rows.len(),
            width,
            source.display()
        );

        Ok(Self { columns, rows })
    }

    /// Stacks tables in order. The merged header is the union of all headers
    /// in order of first appearance; cells for columns a table lacks are empty.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Table>,
    {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut index: AHashMap<String, usize> = AHashMap::new();
        for table in &tables {
            for column in &table.columns {
                if !index.contains_key(column) {
                    index.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let width = columns.len();
        let total: usize = tables.iter().map(Table::len).sum();
        let mut rows = Vec::with_capacity(total);

        for table in tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| index[c]).collect();
            for row in table.rows {
                let mut merged = vec![String::new(); width];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    merged[target] = cell;
                }
                rows.push(merged);
            }
        }

        Self { columns, rows }
    }

    /// Keeps the first row for every distinct value of `key`, preserving order.
    /// Blank values are compared like any other value.
    pub fn dedup_by_column(&mut self, key: &str) -> DedupOutcome {
        let Some(key_idx) = self.column_index(key) else {
            return DedupOutcome::MissingKeyColumn;
        };

        let before = self.rows.len();
        let mut seen: AHashSet<String> = AHashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row[key_idx].clone()));

        DedupOutcome::Removed(before - self.rows.len())
    }

    /// Writes the header followed by every row. No index column is emitted.
    pub fn write_records<W: io::Write>(&self, wtr: &mut Writer<W>) -> csv::Result<()> {
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A line holding nothing but spaces or tabs. `,,` is a row of empty cells, not blank.
fn is_blank_line(record: &StringRecord) -> bool {
    record.len() == 1
        && !record[0].is_empty()
        && record[0].trim_matches(|c| c == ' ' || c == '\t').is_empty()
}

/// Repeated header names get a numeric suffix: `A`, `A.1`, `A.2`.
fn unique_column_names(headers: &StringRecord) -> Vec<String> {
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut suffixes: AHashMap<String, usize> = AHashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (i, header) in headers.iter().enumerate() {
        let header = if i == 0 {
            header.trim_start_matches(UTF8_BOM)
        } else {
            header
        };

        let mut name = header.to_string();
        if seen.contains(&name) {
            let counter = suffixes.entry(header.to_string()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}.{}", header, counter);
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
            }
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}
