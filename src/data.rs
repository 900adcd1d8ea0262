use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single cell. Empty cells are `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Classify raw cell text: numbers parse as `f64`, blanks are missing
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Missing
        } else if let Ok(n) = trimmed.parse::<f64>() {
            Value::Number(n)
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// True when every present cell is numeric
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .all(|v| matches!(v, Value::Number(_) | Value::Missing))
    }
}

/// Column-oriented table. All columns share `row_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        let mut table = Self { columns };
        table.pad_to_longest();
        table
    }

    /// Build a table from a header row and string rows
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let values = rows
                    .iter()
                    .map(|row| row.get(i).map_or(Value::Missing, |s| Value::parse(s)))
                    .collect();
                Column::new(name, values)
            })
            .collect();
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn add_suffix(&mut self, suffix: &str) {
        for column in &mut self.columns {
            column.name.push_str(suffix);
        }
    }

    /// Side-by-side concatenation; shorter tables are padded with missing cells
    pub fn concat_columns(tables: Vec<Table>) -> Table {
        let columns = tables.into_iter().flat_map(|t| t.columns).collect();
        Table::new(columns)
    }

    /// New table holding clones of the columns at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
        }
    }

    /// Apply `ColumnRenamer` over the full, ordered name sequence
    pub fn dedup_names(&mut self) {
        let mut renamer = ColumnRenamer::new();
        for column in &mut self.columns {
            column.name = renamer.rename(&column.name);
        }
    }

    /// Tab separated preview of the first `n` rows, for debug logging
    pub fn head(&self, n: usize) -> String {
        let mut out = self.names().join("\t");
        for row in 0..self.row_count().min(n) {
            out.push('\n');
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.values[row].to_string())
                .collect();
            out.push_str(&cells.join("\t"));
        }
        out
    }

    fn pad_to_longest(&mut self) {
        let longest = self
            .columns
            .iter()
            .map(|c| c.values.len())
            .max()
            .unwrap_or(0);
        for column in &mut self.columns {
            column.values.resize(longest, Value::Missing);
        }
    }
}

/// Renames repeated column names: the first occurrence stays as-is, later
/// ones get `_1`, `_2`, ... in the order they are seen. A suffixed name that
/// is already taken is skipped, so every emitted name is unique.
#[derive(Debug, Default)]
pub struct ColumnRenamer {
    /// Last suffix handed out per original name
    seen: HashMap<String, usize>,
    emitted: HashSet<String>,
}

impl ColumnRenamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(&mut self, name: &str) -> String {
        let renamed = if self.emitted.contains(name) {
            let count = self.seen.entry(name.to_string()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{}_{}", name, count);
                if !self.emitted.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            self.seen.entry(name.to_string()).or_insert(0);
            name.to_string()
        };
        self.emitted.insert(renamed.clone());
        renamed
    }
}
