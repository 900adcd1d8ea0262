// Delimited-text ingestion

use crate::config::{ReadOptions, Source};
use crate::data::Table;
use crate::error::PlotError;
use anyhow::{Context, Result};
use log::debug;
use std::fs::File;
use std::io::{self, Read};

/// Read every source, suffix names if requested, merge side by side and
/// resolve duplicate column names.
pub fn read_sources(sources: &[Source], options: &ReadOptions) -> Result<Table> {
    let mut tables = Vec::with_capacity(sources.len());
    for source in sources {
        let mut table = read_source(source, options)?;
        if options.suffix_names {
            table.add_suffix(&format!(" {}", source.display_name()));
        }
        debug!(
            "table from {}:\n{}",
            source.display_name(),
            table.head(5)
        );
        tables.push(table);
    }

    let mut merged = Table::concat_columns(tables);
    debug!("merged table:\n{}", merged.head(5));
    merged.dedup_names();
    debug!("renamed columns: {:?}", merged.names());
    Ok(merged)
}

fn read_source(source: &Source, options: &ReadOptions) -> Result<Table> {
    match source {
        Source::Stdin => read_table(io::stdin().lock(), &source.display_name(), options),
        Source::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_table(file, &source.display_name(), options)
        }
    }
}

/// Parse one delimited source into a table. The first record is the header.
pub fn read_table<R: Read>(reader: R, name: &str, options: &ReadOptions) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.separator)
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let ingest_err = |e: csv::Error| PlotError::Ingest {
        source_name: name.to_string(),
        message: e.to_string(),
    };

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(ingest_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(PlotError::Ingest {
            source_name: name.to_string(),
            message: "no header row".to_string(),
        }
        .into());
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        if options.nrows.is_some_and(|n| rows.len() >= n) {
            break;
        }
        let record = record.map_err(ingest_err)?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(Table::from_rows(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn read(text: &str, options: &ReadOptions) -> Result<Table> {
        read_table(text.as_bytes(), "test", options)
    }

    #[test]
    fn test_read_simple_csv() {
        let table = read("x,y\n0,1\n1,2\n", &ReadOptions::default()).unwrap();
        assert_eq!(table.names(), vec!["x", "y"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[1].values[1], Value::Number(2.0));
    }

    #[test]
    fn test_read_custom_separator_and_row_cap() {
        let options = ReadOptions {
            separator: b';',
            nrows: Some(2),
            suffix_names: false,
        };
        let table = read("a;b\n1;2\n3;4\n5;6\n", &options).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[0].values[1], Value::Number(3.0));
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let err = read("a,b\n1,2\n3\n", &ReadOptions::default()).unwrap_err();
        let plot_err = err.downcast_ref::<PlotError>().unwrap();
        assert!(matches!(plot_err, PlotError::Ingest { .. }));
    }

    #[test]
    fn test_read_sources_suffixes_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "x,y\n1,2\n").unwrap();
        std::fs::write(&b, "x,y\n1,3\n").unwrap();
        let sources = vec![Source::File(a), Source::File(b)];

        let plain = read_sources(&sources, &ReadOptions::default()).unwrap();
        assert_eq!(plain.names(), vec!["x", "y", "x_1", "y_1"]);

        let options = ReadOptions {
            suffix_names: true,
            ..ReadOptions::default()
        };
        let suffixed = read_sources(&sources, &options).unwrap();
        assert_eq!(suffixed.names(), vec!["x a.csv", "y a.csv", "x b.csv", "y b.csv"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let sources = vec![Source::File("/definitely/not/here.csv".into())];
        assert!(read_sources(&sources, &ReadOptions::default()).is_err());
    }
}
