use crate::data::{Column, Table, Value};
use crate::error::PlotError;
use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;
use std::cmp::Ordering;
use std::collections::HashMap;

const AGGREGATES: [&str; 3] = ["min", "median", "max"];

/// Group rows by the first column's distinct values. Every other column is
/// replaced by `<col> (min)`, `<col> (median)` and `<col> (max)`; the group
/// key stays as an explicit first column. Rows with a missing key are dropped.
pub fn group_by_first(table: &Table) -> Result<Table, PlotError> {
    let Some(key_column) = table.columns.first() else {
        return Ok(table.clone());
    };
    debug!("before grouping:\n{}", table.head(10));

    // Distinct keys in first-seen order, each with its row indices
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
    for (row, key) in key_column.values.iter().enumerate() {
        if key.is_missing() {
            continue;
        }
        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            groups.push((key.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    sort_group_keys(&mut groups);

    let mut columns = vec![Column::new(
        key_column.name.clone(),
        groups.iter().map(|(key, _)| key.clone()).collect(),
    )];

    for column in table.columns.iter().skip(1) {
        let mut aggregated: [Vec<Value>; 3] = Default::default();
        for (_, rows) in &groups {
            let mut ys = Vec::with_capacity(rows.len());
            for &row in rows {
                match &column.values[row] {
                    Value::Number(n) if !n.is_nan() => ys.push(*n),
                    Value::Number(_) | Value::Missing => {}
                    Value::Text(t) => {
                        return Err(PlotError::config(format!(
                            "cannot aggregate non-numeric value '{}' in column '{}'",
                            t, column.name
                        )))
                    }
                }
            }
            ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let stats = match (ys.first(), median(&ys), ys.last()) {
                (Some(&min), Some(mid), Some(&max)) => [
                    Value::Number(min),
                    Value::Number(mid),
                    Value::Number(max),
                ],
                _ => [Value::Missing, Value::Missing, Value::Missing],
            };
            for (out, stat) in aggregated.iter_mut().zip(stats) {
                out.push(stat);
            }
        }
        for (agg, values) in AGGREGATES.iter().zip(aggregated) {
            columns.push(Column::new(format!("{} ({})", column.name, agg), values));
        }
    }

    let grouped = Table::new(columns);
    debug!("after grouping:\n{}", grouped.head(10));
    Ok(grouped)
}

/// Numeric keys sort numerically; otherwise keys sort by their text
fn sort_group_keys(groups: &mut [(Value, Vec<usize>)]) {
    let all_numeric = groups.iter().all(|(k, _)| k.as_f64().is_some());
    if all_numeric {
        groups.sort_by(|(a, _), (b, _)| {
            let fa = a.as_f64().unwrap_or(f64::NAN);
            let fb = b.as_f64().unwrap_or(f64::NAN);
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        });
    } else {
        groups.sort_by_key(|(k, _)| k.to_string());
    }
}

/// Median of already sorted values, averaging the middle pair for even counts
fn median(sorted: &[f64]) -> Option<f64> {
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[mid]),
        _ => Some((sorted[mid - 1] + sorted[mid]) / 2.0),
    }
}

/// Add gaussian noise with standard deviation
/// `multiplier * (max - min) / len` to every value. Empty input is returned
/// unchanged. Output depends only on the input and the RNG state.
pub fn jitter<R: Rng>(values: &[f64], multiplier: f64, rng: &mut R) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let stdev = multiplier * (max - min) / values.len() as f64;
    values
        .iter()
        .map(|v| {
            let noise: f64 = rng.sample(StandardNormal);
            v + noise * stdev
        })
        .collect()
}

/// Jitter the x column (the first column) of `table` in place
pub fn jitter_x<R: Rng>(
    table: &mut Table,
    multiplier: f64,
    rng: &mut R,
) -> Result<(), PlotError> {
    let Some(x) = table.columns.first_mut() else {
        return Ok(());
    };
    if !x.is_numeric() {
        return Err(PlotError::config(format!(
            "--jitter needs a numeric x column, '{}' is not numeric",
            x.name
        )));
    }

    let present: Vec<f64> = x.values.iter().filter_map(Value::as_f64).collect();
    let mut jittered = jitter(&present, multiplier, rng).into_iter();
    for value in x.values.iter_mut() {
        if let Value::Number(n) = value {
            if let Some(j) = jittered.next() {
                *n = j;
            }
        }
    }
    debug!("jittered x column '{}' by {}", x.name, multiplier);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_data() -> Table {
        Table::from_rows(
            vec!["k".to_string(), "v".to_string()],
            vec![
                vec!["1".to_string(), "10".to_string()],
                vec!["1".to_string(), "20".to_string()],
                vec!["2".to_string(), "5".to_string()],
            ],
        )
    }

    #[test]
    fn test_grouping_aggregates() {
        let grouped = group_by_first(&make_data()).unwrap();
        assert_eq!(
            grouped.names(),
            vec!["k", "v (min)", "v (median)", "v (max)"]
        );
        assert_eq!(grouped.row_count(), 2);

        let row = |r: usize| -> Vec<f64> {
            grouped.columns.iter().map(|c| c.values[r].as_f64().unwrap()).collect()
        };
        assert_eq!(row(0), vec![1.0, 10.0, 15.0, 20.0]);
        assert_eq!(row(1), vec![2.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_grouping_sorts_numeric_keys() {
        let t = Table::from_rows(
            vec!["k".to_string(), "v".to_string()],
            vec![
                vec!["10".to_string(), "1".to_string()],
                vec!["9".to_string(), "2".to_string()],
                vec!["".to_string(), "3".to_string()],
            ],
        );
        let grouped = group_by_first(&t).unwrap();
        assert_eq!(grouped.columns[0].values, vec![Value::Number(9.0), Value::Number(10.0)]);
    }

    #[test]
    fn test_grouping_rejects_text_values() {
        let t = Table::from_rows(
            vec!["k".to_string(), "v".to_string()],
            vec![vec!["1".to_string(), "abc".to_string()]],
        );
        assert!(group_by_first(&t).is_err());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[1.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_jitter_is_reproducible() {
        let input = vec![0.0, 1.0, 2.0, 3.0, 10.0];
        let a = jitter(&input, 0.1, &mut StdRng::seed_from_u64(123));
        let b = jitter(&input, 0.1, &mut StdRng::seed_from_u64(123));
        assert_eq!(a.len(), input.len());
        let bits = |v: &[f64]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_ne!(a, input);
    }

    #[test]
    fn test_jitter_empty_is_noop() {
        let out = jitter(&[], 0.1, &mut StdRng::seed_from_u64(123));
        assert!(out.is_empty());
    }

    #[test]
    fn test_jitter_constant_column_unchanged() {
        let input = vec![4.0, 4.0, 4.0];
        let out = jitter(&input, 0.5, &mut StdRng::seed_from_u64(1));
        assert_eq!(out, input);
    }

    #[test]
    fn test_jitter_x_requires_numeric() {
        let mut t = Table::from_rows(
            vec!["x".to_string(), "y".to_string()],
            vec![vec!["a".to_string(), "1".to_string()]],
        );
        let mut rng = StdRng::seed_from_u64(123);
        assert!(jitter_x(&mut t, 0.1, &mut rng).is_err());
    }

    #[test]
    fn test_jitter_x_keeps_missing_cells() {
        let mut t = Table::from_rows(
            vec!["x".to_string()],
            vec![vec!["1".to_string()], vec!["".to_string()], vec!["5".to_string()]],
        );
        let mut rng = StdRng::seed_from_u64(123);
        jitter_x(&mut t, 0.1, &mut rng).unwrap();
        assert_eq!(t.columns[0].values[1], Value::Missing);
        assert!(t.columns[0].values[2].as_f64().is_some());
    }
}
