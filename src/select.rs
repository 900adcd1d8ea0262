// Column selection: resolve the user's column intent into concrete tables

use crate::config::ColumnIntent;
use crate::data::Table;
use crate::error::PlotError;
use log::debug;
use std::collections::HashSet;

/// Indices of the requested names, compared after trimming whitespace
pub fn resolve_names(requested: &[String], table: &Table) -> Result<Vec<usize>, PlotError> {
    debug!("requested columns: {:?}", requested);
    let colnames: Vec<&str> = table.columns.iter().map(|c| c.name.trim()).collect();
    debug!("actual columns: {:?}", colnames);

    requested
        .iter()
        .map(|name| {
            colnames
                .iter()
                .position(|c| *c == name.trim())
                .ok_or_else(|| {
                    PlotError::selection(format!(
                        "column name {} not found, input columns were: {}",
                        name,
                        colnames.join(",")
                    ))
                })
        })
        .collect()
}

/// Turn an intent into raw column indices (x not yet forced first)
pub fn resolve_intent(intent: &ColumnIntent, table: &Table) -> Result<Vec<usize>, PlotError> {
    match intent {
        ColumnIntent::All => Ok((0..table.column_count()).collect()),
        ColumnIntent::Names(names) => resolve_names(names, table),
        ColumnIntent::Indices(indices) => Ok(indices.clone()),
    }
}

/// Put `xcol` first and drop any other occurrence of it
pub fn x_first(cols: &[usize], xcol: usize) -> Vec<usize> {
    std::iter::once(xcol)
        .chain(cols.iter().copied().filter(|&c| c != xcol))
        .collect()
}

/// Build the sub-table for one axis. The x column always comes first.
pub fn extract(cols: &[usize], xcol: usize, table: &Table, axis: &str) -> Result<Table, PlotError> {
    debug!("{} axis columns: {:?}", axis, cols);
    let available = table.column_count();
    if let Some(&max) = cols.iter().chain(std::iter::once(&xcol)).max() {
        if max >= available {
            return Err(PlotError::selection(format!(
                "Column {} too large: input only has {} columns",
                max, available
            )));
        }
    }

    let final_cols = x_first(cols, xcol);
    debug!("{} final columns: {:?}", axis, final_cols);
    let pruned = table.select(&final_cols);
    debug!("pruned {} table:\n{}", axis, pruned.head(5));
    Ok(pruned)
}

/// Split the merged table into the primary and optional secondary tables.
///
/// When the primary selection is the default (every column) and a secondary
/// axis is requested, columns claimed by the secondary axis are left off the
/// primary one. An explicit overlap is rejected.
pub fn split_axes(
    table: &Table,
    xcol: usize,
    primary: &ColumnIntent,
    secondary: Option<&ColumnIntent>,
) -> Result<(Table, Option<Table>), PlotError> {
    let secondary_cols = secondary
        .map(|intent| resolve_intent(intent, table))
        .transpose()?;
    let mut primary_cols = resolve_intent(primary, table)?;

    if let Some(sec) = &secondary_cols {
        let claimed: HashSet<usize> = sec.iter().copied().filter(|&c| c != xcol).collect();
        if *primary == ColumnIntent::All {
            primary_cols.retain(|c| !claimed.contains(c));
        } else if let Some(c) = primary_cols.iter().find(|c| claimed.contains(c)) {
            return Err(PlotError::selection(format!(
                "column {} is selected for both the primary and the secondary axis",
                c
            )));
        }
    }

    let secondary_table = secondary_cols
        .map(|cols| extract(&cols, xcol, table, "secondary"))
        .transpose()?;
    let primary_table = extract(&primary_cols, xcol, table, "primary")?;
    Ok((primary_table, secondary_table))
}

/// Replace the names of the non-x columns with `labels`, one for one
pub fn apply_labels(table: &mut Table, labels: &[String]) -> Result<(), PlotError> {
    let series = table.column_count().saturating_sub(1);
    if labels.len() != series {
        return Err(PlotError::config(format!(
            "number of column labels {} not equal to the number of selected columns {}",
            labels.len(),
            series
        )));
    }
    for (column, label) in table.columns.iter_mut().skip(1).zip(labels) {
        column.name = label.clone();
    }
    Ok(())
}

/// Duplicate names break grouping and the legend, so they are fatal
pub fn check_duplicates(table: &Table) -> Result<(), PlotError> {
    let mut seen = HashSet::new();
    let dupes: Vec<&str> = table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| !seen.insert(*name))
        .collect();
    if dupes.is_empty() {
        Ok(())
    } else {
        Err(PlotError::config(format!(
            "Duplicate columns after merge and pruning, consider --suffix-names {:?}",
            dupes
        )))
    }
}
