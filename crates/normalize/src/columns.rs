use crate::scorer::Scorer;
use cardgrid_sheet::Column;

/// Trim a raw header cell; blank and placeholder labels have no name
pub fn clean_label(raw: &str, scorer: &Scorer) -> Option<String> {
    let label = raw.trim();
    if label.is_empty() || scorer.is_placeholder(label) {
        None
    } else {
        Some(label.to_string())
    }
}

/// Turn a raw header row into columns.
///
/// Every cell yields a column. Cells without a usable label are named after
/// their position in `row`, so the name does not depend on which other
/// columns survive. Identical labels are kept as they are.
pub fn clean_header_row<S: AsRef<str>>(row: &[S], scorer: &Scorer) -> Vec<Column> {
    row.iter()
        .enumerate()
        .map(|(position, raw)| match clean_label(raw.as_ref(), scorer) {
            Some(name) => Column::named(name, position),
            None => Column::generated(position),
        })
        .collect()
}

/// Values of `row` at the given source positions; missing cells are blank
pub fn project(row: &[String], positions: &[usize]) -> Vec<String> {
    positions
        .iter()
        .map(|&p| row.get(p).cloned().unwrap_or_default())
        .collect()
}

/// Drop generated-name columns that hold no data in any row.
///
/// `rows` are aligned with `columns`. A column that only exists because its
/// header cell was blank is noise unless some row fills it.
pub fn drop_empty_generated(
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
) -> (Vec<Column>, Vec<Vec<String>>) {
    let keep: Vec<bool> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            !column.generated
                || rows
                    .iter()
                    .any(|row| row.get(i).is_some_and(|v| !v.trim().is_empty()))
        })
        .collect();

    if keep.iter().all(|k| *k) {
        return (columns, rows);
    }

    let dropped = keep.iter().filter(|k| !**k).count();
    tracing::debug!(dropped, "dropped empty unnamed columns");

    let columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(column, k)| k.then_some(column))
        .collect();
    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(value, k)| k.then_some(value))
                .collect()
        })
        .collect();

    (columns, rows)
}
