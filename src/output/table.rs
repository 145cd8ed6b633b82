//! Plain-text table rendering

use crate::warehouse::ResultSet;

/// Text shown for SQL NULL
pub const NULL_TEXT: &str = "NULL";

/// Render rows as an ASCII grid
///
/// ```text
/// +-------+-----------+
/// | level | num_users |
/// +-------+-----------+
/// | free  | 2         |
/// +-------+-----------+
/// ```
pub fn render_table(result: &ResultSet) -> String {
    let cells: Vec<Vec<&str>> = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.as_deref().unwrap_or(NULL_TEXT))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let border = widths.iter().fold(String::from("+"), |mut acc, w| {
        acc.push_str(&"-".repeat(w + 2));
        acc.push('+');
        acc
    });

    let line = |values: &[&str]| {
        widths
            .iter()
            .enumerate()
            .fold(String::from("|"), |mut acc, (i, w)| {
                let value = values.get(i).copied().unwrap_or_default();
                let pad = w - value.chars().count();
                acc.push(' ');
                acc.push_str(value);
                acc.push_str(&" ".repeat(pad + 1));
                acc.push('|');
                acc
            })
    };

    let header: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    let mut out = vec![border.clone(), line(&header), border.clone()];
    out.extend(cells.iter().map(|row| line(row)));
    if !cells.is_empty() {
        out.push(border);
    }
    out.join("\n")
}

/// Render label/value pairs as an aligned two-column list
pub fn render_pairs(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
