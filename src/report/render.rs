//! Renderers for each [`ReportFormat`](super::ReportFormat).
//!
//! Every renderer emits the same content: title, timeframe, generation date,
//! the fixed column header, one row per period, and the polarity footnote.

use super::document::{Report, COLUMNS, POLARITY_NOTE, TITLE};
use std::fmt::Write as _;

pub(super) fn text(report: &Report) -> String {
    let rows = report.rows();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", report.timeframe_line());
    let _ = writeln!(out, "{}", report.generated_line());
    out.push('\n');

    let header: Vec<String> = COLUMNS.iter().map(ToString::to_string).collect();
    push_aligned(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_aligned(&mut out, &rule, &widths);
    for row in &rows {
        push_aligned(&mut out, row, &widths);
    }

    out.push('\n');
    let _ = writeln!(out, "{POLARITY_NOTE}");
    out
}

fn push_aligned(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

pub(super) fn markdown(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {TITLE}");
    out.push('\n');
    let _ = writeln!(out, "{}  ", report.timeframe_line());
    let _ = writeln!(out, "{}", report.generated_line());
    out.push('\n');

    let _ = writeln!(out, "| {} |", COLUMNS.join(" | "));
    let _ = writeln!(out, "|{}|", vec!["---"; COLUMNS.len()].join("|"));
    for row in report.rows() {
        let cells: Vec<String> = row.iter().map(|cell| escape_markdown(cell)).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }

    out.push('\n');
    let _ = writeln!(out, "_{POLARITY_NOTE}_");
    out
}

fn escape_markdown(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\n', '\r'], " ")
}

pub(super) fn csv(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {TITLE}");
    let _ = writeln!(out, "# {}", report.timeframe_line());
    let _ = writeln!(out, "# {}", report.generated_line());

    let header: Vec<String> = COLUMNS.iter().map(ToString::to_string).collect();
    push_csv_row(&mut out, &header);
    for row in report.rows() {
        push_csv_row(&mut out, &row);
    }

    let _ = writeln!(out, "# {POLARITY_NOTE}");
    out
}

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r']) || field.starts_with('#')
}

fn push_csv_row(out: &mut String, row: &[String]) {
    let cells: Vec<String> = row
        .iter()
        .map(|cell| {
            if needs_quotes(cell) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "{}", cells.join(","));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut out = String::new();
        push_csv_row(
            &mut out,
            &[
                "plain".to_string(),
                "a,b".to_string(),
                "say \"hi\"".to_string(),
                "#hash".to_string(),
            ],
        );
        assert_eq!(out, "plain,\"a,b\",\"say \"\"hi\"\"\",\"#hash\"\n");
    }

    #[test]
    fn markdown_cells_escape_pipes() {
        assert_eq!(escape_markdown("a|b\nc"), "a\\|b c");
    }
}
