use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::history::diff::AnnotatedRecord;
use crate::metrics::FIELDS;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print a user-facing notice for empty-result conditions.
pub fn notice(message: &str) {
    println!("{}", message.yellow());
}

/// Print rows as a JSON array in display-field order. Annotated cells keep
/// their delta text; closed rows carry a Status field.
pub fn print_json(rows: &[AnnotatedRecord]) -> Result<(), ReportError> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Print rows as an aligned table. The Status column appears only when at
/// least one row is marked closed.
pub fn print_table(rows: &[AnnotatedRecord]) {
    if rows.is_empty() {
        println!("{}", "No PRs found matching criteria".red());
        return;
    }

    let show_status = rows.iter().any(|r| r.is_closed());
    let mut headers: Vec<&str> = FIELDS.to_vec();
    if show_status {
        headers.push("Status");
    }

    let cells: Vec<Vec<TableCell>> = rows.iter().map(|row| table_cells(row, show_status)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.text.len());
        }
    }
    debug!(rows = rows.len(), columns = headers.len(), "rendering table");

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{:<width$}", header).magenta().bold().to_string())
        .collect::<Vec<_>>()
        .join("  ");
    println!("{header_line}");
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));

    for row in &cells {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| cell.painted(*width))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }
}

enum CellStyle {
    Plain,
    Increase,
    Decrease,
    Closed,
}

struct TableCell {
    text: String,
    style: CellStyle,
}

impl TableCell {
    fn plain(text: String) -> Self {
        Self {
            text,
            style: CellStyle::Plain,
        }
    }

    fn numeric(cell: &crate::history::diff::Cell) -> Self {
        let style = match cell.delta() {
            Some(delta) if delta > 0 => CellStyle::Increase,
            Some(_) => CellStyle::Decrease,
            None => CellStyle::Plain,
        };
        Self {
            text: cell.to_string(),
            style,
        }
    }

    /// Pad to the column width first, then color, so ANSI escapes don't
    /// skew the alignment math.
    fn painted(&self, width: usize) -> String {
        let padded = format!("{:<width$}", self.text);
        match self.style {
            CellStyle::Plain => padded,
            CellStyle::Increase => padded.green().to_string(),
            CellStyle::Decrease => padded.red().to_string(),
            CellStyle::Closed => padded.yellow().bold().to_string(),
        }
    }
}

fn table_cells(row: &AnnotatedRecord, show_status: bool) -> Vec<TableCell> {
    let mut cells = vec![
        TableCell::plain(row.number.to_string()),
        TableCell::plain(row.title.clone()),
        TableCell::numeric(&row.days_open),
        TableCell::numeric(&row.files_changed),
        TableCell::numeric(&row.commits),
        TableCell::plain(row.file_types.clone()),
        TableCell::numeric(&row.comments),
    ];
    if show_status {
        let status = row.status.clone().unwrap_or_default();
        cells.push(TableCell {
            text: status,
            style: if row.is_closed() {
                CellStyle::Closed
            } else {
                CellStyle::Plain
            },
        });
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::diff;
    use crate::metrics::MetricsRecord;

    fn record(number: u64, comments: u64) -> MetricsRecord {
        MetricsRecord {
            number,
            title: format!("PR {number}"),
            days_open: 3,
            files_changed: 2,
            commits: 1,
            file_types: "rs".to_string(),
            comments,
        }
    }

    #[test]
    fn test_table_cells_without_status_column() {
        let rows = diff::diff(&[record(1, 2)], &[]);
        let cells = table_cells(&rows[0], false);
        assert_eq!(cells.len(), FIELDS.len());
        assert_eq!(cells[0].text, "1");
        assert_eq!(cells[1].text, "PR 1");
        assert_eq!(cells[6].text, "2");
    }

    #[test]
    fn test_table_cells_include_delta_text() {
        let rows = diff::diff(&[record(1, 5)], &[record(1, 2)]);
        let cells = table_cells(&rows[0], false);
        assert_eq!(cells[6].text, "5 (+3)");
        assert!(matches!(cells[6].style, CellStyle::Increase));
    }

    #[test]
    fn test_closed_row_gets_status_cell() {
        let rows = diff::diff(&[], &[record(4, 0)]);
        let cells = table_cells(&rows[0], true);
        assert_eq!(cells.len(), FIELDS.len() + 1);
        assert_eq!(cells.last().unwrap().text, "CLOSED");
    }

    #[test]
    fn test_padding_applied_before_color() {
        let cell = TableCell {
            text: "5".to_string(),
            style: CellStyle::Plain,
        };
        assert_eq!(cell.painted(4), "5   ");
    }

    #[test]
    fn test_print_table_does_not_panic() {
        let rows = diff::diff(&[record(1, 5)], &[record(1, 2), record(2, 0)]);
        print_table(&rows);
        print_table(&[]);
    }

    #[test]
    fn test_print_json_shape() {
        let rows = diff::diff(&[record(1, 5)], &[record(1, 2)]);
        // Round-trip through serde_json to check the printed shape
        let value = serde_json::to_value(&rows).unwrap();
        assert_eq!(value[0]["PR #"], serde_json::json!(1));
        assert_eq!(value[0]["Comments"], serde_json::json!("5 (+3)"));
        print_json(&rows).unwrap();
    }
}
