//! Plain-text rendering for terminals.

use super::cards::{Card, CardBody, Table};
use super::Report;

pub fn render(report: &Report) -> String {
    let mut out = String::new();

    if let Some(image) = &report.annotated_image {
        out.push_str(&format!("{}: {}\n\n", image.alt, image.src));
    }

    for card in &report.cards {
        match card {
            Card::Results { title, body } => {
                out.push_str(title);
                out.push('\n');
                out.push_str(&"=".repeat(title.chars().count()));
                out.push('\n');
                match body {
                    CardBody::Text(text) => {
                        out.push_str(text);
                        out.push('\n');
                    }
                    CardBody::Table(table) => out.push_str(&render_table(table)),
                }
            }
            Card::Error { message } => {
                out.push_str("[!] ");
                out.push_str(message);
                out.push('\n');
            }
        }
        out.push('\n');
    }

    out
}

fn render_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table.rows.iter().map(|r| r.cells().to_vec()).collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = format_line(&table.headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(&rule, &widths));
    for row in &rows {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
