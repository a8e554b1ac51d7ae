//! Plain-text report rendering.
//!
//! This module provides the [`TextGenerator`] struct for converting a
//! [`StatusReport`] into bordered, center-aligned tables suitable for a
//! terminal. Each resolved day renders a `-> slot/date/build_id:` header
//! followed by one table; unresolved days render a one-line notice.

use std::fmt::Write;

use crate::{BuildTable, StatusReport, DATE_FORMAT};

/// Second header line shown under every platform column.
const CHECK_HEADER: &str = "BUILD / TEST";

/// Generates plain-text reports.
pub struct TextGenerator<'a> {
    report: &'a StatusReport,
}

impl<'a> TextGenerator<'a> {
    /// Creates a new text generator for the given report.
    #[must_use]
    pub const fn new(report: &'a StatusReport) -> Self {
        Self { report }
    }

    /// Generates the complete plain-text report.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        for section in &self.report.slots {
            for day in &section.days {
                let date = day.date.format(DATE_FORMAT);
                match &day.outcome {
                    crate::DayOutcome::Build(table) => {
                        let _ = writeln!(output, "-> {}/{date}/{}:", section.slot, table.build_id);
                        output.push_str(&render_table(table));
                    }
                    crate::DayOutcome::Unavailable => {
                        let _ = writeln!(output, "-> {}/{date}: No build available", section.slot);
                    }
                }
            }
        }

        output
    }
}

/// Renders one build table with `+---+` borders and centered cells.
fn render_table(table: &BuildTable) -> String {
    // Two header lines: column labels, then the check-type line under
    // every platform column.
    let mut header_top = vec!["Project".to_string(), "Failed MRs".to_string()];
    let mut header_sub = vec![String::new(), String::new()];
    for column in &table.columns {
        header_top.push(column.label.clone());
        header_sub.push(CHECK_HEADER.to_string());
    }

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.project.clone(), row.failed_mrs_label()];
            cells.extend(row.cells.iter().map(crate::ResultCell::label));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header_top.iter().map(String::len).collect();
    for line in std::iter::once(&header_sub).chain(body.iter()) {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let border = render_border(&widths);
    let mut output = String::new();
    output.push_str(&border);
    output.push_str(&render_line(&header_top, &widths));
    output.push_str(&render_line(&header_sub, &widths));
    output.push_str(&border);
    for line in &body {
        output.push_str(&render_line(line, &widths));
    }
    output.push_str(&border);
    output
}

/// Renders a `+---+---+` separator for the given column widths.
fn render_border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

/// Renders one `| a | b |` row with centered cell text.
fn render_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(&center(cell, *width));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// Centers `text` within `width` columns, biasing left on odd padding.
fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.len());
    let left = padding / 2;
    let right = padding - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}
