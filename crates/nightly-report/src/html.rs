//! HTML report rendering.
//!
//! This module provides the [`HtmlGenerator`] struct for converting a
//! [`StatusReport`] into an HTML fragment with one heading per slot and a
//! collapsible `<details>` block per date. Result cells are color coded:
//! green for all-zero counters, orange for warnings, red for build errors
//! or failed tests, grey for unusable data.

use std::fmt::Write;

use crate::{BuildTable, DayOutcome, StatusReport, DATE_FORMAT};

/// Generates HTML reports.
///
/// The generator needs the nightly site base URL so every resolved build can
/// link back to its page, e.g. `<base_url>/<slot>/<build_id>/`.
pub struct HtmlGenerator<'a> {
    report: &'a StatusReport,
    base_url: &'a str,
}

impl<'a> HtmlGenerator<'a> {
    /// Creates a new HTML generator for the given report and site base URL.
    #[must_use]
    pub const fn new(report: &'a StatusReport, base_url: &'a str) -> Self {
        Self { report, base_url }
    }

    /// Generates the complete HTML fragment.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        for section in &self.report.slots {
            let _ = writeln!(
                output,
                "<h4 class='part'>{}</h4>",
                escape_html(&section.slot)
            );
            for day in &section.days {
                let date = day.date.format(DATE_FORMAT);
                match &day.outcome {
                    DayOutcome::Build(table) => self.write_build(&mut output, &section.slot, &date.to_string(), table),
                    DayOutcome::Unavailable => {
                        let _ = writeln!(
                            output,
                            "<details><summary>{date}/(No build)</summary>No build available for this day.</details>"
                        );
                    }
                }
            }
        }

        output
    }

    /// Writes one collapsible block for a resolved build.
    fn write_build(&self, output: &mut String, slot: &str, date: &str, table: &BuildTable) {
        let slot_esc = escape_html(slot);
        let base = self.base_url.trim_end_matches('/');
        let _ = write!(
            output,
            "<details><summary>{date}/{}</summary>link to <a href=\"{base}/{slot_esc}/{}/\">{slot_esc}/{}</a></br>",
            table.build_id, table.build_id, table.build_id
        );
        write_table(output, table);
        let _ = writeln!(output, "</details>");
    }
}

/// Writes one build table with color-coded cells.
fn write_table(output: &mut String, table: &BuildTable) {
    output.push_str("<table><thead><tr><th>Project</th><th>Failed MRs</th>");
    for column in &table.columns {
        let _ = write!(
            output,
            "<th>{}<br>BUILD / TEST</th>",
            escape_html(&column.label)
        );
    }
    output.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        let _ = write!(
            output,
            "<tr><td>{}</td><td>{}</td>",
            escape_html(&row.project),
            escape_html(&row.failed_mrs_label())
        );
        for cell in &row.cells {
            let _ = write!(
                output,
                "<td style=\"background-color:{}\">{}</td>",
                cell.severity().background_color(),
                escape_html(&cell.label())
            );
        }
        output.push_str("</tr>");
    }

    output.push_str("</tbody></table>");
}

/// Escapes text for safe interpolation into HTML.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{
        AggregateTotals, BuildCounts, DayEntry, PlatformColumn, ProjectRow, ResultCell,
        SlotSection, TestCounts,
    };
    use chrono::NaiveDate;

    fn sample_report() -> StatusReport {
        StatusReport {
            slots: vec![SlotSection {
                slot: "lhcb-sim10".to_string(),
                days: vec![
                    DayEntry {
                        date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
                        outcome: DayOutcome::Unavailable,
                    },
                    DayEntry {
                        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                        outcome: DayOutcome::Build(BuildTable {
                            build_id: 500,
                            columns: vec![PlatformColumn::new(
                                "x86_64_v2-el9-gcc12-opt",
                                "x86_64_v2-el9-gcc12-opt",
                            )],
                            rows: vec![
                                ProjectRow {
                                    project: "Gauss".to_string(),
                                    failed_mrs: vec![],
                                    cells: vec![ResultCell {
                                        build: BuildCounts::Known {
                                            warnings: 0,
                                            errors: 1,
                                        },
                                        tests: TestCounts::Known {
                                            passed: 4,
                                            failed: 0,
                                        },
                                    }],
                                },
                                ProjectRow {
                                    project: "LHCb".to_string(),
                                    failed_mrs: vec![],
                                    cells: vec![ResultCell::unknown()],
                                },
                            ],
                        }),
                    },
                ],
            }],
            totals: AggregateTotals::new(),
        }
    }

    #[test]
    fn test_generate_structure() {
        let report = sample_report();
        let html = HtmlGenerator::new(&report, "https://nightlies.example/nightly/").generate();

        assert!(html.contains("<h4 class='part'>lhcb-sim10</h4>"));
        assert!(html.contains("<details><summary>2024-01-09/(No build)</summary>"));
        assert!(html.contains("<details><summary>2024-01-10/500</summary>"));
        assert!(html.contains("href=\"https://nightlies.example/nightly/lhcb-sim10/500/\""));
    }

    #[test]
    fn test_cell_colors() {
        let report = sample_report();
        let html = HtmlGenerator::new(&report, "https://nightlies.example/nightly").generate();

        // One build error -> red; unknown cell -> grey.
        assert!(html.contains("background-color:#ffcccc"));
        assert!(html.contains("background-color:#e6e6e6"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
