//! Plain-text rendering of a dashboard view for the `report` command.

use crate::dashboard::{DashboardView, SectionBody};
use std::fmt::Write;

/// Sections, notices and every chart's table as aligned text.
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", view.kind.title());

    for section in &view.sections {
        let _ = writeln!(out, "\n## {}", section.title);
        if let Some(warning) = &section.warning {
            let _ = writeln!(out, "! {warning}");
        }
        match &section.body {
            SectionBody::Notice(message) => {
                let _ = writeln!(out, "{message}");
            }
            SectionBody::Charts(charts) => {
                for chart in charts {
                    let _ = writeln!(out, "\n### {}", chart.title);
                    let (header, body) = chart.table().to_rows(&chart.y_label);
                    out.push_str(&format_table(&header, &body));
                }
            }
        }
    }
    out
}

/// Left-aligned first column, right-aligned numbers.
pub fn format_table(header: &[String], body: &[Vec<String>]) -> String {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in body {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .take(columns)
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{:<w$}", cell, w = widths[i])
                } else {
                    format!("{:>w$}", cell, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(header));
    out.push('\n');
    for row in body {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardKind;
    use crate::data::{FilterSelection, TidyRecord, TidySet};
    use chrono::NaiveDate;

    #[test]
    fn test_format_table_alignment() {
        let header = vec!["Year".to_string(), "Winter".to_string()];
        let body = vec![
            vec!["2021".to_string(), "5".to_string()],
            vec!["2022".to_string(), "150".to_string()],
        ];
        assert_eq!(
            format_table(&header, &body),
            "Year  Winter\n2021       5\n2022     150\n"
        );
    }

    #[test]
    fn test_render_text_includes_notices() {
        let set = TidySet::new(vec![TidyRecord::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            "LA",
            10.0,
        )]);
        let filter = FilterSelection::all(&set).with_categories(Vec::<String>::new());
        let text = render_text(&DashboardView::build(DashboardKind::Port, &set, &filter));

        assert!(text.starts_with("# US Ports Activity Dashboard"));
        assert!(text.contains("Please select at least one port for seasonal analysis."));
        assert!(text.contains("### Monthly Container Throughput for All Ports"));
    }
}
