//! Plain-text rendering of tables, chart series and totals.

use ratatui::style::Color;

use tally_core::{ChartView, SeriesEntry, Summary, TableView, format_amount};

const BAR_WIDTH: usize = 24;

pub fn render_table(view: &TableView) -> String {
    let rows = match view {
        TableView::Placeholder(message) => return format!("{message}\n"),
        TableView::Rows(rows) => rows,
    };

    let header = ["ID", "Description", "Amount", "Category"];
    // the last column is left ragged
    let mut widths = header.map(str::len);
    for r in rows {
        widths[0] = widths[0].max(r.id.len());
        widths[1] = widths[1].max(r.description.chars().count());
        widths[2] = widths[2].max(r.amount.len());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<w0$}  {:<w1$}  {:>w2$}  {}\n",
        header[0],
        header[1],
        header[2],
        header[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<w0$}  {:<w1$}  {:>w2$}  {}\n",
            r.id,
            r.description,
            r.amount,
            r.category,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        ));
    }
    out
}

/// Text bar proportional to the slice's share of income
pub fn share_bar(entry: &SeriesEntry, width: usize) -> String {
    let pct: f64 = entry.percentage.parse().unwrap_or(0.0);
    let filled = ((pct / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    "█".repeat(filled)
}

pub fn render_chart(chart: &ChartView) -> String {
    let series = match chart {
        ChartView::Placeholder(message) => return format!("{message}\n"),
        ChartView::Pie(series) => series,
    };

    let label_width = series.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for e in series.iter() {
        out.push_str(&format!(
            "{:<lw$}  {:>10}  {:>6}%  {}\n",
            e.label,
            format!("${}", format_amount(e.value)),
            e.percentage,
            share_bar(e, BAR_WIDTH),
            lw = label_width,
        ));
    }
    out
}

/// `$25` or `-$25`
pub fn signed_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${}", format_amount(-amount))
    } else {
        format!("${}", format_amount(amount))
    }
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Income: {}  Expenses: {}  Remaining: {}\n",
        signed_money(summary.total_income),
        signed_money(summary.total_expenses),
        signed_money(summary.remaining_income()),
    )
}

/// Parse the `rgba(r, g, b, a)` colors of the chart series for the terminal.
pub fn slice_color(css: &str) -> Color {
    let inner = css
        .trim()
        .strip_prefix("rgba(")
        .or_else(|| css.trim().strip_prefix("rgb("))
        .and_then(|s| s.strip_suffix(')'));
    let Some(inner) = inner else {
        return Color::Gray;
    };
    let channels: Vec<u8> = inner
        .split(',')
        .take(3)
        .filter_map(|c| c.trim().parse().ok())
        .collect();
    match channels[..] {
        [r, g, b] => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::chart::{ALERT_COLOR, POSITIVE_COLOR};
    use tally_core::{DashboardView, Record, Snapshot};

    fn view() -> DashboardView {
        DashboardView::from_snapshot(&Snapshot {
            expenses: vec![
                Record::new("a1", "Groceries", 80.0, "Food"),
                Record::new("a2", "Rent share", 20.0, "Rent"),
            ],
            income: vec![Record::new("i1", "", 200.0, "Salary")],
        })
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let out = render_table(&view().expenses);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  Description"));
        assert!(lines[1].contains("Groceries"));
        assert!(lines[1].contains("$80"));
        // both categories are four characters wide
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_render_placeholders() {
        let empty = DashboardView::from_snapshot(&Snapshot::default());
        assert_eq!(render_table(&empty.expenses), "No expenses yet.\n");
        assert_eq!(render_chart(&empty.chart), "No data to display in chart.\n");
    }

    #[test]
    fn test_render_chart_lines() {
        let out = render_chart(&view().chart);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Food"));
        assert!(lines[0].contains("40.0%"));
        assert!(lines[2].starts_with("Remaining Income"));
        assert!(lines[2].contains("50.0%"));
        assert!(lines[2].ends_with(&"█".repeat(12)));
    }

    #[test]
    fn test_signed_money_shows_deficit() {
        assert_eq!(signed_money(-25.0), "-$25");
        assert_eq!(signed_money(12.5), "$12.50");
        assert_eq!(
            render_summary(&view().summary),
            "Income: $200  Expenses: $100  Remaining: $100\n"
        );
    }

    #[test]
    fn test_slice_colors() {
        assert_eq!(slice_color(ALERT_COLOR), Color::Rgb(255, 99, 132));
        assert_eq!(slice_color(POSITIVE_COLOR), Color::Rgb(75, 192, 192));
        assert_eq!(slice_color("tomato"), Color::Gray);
    }
}
