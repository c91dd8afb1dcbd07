//! Pie chart projection.
//!
//! Turns a [`Summary`] into the series a chart widget draws: one slice per
//! expense category followed by a "Remaining Income" slice. Percentages are
//! relative to total income, so the slices of a budget that is not overspent
//! add up to 100%.

use serde::Serialize;

use crate::aggregate::Summary;
use crate::amount::format_amount;

pub const REMAINING_INCOME_LABEL: &str = "Remaining Income";

/// Fill for expense category slices
pub const ALERT_COLOR: &str = "rgba(255, 99, 132, 0.7)";

/// Fill for the remaining income slice
pub const POSITIVE_COLOR: &str = "rgba(75, 192, 192, 0.7)";

pub const NO_CHART_DATA: &str = "No data to display in chart.";

/// One slice of the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
    /// Share of total income, one decimal place ("40.0")
    pub percentage: String,
}

impl SeriesEntry {
    /// Two-line legend text, e.g. `Food: 40.0%` / `Total: $80`
    pub fn legend_text(&self) -> String {
        format!(
            "{}: {}%\nTotal: ${}",
            self.label,
            self.percentage,
            format_amount(self.value)
        )
    }

    /// Hover text, e.g. `Food: $80 (40.0%)`
    pub fn tooltip_text(&self) -> String {
        format!(
            "{}: ${} ({}%)",
            self.label,
            format_amount(self.value),
            self.percentage
        )
    }

    pub fn is_remaining_income(&self) -> bool {
        self.label == REMAINING_INCOME_LABEL && self.color == POSITIVE_COLOR
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    pub entries: Vec<SeriesEntry>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.entries.iter()
    }
}

/// `value / total_income * 100` with one decimal, or `0.0` without income.
///
/// Ties round away from zero (6.25 -> "6.3"); `{:.1}` alone would round them
/// to even.
pub fn percentage_of(value: f64, total_income: f64) -> String {
    let pct = if total_income > 0.0 {
        value / total_income * 100.0
    } else {
        0.0
    };
    format!("{:.1}", (pct * 10.0).round() / 10.0)
}

/// Build the chart series. Returns an empty series when there is nothing at all
/// to show.
pub fn project(summary: &Summary) -> Series {
    if summary.is_empty() {
        return Series::default();
    }

    let total_income = summary.total_income;
    let mut entries: Vec<SeriesEntry> = summary
        .expense_totals
        .iter()
        .map(|t| SeriesEntry {
            label: t.category.clone(),
            value: t.amount,
            color: ALERT_COLOR,
            percentage: percentage_of(t.amount, total_income),
        })
        .collect();

    // The clamp is display-only; Summary::remaining_income stays signed.
    let remaining = summary.remaining_income().max(0.0);
    entries.push(SeriesEntry {
        label: REMAINING_INCOME_LABEL.to_string(),
        value: remaining,
        color: POSITIVE_COLOR,
        percentage: percentage_of(remaining, total_income),
    });

    Series { entries }
}

/// What the chart area shows: a pie, or a placeholder when no records exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ChartView {
    Placeholder(&'static str),
    Pie(Series),
}

impl ChartView {
    /// The chart is suppressed entirely when there are no expense and no
    /// income records, so no widget is ever handed an all-zero data set.
    pub fn from_summary(summary: &Summary) -> Self {
        if summary.is_empty() {
            ChartView::Placeholder(NO_CHART_DATA)
        } else {
            ChartView::Pie(project(summary))
        }
    }

    pub fn series(&self) -> Option<&Series> {
        match self {
            ChartView::Pie(series) => Some(series),
            ChartView::Placeholder(_) => None,
        }
    }
}
