//! Dashboard view model: the tables and chart derived from a snapshot.
//! Recomputed from scratch on every refresh.

use serde::Serialize;

use crate::aggregate::Summary;
use crate::amount::format_amount;
use crate::chart::ChartView;
use crate::record::{Record, RecordKind, Snapshot};

pub const NO_EXPENSES: &str = "No expenses yet.";
pub const NO_INCOME: &str = "No income yet.";

/// One line of the record table, formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub description: String,
    pub amount: String,
    pub category: String,
}

impl TableRow {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            description: record.description.clone(),
            amount: format!("${}", format_amount(record.amount)),
            category: record.category.clone(),
        }
    }
}

/// Rows of one record table, or the message shown instead of an empty table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum TableView {
    Placeholder(&'static str),
    Rows(Vec<TableRow>),
}

impl TableView {
    pub fn from_records(kind: RecordKind, records: &[Record]) -> Self {
        if records.is_empty() {
            let message = match kind {
                RecordKind::Expense => NO_EXPENSES,
                RecordKind::Income => NO_INCOME,
            };
            return TableView::Placeholder(message);
        }
        TableView::Rows(records.iter().map(TableRow::from_record).collect())
    }

    pub fn rows(&self) -> &[TableRow] {
        match self {
            TableView::Rows(rows) => rows,
            TableView::Placeholder(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub expenses: TableView,
    pub income: TableView,
    pub chart: ChartView,
    pub summary: Summary,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let summary = Summary::from_records(&snapshot.expenses, &snapshot.income);
        Self {
            expenses: TableView::from_records(RecordKind::Expense, &snapshot.expenses),
            income: TableView::from_records(RecordKind::Income, &snapshot.income),
            chart: ChartView::from_summary(&summary),
            summary,
        }
    }
}
