//! tally-core: record model and the pure aggregation / chart / edit pipeline

pub mod aggregate;
pub mod amount;
pub mod chart;
pub mod dashboard;
pub mod edit;
pub mod record;

pub use aggregate::{CategoryTotal, CategoryTotals, Summary, aggregate};
pub use amount::{AmountError, coerce_amount, format_amount, parse_amount};
pub use chart::{ChartView, Series, SeriesEntry, project};
pub use dashboard::{DashboardView, TableRow, TableView};
pub use edit::{EditEffect, EditEvent, EditField, EditForm, EditSession, UpdateRequest};
pub use record::{Record, RecordFields, RecordKind, Snapshot};
