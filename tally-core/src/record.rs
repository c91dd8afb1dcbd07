//! Record types shared by the API client, the dashboard and the CLI

use serde::{Deserialize, Serialize};

use crate::amount::deserialize_lenient;

/// Which collection a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Expense,
    Income,
}

impl RecordKind {
    /// REST collection name
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expenses",
            RecordKind::Income => "income",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Income => "income",
        }
    }
}

/// An expense or income entry as the server stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned identifier, never changed after creation
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Free text; income entries usually leave it empty
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub amount: f64,
    /// Case-sensitive label used as-is for grouping
    #[serde(default)]
    pub category: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            category: category.into(),
        }
    }

    /// The editable part of the record
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.clone(),
        }
    }
}

/// Body of create and update requests. Updates replace all three fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub description: String,
    pub amount: f64,
    pub category: String,
}

impl RecordFields {
    pub fn new(description: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount,
            category: category.into(),
        }
    }
}

/// Client-side copy of everything the server returned on the last fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub expenses: Vec<Record>,
    pub income: Vec<Record>,
}

impl Snapshot {
    pub fn records(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Expense => &self.expenses,
            RecordKind::Income => &self.income,
        }
    }

    pub fn replace(&mut self, kind: RecordKind, records: Vec<Record>) {
        match kind {
            RecordKind::Expense => self.expenses = records,
            RecordKind::Income => self.income = records,
        }
    }

    pub fn find(&self, kind: RecordKind, id: &str) -> Option<&Record> {
        self.records(kind).iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty() && self.income.is_empty()
    }
}
