//! Edit session: which record (if any) is being edited, and the form values
//! typed so far.
//!
//! The session is a plain value; every event produces the next session plus an
//! effect for the caller to carry out. Only one record can be edited at a time
//! and beginning a new edit silently drops the previous one.

use crate::amount::{AmountError, parse_amount};
use crate::record::{Record, RecordFields};

/// Shadow copy of the editable fields, kept as the raw text the user typed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditForm {
    pub description: String,
    pub amount: String,
    pub category: String,
}

impl EditForm {
    /// Seed the form verbatim from a record
    pub fn from_record(record: &Record) -> Self {
        Self {
            description: record.description.clone(),
            amount: record.amount.to_string(),
            category: record.category.clone(),
        }
    }

    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::Description => &self.description,
            EditField::Amount => &self.amount,
            EditField::Category => &self.category,
        }
    }

    pub fn set(&mut self, field: EditField, value: String) {
        match field {
            EditField::Description => self.description = value,
            EditField::Amount => self.amount = value,
            EditField::Category => self.category = value,
        }
    }

    /// Validate the form into a request body
    pub fn to_fields(&self) -> Result<RecordFields, AmountError> {
        Ok(RecordFields {
            description: self.description.clone(),
            amount: parse_amount(&self.amount)?,
            category: self.category.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Description,
    Amount,
    Category,
}

impl EditField {
    pub const ALL: [EditField; 3] = [EditField::Description, EditField::Amount, EditField::Category];

    /// Form input name
    pub fn name(&self) -> &'static str {
        match self {
            EditField::Description => "description",
            EditField::Amount => "amount",
            EditField::Category => "category",
        }
    }

    /// Next field in tab order, wrapping around
    pub fn next(&self) -> EditField {
        match self {
            EditField::Description => EditField::Amount,
            EditField::Amount => EditField::Category,
            EditField::Category => EditField::Description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { record: Record, form: EditForm },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Begin(Record),
    Change(EditField, String),
    Cancel,
    Submit,
}

/// Full replace of an existing record
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub id: String,
    pub fields: RecordFields,
}

/// What the caller has to do after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum EditEffect {
    None,
    /// Send the update, then re-fetch
    Update(UpdateRequest),
    /// The amount did not parse; the session is still editing
    Rejected(AmountError),
}

impl EditSession {
    pub fn transition(self, event: EditEvent) -> (EditSession, EditEffect) {
        match (self, event) {
            (_, EditEvent::Begin(record)) => {
                let form = EditForm::from_record(&record);
                (EditSession::Editing { record, form }, EditEffect::None)
            }
            (EditSession::Editing { record, mut form }, EditEvent::Change(field, value)) => {
                form.set(field, value);
                (EditSession::Editing { record, form }, EditEffect::None)
            }
            (EditSession::Editing { .. }, EditEvent::Cancel) => {
                (EditSession::Idle, EditEffect::None)
            }
            (EditSession::Editing { record, form }, EditEvent::Submit) => {
                match form.to_fields() {
                    Ok(fields) => {
                        let request = UpdateRequest {
                            id: record.id,
                            fields,
                        };
                        (EditSession::Idle, EditEffect::Update(request))
                    }
                    Err(e) => (EditSession::Editing { record, form }, EditEffect::Rejected(e)),
                }
            }
            (EditSession::Idle, _) => (EditSession::Idle, EditEffect::None),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            EditSession::Editing { record, .. } => Some(record),
            EditSession::Idle => None,
        }
    }

    pub fn form(&self) -> Option<&EditForm> {
        match self {
            EditSession::Editing { form, .. } => Some(form),
            EditSession::Idle => None,
        }
    }
}
