//! Write-through record store.
//!
//! Holds the last fetched [`Snapshot`] and the edit session. Every mutation
//! goes to the server first and is followed by a full re-fetch of the affected
//! collection; the snapshot is never patched locally. Failures are logged and
//! leave the snapshot as it was.

use anyhow::{Result, anyhow};
use std::mem;

use tally_core::{
    AmountError, DashboardView, EditEffect, EditEvent, EditField, EditSession, Record,
    RecordFields, RecordKind, Snapshot,
};

use crate::client::RecordApi;

/// Result of submitting the edit form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was being edited
    NotEditing,
    /// Server accepted the update; the session is idle again
    Saved { id: String },
    /// The amount did not parse; nothing was sent and the form is still open
    Rejected(AmountError),
}

pub struct RecordStore<A> {
    api: A,
    snapshot: Snapshot,
    edit: EditSession,
}

impl<A: RecordApi> RecordStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            snapshot: Snapshot::default(),
            edit: EditSession::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    /// Tables and chart for the current snapshot
    pub fn view(&self) -> DashboardView {
        DashboardView::from_snapshot(&self.snapshot)
    }

    /// Replace one collection with what the server has now.
    pub async fn refresh(&mut self, kind: RecordKind) -> Result<()> {
        match self.api.list(kind).await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "fetched {}", kind.collection());
                self.snapshot.replace(kind, records);
                Ok(())
            }
            Err(e) => {
                tracing::error!("error fetching {}: {e:#}", kind.collection());
                Err(e)
            }
        }
    }

    /// Refresh both collections. Both are attempted; the first error is returned.
    pub async fn refresh_all(&mut self) -> Result<()> {
        let expenses = self.refresh(RecordKind::Expense).await;
        let income = self.refresh(RecordKind::Income).await;
        expenses.and(income)
    }

    /// Create a record and re-fetch its collection.
    ///
    /// Returns the created record when the server echoed one back. The re-fetch
    /// runs either way, so the snapshot shows the new record regardless.
    pub async fn add(&mut self, kind: RecordKind, fields: RecordFields) -> Result<Option<Record>> {
        let created = self.api.create(kind, &fields).await.inspect_err(|e| {
            tracing::error!("error adding {}: {e:#}", kind.label());
        })?;
        match &created {
            Some(record) => tracing::info!(id = %record.id, "added {}", kind.label()),
            None => tracing::info!("added {}", kind.label()),
        }
        // already logged; the caller still learns the add went through
        self.refresh(kind).await.ok();
        Ok(created)
    }

    pub async fn delete(&mut self, kind: RecordKind, id: &str) -> Result<()> {
        tracing::info!(id, "deleting {}", kind.label());
        self.api.delete(kind, id).await.inspect_err(|e| {
            tracing::error!("error deleting {} {id}: {e:#}", kind.label());
        })?;
        if self.edit.record().is_some_and(|r| r.id == id) {
            self.edit = EditSession::Idle;
        }
        self.refresh(kind).await.ok();
        Ok(())
    }

    /// Start editing an expense from the current snapshot, dropping any edit in progress.
    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        let record = self
            .snapshot
            .find(RecordKind::Expense, id)
            .cloned()
            .ok_or_else(|| anyhow!("no expense with id {id}"))?;
        self.dispatch(EditEvent::Begin(record));
        Ok(())
    }

    pub fn change_field(&mut self, field: EditField, value: impl Into<String>) {
        self.dispatch(EditEvent::Change(field, value.into()));
    }

    pub fn cancel_edit(&mut self) {
        self.dispatch(EditEvent::Cancel);
    }

    fn dispatch(&mut self, event: EditEvent) {
        let session = mem::take(&mut self.edit);
        let (next, _) = session.transition(event);
        self.edit = next;
    }

    /// Send the edited fields as a full replace, then re-fetch expenses.
    ///
    /// If the update request itself fails the error is logged and returned, and
    /// the form stays open with what the user typed.
    pub async fn submit_edit(&mut self) -> Result<SubmitOutcome> {
        let before = self.edit.clone();
        let (next, effect) = mem::take(&mut self.edit).transition(EditEvent::Submit);

        let request = match effect {
            EditEffect::Update(request) => request,
            EditEffect::Rejected(e) => {
                tracing::warn!("edit rejected: {e}");
                self.edit = next;
                return Ok(SubmitOutcome::Rejected(e));
            }
            EditEffect::None => {
                self.edit = next;
                return Ok(SubmitOutcome::NotEditing);
            }
        };

        if let Err(e) = self
            .api
            .update(RecordKind::Expense, &request.id, &request.fields)
            .await
        {
            tracing::error!("error updating expense {}: {e:#}", request.id);
            self.edit = before;
            return Err(e);
        }

        tracing::info!(id = %request.id, "updated expense");
        self.edit = next;
        self.refresh(RecordKind::Expense).await.ok();
        Ok(SubmitOutcome::Saved { id: request.id })
    }
}
