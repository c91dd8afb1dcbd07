use anyhow::{Result, bail};
use std::sync::Mutex;

use tally_api::{RecordApi, RecordStore, SubmitOutcome};
use tally_core::{
    AmountError, ChartView, EditField, Record, RecordFields, RecordKind, Snapshot,
};

/// In-memory stand-in for the REST backend
#[derive(Default)]
struct MemoryApi {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    db: Snapshot,
    next_id: u32,
    calls: Vec<String>,
    fail_list: bool,
    fail_update: bool,
    /// Accept creates without echoing the record, like `{"message": "..."}`
    bare_create: bool,
}

impl MemoryApi {
    fn with(expenses: Vec<Record>, income: Vec<Record>) -> Self {
        let api = MemoryApi::default();
        {
            let mut s = api.state.lock().unwrap();
            s.db = Snapshot { expenses, income };
            s.next_id = 100;
        }
        api
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn set_fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    fn set_fail_update(&self, fail: bool) {
        self.state.lock().unwrap().fail_update = fail;
    }

    fn set_bare_create(&self, bare: bool) {
        self.state.lock().unwrap().bare_create = bare;
    }

    fn server_expense(&self, id: &str) -> Option<Record> {
        self.state
            .lock()
            .unwrap()
            .db
            .find(RecordKind::Expense, id)
            .cloned()
    }
}

impl RecordApi for MemoryApi {
    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("list {}", kind.collection()));
        if s.fail_list {
            bail!("connection refused");
        }
        Ok(s.db.records(kind).to_vec())
    }

    async fn create(&self, kind: RecordKind, fields: &RecordFields) -> Result<Option<Record>> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("create {}", kind.collection()));
        s.next_id += 1;
        let record = Record::new(
            s.next_id.to_string(),
            fields.description.clone(),
            fields.amount,
            fields.category.clone(),
        );
        let mut records = s.db.records(kind).to_vec();
        records.push(record.clone());
        s.db.replace(kind, records);
        Ok((!s.bare_create).then_some(record))
    }

    async fn update(&self, kind: RecordKind, id: &str, fields: &RecordFields) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("update {} {id}", kind.collection()));
        if s.fail_update {
            bail!("503 Service Unavailable");
        }
        let records: Vec<Record> = s
            .db
            .records(kind)
            .iter()
            .map(|r| {
                if r.id == id {
                    Record::new(id, fields.description.clone(), fields.amount, fields.category.clone())
                } else {
                    r.clone()
                }
            })
            .collect();
        s.db.replace(kind, records);
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("delete {} {id}", kind.collection()));
        let records: Vec<Record> = s
            .db
            .records(kind)
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        s.db.replace(kind, records);
        Ok(())
    }
}

fn seeded() -> MemoryApi {
    MemoryApi::with(
        vec![
            Record::new("a", "Groceries", 50.0, "Food"),
            Record::new("b", "Takeout", 30.0, "Food"),
            Record::new("c", "Rent share", 20.0, "Rent"),
        ],
        vec![Record::new("i", "", 200.0, "Salary")],
    )
}

#[tokio::test]
async fn test_refresh_all_builds_dashboard() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    let view = store.view();
    assert_eq!(view.summary.total_expenses, 100.0);
    assert_eq!(view.summary.total_income, 200.0);
    let series = view.chart.series().unwrap();
    let pcts: Vec<&str> = series.iter().map(|e| e.percentage.as_str()).collect();
    assert_eq!(pcts, vec!["40.0", "10.0", "50.0"]);
}

#[tokio::test]
async fn test_add_is_followed_by_refetch() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    let created = store
        .add(RecordKind::Expense, RecordFields::new("Movie", 15.0, "Fun"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        store.api().calls()[2..],
        ["create expenses".to_string(), "list expenses".to_string()]
    );
    assert!(store.snapshot().find(RecordKind::Expense, &created.id).is_some());
    assert_eq!(store.view().summary.expense_totals.get("Fun"), Some(15.0));
}

#[tokio::test]
async fn test_add_without_echoed_record_still_refetches() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();
    store.api().set_bare_create(true);

    let created = store
        .add(RecordKind::Income, RecordFields::new("", 50.0, "Gift"))
        .await
        .unwrap();

    assert_eq!(created, None);
    assert_eq!(
        store.api().calls()[2..],
        ["create income".to_string(), "list income".to_string()]
    );
    assert_eq!(store.view().summary.income_totals.get("Gift"), Some(50.0));
}

#[tokio::test]
async fn test_deleted_record_vanishes_from_totals() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    store.delete(RecordKind::Expense, "c").await.unwrap();

    let summary = store.view().summary;
    assert_eq!(summary.expense_totals.get("Rent"), None);
    assert_eq!(summary.total_expenses, 80.0);
}

#[tokio::test]
async fn test_edit_submit_replaces_fields_and_refetches() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    store.begin_edit("a").unwrap();
    store.change_field(EditField::Amount, "65");
    store.change_field(EditField::Description, "Big groceries");

    let outcome = store.submit_edit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Saved { id: "a".to_string() });
    assert!(!store.edit_session().is_editing());

    let calls = store.api().calls();
    assert_eq!(
        calls[calls.len() - 2..],
        ["update expenses a".to_string(), "list expenses".to_string()]
    );
    assert_eq!(
        store.api().server_expense("a"),
        Some(Record::new("a", "Big groceries", 65.0, "Food"))
    );
    assert_eq!(store.view().summary.expense_totals.get("Food"), Some(95.0));
}

#[tokio::test]
async fn test_failed_update_keeps_form_and_snapshot() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();
    let before = store.snapshot().clone();

    store.begin_edit("b").unwrap();
    store.change_field(EditField::Amount, "31");
    store.api().set_fail_update(true);

    assert!(store.submit_edit().await.is_err());
    assert!(store.edit_session().is_editing());
    assert_eq!(store.edit_session().form().unwrap().amount, "31");
    assert_eq!(store.snapshot(), &before);
}

#[tokio::test]
async fn test_bad_amount_is_rejected_without_request() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();
    let calls_before = store.api().calls().len();

    store.begin_edit("a").unwrap();
    store.change_field(EditField::Amount, "fifty");
    let outcome = store.submit_edit().await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Rejected(AmountError::NotANumber("fifty".to_string()))
    );
    assert!(store.edit_session().is_editing());
    assert_eq!(store.api().calls().len(), calls_before);
}

#[tokio::test]
async fn test_submit_while_idle_is_a_no_op() {
    let mut store = RecordStore::new(seeded());
    assert_eq!(store.submit_edit().await.unwrap(), SubmitOutcome::NotEditing);
    assert!(store.api().calls().is_empty());
}

#[tokio::test]
async fn test_second_begin_edit_discards_first() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    store.begin_edit("a").unwrap();
    store.change_field(EditField::Description, "never saved");
    store.begin_edit("c").unwrap();

    let form = store.edit_session().form().unwrap();
    assert_eq!(form.description, "Rent share");
    assert_eq!(form.amount, "20");
    assert_eq!(form.category, "Rent");
    assert!(store.begin_edit("zzz").is_err());
}

#[tokio::test]
async fn test_fetch_failure_leaves_stale_data() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    store.api().set_fail_list(true);
    assert!(store.refresh_all().await.is_err());
    assert_eq!(store.snapshot().expenses.len(), 3);

    // the delete itself went through, the refetch did not
    store.delete(RecordKind::Expense, "a").await.unwrap();
    assert_eq!(store.snapshot().expenses.len(), 3);
    assert!(store.api().server_expense("a").is_none());
}

#[tokio::test]
async fn test_deleting_edited_record_closes_form() {
    let mut store = RecordStore::new(seeded());
    store.refresh_all().await.unwrap();

    store.begin_edit("b").unwrap();
    store.delete(RecordKind::Expense, "b").await.unwrap();
    assert!(!store.edit_session().is_editing());
}

#[tokio::test]
async fn test_empty_backend_suppresses_chart() {
    let mut store = RecordStore::new(MemoryApi::default());
    store.refresh_all().await.unwrap();

    let view = store.view();
    assert!(matches!(view.chart, ChartView::Placeholder(_)));
    assert!(view.expenses.rows().is_empty());
}
