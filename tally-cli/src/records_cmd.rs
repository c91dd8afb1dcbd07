use anyhow::{Context, Result, bail};
use clap::Subcommand;

use tally_api::{ApiClient, RecordStore, SubmitOutcome};
use tally_core::{
    DashboardView, EditField, Record, RecordFields, RecordKind, TableView, parse_amount,
};

use crate::render::{render_chart, render_summary, render_table};

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// List all expenses
    List {
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Record a new expense
    Add {
        #[arg(long)]
        description: String,

        /// e.g. 12.50 or $1,200
        #[arg(long)]
        amount: String,

        #[arg(long)]
        category: String,
    },

    /// Replace the fields of an existing expense (unspecified fields keep their value)
    Edit {
        id: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete an expense
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum IncomeCommand {
    /// List all income entries
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Record new income
    Add {
        #[arg(long)]
        amount: String,

        #[arg(long)]
        category: String,

        #[arg(long, default_value = "")]
        description: String,
    },
}

pub async fn run_expense(store: &mut RecordStore<ApiClient>, command: ExpenseCommand) -> Result<()> {
    match command {
        ExpenseCommand::List { json } => {
            store.refresh(RecordKind::Expense).await?;
            print_records(store, RecordKind::Expense, json)?;
        }

        ExpenseCommand::Add {
            description,
            amount,
            category,
        } => {
            let amount = parse_amount(&amount)?;
            let created = store
                .add(RecordKind::Expense, RecordFields::new(description, amount, category))
                .await?;
            print_added("expense", created.as_ref());
        }

        ExpenseCommand::Edit {
            id,
            description,
            amount,
            category,
        } => {
            if description.is_none() && amount.is_none() && category.is_none() {
                bail!("nothing to change; pass --description, --amount or --category");
            }

            store.refresh(RecordKind::Expense).await?;
            store.begin_edit(&id)?;
            let changes = [
                (EditField::Description, description),
                (EditField::Amount, amount),
                (EditField::Category, category),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    store.change_field(field, value);
                }
            }

            match store.submit_edit().await.context("update failed")? {
                SubmitOutcome::Saved { id } => println!("Updated expense {id}"),
                SubmitOutcome::Rejected(e) => bail!("{e}"),
                SubmitOutcome::NotEditing => bail!("no edit in progress"),
            }
        }

        ExpenseCommand::Delete { id } => {
            store.delete(RecordKind::Expense, &id).await?;
            println!("Deleted expense {id}");
        }
    }
    Ok(())
}

pub async fn run_income(store: &mut RecordStore<ApiClient>, command: IncomeCommand) -> Result<()> {
    match command {
        IncomeCommand::List { json } => {
            store.refresh(RecordKind::Income).await?;
            print_records(store, RecordKind::Income, json)?;
        }

        IncomeCommand::Add {
            amount,
            category,
            description,
        } => {
            let amount = parse_amount(&amount)?;
            let created = store
                .add(RecordKind::Income, RecordFields::new(description, amount, category))
                .await?;
            print_added("income", created.as_ref());
        }
    }
    Ok(())
}

fn print_added(label: &str, created: Option<&Record>) {
    match created {
        Some(record) => println!("Added {label} {}", record.id),
        None => println!("Added {label}"),
    }
}

fn print_records(store: &RecordStore<ApiClient>, kind: RecordKind, json: bool) -> Result<()> {
    let records = store.snapshot().records(kind);
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        print!("{}", render_table(&TableView::from_records(kind, records)));
    }
    Ok(())
}

/// Fetch everything and print the chart series (or its placeholder).
pub async fn run_chart(store: &mut RecordStore<ApiClient>, json: bool) -> Result<()> {
    store.refresh_all().await?;
    let view: DashboardView = store.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view.chart)?);
        return Ok(());
    }

    print!("{}", render_chart(&view.chart));
    if view.chart.series().is_some() {
        println!();
        print!("{}", render_summary(&view.summary));
    }
    Ok(())
}
