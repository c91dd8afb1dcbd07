//! Per-category totals and the income/expense summary

use serde::Serialize;
use std::collections::HashMap;

use crate::record::Record;

/// Summed amount for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Category totals in first-seen order.
///
/// Keys are the exact category strings of the records (no case folding, no trimming).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `category`, appending the category if unseen.
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.index.get(category) {
            Some(&i) => self.entries[i].amount += amount,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push(CategoryTotal {
                    category: category.to_string(),
                    amount,
                });
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.index.get(category).map(|&i| self.entries[i].amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all categories
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }
}

/// Group records by category. An empty slice gives empty totals.
pub fn aggregate(records: &[Record]) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for record in records {
        totals.add(&record.category, record.amount);
    }
    totals
}

/// Everything derived from one snapshot of expenses and income
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub expense_totals: CategoryTotals,
    pub income_totals: CategoryTotals,
    pub total_income: f64,
    pub total_expenses: f64,
}

impl Summary {
    pub fn from_records(expenses: &[Record], income: &[Record]) -> Self {
        let expense_totals = aggregate(expenses);
        let income_totals = aggregate(income);
        let total_expenses = expense_totals.total();
        let total_income = income_totals.total();

        Self {
            expense_totals,
            income_totals,
            total_income,
            total_expenses,
        }
    }

    /// Income minus expenses. Negative when overspent; never clamped here.
    pub fn remaining_income(&self) -> f64 {
        self.total_income - self.total_expenses
    }

    /// True when neither side had a single record
    pub fn is_empty(&self) -> bool {
        self.expense_totals.is_empty() && self.income_totals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: &str, amount: f64, category: &str) -> Record {
        Record::new(id, "", amount, category)
    }

    #[test]
    fn test_aggregate_groups_in_first_seen_order() {
        let records = vec![
            expense("1", 50.0, "Food"),
            expense("2", 20.0, "Rent"),
            expense("3", 30.0, "Food"),
        ];
        let totals = aggregate(&records);

        let categories: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["Food", "Rent"]);
        assert_eq!(totals.get("Food"), Some(80.0));
        assert_eq!(totals.get("Rent"), Some(20.0));
        assert_eq!(totals.get("Travel"), None);
    }

    #[test]
    fn test_aggregate_empty() {
        let totals = aggregate(&[]);
        assert!(totals.is_empty());
        assert_eq!(totals.total(), 0.0);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let records = vec![expense("1", 5.0, "food"), expense("2", 7.0, "Food")];
        let totals = aggregate(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("food"), Some(5.0));
        assert_eq!(totals.get("Food"), Some(7.0));
    }

    #[test]
    fn test_total_matches_sum_of_amounts() {
        let amounts = [0.1, 0.2, 13.37, 999.99, 0.0, 42.0, 7.25];
        let categories = ["A", "B", "A", "C", "B", "A", "D"];
        let records: Vec<Record> = amounts
            .iter()
            .zip(categories)
            .enumerate()
            .map(|(i, (&a, c))| expense(&i.to_string(), a, c))
            .collect();

        let totals = aggregate(&records);
        let expected: f64 = amounts.iter().sum();
        assert!((totals.total() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_summary_and_signed_remaining_income() {
        let expenses = vec![expense("1", 150.0, "Rent"), expense("2", 75.0, "Food")];
        let income = vec![expense("i1", 200.0, "Salary")];
        let summary = Summary::from_records(&expenses, &income);

        assert_eq!(summary.total_expenses, 225.0);
        assert_eq!(summary.total_income, 200.0);
        assert_eq!(summary.remaining_income(), -25.0);
        assert_eq!(summary.income_totals.get("Salary"), Some(200.0));
    }

    #[test]
    fn test_serializes_as_ordered_list() {
        let totals = aggregate(&[expense("1", 2.0, "Z"), expense("2", 3.0, "A")]);
        let json = serde_json::to_value(&totals).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"category": "Z", "amount": 2.0},
                {"category": "A", "amount": 3.0}
            ])
        );
    }
}
