//! Summary metrics computed from a list of transactions.
//!
//! Every function here is pure: the transactions are already scoped to a user
//! and date window by the query layer, and amounts were validated on write, so
//! nothing can fail. Order of the input does not matter.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Display,
};

use crate::transaction::{Category, Transaction, TransactionType};

/// The sums of income and expenses for a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    /// Income minus expenses, negative when more was spent than earned.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }

    fn add(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.income += transaction.amount,
            TransactionType::Expense => self.expense += transaction.amount,
        }
    }
}

/// Sum income and expenses separately.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        totals.add(transaction);
    }

    totals
}

/// The share of income that was not spent, as a percentage.
///
/// Zero when there was no income. Negative when expenses exceed income.
pub fn savings_rate(totals: &Totals) -> f64 {
    if totals.income == 0.0 {
        return 0.0;
    }

    totals.balance() / totals.income * 100.0
}

/// Expenses as a percentage of income, zero when there was no income.
pub fn expense_ratio(totals: &Totals) -> f64 {
    if totals.income == 0.0 {
        return 0.0;
    }

    totals.expense / totals.income * 100.0
}

/// The size of the periods transactions are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// By day of the month, for looking at a single month.
    Day,
    Month,
    Year,
}

/// Identifies the period a bucket covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    /// A day of the month, 1 to 31.
    Day(u8),
    /// A calendar month, `month` is 1 to 12.
    Month { year: i32, month: u8 },
    Year(i32),
}

impl Display for PeriodKey {
    /// Formats days as "5", months as "2024-01" and years as "2024".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodKey::Day(day) => write!(f, "{day}"),
            PeriodKey::Month { year, month } => write!(f, "{year}-{month:02}"),
            PeriodKey::Year(year) => write!(f, "{year}"),
        }
    }
}

/// The transactions of a single period.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: PeriodKey,
    pub totals: Totals,
    /// Amounts per category for both income and expenses.
    pub categories: Vec<CategoryTotal>,
}

fn period_key(transaction: &Transaction, granularity: Granularity) -> PeriodKey {
    let date = transaction.date;

    match granularity {
        Granularity::Day => PeriodKey::Day(date.day()),
        Granularity::Month => PeriodKey::Month {
            year: date.year(),
            month: date.month() as u8,
        },
        Granularity::Year => PeriodKey::Year(date.year()),
    }
}

/// Group transactions into periods of `granularity`, sorted by key, oldest first.
///
/// Only periods that contain at least one transaction are returned.
pub fn bucket_by(transactions: &[Transaction], granularity: Granularity) -> Vec<Bucket> {
    let mut groups: BTreeMap<PeriodKey, Vec<&Transaction>> = BTreeMap::new();

    for transaction in transactions {
        groups
            .entry(period_key(transaction, granularity))
            .or_default()
            .push(transaction);
    }

    groups
        .into_iter()
        .map(|(key, group)| {
            let mut totals = Totals::default();
            group.iter().for_each(|transaction| totals.add(transaction));

            Bucket {
                key,
                totals,
                categories: rank_categories(group.into_iter()),
            }
        })
        .collect()
}

/// The total amount recorded under one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: f64,
}

/// Sum amounts per category, largest first.
///
/// Pass a `transaction_type` to only count income or only count expenses.
/// Categories without transactions are left out. Ties are broken by the
/// order of [Category::ALL] so the result is deterministic.
pub fn category_breakdown(
    transactions: &[Transaction],
    transaction_type: Option<TransactionType>,
) -> Vec<CategoryTotal> {
    rank_categories(transactions.iter().filter(|transaction| {
        transaction_type.is_none_or(|wanted| transaction.transaction_type == wanted)
    }))
}

fn rank_categories<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Vec<CategoryTotal> {
    let mut sums: HashMap<Category, f64> = HashMap::new();

    for transaction in transactions {
        *sums.entry(transaction.category).or_insert(0.0) += transaction.amount;
    }

    let mut breakdown: Vec<CategoryTotal> = Category::ALL
        .into_iter()
        .filter_map(|category| {
            sums.get(&category)
                .map(|&amount| CategoryTotal { category, amount })
        })
        .collect();

    // Stable sort keeps the Category::ALL order for equal amounts.
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    breakdown
}

/// The first `n` entries of a ranked breakdown.
pub fn top_n(breakdown: &[CategoryTotal], n: usize) -> &[CategoryTotal] {
    &breakdown[..n.min(breakdown.len())]
}

/// The change from `previous` to `current` as a percentage of `previous`.
///
/// Returns `None` when `previous` is zero since there is nothing to compare against.
pub fn percentage_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }

    Some((current - previous) / previous * 100.0)
}

/// The sum of all amounts divided by the number of distinct dates.
///
/// Income and expenses are both counted. Returns zero for no transactions.
pub fn daily_average(transactions: &[Transaction]) -> f64 {
    let total: f64 = transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum();
    let days = transactions
        .iter()
        .map(|transaction| transaction.date)
        .collect::<HashSet<_>>()
        .len()
        .max(1);

    total / days as f64
}
