//! Grouping transactions into the periods of the financial report.

use serde::Deserialize;

use crate::{
    aggregation::{Bucket, Granularity, PeriodKey, bucket_by},
    cashflow::month_name,
    transaction::Transaction,
};

/// The most periods shown in the report.
pub const REPORT_PERIOD_COUNT: usize = 12;

/// How many categories are listed for each period.
pub const REPORT_TOP_CATEGORIES: usize = 3;

/// The length of the periods in the financial report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 2] = [ReportPeriod::Monthly, ReportPeriod::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Monthly => "Monthly",
            ReportPeriod::Yearly => "Yearly",
        }
    }

    fn granularity(self) -> Granularity {
        match self {
            ReportPeriod::Monthly => Granularity::Month,
            ReportPeriod::Yearly => Granularity::Year,
        }
    }
}

/// The latest [REPORT_PERIOD_COUNT] periods that have transactions, newest first.
pub fn report_buckets(transactions: &[Transaction], period: ReportPeriod) -> Vec<Bucket> {
    let mut buckets = bucket_by(transactions, period.granularity());
    buckets.reverse();
    buckets.truncate(REPORT_PERIOD_COUNT);
    buckets
}

/// A human readable name for a report period, e.g. "January 2024" or "2024".
pub fn period_label(key: PeriodKey) -> String {
    match key {
        PeriodKey::Month { year, month } => format!("{} {year}", month_name(month)),
        key => key.to_string(),
    }
}
