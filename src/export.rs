//! File downloads: CSV reports and the JSON export of a user's data.

use axum::{
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use time::{OffsetDateTime, macros::format_description};

use crate::{
    Error,
    aggregation::Bucket,
    goal::Goal,
    transaction::{Transaction, TransactionType},
};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A response that the browser saves as `filename` instead of displaying.
pub fn attachment_response(content_type: &'static str, filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

fn write_csv<const N: usize>(header: [&str; N], rows: Vec<[String; N]>) -> Result<String, Error> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for row in rows {
        writer
            .write_record(&row)
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// A CSV file with one line per transaction in the given order.
///
/// Dates are written as dd/mm/yyyy and amounts with two decimals.
pub fn transactions_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let date_format = format_description!("[day]/[month]/[year]");

    let rows = transactions
        .iter()
        .map(|transaction| {
            let date = transaction
                .date
                .format(&date_format)
                .map_err(|error| Error::CsvError(error.to_string()))?;
            let transaction_type = match transaction.transaction_type {
                TransactionType::Income => "Receita",
                TransactionType::Expense => "Despesa",
            };

            Ok([
                date,
                transaction.description.clone(),
                transaction.category.as_str().to_owned(),
                transaction_type.to_owned(),
                format!("{:.2}", transaction.amount),
            ])
        })
        .collect::<Result<Vec<_>, Error>>()?;

    write_csv(["Data", "Descrição", "Categoria", "Tipo", "Valor"], rows)
}

/// A CSV file with the totals of each period in the given order.
pub fn report_csv(buckets: &[Bucket]) -> Result<String, Error> {
    let rows = buckets
        .iter()
        .map(|bucket| {
            [
                bucket.key.to_string(),
                format!("{:.2}", bucket.totals.income),
                format!("{:.2}", bucket.totals.expense),
                format!("{:.2}", bucket.totals.balance()),
            ]
        })
        .collect();

    write_csv(["Período", "Receitas", "Despesas", "Saldo"], rows)
}

#[derive(Debug, Serialize)]
pub struct ExportUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Everything a user has recorded, as written to the JSON export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport<'a> {
    pub transactions: &'a [Transaction],
    pub goals: &'a [Goal],
    #[serde(with = "time::serde::rfc3339")]
    pub export_date: OffsetDateTime,
    pub user: ExportUser<'a>,
}

impl DataExport<'_> {
    /// Serialize the export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_DISPOSITION;
    use serde_json::Value;
    use time::{OffsetDateTime, macros::date, macros::datetime};

    use crate::{
        aggregation::{Granularity, bucket_by},
        auth::UserID,
        transaction::{Category, Transaction, TransactionType},
    };

    use super::{
        CSV_CONTENT_TYPE, DataExport, ExportUser, attachment_response, report_csv,
        transactions_csv,
    };

    fn example_transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                user_id: UserID::new(1),
                amount: 1000.0,
                transaction_type: TransactionType::Income,
                category: Category::Salary,
                description: "Salary".to_owned(),
                date: date!(2024 - 01 - 05),
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
            Transaction {
                id: 2,
                user_id: UserID::new(1),
                amount: 300.0,
                transaction_type: TransactionType::Expense,
                category: Category::Food,
                description: "Groceries, weekly".to_owned(),
                date: date!(2024 - 01 - 10),
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        ]
    }

    #[test]
    fn transactions_csv_has_header_and_one_line_per_transaction() {
        let csv = transactions_csv(&example_transactions()).unwrap();

        assert_eq!(
            csv,
            "Data,Descrição,Categoria,Tipo,Valor\n\
            05/01/2024,Salary,salary,Receita,1000.00\n\
            10/01/2024,\"Groceries, weekly\",food,Despesa,300.00\n"
        );
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn report_csv_has_period_totals() {
        let buckets = bucket_by(&example_transactions(), Granularity::Month);

        let csv = report_csv(&buckets).unwrap();

        assert_eq!(
            csv,
            "Período,Receitas,Despesas,Saldo\n2024-01,1000.00,300.00,700.00\n"
        );
    }

    #[test]
    fn json_export_has_expected_shape() {
        let transactions = example_transactions();
        let export = DataExport {
            transactions: &transactions,
            goals: &[],
            export_date: datetime!(2024-02-01 12:00 UTC),
            user: ExportUser {
                name: "Maria",
                email: "maria@example.com",
            },
        };

        let json: Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(json["exportDate"], "2024-02-01T12:00:00Z");
        assert_eq!(json["user"]["name"], "Maria");
        assert_eq!(json["transactions"][0]["type"], "income");
        assert_eq!(json["transactions"][0]["date"], "2024-01-05");
        assert_eq!(json["goals"], Value::Array(Vec::new()));
    }

    #[test]
    fn attachment_sets_content_disposition() {
        let response = attachment_response(CSV_CONTENT_TYPE, "report.csv", String::new());

        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"report.csv\""
        );
    }
}
