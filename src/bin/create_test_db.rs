use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month, OffsetDateTime};

use zard_finance::{
    Category, Email, GoalCategory, GoalStatus, NewGoal, NewTransaction, PasswordHash,
    TransactionType, UserID, ValidatedPassword, create_goal, create_profile, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a database with demo data for Zard Finance.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "test";

/// Monthly expenses as (day of month, amount, category, description).
const MONTHLY_EXPENSES: [(u8, f64, Category, &str); 6] = [
    (1, 1800.0, Category::Housing, "Rent"),
    (8, 220.0, Category::Utilities, "Electricity and water"),
    (10, 650.0, Category::Food, "Groceries"),
    (15, 180.0, Category::Transport, "Bus pass"),
    (20, 120.0, Category::Entertainment, "Cinema and streaming"),
    (24, 480.0, Category::Food, "Groceries"),
];

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;
    initialize_db(&connection)?;

    println!("Creating demo user {DEMO_EMAIL} with the password '{DEMO_PASSWORD}'...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(&Email::new(DEMO_EMAIL)?, password_hash, &connection)?;
    create_profile(user.id, "Demo", &connection)?;

    println!("Creating a year of transactions...");
    let count = create_transactions(user.id, OffsetDateTime::now_utc().date(), &connection)?;
    println!("Created {count} transactions.");

    println!("Creating goals...");
    create_goals(user.id, &connection)?;

    println!("Success!");

    Ok(())
}

/// The first day of the month `months_back` months before `today`.
fn start_of_month(today: Date, months_back: u8) -> Result<Date, Box<dyn Error>> {
    let mut year = today.year();
    let mut month = today.month();

    for _ in 0..months_back {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    Ok(Date::from_calendar_date(year, month, 1)?)
}

fn create_transactions(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<usize, Box<dyn Error>> {
    let mut count = 0;

    for months_back in (0..12u8).rev() {
        let month_start = start_of_month(today, months_back)?;
        // Vary the amounts a little so the charts are not flat.
        let variation = 1.0 + f64::from(months_back % 4) * 0.05;

        let mut entries = vec![
            (5, 5200.0, TransactionType::Income, Category::Salary, "Salary"),
            (
                18,
                150.0 * variation,
                TransactionType::Income,
                Category::Investment,
                "Dividends",
            ),
        ];
        entries.extend(
            MONTHLY_EXPENSES
                .iter()
                .map(|&(day, amount, category, description)| {
                    (day, amount * variation, TransactionType::Expense, category, description)
                }),
        );

        for (day, amount, transaction_type, category, description) in entries {
            let date = month_start + Duration::days(i64::from(day) - 1);
            if date > today {
                continue;
            }

            let amount = (amount * 100.0).round() / 100.0;
            let transaction =
                NewTransaction::new(amount, transaction_type, category, description, date)?;
            create_transaction(user_id, &transaction, connection)?;
            count += 1;
        }
    }

    Ok(count)
}

fn create_goals(user_id: UserID, connection: &Connection) -> Result<(), Box<dyn Error>> {
    let goals = [
        NewGoal::new(
            "Emergency fund",
            20000.0,
            8500.0,
            GoalCategory::Emergency,
            None,
            GoalStatus::InProgress,
        )?,
        NewGoal::new(
            "Trip to Lisbon",
            9000.0,
            9000.0,
            GoalCategory::Travel,
            None,
            GoalStatus::Completed,
        )?,
        NewGoal::new(
            "New laptop",
            7500.0,
            1200.0,
            GoalCategory::Other,
            None,
            GoalStatus::Cancelled,
        )?,
    ];

    for goal in &goals {
        create_goal(user_id, goal, connection)?;
    }

    Ok(())
}
