use std::{fmt::Display, io, path::PathBuf, process::ExitCode};

use clap::Parser;
use rusqlite::Connection;

use zard_finance::{PasswordHash, ValidatedPassword, get_user_by_email, update_password};

/// A utility for changing the password of a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The email address the user logs in with.
    #[arg(long)]
    email: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match reset_password(&args) {
        Ok(true) => {
            println!("Password updated successfully!");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("Password left unchanged.");
            ExitCode::SUCCESS
        }
        Err(message) => {
            print_error(message);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` if the user closed stdin before picking a password.
fn reset_password(args: &Args) -> Result<bool, String> {
    if !args.db_path.is_file() {
        return Err(format!("No database file at {}", args.db_path.display()));
    }

    let connection = Connection::open(&args.db_path)
        .map_err(|error| format!("Could not open {}: {error}", args.db_path.display()))?;
    let user = get_user_by_email(&args.email, &connection)
        .map_err(|error| format!("Could not find the user {}: {error}", args.email))?;
    println!("Resetting password for {}", user.email);

    let Some(password_hash) = ask_for_new_password(&user.email) else {
        return Ok(false);
    };

    update_password(user.id, &password_hash, &connection)
        .map_err(|error| format!("Could not save the new password: {error}"))?;

    Ok(true)
}

/// Keeps asking until the user enters a strong password twice, or closes stdin.
fn ask_for_new_password(email: &str) -> Option<PasswordHash> {
    loop {
        println!();
        let password = read_hidden("New password: ")?;

        let validated = match ValidatedPassword::new_with_user_inputs(&password, &[email]) {
            Ok(validated) => validated,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        if read_hidden("Repeat the new password: ")? != password {
            print_error("The passwords do not match, try again.");
            continue;
        }

        match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
            Ok(hash) => return Some(hash),
            Err(error) => print_error(format!("Could not hash the password: {error}")),
        }
    }
}

fn read_hidden(message: &str) -> Option<String> {
    rpassword::prompt_password(message)
        .inspect_err(|error| {
            if error.kind() != io::ErrorKind::UnexpectedEof {
                print_error(format!("Could not read from stdin: {error}"));
            }
        })
        .ok()
}

fn print_error(message: impl Display) {
    eprintln!("\x1b[31;1m{message}\x1b[0m");
}
