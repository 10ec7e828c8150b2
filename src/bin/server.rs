use std::{env, fs::OpenOptions, net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zard_finance::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The web server for Zard Finance.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to a directory with an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used for "today", e.g. "America/Sao_Paulo".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Reasons the server could not start or stopped early.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("\"{0}\" is not a valid canonical timezone name")]
    Timezone(String),

    #[error("the environment variable 'SECRET' must be set")]
    MissingSecret,

    #[error("could not load TLS certificates from {0}: {1}")]
    Tls(String, std::io::Error),

    #[error("could not open database at {0}: {1}")]
    Database(String, rusqlite::Error),

    #[error("could not initialize the app: {0}")]
    State(zard_finance::Error),

    #[error("server stopped with an error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = setup_logging() {
        eprintln!("Could not create log file: {error}");
        return ExitCode::FAILURE;
    }

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        return Err(StartupError::Timezone(args.timezone));
    }
    let secret = env::var("SECRET").map_err(|_| StartupError::MissingSecret)?;

    let tls_config = RustlsConfig::from_pem_file(
        args.cert_path.join("cert.pem"),
        args.cert_path.join("key.pem"),
    )
    .await
    .map_err(|error| StartupError::Tls(args.cert_path.display().to_string(), error))?;

    let connection = Connection::open(&args.db_path)
        .map_err(|error| StartupError::Database(args.db_path.clone(), error))?;
    let state =
        AppState::new(connection, &secret, &args.timezone).map_err(StartupError::State)?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = with_request_spans(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );
    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTPS server listening on {addr}");

    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .map_err(StartupError::Serve)
}

/// Info and up goes to stdout, debug and up to `debug.log`.
fn setup_logging() -> std::io::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(LevelFilter::INFO);
    let file_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(file_log)
        .init();

    Ok(())
}

fn with_request_spans(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::debug_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    matched_path,
                )
            })
            // Errors are logged where they happen, so 5xx responses are not logged again here.
            .on_failure(()),
    )
}
