use clap::Parser;
use cycling_calendar::app::{App, render_file};
use cycling_calendar::cli::{Args, Command};
use cycling_calendar::config::Config;
use cycling_calendar::logging::setup_logging;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load config and setup logging before anything else so startup logs are never dropped
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:?}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Render(render) => match render_file(&config, &render) {
            Ok(calendar) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(calendar.as_bytes()) {
                    error!(error = ?e, "Failed to write calendar");
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = ?e, "Render failed");
                ExitCode::FAILURE
            }
        },
    }
}

async fn serve(config: Config) -> ExitCode {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting cycling-calendar"
    );

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.setup_services() {
        error!(error = ?e, "Failed to setup services");
        return ExitCode::FAILURE;
    }

    app.start_services();
    app.run().await
}
