use crate::cli::RenderArgs;
use crate::config::Config;
use crate::filter::CategoryFilter;
use crate::pipeline::{parse_document, render_calendar};
use crate::services::Service;
use crate::services::janitor::CacheJanitor;
use crate::services::manager::ServiceManager;
use crate::services::web::WebService;
use crate::source::{RaceCache, SourceClient};
use crate::state::AppState;
use crate::utils::fmt_duration;
use anyhow::Context;
use chrono::{Datelike, Utc};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
    service_manager: ServiceManager,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let client = SourceClient::new(&config).context("Failed to create source client")?;
        let race_cache = RaceCache::new(config.cache_ttl);

        info!(
            ttl = fmt_duration(config.cache_ttl),
            eviction_interval = fmt_duration(config.cache_eviction_interval),
            fetch_timeout = fmt_duration(config.fetch_timeout),
            "race cache configured"
        );

        let app_state = AppState::new(Arc::new(client), race_cache, &config.calendar_name);

        Ok(App {
            config,
            app_state,
            service_manager: ServiceManager::new(),
        })
    }

    /// Register the web server and the cache janitor
    pub fn setup_services(&mut self) -> Result<(), anyhow::Error> {
        let web_service = Box::new(WebService::new(self.config.port, self.app_state.clone()));
        self.service_manager
            .register_service(web_service.name(), web_service);

        let janitor = Box::new(CacheJanitor::new(
            self.app_state.race_cache.clone(),
            self.config.cache_eviction_interval,
        ));
        self.service_manager
            .register_service(janitor.name(), janitor);

        if !self.service_manager.has_services() {
            error!("No services enabled. Cannot start application.");
            return Err(anyhow::anyhow!("No services enabled"));
        }

        Ok(())
    }

    /// Start all registered services
    pub fn start_services(&mut self) {
        self.service_manager.spawn_all();
    }

    /// Run the application and handle shutdown signals
    pub async fn run(self) -> ExitCode {
        use crate::services::signals::handle_shutdown_signals;
        handle_shutdown_signals(self.service_manager, self.config.shutdown_timeout).await
    }
}

/// Read a saved listing and return it as a calendar document.
pub fn render_file(config: &Config, args: &RenderArgs) -> Result<String, anyhow::Error> {
    let document = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let filter = CategoryFilter::new(args.classes.iter().cloned())?;
    let year = args.year.unwrap_or_else(|| Utc::now().year());

    let races = parse_document(args.format, &document, year)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    info!(
        input = %args.input.display(),
        format = %args.format,
        races = races.len(),
        "Parsed listing file"
    );

    Ok(render_calendar(&races, &filter, &config.calendar_name))
}
