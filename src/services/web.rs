use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, trace};

use crate::services::Service;
use crate::state::AppState;
use crate::web::create_router;

/// Serves the calendar endpoints over HTTP.
pub struct WebService {
    port: u16,
    app_state: AppState,
}

impl WebService {
    pub fn new(port: u16, app_state: AppState) -> Self {
        Self { port, app_state }
    }
}

#[async_trait::async_trait]
impl Service for WebService {
    fn name(&self) -> &'static str {
        "web"
    }

    async fn run(&mut self) -> Result<(), anyhow::Error> {
        let app = create_router(self.app_state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await?;
        info!(
            service = "web",
            address = %addr,
            link = format!("http://localhost:{}", addr.port()),
            "web server listening"
        );

        axum::serve(listener, app).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), anyhow::Error> {
        // The server future is dropped with `run`; open connections close with it.
        trace!(service = "web", "web server stopped");
        Ok(())
    }
}
