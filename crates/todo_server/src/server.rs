//! HTTP server lifecycle.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handlers::AppState;
use crate::routes::create_router;
use axum::http::Method;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use todo_core::TodoService;
use todo_store::TodoStore;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// The todo HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    service: Arc<TodoService>,
}

impl TodoServer {
    /// Opens the store named by `config` and builds a server around it.
    ///
    /// Without a `data_path` the items live in memory and are lost on exit.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = match &config.data_path {
            Some(path) => {
                info!(path = %path.display(), "opening todo store");
                TodoStore::open(path)?
            }
            None => {
                info!("using in-memory todo store");
                TodoStore::open_in_memory()?
            }
        };
        let service = Arc::new(TodoService::new(Arc::new(store)));
        Ok(Self::with_service(config, service))
    }

    /// Builds a server around an existing service.
    pub fn with_service(config: ServerConfig, service: Arc<TodoService>) -> Self {
        Self { config, service }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the todo service.
    pub fn service(&self) -> &Arc<TodoService> {
        &self.service
    }

    /// Builds the router with CORS and request tracing applied.
    ///
    /// Every response is logged at `info` with its status and latency.
    pub fn router(&self) -> Router {
        let mut app = create_router(
            AppState::new(self.service.clone()),
            self.config.assets_dir.as_deref(),
        );

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        app.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        let app = self.router();

        info!("todo server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("todo server shutting down");
            })
            .await?;

        Ok(())
    }
}
