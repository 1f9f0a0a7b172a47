//! In-memory implementation of the inventory REST backend.
//!
//! Serves the same routes as the real backend so the client and services can
//! be exercised end to end without a database.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{debug, warn};

pub mod error;
pub mod routes;
pub mod seed;
pub mod state;

pub use state::{MockOptions, MockState, MockStore};

use crate::error::ApiError;

/// Records each request and applies any injected failure before routing.
async fn record_request(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    let failure = {
        let mut store = state.store.write().await;
        store.requests.push(line.clone());
        store.take_failure(&line)
    };
    if let Some(status) = failure {
        debug!(request = %line, status = status.as_u16(), "Injecting failure");
        return ApiError::Injected(status).into_response();
    }
    next.run(request).await
}

pub fn app(state: MockState) -> Router {
    routes::router()
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

/// A mock backend listening on an ephemeral localhost port.
///
/// The server task is aborted when this value is dropped.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(MockOptions::default()).await
    }

    pub async fn spawn_with(options: MockOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        Self::serve(listener, options).await
    }

    pub async fn serve(listener: TcpListener, options: MockOptions) -> std::io::Result<Self> {
        let addr = listener.local_addr()?;
        let state = MockState::new(options);
        let router = app(state.clone());
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                warn!(error = %e, "Mock server stopped");
            }
        });
        debug!(%addr, "Mock server listening");
        Ok(Self { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// Load the same fixtures as `GET /create-dummy-exhibits`.
    pub async fn seed(&self) {
        seed::populate(&mut *self.state.store.write().await);
    }

    /// Wait for the server task; only returns if serving fails.
    pub async fn join(mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
