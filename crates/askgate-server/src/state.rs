use std::sync::Arc;

use askgate_dispatch::Dispatcher;

/// Shared application state accessible from axum routes. The dispatcher owns
/// the process-wide flag and provider clients; request logic never mutates it.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}
