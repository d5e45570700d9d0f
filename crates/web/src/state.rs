//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::session_storage::SessionStorage;
use crate::shopify::{AdminGraphql, HttpAdminGraphql, OAuthClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the Admin API transport, the OAuth client and stored
/// merchant sessions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    graphql: Arc<dyn AdminGraphql>,
    oauth: OAuthClient,
    sessions: SessionStorage,
}

impl AppState {
    /// Create the production state: HTTPS transport and empty storage.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let graphql = Arc::new(HttpAdminGraphql::new(&config.shopify));
        let oauth = OAuthClient::new(&config.shopify);
        Self::from_parts(config, graphql, oauth, SessionStorage::new())
    }

    /// Assemble a state from explicit parts.
    #[must_use]
    pub fn from_parts(
        config: AppConfig,
        graphql: Arc<dyn AdminGraphql>,
        oauth: OAuthClient,
        sessions: SessionStorage,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                graphql,
                oauth,
                sessions,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the Admin API transport.
    #[must_use]
    pub fn graphql(&self) -> &dyn AdminGraphql {
        self.inner.graphql.as_ref()
    }

    /// Get the OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }

    /// Get the merchant session storage.
    #[must_use]
    pub fn sessions(&self) -> &SessionStorage {
        &self.inner.sessions
    }
}
