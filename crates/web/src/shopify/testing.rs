//! Scripted Admin API transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use merchant_app_core::{AuthScopes, Session, ShopDomain};

use super::{AdminGraphql, AdminShopifyError};

type Reply = Result<serde_json::Value, AdminShopifyError>;

/// Replies with queued responses in order and records every request body.
pub struct StubGraphql {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl StubGraphql {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminGraphql for StubGraphql {
    async fn post(
        &self,
        _session: &Session,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AdminShopifyError> {
        self.requests.lock().unwrap().push(body);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AdminShopifyError::OAuth("no scripted reply".to_string())))
    }
}

pub fn test_session() -> Session {
    Session::offline(
        ShopDomain::parse("store.myshopify.com").unwrap(),
        "state",
        AuthScopes::parse("write_products"),
        "shpat_token",
    )
}
