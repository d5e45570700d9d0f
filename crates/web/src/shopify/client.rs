//! Shopify Admin API GraphQL transport and session-bound client.
//!
//! [`AdminGraphql`] posts one GraphQL document on behalf of a merchant
//! session and returns the raw JSON body. [`AdminApi`] wraps a transport and
//! a session and executes typed `graphql_client` operations on top of it.

use async_trait::async_trait;
use graphql_client::GraphQLQuery;
use merchant_app_core::Session;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::ShopifyAppConfig;

use super::{AdminShopifyError, GraphQLError, GraphQLErrorLocation};

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Sends GraphQL documents to the Admin API of a session's shop.
#[async_trait]
pub trait AdminGraphql: Send + Sync {
    /// Post `body` (`{query, variables, operationName}`) and return the
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no token, the request fails or
    /// Shopify answers with a non-success status.
    async fn post(
        &self,
        session: &Session,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AdminShopifyError>;
}

/// Admin API transport over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpAdminGraphql {
    client: reqwest::Client,
    api_version: String,
    origin: Option<String>,
}

impl HttpAdminGraphql {
    /// Create a transport for the configured API version.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_version: config.api_version.clone(),
            origin: None,
        }
    }

    /// Send every request to `origin` instead of `https://{shop}`.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into().trim_end_matches('/').to_string());
        self
    }

    fn endpoint(&self, session: &Session) -> String {
        let origin = self
            .origin
            .clone()
            .unwrap_or_else(|| session.shop.origin());
        format!("{origin}/admin/api/{}/graphql.json", self.api_version)
    }
}

#[async_trait]
impl AdminGraphql for HttpAdminGraphql {
    #[instrument(skip(self, session, body), fields(shop = %session.shop))]
    async fn post(
        &self,
        session: &Session,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AdminShopifyError> {
        let access_token = session
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(AdminShopifyError::NoAccessToken)?;

        let response = self
            .client
            .post(self.endpoint(session))
            .header(ACCESS_TOKEN_HEADER, access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

/// Admin API client bound to one merchant session.
#[derive(Clone, Copy)]
pub struct AdminApi<'a> {
    graphql: &'a dyn AdminGraphql,
    session: &'a Session,
}

impl<'a> AdminApi<'a> {
    /// Bind `graphql` to `session`.
    #[must_use]
    pub const fn new(graphql: &'a dyn AdminGraphql, session: &'a Session) -> Self {
        Self { graphql, session }
    }

    /// The session requests are made for.
    #[must_use]
    pub const fn session(&self) -> &'a Session {
        self.session
    }

    /// Execute a typed GraphQL operation.
    ///
    /// # Errors
    ///
    /// Returns the transport error, `AdminShopifyError::GraphQL` when the
    /// response carries errors or no data, and `AdminShopifyError::Parse`
    /// when the data does not match the operation's response type.
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = serde_json::to_value(Q::build_query(variables))?;
        let raw = self.graphql.post(self.session, body).await?;
        decode_response::<Q::ResponseData>(raw)
    }
}

fn decode_response<T: DeserializeOwned>(raw: serde_json::Value) -> Result<T, AdminShopifyError> {
    let response: GraphQLResponse<T> = serde_json::from_value(raw)?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        let converted_errors: Vec<GraphQLError> = errors
            .into_iter()
            .map(|e| GraphQLError {
                message: e.message,
                locations: e
                    .locations
                    .into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: l.line,
                        column: l.column,
                    })
                    .collect(),
                path: e.path,
            })
            .collect();
        return Err(AdminShopifyError::GraphQL(converted_errors));
    }

    response.data.ok_or_else(|| {
        AdminShopifyError::GraphQL(vec![GraphQLError {
            message: "No data in response".to_string(),
            locations: vec![],
            path: vec![],
        }])
    })
}
