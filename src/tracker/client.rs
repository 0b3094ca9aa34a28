//! Read-only search client for the ticket tracker's REST API.
//!
//! Every call opens its own connection: the underlying client keeps no idle
//! connections around, so nothing is pooled between lookups.

use crate::error::Result;
use crate::tracker::models::{SearchResponse, TicketResult};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, info, warn};

const SEARCH_PATH: &str = "/rest/api/2/search";

pub struct TrackerClient {
    client: Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl TrackerClient {
    /// Create a client for the tracker at `base_url`, authenticating with a bearer token.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(0).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            username: username.into(),
            api_token: api_token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, jql: &str) -> String {
        format!("{}{}?jql={}", self.base_url, SEARCH_PATH, urlencoding::encode(jql))
    }

    /// Run a query in the tracker's query language.
    ///
    /// A non-success HTTP status is a soft failure: it is logged with the status
    /// code and an empty list is returned. A success response whose body is not
    /// valid JSON is a hard failure and is returned as an error.
    pub async fn search(&self, jql: &str) -> Result<Vec<TicketResult>> {
        debug!(user = %self.username, jql = jql, "Searching tracker");

        let response = self
            .client
            .get(self.search_url(jql))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), jql = jql, "Tracker request failed: {}", status);
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        let tickets = Self::parse_search_response(&body)?;

        info!("Tracker returned {} ticket(s)", tickets.len());
        Ok(tickets)
    }

    /// All tickets of one project.
    pub async fn list_tickets_for_project(&self, project_key: &str) -> Result<Vec<TicketResult>> {
        self.search(&format!("project = {}", project_key)).await
    }

    pub(crate) fn parse_search_response(body: &str) -> Result<Vec<TicketResult>> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response.into_tickets())
    }
}
