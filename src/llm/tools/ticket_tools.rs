use crate::error::Result;
use crate::llm::tools::{required_str, LlmTool, ToolDescriptor};
use crate::tracker::TrackerClient;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Tool that runs an arbitrary tracker query (JQL).
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use ticket_talk::llm::tools::ticket_tools::SearchTicketsTool;
/// use ticket_talk::tracker::TrackerClient;
///
/// let client = Arc::new(TrackerClient::new("https://tracker.example.com", "dana", "token")?);
/// let tool = SearchTicketsTool::new(client);
/// let args = HashMap::from([("jql".to_string(), json!("status = Open"))]);
/// let tickets = tool.run(&args).await?;
/// ```
#[derive(Clone)]
pub struct SearchTicketsTool {
    client: Arc<TrackerClient>,
}

impl SearchTicketsTool {
    pub fn new(client: Arc<TrackerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmTool for SearchTicketsTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let jql = required_str(args, "jql")?;
        let tickets = self.client.search(jql).await?;
        Ok(json!(tickets))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            "search_tickets",
            "Searches the ticket tracker with a JQL query and returns the matching tickets \
             with key, summary, status, assignee, description and issue type.",
            json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "The JQL query, e.g. 'project = OPS AND status = \"In Progress\"'."
                    }
                },
                "required": ["jql"]
            }),
        )
    }
}

/// Tool that lists every ticket of one project.
#[derive(Clone)]
pub struct ProjectTicketsTool {
    client: Arc<TrackerClient>,
}

impl ProjectTicketsTool {
    pub fn new(client: Arc<TrackerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmTool for ProjectTicketsTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let project_key = required_str(args, "project_key")?;
        let tickets = self.client.list_tickets_for_project(project_key).await?;
        Ok(json!(tickets))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            "get_all_tickets",
            "Retrieves a list of all tickets for a given project.",
            json!({
                "type": "object",
                "properties": {
                    "project_key": {
                        "type": "string",
                        "description": "This is the project key."
                    }
                },
                "required": ["project_key"]
            }),
        )
    }
}

/// Both tracker tools, ready to hand to the broker.
pub fn ticket_tools(client: Arc<TrackerClient>) -> Vec<Box<dyn LlmTool>> {
    vec![
        Box::new(SearchTicketsTool::new(Arc::clone(&client))),
        Box::new(ProjectTicketsTool::new(client)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(url: String) -> Arc<TrackerClient> {
        Arc::new(TrackerClient::new(url, "dana", "tok").unwrap())
    }

    #[test]
    fn test_descriptors() {
        let tools = ticket_tools(client_for("https://tracker.example.com".to_string()));
        let names: Vec<_> = tools.iter().map(|t| t.descriptor().function.name).collect();

        assert_eq!(names, vec!["search_tickets", "get_all_tickets"]);

        let params = tools[1].descriptor().function.parameters;
        assert_eq!(params["type"], "object");
        assert_eq!(params["required"][0], "project_key");
    }

    #[tokio::test]
    async fn test_search_tool_returns_ticket_array() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::UrlEncoded("jql".to_string(), "status = Open".to_string()))
            .with_status(200)
            .with_body(
                r#"{"issues":[{"key":"OPS-1","fields":{"summary":"Broken build","status":{"name":"Open"}}}]}"#,
            )
            .create_async()
            .await;

        let tool = SearchTicketsTool::new(client_for(server.url()));
        let args = HashMap::from([("jql".to_string(), json!("status = Open"))]);
        let result = tool.run(&args).await.unwrap();

        assert_eq!(result[0]["key"], "OPS-1");
        assert_eq!(result[0]["summary"], "Broken build");
        assert_eq!(result[0]["status"], "Open");
    }

    #[tokio::test]
    async fn test_project_tool_soft_fails_to_empty_array() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let tool = ProjectTicketsTool::new(client_for(server.url()));
        let args = HashMap::from([("project_key".to_string(), json!("OPS"))]);
        let result = tool.run(&args).await.unwrap();

        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_project_tool_requires_key() {
        let tool = ProjectTicketsTool::new(client_for("http://127.0.0.1:9".to_string()));
        let result = tool.run(&HashMap::new()).await;

        assert!(result.unwrap_err().to_string().contains("project_key"));
    }
}
