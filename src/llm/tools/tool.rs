use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Descriptor for tool function parameters
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// A named, typed capability the model may invoke zero or more times per turn.
#[async_trait]
pub trait LlmTool: Send + Sync {
    /// Execute the tool with given arguments
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }
}

/// Fetch a required, non-blank string argument.
pub fn required_str<'a>(args: &'a HashMap<String, Value>, name: &str) -> Result<&'a str> {
    let value = args
        .get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .ok_or_else(|| {
            crate::error::TicketTalkError::ToolError(format!("Missing required argument: {}", name))
        })?;

    if value.is_empty() {
        return Err(crate::error::TicketTalkError::ToolError(format!(
            "Argument cannot be empty: {}",
            name
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_descriptor_serialization() {
        let descriptor = ToolDescriptor::function(
            "search_tickets",
            "Search tickets",
            json!({"type": "object", "properties": {"jql": {"type": "string"}}}),
        );

        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"type\":\"function\""));
        assert!(json.contains("search_tickets"));
        assert!(json.contains("Search tickets"));
    }

    struct EchoTool;

    #[async_trait]
    impl LlmTool for EchoTool {
        async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
            Ok(json!(required_str(args, "text")?))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function("echo", "Echo text", json!({}))
        }
    }

    #[test]
    fn test_tool_matches() {
        let tool = EchoTool;
        assert!(tool.matches("echo"));
        assert!(!tool.matches("other_tool"));
    }

    #[tokio::test]
    async fn test_tool_run() {
        let args = HashMap::from([("text".to_string(), json!("  hi "))]);
        let result = EchoTool.run(&args).await.unwrap();
        assert_eq!(result, json!("hi"));
    }

    #[test]
    fn test_required_str_missing_and_blank() {
        let missing = required_str(&HashMap::new(), "jql").unwrap_err();
        assert!(missing.to_string().contains("Missing required argument: jql"));

        let args = HashMap::from([("jql".to_string(), json!("   "))]);
        let blank = required_str(&args, "jql").unwrap_err();
        assert!(blank.to_string().contains("Argument cannot be empty: jql"));

        let args = HashMap::from([("jql".to_string(), json!(42))]);
        assert!(required_str(&args, "jql").is_err());
    }
}
