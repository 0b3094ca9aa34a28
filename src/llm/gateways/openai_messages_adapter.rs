//! Conversion between `LlmMessage` and the OpenAI chat-completions wire format.

use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Render the conversation as the `messages` array of a chat-completions request.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Vec<Value> {
    messages.iter().map(adapt_message).collect()
}

fn adapt_message(msg: &LlmMessage) -> Value {
    match msg.role {
        MessageRole::System => json!({"role": "system", "content": msg.content_str()}),
        MessageRole::User => json!({"role": "user", "content": msg.content_str()}),
        MessageRole::Assistant => {
            let mut wire = json!({"role": "assistant"});

            if let Some(ref content) = msg.content {
                wire["content"] = json!(content);
            }

            if let Some(ref tool_calls) = msg.tool_calls {
                let calls: Vec<Value> = tool_calls.iter().map(adapt_tool_call).collect();
                wire["tool_calls"] = json!(calls);
            }

            wire
        }
        MessageRole::Tool => {
            // A tool message answers exactly one call.
            let tool_call_id = msg
                .tool_calls
                .as_ref()
                .and_then(|calls| calls.first())
                .and_then(|call| call.id.as_deref())
                .unwrap_or_default();

            json!({
                "role": "tool",
                "content": msg.content_str(),
                "tool_call_id": tool_call_id
            })
        }
    }
}

fn adapt_tool_call(call: &LlmToolCall) -> Value {
    let arguments = serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".to_string());

    json!({
        "id": call.id.as_deref().unwrap_or_default(),
        "type": "function",
        "function": {
            "name": call.name,
            "arguments": arguments
        }
    })
}

/// Parse the JSON-encoded argument string the model sends with a tool call.
///
/// Unparseable arguments become an empty map; the tool then reports the
/// missing argument back to the model.
pub fn parse_tool_arguments(name: &str, raw: &str) -> HashMap<String, Value> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }

    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(tool = name, error = %e, "Could not parse tool call arguments");
        HashMap::new()
    })
}
