use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound on tool-call rounds within a single turn.
const MAX_TOOL_ROUNDS: usize = 8;

/// Main interface for LLM interactions
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate streaming text response from LLM
    ///
    /// Returns a stream that yields content chunks as they arrive. When the model
    /// requests tool calls, the broker executes them, appends the results to a
    /// private copy of the conversation and streams the model's follow-up.
    ///
    /// A failing tool does not end the stream: its error is handed back to the
    /// model as the tool result. Gateway errors end the stream after being yielded.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::stream::StreamExt;
    ///
    /// let broker = LlmBroker::new("gpt-4o", gateway);
    /// let messages = vec![LlmMessage::user("Which tickets are open in OPS?")];
    ///
    /// let mut stream = broker.generate_stream(&messages, Some(&tools), None);
    /// while let Some(result) = stream.next().await {
    ///     match result {
    ///         Ok(chunk) => print!("{}", chunk),
    ///         Err(e) => eprintln!("Error: {}", e),
    ///     }
    /// }
    /// ```
    pub fn generate_stream<'a>(
        &'a self,
        messages: &'a [LlmMessage],
        tools: Option<&'a [Box<dyn LlmTool>]>,
        config: Option<CompletionConfig>,
    ) -> Pin<Box<dyn Stream<Item = Result<String>> + 'a>> {
        let config = config.unwrap_or_default();

        Box::pin(async_stream::stream! {
            let mut current_messages = messages.to_vec();

            for round in 0..=MAX_TOOL_ROUNDS {
                let mut accumulated_content = String::new();
                let mut accumulated_tool_calls = Vec::new();

                {
                    let mut stream = self.gateway.complete_stream(
                        &self.model,
                        &current_messages,
                        tools,
                        &config,
                    );

                    while let Some(chunk_result) = stream.next().await {
                        match chunk_result {
                            Ok(StreamChunk::Content(content)) => {
                                accumulated_content.push_str(&content);
                                yield Ok(content);
                            }
                            Ok(StreamChunk::ToolCalls(tool_calls)) => {
                                accumulated_tool_calls.extend(tool_calls);
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }

                if accumulated_tool_calls.is_empty() {
                    return;
                }

                let Some(tools) = tools else {
                    warn!("LLM requested tool calls but no tools provided");
                    return;
                };

                if round == MAX_TOOL_ROUNDS {
                    warn!("Giving up after {} tool rounds", MAX_TOOL_ROUNDS);
                    return;
                }

                info!("Processing {} tool call(s) in stream", accumulated_tool_calls.len());

                let content = (!accumulated_content.is_empty()).then_some(accumulated_content);
                current_messages.push(LlmMessage::assistant_tool_calls(
                    content,
                    accumulated_tool_calls.clone(),
                ));

                for tool_call in &accumulated_tool_calls {
                    let output = Self::run_tool(tools, tool_call).await;
                    current_messages.push(LlmMessage::tool_result(output, tool_call));
                }
            }
        })
    }

    /// Run one tool call and render its outcome as the tool message content.
    async fn run_tool(tools: &[Box<dyn LlmTool>], tool_call: &LlmToolCall) -> String {
        let Some(tool) = tools.iter().find(|t| t.matches(&tool_call.name)) else {
            warn!("Tool not found: {}", tool_call.name);
            return json!({"error": format!("unknown tool: {}", tool_call.name)}).to_string();
        };

        info!("Executing tool: {}", tool_call.name);

        match tool.run(&tool_call.arguments).await {
            Ok(output) => output.to_string(),
            Err(e) => {
                warn!("Tool execution failed: {}", e);
                json!({"error": e.to_string()}).to_string()
            }
        }
    }
}
