//! Azure OpenAI gateway.
//!
//! Talks to a chat-completions deployment over server-sent events. The model
//! name doubles as the deployment name.

use crate::error::{Result, TicketTalkError};
use crate::llm::gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::gateways::openai_messages_adapter::{
    adapt_messages_to_openai, parse_tool_arguments,
};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream::StreamExt;
use reqwest::{Client, Proxy};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// Connection settings for an Azure OpenAI resource.
#[derive(Debug, Clone)]
pub struct AzureOpenAIConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub proxy: Option<String>,
}

impl AzureOpenAIConfig {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            proxy: None,
        }
    }

    /// Read `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT`,
    /// `AZURE_OPENAI_API_VERSION` and `HTTP_PROXY`.
    ///
    /// Key and endpoint are required; blank values count as missing.
    pub fn from_env() -> Result<Self> {
        let api_key = required_env("AZURE_OPENAI_API_KEY")?;
        let endpoint = required_env("AZURE_OPENAI_ENDPOINT")?;

        let mut config = Self::new(api_key, endpoint);
        if let Some(version) = optional_env("AZURE_OPENAI_API_VERSION") {
            config.api_version = version;
        }
        config.proxy = optional_env("HTTP_PROXY");

        Ok(config)
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(name: &str) -> Result<String> {
    optional_env(name).ok_or_else(|| {
        TicketTalkError::ConfigError(format!("Environment variable {} is not set", name))
    })
}

/// Gateway for Azure-hosted OpenAI chat models.
pub struct AzureOpenAIGateway {
    client: Client,
    config: AzureOpenAIConfig,
}

impl AzureOpenAIGateway {
    pub fn new(config: AzureOpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(ref proxy_url) = config.proxy {
            info!(proxy = %proxy_url, "Routing LLM traffic through proxy");
            client_builder = client_builder.proxy(Proxy::all(proxy_url)?);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            deployment,
            self.config.api_version
        )
    }

    fn request_body(
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        config: &CompletionConfig,
    ) -> Result<Value> {
        let mut body = json!({
            "messages": adapt_messages_to_openai(messages),
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
            "stream": true
        });

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            let tool_defs: Vec<_> = tools.iter().map(|t| t.descriptor()).collect();
            body["tools"] = serde_json::to_value(tool_defs)?;
        }

        Ok(body)
    }
}

impl LlmGateway for AzureOpenAIGateway {
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: Option<&'a [Box<dyn LlmTool>]>,
        config: &'a CompletionConfig,
    ) -> ChunkStream<'a> {
        Box::pin(async_stream::stream! {
            info!("Starting Azure OpenAI streaming completion");
            debug!("Deployment: {}, Message count: {}", model, messages.len());

            let body = match Self::request_body(messages, tools, config) {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let response = match self
                .client
                .post(self.completions_url(model))
                .header("api-key", &self.config.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                yield Err(TicketTalkError::GatewayError(format!(
                    "Azure OpenAI API error: {} - {}",
                    status, error_text
                )));
                return;
            }

            let mut stream = response.bytes_stream();
            let mut lines = SseLineBuffer::default();
            let mut tool_calls = ToolCallAccumulator::default();

            while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };

                lines.push(&bytes);

                while let Some(line) = lines.next_line() {
                    let Some(data) = line.trim().strip_prefix("data:").map(str::trim) else {
                        continue;
                    };

                    if data == "[DONE]" {
                        if let Some(calls) = tool_calls.take() {
                            yield Ok(StreamChunk::ToolCalls(calls));
                        }
                        continue;
                    }

                    let event = match serde_json::from_str::<Value>(data) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!("Failed to parse streaming chunk: {}", e);
                            continue;
                        }
                    };

                    // Azure sends a leading content-filter event with no choices.
                    let Some(choice) = event["choices"].as_array().and_then(|c| c.first()) else {
                        continue;
                    };

                    let delta = &choice["delta"];

                    if let Some(content) = delta["content"].as_str() {
                        if !content.is_empty() {
                            yield Ok(StreamChunk::Content(content.to_string()));
                        }
                    }

                    if let Some(fragments) = delta["tool_calls"].as_array() {
                        for fragment in fragments {
                            tool_calls.add_fragment(fragment);
                        }
                    }

                    if choice["finish_reason"].as_str() == Some("tool_calls") {
                        if let Some(calls) = tool_calls.take() {
                            yield Ok(StreamChunk::ToolCalls(calls));
                        }
                    }
                }
            }

            // Stream closed without [DONE]
            if let Some(calls) = tool_calls.take() {
                yield Ok(StreamChunk::ToolCalls(calls));
            }
        })
    }
}

/// Splits the raw SSE byte stream into lines.
///
/// Bytes are only decoded once a whole line has arrived, so a multi-byte
/// character split across network chunks stays intact.
#[derive(Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line without its terminator, or `None` until more bytes arrive.
    fn next_line(&mut self) -> Option<String> {
        loop {
            let line_end = self.pending.iter().position(|&b| b == b'\n')?;
            let raw: Vec<u8> = self.pending.drain(..=line_end).collect();

            match std::str::from_utf8(&raw) {
                Ok(line) => return Some(line.trim_end_matches(['\r', '\n']).to_string()),
                Err(e) => warn!("Skipping SSE line that is not valid UTF-8: {}", e),
            }
        }
    }
}

#[derive(Default)]
struct PartialToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Collects streamed tool-call fragments, keyed by their index in the response.
#[derive(Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u64, PartialToolCall>,
}

impl ToolCallAccumulator {
    fn add_fragment(&mut self, fragment: &Value) {
        let Some(index) = fragment["index"].as_u64() else {
            return;
        };

        let call = self.calls.entry(index).or_default();

        if let Some(id) = fragment["id"].as_str() {
            call.id = Some(id.to_string());
        }
        if let Some(name) = fragment["function"]["name"].as_str() {
            call.name = Some(name.to_string());
        }
        if let Some(args) = fragment["function"]["arguments"].as_str() {
            call.arguments.push_str(args);
        }
    }

    /// Complete calls in index order, leaving the accumulator empty.
    ///
    /// Fragments that never received a function name are dropped.
    fn take(&mut self) -> Option<Vec<LlmToolCall>> {
        let calls: Vec<LlmToolCall> = std::mem::take(&mut self.calls)
            .into_values()
            .filter_map(|partial| {
                let name = partial.name?;
                Some(LlmToolCall {
                    id: partial.id,
                    arguments: parse_tool_arguments(&name, &partial.arguments),
                    name,
                })
            })
            .collect();

        (!calls.is_empty()).then_some(calls)
    }
}
