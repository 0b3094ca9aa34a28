use anyhow::{Context, Result};
use std::sync::Arc;
use ticket_talk::console::{Console, ReadlineSource};
use ticket_talk::llm::gateways::{AzureOpenAIConfig, AzureOpenAIGateway};
use ticket_talk::llm::tools::ticket_tools;
use ticket_talk::llm::LlmBroker;
use ticket_talk::session::ChatSession;
use ticket_talk::settings::{ConfigStore, JsonFileConfigStore};
use ticket_talk::tracker::TrackerClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they never interleave with the streamed reply.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut session = match build_session() {
        Ok(session) => session,
        Err(e) => {
            Console::stdout().error(&format!("{:#}", e))?;
            std::process::exit(1);
        }
    };

    let mut input = ReadlineSource::new()?;
    session.run(&mut input).await?;

    Ok(())
}

/// Check every startup precondition and wire the session together.
fn build_session() -> Result<ChatSession> {
    let azure = AzureOpenAIConfig::from_env().context("Azure OpenAI is not configured")?;

    let store = JsonFileConfigStore::default_location()?;
    let settings = store
        .load()
        .with_context(|| format!("Failed to load settings from {}", store.location()))?;

    settings
        .tracker
        .validate()
        .with_context(|| format!("Fix the tracker section in {}", store.location()))?;

    let gateway = Arc::new(AzureOpenAIGateway::new(azure).context("Failed to create the LLM client")?);
    let tracker = Arc::new(TrackerClient::new(
        settings.tracker.base_url.trim(),
        settings.tracker.username.trim(),
        settings.tracker.api_token.trim(),
    )?);
    let broker = LlmBroker::new(settings.model_name.clone(), gateway);

    Ok(ChatSession::new(
        broker,
        ticket_tools(tracker),
        settings,
        Box::new(store),
        Console::stdout(),
    ))
}
