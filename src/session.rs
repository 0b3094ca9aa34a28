//! The interactive chat loop.
//!
//! A [`ChatSession`] owns everything that changes while the user talks: the
//! settings, the conversation history and the console. Each input line is
//! classified by [`crate::command::parse`] and then either dispatched to a
//! command handler or sent to the model as a prompt. A prompt is fully
//! answered, appended and trimmed before the next line is read.

use crate::build_info;
use crate::command::{self, Command, Input};
use crate::console::{Console, LineSource, ReadOutcome};
use crate::error::Result;
use crate::llm::{CompletionConfig, ConversationHistory, LlmBroker, LlmTool};
use crate::settings::{ConfigStore, Settings};
use futures::stream::StreamExt;
use tracing::{debug, info, warn};

const INPUT_PROMPT: &str = "> ";

/// What the loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ChatSession {
    broker: LlmBroker,
    tools: Vec<Box<dyn LlmTool>>,
    history: ConversationHistory,
    settings: Settings,
    store: Box<dyn ConfigStore>,
    console: Console,
}

impl ChatSession {
    /// Start a session whose history holds only the configured system prompt.
    pub fn new(
        broker: LlmBroker,
        tools: Vec<Box<dyn LlmTool>>,
        settings: Settings,
        store: Box<dyn ConfigStore>,
        console: Console,
    ) -> Self {
        let history = ConversationHistory::new(settings.system_prompt.clone());

        Self {
            broker,
            tools,
            history,
            settings,
            store,
            console,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Read and handle lines until the user exits or input ends.
    pub async fn run(&mut self, input: &mut dyn LineSource) -> Result<()> {
        self.console.blank()?;
        self.console.system("========== start chatting with Jira now ===============")?;
        self.console.system("Type '/help' for help. Type '/exit' or '/quit' to quit.")?;
        self.console.info(&format!("Ticket Talk {}", build_info::summary()))?;

        loop {
            self.console.blank()?;

            match input.read_line(INPUT_PROMPT)? {
                ReadOutcome::Line(line) => {
                    if self.handle_line(&line).await? == LoopControl::Exit {
                        break;
                    }
                }
                ReadOutcome::Interrupted => {
                    self.console.system("Ctrl-C detected. Type '/exit' or '/quit' to quit.")?;
                }
                ReadOutcome::Eof => {
                    debug!("End of input");
                    break;
                }
            }
        }

        self.console.blank()?;
        self.console.system("Bye bye!")?;
        self.console.system("It was fun to talk to you.")?;
        Ok(())
    }

    /// Handle one raw input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<LoopControl> {
        match command::parse(line) {
            Input::Prompt(prompt) => {
                self.send_prompt(&prompt).await?;
            }
            Input::Command(Command::Exit) => return Ok(LoopControl::Exit),
            Input::Command(cmd) => self.dispatch(cmd)?,
            Input::Empty(reason) => {
                self.console.error(reason.message())?;
            }
        }

        Ok(LoopControl::Continue)
    }

    /// Send one prompt with the whole history and stream the reply to the console.
    ///
    /// Whatever text arrived is kept as the assistant's turn, even when the
    /// stream fails halfway; the error is shown after it.
    async fn send_prompt(&mut self, prompt: &str) -> Result<()> {
        self.history.push_user(prompt);

        let config = CompletionConfig {
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_output_tokens,
        };

        let mut reply = String::new();
        let mut failure = None;

        {
            let mut stream = self.broker.generate_stream(
                self.history.messages(),
                Some(self.tools.as_slice()),
                Some(config),
            );

            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(text) => {
                        self.console.reply_chunk(&text)?;
                        reply.push_str(&text);
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        self.console.end_reply()?;

        if let Some(e) = failure {
            warn!("Reply stream failed: {}", e);
            self.console.error(&format!("Error: {}", e))?;
        }

        self.history.push_assistant(reply);
        let removed = self.history.trim(self.settings.history_length);
        if removed > 0 {
            debug!("Trimmed {} message(s) from history", removed);
        }

        Ok(())
    }

    fn dispatch(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            // Exit never gets here.
            Command::Exit => Ok(()),
            Command::Help => self.show_help(),
            Command::Config => self.show_config(),
            Command::System => {
                self.console.system("Current system prompt:")?;
                self.console.info(&self.settings.system_prompt)
            }
            Command::Version => self.show_version(),
            Command::Model => self.console.error("Model command is not implemented yet."),
            Command::Clear => {
                self.history.clear();
                self.console.info("Chat history cleared.")
            }
            Command::History(body) => self.history_command(body.as_deref()),
            Command::Temperature(body) => self.temperature_command(body.as_deref()),
            Command::Tokens(body) => self.tokens_command(body.as_deref()),
        }
    }

    fn show_help(&mut self) -> Result<()> {
        for line in command::HELP_TEXT.lines() {
            self.console.info(line)?;
        }
        self.console.info("Type your question or prompt to start chatting with the AI.")
    }

    fn show_config(&mut self) -> Result<()> {
        self.console.system("Current configuration:")?;
        self.console.field(" - Current model:       ", &self.settings.model_name)?;
        self.console.field(" - History max. length: ", self.settings.history_length)?;
        self.console.field(" - Temperature:         ", self.settings.temperature)?;
        self.console.field(" - Max. Output Tokens:  ", self.settings.max_output_tokens)?;
        self.console.field(" - Settings file:       ", self.store.location())
    }

    fn show_version(&mut self) -> Result<()> {
        self.console.field(" - Version:      ", build_info::VERSION)?;
        self.console.field(" - Build Number: ", build_info::BUILD_NUMBER)?;
        self.console.field(" - Date:         ", build_info::BUILD_DATE)
    }

    fn history_command(&mut self, body: Option<&str>) -> Result<()> {
        let Some(body) = body else {
            self.console.info(&format!("Current history length: {}", self.history.pair_count()))?;
            return self.console.info(&format!(
                "Max history length:     {}",
                self.settings.history_length
            ));
        };

        let Some(length) = command::parse_history_length(body) else {
            return self.console.error(
                "Invalid history length. Please enter a valid number greater than or equal to zero.",
            );
        };

        self.settings.history_length = length;
        self.save_settings()?;
        self.history.trim(length);

        self.console.info(&format!("History length set to: {}", length))
    }

    fn temperature_command(&mut self, body: Option<&str>) -> Result<()> {
        let Some(body) = body else {
            return self
                .console
                .info(&format!("Current temperature: {}", self.settings.temperature));
        };

        let Some(temperature) = command::parse_temperature(body) else {
            return self
                .console
                .error("Invalid temperature. Please enter a valid number between 0 and 1.");
        };

        self.settings.temperature = temperature;
        self.save_settings()?;

        self.console.info(&format!("Temperature set to: {}", temperature))
    }

    fn tokens_command(&mut self, body: Option<&str>) -> Result<()> {
        let Some(body) = body else {
            return self.console.info(&format!(
                "Current max. output tokens: {}",
                self.settings.max_output_tokens
            ));
        };

        let Some(tokens) = command::parse_token_count(body) else {
            return self
                .console
                .error("Invalid token count. Please enter a valid number greater than zero.");
        };

        self.settings.max_output_tokens = tokens;
        self.save_settings()?;

        self.console.info(&format!("Max. Output Token set to: {}", tokens))
    }

    /// Write the settings through the store.
    ///
    /// A failed write is reported but the new in-memory value stays in effect.
    fn save_settings(&mut self) -> Result<()> {
        match self.store.persist(&self.settings) {
            Ok(()) => {
                info!("Settings saved to {}", self.store.location());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                self.console.error(&format!("could not save settings: {}", e))
            }
        }
    }
}
