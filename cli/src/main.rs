mod atomic_write;
mod config;
mod output;

use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use question_input_protocol::ConversationId;
use question_input_tui::ExitReason;
use question_input_tui::QuestionInputOptions;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigStore;
use crate::config::QuestionInputConfig;
use crate::output::EventOutput;

const DEFAULT_PLACEHOLDER: &str = "Type a question...";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Compose a question, optionally attach an image, and emit each send as a JSON line"
)]
struct Cli {
    /// Start with sending disabled. Typing still works; no send is emitted.
    #[arg(long, env = "QUESTION_INPUT_DISABLED")]
    disabled: bool,

    /// Text shown in the empty question field.
    #[arg(long)]
    placeholder: Option<String>,

    /// Clear the text and attachment after each send (the default unless config says otherwise).
    #[arg(long, overrides_with = "keep_on_send")]
    clear_on_send: bool,

    /// Keep the text and attachment after each send.
    #[arg(long, overrides_with = "clear_on_send")]
    keep_on_send: bool,

    /// Conversation to route sends to. Omitted from events when unset or empty.
    #[arg(long, env = "QUESTION_INPUT_CONVERSATION_ID")]
    conversation_id: Option<String>,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, env = "QUESTION_INPUT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Path to `config.toml`. Defaults to `~/.questioninput/config.toml`.
    #[arg(long, env = "QUESTION_INPUT_CONFIG")]
    config: Option<PathBuf>,

    /// Append events to this file as they are emitted instead of printing them on exit.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Save defaults to `config.toml` and exit.
    SetDefaults {
        #[arg(long)]
        placeholder: Option<String>,

        #[arg(long)]
        clear_on_send: Option<bool>,
    },
}

impl Cli {
    fn clear_on_send_override(&self) -> Option<bool> {
        if self.clear_on_send {
            Some(true)
        } else if self.keep_on_send {
            Some(false)
        } else {
            None
        }
    }

    fn config_store(&self) -> anyhow::Result<ConfigStore> {
        match &self.config {
            Some(path) => Ok(ConfigStore::new(path.clone())),
            None => ConfigStore::new_default(),
        }
    }

    /// Flags win over the config file.
    fn session_options(&self, config: QuestionInputConfig) -> QuestionInputOptions {
        QuestionInputOptions {
            placeholder_text: self
                .placeholder
                .clone()
                .or(config.placeholder)
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            disabled: self.disabled,
            clear_on_send: self
                .clear_on_send_override()
                .unwrap_or(config.clear_on_send),
            conversation_id: self.conversation_id.clone().and_then(ConversationId::new),
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let store = cli.config_store()?;

    if let Some(CliCommand::SetDefaults {
        placeholder,
        clear_on_send,
    }) = &cli.command
    {
        if let Some(placeholder) = placeholder {
            store.set_placeholder(placeholder)?;
        }
        if let Some(clear_on_send) = clear_on_send {
            store.set_clear_on_send(*clear_on_send)?;
        }
        eprintln!("saved defaults to {}", store.path().display());
        return Ok(());
    }

    let config = store.load().unwrap_or_else(|err| {
        tracing::warn!("ignoring unreadable config {}: {err:#}", store.path().display());
        QuestionInputConfig::default()
    });
    let options = cli.session_options(config);
    tracing::info!(
        disabled = options.disabled,
        clear_on_send = options.clear_on_send,
        conversation_id = options.conversation_id.as_ref().map(ConversationId::as_str),
        "starting question input"
    );

    let mut output = EventOutput::open(cli.output.as_deref())?;
    let exit_info =
        question_input_tui::run_question_input(options, |event| output.record(event)).await?;
    tracing::info!(
        sent = exit_info.sent_count,
        reason = ?exit_info.exit_reason,
        "question input exited"
    );

    let mut stdout = std::io::stdout().lock();
    output.finish(&mut stdout)?;
    if exit_info.exit_reason == ExitReason::InputClosed {
        eprintln!("terminal input closed");
    }
    if exit_info.unsent_draft.is_some() {
        eprintln!("unsent draft discarded");
    }
    Ok(())
}

/// Send logs to `~/.questioninput/log/question-input.log`; the terminal belongs to the UI.
fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let Some(home) = dirs::home_dir() else {
        anyhow::bail!("cannot determine home directory for log path");
    };
    let log_path = default_log_path(&home);
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install tracing subscriber: {err}"))
}

fn default_log_path(home: &Path) -> PathBuf {
    home.join(".questioninput")
        .join("log")
        .join("question-input.log")
}
