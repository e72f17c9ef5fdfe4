//! `interviewer`: validate interview configs and run interviews from the terminal.

mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use interviewer_core::{InterviewConfig, Message, TurnState};
use interviewer_runtime::{InterviewEngine, LanguageService, RuntimeConfig, TurnOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "interviewer",
    about = "Run structured screener and exit interviews",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an interview config and print a summary
    Validate {
        /// Interview config (.yaml, .yml or .json)
        config: PathBuf,
    },
    /// Run an interview interactively over stdin/stdout
    Run(RunArgs),
    /// Advance a persisted interview by one turn
    Turn(TurnArgs),
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Interview config (.yaml, .yml or .json)
    config: PathBuf,

    /// Runtime config (timeouts, circuit breaker, model)
    #[arg(long)]
    runtime_config: Option<PathBuf>,

    /// Never call the language service
    #[arg(long)]
    offline: bool,

    /// Per-call timeout, e.g. "10s"
    #[arg(long, value_parser = humantime::parse_duration)]
    call_timeout: Option<Duration>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Write the final transcript here
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TurnArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Turn state file; created on the first turn
    #[arg(long)]
    state: PathBuf,

    /// The interviewee's message for this turn
    #[arg(long)]
    message: Option<String>,

    /// Transcript output, defaults to the state path with `.transcript.json`
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match cli.command {
        Command::Validate { config } => validate(&config),
        Command::Run(args) => run(args).await,
        Command::Turn(args) => turn(args).await,
    }
}

fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    config
        .validate()
        .with_context(|| format!("{} is not a valid interview config", path.display()))?;

    let assessment = config.questions.iter().filter(|q| q.is_assessment()).count();
    println!(
        "OK: {} interview, {} questions ({} with follow-ups)",
        config.interview_kind,
        config.len(),
        assessment
    );
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let Some(outcome) = converse(&engine, BufReader::new(tokio::io::stdin())).await? else {
        eprintln!("Input closed before the interview finished");
        return Ok(());
    };

    if let Some(path) = &args.transcript {
        write_transcript(&outcome, path)?;
    }
    Ok(())
}

/// Feed every input line to the engine until the interview finishes.
///
/// Blank lines are answers too; the engine decides whether to reprompt.
/// Returns `None` when input ends first.
async fn converse<R>(engine: &InterviewEngine, input: R) -> Result<Option<TurnOutcome>>
where
    R: AsyncBufRead + Unpin,
{
    let mut outcome = engine.start().await.context("failed to start interview")?;
    print_messages(&outcome.messages);

    let mut lines = input.lines();
    while !outcome.is_finished() {
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            return Ok(None);
        };

        outcome = engine
            .handle_message(outcome.state, line)
            .await
            .context("interview turn failed")?;
        print_messages(&outcome.messages);
    }
    Ok(Some(outcome))
}

async fn turn(args: TurnArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let state = load_state(&args.state)?;

    let outcome = match (state, args.message) {
        (None, None) => engine.start().await,
        (None, Some(_)) => bail!(
            "{} does not exist; start the interview without --message first",
            args.state.display()
        ),
        (Some(state), Some(message)) => engine.handle_message(state, message).await,
        (Some(state), None) => engine.run_turn(state).await,
    }
    .context("interview turn failed")?;

    print_messages(&outcome.messages);
    save_state(&outcome.state, &args.state)?;

    if outcome.is_finished() {
        let path = args
            .transcript
            .unwrap_or_else(|| args.state.with_extension("transcript.json"));
        write_transcript(&outcome, &path)?;
    }
    Ok(())
}

fn build_engine(args: &EngineArgs) -> Result<InterviewEngine> {
    let mut config = load_config(&args.config)?;
    config.offline_mode |= args.offline;

    let mut runtime = match &args.runtime_config {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load runtime config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if args.call_timeout.is_some() {
        runtime = runtime.with_call_timeout(args.call_timeout);
    }

    let service = if config.offline_mode {
        None
    } else {
        language_service(&runtime)
    };

    let mut builder = InterviewEngine::builder(config).runtime_config(runtime);
    if let Some(service) = service {
        builder = builder.service(service);
    }
    Ok(builder.build())
}

#[cfg(feature = "anthropic")]
fn language_service(runtime: &RuntimeConfig) -> Option<Arc<dyn LanguageService>> {
    use interviewer_runtime::{AnthropicProvider, ProviderLanguageService};

    match AnthropicProvider::from_env() {
        Ok(provider) => Some(Arc::new(ProviderLanguageService::new(
            Arc::new(provider),
            runtime.completion.clone(),
        ))),
        Err(e) => {
            tracing::warn!(error = %e, "Anthropic provider unavailable, continuing without a language service");
            None
        }
    }
}

#[cfg(not(feature = "anthropic"))]
fn language_service(_runtime: &RuntimeConfig) -> Option<Arc<dyn LanguageService>> {
    tracing::debug!("Built without a language provider");
    None
}

fn load_config(path: &Path) -> Result<InterviewConfig> {
    InterviewConfig::from_path(path)
        .with_context(|| format!("failed to load interview config {}", path.display()))
}

fn load_state(path: &Path) -> Result<Option<TurnState>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state {}", path.display()))?;
    let state = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a valid turn state", path.display()))?;
    Ok(Some(state))
}

fn save_state(state: &TurnState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("failed to serialize turn state")?;
    std::fs::write(path, json).with_context(|| format!("failed to write state {}", path.display()))
}

fn write_transcript(outcome: &TurnOutcome, path: &Path) -> Result<()> {
    let Some(transcript) = outcome.transcript() else {
        bail!("interview finished without a transcript");
    };
    let json = serde_json::to_string_pretty(transcript).context("failed to serialize transcript")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write transcript {}", path.display()))?;
    eprintln!("Transcript written to {}", path.display());
    Ok(())
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        println!("{}\n", message.content);
    }
}
