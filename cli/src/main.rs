use std::num::NonZeroU32;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use client::components::render_page;
use client::net::{ApiClient, ClientError};
use client::state::{Session, SubmitOutcome};
use contract::{AskRequest, RequestOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("{0} question(s) failed")]
    AskFailed(usize),
}

#[derive(Parser, Debug)]
#[command(name = "rulegate-cli", about = "Ask questions about the ICF canoe slalom rules")]
struct Cli {
    #[arg(long, env = "RULEGATE_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "RULEGATE_ASK_TIMEOUT_SECS", help = "Give up on an answer after this many seconds")]
    timeout_secs: Option<u64>,

    #[command(flatten)]
    scope: ScopeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct ScopeArgs {
    #[arg(long)]
    discipline: Option<String>,

    #[arg(long)]
    rule_edition: Option<String>,

    #[arg(long)]
    top_k: Option<NonZeroU32>,

    #[arg(long, value_parser = parse_confidence)]
    min_confidence: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit each question once and print the page after each answer.
    Ask {
        #[arg(required = true)]
        questions: Vec<String>,
    },
    /// Read one question per line from stdin until EOF.
    Repl,
    /// Check that the gateway is up.
    Ping,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let deadline = cli.timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs);
    tracing::debug!(base_url = %cli.base_url, ?deadline, "rulegate-cli starting");
    let api = ApiClient::new(&cli.base_url)?.with_deadline(deadline);

    match cli.command.unwrap_or(Command::Repl) {
        Command::Ping => run_ping(&api).await,
        Command::Ask { questions } => {
            let mut session = Session::with_template(api, cli.scope.template());
            run_ask(&mut session, &questions).await
        }
        Command::Repl => {
            let mut session = Session::with_template(api, cli.scope.template());
            run_repl(&mut session).await
        }
    }
}

impl ScopeArgs {
    /// Request carrying every scoping flag; the question is filled in per submission.
    fn template(&self) -> AskRequest {
        let options = RequestOptions {
            top_k: self.top_k,
            min_confidence: self.min_confidence,
            ..RequestOptions::default()
        };
        AskRequest {
            discipline: self.discipline.clone(),
            rule_edition: self.rule_edition.clone(),
            options: (!options.is_empty()).then_some(options),
            ..AskRequest::default()
        }
    }
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}

async fn run_ping(api: &ApiClient) -> Result<(), CliError> {
    let status = api.ping().await?;
    if !(200..300).contains(&status) {
        return Err(CliError::Unhealthy(status));
    }
    println!("ok");
    Ok(())
}

async fn run_ask(session: &mut Session<ApiClient>, questions: &[String]) -> Result<(), CliError> {
    let mut failed = 0;
    for question in questions {
        match submit_and_print(session, question).await {
            SubmitOutcome::Failed => failed += 1,
            SubmitOutcome::Rejected | SubmitOutcome::Answered => {}
        }
    }
    if failed > 0 {
        return Err(CliError::AskFailed(failed));
    }
    Ok(())
}

async fn run_repl(session: &mut Session<ApiClient>) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        submit_and_print(session, &line).await;
    }
    Ok(())
}

async fn submit_and_print(session: &mut Session<ApiClient>, question: &str) -> SubmitOutcome {
    let outcome = session.submit(question).await;
    if outcome == SubmitOutcome::Rejected {
        eprintln!("skipped: question is empty or longer than {} characters", contract::MAX_QUESTION_CHARS);
        return outcome;
    }
    print!("{}", render_page(session.state()));
    outcome
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
