use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use policypal_core::analysis::catalog::TermCatalog;
use policypal_core::extract::{load_policy, normalize_whitespace};
use policypal_core::prompts::EXAMPLE_QUESTIONS;
use policypal_core::{
    build_gateway, coverage_overview, render_pdf, render_report, AdvisorProfile, GatewaySettings, Highlighter, LlmGateway, Marker, OutputFormat, PolicyAssistant, PolicyError,
    ReportDocument, RiskScorer, Session, Slot,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "policypal",
    author,
    version,
    about = "Insurance policy explainer: risk scoring, highlighting and LLM summaries"
)]
struct Cli {
    /// First policy (PDF or UTF-8 text)
    #[arg(long = "policy1", value_name = "FILE", global = true)]
    policy1: Option<PathBuf>,

    /// Second policy (PDF or UTF-8 text)
    #[arg(long = "policy2", value_name = "FILE", global = true)]
    policy2: Option<PathBuf>,

    /// Config file with an `[llm]` table (TOML, YAML, JSON, ...)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Gateway provider (`ollama` or `noop`)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Base URL of the generation service
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[arg(long, global = true)]
    model: Option<String>,

    /// Gateway request timeout, e.g. `90s` or `2m`; `0s` disables it
    #[arg(long, value_parser = humantime::parse_duration, global = true)]
    timeout: Option<Duration>,

    #[arg(long = "max-retries", global = true)]
    max_retries: Option<u32>,

    /// Output format for reports
    #[arg(long, value_enum, default_value_t = Format::Human, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MarkerArg {
    Html,
    Markdown,
    Ansi,
}

impl From<MarkerArg> for Marker {
    fn from(marker: MarkerArg) -> Self {
        match marker {
            MarkerArg::Html => Marker::Html,
            MarkerArg::Markdown => Marker::Markdown,
            MarkerArg::Ansi => Marker::Ansi,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SlotArg {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl From<SlotArg> for Slot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::One => Slot::First,
            SlotArg::Two => Slot::Second,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the risky terms used for scoring and highlighting
    Terms,
    /// Score coverage strength of every uploaded policy
    Score {
        /// Also write the coverage report as a PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },
    /// Print a policy with risky terms highlighted
    Highlight {
        #[arg(long, value_enum, default_value_t = SlotArg::One)]
        slot: SlotArg,
        #[arg(long, value_enum, default_value_t = MarkerArg::Ansi)]
        marker: MarkerArg,
        /// Collapse whitespace before highlighting
        #[arg(long)]
        normalize: bool,
    },
    /// Summarise a policy with the LLM
    Summarize {
        #[arg(long, value_enum, default_value_t = SlotArg::One)]
        slot: SlotArg,
        /// Also write the summary report as a PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },
    /// Ask a question about a policy
    Ask {
        #[arg(long, value_enum, default_value_t = SlotArg::One)]
        slot: SlotArg,
        /// Free-form question
        #[arg(long, conflicts_with = "example")]
        question: Option<String>,
        /// Use one of the built-in example questions (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        example: Option<u8>,
        /// List the built-in example questions and exit
        #[arg(long)]
        list_examples: bool,
    },
    /// Compare both uploaded policies
    #[cfg(feature = "compare")]
    Compare {
        /// Also write the comparison report as a PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },
    /// Draft a claim letter from an incident description
    Claim {
        /// Incident description; read from stdin when omitted
        #[arg(long)]
        incident: Option<String>,
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },
    /// Recommend an insurance plan for a household
    Recommend {
        #[arg(long, value_parser = clap::value_parser!(u8).range(18..=70), default_value_t = 30)]
        age: u8,
        /// Monthly income in rupees
        #[arg(long, default_value = "")]
        income: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = 1)]
        members: u32,
        /// What the cover is for (illness, travel, accident, ...)
        #[arg(long)]
        goals: String,
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let session = load_session(&cli);
    let format = OutputFormat::from(cli.format);
    match cli.command.as_ref().unwrap_or(&Commands::Terms) {
        Commands::Terms => list_terms(format)?,
        Commands::Score { pdf } => score(&session, format, pdf.as_deref())?,
        Commands::Highlight {
            slot,
            marker,
            normalize,
        } => highlight(&session, (*slot).into(), (*marker).into(), *normalize),
        Commands::Summarize { slot, pdf } => {
            let assistant = PolicyAssistant::new(gateway(&cli)?);
            summarize(&assistant, session, (*slot).into(), pdf.as_deref(), format).await?
        }
        Commands::Ask {
            slot,
            question,
            example,
            list_examples,
        } => {
            if *list_examples {
                for (idx, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
                    println!("{}. {question}", idx + 1);
                }
                return Ok(());
            }
            let question = match (question, example) {
                (Some(question), _) => question.clone(),
                (None, Some(idx)) => EXAMPLE_QUESTIONS[usize::from(*idx) - 1].to_string(),
                (None, None) => bail!("provide --question or --example"),
            };
            let assistant = PolicyAssistant::new(gateway(&cli)?);
            let answer = assistant.ask(&session, (*slot).into(), &question).await;
            println!("Answer to: {question}");
            println!("{}", answer.unwrap_or_else(|err| err.user_message()));
        }
        #[cfg(feature = "compare")]
        Commands::Compare { pdf } => compare(&cli, &session, pdf.as_deref(), format).await?,
        Commands::Claim { incident, pdf } => {
            let incident = match incident {
                Some(text) => text.clone(),
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read incident description from stdin")?;
                    buffer
                }
            };
            let assistant = PolicyAssistant::new(gateway(&cli)?);
            match assistant.draft_claim_letter(&incident).await {
                Ok(letter) => {
                    let report = ReportDocument::claim_letter(&letter);
                    emit(&report, format, pdf.as_deref())?;
                }
                Err(err) => println!("{}", err.user_message()),
            }
        }
        Commands::Recommend {
            age,
            income,
            members,
            goals,
            pdf,
        } => {
            let profile = AdvisorProfile {
                age: *age,
                monthly_income: income.clone(),
                family_members: *members,
                goals: goals.clone(),
            };
            let assistant = PolicyAssistant::new(gateway(&cli)?);
            match assistant.recommend(&profile).await {
                Ok(text) => {
                    let report = ReportDocument::recommendation(&profile, &text);
                    emit(&report, format, pdf.as_deref())?;
                }
                Err(err) => println!("{}", err.user_message()),
            }
        }
    }
    Ok(())
}

/// Upload every policy given on the command line. A file that cannot be read
/// is reported and leaves its slot empty.
fn load_session(cli: &Cli) -> Session {
    let mut session = Session::new();
    for (slot, path) in [(Slot::First, &cli.policy1), (Slot::Second, &cli.policy2)] {
        let Some(path) = path else { continue };
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if let Err(err) = session.upload_with(slot, source, || load_policy(path)) {
            warn!(%slot, error = %err, "upload failed");
            eprintln!("{}", err.user_message());
        }
    }
    session
}

fn load_settings(cli: &Cli) -> Result<GatewaySettings> {
    let mut builder = config::Config::builder();
    if let Some(path) = &cli.config {
        builder = builder.add_source(config::File::from(path.as_path()));
    }
    let raw = builder
        .build()
        .with_context(|| "failed to read configuration file")?;
    let base = match raw.get::<GatewaySettings>("llm") {
        Ok(settings) => settings,
        Err(config::ConfigError::NotFound(_)) => GatewaySettings::default(),
        Err(err) => return Err(err).context("invalid `llm` configuration table"),
    };
    let mut settings = base.overlay(std::env::vars().collect())?;
    if let Some(provider) = &cli.provider {
        settings.provider = provider.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
    if let Some(model) = &cli.model {
        settings.model = Some(model.clone());
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = Some(timeout);
    }
    if let Some(retries) = cli.max_retries {
        settings.max_retries = retries;
    }
    Ok(settings)
}

fn gateway(cli: &Cli) -> Result<Box<dyn LlmGateway>> {
    let settings = load_settings(cli)?;
    build_gateway(&settings).with_context(|| {
        format!(
            "failed to initialise `{}` gateway at {}",
            settings.provider,
            settings.endpoint_or_default()
        )
    })
}

fn list_terms(format: OutputFormat) -> Result<()> {
    let catalog = TermCatalog::standard();
    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(catalog.terms())?);
        return Ok(());
    }
    println!(
        "{} risky term(s), {} point(s) deducted per distinct term",
        catalog.len(),
        catalog.penalty_per_hit()
    );
    for (idx, term) in catalog.terms().iter().enumerate() {
        println!("{:>3}. {term}", idx + 1);
    }
    Ok(())
}

fn score(session: &Session, format: OutputFormat, pdf: Option<&Path>) -> Result<()> {
    let scorer = RiskScorer::default();
    let standings = match coverage_overview(session, &scorer) {
        Ok(standings) => standings,
        Err(err) => {
            println!("{}", err.user_message());
            return Ok(());
        }
    };
    let report = ReportDocument::coverage(&standings);
    match format {
        // Standings carry per-term hits, which the rendered report flattens.
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&standings)?),
        OutputFormat::Human => print!("{}", render_report(&report, format)?),
    }
    write_pdf(&report, pdf)
}

fn highlight(session: &Session, slot: Slot, marker: Marker, normalize: bool) {
    match session.document(slot) {
        Ok(document) => {
            let text = if normalize {
                normalize_whitespace(document.text())
            } else {
                document.text().to_string()
            };
            let highlighter = Highlighter::with_marker(TermCatalog::standard(), marker);
            println!("{}", highlighter.highlight(&text));
        }
        Err(err) => println!("{}", err.user_message()),
    }
}

async fn summarize<G: LlmGateway>(
    assistant: &PolicyAssistant<G>,
    mut session: Session,
    slot: Slot,
    pdf: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let summary = match assistant.summarize(&mut session, slot).await {
        Ok(summary) => summary.to_string(),
        Err(err) => {
            println!("{}", err.user_message());
            return Ok(());
        }
    };
    let document = session.document(slot)?;
    let standing = policypal_core::PolicyStanding::assess(document, &RiskScorer::default());
    emit(&ReportDocument::summary(&standing, &summary), format, pdf)
}

#[cfg(feature = "compare")]
async fn compare(cli: &Cli, session: &Session, pdf: Option<&Path>, format: OutputFormat) -> Result<()> {
    use policypal_core::ComparisonOrchestrator;

    if let Err(err) = session.pair() {
        warn!(error = %err, "comparison skipped");
        println!("Please upload two policies first.");
        return Ok(());
    }
    let orchestrator = ComparisonOrchestrator::new(gateway(cli)?);
    match orchestrator.compare(session).await {
        Ok(outcome) => emit(&ReportDocument::comparison(&outcome), format, pdf),
        Err(err) => {
            println!("{}", err.user_message());
            Ok(())
        }
    }
}

fn emit(report: &ReportDocument, format: OutputFormat, pdf: Option<&Path>) -> Result<()> {
    print!("{}", render_report(report, format)?);
    if matches!(format, OutputFormat::Json) {
        println!();
    }
    write_pdf(report, pdf)
}

fn write_pdf(report: &ReportDocument, pdf: Option<&Path>) -> Result<()> {
    if let Some(path) = pdf {
        match render_pdf(report) {
            Ok(bytes) => {
                fs::write(path, bytes)
                    .with_context(|| format!("failed to write PDF to {}", path.display()))?;
                eprintln!("PDF written to {}", path.display());
            }
            Err(err @ PolicyError::Render(_)) => eprintln!("{}", err.user_message()),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_for(args: &[&str]) -> GatewaySettings {
        let cli = Cli::parse_from(std::iter::once("policypal").chain(args.iter().copied()));
        load_settings(&cli).unwrap()
    }

    #[test]
    fn sub_second_timeout_flag_is_honoured() {
        let settings = settings_for(&["--timeout", "500ms", "terms"]);
        assert_eq!(settings.timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn zero_timeout_flag_disables_timeout() {
        let settings = settings_for(&["--timeout", "0s", "terms"]);
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn flags_override_provider_and_retries() {
        let settings = settings_for(&["--provider", "noop", "--max-retries", "2", "score"]);
        assert_eq!(settings.provider, "noop");
        assert_eq!(settings.max_retries, 2);
    }
}
