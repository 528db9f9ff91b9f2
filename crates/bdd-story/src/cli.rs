//! Command dispatch for the `bdd-story` entrypoint.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result, bail};
use rstest_bdd_story::protocol::EventCollector;
use rstest_bdd_story::reporter::StoryReporter;
use rstest_bdd_story::reporting::{ReportFormat, ReportService};
use rstest_bdd_story::transcript::{replay, write_events};
use rstest_bdd_story::walk::{FeatureWalker, finish_run, parse_feature, undefined_steps};
use rstest_bdd_story::{StructureVisitor, Translator};
use tracing::{info, warn};

use crate::config::{CliConfig, LogLevel, Overrides};
use crate::logging::init_logging;
use crate::output::{write_outcomes, write_report_paths};

/// Replay Gherkin runner transcripts and feature files into story reports.
#[derive(Parser, Debug)]
#[command(name = "bdd-story", author, version, about)]
pub(crate) struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON lines transcript of runner callbacks.
    Replay {
        /// Transcript to replay.
        transcript: Utf8PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Walk feature files with every step undefined.
    DryRun {
        /// Feature files to walk, in order.
        #[arg(required = true)]
        features: Vec<Utf8PathBuf>,
        /// Also record the delivered callbacks as a transcript.
        #[arg(long)]
        transcript: Option<Utf8PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Directory receiving the reports.
    #[arg(long, short)]
    output: Option<Utf8PathBuf>,
    /// Report format (json, junit, all).
    #[arg(long)]
    format: Option<ReportFormat>,
    /// Run every test in an isolated session.
    #[arg(long)]
    unique_session: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let report = match &self.command {
            Commands::Replay { report, .. } | Commands::DryRun { report, .. } => report,
        };
        Overrides {
            log_level: self.log_level,
            output_dir: report.output.clone(),
            report_format: report.format,
            unique_session: report.unique_session,
        }
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_env()
        .wrap_err("invalid BDD_STORY_ environment configuration")?
        .apply_overrides(cli.overrides());
    init_logging(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "starting bdd-story");

    match &cli.command {
        Commands::Replay { transcript, .. } => handle_replay(transcript, config),
        Commands::DryRun {
            features,
            transcript,
            ..
        } => handle_dry_run(features, transcript.as_deref(), config),
    }
}

fn handle_replay(transcript: &Utf8Path, config: CliConfig) -> Result<()> {
    let file =
        File::open(transcript).wrap_err_with(|| format!("failed to open transcript {transcript}"))?;
    let reporter = StoryReporter::from_config(config.story);
    let mut translator = Translator::new(Arc::clone(&reporter));
    let summary = replay(BufReader::new(file), &mut translator)
        .wrap_err_with(|| format!("failed to replay {transcript}"))?;
    reporter
        .generate_reports()
        .wrap_err("failed to write reports")?;

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "replayed {} callbacks from {transcript} ({} rejected)",
        summary.events, summary.rejected
    )
    .wrap_err("failed to write replay summary")?;
    finish_summary(&mut stdout, &reporter)
}

fn handle_dry_run(
    features: &[Utf8PathBuf],
    transcript: Option<&Utf8Path>,
    config: CliConfig,
) -> Result<()> {
    let reporter = StoryReporter::from_config(config.story);
    let mut translator = Translator::new(Arc::clone(&reporter));
    let mut collector = EventCollector::new();
    let mut unparsed = 0_usize;

    for path in features {
        let feature = match parse_feature(path) {
            Ok(feature) => feature,
            Err(error) => {
                warn!(path = %path, %error, "skipping feature file");
                translator.syntax_error(&error.to_string())?;
                unparsed += 1;
                continue;
            }
        };
        FeatureWalker::new(undefined_steps)
            .walk(path.as_str(), &feature, &mut translator)
            .wrap_err_with(|| format!("failed to walk {path}"))?;
        if transcript.is_some() {
            FeatureWalker::new(undefined_steps).walk(path.as_str(), &feature, &mut collector)?;
        }
    }
    finish_run(&mut translator)?;
    reporter
        .generate_reports()
        .wrap_err("failed to write reports")?;

    if let Some(path) = transcript {
        finish_run(&mut collector)?;
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create transcript {path}"))?;
        write_events(BufWriter::new(file), collector.events())
            .wrap_err_with(|| format!("failed to write transcript {path}"))?;
    }

    let mut stdout = io::stdout().lock();
    finish_summary(&mut stdout, &reporter)?;
    if unparsed > 0 {
        bail!("{unparsed} feature file(s) could not be parsed");
    }
    Ok(())
}

fn finish_summary(writer: &mut dyn Write, reporter: &StoryReporter) -> Result<()> {
    write_outcomes(writer, &reporter.all_test_outcomes())?;
    write_report_paths(writer, &ReportService::from_config(reporter.config()))?;
    writer.flush().wrap_err("failed to flush summary to stdout")
}
