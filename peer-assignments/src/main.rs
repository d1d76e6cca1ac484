//! Peer observation assignment CLI.
//!
//! Generates this week's assignments from the `Peerslots` and `Busy_fac`
//! CSV exports, or serves them on a small dashboard.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use peer_assignments::display::print_report;
use peer_assignments::export::{export_csv, export_json};
use peer_assignments::schedule::TimeConvention;
use peer_assignments::web::{self, AppState};
use peer_assignments::{generate_records, GeneratorConfig, InputSource, MatchMode, RunScope};

#[derive(Parser)]
#[command(name = "peer-assignments")]
#[command(about = "Weekly peer observation assignments from free and busy slot tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate assignments, print them and write the output table.
    Generate {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Output CSV file
        #[arg(short, long, default_value = "peer_assignments.csv")]
        output: PathBuf,
        /// Also write the table as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Skip the console report
        #[arg(short, long)]
        quiet: bool,
    },

    /// Serve the assignment dashboard.
    Serve {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Port to listen on
        #[arg(short, long, env = "PEER_ASSIGN_PORT", default_value = "8080")]
        port: u16,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Observer table (Peerslots sheet as CSV)
    #[arg(long, requires = "candidates")]
    observers: Option<PathBuf>,
    /// Candidate table (Busy_fac sheet as CSV)
    #[arg(long, requires = "observers")]
    candidates: Option<PathBuf>,
    /// Directory holding Peerslots.csv and Busy_fac.csv
    #[arg(long, default_value = "data")]
    input_dir: PathBuf,
}

impl InputArgs {
    fn source(self) -> InputSource {
        match (self.observers, self.candidates) {
            (Some(observers), Some(candidates)) => InputSource::Files { observers, candidates },
            _ => InputSource::Dir(self.input_dir),
        }
    }
}

#[derive(Args)]
struct GenerationArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// ISO week, e.g. 2026-W42 (defaults to the current week)
    #[arg(long, env = "PEER_ASSIGN_WEEK")]
    week: Option<String>,
    /// Matching mode: class-for-observer, peer-for-class
    #[arg(long)]
    mode: Option<String>,
    /// Run scope: week, day
    #[arg(long)]
    scope: Option<String>,
    /// Subject uniqueness scope: week, day
    #[arg(long)]
    subject_scope: Option<String>,
    /// Restrict a per-day run to these days (repeatable)
    #[arg(long = "day")]
    days: Vec<String>,
    /// Last fallback level to try (1-4)
    #[arg(long)]
    max_level: Option<u8>,
    /// Time slot convention: clock24, meridiem
    #[arg(long)]
    time_convention: Option<String>,
    /// Disable observer rotation in peer-for-class mode
    #[arg(long)]
    no_rotation: bool,
    /// Disable subject uniqueness
    #[arg(long)]
    allow_subject_repeats: bool,
}

fn parse_mode(s: &str) -> Option<MatchMode> {
    match s.to_lowercase().as_str() {
        "class-for-observer" | "class" => Some(MatchMode::ClassForObserver),
        "peer-for-class" | "peer" => Some(MatchMode::PeerForClass),
        _ => None,
    }
}

fn parse_scope(s: &str) -> Option<RunScope> {
    match s.to_lowercase().as_str() {
        "week" | "weekly" => Some(RunScope::Week),
        "day" | "daily" => Some(RunScope::Day),
        _ => None,
    }
}

fn parse_convention(s: &str) -> Option<TimeConvention> {
    match s.to_lowercase().as_str() {
        "clock24" | "24h" => Some(TimeConvention::Clock24),
        "meridiem" | "ampm" => Some(TimeConvention::Meridiem),
        _ => None,
    }
}

impl GenerationArgs {
    fn into_config(self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = match parse_mode(&mode) {
                Some(m) => m,
                None => bail!("Unknown mode: {}", mode),
            };
        }
        if let Some(scope) = self.scope {
            config.run_scope = match parse_scope(&scope) {
                Some(s) => s,
                None => bail!("Unknown scope: {}", scope),
            };
        }
        if let Some(scope) = self.subject_scope {
            config.subject_scope = match parse_scope(&scope) {
                Some(s) => s,
                None => bail!("Unknown subject scope: {}", scope),
            };
        }
        if let Some(convention) = self.time_convention {
            config.time_convention = match parse_convention(&convention) {
                Some(c) => c,
                None => bail!("Unknown time convention: {}", convention),
            };
        }
        if !self.days.is_empty() {
            config.days = self.days;
            config.run_scope = RunScope::Day;
        }
        if let Some(level) = self.max_level {
            config.max_level = level;
        }
        if self.week.is_some() {
            config.week = self.week;
        }
        if self.no_rotation {
            config.observer_rotation = false;
        }
        if self.allow_subject_repeats {
            config.subject_uniqueness = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Generate {
            input,
            generation,
            output,
            json,
            quiet,
        } => {
            let config = generation.into_config()?;
            let source = input.source();

            info!(?source, "loading tables");
            let tables = source
                .load(config.time_convention)
                .context("Failed to load input tables")?;
            let (report, records) = generate_records(tables, &config)?;

            if !quiet {
                print_report(&report, &records);
            }

            export_csv(&records, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("\nAssignments saved to {}", output.display());
            if let Some(json_path) = json {
                export_json(&records, &json_path)
                    .with_context(|| format!("Failed to write {}", json_path.display()))?;
                println!("JSON saved to {}", json_path.display());
            }
        }

        Commands::Serve {
            input,
            generation,
            port,
        } => {
            let config = generation.into_config()?;
            let state = AppState::new(input.source(), config);

            println!("Starting dashboard on port {}...", port);
            println!("Access the site at http://localhost:{}", port);
            web::start_server(port, state).await?;
        }
    }

    Ok(())
}
