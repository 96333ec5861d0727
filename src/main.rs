//! Command-line front end: parse logs into tables, analyze tables, run PDR timelines.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use env_logger::Env;
use log::info;

use rplog::analysis::{self, report, Dialect};
use rplog::config::{self, TimelineConfig};
use rplog::error::AnalysisError;

/// Delivery analysis for WSN routing protocol logs
#[derive(Parser, Debug)]
#[command(name = "rplog", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

/// `--testbed` / `--cooja`; the last one given wins
#[derive(Args, Debug, Clone, Copy, Default)]
struct DialectArgs {
    /// Parse as a testbed log
    #[arg(long, overrides_with = "cooja")]
    testbed: bool,

    /// Parse as a cooja log (default)
    #[arg(long, overrides_with = "testbed")]
    cooja: bool,
}

impl DialectArgs {
    /// The dialect chosen on the command line, if any flag was given
    fn explicit(self) -> Option<Dialect> {
        match (self.testbed, self.cooja) {
            (true, _) => Some(Dialect::Testbed),
            (_, true) => Some(Dialect::Simulation),
            _ => None,
        }
    }

    fn dialect(self) -> Dialect {
        self.explicit().unwrap_or_default()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract sent.csv and recv.csv next to a log file
    Parse {
        /// Path of the .log file
        log_file: PathBuf,

        #[command(flatten)]
        dialect: DialectArgs,
    },

    /// Print PDR, latency and duty cycle for a directory holding sent.csv and recv.csv
    Analyze {
        /// Directory in which recv.csv and sent.csv are kept
        dir: PathBuf,

        #[command(flatten)]
        dialect: DialectArgs,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// PDR over growing time windows of one log
    Timeline {
        /// Log file (overrides the config file)
        log_file: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minute marks, comma separated
        #[arg(long, value_delimiter = ',')]
        marks: Vec<u64>,

        /// Output directory for the series
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep each truncated log as log_<M>min.log
        #[arg(long)]
        keep_truncated: bool,

        #[command(flatten)]
        dialect: DialectArgs,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Parse { log_file, dialect } => run_parse(&log_file, dialect.dialect()),
        Commands::Analyze { dir, dialect, json } => run_analyze(&dir, dialect.dialect(), json.as_deref()),
        Commands::Timeline {
            log_file,
            config: config_path,
            marks,
            output,
            keep_truncated,
            dialect,
        } => {
            let mut timeline = match config_path {
                Some(path) => config::load_config(&path)?,
                None => TimelineConfig::default(),
            };
            if log_file.is_some() {
                timeline.log_file = log_file;
            }
            if !marks.is_empty() {
                timeline.time_markers = marks;
            }
            if let Some(output) = output {
                timeline.output_dir = output;
            }
            if let Some(d) = dialect.explicit() {
                timeline.testbed = d.is_testbed();
            }
            timeline.keep_truncated |= keep_truncated;
            run_timeline(&timeline)
        }
    }
}

fn run_parse(log_file: &Path, dialect: Dialect) -> Result<()> {
    if !log_file.is_file() {
        return Err(AnalysisError::InputNotFound {
            path: log_file.to_path_buf(),
        }
        .into());
    }

    let out_dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    println!("Creating log files in {}", out_dir.display());

    let parsed = analysis::parse_log_file(log_file, dialect)
        .with_context(|| format!("Failed to parse {}", log_file.display()))?;
    parsed.events.write_tables(&out_dir)?;

    let warnings = parsed.warnings();
    analysis::log_parser::log_warnings(&warnings);
    let advisories = report::render_warnings(&warnings);
    if !advisories.is_empty() {
        println!("{}", advisories);
    }

    Ok(())
}

fn run_analyze(dir: &Path, dialect: Dialect, json: Option<&Path>) -> Result<()> {
    if !dir.is_dir() {
        return Err(AnalysisError::InputNotFound { path: dir.to_path_buf() }.into());
    }

    info!("Analyzing {} as a {} run", dir.display(), dialect);
    let result = analysis::analyze_dir(dir, dialect)
        .with_context(|| format!("Failed to analyze {}", dir.display()))?;
    println!("{}", analysis::render_report(&result));

    if let Some(path) = json {
        analysis::generate_json_report(&result, path)?;
    }

    Ok(())
}

fn run_timeline(timeline: &TimelineConfig) -> Result<()> {
    timeline.validate()?;
    let log_file = timeline
        .log_file
        .as_deref()
        .ok_or(config::ValidationError::MissingLogFile)?;
    if !log_file.is_file() {
        return Err(AnalysisError::InputNotFound {
            path: log_file.to_path_buf(),
        }
        .into());
    }

    let text = analysis::log_parser::read_log_text(log_file)
        .with_context(|| format!("Failed to read log file: {}", log_file.display()))?;
    fs::create_dir_all(&timeline.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", timeline.output_dir.display())
    })?;

    let keep_dir = timeline.keep_truncated.then_some(timeline.output_dir.as_path());
    let samples = analysis::run_timeline(&text, timeline.dialect(), &timeline.time_markers, keep_dir);

    if samples.is_empty() {
        println!("No results to plot.");
    } else {
        println!("{}", report::render_timeline(&samples));
    }
    analysis::write_timeline(&samples, &timeline.output_dir)?;

    Ok(())
}
