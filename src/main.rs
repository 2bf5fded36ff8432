//! @ai:module:intent CLI entry point acting as host application for the highlighter
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on session, validator, bridge, surface, output, config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::{Directive, LevelFilter};
use text_highlighter::{
    output, validator, HighlighterConfig, LabelSet, OutputFormat, ProcessSurface,
    RenderingSurface, ScriptedSurface, SessionConfig, SessionRequest, SpanAnnotation, SyncBridge,
};

#[derive(Parser)]
#[command(name = "text-highlighter")]
#[command(author, version, about = "Label text spans and sync annotation sets with a rendering surface")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved label to color palette
    Palette {
        /// Labels in order (repeat the flag)
        #[arg(long = "labels", short, required = true)]
        labels: Vec<String>,

        /// Explicit colors aligned to the labels
        #[arg(long = "colors", short)]
        colors: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Audit a session document, or every JSON document in a directory
    Check {
        /// Path to file or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the payload the rendering surface would receive
    Payload {
        /// Path to a session document
        session: PathBuf,
    },

    /// Show the text with every span highlighted in its color
    Show {
        /// Path to a session document
        session: PathBuf,
    },

    /// Run a session through the sync bridge and print the resulting annotations
    Sync {
        /// Path to a session document
        session: PathBuf,

        /// JSON annotation sets replayed as successive user edits
        #[arg(long = "edits")]
        edits: Vec<PathBuf>,

        /// External command acting as the rendering surface
        #[arg(long, conflicts_with = "edits")]
        surface_cmd: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "json-pretty")]
        format: Format,
    },

    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "highlighter.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match HighlighterConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => HighlighterConfig::default(),
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log.level.clone());
    init_tracing(&level);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(level: &str) {
    let directive: Directive = match format!("text_highlighter={}", level).parse() {
        Ok(directive) => directive,
        Err(_) => LevelFilter::WARN.into(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();
}

fn run(command: Commands, config: &HighlighterConfig) -> Result<ExitCode> {
    match command {
        Commands::Palette {
            labels,
            colors,
            format,
        } => {
            let labels = LabelSet::new(labels)?;
            let colors = (!colors.is_empty()).then_some(colors);
            let palette = text_highlighter::resolve(&labels, colors.as_deref())?;
            println!("{}", output::format_palette(&palette, format.into()));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check { path, format } => {
            let report = if path.is_file() {
                validator::audit_file(&path, &config.defaults)
            } else {
                validator::audit_directory(&path, &config.defaults)
            }
            .with_context(|| format!("Failed to check {}", path.display()))?;

            println!("{}", output::format_report(&report, format.into()));
            if report.passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }

        Commands::Payload { session } => {
            let session = load_session(&session, config)?;
            println!("{}", output::to_json(&session.payload(), true));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Show { session } => {
            let session = load_session(&session, config)?;
            println!(
                "{}",
                output::render_highlighted(session.text(), session.annotations(), session.palette())
            );
            print!("{}", output::format_palette(session.palette(), OutputFormat::Text));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Sync {
            session,
            edits,
            surface_cmd,
            format,
        } => {
            let session = load_session(&session, config)?;
            let mut bridge = SyncBridge::new();

            let annotations = match surface_cmd {
                Some(cmd) => {
                    let mut parts = cmd.split_whitespace().map(str::to_string);
                    let program = parts.next().context("--surface-cmd is empty")?;
                    let mut surface = ProcessSurface::new(program).with_args(parts.collect());
                    sync_rounds(&mut bridge, &session, &mut surface, 1)?
                }
                None => {
                    let mut surface = ScriptedSurface::default();
                    for path in &edits {
                        surface.push_edit(load_edits(path)?);
                    }
                    sync_rounds(&mut bridge, &session, &mut surface, edits.len())?
                }
            };

            println!("{}", output::format_annotations(&annotations, format.into()));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { output } => {
            HighlighterConfig::default().save(&output)?;
            println!("Wrote default configuration to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Mount the session, then re-render `polls` times, returning the last value.
fn sync_rounds(
    bridge: &mut SyncBridge,
    session: &SessionConfig,
    surface: &mut dyn RenderingSurface,
    polls: usize,
) -> Result<Vec<SpanAnnotation>> {
    let mut annotations = bridge.sync(session, &mut *surface)?;
    for _ in 0..polls {
        annotations = bridge.sync(session, &mut *surface)?;
    }
    Ok(annotations)
}

fn load_session(path: &Path, config: &HighlighterConfig) -> Result<SessionConfig> {
    let request = SessionRequest::load(path)
        .with_context(|| format!("Failed to read session document {}", path.display()))?
        .with_defaults(&config.defaults);
    Ok(SessionConfig::try_from(request)?)
}

fn load_edits(path: &Path) -> Result<Vec<SpanAnnotation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edits file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse edits file {}", path.display()))
}
