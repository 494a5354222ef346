use agent_analytics::{Analytics, ReportGenerator, ReportKind};
use agent_core::config::{AppConfig, OutputFormat};
use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "agent-experience",
    about = "Summarize agent-run session logs into statistics and recommendations",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/agent-experience/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    report: ReportArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ReportArgs {
    /// Sessions log in JSON-lines format (default: from config)
    sessions_file: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis with recommendations (default)
    Analyze(ReportArgs),

    /// Basic statistics only
    Stats(ReportArgs),

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up tracing. Diagnostics go to stderr so stdout stays a clean report.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // `config init` must work before any config file exists.
    if let Some(Commands::Config {
        action: Some(ConfigAction::Init),
    }) = &cli.command
    {
        return init_config(cli.config);
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        None => run_report(cli.report, ReportKind::Full, &config),
        Some(Commands::Analyze(args)) => run_report(args, ReportKind::Full, &config),
        Some(Commands::Stats(args)) => run_report(args, ReportKind::Basic, &config),
        Some(Commands::Config { action }) => handle_config_command(action, cli.config, &config),
    }
}

fn run_report(args: ReportArgs, kind: ReportKind, config: &AppConfig) -> Result<()> {
    let sessions_file = args
        .sessions_file
        .unwrap_or_else(|| config.history.sessions_file.clone());
    let format = args.format.map(OutputFormat::from).unwrap_or(config.report.format);

    tracing::debug!("Reading session history from {}", sessions_file.display());
    let records = agent_core::load_records(&sessions_file)?;
    let analysis = Analytics::from_config(config).analyze(&records);

    let output = ReportGenerator::render(&analysis, kind, format)?;
    println!("{}", output);
    Ok(())
}

fn handle_config_command(
    action: Option<ConfigAction>,
    path: Option<PathBuf>,
    config: &AppConfig,
) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => init_config(path)?,
        Some(ConfigAction::Path) => {
            println!("{}", path.unwrap_or_else(AppConfig::default_path).display());
        }
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(AppConfig::default_path);
    if path.exists() {
        println!("Config already exists at: {}", path.display());
    } else {
        AppConfig::default().save_to(&path)?;
        println!("Created default config at: {}", path.display());
    }
    Ok(())
}
