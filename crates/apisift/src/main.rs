use anyhow::Context;
use apisift::commands::{self, ConditionArgs, parse_condition};
use apisift::config::ApisiftConfig;
use apisift::{Platform, VersionRange};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apisift")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More logging (-v debug, -vv trace). APISIFT_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter one interface file
    Filter {
        /// Path to a .swiftinterface file
        file: PathBuf,

        #[command(flatten)]
        conditions: ConditionFlags,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print decision counts to stderr
        #[arg(long)]
        stats: bool,
    },

    /// List frameworks in an SDK or Xcode bundle
    Frameworks {
        /// Frameworks directory or Xcode.app
        path: PathBuf,

        /// SDK to open inside an Xcode bundle
        #[arg(long)]
        platform: Option<Platform>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter every framework interface of an SDK
    Sdk {
        /// Frameworks directory or Xcode.app
        path: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        conditions: ConditionFlags,

        /// SDK to open inside an Xcode bundle (defaults to --platform)
        #[arg(long)]
        sdk: Option<Platform>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ConditionFlags {
    /// Version window per platform, e.g. `-c ios=26..` or `-c macos=14..15`
    #[arg(short = 'c', long = "condition", value_name = "PLATFORM=RANGE", value_parser = parse_condition)]
    conditions: Vec<(Platform, VersionRange)>,

    /// Platform for --min/--max
    #[arg(long)]
    platform: Option<Platform>,

    /// Inclusive minimum version (empty = unbounded)
    #[arg(long)]
    min: Option<String>,

    /// Exclusive maximum version (empty = unbounded)
    #[arg(long)]
    max: Option<String>,
}

impl From<ConditionFlags> for ConditionArgs {
    fn from(flags: ConditionFlags) -> Self {
        Self {
            conditions: flags.conditions,
            platform: flags.platform,
            min: flags.min,
            max: flags.max,
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("APISIFT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = ApisiftConfig::load(&cwd)?;

    match cli.command {
        Commands::Filter {
            file,
            conditions,
            output,
            stats,
        } => {
            let conditions = ConditionArgs::from(conditions).resolve(&config);
            commands::filter(&file, &conditions, output.as_deref(), stats)
        }
        Commands::Frameworks {
            path,
            platform,
            json,
        } => {
            let platform = platform.unwrap_or_else(|| config.sdk_platform());
            let frameworks = apisift::sdk::discover(&path, platform);
            println!("{}", commands::format_frameworks(&frameworks, json)?);
            Ok(())
        }
        Commands::Sdk {
            path,
            out,
            conditions,
            sdk,
            json,
        } => {
            let platform = sdk
                .or(conditions.platform)
                .unwrap_or_else(|| config.sdk_platform());
            let conditions = ConditionArgs::from(conditions).resolve(&config);
            let report = commands::filter_sdk(&path, platform, &conditions, &out)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.format_text());
            }
            if report.has_errors() {
                anyhow::bail!("{} of {} frameworks failed", report.failed(), report.entries.len());
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
