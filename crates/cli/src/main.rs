// feedwall CLI - testimonial sheet ingestion, sync and repair

mod exit_codes;
mod export;
mod fetch;
mod ingest;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;

use feedwall_config::{ConfigError, FeedwallConfig};
use feedwall_ingest::{IngestError, StoreError};
use feedwall_store::SqliteStore;

use exit_codes::{ingest_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "feedwall")]
#[command(about = "Import, sync and repair testimonials from a feedback spreadsheet")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/feedwall/feedwall.toml)
    #[arg(long, global = true, env = "FEEDWALL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database (overrides store.path)
    #[arg(long, global = true, env = "FEEDWALL_DB")]
    db: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log more detail (-v debug, -vv trace)
    #[arg(short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every row of a local sheet export into the store
    #[command(after_help = "\
Candidate files are probed in order; the first readable CSV wins.
Rows without a name and without a review are skipped. No deduplication.

Examples:
  feedwall import
  feedwall import --file 'Feedback System - Sheet1.csv'
  feedwall import --file a.csv --file b.csv --output report.json")]
    Import {
        /// Candidate file (repeatable; default: sources.files)
        #[arg(long, short = 'f')]
        file: Vec<String>,

        /// Also write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Insert sheet rows not yet present in the store
    #[command(after_help = "\
Rows match existing records on name, date, rating and the first 50
characters of the review. Dates match across DD/MM/YYYY and YYYY-MM-DD.
Running sync twice inserts nothing the second time.

Examples:
  feedwall sync
  feedwall sync --url 'https://docs.google.com/spreadsheets/d/<id>/export?format=csv'")]
    Sync {
        /// Candidate URL (repeatable; default: sources.sheet_urls or spreadsheet_id)
        #[arg(long)]
        url: Vec<String>,

        /// Also write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Restore reviews lost by a mis-mapped import
    #[command(after_help = "\
Only imported records whose review is empty or equal to their review type
are updated. Any other review text is left untouched.

Examples:
  feedwall repair
  feedwall repair --file 'Feedback System - Sheet1.csv'")]
    Repair {
        /// Candidate file (repeatable; default: sources.files)
        #[arg(long, short = 'f')]
        file: Vec<String>,
    },

    /// Print the testimonial feed JSON
    #[command(after_help = "\
Examples:
  feedwall live
  feedwall live --from-store")]
    Live {
        /// Candidate URL (repeatable; default: sources.sheet_urls or spreadsheet_id)
        #[arg(long, conflicts_with = "from_store")]
        url: Vec<String>,

        /// Render published records from the store instead of the sheet
        #[arg(long)]
        from_store: bool,
    },

    /// Record one feedback form submission
    #[command(after_help = "\
Examples:
  feedwall submit --name Asha --mobile 9876500000 --rating 5 --review 'Great sessions'")]
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        review: String,

        /// 1-5
        #[arg(long)]
        rating: i64,

        #[arg(long)]
        mobile: String,

        /// Default: "Demo Feedback Review"
        #[arg(long)]
        review_type: Option<String>,
    },

    /// Write stored testimonials as a sheet-shaped CSV
    #[command(after_help = "\
Examples:
  feedwall export
  feedwall export --out published.csv
  feedwall export --all --out everything.csv")]
    Export {
        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Include unpublished records
        #[arg(long)]
        all: bool,
    },

    /// Show a stored testimonial on the wall again
    #[command(after_help = "\
Record ids are listed in the Id column of `feedwall export --all`.

Examples:
  feedwall publish 6f1c2a9e-1b0c-4c1e-9a55-0d8f3b2c7e41")]
    Publish {
        /// Record id
        id: String,
    },

    /// Hide a stored testimonial from the feed and default export
    Unpublish {
        /// Record id
        id: String,
    },

    /// Inspect or create the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective config as TOML
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(feedwall_config::config_path);

    let result = match cli.command {
        Commands::Config(cmd) => cmd_config(cmd, &config_path),
        command => Context::load(config_path, cli.db, cli.quiet).and_then(|ctx| dispatch(&ctx, command)),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Import { file, output } => ingest::cmd_import(ctx, file, output),
        Commands::Sync { url, output } => ingest::cmd_sync(ctx, url, output),
        Commands::Repair { file } => ingest::cmd_repair(ctx, file),
        Commands::Live { url, from_store } => ingest::cmd_live(ctx, url, from_store),
        Commands::Submit { name, review, rating, mobile, review_type } => {
            ingest::cmd_submit(ctx, name, review, rating, mobile, review_type)
        }
        Commands::Export { out, all } => export::cmd_export(ctx, out, all),
        Commands::Publish { id } => export::cmd_set_published(ctx, &id, true),
        Commands::Unpublish { id } => export::cmd_set_published(ctx, &id, false),
        Commands::Config(cmd) => cmd_config(cmd, &ctx.config_path),
    }
}

// ============================================================================
// Context
// ============================================================================

/// Settings shared by every store-backed command.
pub struct Context {
    pub config: FeedwallConfig,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub quiet: bool,
}

impl Context {
    fn load(config_path: PathBuf, db: Option<PathBuf>, quiet: bool) -> Result<Self, CliError> {
        let config = FeedwallConfig::load(&config_path)
            .map_err(|e| CliError::config(e).with_hint(format!("config file: {}", config_path.display())))?;
        let db_path = db.unwrap_or_else(|| config.store.resolved_path());
        Ok(Self { config, config_path, db_path, quiet })
    }

    pub fn open_store(&self) -> Result<SqliteStore, CliError> {
        SqliteStore::open(&self.db_path)
            .map_err(|e| CliError::store(e).with_hint(format!("database: {}", self.db_path.display())))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    pub fn store(err: StoreError) -> Self {
        Self { code: EXIT_STORE, message: format!("store error: {err}"), hint: None }
    }

    /// Create error from ingest error with proper exit code.
    pub fn ingest(err: IngestError) -> Self {
        let code = ingest_exit_code(&err);
        let hint = match &err {
            IngestError::SourceUnavailable { .. } => {
                Some("is the sheet published to the web (File > Share > Publish to web)?".to_string())
            }
            IngestError::MissingColumns { .. } => {
                Some("expected headers: Date, Review Type, Review, Rating, Name".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(cmd: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = FeedwallConfig::load(path).map_err(CliError::config)?;
            print!("{}", config.to_toml().map_err(CliError::config)?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::args(format!("{} already exists", path.display()))
                    .with_hint("pass --force to overwrite"));
            }
            FeedwallConfig::default().save(path).map_err(CliError::config)?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
    }
}
