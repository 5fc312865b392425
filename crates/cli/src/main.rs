// implant - catalog implant screenshots into per-account character records

mod characters;
mod exit_codes;
mod transfer;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use implant_config::Settings;
use implant_core::DuplicateChoice;
use implant_io::ocr::{SidecarText, TesseractCli, TextExtractor};
use implant_io::{Store, StoreError};

use exit_codes::{
    EXIT_CHOICE_REQUIRED, EXIT_ERROR, EXIT_IO, EXIT_NOT_FOUND, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "implant")]
#[command(about = "Catalog implant screenshots into per-account character records")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/implant-vault/settings.toml)
    #[arg(long, global = true, env = "IMPLANT_CONFIG")]
    config: Option<PathBuf>,

    /// Base directory holding one folder per account
    #[arg(long, global = true, env = "IMPLANT_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Character data file (default: <base dir>/characters.json)
    #[arg(long, global = true, env = "IMPLANT_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicate {
    /// Keep the existing record and append a marked clone
    Clone,
    /// Overwrite the existing record
    Replace,
}

impl From<OnDuplicate> for DuplicateChoice {
    fn from(value: OnDuplicate) -> Self {
        match value {
            OnDuplicate::Clone => DuplicateChoice::Clone,
            OnDuplicate::Replace => DuplicateChoice::Replace,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OcrEngine {
    /// Run the tesseract binary
    #[default]
    Tesseract,
    /// Read `<image stem>.txt` next to each image
    Sidecar,
}

#[derive(Subcommand)]
enum Commands {
    /// List account ids
    Accounts {
        #[arg(long)]
        json: bool,
    },

    /// Create an account and its folder layout
    AddAccount {
        /// Account id (e.g. a Steam id)
        id: String,
    },

    /// Read an implant screenshot and store it under an account
    #[command(after_help = "\
Examples:
  implant add --account 7656119 shots/implant.png
  implant add --account 7656119 shots/implant.png --on-duplicate clone
  implant add --account 7656119 shots/implant.png --ocr sidecar

Exits 4 when the sample number already exists and clones are enabled;
rerun with --on-duplicate to choose.")]
    Add {
        #[arg(long, short = 'a')]
        account: String,

        /// Screenshot to read
        image: PathBuf,

        /// What to do when the sample number already exists
        #[arg(long, value_enum)]
        on_duplicate: Option<OnDuplicate>,

        #[arg(long, value_enum, default_value_t = OcrEngine::Tesseract)]
        ocr: OcrEngine,
    },

    /// List an account's characters
    #[command(after_help = "\
Examples:
  implant list --account 7656119
  implant list --account 7656119 --search rex
  implant list --account 7656119 --search female --fields gender
  implant list --account 7656119 --json")]
    List {
        #[arg(long, short = 'a')]
        account: String,

        /// Case-insensitive substring filter
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Fields to search: any of name,sample,gender
        #[arg(long, default_value = "name,sample,gender")]
        fields: String,

        #[arg(long)]
        json: bool,
    },

    /// Show one character
    Show {
        #[arg(long, short = 'a')]
        account: String,

        /// 0-based index as printed by `list`
        index: usize,

        #[arg(long)]
        json: bool,
    },

    /// Replace a character's comments
    Comment {
        #[arg(long, short = 'a')]
        account: String,
        index: usize,
        text: String,
    },

    /// Attach a new background image to a character
    Background {
        #[arg(long, short = 'a')]
        account: String,
        index: usize,
        image: PathBuf,
    },

    /// Append a marked clone of a character
    Clone {
        #[arg(long, short = 'a')]
        account: String,
        index: usize,
    },

    /// Delete one or more characters
    Delete {
        #[arg(long, short = 'a')]
        account: String,

        #[arg(required = true, num_args = 1..)]
        indices: Vec<usize>,
    },

    /// Compare characters side by side
    Compare {
        #[arg(long, short = 'a')]
        account: String,

        #[arg(required = true, num_args = 2..)]
        indices: Vec<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Import new screenshots found under <base dir>/<account>/implants/
    Scan {
        #[arg(long, value_enum, default_value_t = OcrEngine::Tesseract)]
        ocr: OcrEngine,

        #[arg(long)]
        json: bool,
    },

    /// Export every character to one CSV file
    Export {
        file: PathBuf,

        /// Add Is Clone and Clone Index columns
        #[arg(long)]
        extended: bool,
    },

    /// Export selected characters to one CSV file each
    ExportEach {
        #[arg(long, short = 'a')]
        account: String,

        out_dir: PathBuf,

        #[arg(required = true, num_args = 1..)]
        indices: Vec<usize>,
    },

    /// Import characters from CSV
    #[command(after_help = "\
Examples:
  implant template import.csv
  implant import import.csv
  implant import import.csv --overwrite

Exits 5 when some rows failed and 6 when the file was rejected.")]
    Import {
        file: PathBuf,

        /// Replace records whose sample number already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Write an example CSV for import
    Template { file: PathBuf },

    /// Copy the character data (and optionally images) to a directory
    Backup {
        dir: PathBuf,

        #[arg(long)]
        images: bool,
    },

    /// Replace all character data with a backup file
    Restore { file: PathBuf },

    /// Delete all character data and start from an empty file
    Reset {
        /// Confirm; the data file is removed without a backup
        #[arg(long)]
        yes: bool,
    },

    /// Show where data is stored
    Location {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::UnknownAccount(_) | StoreError::IndexOutOfRange { .. } => EXIT_NOT_FOUND,
            StoreError::ChoiceRequired { .. } => EXIT_CHOICE_REQUIRED,
            StoreError::AccountExists(_) | StoreError::InvalidAccountId(_) => EXIT_USAGE,
            StoreError::Io(_) | StoreError::Serialize(_) => EXIT_IO,
        };
        let hint = match &err {
            StoreError::UnknownAccount(_) => Some("list accounts with `implant accounts`"),
            StoreError::IndexOutOfRange { .. } => Some("indices are 0-based, see `implant list`"),
            StoreError::ChoiceRequired { .. } => {
                Some("rerun with --on-duplicate clone or --on-duplicate replace")
            }
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

/// Settings plus the store they point at.
pub struct Context {
    pub settings: Settings,
    pub store: Store,
}

fn load_settings(cli: &Cli) -> Settings {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if let Some(base) = &cli.base_dir {
        settings.base_directory = Some(base.clone());
    }
    if let Some(file) = &cli.data_file {
        settings.data_file = Some(file.clone());
    }
    settings
}

fn open_context(settings: Settings) -> Result<Context, CliError> {
    let store = Store::open(settings.base_directory(), Some(settings.effective_data_file()))?;
    Ok(Context { settings, store })
}

/// The text extractor selected on the command line.
pub fn extractor(engine: OcrEngine, settings: &Settings) -> Result<Box<dyn TextExtractor>, CliError> {
    match engine {
        OcrEngine::Sidecar => Ok(Box::new(SidecarText)),
        OcrEngine::Tesseract => TesseractCli::resolve(settings.tesseract_path().as_deref())
            .map(|t| {
                debug!(binary = %t.binary().display(), "using tesseract");
                Box::new(t) as Box<dyn TextExtractor>
            })
            .ok_or_else(|| {
                CliError::io("tesseract not found on PATH")
                    .with_hint("install tesseract, set tesseract_path in settings, or use --ocr sidecar")
            }),
    }
}

pub fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::usage(format!("no such file: {}", path.display())))
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli);
    init_tracing(&settings.log_level);

    // Commands that never touch the store
    match &cli.command {
        Commands::Template { file } => return transfer::cmd_template(file),
        Commands::Reset { yes } => return transfer::cmd_reset(&settings, *yes),
        _ => {}
    }

    let mut ctx = open_context(settings)?;

    match cli.command {
        Commands::Accounts { json } => characters::cmd_accounts(&ctx, json),
        Commands::AddAccount { id } => characters::cmd_add_account(&mut ctx, &id),
        Commands::Add { account, image, on_duplicate, ocr } => {
            characters::cmd_add(&mut ctx, &account, &image, on_duplicate, ocr)
        }
        Commands::List { account, search, fields, json } => {
            characters::cmd_list(&ctx, &account, search.as_deref(), &fields, json)
        }
        Commands::Show { account, index, json } => characters::cmd_show(&ctx, &account, index, json),
        Commands::Comment { account, index, text } => {
            characters::cmd_comment(&mut ctx, &account, index, text)
        }
        Commands::Background { account, index, image } => {
            characters::cmd_background(&mut ctx, &account, index, &image)
        }
        Commands::Clone { account, index } => characters::cmd_clone(&mut ctx, &account, index),
        Commands::Delete { account, indices } => characters::cmd_delete(&mut ctx, &account, &indices),
        Commands::Compare { account, indices, json } => {
            characters::cmd_compare(&ctx, &account, &indices, json)
        }
        Commands::Scan { ocr, json } => characters::cmd_scan(&mut ctx, ocr, json),
        Commands::Export { file, extended } => transfer::cmd_export(&ctx, &file, extended),
        Commands::ExportEach { account, out_dir, indices } => {
            transfer::cmd_export_each(&ctx, &account, &out_dir, &indices)
        }
        Commands::Import { file, overwrite } => transfer::cmd_import(&mut ctx, &file, overwrite),
        Commands::Template { .. } | Commands::Reset { .. } => Ok(()),
        Commands::Backup { dir, images } => transfer::cmd_backup(&ctx, &dir, images),
        Commands::Restore { file } => transfer::cmd_restore(&mut ctx, &file),
        Commands::Location { json } => transfer::cmd_location(&ctx, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
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
