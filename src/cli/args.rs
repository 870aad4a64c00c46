//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, ValueHint};

use crate::domain::Expiry;

/// Command line client for YaFU
#[derive(Parser, Debug)]
#[command(name = "yafu")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["upload", "delete", "list", "show_config", "init_config", "completion"])
))]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ~/.config/yafu/yafu.toml)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub action: ActionArgs,

    #[command(flatten)]
    pub upload_opts: UploadArgs,

    #[command(flatten)]
    pub list_opts: ListArgs,
}

/// Record store selection
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "File Options")]
pub struct StoreArgs {
    /// Database file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Disable database
    #[arg(long, conflicts_with = "db")]
    pub no_db: bool,
}

/// Mutually exclusive actions
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Actions")]
pub struct ActionArgs {
    /// Files to upload
    #[arg(short, long, value_name = "FILE", num_args = 1.., value_hint = ValueHint::FilePath)]
    pub upload: Vec<PathBuf>,

    /// Delete the given links
    #[arg(short, long, value_name = "URL", num_args = 1.., value_hint = ValueHint::Url)]
    pub delete: Vec<String>,

    /// List the records in database
    #[arg(short, long)]
    pub list: bool,

    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show_config: bool,

    /// Write a commented config file to --config or the default location
    #[arg(long)]
    pub init_config: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<clap_complete::Shell>,
}

/// Upload options
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Upload Options")]
pub struct UploadArgs {
    /// Specify base-url
    #[arg(short, long, value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// Specify email for file upload
    #[arg(short, long)]
    pub email: Option<String>,

    /// Specify password for file upload
    #[arg(short, long)]
    pub password: Option<String>,

    /// Specify comment for file upload
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Specify expire time
    #[arg(short = 'x', long, value_enum)]
    pub expires: Option<Expiry>,

    /// Hide file in public list [default]
    #[arg(long, conflicts_with = "public")]
    pub private: bool,

    /// Show file in public list
    #[arg(long)]
    pub public: bool,
}

impl UploadArgs {
    /// Visibility after applying `--private` / `--public` to `default`.
    pub fn hide(&self, default: bool) -> bool {
        if self.private {
            true
        } else if self.public {
            false
        } else {
            default
        }
    }
}

/// List options
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "List Options")]
pub struct ListArgs {
    /// List also expired records
    #[arg(long)]
    pub show_expired: bool,

    /// Specify date format
    #[arg(long)]
    pub date_format: Option<String>,

    /// Render dates in UTC
    #[arg(long)]
    pub utc: bool,

    /// Only list the last N records
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub number: Option<u64>,

    /// Specify output format
    #[arg(short, long, value_name = "TEMPLATE")]
    pub format: Option<String>,
}
