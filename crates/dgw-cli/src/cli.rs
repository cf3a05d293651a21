use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dgw",
    about = "Document Gateway: governed, content-addressed document store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Repository root (overrides `store_root` from the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subject recorded in the ledger
    #[arg(long, global = true, default_value = "operator")]
    pub subject: String,

    /// Scope granted to the operator; repeatable. Defaults to every scope.
    #[arg(long = "scope", global = true)]
    pub scopes: Vec<String>,

    /// Declared purpose of access
    #[arg(long, global = true)]
    pub purpose: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Commit a JSON object, store it by hash and write its dated ref
    Put(PutArgs),
    /// Snapshot the current refs into a manifest
    BuildManifest(BuildManifestArgs),
    /// Promote a manifest to a channel
    Promote(PromoteArgs),
    /// Read an object through the access policy
    Show(ShowArgs),
    /// Read a dated ref
    Ref(RefArgs),
    /// Read a stored manifest
    Manifest(ManifestArgs),
    /// Show one channel, or list all channels
    Channel(ChannelArgs),
    /// Check every object and ref
    Verify(VerifyArgs),
    /// Show the tail of the audit ledger
    Audit(AuditArgs),
    /// Print the canonical form and commitment hash of a JSON file
    Canon(CanonArgs),
    /// Verify a bearer token and print its principal
    Token(TokenArgs),
}

#[derive(Args)]
pub struct PutArgs {
    /// Path to the source JSON document
    pub path: PathBuf,
    /// Ref date (YYYY-MM-DD); defaults to context.snapshot_as_of, then today
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct BuildManifestArgs {
    pub dataset: String,
    /// Manifest id; defaults to the UTC build time
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct PromoteArgs {
    pub dataset: String,
    pub channel: String,
    /// Id of a stored manifest
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub manifest: Option<String>,
    /// Inline manifest JSON file, stored first if its id is new
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub hash: String,
    /// full | redacted
    #[arg(long)]
    pub view: Option<String>,
    /// Comma-separated dot paths to project
    #[arg(long)]
    pub fields: Option<String>,
}

#[derive(Args)]
pub struct RefArgs {
    pub namespace: String,
    pub logical_id: String,
    pub date: String,
}

#[derive(Args)]
pub struct ManifestArgs {
    pub dataset: String,
    pub id: String,
}

#[derive(Args)]
pub struct ChannelArgs {
    pub dataset: Option<String>,
    #[arg(requires = "dataset")]
    pub channel: Option<String>,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct AuditArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct CanonArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Raw token, or a full `Bearer <token>` header value
    pub token: String,
}
