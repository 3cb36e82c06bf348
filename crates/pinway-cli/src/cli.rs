use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pinway",
    about = "pinway: HTTP gateway for content-addressed storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Storage node overrides, applied on top of the configuration file.
#[derive(Args, Default)]
pub struct NodeArgs {
    #[arg(long, global = true)]
    pub node_host: Option<String>,
    #[arg(long, global = true)]
    pub node_port: Option<u16>,
    #[arg(long, global = true)]
    pub node_multiaddr: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP gateway
    Serve(ServeArgs),
    /// Check whether the storage node answers
    Health,
    /// Store a file and print its hash
    Add(AddArgs),
    /// Print the content behind a hash
    Cat(CatArgs),
    /// List the links of a node
    Info(HashArgs),
    /// Pin a hash and everything below it
    Pin(HashArgs),
    /// Remove a pin
    Unpin(HashArgs),
    /// List every pinned hash
    Pins,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub base_path: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    pub path: PathBuf,
    /// Name to store instead of the file name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct CatArgs {
    pub hash: String,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashArgs {
    pub hash: String,
}
