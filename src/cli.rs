use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
#[command(name = "printnet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode, i.e. suppress diagnostic messages
    #[clap(short, long, global = true, display_order = 100)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve animations over HTTP
    Serve(Serve),

    /// Play an animation in the terminal
    Play(Play),

    /// Show how an animation gets normalized and cached
    Inspect(Inspect),
}

#[derive(Debug, Args)]
pub struct Serve {
    /// Address to listen on [default: 0.0.0.0:5000, port overridable with $PORT]
    #[arg(short, long, value_name = "IP:PORT")]
    pub listen: Option<SocketAddr>,

    /// Directory holding <name>.json animation files [default: anims]
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct Play {
    /// Animation name
    pub name: String,

    /// Directory holding <name>.json animation files [default: anims]
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct Inspect {
    /// Animation name
    pub name: String,

    /// Directory holding <name>.json animation files [default: anims]
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}
