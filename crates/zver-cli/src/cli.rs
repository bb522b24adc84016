use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "zver", version, about = "ZLS release coordination service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    ///
    /// The API token, public URL base and minisign policy come from the
    /// environment (ZVER_API_TOKEN, ZVER_PUBLIC_URL_BASE,
    /// ZVER_FORCE_MINISIGN).
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// SQLite database path. Uses a transient in-memory store when
        /// omitted.
        #[arg(long)]
        db: Option<PathBuf>,

        /// Directory for artifact and index blobs. Uses a transient
        /// in-memory store when omitted.
        #[arg(long)]
        blob_dir: Option<PathBuf>,
    },

    /// Print the materialized index.json for a database.
    Index {
        /// SQLite database path.
        #[arg(long)]
        db: PathBuf,

        /// Public URL base used for tarball links.
        #[arg(long, default_value = "https://builds.zigtools.org")]
        url_base: String,
    },
}
