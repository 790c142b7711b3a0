use std::path::PathBuf;

use clap::Parser;

/// Serve a ufs image over HTTP
#[derive(Parser)]
pub struct Cli {
    /// Disk image file
    pub image: PathBuf,

    /// Listen port
    #[arg(long, short, default_value_t = 8080)]
    pub port: u16,
}
