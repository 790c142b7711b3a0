use std::path::PathBuf;

use clap::Parser;

/// Create and format a ufs image
#[derive(Parser)]
pub struct Cli {
    /// Disk image file to create
    pub image: PathBuf,

    /// Number of inodes
    #[arg(long, short = 'i', default_value_t = 32)]
    pub num_inodes: u32,

    /// Number of data blocks
    #[arg(long, short = 'd', default_value_t = 32)]
    pub num_data: u32,
}
