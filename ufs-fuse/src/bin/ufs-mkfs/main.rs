mod cli;

use std::io;
use std::process;

use clap::Parser;
use cli::Cli;
use ufs::{SuperBlock, UfsFileSystem};
use ufs_fuse::create_image;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let total_blocks = SuperBlock::compute(cli.num_inodes, cli.num_data).total_blocks();
    let device = create_image(&cli.image, total_blocks as usize)?;
    if let Err(e) = UfsFileSystem::format(device, cli.num_inodes, cli.num_data) {
        eprintln!("format failed: {e:?}");
        process::exit(1);
    }

    println!(
        "{}: {} blocks, {} inodes, {} data blocks",
        cli.image.display(),
        total_blocks,
        cli.num_inodes,
        cli.num_data
    );
    Ok(())
}
