use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ufs::{FsError, UfsFileSystem};
use ufs_fuse::open_image;

/// Print the block list and raw contents of one inode
#[derive(Parser)]
struct Cli {
    /// Disk image file
    image: PathBuf,

    /// Inode number
    inum: u32,
}

fn bail(e: FsError) -> ! {
    eprintln!("error: {e:?}");
    process::exit(1);
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let device = open_image(&cli.image)?;
    let fs = UfsFileSystem::open(device).unwrap_or_else(|e| bail(e));
    let inode = fs.stat(cli.inum).unwrap_or_else(|e| bail(e));

    println!("File blocks");
    for index in 0..inode.data_blocks() {
        println!("{}", inode.direct[index]);
    }
    println!();

    println!("File data");
    let mut buf = vec![0u8; inode.size as usize];
    fs.read(cli.inum, &mut buf).unwrap_or_else(|e| bail(e));
    io::stdout().write_all(&buf)?;

    Ok(())
}
