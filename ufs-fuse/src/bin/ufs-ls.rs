use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ufs::{DirEntry, Result as FsResult, UfsFileSystem, ROOT_INODE};
use ufs_fuse::open_image;

/// Recursively list every directory reachable from the root
#[derive(Parser)]
struct Cli {
    /// Disk image file
    image: PathBuf,
}

fn print_directory(fs: &UfsFileSystem, path: &str, inum: u32) -> FsResult<()> {
    let mut entries: Vec<_> = fs
        .read_dir(inum)?
        .into_iter()
        .filter(DirEntry::is_live)
        .collect();
    entries.sort_by(|a, b| a.name().cmp(b.name()));

    println!("Directory {path}");
    for entry in &entries {
        println!("{}\t{}", entry.inum(), String::from_utf8_lossy(entry.name()));
    }
    println!();

    for entry in &entries {
        if entry.name() == b"." || entry.name() == b".." {
            continue;
        }
        if fs.stat(entry.inum())?.is_dir() {
            let child = format!("{path}{}/", String::from_utf8_lossy(entry.name()));
            print_directory(fs, &child, entry.inum())?;
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let device = open_image(&cli.image)?;
    let fs = match UfsFileSystem::open(device) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("error: {e:?}");
            process::exit(1);
        }
    };

    if let Err(e) = print_directory(&fs, "/", ROOT_INODE) {
        eprintln!("error: {e:?}");
        process::exit(1);
    }
    Ok(())
}
