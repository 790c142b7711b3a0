use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ufs::{FsError, UfsFileSystem};
use ufs_fuse::open_image;

/// Print the superblock and both allocation bitmaps of an image
#[derive(Parser)]
struct Cli {
    /// Disk image file
    image: PathBuf,
}

fn bail(e: FsError) -> ! {
    eprintln!("error: {e:?}");
    process::exit(1);
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let device = open_image(&cli.image)?;
    let fs = UfsFileSystem::open(device).unwrap_or_else(|e| bail(e));
    let sb = fs.super_block();

    println!("Super");
    println!("inode_bitmap_addr {}", sb.inode_bitmap_addr);
    println!("inode_bitmap_len {}", sb.inode_bitmap_len);
    println!("data_bitmap_addr {}", sb.data_bitmap_addr);
    println!("data_bitmap_len {}", sb.data_bitmap_len);
    println!("inode_region_addr {}", sb.inode_region_addr);
    println!("inode_region_len {}", sb.inode_region_len);
    println!("data_region_addr {}", sb.data_region_addr);
    println!("data_region_len {}", sb.data_region_len);
    println!("num_inodes {}", sb.num_inodes);
    println!("num_data {}", sb.num_data);
    println!();

    let inode_bitmap = fs.inode_bitmap().unwrap_or_else(|e| bail(e));
    println!("Inode bitmap");
    for byte in &inode_bitmap.as_bytes()[..(sb.num_inodes as usize).div_ceil(8)] {
        print!("{byte} ");
    }
    println!();
    println!();

    let data_bitmap = fs.data_bitmap().unwrap_or_else(|e| bail(e));
    println!("Data bitmap");
    for byte in &data_bitmap.as_bytes()[..(sb.num_data as usize).div_ceil(8)] {
        print!("{byte} ");
    }
    println!();

    Ok(())
}
