//! # 磁盘数据结构层
//!
//! 定长的磁盘记录以及围绕它们的偏移运算。

mod bitmap;
mod dir_entry;
mod inode;
mod super_block;

pub use self::{
    bitmap::Bitmap,
    dir_entry::DirEntry,
    inode::{DiskInode, InodeKind},
    super_block::SuperBlock,
};
