//! # ufs
//!
//! 单一定长镜像上的类 Unix 块文件系统。
//!
//! 镜像的线性布局：
//! - 超级块
//! - inode 位图
//! - 数据位图
//! - inode 区
//! - 数据区
//!
//! 自下而上的分层：

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// 磁盘块设备接口层：读写磁盘块设备的接口
mod block_dev;
pub use block_dev::BlockDevice;

// 事务磁盘层：镜像之上的写缓冲，整体提交或整体丢弃
mod disk;
pub use disk::Disk;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
mod layout;
pub use layout::{Bitmap, DirEntry, DiskInode, InodeKind, SuperBlock};

// 磁盘块管理器层：构建出磁盘的布局并使用
mod fs;
pub use fs::{Transaction, UfsFileSystem};

// 索引节点层：inode 编号之上的文件操作
mod vfs;

mod error;
pub use error::{FsError, Result};


/// 块大小
pub const BLOCK_SIZE: usize = 4096;
/// 每块的位数
pub const BLOCK_BITS: usize = BLOCK_SIZE * 8;
/// inode 的直接索引块数量
pub const DIRECT_PTRS: usize = 30;
/// 直接索引所能容纳的文件大小
pub const MAX_FILE_SIZE: usize = DIRECT_PTRS * BLOCK_SIZE;
/// 文件名的字节数上限
pub const NAME_MAX: usize = 28;
/// 根目录的 inode 编号，格式化时建立且从不回收
pub const ROOT_INODE: u32 = 0;

/// 一个磁盘块的数据
pub type Block = [u8; BLOCK_SIZE];
