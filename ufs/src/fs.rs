//! # 磁盘块管理器层
//!
//! 构建出镜像的布局并使用。

use alloc::sync::Arc;
use core::ops::{Deref, DerefMut};

use crate::layout::{Bitmap, DirEntry, DiskInode, InodeKind, SuperBlock};
use crate::{BlockDevice, Disk, Result, BLOCK_SIZE, ROOT_INODE};

pub struct UfsFileSystem {
    pub(crate) disk: Disk,
    super_block: SuperBlock,
}

impl UfsFileSystem {
    /// 格式化：清空元数据区，写出超级块，建立根目录
    pub fn format(device: Arc<dyn BlockDevice>, num_inodes: u32, num_data: u32) -> Result<Self> {
        let super_block = SuperBlock::compute(num_inodes, num_data);
        let disk = Disk::new(device);
        super_block.check(disk.total_blocks())?;

        let zero = [0u8; BLOCK_SIZE];
        for block_id in 0..super_block.data_region_addr as usize {
            disk.write_block(block_id, &zero)?;
        }

        let mut block = [0u8; BLOCK_SIZE];
        super_block.write(&mut block);
        disk.write_block(0, &block)?;

        let fs = Self { disk, super_block };

        // 根目录占用 0 号 inode 与数据区第一块
        let mut inode_bitmap = fs.inode_bitmap()?;
        let mut data_bitmap = fs.data_bitmap()?;
        assert_eq!(inode_bitmap.alloc(), Some(ROOT_INODE));
        let root_block = fs.data_block_id(data_bitmap.alloc().unwrap());

        let mut root = DiskInode::init(InodeKind::Directory);
        root.direct[0] = root_block as u32;
        root.size = (2 * DirEntry::SIZE) as u32;

        let mut block = [0u8; BLOCK_SIZE];
        block[..DirEntry::SIZE].copy_from_slice(DirEntry::new(".", ROOT_INODE).as_bytes());
        block[DirEntry::SIZE..2 * DirEntry::SIZE]
            .copy_from_slice(DirEntry::new("..", ROOT_INODE).as_bytes());
        fs.disk.write_block(root_block, &block)?;

        fs.write_inode(ROOT_INODE, &root)?;
        inode_bitmap.flush(&fs.disk)?;
        data_bitmap.flush(&fs.disk)?;

        Ok(fs)
    }

    /// 读取并校验既有镜像的超级块
    pub fn open(device: Arc<dyn BlockDevice>) -> Result<Self> {
        let disk = Disk::new(device);
        let super_block = SuperBlock::read(&disk.read_block(0)?);
        super_block.check(disk.total_blocks())?;
        Ok(Self { disk, super_block })
    }

    #[inline]
    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    /// inode 在磁盘上的位置：块号以及块内偏移
    pub fn disk_inode_pos(&self, inum: u32) -> (usize, usize) {
        let inodes_per_block = BLOCK_SIZE / DiskInode::SIZE;
        let block_id =
            self.super_block.inode_region_addr as usize + inum as usize / inodes_per_block;
        let offset = inum as usize % inodes_per_block * DiskInode::SIZE;
        (block_id, offset)
    }

    pub(crate) fn read_inode(&self, inum: u32) -> Result<DiskInode> {
        let (block_id, offset) = self.disk_inode_pos(inum);
        let block = self.disk.read_block(block_id)?;
        Ok(DiskInode::read(&block, offset))
    }

    pub(crate) fn write_inode(&self, inum: u32, inode: &DiskInode) -> Result<()> {
        let (block_id, offset) = self.disk_inode_pos(inum);
        let mut block = self.disk.read_block(block_id)?;
        inode.write(&mut block, offset);
        self.disk.write_block(block_id, &block)
    }

    pub fn inode_bitmap(&self) -> Result<Bitmap> {
        let sb = &self.super_block;
        Bitmap::load(&self.disk, sb.inode_bitmap_addr, sb.inode_bitmap_len, sb.num_inodes)
    }

    pub fn data_bitmap(&self) -> Result<Bitmap> {
        let sb = &self.super_block;
        Bitmap::load(&self.disk, sb.data_bitmap_addr, sb.data_bitmap_len, sb.num_data)
    }

    /// 数据位图的位号 → 绝对块号
    #[inline]
    pub(crate) fn data_block_id(&self, bit: u32) -> usize {
        (self.super_block.data_region_addr + bit) as usize
    }

    /// 绝对块号 → 数据位图的位号
    #[inline]
    pub(crate) fn data_bit(&self, block_id: u32) -> u32 {
        block_id - self.super_block.data_region_addr
    }

    /// 开启事务。返回的守卫不显式提交则在离开作用域时回滚。
    pub fn begin(&mut self) -> Transaction<'_> {
        self.disk.begin_transaction();
        Transaction {
            fs: self,
            committed: false,
        }
    }
}

/// 作用域事务
pub struct Transaction<'fs> {
    fs: &'fs mut UfsFileSystem,
    committed: bool,
}

impl Transaction<'_> {
    pub fn commit(mut self) {
        self.fs.disk.commit();
        self.committed = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.fs.disk.rollback();
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = UfsFileSystem;

    fn deref(&self) -> &UfsFileSystem {
        self.fs
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut UfsFileSystem {
        self.fs
    }
}
