//! # 索引节点层
//!
//! inode 编号之上的文件系统操作。
//!
//! 目录项流的维护采用**压缩**纪律：删除时后续项整体前移，
//! 追加时写在流末尾，因此磁盘上不会出现墓碑；
//! 读取方仍会跳过 `inum == -1` 的记录，那是记录格式自带的约定。

use alloc::vec;
use alloc::vec::Vec;

use crate::layout::{Bitmap, DirEntry, DiskInode, InodeKind};
use crate::{FsError, Result, UfsFileSystem, BLOCK_SIZE, DIRECT_PTRS, MAX_FILE_SIZE, NAME_MAX};

impl UfsFileSystem {
    /// 读取一个在用 inode 的记录
    pub fn stat(&self, inum: u32) -> Result<DiskInode> {
        if inum >= self.super_block().num_inodes {
            return Err(FsError::InvalidInode);
        }
        if !self.inode_bitmap()?.get(inum) {
            return Err(FsError::InvalidInode);
        }
        self.read_inode(inum)
    }

    /// 在父目录中按名查找，返回首个同名活跃项的 inode 编号。
    /// 名字逐字节比较。
    pub fn lookup(&self, parent: u32, name: &str) -> Result<u32> {
        self.read_dir(parent)?
            .iter()
            .find(|entry| entry.is_live() && entry.name() == name.as_bytes())
            .map(DirEntry::inum)
            .ok_or(FsError::NotFound)
    }

    /// 读出整个目录项流
    pub fn read_dir(&self, inum: u32) -> Result<Vec<DirEntry>> {
        let inode = self.stat(inum)?;
        if !inode.is_dir() {
            return Err(FsError::InvalidType);
        }

        let mut buf = vec![0u8; inode.size as usize];
        self.read_inode_data(&inode, &mut buf)?;
        Ok((0..buf.len())
            .step_by(DirEntry::SIZE)
            .map(|offset| DirEntry::read(&buf, offset))
            .collect())
    }

    /// 顺序读取，实际读出 `min(buf.len(), inode.size)` 字节
    pub fn read(&self, inum: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.len() > MAX_FILE_SIZE {
            return Err(FsError::InvalidSize);
        }
        let inode = self.stat(inum)?;

        let len = buf.len().min(inode.size as usize);
        self.read_inode_data(&inode, &mut buf[..len])?;
        Ok(len)
    }

    /// 全量覆写：释放旧块，整体重新分配。
    /// 分配不足时不落盘任何字节，镜像保持调用前的状态。
    pub fn write(&mut self, inum: u32, buf: &[u8]) -> Result<usize> {
        if buf.len() > MAX_FILE_SIZE {
            return Err(FsError::InvalidSize);
        }
        let mut inode = self.stat(inum)?;
        if !inode.is_file() {
            return Err(FsError::InvalidType);
        }

        let mut data_bitmap = self.data_bitmap()?;
        for index in 0..inode.data_blocks() {
            data_bitmap.dealloc(self.data_bit(inode.direct[index]));
        }

        let blocks_needed = buf.len().div_ceil(BLOCK_SIZE);
        let mut new_blocks = Vec::with_capacity(blocks_needed);
        for _ in 0..blocks_needed {
            new_blocks.push(data_bitmap.alloc().ok_or(FsError::NoSpace)?);
        }

        inode.direct = [0; DIRECT_PTRS];
        for (index, (&bit, chunk)) in new_blocks.iter().zip(buf.chunks(BLOCK_SIZE)).enumerate() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            let block_id = self.data_block_id(bit);
            self.disk.write_block(block_id, &block)?;
            inode.direct[index] = block_id as u32;
        }
        inode.size = buf.len() as u32;

        self.write_inode(inum, &inode)?;
        data_bitmap.flush(&self.disk)?;
        Ok(buf.len())
    }

    /// 在父目录下创建文件或目录。
    /// 已存在同名同类型项时原样返回其编号，同名不同类型则拒绝。
    pub fn create(&mut self, parent: u32, kind: InodeKind, name: &str) -> Result<u32> {
        check_name(name)?;

        match self.lookup(parent, name) {
            Ok(existing) => {
                let inode = self.stat(existing)?;
                return if inode.kind() == Some(kind) {
                    Ok(existing)
                } else {
                    Err(FsError::InvalidType)
                };
            }
            Err(FsError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let mut entries = self.read_dir(parent)?;
        let mut parent_inode = self.stat(parent)?;
        let mut inode_bitmap = self.inode_bitmap()?;
        let mut data_bitmap = self.data_bitmap()?;

        let new_inum = inode_bitmap.alloc().ok_or(FsError::NoSpace)?;
        let mut new_inode = DiskInode::init(kind);

        // 目录生来带有指向自身的 `.` 与指向父目录的 `..`
        let mut dir_block = None;
        if kind == InodeKind::Directory {
            let block_id = self.data_block_id(data_bitmap.alloc().ok_or(FsError::NoSpace)?);
            let mut block = [0u8; BLOCK_SIZE];
            block[..DirEntry::SIZE].copy_from_slice(DirEntry::new(".", new_inum).as_bytes());
            block[DirEntry::SIZE..2 * DirEntry::SIZE]
                .copy_from_slice(DirEntry::new("..", parent).as_bytes());
            new_inode.direct[0] = block_id as u32;
            new_inode.size = (2 * DirEntry::SIZE) as u32;
            dir_block = Some((block_id, block));
        }

        entries.push(DirEntry::new(name, new_inum));
        self.layout_dir(&mut parent_inode, entries.len(), &mut data_bitmap)?;

        // 至此全部分配成功，才开始落盘
        if let Some((block_id, block)) = dir_block {
            self.disk.write_block(block_id, &block)?;
        }
        self.write_dir_stream(&parent_inode, &entries)?;
        self.write_inode(new_inum, &new_inode)?;
        self.write_inode(parent, &parent_inode)?;
        inode_bitmap.flush(&self.disk)?;
        data_bitmap.flush(&self.disk)?;
        Ok(new_inum)
    }

    /// 删除目录项并回收其 inode 与数据块。
    /// 目标不存在时为无操作，因而重复删除也会成功。
    pub fn unlink(&mut self, parent: u32, name: &str) -> Result<()> {
        if name == "." || name == ".." {
            return Err(FsError::OperationNotAllowed);
        }
        if name.len() > NAME_MAX {
            return Err(FsError::InvalidName);
        }

        let mut entries = self.read_dir(parent)?;
        let Some(position) = entries
            .iter()
            .position(|entry| entry.is_live() && entry.name() == name.as_bytes())
        else {
            return Ok(());
        };

        let target = entries[position].inum();
        let target_inode = self.stat(target)?;
        if target_inode.is_dir() {
            let occupied = self
                .read_dir(target)?
                .iter()
                .any(|entry| entry.is_live() && entry.name() != b"." && entry.name() != b"..");
            if occupied {
                return Err(FsError::DirNotEmpty);
            }
        }

        let mut parent_inode = self.stat(parent)?;
        let mut inode_bitmap = self.inode_bitmap()?;
        let mut data_bitmap = self.data_bitmap()?;

        for index in 0..target_inode.data_blocks() {
            data_bitmap.dealloc(self.data_bit(target_inode.direct[index]));
        }
        inode_bitmap.dealloc(target);

        // 压缩：后续目录项整体前移一格
        entries.remove(position);
        self.layout_dir(&mut parent_inode, entries.len(), &mut data_bitmap)?;
        self.write_dir_stream(&parent_inode, &entries)?;
        self.write_inode(parent, &parent_inode)?;
        inode_bitmap.flush(&self.disk)?;
        data_bitmap.flush(&self.disk)?;
        Ok(())
    }

    fn read_inode_data(&self, inode: &DiskInode, buf: &mut [u8]) -> Result<()> {
        for (index, chunk) in buf.chunks_mut(BLOCK_SIZE).enumerate() {
            let block = self.disk.read_block(inode.direct[index] as usize)?;
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        Ok(())
    }

    /// 依据目录项数调整目录的块占用（分配或释放尾块），更新 size
    fn layout_dir(
        &self,
        inode: &mut DiskInode,
        num_entries: usize,
        data_bitmap: &mut Bitmap,
    ) -> Result<()> {
        let new_size = num_entries * DirEntry::SIZE;
        if new_size > MAX_FILE_SIZE {
            return Err(FsError::NoSpace);
        }

        let old_blocks = inode.data_blocks();
        let new_blocks = new_size.div_ceil(BLOCK_SIZE);
        for index in new_blocks..old_blocks {
            data_bitmap.dealloc(self.data_bit(inode.direct[index]));
            inode.direct[index] = 0;
        }
        for index in old_blocks..new_blocks {
            let bit = data_bitmap.alloc().ok_or(FsError::NoSpace)?;
            inode.direct[index] = self.data_block_id(bit) as u32;
        }

        inode.size = new_size as u32;
        Ok(())
    }

    /// 把目录项流写进目录占用的所有数据块
    fn write_dir_stream(&self, inode: &DiskInode, entries: &[DirEntry]) -> Result<()> {
        let mut buf = vec![0u8; entries.len() * DirEntry::SIZE];
        for (index, entry) in entries.iter().enumerate() {
            buf[index * DirEntry::SIZE..(index + 1) * DirEntry::SIZE]
                .copy_from_slice(entry.as_bytes());
        }

        for (index, chunk) in buf.chunks(BLOCK_SIZE).enumerate() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            self.disk.write_block(inode.direct[index] as usize, &block)?;
        }
        Ok(())
    }
}

/// 名字是不透明字节序列，长度 1..=28 且不含 NULL
fn check_name(name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > NAME_MAX || bytes.contains(&0) {
        return Err(FsError::InvalidName);
    }
    Ok(())
}
