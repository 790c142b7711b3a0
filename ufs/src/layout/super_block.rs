use core::mem;
use core::ptr;
use core::slice;

use crate::layout::DiskInode;
use crate::{Block, FsError, Result, BLOCK_BITS, BLOCK_SIZE};

/// 超级块：定位镜像内其它连续区域。
/// `*_addr` 是块号，`*_len` 是块数。
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SuperBlock {
    pub inode_bitmap_addr: u32,
    pub inode_bitmap_len: u32,
    pub data_bitmap_addr: u32,
    pub data_bitmap_len: u32,
    pub inode_region_addr: u32,
    pub inode_region_len: u32,
    pub data_region_addr: u32,
    pub data_region_len: u32,
    pub num_inodes: u32,
    pub num_data: u32,
}

impl SuperBlock {
    pub const SIZE: usize = mem::size_of::<Self>();

    /// 依据 inode 与数据块数量排布各区域
    pub fn compute(num_inodes: u32, num_data: u32) -> Self {
        let inode_bitmap_len = (num_inodes as usize).div_ceil(BLOCK_BITS) as u32;
        let data_bitmap_len = (num_data as usize).div_ceil(BLOCK_BITS) as u32;
        let inode_region_len = (num_inodes as usize * DiskInode::SIZE).div_ceil(BLOCK_SIZE) as u32;

        let inode_bitmap_addr = 1;
        let data_bitmap_addr = inode_bitmap_addr + inode_bitmap_len;
        let inode_region_addr = data_bitmap_addr + data_bitmap_len;
        let data_region_addr = inode_region_addr + inode_region_len;

        Self {
            inode_bitmap_addr,
            inode_bitmap_len,
            data_bitmap_addr,
            data_bitmap_len,
            inode_region_addr,
            inode_region_len,
            data_region_addr,
            data_region_len: num_data,
            num_inodes,
            num_data,
        }
    }

    /// 镜像应有的总块数
    #[inline]
    pub fn total_blocks(&self) -> u32 {
        self.data_region_addr + self.data_region_len
    }

    /// 几何校验：各区域依次紧邻、容量足够、整体落在镜像之内
    pub fn check(&self, image_blocks: usize) -> Result<()> {
        let regions_ok = self.inode_bitmap_addr == 1
            && self.data_bitmap_addr == self.inode_bitmap_addr + self.inode_bitmap_len
            && self.inode_region_addr == self.data_bitmap_addr + self.data_bitmap_len
            && self.data_region_addr == self.inode_region_addr + self.inode_region_len
            && self.data_region_len == self.num_data;
        let capacity_ok = self.num_inodes > 0
            && self.num_data > 0
            && self.inode_bitmap_len as usize * BLOCK_BITS >= self.num_inodes as usize
            && self.data_bitmap_len as usize * BLOCK_BITS >= self.num_data as usize
            && self.inode_region_len as usize * BLOCK_SIZE
                >= self.num_inodes as usize * DiskInode::SIZE;

        if regions_ok && capacity_ok && self.total_blocks() as usize <= image_blocks {
            Ok(())
        } else {
            Err(FsError::InvalidSuperBlock)
        }
    }

    pub fn read(block: &Block) -> Self {
        let mut buf = [0u8; Self::SIZE];
        buf.copy_from_slice(&block[..Self::SIZE]);
        unsafe { mem::transmute(buf) }
    }

    pub fn write(&self, block: &mut Block) {
        block[..Self::SIZE].copy_from_slice(self.as_bytes());
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(ptr::from_ref(self).cast(), Self::SIZE) }
    }
}
