use core::mem;
use core::ptr;
use core::slice;

use crate::NAME_MAX;

/// 目录项：命名一个子 inode 的定长记录
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct DirEntry {
    /// 子 inode 编号，-1 表示墓碑
    inum: i32,
    /// NULL 结尾；名字占满28字节时无结尾
    name: [u8; NAME_MAX],
}

impl DirEntry {
    /// 记录大小恒为32字节
    pub const SIZE: usize = mem::size_of::<Self>();

    /// 墓碑的 inode 编号
    pub const TOMBSTONE: i32 = -1;

    pub fn new(name: &str, inum: u32) -> Self {
        let bytes = name.as_bytes();
        debug_assert!(!bytes.is_empty() && bytes.len() <= NAME_MAX);

        let mut buf = [0; NAME_MAX];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            inum: inum as i32,
            name: buf,
        }
    }

    /// 名字按 NULL 结尾字符串语义截取，不含填充字节
    pub fn name(&self) -> &[u8] {
        let len = self.name.iter().position(|&c| c == 0).unwrap_or(NAME_MAX);
        &self.name[..len]
    }

    #[inline]
    pub fn inum(&self) -> u32 {
        self.inum as u32
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.inum != Self::TOMBSTONE
    }

    pub fn read(buf: &[u8], offset: usize) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(&buf[offset..offset + Self::SIZE]);
        unsafe { mem::transmute(bytes) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(ptr::from_ref(self).cast(), Self::SIZE) }
    }
}
