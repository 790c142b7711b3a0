//! # 事务磁盘层
//!
//! 对块设备的全部访问都经过 [`Disk`]。
//! 事务开启后，写入先暂存于内存映射（块号 → 块数据）；
//! 提交时一次性落盘，回滚时整体丢弃。
//! 事务内的读取能看到本事务已暂存的写入。
//!
//! 同一时刻至多一个事务，由断言保证。

use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use spin::Mutex;

use crate::{Block, BlockDevice, FsError, Result, BLOCK_SIZE};

/// 事务磁盘：定长镜像 + 可选的写缓冲
pub struct Disk {
    device: Arc<dyn BlockDevice>,
    total_blocks: usize,
    /// `Some` 表示事务进行中
    staged: Mutex<Option<BTreeMap<usize, Block>>>,
}

impl Disk {
    pub fn new(device: Arc<dyn BlockDevice>) -> Self {
        let total_blocks = device.num_blocks();
        Self {
            device,
            total_blocks,
            staged: Mutex::new(None),
        }
    }

    #[inline]
    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn read_block(&self, block_id: usize) -> Result<Block> {
        self.check(block_id)?;

        if let Some(staged) = self.staged.lock().as_ref() {
            if let Some(block) = staged.get(&block_id) {
                return Ok(*block);
            }
        }

        let mut buf = [0; BLOCK_SIZE];
        self.device.read_block(block_id, &mut buf);
        Ok(buf)
    }

    /// 事务之外的写入直达设备
    pub fn write_block(&self, block_id: usize, data: &Block) -> Result<()> {
        self.check(block_id)?;

        match self.staged.lock().as_mut() {
            Some(staged) => {
                staged.insert(block_id, *data);
            }
            None => self.device.write_block(block_id, data),
        }
        Ok(())
    }

    pub fn begin_transaction(&self) {
        let mut staged = self.staged.lock();
        assert!(staged.is_none(), "transaction already open");
        *staged = Some(BTreeMap::new());
    }

    /// 暂存的写入落盘（顺序不限），随后清空缓冲
    pub fn commit(&self) {
        let staged = self
            .staged
            .lock()
            .take()
            .expect("commit without a transaction");
        for (block_id, block) in staged {
            self.device.write_block(block_id, &block);
        }
    }

    /// 丢弃暂存的写入，镜像保持事务开启前的状态
    pub fn rollback(&self) {
        let staged = self.staged.lock().take();
        assert!(staged.is_some(), "rollback without a transaction");
    }

    pub fn in_transaction(&self) -> bool {
        self.staged.lock().is_some()
    }

    #[inline]
    fn check(&self, block_id: usize) -> Result<()> {
        if block_id >= self.total_blocks {
            return Err(FsError::OutOfRange);
        }
        Ok(())
    }
}
