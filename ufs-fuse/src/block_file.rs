use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use ufs::{BlockDevice, BLOCK_SIZE};

/// 以一个主机文件为镜像的块设备驱动
#[derive(Debug)]
pub struct BlockFile {
    inner: Mutex<File>,
    num_blocks: usize,
}

impl BlockFile {
    pub fn new(fd: File) -> io::Result<Self> {
        let len = fd.metadata()?.len() as usize;
        Ok(Self {
            inner: Mutex::new(fd),
            num_blocks: len / BLOCK_SIZE,
        })
    }
}

impl BlockDevice for BlockFile {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        let mut file = self.inner.lock().unwrap();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .expect("seeking error");
        file.read_exact(buf).expect("not a complete block!");
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        let mut file = self.inner.lock().unwrap();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .expect("seeking error");
        file.write_all(buf).expect("not a complete block!");
    }
}

/// 打开既有镜像
pub fn open_image(path: &Path) -> io::Result<Arc<BlockFile>> {
    let fd = OpenOptions::new().read(true).write(true).open(path)?;
    Ok(Arc::new(BlockFile::new(fd)?))
}

/// 建立定长的新镜像，原有内容清空
pub fn create_image(path: &Path, num_blocks: usize) -> io::Result<Arc<BlockFile>> {
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    fd.set_len((num_blocks * BLOCK_SIZE) as u64)?;
    Ok(Arc::new(BlockFile::new(fd)?))
}
