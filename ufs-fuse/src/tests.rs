use std::fs;
use std::path::{Path, PathBuf};

use ufs::{SuperBlock, UfsFileSystem, BLOCK_SIZE, MAX_FILE_SIZE, ROOT_INODE};

use crate::{create_image, open_image, FsService};

/// 测试镜像：离开作用域时删除文件
struct TempImage(PathBuf);

impl TempImage {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "ufs-fuse-{}-{name}.img",
            std::process::id()
        ));
        Self(path)
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn fresh_service(name: &str, num_inodes: u32, num_data: u32) -> (TempImage, FsService) {
    let image = TempImage::new(name);
    let total = SuperBlock::compute(num_inodes, num_data).total_blocks();
    let device = create_image(&image.0, total as usize).unwrap();
    let fs = UfsFileSystem::format(device, num_inodes, num_data).unwrap();
    (image, FsService::new(fs))
}

/// 经由第二个文件句柄核对镜像的持久状态
fn resolve(image: &Path, components: &[&str]) -> u32 {
    let fs = UfsFileSystem::open(open_image(image).unwrap()).unwrap();
    components
        .iter()
        .fold(ROOT_INODE, |inum, name| fs.lookup(inum, name).unwrap())
}

#[test]
fn put_creates_intermediate_directories() {
    let (_image, service) = fresh_service("roundtrip", 32, 32);

    let r = service.handle("PUT", "/ds3/a/b/c.txt", b"hello");
    assert_eq!(201, r.status);

    let r = service.handle("GET", "/ds3/a/b/c.txt", b"");
    assert_eq!((200, b"hello".to_vec()), (r.status, r.body));

    // 目录清单：目录名带斜杠，尾斜杠与否皆可
    let r = service.handle("GET", "/ds3/a/", b"");
    assert_eq!((200, b"b/\n".to_vec()), (r.status, r.body));
    let r = service.handle("GET", "/ds3/a", b"");
    assert_eq!(200, r.status);
    let r = service.handle("GET", "/ds3/a/b", b"");
    assert_eq!((200, b"c.txt\n".to_vec()), (r.status, r.body));
}

#[test]
fn overwrite_keeps_the_inode_number() {
    let (image, service) = fresh_service("overwrite", 32, 32);

    assert_eq!(201, service.handle("PUT", "/ds3/a/b/c.txt", b"hello").status);
    let before = resolve(&image.0, &["a", "b", "c.txt"]);

    assert_eq!(
        201,
        service.handle("PUT", "/ds3/a/b/c.txt", b"HELLO WORLD").status
    );
    let r = service.handle("GET", "/ds3/a/b/c.txt", b"");
    assert_eq!((200, b"HELLO WORLD".to_vec()), (r.status, r.body));

    assert_eq!(before, resolve(&image.0, &["a", "b", "c.txt"]));
}

#[test]
fn put_conflicts_with_an_existing_directory() {
    let (_image, service) = fresh_service("conflict", 32, 32);

    assert_eq!(201, service.handle("PUT", "/ds3/a/b/c.txt", b"hello").status);
    assert_eq!(409, service.handle("PUT", "/ds3/a", b"body").status);
    assert_eq!(409, service.handle("PUT", "/ds3/a/b", b"body").status);
}

#[test]
fn delete_removes_files_and_empty_directories() {
    let (_image, service) = fresh_service("delete", 32, 32);
    assert_eq!(201, service.handle("PUT", "/ds3/a/b/c.txt", b"hello").status);

    assert_eq!(200, service.handle("DELETE", "/ds3/a/b/c.txt", b"").status);
    assert_eq!(404, service.handle("GET", "/ds3/a/b/c.txt", b"").status);
    let r = service.handle("GET", "/ds3/a/b/", b"");
    assert_eq!((200, Vec::new()), (r.status, r.body));

    // 幂等：目标已不存在仍然成功
    assert_eq!(200, service.handle("DELETE", "/ds3/a/b/c.txt", b"").status);

    assert_eq!(200, service.handle("DELETE", "/ds3/a/b", b"").status);
    assert_eq!(404, service.handle("GET", "/ds3/a/b", b"").status);
}

#[test]
fn delete_rejects_occupied_directories() {
    let (_image, service) = fresh_service("dirnotempty", 32, 32);
    assert_eq!(201, service.handle("PUT", "/ds3/a/b/c.txt", b"hello").status);

    assert_eq!(400, service.handle("DELETE", "/ds3/a/b", b"").status);
    // 清空之后即可删除
    assert_eq!(200, service.handle("DELETE", "/ds3/a/b/c.txt", b"").status);
    assert_eq!(200, service.handle("DELETE", "/ds3/a/b", b"").status);
}

#[test]
fn size_limit_and_full_disk() {
    let (_image, service) = fresh_service("limits", 32, 32);

    // 直接索引的极限：30块
    let big = vec![0x5au8; MAX_FILE_SIZE];
    assert_eq!(201, service.handle("PUT", "/ds3/big.bin", &big).status);
    let r = service.handle("GET", "/ds3/big.bin", b"");
    assert_eq!((200, big), (r.status, r.body));
    assert_eq!(
        400,
        service.handle("PUT", "/ds3/huge.bin", &vec![0u8; 127_000]).status
    );
    assert_eq!(200, service.handle("DELETE", "/ds3/big.bin", b"").status);

    // 填满镜像后写入以 507 拒绝
    let block = vec![1u8; BLOCK_SIZE];
    for i in 0..31 {
        assert_eq!(
            201,
            service.handle("PUT", &format!("/ds3/f{i:02}"), &block).status
        );
    }
    assert_eq!(507, service.handle("PUT", "/ds3/one-more", &block).status);

    // 覆写失败同样回滚，旧内容原封不动
    assert_eq!(
        507,
        service
            .handle("PUT", "/ds3/f00", &vec![2u8; 2 * BLOCK_SIZE])
            .status
    );
    let r = service.handle("GET", "/ds3/f00", b"");
    assert_eq!((200, block), (r.status, r.body));
}

#[test]
fn failed_put_rolls_back_intermediate_directories() {
    let (_image, service) = fresh_service("rollback", 8, 2);

    // d1 能建，d2 的数据块分配失败，整个事务回滚
    assert_eq!(507, service.handle("PUT", "/ds3/d1/d2/f", b"x").status);
    assert_eq!(404, service.handle("GET", "/ds3/d1", b"").status);
}

#[test]
fn request_validation() {
    let (_image, service) = fresh_service("validation", 32, 32);

    assert_eq!(400, service.handle("GET", "/ds3/", b"").status);
    assert_eq!(404, service.handle("GET", "/ds3", b"").status);
    assert_eq!(404, service.handle("GET", "/elsewhere/x", b"").status);
    assert_eq!(404, service.handle("GET", "/ds3/missing", b"").status);
    assert_eq!(404, service.handle("GET", "/ds3/missing/deeper", b"").status);

    assert_eq!(400, service.handle("PUT", "/ds3/", b"x").status);
    assert_eq!(400, service.handle("PUT", "/ds3/a/", b"x").status);

    assert_eq!(400, service.handle("DELETE", "/ds3/", b"").status);
    assert_eq!(200, service.handle("DELETE", "/ds3/missing", b"").status);
    assert_eq!(404, service.handle("DELETE", "/ds3/missing/x", b"").status);

    assert_eq!(405, service.handle("POST", "/ds3/x", b"").status);
}

#[test]
fn listing_keeps_stored_order() {
    let (_image, service) = fresh_service("listing", 32, 32);

    assert_eq!(201, service.handle("PUT", "/ds3/dir/zz", b"1").status);
    assert_eq!(201, service.handle("PUT", "/ds3/dir/aa", b"2").status);
    assert_eq!(201, service.handle("PUT", "/ds3/dir/sub/x", b"3").status);

    let r = service.handle("GET", "/ds3/dir", b"");
    assert_eq!((200, b"zz\naa\nsub/\n".to_vec()), (r.status, r.body));
}

#[test]
fn walking_through_a_file_is_not_found() {
    let (_image, service) = fresh_service("filewalk", 32, 32);
    assert_eq!(201, service.handle("PUT", "/ds3/f", b"data").status);

    assert_eq!(404, service.handle("GET", "/ds3/f/x", b"").status);
    assert_eq!(404, service.handle("PUT", "/ds3/f/x/y", b"data").status);
    // 前缀能走通，但对文件 unlink 是类型错误
    assert_eq!(400, service.handle("DELETE", "/ds3/f/x", b"").status);
}
