//! HTTP façade: maps `/ds3/...` paths onto inode walks.
//!
//! 改动镜像的两个方法（PUT、DELETE）全程处于事务之内；
//! 任何提前返回都会经由事务守卫回滚。

use std::sync::Mutex;

use ufs::{FsError, InodeKind, Result as FsResult, UfsFileSystem, ROOT_INODE};

/// URL 前缀，其下的路径映射到文件系统树
pub const PREFIX: &str = "/ds3/";

pub struct FsService {
    pub(crate) fs: Mutex<UfsFileSystem>,
}

/// 交回给 HTTP 框架的应答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }
}

impl FsService {
    pub fn new(fs: UfsFileSystem) -> Self {
        Self { fs: Mutex::new(fs) }
    }

    /// 分发一个请求；前缀不符一律 404
    pub fn handle(&self, method: &str, url: &str, body: &[u8]) -> Response {
        let path = url.split('?').next().unwrap_or(url);
        let Some(path) = path.strip_prefix(PREFIX) else {
            return Response::status(404);
        };

        match method {
            "GET" => self.get(path),
            "PUT" => self.put(path, body),
            "DELETE" => self.delete(path),
            _ => Response::status(405),
        }
    }

    pub fn get(&self, path: &str) -> Response {
        let components = components(path);
        if components.is_empty() {
            return Response::status(400);
        }

        let fs = self.fs.lock().unwrap();
        let Ok(inum) = walk(&fs, &components) else {
            return Response::status(404);
        };
        let Ok(inode) = fs.stat(inum) else {
            return Response::status(404);
        };

        if inode.is_dir() {
            match list_dir(&fs, inum) {
                Ok(body) => Response::ok(body),
                Err(_) => Response::status(404),
            }
        } else {
            let mut buf = vec![0u8; inode.size as usize];
            match fs.read(inum, &mut buf) {
                Ok(len) => {
                    buf.truncate(len);
                    Response::ok(buf)
                }
                Err(_) => Response::status(400),
            }
        }
    }

    pub fn put(&self, path: &str, body: &[u8]) -> Response {
        // 以 `/` 结尾即空文件名
        if path.is_empty() || path.ends_with('/') {
            return Response::status(400);
        }
        let mut components = components(path);
        let Some(file_name) = components.pop() else {
            return Response::status(400);
        };

        let mut fs = self.fs.lock().unwrap();
        let mut tx = fs.begin();

        // 逐级下行，缺失的中间目录就地补建
        let mut parent = ROOT_INODE;
        for dir in components {
            parent = match tx.lookup(parent, dir) {
                Ok(inum) => inum,
                Err(FsError::NotFound) => {
                    match tx.create(parent, InodeKind::Directory, dir) {
                        Ok(inum) => inum,
                        Err(FsError::NoSpace) => return Response::status(507),
                        Err(_) => return Response::status(400),
                    }
                }
                Err(_) => return Response::status(404),
            };
        }

        // 同名目录占住了目标路径
        match tx.lookup(parent, file_name) {
            Ok(inum) => match tx.stat(inum) {
                Ok(inode) if inode.is_dir() => return Response::status(409),
                Ok(_) => {}
                Err(_) => return Response::status(404),
            },
            Err(FsError::NotFound) => {}
            Err(_) => return Response::status(404),
        }

        let inum = match tx.create(parent, InodeKind::File, file_name) {
            Ok(inum) => inum,
            Err(FsError::NoSpace) => return Response::status(507),
            Err(_) => return Response::status(400),
        };
        match tx.write(inum, body) {
            Ok(_) => {}
            Err(FsError::NoSpace) => return Response::status(507),
            Err(_) => return Response::status(400),
        }

        tx.commit();
        Response::status(201)
    }

    pub fn delete(&self, path: &str) -> Response {
        let mut components = components(path);
        let Some(name) = components.pop() else {
            return Response::status(400);
        };

        let mut fs = self.fs.lock().unwrap();
        let mut tx = fs.begin();
        let Ok(parent) = walk(&tx, &components) else {
            return Response::status(404);
        };
        // 目标本就不存在时 unlink 是无操作，同样算成功
        if tx.unlink(parent, name).is_err() {
            return Response::status(400);
        }

        tx.commit();
        Response::status(200)
    }
}

/// 去掉空段后的路径组件
fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn walk(fs: &UfsFileSystem, components: &[&str]) -> FsResult<u32> {
    let mut inum = ROOT_INODE;
    for name in components {
        inum = fs.lookup(inum, name)?;
    }
    Ok(inum)
}

/// 目录清单：按存储顺序每行一项，目录名带 `/` 后缀
fn list_dir(fs: &UfsFileSystem, inum: u32) -> FsResult<Vec<u8>> {
    let mut body = Vec::new();
    for entry in fs.read_dir(inum)? {
        if !entry.is_live() || entry.name() == b"." || entry.name() == b".." {
            continue;
        }
        body.extend_from_slice(entry.name());
        if fs.stat(entry.inum())?.is_dir() {
            body.push(b'/');
        }
        body.push(b'\n');
    }
    Ok(body)
}
