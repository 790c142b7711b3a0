/// 核心操作的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// inode 编号越界，或指向未使用的记录
    InvalidInode,
    /// 对象类型与操作不符
    InvalidType,
    InvalidName,
    InvalidSize,
    NotFound,
    /// 位图用尽
    NoSpace,
    DirNotEmpty,
    OperationNotAllowed,
    /// 块号落在镜像之外
    OutOfRange,
    /// 块0的内容描述不了这块镜像
    InvalidSuperBlock,
}

pub type Result<T> = core::result::Result<T, FsError>;
