use std::mem;

use ufs::{DirEntry, DiskInode, SuperBlock};

#[test]
fn on_disk_records() {
    assert_eq!(40, mem::size_of::<SuperBlock>());
    assert_eq!(128, mem::size_of::<DiskInode>());
    assert_eq!(32, mem::size_of::<DirEntry>());

    assert_eq!(mem::size_of::<SuperBlock>(), SuperBlock::SIZE);
    assert_eq!(mem::size_of::<DiskInode>(), DiskInode::SIZE);
    assert_eq!(mem::size_of::<DirEntry>(), DirEntry::SIZE);
}
