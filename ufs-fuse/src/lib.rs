//! Host-side tooling for the `ufs` image format: a file-backed block
//! device, the HTTP façade, and the image utilities under `src/bin/`.

mod block_file;
mod service;

pub use self::{
    block_file::{create_image, open_image, BlockFile},
    service::{FsService, Response, PREFIX},
};

#[cfg(test)]
mod tests;
