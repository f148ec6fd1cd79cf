mod common;
mod ssh;

pub use common::*;
pub use ssh::*;
