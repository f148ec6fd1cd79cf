//! API endpoint modules.

mod ssh;

pub use ssh::{SignRequestBuilder, SshApi};
