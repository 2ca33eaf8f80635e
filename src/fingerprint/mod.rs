//! Source fingerprinting and rebuild detection.

pub mod hasher;
pub mod oracle;

pub use hasher::{hash_bytes, hash_directory, hash_file};
pub use oracle::{check, commit, fingerprint_path, should_rebuild, Check, Freshness, StaleReason};
