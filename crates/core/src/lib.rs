//! Core types and traits for walletdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Version: schema generation of a namespace
//! - ReadBucket / ReadWriteBucket: handles onto one namespace inside a store transaction
//! - MemoryBucket: in-memory bucket used as a reference model
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod traits;
pub mod version;

pub use error::{Error, Result};
pub use memory::MemoryBucket;
pub use traits::{ReadBucket, ReadWriteBucket};
pub use version::Version;
