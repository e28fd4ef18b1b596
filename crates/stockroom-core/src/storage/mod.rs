//! Storage layer for Stockroom.
//!
//! A sled database with one tree per entity table, a shared unique index
//! tree and buffered multi-tree transactions.

mod config;
mod engine;
mod transaction;

pub mod key;

pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use transaction::Transaction;
