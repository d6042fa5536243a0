//! Storage layer for poncik.
//!
//! This module provides SQLite-based persistence for:
//! - Settlements waiting to be re-delivered
//! - Key-value state (inventory, bonus tracker)

mod database;
mod kv;
mod migrations;

pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
