//! `feedwall-store`: SQLite implementation of the record store capability.

pub mod sqlite;

pub use sqlite::SqliteStore;
