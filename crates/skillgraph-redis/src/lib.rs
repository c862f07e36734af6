//! Skillgraph Redis Data Layer
//!
//! Async Redis persistence for canonical resume and job documents.

pub mod client;
pub mod records;

pub use client::{init_pool, RedisError, RedisPool, RedisResult};
pub use records::RedisRecordStore;
