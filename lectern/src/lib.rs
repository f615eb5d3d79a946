//! Book content processing and retrieval pipeline.
//!
//! lectern fetches public-domain book text, splits it into bounded
//! sentence-aligned chunks, caches one embedding vector per chunk keyed
//! by book identity, and serves retrieval-grounded question answering and
//! sentiment analysis over that cache. Generation runs in the background
//! after a book is first requested; synchronous processing is available
//! when an immediate answer is required.

pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod retrieval;
pub mod sentiment;
pub mod service;
pub mod store;
pub mod text;

pub use config::LecternConfig;
pub use error::{LecternError, Result};
pub use service::Library;
