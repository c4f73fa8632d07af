//! Embedding adapters
//!
//! Both adapters implement [`pantry_engine::Embedder`] and are injected into
//! the database when it is opened.
//!
//! | Adapter | Needs | Notes |
//! |---------|-------|-------|
//! | [`HashEmbedder`] | nothing | deterministic feature hashing, works offline |
//! | [`ApiEmbedder`] | `embed` feature | OpenAI-compatible `/embeddings` endpoint |

pub mod api;
pub mod hash;

pub use api::ApiEmbedder;
pub use hash::HashEmbedder;
