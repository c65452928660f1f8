//! Compute-once, reuse-forever storage of per-slice feature embeddings

pub mod container;
pub mod record;
pub mod store;

pub use container::{ContainerAttrs, EmbeddingContainer};
pub use record::EmbeddingRecord;
pub use store::{precompute_embeddings, EmbeddingOptions};
