//! Error types for the voxann workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid dimensionality {ndim}, expected 2d or 3d data")]
    InvalidDimensionality { ndim: usize },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("invalid projection mode: {0}")]
    InvalidProjection(String),

    #[error("propagation requested with an empty annotation set")]
    EmptyAnnotationSet,

    #[error("annotation error: {0}")]
    Annotation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("oracle failure: {0}")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Wrap an opaque failure from the segmentation oracle.
    ///
    /// Oracle failures are surfaced to the caller unchanged; nothing in
    /// this workspace retries or reinterprets them.
    pub fn oracle<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Oracle(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
