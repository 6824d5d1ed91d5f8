//! # Materialization Error Types
//!
//! Generation itself cannot fail. The only fallible step is handing a chunk
//! to the host's materializer, which may fail to acquire assets.

use thiserror::Error;

use crate::chunk::ChunkCoord;

/// Errors a [`crate::ChunkMaterializer`] may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    /// An asset (texture, model, sound) could not be loaded.
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),

    /// The host refused to build visuals for a chunk.
    #[error("materializer rejected chunk {coord}: {reason}")]
    Rejected {
        /// The chunk that was rejected.
        coord: ChunkCoord,
        /// Reason given by the host.
        reason: String,
    },

    /// The host ran out of visual handles or scene capacity.
    #[error("materializer capacity exhausted: {live} live handles")]
    CapacityExhausted {
        /// Handles live at the time of the failure.
        live: usize,
    },
}

/// Result type for materializer operations.
pub type MaterializeResult<T> = Result<T, MaterializeError>;
