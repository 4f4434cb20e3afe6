//! Wire snapshot codec.
//!
//! A snapshot is the full canonical state, encoded compactly for transport
//! and re-rendering after a reconnect. The shape is identical whether taken
//! at match start or after any move, and decoding a snapshot yields a state
//! equal to the one encoded.

use crate::rules::AnyState;

/// Why a snapshot failed to encode or decode.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a state snapshot.
pub fn encode(state: &AnyState) -> Result<Vec<u8>, SnapshotError> {
    bincode::serialize(state).map_err(SnapshotError::Encode)
}

/// Decode a state snapshot.
pub fn decode(bytes: &[u8]) -> Result<AnyState, SnapshotError> {
    bincode::deserialize(bytes).map_err(SnapshotError::Decode)
}
