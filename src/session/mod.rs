//! Match session layer: the turn controller, the two-player session
//! binding, and the wire snapshot codec.

pub mod controller;
pub mod match_session;
pub mod snapshot;

pub use controller::{MatchController, MoveRecord};
pub use match_session::{MatchSession, PlayerRef, SubmitReport};
pub use snapshot::SnapshotError;
