//! The rules seam: the per-game `GameRules` trait and the tagged dispatch
//! that unifies the eight game types behind one surface.

pub mod dispatch;
pub mod engine;

pub use dispatch::{AnyMove, AnyState, GameKind, ALL_GAME_KINDS};
pub use engine::{GameRules, Priority};
