//! Messages exchanged between the tray core and its callers
//!
//! Roll requests come in, roll outcomes and caught-die highlight changes go
//! out. The rendering/UI side only ever sees these plus the status query.

use bevy::prelude::*;

use super::dice::DiceType;

/// Start a coordinated roll of the given dice. An empty list is rejected
/// with a `RollFailed` and no state is created.
#[derive(Message)]
pub struct RollRequested {
    pub dice: Vec<DiceType>,
}

/// Throw a single existing die again. Joins the open session's rolling set,
/// or starts a fresh single-die session if none is open.
#[derive(Message)]
pub struct DieThrowRequested {
    pub die: Entity,
}

/// Reroll every caught die in the open session.
#[derive(Message)]
pub struct RerollRequested;

/// Delete one die from the world and from the active session.
#[derive(Message)]
pub struct RemoveDieRequested {
    pub die: Entity,
}

/// The roll finished: every die carries a result.
#[derive(Message)]
pub struct RollCompleted {
    pub breakdown: String,
    pub total: u32,
}

/// The roll could not run or aborted; the session is gone.
#[derive(Message)]
pub struct RollFailed {
    pub reason: String,
}

/// Highlight (or stop highlighting) a caught die. Consumed by the rendering
/// collaborator.
#[derive(Message)]
pub struct CaughtChanged {
    pub die: Entity,
    pub caught: bool,
}
