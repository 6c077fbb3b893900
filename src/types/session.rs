//! Roll session state
//!
//! One RollSession is active at a time. It owns the entities of the dice in
//! the current throw, the hard completion deadline, and the poll timer that
//! paces settle checks independently of the physics step rate.

use bevy::prelude::*;

use super::dice::DiceType;

/// Cadence of the settle-check polling loop, in seconds. Deliberately much
/// coarser than the physics step.
pub const POLL_INTERVAL: f32 = 0.1;

/// The one active roll. Entities double as stable die identifiers
/// (generation-checked), so deleting a die can never alias another.
#[derive(Resource)]
pub struct RollSession {
    dice: Vec<Entity>,
    open: bool,
    pub started_at: f32,
    pub deadline: f32,
    pub poll: Timer,
}

impl Default for RollSession {
    fn default() -> Self {
        Self {
            dice: Vec::new(),
            open: false,
            started_at: 0.0,
            deadline: 0.0,
            poll: Timer::from_seconds(POLL_INTERVAL, TimerMode::Repeating),
        }
    }
}

impl RollSession {
    /// Open a fresh session. Replaces whatever came before; pending poll and
    /// deadline state from the old session cannot leak into the new one.
    pub fn begin(&mut self, dice: Vec<Entity>, now: f32, timeout: f32) {
        self.dice = dice;
        self.open = true;
        self.started_at = now;
        self.deadline = now + timeout;
        self.poll.reset();
    }

    /// Mark the session terminal. The dice entities stay in the world until
    /// the next roll despawns them.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn dice(&self) -> &[Entity] {
        &self.dice
    }

    /// Add a die to the open session's rolling set (a new throw of a single
    /// die joins the session rather than replacing it).
    pub fn join(&mut self, die: Entity) -> usize {
        debug_assert!(self.open);
        if let Some(pos) = self.dice.iter().position(|&e| e == die) {
            return pos;
        }
        self.dice.push(die);
        self.dice.len() - 1
    }

    /// Remove a die from the session, returning its former roll index so the
    /// caller can renumber the trailing dice in the same tick.
    pub fn remove(&mut self, die: Entity) -> Option<usize> {
        let pos = self.dice.iter().position(|&e| e == die)?;
        self.dice.remove(pos);
        Some(pos)
    }
}

/// Resource storing the results of the most recent completed roll.
#[derive(Resource, Default)]
pub struct DiceResults {
    pub results: Vec<(DiceType, u32)>,
    pub breakdown: String,
    pub total: u32,
}

/// Externally visible status of one die, for the rendering/UI side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DieStatusKind {
    Rolling,
    Caught,
    Settled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DieStatus {
    pub index: usize,
    pub die_type: DiceType,
    pub status: DieStatusKind,
    pub result: Option<u32>,
}
