//! Dice-related types and components
//!
//! This module contains the DiceType enum, the Die component, and the
//! per-die settling state machine (DiePhase / DieState).

use bevy::prelude::*;

/// Component attached to each die entity.
///
/// `roll_index` mirrors the die's position within the active session and
/// is presentation-only (result ordering); identity is the Bevy `Entity`.
#[derive(Component)]
pub struct Die {
    pub die_type: DiceType,
    pub roll_index: usize,
}

/// All supported dice types, in canonical result order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiceType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DiceType {
    /// Canonical ordering for grouped result output.
    pub const ALL: [DiceType; 6] = [
        DiceType::D4,
        DiceType::D6,
        DiceType::D8,
        DiceType::D10,
        DiceType::D12,
        DiceType::D20,
    ];

    pub fn sides(&self) -> u32 {
        match self {
            DiceType::D4 => 4,
            DiceType::D6 => 6,
            DiceType::D8 => 8,
            DiceType::D10 => 10,
            DiceType::D12 => 12,
            DiceType::D20 => 20,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiceType::D4 => "D4",
            DiceType::D6 => "D6",
            DiceType::D8 => "D8",
            DiceType::D10 => "D10",
            DiceType::D12 => "D12",
            DiceType::D20 => "D20",
        }
    }

    /// Index into per-type lookup tables (face catalog entries).
    pub fn ordinal(&self) -> usize {
        match self {
            DiceType::D4 => 0,
            DiceType::D6 => 1,
            DiceType::D8 => 2,
            DiceType::D10 => 3,
            DiceType::D12 => 4,
            DiceType::D20 => 5,
        }
    }

    pub fn parse(s: &str) -> Option<DiceType> {
        match s.to_lowercase().as_str() {
            "d4" => Some(DiceType::D4),
            "d6" => Some(DiceType::D6),
            "d8" => Some(DiceType::D8),
            "d10" => Some(DiceType::D10),
            "d12" => Some(DiceType::D12),
            "d20" => Some(DiceType::D20),
            _ => None,
        }
    }

    /// Physical density of the die for the physics simulation.
    /// Larger dice are heavier, affecting how they roll and bounce.
    pub fn density(&self) -> f32 {
        match self {
            DiceType::D4 => 1.0,
            DiceType::D6 => 1.5,
            DiceType::D8 => 1.8,
            DiceType::D10 => 2.0,
            DiceType::D12 => 2.5,
            DiceType::D20 => 3.0,
        }
    }

    /// Scale factor applied to the die's transform (and thus its collider).
    pub fn scale(&self) -> f32 {
        match self {
            DiceType::D4 => 0.9,
            DiceType::D6 => 1.0,
            DiceType::D8 => 1.0,
            DiceType::D10 => 1.05,
            DiceType::D12 => 1.1,
            DiceType::D20 => 1.2,
        }
    }
}

/// Parse a dice string like "2d6" into a count and die type.
pub fn parse_dice_str(s: &str) -> Option<(usize, DiceType)> {
    let s = s.to_lowercase();

    let (count_str, die_str) = if s.starts_with('d') {
        ("1", s.as_str())
    } else if let Some(pos) = s.find('d') {
        (&s[..pos], &s[pos..])
    } else {
        return None;
    };

    let count: usize = count_str.parse().ok()?;
    if count == 0 {
        return None;
    }
    let die_type = DiceType::parse(die_str)?;

    Some((count, die_type))
}

/// Where a die is in its settle lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiePhase {
    /// In motion, or quiet but not yet through the stabilization window.
    Rolling,
    /// At rest in an ambiguous orientation (edge/corner); awaiting a reroll
    /// or renewed motion.
    Caught,
    /// At rest with a resolved face value. Terminal for the session.
    Settled(u32),
}

/// What the caller should do after feeding one motion sample to a DieState.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateStep {
    /// Nothing to do this tick.
    Hold,
    /// The die has been quiet for the full stabilization window: resolve its
    /// face now and call `settle` or `catch` with the outcome.
    Resolve,
    /// A caught die moved again; its caught highlight must be removed.
    Disturbed,
}

/// Per-die settling state machine, advanced once per poll tick.
#[derive(Component, Clone, Debug)]
pub struct DieState {
    pub phase: DiePhase,
    /// Moment the die first dropped below the motion threshold, if it has
    /// stayed there since.
    pub quiet_since: Option<f32>,
    /// Moment motion was last detected.
    pub last_motion: f32,
}

impl DieState {
    pub fn new(now: f32) -> Self {
        Self {
            phase: DiePhase::Rolling,
            quiet_since: None,
            last_motion: now,
        }
    }

    /// Feed one motion sample. `quiet` is whether combined motion is below
    /// threshold, `window` the stabilization window in seconds.
    pub fn observe(&mut self, quiet: bool, now: f32, window: f32) -> StateStep {
        // A settled die is never re-evaluated within the session.
        if matches!(self.phase, DiePhase::Settled(_)) {
            return StateStep::Hold;
        }

        if !quiet {
            self.last_motion = now;
            self.quiet_since = None;
            if self.phase == DiePhase::Caught {
                self.phase = DiePhase::Rolling;
                return StateStep::Disturbed;
            }
            return StateStep::Hold;
        }

        // A caught die holds its state until it moves again or is rerolled.
        if self.phase == DiePhase::Caught {
            return StateStep::Hold;
        }

        let since = *self.quiet_since.get_or_insert(now);
        if now - since >= window {
            StateStep::Resolve
        } else {
            StateStep::Hold
        }
    }

    /// Record an accepted face resolution. Terminal.
    pub fn settle(&mut self, value: u32) {
        self.phase = DiePhase::Settled(value);
    }

    /// Record a rejected (ambiguous) face resolution.
    pub fn catch(&mut self) {
        self.phase = DiePhase::Caught;
        self.quiet_since = None;
    }

    /// Reset to Rolling with timers cleared (reroll or renewed throw).
    pub fn restart(&mut self, now: f32) {
        *self = Self::new(now);
    }

    pub fn result(&self) -> Option<u32> {
        match self.phase {
            DiePhase::Settled(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, DiePhase::Settled(_))
    }

    pub fn is_caught(&self) -> bool {
        self.phase == DiePhase::Caught
    }
}
