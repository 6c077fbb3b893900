//! dicetray: physics-settled polyhedral dice with face resolution
//!
//! Dice are thrown into a simulated tray by Rapier; this crate decides, once
//! motion subsides, which face each die shows. The core is a per-die
//! settling state machine (Rolling → Caught/Settled) polled on a coarse
//! timer, a session coordinator that aggregates per-die outcomes into one
//! formatted result with a hard timeout, and a reroll protocol for dice that
//! come to rest in ambiguous orientations.
//!
//! Everything is wired up by [`DiceTrayPlugin`]; callers drive it with the
//! messages in [`types::messages`] and read back [`types::RollCompleted`] /
//! [`types::DiceResults`].

pub mod faces;
pub mod resolver;
pub mod systems;
pub mod types;

use bevy::prelude::*;

use types::{
    CaughtChanged, DiceResults, DieThrowRequested, RemoveDieRequested, RerollRequested,
    RollCompleted, RollFailed, RollRequested, RollSession, TraySettings,
};

pub struct DiceTrayPlugin;

impl Plugin for DiceTrayPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<TraySettings>() {
            app.init_resource::<TraySettings>();
        }
        app.init_resource::<RollSession>()
            .init_resource::<DiceResults>()
            .add_message::<RollRequested>()
            .add_message::<DieThrowRequested>()
            .add_message::<RerollRequested>()
            .add_message::<RemoveDieRequested>()
            .add_message::<RollCompleted>()
            .add_message::<RollFailed>()
            .add_message::<CaughtChanged>()
            .add_systems(Startup, systems::spawn_tray)
            // Chained so every tick sees a deterministic order: new rolls and
            // removals first, rerolls next, settle checks and aggregation on
            // the fully-updated set last.
            .add_systems(
                Update,
                (
                    systems::handle_roll_requests,
                    systems::handle_single_throws,
                    systems::handle_die_removals,
                    systems::handle_reroll_requests,
                    systems::poll_dice,
                )
                    .chain(),
            );
    }
}
