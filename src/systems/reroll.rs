//! Rerolling caught dice
//!
//! Re-activates every caught die in the open session with the
//! downward-biased reroll impulse. The same session and polling loop resume;
//! no new session is created.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use crate::systems::forces;
use crate::types::{CaughtChanged, Die, DieState, RerollRequested, RollSession};

pub fn handle_reroll_requests(
    mut requests: MessageReader<RerollRequested>,
    session: Res<RollSession>,
    time: Res<Time>,
    mut caught_changes: MessageWriter<CaughtChanged>,
    mut dice: Query<(&mut DieState, &mut Velocity), With<Die>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    let mut rng = rand::thread_rng();
    if !reroll_caught(
        &session,
        time.elapsed_secs(),
        &mut rng,
        &mut caught_changes,
        &mut dice,
    ) {
        info!("Reroll requested but no dice are caught");
    }
}

/// Reroll every caught die in the session. Returns false (and mutates
/// nothing) when the session is closed or no die is caught.
pub fn reroll_caught<R: Rng>(
    session: &RollSession,
    now: f32,
    rng: &mut R,
    caught_changes: &mut MessageWriter<CaughtChanged>,
    dice: &mut Query<(&mut DieState, &mut Velocity), With<Die>>,
) -> bool {
    if !session.is_open() {
        return false;
    }

    let mut any = false;
    for &entity in session.dice() {
        let Ok((mut state, mut velocity)) = dice.get_mut(entity) else {
            continue;
        };
        if !state.is_caught() {
            continue;
        }

        caught_changes.write(CaughtChanged {
            die: entity,
            caught: false,
        });
        state.restart(now);
        *velocity = forces::reroll_velocity(rng);
        any = true;
    }

    if any {
        info!("Rerolled caught dice");
    }
    any
}
