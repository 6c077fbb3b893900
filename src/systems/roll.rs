//! Roll coordination: starting throws, die removal, result formatting,
//! status reporting
//!
//! One RollSession is active at a time. Starting a roll replaces the dice in
//! the world; throwing a single die joins the open session or opens a fresh
//! single-die one. Settling and aggregation live in `settle.rs`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::systems::{forces, setup::spawn_die};
use crate::types::{
    CaughtChanged, DiceResults, DiceType, Die, DiePhase, DieState, DieStatus, DieStatusKind,
    DieThrowRequested, RemoveDieRequested, RollFailed, RollRequested, RollSession, TraySettings,
};

pub fn handle_roll_requests(
    mut commands: Commands,
    mut requests: MessageReader<RollRequested>,
    mut failures: MessageWriter<RollFailed>,
    mut session: ResMut<RollSession>,
    mut results: ResMut<DiceResults>,
    settings: Res<TraySettings>,
    time: Res<Time>,
    existing: Query<Entity, With<Die>>,
) {
    // Spawns and despawns apply at the end of the tick, so a second request
    // in the same tick would miss the first one's dice when clearing the
    // tray. Only the last well-formed request this tick starts a roll.
    let mut latest = None;
    for request in requests.read() {
        if request.dice.is_empty() {
            failures.write(RollFailed {
                reason: "cannot roll an empty set of dice".to_string(),
            });
            continue;
        }
        latest = Some(request);
    }
    let Some(request) = latest else {
        return;
    };

    // The previous roll's dice leave the tray with their session.
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    results.results.clear();
    results.breakdown.clear();
    results.total = 0;

    let now = time.elapsed_secs();
    let count = request.dice.len();
    let mut rng = rand::thread_rng();
    let dice: Vec<Entity> = request
        .dice
        .iter()
        .enumerate()
        .map(|(i, &die_type)| spawn_die(&mut commands, die_type, i, count, now, &mut rng))
        .collect();

    session.begin(dice, now, settings.timeout_for(count));
    info!("Rolling {count} dice (deadline in {:.0}s)", settings.timeout_for(count));
}

/// A renewed throw of one existing die. If a session is open the die rejoins
/// its rolling set; otherwise a fresh single-die session starts.
pub fn handle_single_throws(
    mut requests: MessageReader<DieThrowRequested>,
    mut session: ResMut<RollSession>,
    settings: Res<TraySettings>,
    time: Res<Time>,
    mut caught_changes: MessageWriter<CaughtChanged>,
    mut dice: Query<(&mut Die, &mut DieState, &mut Transform, &mut Velocity)>,
) {
    for request in requests.read() {
        let Ok((mut die, mut state, mut transform, mut velocity)) = dice.get_mut(request.die)
        else {
            warn!("Ignoring throw request for unknown die {:?}", request.die);
            continue;
        };

        let now = time.elapsed_secs();
        let mut rng = rand::thread_rng();
        // The die's roll index always mirrors its session position, whether
        // it rejoins an open session or opens a fresh one.
        die.roll_index = if session.is_open() {
            session.join(request.die)
        } else {
            session.begin(vec![request.die], now, settings.timeout_for(1));
            0
        };
        if state.is_caught() {
            caught_changes.write(CaughtChanged {
                die: request.die,
                caught: false,
            });
        }

        let scale = transform.scale;
        *transform = forces::spawn_transform(0, 1, &mut rng).with_scale(scale);
        *velocity = forces::throw_velocity(1, &mut rng);
        state.restart(now);
    }
}

/// Delete a die from the world and the active session. The remaining dice
/// are renumbered from their session positions in the same tick, so nothing
/// can point at the wrong die afterwards.
pub fn handle_die_removals(
    mut commands: Commands,
    mut requests: MessageReader<RemoveDieRequested>,
    mut session: ResMut<RollSession>,
    mut dice: Query<&mut Die>,
) {
    for request in requests.read() {
        if dice.get(request.die).is_err() {
            warn!("Ignoring removal of unknown die {:?}", request.die);
            continue;
        }

        if session.remove(request.die).is_some() {
            for (position, &entity) in session.dice().iter().enumerate() {
                if let Ok(mut die) = dice.get_mut(entity) {
                    die.roll_index = position;
                }
            }
        }
        commands.entity(request.die).despawn();
    }
}

/// Per-die status for the rendering/UI side, ordered by roll index.
pub fn dice_status<'a>(dice: impl Iterator<Item = (&'a Die, &'a DieState)>) -> Vec<DieStatus> {
    let mut statuses: Vec<DieStatus> = dice
        .map(|(die, state)| DieStatus {
            index: die.roll_index,
            die_type: die.die_type,
            status: match state.phase {
                DiePhase::Rolling => DieStatusKind::Rolling,
                DiePhase::Caught => DieStatusKind::Caught,
                DiePhase::Settled(_) => DieStatusKind::Settled,
            },
            result: state.result(),
        })
        .collect();
    statuses.sort_by_key(|s| s.index);
    statuses
}

/// Format a completed roll: groups in canonical die order, per-group values
/// in throw order, grand total last. `2d6(4+3) + 1d10(7) = 14`.
pub fn format_breakdown(results: &[(DiceType, u32)]) -> (String, u32) {
    let mut parts = Vec::new();
    let mut total = 0u32;

    for die_type in DiceType::ALL {
        let values: Vec<u32> = results
            .iter()
            .filter(|(t, _)| *t == die_type)
            .map(|(_, v)| *v)
            .collect();
        if values.is_empty() {
            continue;
        }
        total += values.iter().sum::<u32>();
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("+");
        parts.push(format!("{}d{}({})", values.len(), die_type.sides(), joined));
    }

    (format!("{} = {}", parts.join(" + "), total), total)
}
