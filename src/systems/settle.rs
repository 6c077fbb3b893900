//! Settle monitoring, aggregation, and timeout
//!
//! Runs on a coarse poll timer, not the physics step. Each tick advances
//! every session die's state machine in roll order from the latest body
//! telemetry, then checks aggregation and the hard deadline against the
//! fully-updated set. The session completes only when every die is settled
//! and none is caught; the deadline forces best-effort resolution so a roll
//! can never hang.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::resolver;
use crate::types::{
    CaughtChanged, DiceResults, Die, DiePhase, DieState, RollCompleted, RollFailed, RollSession,
    StateStep, TraySettings,
};

/// Whether a die's combined motion is below the settle threshold: near the
/// floor, and linear-plus-angular speed under the configured limit.
pub fn is_quiet(translation: Vec3, velocity: &Velocity, settings: &TraySettings) -> bool {
    let speed = velocity.linvel.length() + velocity.angvel.length() * 0.1;
    translation.y < settings.rest_height && speed < settings.speed_limit()
}

#[allow(clippy::too_many_arguments)]
pub fn poll_dice(
    mut session: ResMut<RollSession>,
    mut results: ResMut<DiceResults>,
    settings: Res<TraySettings>,
    time: Res<Time>,
    mut dice: Query<(&Die, &mut DieState, &Transform, &Velocity)>,
    mut caught_changes: MessageWriter<CaughtChanged>,
    mut completions: MessageWriter<RollCompleted>,
    mut failures: MessageWriter<RollFailed>,
) {
    if !session.is_open() {
        return;
    }
    if !session.poll.tick(time.delta()).just_finished() {
        return;
    }

    let now = time.elapsed_secs();
    let order: Vec<Entity> = session.dice().to_vec();

    // Advance every die before looking at the aggregate.
    for &entity in &order {
        let Ok((die, mut state, transform, velocity)) = dice.get_mut(entity) else {
            // Telemetry vanished behind the coordinator's back: integration
            // error, not a user-facing condition. Fail the roll.
            warn!("Die {entity:?} lost its physics body; aborting the roll");
            session.close();
            failures.write(RollFailed {
                reason: format!("die {:?} lost its physics body mid-roll", entity),
            });
            return;
        };

        let quiet = is_quiet(transform.translation, velocity, &settings);
        match state.observe(quiet, now, settings.stabilize_seconds) {
            StateStep::Hold => {}
            StateStep::Disturbed => {
                caught_changes.write(CaughtChanged {
                    die: entity,
                    caught: false,
                });
            }
            StateStep::Resolve => {
                let resolution = resolver::resolve(die.die_type, transform.rotation);
                if resolution.accepted(settings.face_tolerance) {
                    debug!(
                        "{} #{} settled on {} (confidence {:.3})",
                        die.die_type.name(),
                        die.roll_index,
                        resolution.value,
                        resolution.confidence
                    );
                    state.settle(resolution.value);
                } else {
                    info!(
                        "{} #{} caught (confidence {:.3})",
                        die.die_type.name(),
                        die.roll_index,
                        resolution.confidence
                    );
                    state.catch();
                    caught_changes.write(CaughtChanged {
                        die: entity,
                        caught: true,
                    });
                }
            }
        }
    }

    // Deadline: force-complete whatever is still unresolved with the
    // resolver's best-effort face, confidence ignored. One policy for single
    // and multi-die sessions alike.
    if now >= session.deadline {
        for &entity in &order {
            if let Ok((die, mut state, transform, _)) = dice.get_mut(entity) {
                if !state.is_settled() {
                    if state.is_caught() {
                        caught_changes.write(CaughtChanged {
                            die: entity,
                            caught: false,
                        });
                    }
                    let resolution = resolver::resolve(die.die_type, transform.rotation);
                    info!(
                        "{} #{} forced to {} at timeout (confidence {:.3})",
                        die.die_type.name(),
                        die.roll_index,
                        resolution.value,
                        resolution.confidence
                    );
                    state.settle(resolution.value);
                }
            }
        }
    }

    // Aggregation: complete only once every die is settled and none caught.
    // Caught dice pause completion while polling continues.
    let all_settled = order.iter().all(|&entity| {
        dice.get(entity)
            .map(|(_, state, _, _)| state.is_settled())
            .unwrap_or(false)
    });
    if !all_settled {
        return;
    }

    let mut outcome: Vec<(usize, crate::types::DiceType, u32)> = order
        .iter()
        .filter_map(|&entity| {
            let (die, state, _, _) = dice.get(entity).ok()?;
            match state.phase {
                DiePhase::Settled(value) => Some((die.roll_index, die.die_type, value)),
                _ => None,
            }
        })
        .collect();
    outcome.sort_by_key(|(index, _, _)| *index);

    results.results = outcome
        .into_iter()
        .map(|(_, die_type, value)| (die_type, value))
        .collect();
    let (breakdown, total) = super::roll::format_breakdown(&results.results);
    results.breakdown = breakdown.clone();
    results.total = total;

    info!("Roll complete: {breakdown}");
    session.close();
    completions.write(RollCompleted { breakdown, total });
}
