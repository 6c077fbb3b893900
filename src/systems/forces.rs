//! Throw and reroll impulses
//!
//! Deterministic contracts over randomized inputs: spawn-ring placement so
//! dice never overlap at throw start, upward-biased throw velocities with
//! magnitude damped as the die count grows, and the strongly downward-biased
//! reroll variant that forces an edge-resting die to tumble instead of
//! re-settling into the same ambiguous pose.

use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

/// Height above the floor dice are released from.
pub const SPAWN_HEIGHT: f32 = 1.0;

/// Starting pose for die `index` of `count`: a point on a small ring with a
/// per-index angular offset, plus a random orientation.
pub fn spawn_transform<R: Rng>(index: usize, count: usize, rng: &mut R) -> Transform {
    Transform::from_translation(spawn_position(index, count, rng))
        .with_rotation(random_orientation(rng))
}

pub fn spawn_position<R: Rng>(index: usize, count: usize, rng: &mut R) -> Vec3 {
    if count <= 1 {
        return Vec3::new(0.0, SPAWN_HEIGHT + rng.gen_range(0.0..0.3), 0.0);
    }
    // Ring radius grows with the count but stays well inside the tray walls.
    let radius = (0.35 + 0.1 * count as f32).min(1.4);
    let angle = index as f32 / count as f32 * TAU;
    Vec3::new(
        angle.cos() * radius,
        SPAWN_HEIGHT + rng.gen_range(0.0..0.3),
        angle.sin() * radius,
    )
}

pub fn random_orientation<R: Rng>(rng: &mut R) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
    )
}

/// Initial-throw velocity: upward-biased with lateral scatter, damped by the
/// square root of the die count so big handfuls feel like one throw instead
/// of an explosion.
pub fn throw_velocity<R: Rng>(count: usize, rng: &mut R) -> Velocity {
    let damp = 1.0 / (count.max(1) as f32).sqrt();
    Velocity {
        linvel: Vec3::new(
            rng.gen_range(-1.5..1.5) * damp,
            rng.gen_range(1.0..2.5) * damp,
            rng.gen_range(-1.5..1.5) * damp,
        ),
        angvel: random_torque(8.0, rng),
    }
}

/// Reroll velocity: strongly downward-biased with a harder spin, so a die
/// caught on an edge or corner tumbles off it.
pub fn reroll_velocity<R: Rng>(rng: &mut R) -> Velocity {
    Velocity {
        linvel: Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-3.5..-2.0),
            rng.gen_range(-1.0..1.0),
        ),
        angvel: random_torque(12.0, rng),
    }
}

fn random_torque<R: Rng>(max: f32, rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(-max..max),
        rng.gen_range(-max..max),
        rng.gen_range(-max..max),
    )
}
