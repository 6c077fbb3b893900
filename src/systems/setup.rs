//! Tray construction and die spawning
//!
//! The tray is a fixed floor and four walls of plain colliders; dice are
//! dynamic convex hulls. Meshes, materials, and labels belong to the
//! rendering collaborator and are absent here.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use crate::faces::die_collider;
use crate::systems::forces;
use crate::types::{DiceType, Die, DieState, TraySettings};

/// Marker component for the tray floor and walls.
#[derive(Component)]
pub struct Tray;

pub fn spawn_tray(mut commands: Commands, settings: Res<TraySettings>) {
    let half = settings.tray_half_extent;
    let wall_height = settings.wall_height;
    let wall_thickness = 0.15;

    // Floor
    commands.spawn((
        Transform::from_xyz(0.0, -0.15, 0.0),
        Collider::cuboid(half, 0.15, half),
        RigidBody::Fixed,
        Restitution::coefficient(0.2),
        Friction::coefficient(0.8),
        Tray,
    ));

    // Walls
    for (pos, size) in [
        (
            Vec3::new(0.0, wall_height / 2.0, -half),
            Vec3::new(2.0 * half + wall_thickness * 2.0, wall_height, wall_thickness),
        ),
        (
            Vec3::new(0.0, wall_height / 2.0, half),
            Vec3::new(2.0 * half + wall_thickness * 2.0, wall_height, wall_thickness),
        ),
        (
            Vec3::new(-half, wall_height / 2.0, 0.0),
            Vec3::new(wall_thickness, wall_height, 2.0 * half),
        ),
        (
            Vec3::new(half, wall_height / 2.0, 0.0),
            Vec3::new(wall_thickness, wall_height, 2.0 * half),
        ),
    ] {
        commands.spawn((
            Transform::from_translation(pos),
            Collider::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
            RigidBody::Fixed,
            Restitution::coefficient(0.2),
            Friction::coefficient(0.8),
            Tray,
        ));
    }
}

/// Spawn one die mid-throw: collision-free starting pose on the spawn ring,
/// randomized orientation, and throw velocity already applied.
pub fn spawn_die<R: Rng>(
    commands: &mut Commands,
    die_type: DiceType,
    roll_index: usize,
    count: usize,
    now: f32,
    rng: &mut R,
) -> Entity {
    let transform =
        forces::spawn_transform(roll_index, count, rng).with_scale(Vec3::splat(die_type.scale()));

    commands
        .spawn((
            transform,
            RigidBody::Dynamic,
            die_collider(die_type),
            forces::throw_velocity(count, rng),
            Restitution::coefficient(0.15),
            Friction::coefficient(0.7),
            ColliderMassProperties::Density(die_type.density()),
            Die {
                die_type,
                roll_index,
            },
            DieState::new(now),
        ))
        .id()
}
