//! Face resolution: which number a die is showing
//!
//! Pure function of die type and world rotation. Rotates every catalog
//! normal into world space, dots it against the detection vector, and keeps
//! the best match. Always returns a best-effort face; the caller compares
//! the confidence against its tolerance to decide whether the orientation
//! is unambiguous.

use bevy::prelude::*;

use crate::faces::FaceCatalog;
use crate::types::DiceType;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceResolution {
    pub value: u32,
    /// Dot product of the winning face normal with the detection vector,
    /// in [-1, 1]. 1.0 means the face points exactly along it.
    pub confidence: f32,
}

impl FaceResolution {
    /// Whether the orientation is unambiguous under the given tolerance.
    /// Rejected resolutions mean the die is caught, not a lower-confidence
    /// guess.
    pub fn accepted(&self, tolerance: f32) -> bool {
        self.confidence >= 1.0 - tolerance
    }
}

/// Resolve the face a die currently shows given its world rotation.
pub fn resolve(die_type: DiceType, rotation: Quat) -> FaceResolution {
    let entry = FaceCatalog::global().entry(die_type);

    let mut best = FaceResolution {
        value: entry.faces[0].value,
        confidence: f32::NEG_INFINITY,
    };
    for face in &entry.faces {
        let world_normal = rotation * face.normal;
        let dot = world_normal.dot(entry.detection);
        if dot > best.confidence {
            best = FaceResolution {
                value: face.value,
                confidence: dot,
            };
        }
    }
    best
}
