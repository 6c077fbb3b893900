//! Core types for the dice tray

pub mod dice;
pub mod messages;
pub mod session;
pub mod settings;

pub use dice::{parse_dice_str, DiceType, Die, DiePhase, DieState, StateStep};
pub use messages::{
    CaughtChanged, DieThrowRequested, RemoveDieRequested, RerollRequested, RollCompleted,
    RollFailed, RollRequested,
};
pub use session::{DiceResults, DieStatus, DieStatusKind, RollSession, POLL_INTERVAL};
pub use settings::TraySettings;
