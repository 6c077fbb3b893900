//! Systems driving the dice tray

pub mod forces;
pub mod reroll;
pub mod roll;
pub mod settle;
pub mod setup;

pub use reroll::handle_reroll_requests;
pub use roll::{dice_status, format_breakdown, handle_die_removals, handle_roll_requests,
    handle_single_throws};
pub use settle::poll_dice;
pub use setup::spawn_tray;
