//! Headless dice tray CLI
//!
//! Rolls the requested dice through the physics simulation and prints the
//! grouped breakdown once every die has settled.

use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::*;
use clap::Parser;
use colored::Colorize;

use dicetray::systems::dice_status;
use dicetray::types::{
    parse_dice_str, DiceType, Die, DieState, DieStatusKind, RerollRequested, RollCompleted,
    RollFailed, RollRequested, RollSession, TraySettings,
};
use dicetray::DiceTrayPlugin;

#[derive(Parser)]
#[command(name = "dicetray", about = "Roll physics-simulated dice in a tray")]
struct Cli {
    /// Dice to roll, in dice notation (e.g. "2d6 1d10")
    #[arg(required = true)]
    dice: Vec<String>,

    /// Path to a RON settings file (created with --write-settings)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to the --settings path and exit
    #[arg(long, requires = "settings")]
    write_settings: bool,

    /// Automatically reroll caught dice instead of waiting for the timeout
    #[arg(long)]
    auto_reroll: bool,
}

#[derive(Resource)]
struct CliOptions {
    dice: Vec<DiceType>,
    auto_reroll: bool,
}

fn main() {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => TraySettings::load(path),
        None => TraySettings::default(),
    };

    if cli.write_settings {
        let path = cli.settings.as_deref().expect("clap enforces --settings");
        if let Err(e) = settings.save(path) {
            eprintln!("{}", e.red());
            std::process::exit(1);
        }
        println!("Wrote settings to {}", path.display());
        return;
    }

    let mut dice = Vec::new();
    for arg in &cli.dice {
        match parse_dice_str(arg) {
            Some((count, die_type)) => dice.extend(std::iter::repeat(die_type).take(count)),
            None => {
                eprintln!("{}", format!("Unrecognized dice notation: {arg}").red());
                std::process::exit(2);
            }
        }
    }

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(TransformPlugin)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .insert_resource(settings)
        .add_plugins(DiceTrayPlugin)
        .insert_resource(CliOptions {
            dice,
            auto_reroll: cli.auto_reroll,
        })
        .add_systems(Startup, queue_roll)
        .add_systems(Update, (log_status, auto_reroll, report_outcome))
        .run();
}

fn queue_roll(options: Res<CliOptions>, mut requests: MessageWriter<RollRequested>) {
    requests.write(RollRequested {
        dice: options.dice.clone(),
    });
}

/// Log a one-line status summary once a second while the roll is running.
fn log_status(
    session: Res<RollSession>,
    dice: Query<(&Die, &DieState)>,
    time: Res<Time>,
    mut last: Local<f32>,
) {
    if !session.is_open() {
        return;
    }
    let now = time.elapsed_secs();
    if now - *last < 1.0 {
        return;
    }
    *last = now;

    let statuses = dice_status(dice.iter());
    let summary: Vec<String> = statuses
        .iter()
        .map(|s| match (s.status, s.result) {
            (DieStatusKind::Settled, Some(value)) => format!("{}={}", s.die_type.name(), value),
            (DieStatusKind::Caught, _) => format!("{}=caught", s.die_type.name()),
            _ => format!("{}=rolling", s.die_type.name()),
        })
        .collect();
    info!("{}", summary.join(" "));
}

/// With --auto-reroll, nudge caught dice once nothing else is still moving.
fn auto_reroll(
    options: Res<CliOptions>,
    session: Res<RollSession>,
    dice: Query<&DieState, With<Die>>,
    time: Res<Time>,
    mut last: Local<f32>,
    mut requests: MessageWriter<RerollRequested>,
) {
    if !options.auto_reroll || !session.is_open() {
        return;
    }
    let any_caught = dice.iter().any(|state| state.is_caught());
    let any_rolling = dice
        .iter()
        .any(|state| !state.is_caught() && !state.is_settled());
    if !any_caught || any_rolling {
        return;
    }

    // Give each reroll a few seconds to land before trying again.
    let now = time.elapsed_secs();
    if now - *last < 3.0 {
        return;
    }
    *last = now;
    requests.write(RerollRequested);
}

fn report_outcome(
    mut completions: MessageReader<RollCompleted>,
    mut failures: MessageReader<RollFailed>,
    mut exit: MessageWriter<AppExit>,
) {
    for completed in completions.read() {
        println!("{}", completed.breakdown.green().bold());
        exit.write(AppExit::Success);
    }
    for failed in failures.read() {
        eprintln!("{}", failed.reason.red());
        exit.write(AppExit::error());
    }
}
