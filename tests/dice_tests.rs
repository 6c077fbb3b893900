//! End-to-end tray tests: a headless app with real physics, driven until the
//! roll coordinator reports completion.

use std::time::{Duration, Instant};

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::*;

use dicetray::systems::{dice_status, format_breakdown};
use dicetray::types::{
    DiceType, Die, DieState, DieStatusKind, DiceResults, DieThrowRequested, RemoveDieRequested,
    RollCompleted, RollFailed, RollRequested, RollSession, TraySettings,
};
use dicetray::DiceTrayPlugin;

#[derive(Resource, Default)]
struct Outcomes {
    completed: Vec<(String, u32)>,
    failed: Vec<String>,
}

fn collect_outcomes(
    mut outcomes: ResMut<Outcomes>,
    mut completions: MessageReader<RollCompleted>,
    mut failures: MessageReader<RollFailed>,
) {
    for msg in completions.read() {
        outcomes.completed.push((msg.breakdown.clone(), msg.total));
    }
    for msg in failures.read() {
        outcomes.failed.push(msg.reason.clone());
    }
}

fn tray_app(settings: TraySettings, physics: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(TransformPlugin);
    if physics {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    }
    app.insert_resource(settings)
        .add_plugins(DiceTrayPlugin)
        .init_resource::<Outcomes>()
        .add_systems(Update, collect_outcomes);
    app
}

/// Run frames until the predicate holds or the wall clock runs out.
fn run_until(app: &mut App, wall_limit: Duration, done: impl Fn(&World) -> bool) -> bool {
    let deadline = Instant::now() + wall_limit;
    while Instant::now() < deadline {
        app.update();
        if done(app.world()) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

/// All dice in the world with their roll indices, sorted by index.
fn dice_by_index(app: &mut App) -> Vec<(Entity, usize, DiceType)> {
    let mut query = app.world_mut().query::<(Entity, &Die)>();
    let mut dice: Vec<_> = query
        .iter(app.world())
        .map(|(entity, die)| (entity, die.roll_index, die.die_type))
        .collect();
    dice.sort_by_key(|d| d.1);
    dice
}

#[test]
fn empty_roll_fails_immediately_without_creating_state() {
    let mut app = tray_app(TraySettings::default(), false);
    app.update();

    app.world_mut().write_message(RollRequested { dice: vec![] });
    app.update();
    app.update();

    let outcomes = app.world().resource::<Outcomes>();
    assert_eq!(outcomes.failed.len(), 1);
    assert!(outcomes.completed.is_empty());

    let mut dice = app.world_mut().query::<&Die>();
    assert_eq!(dice.iter(app.world()).count(), 0);
}

#[test]
fn rethrowing_a_rolling_die_keeps_the_open_session() {
    let mut app = tray_app(TraySettings::default(), false);
    app.update();

    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D6, DiceType::D8],
    });
    app.update();
    let dice = dice_by_index(&mut app);
    assert_eq!(dice.len(), 2);

    app.world_mut().write_message(DieThrowRequested { die: dice[0].0 });
    app.update();

    let session = app.world().resource::<RollSession>();
    assert!(session.is_open());
    assert_eq!(session.dice(), &[dice[0].0, dice[1].0]);
    assert_eq!(app.world().get::<Die>(dice[0].0).unwrap().roll_index, 0);
    assert_eq!(app.world().get::<Die>(dice[1].0).unwrap().roll_index, 1);
}

#[test]
fn single_throws_and_removal_keep_indices_in_step() {
    let mut app = tray_app(TraySettings::default(), false);
    app.update();

    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D6, DiceType::D20],
    });
    app.update();
    let dice = dice_by_index(&mut app);
    assert_eq!(dice.len(), 2);
    let (d6, d20) = (dice[0].0, dice[1].0);

    // Once the session is over, later throws open a fresh one; throw the
    // dice back in the opposite order so the old roll indices are stale.
    app.world_mut().resource_mut::<RollSession>().close();
    app.world_mut().write_message(DieThrowRequested { die: d20 });
    app.update();
    assert!(app.world().resource::<RollSession>().is_open());
    assert_eq!(app.world().get::<Die>(d20).unwrap().roll_index, 0);

    app.world_mut().write_message(DieThrowRequested { die: d6 });
    app.update();
    assert_eq!(app.world().resource::<RollSession>().dice(), &[d20, d6]);
    assert_eq!(app.world().get::<Die>(d6).unwrap().roll_index, 1);

    // Removing the leading die renumbers the other from its new position.
    app.world_mut().write_message(RemoveDieRequested { die: d20 });
    app.update();

    let remaining = dice_by_index(&mut app);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].0, d6);
    assert_eq!(remaining[0].1, 0);
    assert_eq!(app.world().resource::<RollSession>().dice(), &[d6]);
}

#[test]
fn same_tick_roll_requests_keep_only_the_last() {
    let mut app = tray_app(TraySettings::default(), false);
    app.update();

    // Three requests land in one tick; only the last well-formed one may
    // leave dice in the tray, and the malformed one still reports failure.
    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D6, DiceType::D6, DiceType::D6],
    });
    app.world_mut().write_message(RollRequested { dice: vec![] });
    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D20],
    });
    app.update();
    app.update();

    let dice = dice_by_index(&mut app);
    assert_eq!(dice.len(), 1);
    assert_eq!(dice[0].2, DiceType::D20);
    assert_eq!(app.world().resource::<RollSession>().dice(), &[dice[0].0]);
    assert_eq!(app.world().resource::<Outcomes>().failed.len(), 1);
}

#[test]
fn roll_settles_and_reports_grouped_total() {
    // Short windows keep the test quick; the hard timeout still guarantees
    // termination if a die lands badly.
    let settings = TraySettings {
        stabilize_seconds: 0.5,
        session_timeout: 10.0,
        ..Default::default()
    };
    let mut app = tray_app(settings, true);
    app.update();

    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D6, DiceType::D6, DiceType::D10],
    });

    let finished = run_until(&mut app, Duration::from_secs(30), |world| {
        !world.resource::<Outcomes>().completed.is_empty()
    });
    assert!(finished, "roll never completed");

    let results = app.world().resource::<DiceResults>();
    assert_eq!(results.results.len(), 3);
    let sum: u32 = results.results.iter().map(|(_, v)| v).sum();
    assert_eq!(results.total, sum);
    assert_eq!(results.breakdown, format_breakdown(&results.results).0);

    let outcomes = app.world().resource::<Outcomes>();
    assert!(outcomes.failed.is_empty());
    assert_eq!(outcomes.completed[0], (results.breakdown.clone(), sum));
    // Two d6 and one d10, grouped: "2d6(...) + 1d10(...) = total".
    assert!(results.breakdown.starts_with("2d6("));
    assert!(results.breakdown.contains(" + 1d10("));
}

#[test]
fn timeout_forces_every_die_to_a_result() {
    // A stabilization window longer than the session means no die can ever
    // settle on its own; the deadline must still produce a full result.
    let settings = TraySettings {
        stabilize_seconds: 999.0,
        session_timeout: 2.0,
        single_timeout: 2.0,
        ..Default::default()
    };
    let mut app = tray_app(settings, true);
    app.update();

    app.world_mut().write_message(RollRequested {
        dice: vec![DiceType::D20, DiceType::D8],
    });

    let finished = run_until(&mut app, Duration::from_secs(20), |world| {
        !world.resource::<Outcomes>().completed.is_empty()
    });
    assert!(finished, "timeout did not force completion");

    let results = app.world().resource::<DiceResults>();
    assert_eq!(results.results.len(), 2);

    // No die is left rolling or caught after forced completion.
    let mut dice = app.world_mut().query::<(&Die, &DieState)>();
    let statuses = dice_status(dice.iter(app.world()));
    assert_eq!(statuses.len(), 2);
    for status in &statuses {
        assert_eq!(status.status, DieStatusKind::Settled);
        assert!(status.result.is_some());
    }
}
