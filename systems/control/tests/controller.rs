use glam::Vec2;
use theseus_core::{
    CellKind, ConfigError, ControllerTuning, EnemyId, HydraConfig, Perception, PhysicsBody,
    SharkConfig, TargetSnapshot, TileCoord,
};
use theseus_system_behavior::{Hydra, HydraState, Shark, SharkState};
use theseus_system_control::{Enemy, EnemyController, EnemyState, Squad};
use theseus_world::{CurrentField, LevelGrid, PointMass};

const DT: f32 = 0.1;

fn every_tick() -> ControllerTuning {
    ControllerTuning {
        stagger_period: 1,
        ..ControllerTuning::default()
    }
}

fn shark_controller(id: u32, tuning: ControllerTuning) -> EnemyController<Shark> {
    EnemyController::new(
        EnemyId::new(id),
        Shark::new(SharkConfig::default()).expect("valid tuning"),
        tuning,
    )
    .expect("valid controller tuning")
}

fn open_level(columns: u32, rows: u32) -> (LevelGrid, CurrentField) {
    let grid = LevelGrid::new(columns, rows, 1.0).expect("grid builds");
    let currents = CurrentField::from_grid(&grid).expect("field builds");
    (grid, currents)
}

fn visible_at(position: Vec2) -> Perception {
    Perception::visible(TargetSnapshot::new(position, Vec2::ZERO))
}

#[test]
fn perception_runs_only_on_staggered_ticks() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = shark_controller(3, ControllerTuning::default());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 1.0);

    let perceived: Vec<u64> = (1..=20)
        .filter_map(|tick| {
            let report = controller.tick(DT, &mut body, Perception::alone(), &grid, &currents);
            report.perceived.then_some(tick)
        })
        .collect();

    assert_eq!(perceived, [7, 17]);
    assert_eq!(controller.ticks(), 20);
}

#[test]
fn approach_routes_around_a_wall() {
    let mut grid = LevelGrid::new(10, 10, 1.0).expect("grid builds");
    for row in 0..9 {
        grid.set(TileCoord::new(5, row), CellKind::Terrain)
            .expect("in bounds");
    }
    let currents = CurrentField::from_grid(&grid).expect("field builds");
    let mut controller = shark_controller(1, every_tick());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 1.0);

    let report = controller.tick(
        DT,
        &mut body,
        visible_at(Vec2::new(8.5, 2.5)),
        &grid,
        &currents,
    );

    assert_eq!(report.state, SharkState::Approach);
    assert!(report.searched);
    assert!(
        report.desired_velocity.y > 0.0,
        "expected a step toward the gap, got {:?}",
        report.desired_velocity
    );
    let speed = SharkConfig::default().approach_speed;
    assert!((report.desired_velocity.length() - speed).abs() < 1e-4);
}

#[test]
fn heading_is_reused_between_eligible_ticks() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = shark_controller(9, ControllerTuning::default());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 1.0);
    let target = visible_at(Vec2::new(10.5, 2.5));

    let planned = controller.tick(DT, &mut body, target, &grid, &currents);
    assert!(planned.perceived && planned.searched);
    assert_eq!(planned.state, SharkState::Approach);

    let coasting = controller.tick(DT, &mut body, target, &grid, &currents);
    assert!(!coasting.perceived);
    assert!(!coasting.searched);
    assert_eq!(coasting.desired_velocity, planned.desired_velocity);
}

#[test]
fn each_tick_applies_exactly_the_reported_impulse() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = shark_controller(1, every_tick());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 2.0).with_velocity(Vec2::new(-1.0, 3.0));

    for _ in 0..5 {
        let before = body.linear_velocity();
        let report = controller.tick(
            DT,
            &mut body,
            visible_at(Vec2::new(12.5, 2.5)),
            &grid,
            &currents,
        );
        let after = body.linear_velocity();
        assert!((after - (before + report.impulse / 2.0)).length() < 1e-5);

        let heading = report.desired_velocity.normalize_or_zero();
        let limit = report.desired_velocity.length().max(before.dot(heading));
        assert!(after.dot(heading) <= limit + 1e-4);
        body.integrate(DT);
    }
}

#[test]
fn losing_the_target_brakes_to_a_halt() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = shark_controller(1, every_tick());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 1.0);

    let _ = controller.tick(
        DT,
        &mut body,
        visible_at(Vec2::new(9.5, 9.5)),
        &grid,
        &currents,
    );
    assert_ne!(body.linear_velocity(), Vec2::ZERO);

    let report = controller.tick(DT, &mut body, Perception::alone(), &grid, &currents);

    assert_eq!(report.state, SharkState::Idle);
    assert_eq!(report.desired_velocity, Vec2::ZERO);
    assert!(body.linear_velocity().length() < 1e-6);
}

#[test]
fn hits_stun_on_the_next_tick() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = shark_controller(1, every_tick());
    let mut body = PointMass::new(Vec2::new(2.5, 2.5), 1.0);
    let target = visible_at(Vec2::new(9.5, 9.5));

    let _ = controller.tick(DT, &mut body, target, &grid, &currents);
    controller.on_hit();
    let report = controller.tick(DT, &mut body, target, &grid, &currents);

    assert_eq!(report.state, SharkState::Stunned);
    assert_eq!(report.desired_velocity, Vec2::ZERO);
}

#[test]
fn hydras_hold_their_ground() {
    let (grid, currents) = open_level(20, 20);
    let mut controller = EnemyController::new(
        EnemyId::new(2),
        Hydra::new(HydraConfig::default()).expect("valid tuning"),
        every_tick(),
    )
    .expect("valid controller tuning");
    let mut body = PointMass::new(Vec2::new(5.5, 5.5), 1.0);

    for _ in 0..30 {
        let report = controller.tick(
            DT,
            &mut body,
            visible_at(Vec2::new(12.5, 5.5)),
            &grid,
            &currents,
        );
        assert_eq!(report.desired_velocity, Vec2::ZERO);
        assert_eq!(report.impulse, Vec2::ZERO);
    }
    assert_ne!(controller.state(), HydraState::Idle);
}

#[test]
fn controllers_reject_a_zero_stagger_period() {
    let error = EnemyController::new(
        EnemyId::new(1),
        Shark::new(SharkConfig::default()).expect("valid tuning"),
        ControllerTuning {
            stagger_period: 0,
            ..ControllerTuning::default()
        },
    )
    .expect_err("zero stagger period");
    assert!(matches!(error, ConfigError::ZeroCount { .. }));
}

#[test]
fn squads_check_sight_and_skip_the_dead() {
    let mut grid = LevelGrid::new(12, 6, 1.0).expect("grid builds");
    for row in 0..6 {
        grid.set(TileCoord::new(6, row), CellKind::Terrain)
            .expect("in bounds");
    }
    let currents = CurrentField::from_grid(&grid).expect("field builds");

    let mut squad = Squad::new();
    for (id, x) in [(1, 2.5), (2, 8.5), (3, 9.5)] {
        let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
        let enemy = Enemy::shark(EnemyId::new(id), shark, every_tick()).expect("valid enemy");
        squad.push(enemy, PointMass::new(Vec2::new(x, 2.5), 1.0));
    }
    if let Some(member) = squad.get_mut(EnemyId::new(3)) {
        member.enemy.on_death();
    }

    let target = TargetSnapshot::new(Vec2::new(10.5, 3.5), Vec2::ZERO);
    let mut reports = Vec::new();
    squad.tick_all(DT, Some(target), &grid, &currents, &mut reports);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, EnemyId::new(1));
    assert_eq!(reports[0].state, EnemyState::Shark(SharkState::Idle));
    assert_eq!(reports[1].id, EnemyId::new(2));
    assert_eq!(reports[1].state, EnemyState::Shark(SharkState::Approach));
    assert_eq!(
        reports[1].previous,
        Some(EnemyState::Shark(SharkState::Idle))
    );

    reports.clear();
    squad.tick_all(DT, None, &grid, &currents, &mut reports);
    assert!(reports
        .iter()
        .all(|report| report.state == EnemyState::Shark(SharkState::Idle)));
    assert!(squad.members()[2].enemy.is_terminal());
}

#[test]
fn squads_trace_sight_only_on_perceiving_ticks() {
    let mut grid = LevelGrid::new(12, 6, 1.0).expect("grid builds");
    for row in 0..6 {
        grid.set(TileCoord::new(6, row), CellKind::Terrain)
            .expect("in bounds");
    }
    let currents = CurrentField::from_grid(&grid).expect("field builds");
    let mut squad = Squad::new();
    let shark = Shark::new(SharkConfig::default()).expect("valid tuning");
    let enemy = Enemy::shark(EnemyId::new(1), shark, ControllerTuning::default())
        .expect("valid enemy");
    squad.push(enemy, PointMass::new(Vec2::new(8.5, 2.5), 1.0));

    let open_water = TargetSnapshot::new(Vec2::new(10.5, 3.5), Vec2::ZERO);
    let behind_rock = TargetSnapshot::new(Vec2::new(2.5, 2.5), Vec2::ZERO);
    let mut reports = Vec::new();
    let mut tick_with = |squad: &mut Squad<PointMass>, target| {
        reports.clear();
        squad.tick_all(DT, Some(target), &grid, &currents, &mut reports);
        (reports[0].perceived, squad.members()[0].sees_target())
    };

    // Enemy 1 with the default period of 10 perceives on ticks 9 and 19.
    assert_eq!(tick_with(&mut squad, open_water), (false, false));
    for _ in 2..9 {
        let _ = tick_with(&mut squad, open_water);
    }
    assert!(squad.members()[0].enemy.perceives_next_tick());
    assert_eq!(tick_with(&mut squad, open_water), (true, true));

    assert_eq!(tick_with(&mut squad, behind_rock), (false, true));
    for _ in 11..19 {
        let _ = tick_with(&mut squad, behind_rock);
    }
    assert_eq!(tick_with(&mut squad, behind_rock), (true, false));
}
