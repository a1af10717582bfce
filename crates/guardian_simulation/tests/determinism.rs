//! Тесты детерминизма
//!
//! Один и тот же seed + один и тот же input → идентичные снапшоты
//! (Health врагов, ledger'ы, anchor'ы).

use bevy::prelude::*;
use guardian_simulation::{
    anchor_snapshot, create_headless_app, world_snapshot, Guardian, GuardianLedger, HammerId, Health, Hostile,
    HostileProjectile, InputEdges, InputLevels,
};

/// Input одного guardian'а на тике: свинги, блоки и recall вперемешку
fn scripted_levels(guardian_index: usize, tick: usize) -> InputLevels {
    let phase = (tick + guardian_index * 17) % 150;
    InputLevels {
        primary: phase < 3 || (60..63).contains(&phase),
        secondary: (100..102).contains(&phase) || (110..112).contains(&phase),
    }
}

/// Запускает симуляцию и возвращает App после последнего тика
fn simulate(seed: u64, tick_count: usize) -> App {
    let mut app = create_headless_app(seed);

    let guardians: Vec<Entity> = (0..4)
        .map(|i| {
            let position = Vec3::new(i as f32 * 200.0, 0.0, 0.0);
            app.world_mut()
                .spawn((
                    Guardian::new(HammerId::GUARDIAN),
                    GuardianLedger::new(3, 3).with_charge(i as f32 * 0.4),
                    Transform::from_translation(position),
                ))
                .id()
        })
        .collect();

    // Кольцо врагов и снарядов вокруг каждого guardian'а
    for i in 0..40 {
        let angle = i as f32 * 0.7;
        let center = Vec2::new((i % 4) as f32 * 200.0, 0.0);
        let position = center + Vec2::from_angle(angle) * (20.0 + (i % 5) as f32 * 15.0);
        if i % 3 == 0 {
            app.world_mut()
                .spawn((HostileProjectile, Transform::from_translation(position.extend(0.0))));
        } else {
            app.world_mut()
                .spawn((Hostile, Health::new(60), Transform::from_translation(position.extend(0.0))));
        }
    }

    let mut previous = vec![InputLevels::default(); guardians.len()];
    for tick in 0..tick_count {
        for (index, &guardian) in guardians.iter().enumerate() {
            let current = scripted_levels(index, tick);
            if let Some(mut edges) = app.world_mut().get_mut::<InputEdges>(guardian) {
                *edges = InputEdges::from_levels(previous[index], current);
            }
            previous[index] = current;
        }

        app.world_mut().run_schedule(FixedUpdate);
    }

    app
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = simulate(seed, tick_count);
    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Health>(world);
    snapshot.extend(world_snapshot::<GuardianLedger>(world));
    snapshot.extend(anchor_snapshot(world).unwrap().into_bytes());
    snapshot
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 400;

    // Запускаем 3 раза: все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_scripted_run_damages_hostiles() {
    let mut app = simulate(42, 300);

    let mut hostiles = app.world_mut().query_filtered::<&Health, With<Hostile>>();
    let total: u32 = hostiles.iter(app.world()).map(|health| health.current).sum();
    let full: u32 = hostiles.iter(app.world()).map(|health| health.max).sum();

    assert!(total < full, "за 300 тиков никто не получил урона");
}
