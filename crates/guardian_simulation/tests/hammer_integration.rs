//! Hammer integration test
//!
//! Headless App + HammerPlugin, FixedUpdate гоняется напрямую.
//!
//! Проверяем:
//! - блок (списание guard, урон, уничтожение снаряда, recall)
//! - свинг → бросок в одной активации
//! - мёртвые / исчезнувшие цели пропускаются
//! - replication outbox

use std::sync::Arc;

use bevy::prelude::*;
use guardian_simulation::hammer::{AnchorMode, HitMode, NoHooks, ResourceKind, SwingInProgress};
use guardian_simulation::*;

const TEST_HAMMER: HammerId = HammerId(1);

/// Helper: App с зарегистрированным тестовым вариантом (без критов)
fn create_hammer_app(definition: WeaponDefinition) -> App {
    let mut app = create_headless_app(42);
    app.world_mut()
        .resource_mut::<HammerRegistry>()
        .register(TEST_HAMMER, "test_hammer", definition, Arc::new(NoHooks))
        .unwrap();
    app
}

fn test_definition() -> WeaponDefinition {
    WeaponDefinition::builder().crit_chance(0.0).build().unwrap()
}

fn spawn_guardian(app: &mut App, ledger: GuardianLedger) -> Entity {
    app.world_mut()
        .spawn((Guardian::new(TEST_HAMMER), ledger, Transform::default()))
        .id()
}

fn spawn_hostile(app: &mut App, x: f32, health: Health) -> Entity {
    app.world_mut()
        .spawn((Hostile, health, Transform::from_xyz(x, 0.0, 0.0)))
        .id()
}

/// Один тик с заданным input (host перезаписывает InputEdges каждый тик)
fn tick_with(app: &mut App, guardian: Entity, edges: InputEdges) {
    *app.world_mut().get_mut::<InputEdges>(guardian).unwrap() = edges;
    app.world_mut().run_schedule(FixedUpdate);
}

fn tick(app: &mut App, guardian: Entity) {
    tick_with(app, guardian, InputEdges::default());
}

fn anchor_of(app: &App, guardian: Entity) -> Option<Entity> {
    app.world().get::<Guardian>(guardian).unwrap().anchor
}

fn anchor(app: &App, entity: Entity) -> &AnchorInstance {
    app.world().get::<AnchorInstance>(entity).unwrap()
}

fn ledger(app: &App, guardian: Entity) -> &GuardianLedger {
    app.world().get::<GuardianLedger>(guardian).unwrap()
}

fn health(app: &App, entity: Entity) -> u32 {
    app.world().get::<Health>(entity).unwrap().current
}

/// Test: secondary press → блок, guard списан, заряд сброшен
#[test]
fn test_block_deploys_and_spends_guard() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3).with_charge(0.5));

    tick_with(&mut app, guardian, InputEdges::secondary_press());

    let ledger = ledger(&app, guardian);
    assert_eq!(ledger.balance(ResourceKind::Guard), 2);
    assert_eq!(ledger.charge, 0.0);

    let entity = anchor_of(&app, guardian).expect("block anchor spawned");
    let block = anchor(&app, entity);
    assert_eq!(block.phase(), AnchorPhase::AnchoredBlocking);
    assert_eq!(block.mode(), AnchorMode::Block);
    // Заспавнен в этом тике, ещё не тикал
    assert_eq!(block.current_block_duration, 180);
    assert_eq!(block.position, Vec2::new(40.0, 0.0));

    // Transform синхронизирован
    let transform = app.world().get::<Transform>(entity).unwrap();
    assert_eq!(transform.translation.truncate(), Vec2::new(40.0, 0.0));
}

/// Test: без guard блок не ставится
#[test]
fn test_block_without_guard_does_nothing() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3).with_guard(0).with_charge(0.5));

    tick_with(&mut app, guardian, InputEdges::secondary_press());

    assert!(anchor_of(&app, guardian).is_none());
    assert_eq!(ledger(&app, guardian).charge, 0.5);
}

/// Test: блок бьёт врага один раз и уничтожает снаряд
#[test]
fn test_block_hits_hostile_and_destroys_projectile() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3));
    let hostile = spawn_hostile(&mut app, 50.0, Health::new(100));
    let projectile = app
        .world_mut()
        .spawn((HostileProjectile, Transform::from_xyz(30.0, 0.0, 0.0)))
        .id();

    tick_with(&mut app, guardian, InputEdges::secondary_press());
    // Anchor начинает работать со следующего тика
    assert_eq!(health(&app, hostile), 100);
    assert!(app.world().get_entity(projectile).is_ok());

    tick(&mut app, guardian);
    // 10 × 0.33
    assert_eq!(health(&app, hostile), 97);
    assert!(app.world().get_entity(projectile).is_err());

    // Урон от блока один раз за фазу
    for _ in 0..40 {
        tick(&mut app, guardian);
    }
    assert_eq!(health(&app, hostile), 97);
}

/// Test: recall: возврат в 1.5 раза быстрее и поимка владельцем
#[test]
fn test_recall_returns_block_to_owner() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3));

    tick_with(&mut app, guardian, InputEdges::secondary_press());
    let entity = anchor_of(&app, guardian).unwrap();

    // Recall и первый шаг возврата в том же тике: 12 × 1.5 = 18
    tick_with(&mut app, guardian, InputEdges::secondary_press());
    let returning = anchor(&app, entity);
    assert_eq!(returning.phase(), AnchorPhase::Returning);
    assert!(returning.is_recalled());
    assert!((returning.position.x - 22.0).abs() < 1e-4);

    // Recall не тратит guard
    assert_eq!(ledger(&app, guardian).balance(ResourceKind::Guard), 2);

    tick(&mut app, guardian);
    assert!((anchor(&app, entity).position.x - 4.0).abs() < 1e-4);

    tick(&mut app, guardian);
    assert!(anchor_of(&app, guardian).is_none());
    assert!(app.world().get_entity(entity).is_err());
}

/// Test: свинг бьёт сразу, на последнем тике та же активация летит броском
#[test]
fn test_swing_then_full_throw() {
    let definition = WeaponDefinition::builder()
        .crit_chance(0.0)
        .range(10)
        .swing_speed_multiplier(10.0)
        .slam_stacks(2)
        .guard_stacks(0)
        .build()
        .unwrap();
    let mut app = create_hammer_app(definition);
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3).with_charge(1.0));
    let hostile = spawn_hostile(&mut app, 20.0, Health::new(100));

    tick_with(&mut app, guardian, InputEdges::primary_press());
    // Полный заряд на старте: 10 × 0.5, без бонуса слабого свинга
    assert_eq!(health(&app, hostile), 95);
    assert!(app.world().get::<SwingInProgress>(guardian).is_some());
    // Заряд сброшен стартом, +0.2 за попадание
    assert!((ledger(&app, guardian).charge - 0.2).abs() < 1e-6);

    // Актор занят: primary во время свинга игнорируется
    tick_with(&mut app, guardian, InputEdges::primary_press());
    assert!(anchor_of(&app, guardian).is_none());

    tick(&mut app, guardian);
    assert!(app.world().get::<SwingInProgress>(guardian).is_none());
    let entity = anchor_of(&app, guardian).expect("throw launched at the end of the swing");
    assert_eq!(anchor(&app, entity).mode(), AnchorMode::Throw(ThrowStrength::Full));

    // Первый шаг броска: anchor на x=10, враг на x=20
    tick(&mut app, guardian);
    assert_eq!(health(&app, hostile), 85);
    assert_eq!(anchor(&app, entity).phase(), AnchorPhase::Returning);
    assert_eq!(ledger(&app, guardian).balance(ResourceKind::Slam), 2);

    for _ in 0..10 {
        tick(&mut app, guardian);
    }
    assert!(anchor_of(&app, guardian).is_none());
    // На обратном пути цель на cooldown
    assert_eq!(health(&app, hostile), 85);
}

/// Test: cannot_swing: primary сразу бросает, сила по заряду
#[test]
fn test_cannot_swing_throws_immediately() {
    let definition = WeaponDefinition::builder()
        .crit_chance(0.0)
        .range(10)
        .cannot_swing(true)
        .build()
        .unwrap();
    let mut app = create_hammer_app(definition);
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3).with_charge(0.5));

    tick_with(&mut app, guardian, InputEdges::primary_press());

    assert!(app.world().get::<SwingInProgress>(guardian).is_none());
    let entity = anchor_of(&app, guardian).unwrap();
    let thrown = anchor(&app, entity);
    assert_eq!(thrown.mode(), AnchorMode::Throw(ThrowStrength::Weak));
    assert_eq!(thrown.range(), 5);
    assert_eq!(ledger(&app, guardian).charge, 0.0);
}

/// Test: мёртвые цели не участвуют в overlap
#[test]
fn test_dead_targets_are_skipped() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3));
    let dead = spawn_hostile(&mut app, 20.0, Health { current: 0, max: 30 });

    tick_with(&mut app, guardian, InputEdges::primary_press());

    let swing = app.world().get::<SwingInProgress>(guardian).unwrap();
    assert_eq!(swing.activation.hits(HitMode::Melee), 0);
    assert_eq!(ledger(&app, guardian).charge, 0.0);
    assert_eq!(health(&app, dead), 0);
}

/// Test: владелец исчез → anchor удаляется
#[test]
fn test_orphaned_anchor_despawns() {
    let mut app = create_hammer_app(test_definition());
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3));

    tick_with(&mut app, guardian, InputEdges::secondary_press());
    let entity = anchor_of(&app, guardian).unwrap();

    app.world_mut().despawn(guardian);
    app.world_mut().run_schedule(FixedUpdate);

    assert!(app.world().get_entity(entity).is_err());
}

/// Test: outbox получает snapshot на спавне и на смене фазы
#[test]
fn test_replication_outbox() {
    let definition = WeaponDefinition::builder()
        .crit_chance(0.0)
        .range(3)
        .cannot_swing(true)
        .build()
        .unwrap();
    let mut app = create_hammer_app(definition);
    let guardian = spawn_guardian(&mut app, GuardianLedger::new(3, 3).with_charge(1.0));

    tick_with(&mut app, guardian, InputEdges::primary_press());
    let entity = anchor_of(&app, guardian).unwrap();

    let spawned = app.world_mut().resource_mut::<ReplicationOutbox>().drain();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].0, entity);
    assert_eq!(spawned[0].1.phase, AnchorPhase::Outgoing);

    // Полёт без событий не реплицируется
    tick(&mut app, guardian);
    tick(&mut app, guardian);
    assert!(app.world_mut().resource_mut::<ReplicationOutbox>().drain().is_empty());

    // range = 3 тика → Returning
    tick(&mut app, guardian);
    let changed = app.world_mut().resource_mut::<ReplicationOutbox>().drain();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].1.phase, AnchorPhase::Returning);
    assert_eq!(changed[0].1.position, [30.0, 0.0]);
    assert!(!anchor(&app, entity).needs_replication);
}
