//! Guardian Hammer Simulation Core
//!
//! Детерминированная tick-based симуляция оружия Guardian Hammer на Bevy 0.16.
//!
//! Слои:
//! - `hammer`: ядро (dispatcher, anchor state machine, hit pipeline, hooks, ledger)
//!   и ECS системы, которые гоняют его в FixedUpdate
//! - `world`: overlap / tile запросы (коллизии хоста)
//! - `components`: акторы и input
//! - `config`, `logger`: ambient

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod config;
pub mod hammer;
pub mod logger;
pub mod world;

// Re-export базовых типов для удобства
pub use components::*;
pub use config::{BlockTrigger, HammerConfig};
pub use hammer::{
    AnchorDespawned, AnchorInstance, AnchorPhase, AnchorSnapshot, GuardianLedger, HammerHit, HammerId,
    HammerPlugin, HammerRegistry, ProjectileBlocked, ReplicationOutbox, ResourceLedger, ThrowStrength,
    WeaponDefinition,
};
pub use logger::{init_logger, LogLevel, LogPrinter};
pub use world::TileWorld;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .add_plugins(HammerPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности симуляции (crit rolls).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Тесты гоняют `FixedUpdate` напрямую (`app.world_mut().run_schedule(FixedUpdate)`),
/// не завися от реального времени.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .add_plugins(HammerPlugin);

    app
}

/// Snapshot компонента T по всем entity (для сравнения детерминизма)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

/// RON snapshot всех живых anchor'ов (то, что уходит в replication)
pub fn anchor_snapshot(world: &mut World) -> Result<String, ron::Error> {
    let mut query = world.query::<(Entity, &AnchorInstance)>();
    let mut anchors: Vec<(u32, AnchorSnapshot)> = query
        .iter(world)
        .map(|(entity, anchor)| (entity.index(), anchor.snapshot()))
        .collect();
    anchors.sort_by_key(|(index, _)| *index);

    ron::to_string(&anchors)
}
