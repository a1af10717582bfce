//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: Guardian, Health, Aim, hostiles (Hostile, HostileProjectile, HitRadius)
//! - input: фронты кнопок за тик (InputEdges)
//!
//! Компоненты самого молота (AnchorInstance, GuardianLedger) живут в `crate::hammer`.

pub mod actor;
pub mod input;

// Re-exports для удобного импорта
pub use actor::*;
pub use input::*;
