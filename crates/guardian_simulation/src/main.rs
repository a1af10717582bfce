//! Headless симуляция Guardian Hammer
//!
//! Один Guardian против строя врагов и снаряда: свинг, бросок, блок, recall.
//! Input заскриптован по тикам, всё пишется в logger.

use std::sync::Arc;

use bevy::prelude::*;
use guardian_simulation::hammer::NoHooks;
use guardian_simulation::{
    create_headless_app, logger, Guardian, GuardianLedger, HammerId, HammerRegistry, Health, Hostile,
    HostileProjectile, InputEdges, InputLevels, ReplicationOutbox, WeaponDefinition,
};

const DEMO_HAMMER: HammerId = HammerId(1);

/// (тик, уровни кнопок с этого тика)
const SCRIPT: &[(u32, InputLevels)] = &[
    (0, InputLevels { primary: true, secondary: false }),
    (2, InputLevels { primary: false, secondary: false }),
    (90, InputLevels { primary: false, secondary: true }),
    (92, InputLevels { primary: false, secondary: false }),
    (120, InputLevels { primary: false, secondary: true }),
    (122, InputLevels { primary: false, secondary: false }),
];

fn levels_at(tick: u32) -> InputLevels {
    SCRIPT
        .iter()
        .rev()
        .find(|(start, _)| *start <= tick)
        .map(|(_, levels)| *levels)
        .unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed = 42;
    println!("Starting Guardian Hammer headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let world = app.world_mut();

    // Дальнобойный вариант, чтобы бросок долетел до дальних врагов
    let definition = WeaponDefinition::builder().range(20).build()?;
    world
        .resource_mut::<HammerRegistry>()
        .register(DEMO_HAMMER, "demo_hammer", definition, Arc::new(NoHooks))?;

    let guardian = world
        .spawn((
            Guardian::new(DEMO_HAMMER),
            GuardianLedger::new(3, 3).with_charge(1.0),
            Transform::default(),
        ))
        .id();

    for x in [40.0, 120.0, 200.0] {
        world.spawn((Hostile, Health::new(30), Transform::from_xyz(x, 0.0, 0.0)));
    }
    world.spawn((HostileProjectile, Transform::from_xyz(-40.0, 0.0, 0.0)));

    let mut previous = InputLevels::default();
    for tick in 0..240 {
        let current = levels_at(tick);
        if let Some(mut edges) = app.world_mut().get_mut::<InputEdges>(guardian) {
            *edges = InputEdges::from_levels(previous, current);
        }
        previous = current;

        app.world_mut().run_schedule(FixedUpdate);

        let snapshots = app.world_mut().resource_mut::<ReplicationOutbox>().drain();
        for (anchor, snapshot) in snapshots {
            logger::log(&format!("tick {}: {:?} {:?}", tick, anchor, snapshot));
        }
    }

    let mut hostiles = app.world_mut().query_filtered::<&Health, With<Hostile>>();
    let remaining: Vec<u32> = hostiles.iter(app.world()).map(|health| health.current).collect();
    println!("Simulation complete! Hostile HP: {:?}", remaining);

    Ok(())
}
