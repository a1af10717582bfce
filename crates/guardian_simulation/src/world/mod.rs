//! World collaborators: target overlap and tile collision queries.
//!
//! The state machine never talks to physics directly. It asks these two
//! traits, and "nothing there" is always a valid answer.

use bevy::prelude::*;

/// What kind of hostile an overlap found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Actor,
    Projectile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub target: Entity,
    pub kind: TargetKind,
}

/// Circular query region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: Vec2,
    pub radius: f32,
}

impl Region {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Hostiles overlapping a region this tick.
pub trait OverlapQuery {
    fn overlapping(&self, region: Region) -> Vec<Overlap>;
}

/// Tile contact along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHit {
    pub point: Vec2,
    /// Unit normal of the surface that was hit
    pub normal: Vec2,
}

pub trait TileQuery {
    /// First contact on the segment `from → to`, if any.
    fn cast(&self, from: Vec2, to: Vec2) -> Option<TileHit>;
}

/// Empty world: no hostiles, no tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenWorld;

impl OverlapQuery for OpenWorld {
    fn overlapping(&self, _region: Region) -> Vec<Overlap> {
        Vec::new()
    }
}

impl TileQuery for OpenWorld {
    fn cast(&self, _from: Vec2, _to: Vec2) -> Option<TileHit> {
        None
    }
}

/// Solid axis-aligned tiles (resource).
#[derive(Resource, Debug, Clone, Default)]
pub struct TileWorld {
    solids: Vec<Rect>,
}

impl TileWorld {
    pub fn new(solids: Vec<Rect>) -> Self {
        Self { solids }
    }

    pub fn add_solid(&mut self, rect: Rect) {
        self.solids.push(rect);
    }

    pub fn solids(&self) -> &[Rect] {
        &self.solids
    }
}

impl TileQuery for TileWorld {
    fn cast(&self, from: Vec2, to: Vec2) -> Option<TileHit> {
        self.solids
            .iter()
            .filter_map(|rect| cast_rect(*rect, from, to))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, hit)| hit)
    }
}

/// Slab test of a segment against one rectangle.
///
/// Segments starting inside (or leaving) the rectangle do not count as contact.
fn cast_rect(rect: Rect, from: Vec2, to: Vec2) -> Option<(f32, TileHit)> {
    let delta = to - from;
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (origin, step, min, max) = if axis == 0 {
            (from.x, delta.x, rect.min.x, rect.max.x)
        } else {
            (from.y, delta.y, rect.min.y, rect.max.y)
        };

        if step.abs() < f32::EPSILON {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let t_min = (min - origin) / step;
        let t_max = (max - origin) / step;
        let (near, far) = if t_min < t_max { (t_min, t_max) } else { (t_max, t_min) };

        if near > t_enter {
            t_enter = near;
            let away = -step.signum();
            normal = if axis == 0 { Vec2::new(away, 0.0) } else { Vec2::new(0.0, away) };
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || !(0.0..=1.0).contains(&t_enter) {
        return None;
    }

    Some((
        t_enter,
        TileHit {
            point: from + delta * t_enter,
            normal,
        },
    ))
}

/// One hostile as seen by [`OverlapSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub kind: TargetKind,
    pub position: Vec2,
    pub radius: f32,
}

/// Per-tick list of live hostiles, circle-vs-circle overlap.
///
/// Результаты отсортированы по Entity index (детерминизм).
#[derive(Debug, Clone, Default)]
pub struct OverlapSnapshot {
    candidates: Vec<Candidate>,
}

impl OverlapSnapshot {
    pub fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by_key(|candidate| candidate.entity.index());
        Self { candidates }
    }

    pub fn push(&mut self, candidate: Candidate) {
        let at = self
            .candidates
            .partition_point(|existing| existing.entity.index() <= candidate.entity.index());
        self.candidates.insert(at, candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl OverlapQuery for OverlapSnapshot {
    fn overlapping(&self, region: Region) -> Vec<Overlap> {
        self.candidates
            .iter()
            .filter(|candidate| {
                let reach = region.radius + candidate.radius;
                candidate.position.distance_squared(region.center) <= reach * reach
            })
            .map(|candidate| Overlap {
                target: candidate.entity,
                kind: candidate.kind,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> TileWorld {
        // Вертикальная стена x ∈ [100, 116]
        TileWorld::new(vec![Rect::new(100.0, -200.0, 116.0, 200.0)])
    }

    #[test]
    fn test_cast_hits_wall_face() {
        let hit = wall().cast(Vec2::new(90.0, 0.0), Vec2::new(110.0, 0.0)).unwrap();
        assert_eq!(hit.point, Vec2::new(100.0, 0.0));
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_cast_misses() {
        let world = wall();
        // Не долетает
        assert!(world.cast(Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0)).is_none());
        // Параллельно стене
        assert!(world.cast(Vec2::new(50.0, 0.0), Vec2::new(50.0, 100.0)).is_none());
        // Отлетает от поверхности
        assert!(world.cast(Vec2::new(100.0, 0.0), Vec2::new(80.0, 0.0)).is_none());
    }

    #[test]
    fn test_cast_picks_nearest_tile() {
        let mut world = wall();
        world.add_solid(Rect::new(40.0, -10.0, 60.0, 10.0));

        let hit = world.cast(Vec2::ZERO, Vec2::new(150.0, 0.0)).unwrap();
        assert!(hit.point.distance(Vec2::new(40.0, 0.0)) < 1e-3);
    }

    #[test]
    fn test_cast_floor_normal() {
        let world = TileWorld::new(vec![Rect::new(-100.0, -20.0, 100.0, 0.0)]);
        let hit = world.cast(Vec2::new(0.0, 10.0), Vec2::new(0.0, -10.0)).unwrap();
        assert_eq!(hit.normal, Vec2::new(0.0, 1.0));
        assert_eq!(hit.point, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_overlap_snapshot() {
        let near = Entity::from_raw(5);
        let far = Entity::from_raw(2);
        let bullet = Entity::from_raw(9);

        let snapshot = OverlapSnapshot::new(vec![
            Candidate { entity: near, kind: TargetKind::Actor, position: Vec2::new(30.0, 0.0), radius: 12.0 },
            Candidate { entity: far, kind: TargetKind::Actor, position: Vec2::new(300.0, 0.0), radius: 12.0 },
            Candidate { entity: bullet, kind: TargetKind::Projectile, position: Vec2::new(0.0, 10.0), radius: 4.0 },
        ]);

        let found = snapshot.overlapping(Region::circle(Vec2::ZERO, 20.0));
        assert_eq!(
            found,
            vec![
                Overlap { target: near, kind: TargetKind::Actor },
                Overlap { target: bullet, kind: TargetKind::Projectile },
            ]
        );
    }

    #[test]
    fn test_open_world_is_empty() {
        assert!(OpenWorld.overlapping(Region::circle(Vec2::ZERO, 1000.0)).is_empty());
        assert!(OpenWorld.cast(Vec2::ZERO, Vec2::splat(1000.0)).is_none());
    }
}
