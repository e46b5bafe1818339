use glam::{IVec2, Vec2};

use crate::terrain::{TerrainGrid, TileGrid};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamp a circle's centre so the circle stays inside
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let r = Vec2::splat(radius);
        let lo = self.min + r;
        let hi = (self.max - r).max(lo);
        center.clamp(lo, hi)
    }
}

/// One loaded map: play area, the two tile layers, and placement anchors
pub struct Arena {
    /// Visible bounds; projectiles leaving them are recycled
    pub bounds: Aabb,
    pub destructible: Box<dyn TerrainGrid>,
    pub indestructible: Box<dyn TerrainGrid>,
    pub spawn_points: Vec<Vec2>,
    pub turret_mounts: Vec<Vec2>,
}

impl Arena {
    /// Arena with no terrain at all
    pub fn open(bounds: Aabb) -> Self {
        let c = bounds.center();
        let h = (bounds.max - bounds.min) * 0.35;
        Self {
            bounds,
            destructible: Box::new(TileGrid::new(1.0, Vec2::ZERO)),
            indestructible: Box::new(TileGrid::new(1.0, Vec2::ZERO)),
            spawn_points: vec![
                c + Vec2::new(-h.x, -h.y),
                c + Vec2::new(h.x, -h.y),
                c + Vec2::new(h.x, h.y),
                c + Vec2::new(-h.x, h.y),
            ],
            turret_mounts: Vec::new(),
        }
    }

    /// Create a simple test arena
    pub fn test_arena() -> Self {
        let half = 10;
        let bounds = Aabb::new(
            Vec2::splat(-(half as f32)),
            Vec2::splat(half as f32),
        );

        // Outer walls
        let mut walls = TileGrid::new(1.0, Vec2::ZERO);
        for i in -half..half {
            walls.set_tile(IVec2::new(i, -half));
            walls.set_tile(IVec2::new(i, half - 1));
            walls.set_tile(IVec2::new(-half, i));
            walls.set_tile(IVec2::new(half - 1, i));
        }

        // Breakable cross in the middle plus two side blocks
        let mut blocks = TileGrid::new(1.0, Vec2::ZERO);
        for i in -2..2 {
            blocks.set_tile(IVec2::new(i, 0));
            blocks.set_tile(IVec2::new(-1, i));
        }
        for y in -1..1 {
            for x in 0..2 {
                blocks.set_tile(IVec2::new(x - 6, y));
                blocks.set_tile(IVec2::new(x + 4, y));
            }
        }

        let mut arena = Self::open(bounds);
        arena.destructible = Box::new(blocks);
        arena.indestructible = Box::new(walls);
        arena.spawn_points = vec![
            Vec2::new(-7.0, -7.0),
            Vec2::new(7.0, -7.0),
            Vec2::new(7.0, 7.0),
            Vec2::new(-7.0, 7.0),
        ];
        arena.turret_mounts = vec![Vec2::new(0.0, -6.0), Vec2::new(0.0, 6.0)];
        arena
    }

    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    /// True if either tile layer is present at `pos`
    pub fn is_blocked(&self, pos: Vec2) -> bool {
        self.destructible.has_tile_at(pos) || self.indestructible.has_tile_at(pos)
    }
}
