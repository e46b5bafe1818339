use std::collections::HashSet;

use glam::{IVec2, Vec2};

use crate::params::Params;

/// Tile grid backed by the host's tilemap
pub trait TerrainGrid {
    fn world_to_cell(&self, pos: Vec2) -> IVec2;
    fn has_tile(&self, cell: IVec2) -> bool;
    /// Returns whether a tile was actually removed
    fn clear_tile(&mut self, cell: IVec2) -> bool;

    fn has_tile_at(&self, pos: Vec2) -> bool {
        self.has_tile(self.world_to_cell(pos))
    }

    /// Any tile in the cells covered by the square `pos ± half_extent`
    fn overlaps(&self, pos: Vec2, half_extent: f32) -> bool {
        cells_in_box(self, pos, half_extent).any(|cell| self.has_tile(cell))
    }
}

fn cells_in_box<G: TerrainGrid + ?Sized>(
    grid: &G,
    pos: Vec2,
    half_extent: f32,
) -> impl Iterator<Item = IVec2> {
    let h = Vec2::splat(half_extent.max(0.0));
    let min = grid.world_to_cell(pos - h);
    let max = grid.world_to_cell(pos + h);
    (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
}

/// Square tiles stored as a set of occupied cells
#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: HashSet<IVec2>,
    cell_size: f32,
    origin: Vec2,
}

impl TileGrid {
    pub fn new(cell_size: f32, origin: Vec2) -> Self {
        Self {
            tiles: HashSet::new(),
            cell_size,
            origin,
        }
    }

    pub fn with_tiles(
        cell_size: f32,
        origin: Vec2,
        tiles: impl IntoIterator<Item = IVec2>,
    ) -> Self {
        let mut grid = Self::new(cell_size, origin);
        grid.tiles.extend(tiles);
        grid
    }

    pub fn set_tile(&mut self, cell: IVec2) {
        self.tiles.insert(cell);
    }

    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        self.origin + (cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TerrainGrid for TileGrid {
    fn world_to_cell(&self, pos: Vec2) -> IVec2 {
        ((pos - self.origin) / self.cell_size).floor().as_ivec2()
    }

    fn has_tile(&self, cell: IVec2) -> bool {
        self.tiles.contains(&cell)
    }

    fn clear_tile(&mut self, cell: IVec2) -> bool {
        self.tiles.remove(&cell)
    }
}

/// Offset pattern used before falling back to a box scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSearch {
    /// Centre plus the four axis offsets
    Cardinal,
    /// Centre plus all eight offsets
    Compass,
    /// The 3x3 block of cells around the centre cell
    Neighborhood,
}

const CARDINAL: [Vec2; 4] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
];

const DIAGONAL: [Vec2; 4] = [
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, -1.0),
];

fn try_clear(grid: &mut dyn TerrainGrid, cell: IVec2) -> Option<IVec2> {
    (grid.has_tile(cell) && grid.clear_tile(cell)).then_some(cell)
}

/// Clear one tile near `pos`. Tries the exact cell, then the search pattern, then every cell
/// touched by the box `pos ± half_extent`. Returns the cleared cell, if any.
pub fn clear_tile_near(
    grid: &mut dyn TerrainGrid,
    pos: Vec2,
    search: TileSearch,
    half_extent: f32,
) -> Option<IVec2> {
    let centre = grid.world_to_cell(pos);
    if let Some(cell) = try_clear(grid, centre) {
        return Some(cell);
    }

    let offset = Params::TILE_SEARCH_OFFSET;
    match search {
        TileSearch::Cardinal | TileSearch::Compass => {
            let diagonals: &[Vec2] = if search == TileSearch::Compass {
                &DIAGONAL
            } else {
                &[]
            };
            for dir in CARDINAL.iter().chain(diagonals) {
                let cell = grid.world_to_cell(pos + *dir * offset);
                if let Some(cell) = try_clear(grid, cell) {
                    return Some(cell);
                }
            }
        }
        TileSearch::Neighborhood => {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if let Some(cell) = try_clear(grid, centre + IVec2::new(dx, dy)) {
                        return Some(cell);
                    }
                }
            }
        }
    }

    let candidates: Vec<IVec2> = cells_in_box(&*grid, pos, half_extent).collect();
    candidates.into_iter().find_map(|cell| try_clear(grid, cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(tiles: &[(i32, i32)]) -> TileGrid {
        TileGrid::with_tiles(
            1.0,
            Vec2::ZERO,
            tiles.iter().map(|&(x, y)| IVec2::new(x, y)),
        )
    }

    #[test]
    fn test_world_to_cell_floors() {
        let g = TileGrid::new(0.5, Vec2::new(-1.0, -1.0));
        assert_eq!(g.world_to_cell(Vec2::new(-1.0, -1.0)), IVec2::ZERO);
        assert_eq!(g.world_to_cell(Vec2::new(-0.4, -1.1)), IVec2::new(1, -1));
        assert!((g.cell_center(IVec2::ZERO) - Vec2::new(-0.75, -0.75)).length() < 1e-6);
    }

    #[test]
    fn test_exact_cell_first() {
        let mut g = grid(&[(0, 0), (1, 0)]);
        let cleared = clear_tile_near(&mut g, Vec2::new(0.5, 0.5), TileSearch::Compass, 0.1);
        assert_eq!(cleared, Some(IVec2::ZERO));
        assert!(g.has_tile(IVec2::new(1, 0)), "Only one tile is cleared");
    }

    #[test]
    fn test_offset_search_finds_adjacent_tile() {
        let mut g = grid(&[(1, 0)]);
        let cleared = clear_tile_near(&mut g, Vec2::new(0.9, 0.5), TileSearch::Cardinal, 0.0);
        assert_eq!(cleared, Some(IVec2::new(1, 0)));
    }

    #[test]
    fn test_cardinal_skips_diagonal_but_compass_hits() {
        // Tile up-right of the hit; only a diagonal offset (or the box scan) reaches it
        let pos = Vec2::new(0.9, 0.9);
        let mut g = grid(&[(1, 1)]);
        assert_eq!(
            clear_tile_near(&mut g, pos, TileSearch::Cardinal, 0.0),
            None
        );
        assert_eq!(
            clear_tile_near(&mut g, pos, TileSearch::Compass, 0.0),
            Some(IVec2::new(1, 1))
        );
    }

    #[test]
    fn test_neighborhood_covers_adjacent_cells() {
        let mut g = grid(&[(-1, -1)]);
        let cleared =
            clear_tile_near(&mut g, Vec2::new(0.5, 0.5), TileSearch::Neighborhood, 0.0);
        assert_eq!(cleared, Some(IVec2::new(-1, -1)));
    }

    #[test]
    fn test_box_scan_fallback() {
        let mut g = grid(&[(3, 0)]);
        // Too far for the offsets, inside the box
        let cleared = clear_tile_near(&mut g, Vec2::new(2.5, 0.5), TileSearch::Cardinal, 0.6);
        assert_eq!(cleared, Some(IVec2::new(3, 0)));
        assert!(g.is_empty());
    }

    #[test]
    fn test_nothing_nearby() {
        let mut g = grid(&[(10, 10)]);
        assert_eq!(
            clear_tile_near(&mut g, Vec2::ZERO, TileSearch::Compass, 0.2),
            None
        );
        assert_eq!(g.len(), 1);
    }
}
