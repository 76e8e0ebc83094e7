//! Hex map geometry, terrain, and movement queries
//!
//! The map is a bounded rectangular array of flat-top hexes addressed by
//! (row, col) offset coordinates. Odd columns sit half a hex lower than even
//! ones, so the six neighbor offsets depend on column parity.

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::side::Side;
use crate::unit::UnitId;

/// Default map dimensions
pub const MAP_ROWS: i16 = 12;
pub const MAP_COLS: i16 = 16;

/// Movement cost of water; no ground unit carries this many points
pub const IMPASSABLE_COST: u32 = 999;

/// Terrain kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Clear,
    City,
    Forest,
    Mountain,
    Water,
    Road,
}

impl Terrain {
    /// Movement points spent to enter a hex of this terrain
    pub fn movement_cost(self) -> u32 {
        match self {
            Terrain::Clear | Terrain::City | Terrain::Road => 1,
            Terrain::Forest => 2,
            Terrain::Mountain => 3,
            Terrain::Water => IMPASSABLE_COST,
        }
    }

    /// Defense bonus (percent) granted to a defender standing here
    pub fn defense_bonus(self) -> u32 {
        match self {
            Terrain::Clear | Terrain::Water | Terrain::Road => 0,
            Terrain::City => 30,
            Terrain::Forest => 20,
            Terrain::Mountain => 40,
        }
    }

    pub fn is_passable(self) -> bool {
        self != Terrain::Water
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Clear => "Clear",
            Terrain::City => "City",
            Terrain::Forest => "Forest",
            Terrain::Mountain => "Mountain",
            Terrain::Water => "Water",
            Terrain::Road => "Road",
        }
    }
}

/// Offset coordinates of a hex: (row, col) into the rectangular array
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: i16,
    pub col: i16,
}

impl Coord {
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Manhattan distance over (row, col). An approximation of true hex
    /// distance, used consistently for ranging everywhere in the engine.
    pub fn distance_to(self, other: Coord) -> u32 {
        (self.row - other.row).unsigned_abs() as u32
            + (self.col - other.col).unsigned_abs() as u32
    }

    /// The six neighbor candidates in fixed order N, NE, SE, S, SW, NW.
    /// Candidates may fall outside the map; `Map::neighbors` clips them.
    pub fn neighbor_candidates(self) -> [Coord; 6] {
        let Coord { row: r, col: c } = self;
        if c % 2 == 0 {
            [
                Coord::new(r - 1, c),
                Coord::new(r, c + 1),
                Coord::new(r + 1, c + 1),
                Coord::new(r + 1, c),
                Coord::new(r + 1, c - 1),
                Coord::new(r, c - 1),
            ]
        } else {
            [
                Coord::new(r - 1, c),
                Coord::new(r - 1, c + 1),
                Coord::new(r, c + 1),
                Coord::new(r + 1, c),
                Coord::new(r, c - 1),
                Coord::new(r - 1, c - 1),
            ]
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One cell of the map
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub terrain: Terrain,
    /// Occupying unit, if any. The unit's own position must point back here.
    pub occupant: Option<UnitId>,
    pub is_objective: bool,
    /// Side controlling this hex (objectives change hands by occupation)
    pub owner: Option<Side>,
}

impl Tile {
    fn new(coord: Coord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            occupant: None,
            is_objective: false,
            owner: None,
        }
    }
}

/// The battle map: a row-major grid of tiles
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    rows: i16,
    cols: i16,
    tiles: Vec<Tile>,
}

impl Map {
    /// Uniform-terrain map, for tests and hand-built scenarios
    pub fn filled(rows: i16, cols: i16, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                tiles.push(Tile::new(Coord::new(row, col), terrain));
            }
        }
        Self { rows, cols, tiles }
    }

    /// Generate a random tactical map: weighted terrain, three objective
    /// cities, and a road running along the middle row.
    pub fn generate<R: Rng>(rows: i16, cols: i16, rng: &mut R) -> Self {
        let mut map = Self::filled(rows, cols, Terrain::Clear);
        for tile in &mut map.tiles {
            let roll: f64 = rng.gen();
            tile.terrain = if roll < 0.5 {
                Terrain::Clear
            } else if roll < 0.65 {
                Terrain::Forest
            } else if roll < 0.75 {
                Terrain::Mountain
            } else if roll < 0.8 {
                Terrain::City
            } else {
                Terrain::Clear
            };
        }
        map.place_objectives();
        map.add_roads();
        map
    }

    fn place_objectives(&mut self) {
        let spots = [
            Coord::new(self.rows / 3, self.cols / 4),
            Coord::new(self.rows / 3, 3 * self.cols / 4),
            Coord::new(2 * self.rows / 3, self.cols / 2),
        ];
        for coord in spots {
            if let Some(tile) = self.tile_mut(coord) {
                tile.terrain = Terrain::City;
                tile.is_objective = true;
            }
        }
    }

    fn add_roads(&mut self) {
        let road_row = self.rows / 2;
        for col in 0..self.cols {
            let tile = self
                .tile_mut(Coord::new(road_row, col))
                .expect("road row is inside the map");
            if tile.terrain == Terrain::Clear {
                tile.terrain = Terrain::Road;
            }
        }
    }

    pub fn rows(&self) -> i16 {
        self.rows
    }

    pub fn cols(&self) -> i16 {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row >= 0 && coord.row < self.rows && coord.col >= 0 && coord.col < self.cols
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.row as usize * self.cols as usize + coord.col as usize)
        } else {
            None
        }
    }

    /// Tile at the given coordinates, or None outside the map
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).map(move |i| &mut self.tiles[i])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// In-bounds neighbors of a hex, up to six. Out-of-bounds candidates are
    /// dropped silently.
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        coord
            .neighbor_candidates()
            .into_iter()
            .filter(|&c| self.in_bounds(c))
            .collect()
    }

    /// Manhattan distance between two hexes
    pub fn distance(&self, a: Coord, b: Coord) -> u32 {
        a.distance_to(b)
    }

    /// All hexes reachable from `from` within `budget` movement points,
    /// mapped to their cumulative entry cost.
    ///
    /// Cost-bounded breadth-first relaxation over a FIFO frontier: the first
    /// assignment of a cost wins unless a strictly cheaper one is found later.
    /// Occupied and impassable hexes are never entered. The start hex itself
    /// is always present at cost 0, occupied or not.
    pub fn reachable(&self, from: Coord, budget: u32) -> FxHashMap<Coord, u32> {
        let mut visited = FxHashMap::default();
        if !self.in_bounds(from) {
            return visited;
        }
        visited.insert(from, 0u32);
        let mut frontier = VecDeque::new();
        frontier.push_back((from, 0u32));

        while let Some((current, cost)) = frontier.pop_front() {
            for next in self.neighbors(current) {
                let tile = self.tile(next).expect("neighbors are in bounds");
                let new_cost = cost + tile.terrain.movement_cost();
                if new_cost > budget || !tile.terrain.is_passable() || tile.occupant.is_some()
                {
                    continue;
                }
                match visited.get(&next) {
                    Some(&seen) if seen <= new_cost => {}
                    _ => {
                        visited.insert(next, new_cost);
                        frontier.push_back((next, new_cost));
                    }
                }
            }
        }

        visited
    }

    /// Cheapest path from `from` to `to` within `budget` movement points,
    /// both endpoints included, or None if no such path exists.
    ///
    /// Informed search ordered by cost-so-far plus Manhattan distance to the
    /// goal. The frontier is re-sorted before every expansion; the sort is
    /// stable, so equal priorities pop in insertion order.
    pub fn find_path(&self, from: Coord, to: Coord, budget: u32) -> Option<Vec<Coord>> {
        let goal = self.tile(to)?;
        if !goal.terrain.is_passable() {
            return None;
        }
        self.tile(from)?;

        // (priority, hex, path, cost)
        let mut frontier: Vec<(u32, Coord, Vec<Coord>, u32)> =
            vec![(0, from, vec![from], 0)];
        let mut visited = FxHashMap::default();
        visited.insert(from, 0u32);

        while !frontier.is_empty() {
            frontier.sort_by_key(|entry| entry.0);
            let (_, current, path, cost) = frontier.remove(0);

            if current == to {
                return Some(path);
            }

            for next in self.neighbors(current) {
                let tile = self.tile(next).expect("neighbors are in bounds");
                let new_cost = cost + tile.terrain.movement_cost();
                if new_cost > budget || !tile.terrain.is_passable() || tile.occupant.is_some()
                {
                    continue;
                }
                match visited.get(&next) {
                    Some(&seen) if seen <= new_cost => continue,
                    _ => {}
                }
                visited.insert(next, new_cost);
                let priority = new_cost + next.distance_to(to);
                let mut new_path = path.clone();
                new_path.push(next);
                frontier.push((priority, next, new_path, new_cost));
            }
        }

        None
    }

    pub fn objectives(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.is_objective)
    }

    /// Number of objective hexes controlled by `side`
    pub fn objective_count(&self, side: Side) -> usize {
        self.objectives()
            .filter(|t| t.owner == Some(side))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat(rows: i16, cols: i16) -> Map {
        Map::filled(rows, cols, Terrain::Clear)
    }

    #[test]
    fn test_even_column_neighbors() {
        let map = flat(8, 8);
        let n = map.neighbors(Coord::new(3, 2));
        assert_eq!(
            n,
            vec![
                Coord::new(2, 2),
                Coord::new(3, 3),
                Coord::new(4, 3),
                Coord::new(4, 2),
                Coord::new(4, 1),
                Coord::new(3, 1),
            ]
        );
    }

    #[test]
    fn test_odd_column_neighbors() {
        let map = flat(8, 8);
        let n = map.neighbors(Coord::new(3, 3));
        assert_eq!(
            n,
            vec![
                Coord::new(2, 3),
                Coord::new(2, 4),
                Coord::new(3, 4),
                Coord::new(4, 3),
                Coord::new(3, 2),
                Coord::new(2, 2),
            ]
        );
    }

    #[test]
    fn test_neighbors_clipped_at_edges() {
        let map = flat(8, 8);
        // corner keeps only the in-bounds candidates
        assert_eq!(map.neighbors(Coord::new(0, 0)).len(), 3);
        for coord in map.tiles().map(|t| t.coord) {
            let n = map.neighbors(coord);
            assert!(n.len() <= 6);
            assert!(n.iter().all(|&c| map.in_bounds(c)));
        }
    }

    #[test]
    fn test_distance_is_manhattan() {
        let map = flat(8, 8);
        assert_eq!(map.distance(Coord::new(0, 0), Coord::new(0, 0)), 0);
        assert_eq!(map.distance(Coord::new(1, 1), Coord::new(3, 4)), 5);
        // the southeast neighbor of an even column is 2 away by this metric
        assert_eq!(map.distance(Coord::new(3, 2), Coord::new(4, 3)), 2);
    }

    #[test]
    fn test_reachable_includes_start_at_zero() {
        let mut map = flat(8, 8);
        let start = Coord::new(3, 3);
        // the mover's own hex counts even while occupied
        map.tile_mut(start).unwrap().occupant = Some(UnitId(7));
        let reach = map.reachable(start, 3);
        assert_eq!(reach.get(&start), Some(&0));
    }

    #[test]
    fn test_reachable_respects_budget() {
        let map = flat(8, 8);
        let reach = map.reachable(Coord::new(3, 3), 2);
        assert!(reach.values().all(|&cost| cost <= 2));
        // budget 1 on clear terrain reaches exactly the six neighbors
        let one = map.reachable(Coord::new(3, 3), 1);
        assert_eq!(one.len(), 7);
    }

    #[test]
    fn test_reachable_skips_occupied_and_water() {
        let mut map = flat(8, 8);
        let blocked = Coord::new(2, 3);
        let wet = Coord::new(3, 4);
        map.tile_mut(blocked).unwrap().occupant = Some(UnitId(1));
        map.tile_mut(wet).unwrap().terrain = Terrain::Water;
        let reach = map.reachable(Coord::new(3, 3), 4);
        assert!(!reach.contains_key(&blocked));
        assert!(!reach.contains_key(&wet));
    }

    #[test]
    fn test_reachable_terrain_costs() {
        let mut map = flat(8, 8);
        map.tile_mut(Coord::new(2, 3)).unwrap().terrain = Terrain::Forest;
        map.tile_mut(Coord::new(4, 3)).unwrap().terrain = Terrain::Mountain;
        let reach = map.reachable(Coord::new(3, 3), 3);
        assert_eq!(reach.get(&Coord::new(2, 3)), Some(&2));
        assert_eq!(reach.get(&Coord::new(4, 3)), Some(&3));
        assert_eq!(reach.get(&Coord::new(3, 4)), Some(&1));
    }

    #[test]
    fn test_reachable_out_of_bounds_start() {
        let map = flat(4, 4);
        assert!(map.reachable(Coord::new(-1, 0), 5).is_empty());
    }

    #[test]
    fn test_find_path_endpoints_and_budget() {
        let map = flat(8, 8);
        let from = Coord::new(3, 1);
        let to = Coord::new(3, 5);
        let path = map.find_path(from, to, 6).expect("path on open ground");
        assert_eq!(*path.first().unwrap(), from);
        assert_eq!(*path.last().unwrap(), to);
        let cost: u32 = path[1..]
            .iter()
            .map(|&c| map.tile(c).unwrap().terrain.movement_cost())
            .sum();
        assert!(cost <= 6);
    }

    #[test]
    fn test_find_path_to_impassable_is_none() {
        let mut map = flat(8, 8);
        let wet = Coord::new(3, 4);
        map.tile_mut(wet).unwrap().terrain = Terrain::Water;
        assert!(map.find_path(Coord::new(3, 3), wet, 10).is_none());
    }

    #[test]
    fn test_find_path_beyond_budget_is_none() {
        let map = flat(8, 8);
        assert!(map.find_path(Coord::new(3, 0), Coord::new(3, 7), 2).is_none());
    }

    #[test]
    fn test_find_path_detours_around_units() {
        let mut map = flat(8, 8);
        let from = Coord::new(3, 2);
        let to = Coord::new(3, 4);
        map.tile_mut(Coord::new(3, 3)).unwrap().occupant = Some(UnitId(9));
        let path = map.find_path(from, to, 6).expect("detour exists");
        assert!(!path.contains(&Coord::new(3, 3)));
        assert_eq!(*path.last().unwrap(), to);
    }

    #[test]
    fn test_find_path_trivial() {
        let map = flat(8, 8);
        let here = Coord::new(2, 2);
        assert_eq!(map.find_path(here, here, 0), Some(vec![here]));
    }

    #[test]
    fn test_generate_map_layout() {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let map = Map::generate(MAP_ROWS, MAP_COLS, &mut rng);
        assert_eq!(map.rows(), 12);
        assert_eq!(map.cols(), 16);
        let objectives: Vec<_> = map.objectives().collect();
        assert_eq!(objectives.len(), 3);
        assert!(objectives
            .iter()
            .all(|t| t.terrain == Terrain::City && t.owner.is_none()));
        // generation itself never rolls water
        assert!(map.tiles().all(|t| t.terrain != Terrain::Water));
        // the road row carries at least one road tile for any seed that
        // rolled a clear hex there
        let road_row = map.rows() / 2;
        assert!((0..map.cols())
            .any(|c| map.tile(Coord::new(road_row, c)).unwrap().terrain == Terrain::Road));
    }

    #[test]
    fn test_objective_count_by_side() {
        let mut map = flat(6, 6);
        for (coord, owner) in [
            (Coord::new(1, 1), Some(Side::Axis)),
            (Coord::new(2, 2), Some(Side::Axis)),
            (Coord::new(3, 3), Some(Side::Allies)),
            (Coord::new(4, 4), None),
        ] {
            let tile = map.tile_mut(coord).unwrap();
            tile.is_objective = true;
            tile.owner = owner;
        }
        assert_eq!(map.objective_count(Side::Axis), 2);
        assert_eq!(map.objective_count(Side::Allies), 1);
    }
}
