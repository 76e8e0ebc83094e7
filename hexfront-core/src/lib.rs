//! Hexfront Core - Turn-based tactical wargame engine
//!
//! This crate provides the simulation core for Hexfront:
//! - Hex map geometry (flat-top hexes on a rectangular offset grid)
//! - Terrain, movement costs, and defense bonuses
//! - Reachability and path search under a movement budget
//! - Units, the equipment catalog, and combat resolution
//! - Match flow: turns, command validation, and victory conditions
//! - Scenario configuration and deployment
//!
//! Rendering, input handling, and the opponent policy live outside this crate
//! and drive it through the query and command surface of [`game::Game`].

pub mod equipment;
pub mod game;
pub mod map;
pub mod scenario;
pub mod side;
pub mod unit;

// Re-exports for convenient access
pub use equipment::{
    equipment_id_to_index, get_equipment, Equipment, EquipmentId, UnitClass, UnitKind, EQUIPMENT,
};
pub use game::{
    CombatReport, Game, GameResult, MoveReport, Player, PlayerKind, Rejection, TurnOutcome,
    Victory, VictoryKind, DEFAULT_MAX_TURNS,
};
pub use map::{Coord, Map, Terrain, Tile, MAP_COLS, MAP_ROWS};
pub use scenario::{Deployment, Scenario};
pub use side::Side;
pub use unit::{exchange_losses, Unit, UnitId, MAX_STRENGTH};
