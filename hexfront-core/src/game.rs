//! Match state: turn sequencing, command validation, and victory conditions

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::equipment::{EquipmentId, UnitClass};
use crate::map::{Coord, Map};
use crate::side::Side;
use crate::unit::{Unit, UnitId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Starting prestige balance per player
const START_PRESTIGE: u32 = 500;

/// Default turn limit
pub const DEFAULT_MAX_TURNS: u32 = 20;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Whether a player is driven by the UI or by a computer policy.
/// Carried configuration; no core rule consults it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Computer,
}

/// One player: a side, its roster, and its prestige balance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,
    pub kind: PlayerKind,
    pub prestige: u32,
    units: Vec<UnitId>,
}

impl Player {
    fn new(side: Side, kind: PlayerKind) -> Self {
        Self {
            side,
            kind,
            prestige: START_PRESTIGE,
            units: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.side.name()
    }

    pub fn color(&self) -> (u8, u8, u8) {
        self.side.color()
    }

    /// Active roster in deployment order
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    fn add_unit(&mut self, id: UnitId) {
        self.units.push(id);
    }

    fn remove_unit(&mut self, id: UnitId) {
        self.units.retain(|&u| u != id);
    }
}

/// How a match was won
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryKind {
    /// Every enemy unit destroyed
    Elimination,
    /// More objectives held when the turn limit ran out
    Objectives,
}

/// A decided match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub winner: Side,
    pub by: VictoryKind,
}

impl fmt::Display for Victory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.by {
            VictoryKind::Elimination => {
                write!(f, "Game over! {} wins: every enemy unit destroyed", self.winner)
            }
            VictoryKind::Objectives => {
                write!(f, "Game over! {} wins on objectives held at the turn limit", self.winner)
            }
        }
    }
}

/// Match result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Won(Victory),
}

/// What ending a turn produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Play passes to this side
    NextSide(Side),
    /// A termination condition fired (now or on an earlier turn)
    Finished(Victory),
}

impl TurnOutcome {
    /// The game-over message, if the match is decided
    pub fn game_over_message(&self) -> Option<String> {
        match self {
            TurnOutcome::NextSide(_) => None,
            TurnOutcome::Finished(victory) => Some(victory.to_string()),
        }
    }
}

/// Why a command was refused. Expected domain outcomes, not faults.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the battle is already decided")]
    GameOver,
    #[error("no such unit")]
    UnknownUnit,
    #[error("no such tile")]
    UnknownTile,
    #[error("unit is not on the map")]
    NotDeployed,
    #[error("unit has already moved this turn")]
    AlreadyMoved,
    #[error("unit has no movement points left")]
    NoMovementPoints,
    #[error("unit is out of fuel")]
    OutOfFuel,
    #[error("target tile is impassable")]
    TargetImpassable,
    #[error("target tile is occupied")]
    TargetOccupied,
    #[error("target tile is beyond the unit's reach")]
    OutOfReach,
    #[error("no route leads to the target tile")]
    NoRoute,
    #[error("unit has already fired this turn")]
    AlreadyFired,
    #[error("unit is out of ammunition")]
    OutOfAmmo,
    #[error("no target on that tile")]
    NoTarget,
    #[error("cannot fire on a friendly unit")]
    FriendlyTarget,
    #[error("target out of range: distance {distance} exceeds range {max_range}")]
    OutOfRange { distance: u32, max_range: u32 },
}

// ============================================================================
// COMMAND REPORTS
// ============================================================================

/// Successful move outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub unit: UnitId,
    pub name: &'static str,
    pub destination: Coord,
    pub cost: u32,
    pub captured_objective: bool,
}

impl fmt::Display for MoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moved to {} for {} movement points",
            self.name, self.destination, self.cost
        )?;
        if self.captured_objective {
            write!(f, " and captured the objective!")?;
        }
        Ok(())
    }
}

/// Successful attack outcome. Strengths and losses are captured before any
/// roster removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub attacker_name: &'static str,
    pub defender_name: &'static str,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub attacker_strength: u32,
    pub defender_strength: u32,
    pub attacker_destroyed: bool,
    pub defender_destroyed: bool,
}

impl fmt::Display for CombatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} attacks {}!", self.attacker_name, self.defender_name)?;
        if self.defender_destroyed {
            writeln!(
                f,
                "{} takes {} losses and is destroyed!",
                self.defender_name, self.defender_losses
            )?;
        } else {
            writeln!(
                f,
                "{} takes {} losses ({}/10 remaining)",
                self.defender_name, self.defender_losses, self.defender_strength
            )?;
        }
        if self.attacker_losses == 0 {
            write!(f, "{} takes no return fire", self.attacker_name)
        } else if self.attacker_destroyed {
            write!(
                f,
                "{} takes {} losses and is destroyed!",
                self.attacker_name, self.attacker_losses
            )
        } else {
            write!(
                f,
                "{} takes {} losses in return fire ({}/10 remaining)",
                self.attacker_name, self.attacker_losses, self.attacker_strength
            )
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// A running match: the map, both players, the unit arena, and turn state
#[derive(Clone, Debug)]
pub struct Game {
    map: Map,
    units: FxHashMap<UnitId, Unit>,
    players: [Player; 2],
    current_idx: usize,
    turn: u32,
    max_turns: u32,
    next_unit_id: u32,
    result: GameResult,
}

impl Game {
    pub fn new(map: Map, max_turns: u32) -> Self {
        Self {
            map,
            units: FxHashMap::default(),
            players: [
                Player::new(Side::Axis, PlayerKind::Human),
                Player::new(Side::Allies, PlayerKind::Computer),
            ],
            current_idx: 0,
            turn: 1,
            max_turns,
            next_unit_id: 0,
            result: GameResult::Ongoing,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn winner(&self) -> Option<Side> {
        match self.result {
            GameResult::Ongoing => None,
            GameResult::Won(victory) => Some(victory.winner),
        }
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side as usize]
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_idx]
    }

    pub fn current_side(&self) -> Side {
        self.current_player().side
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Unit standing on the given tile, if any
    pub fn unit_at(&self, coord: Coord) -> Option<&Unit> {
        self.map
            .tile(coord)?
            .occupant
            .and_then(|id| self.units.get(&id))
    }

    fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side as usize]
    }

    // ========================================================================
    // DEPLOYMENT
    // ========================================================================

    /// Place a new unit from the catalog. Ids are assigned monotonically in
    /// deployment order.
    pub fn deploy(
        &mut self,
        equipment: EquipmentId,
        side: Side,
        at: Coord,
    ) -> Result<UnitId, Rejection> {
        let tile = self.map.tile(at).ok_or(Rejection::UnknownTile)?;
        if !tile.terrain.is_passable() {
            return Err(Rejection::TargetImpassable);
        }
        if tile.occupant.is_some() {
            return Err(Rejection::TargetOccupied);
        }

        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let mut unit = Unit::new(id, equipment, side);
        unit.pos = Some(at);
        self.map
            .tile_mut(at)
            .expect("tile existence checked above")
            .occupant = Some(id);
        tracing::debug!(unit = id.0, name = unit.name(), side = side.name(), at = %at, "unit deployed");
        self.units.insert(id, unit);
        self.player_mut(side).add_unit(id);
        Ok(id)
    }

    // ========================================================================
    // READ QUERIES
    // ========================================================================

    /// Hexes the unit can move to this turn, with cumulative costs
    pub fn reachable_tiles(&self, unit_id: UnitId) -> FxHashMap<Coord, u32> {
        let unit = match self.units.get(&unit_id) {
            Some(u) => u,
            None => return FxHashMap::default(),
        };
        match unit.pos {
            Some(pos) => self.map.reachable(pos, unit.move_left),
            None => FxHashMap::default(),
        }
    }

    /// Hexes the unit can attack right now. Candidates come from the neighbor
    /// ring, widened to neighbors-of-neighbors for artillery, then filtered
    /// through attack validation.
    pub fn attackable_tiles(&self, unit_id: UnitId) -> Vec<Coord> {
        let unit = match self.units.get(&unit_id) {
            Some(u) => u,
            None => return Vec::new(),
        };
        let pos = match unit.pos {
            Some(p) => p,
            None => return Vec::new(),
        };

        let mut ring = self.map.neighbors(pos);
        if unit.class() == UnitClass::Artillery {
            let mut extended = Vec::new();
            for &n in &ring {
                extended.extend(self.map.neighbors(n));
            }
            ring = extended;
        }

        let mut targets: Vec<Coord> = ring
            .into_iter()
            .filter(|&c| self.validate_attack(unit_id, c).is_ok())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Four-line display summary for the info panel. Defense includes the
    /// terrain bonus of the tile the unit stands on.
    pub fn unit_summary(&self, id: UnitId) -> Option<String> {
        let unit = self.units.get(&id)?;
        let bonus = unit
            .pos
            .and_then(|c| self.map.tile(c))
            .map(|t| t.terrain.defense_bonus())
            .unwrap_or(0);
        Some(format!(
            "{} (Str: {}/10)\nFuel: {} | Ammo: {}\nAttack: {} | Defense: {}\nMoves: {}/{}",
            unit.name(),
            unit.strength,
            unit.fuel,
            unit.ammo,
            unit.current_attack(),
            unit.current_defense(bonus),
            unit.move_left,
            unit.profile().move_points,
        ))
    }

    // ========================================================================
    // COMMAND VALIDATION
    // ========================================================================

    /// Full movement legality check, with the cause of refusal
    pub fn validate_move(&self, unit_id: UnitId, dest: Coord) -> Result<(), Rejection> {
        if self.result != GameResult::Ongoing {
            return Err(Rejection::GameOver);
        }
        let unit = self.units.get(&unit_id).ok_or(Rejection::UnknownUnit)?;
        let target = self.map.tile(dest).ok_or(Rejection::UnknownTile)?;
        let from = unit.pos.ok_or(Rejection::NotDeployed)?;
        if unit.has_moved {
            return Err(Rejection::AlreadyMoved);
        }
        if unit.move_left == 0 {
            return Err(Rejection::NoMovementPoints);
        }
        if unit.fuel == 0 {
            return Err(Rejection::OutOfFuel);
        }
        if !target.terrain.is_passable() {
            return Err(Rejection::TargetImpassable);
        }
        if target.occupant.is_some() {
            return Err(Rejection::TargetOccupied);
        }
        if !self.map.reachable(from, unit.move_left).contains_key(&dest) {
            return Err(Rejection::OutOfReach);
        }
        Ok(())
    }

    pub fn can_move_to(&self, unit_id: UnitId, dest: Coord) -> bool {
        self.validate_move(unit_id, dest).is_ok()
    }

    /// Full attack legality check, with the cause of refusal
    pub fn validate_attack(&self, unit_id: UnitId, target: Coord) -> Result<(), Rejection> {
        if self.result != GameResult::Ongoing {
            return Err(Rejection::GameOver);
        }
        let unit = self.units.get(&unit_id).ok_or(Rejection::UnknownUnit)?;
        let tile = self.map.tile(target).ok_or(Rejection::UnknownTile)?;
        let from = unit.pos.ok_or(Rejection::NotDeployed)?;
        let occupant_id = tile.occupant.ok_or(Rejection::NoTarget)?;
        let defender = self
            .units
            .get(&occupant_id)
            .expect("occupant ids always resolve to live units");
        if defender.owner == unit.owner {
            return Err(Rejection::FriendlyTarget);
        }
        if unit.has_fired {
            return Err(Rejection::AlreadyFired);
        }
        if unit.ammo == 0 {
            return Err(Rejection::OutOfAmmo);
        }
        let distance = self.map.distance(from, target);
        let max_range = unit.class().attack_range();
        if distance > max_range {
            return Err(Rejection::OutOfRange { distance, max_range });
        }
        Ok(())
    }

    pub fn can_attack(&self, unit_id: UnitId, target: Coord) -> bool {
        self.validate_attack(unit_id, target).is_ok()
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Move a unit along the cheapest route to `dest`, capturing the
    /// objective there if one is held by the other side or by nobody.
    pub fn move_unit(&mut self, unit_id: UnitId, dest: Coord) -> Result<MoveReport, Rejection> {
        self.validate_move(unit_id, dest)?;

        let (from, budget, side, name) = {
            let unit = self
                .units
                .get(&unit_id)
                .expect("validated: unit exists");
            (
                unit.pos.expect("validated: unit is deployed"),
                unit.move_left,
                unit.owner,
                unit.name(),
            )
        };

        // Reachability approved the destination, but the path search is the
        // authority; a miss here is a hard failure, not a panic.
        let path = self
            .map
            .find_path(from, dest, budget)
            .ok_or(Rejection::NoRoute)?;
        let cost: u32 = path[1..]
            .iter()
            .map(|&c| {
                self.map
                    .tile(c)
                    .expect("path tiles are on the map")
                    .terrain
                    .movement_cost()
            })
            .sum();

        // Both halves of the occupancy link move together
        self.map
            .tile_mut(from)
            .expect("origin tile is on the map")
            .occupant = None;
        self.map
            .tile_mut(dest)
            .expect("validated: destination is on the map")
            .occupant = Some(unit_id);
        self.units
            .get_mut(&unit_id)
            .expect("validated: unit exists")
            .apply_move(dest, cost);

        let captured_objective = {
            let tile = self
                .map
                .tile_mut(dest)
                .expect("validated: destination is on the map");
            if tile.is_objective && tile.owner != Some(side) {
                tile.owner = Some(side);
                true
            } else {
                false
            }
        };

        tracing::debug!(
            unit = unit_id.0,
            from = %from,
            to = %dest,
            cost,
            captured_objective,
            "unit moved"
        );

        Ok(MoveReport {
            unit: unit_id,
            name,
            destination: dest,
            cost,
            captured_objective,
        })
    }

    /// Resolve an attack against the unit on `target`. Destroyed units are
    /// removed from their roster and their tile immediately; a side emptied
    /// here loses on the spot.
    pub fn attack_unit(
        &mut self,
        attacker_id: UnitId,
        target: Coord,
    ) -> Result<CombatReport, Rejection> {
        self.validate_attack(attacker_id, target)?;

        let tile = self.map.tile(target).expect("validated: target tile exists");
        let defender_id = tile.occupant.expect("validated: target is occupied");
        let terrain_bonus = tile.terrain.defense_bonus();

        // Pull the defender out of the arena for the exchange, then decide
        // whether it goes back
        let mut defender = self
            .units
            .remove(&defender_id)
            .expect("occupant ids always resolve to live units");
        let attacker = self
            .units
            .get_mut(&attacker_id)
            .expect("validated: attacker exists");

        let (attacker_losses, defender_losses) = attacker.attack(&mut defender, terrain_bonus);

        let report = CombatReport {
            attacker: attacker_id,
            defender: defender_id,
            attacker_name: attacker.name(),
            defender_name: defender.name(),
            attacker_losses,
            defender_losses,
            attacker_strength: attacker.strength,
            defender_strength: defender.strength,
            attacker_destroyed: attacker.is_destroyed(),
            defender_destroyed: defender.is_destroyed(),
        };
        let attacker_pos = attacker.pos;
        let attacker_side = attacker.owner;
        let defender_pos = defender.pos;
        let defender_side = defender.owner;

        if report.defender_destroyed {
            if let Some(pos) = defender_pos {
                self.map
                    .tile_mut(pos)
                    .expect("defender stood on the map")
                    .occupant = None;
            }
            self.player_mut(defender_side).remove_unit(defender_id);
        } else {
            self.units.insert(defender_id, defender);
        }

        if report.attacker_destroyed {
            if let Some(pos) = attacker_pos {
                self.map
                    .tile_mut(pos)
                    .expect("attacker stood on the map")
                    .occupant = None;
            }
            self.player_mut(attacker_side).remove_unit(attacker_id);
            self.units.remove(&attacker_id);
        }

        tracing::debug!(
            attacker = attacker_id.0,
            defender = defender_id.0,
            attacker_losses,
            defender_losses,
            "attack resolved"
        );

        // A side wiped out by this exchange loses immediately
        self.check_elimination();

        Ok(report)
    }

    // ========================================================================
    // TURN FLOW
    // ========================================================================

    /// End the acting player's turn: reset its roster, pass play to the other
    /// side, advance the turn counter on wraparound, and evaluate victory.
    /// On a finished match this returns the recorded outcome unchanged.
    pub fn end_turn(&mut self) -> TurnOutcome {
        if let GameResult::Won(victory) = self.result {
            return TurnOutcome::Finished(victory);
        }

        let roster: Vec<UnitId> = self.players[self.current_idx].units.clone();
        for id in roster {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.end_turn();
            }
        }

        self.current_idx = (self.current_idx + 1) % self.players.len();
        if self.current_idx == 0 {
            self.turn += 1;
        }

        self.check_game_over();

        match self.result {
            GameResult::Won(victory) => TurnOutcome::Finished(victory),
            GameResult::Ongoing => {
                let next = self.players[self.current_idx].side;
                tracing::debug!(turn = self.turn, side = next.name(), "turn passes");
                TurnOutcome::NextSide(next)
            }
        }
    }

    fn check_game_over(&mut self) {
        if self.result != GameResult::Ongoing {
            return;
        }

        if self.turn > self.max_turns {
            let axis_objectives = self.map.objective_count(Side::Axis);
            let allies_objectives = self.map.objective_count(Side::Allies);
            // an exact tie falls to the Allies
            let winner = if axis_objectives > allies_objectives {
                Side::Axis
            } else {
                Side::Allies
            };
            self.result = GameResult::Won(Victory {
                winner,
                by: VictoryKind::Objectives,
            });
            tracing::info!(
                winner = winner.name(),
                axis_objectives,
                allies_objectives,
                "turn limit reached"
            );
            return;
        }

        self.check_elimination();
    }

    fn check_elimination(&mut self) {
        if self.result != GameResult::Ongoing {
            return;
        }
        for player in &self.players {
            if player.units.is_empty() {
                let winner = player.side.opponent();
                self.result = GameResult::Won(Victory {
                    winner,
                    by: VictoryKind::Elimination,
                });
                tracing::info!(
                    winner = winner.name(),
                    eliminated = player.side.name(),
                    "side eliminated"
                );
                return;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
