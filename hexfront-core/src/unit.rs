//! Units and combat resolution

use serde::{Deserialize, Serialize};

use crate::equipment::{get_equipment, Equipment, EquipmentId, UnitClass, UnitKind};
use crate::map::Coord;
use crate::side::Side;

/// Unique unit identifier, assigned monotonically by the game at deployment
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

/// Full-health strength
pub const MAX_STRENGTH: u32 = 10;

/// Experience granted for firing, and extra for a kill
const XP_PER_ATTACK: u32 = 5;
const XP_PER_KILL: u32 = 10;

/// Ammo and fuel restored by one resupply action
const RESUPPLY_AMMO: u32 = 3;
const RESUPPLY_FUEL: u32 = 10;

/// A military unit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub equipment: EquipmentId,
    pub owner: Side,
    /// Health, 0..=10. Zero means destroyed.
    pub strength: u32,
    pub experience: u32,
    pub fuel: u32,
    pub ammo: u32,
    /// Movement points left this turn
    pub move_left: u32,
    pub has_moved: bool,
    pub has_fired: bool,
    /// Current tile; the tile's occupant must point back at this unit
    pub pos: Option<Coord>,
}

impl Unit {
    pub fn new(id: UnitId, equipment: EquipmentId, owner: Side) -> Self {
        let profile = get_equipment(equipment);
        Self {
            id,
            equipment,
            owner,
            strength: MAX_STRENGTH,
            experience: 0,
            fuel: profile.fuel,
            ammo: profile.ammo,
            move_left: profile.move_points,
            has_moved: false,
            has_fired: false,
            pos: None,
        }
    }

    pub fn profile(&self) -> &'static Equipment {
        get_equipment(self.equipment)
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn class(&self) -> UnitClass {
        self.profile().class
    }

    pub fn kind(&self) -> UnitKind {
        self.profile().kind
    }

    /// Attack value scaled by strength and experience
    pub fn current_attack(&self) -> u32 {
        scale_stat(self.profile().attack, self.strength, self.experience, 0)
    }

    /// Defense value scaled by strength, experience, and the terrain bonus of
    /// the tile the unit stands on (0 when off-map)
    pub fn current_defense(&self, terrain_bonus: u32) -> u32 {
        scale_stat(self.profile().defense, self.strength, self.experience, terrain_bonus)
    }

    pub fn can_move(&self) -> bool {
        !self.has_moved && self.move_left > 0 && self.fuel > 0
    }

    pub fn can_attack(&self) -> bool {
        !self.has_fired && self.ammo > 0 && self.strength > 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.strength == 0
    }

    /// Record a move to `dest` spending `cost` points of movement and fuel.
    /// Both halves of the tile-occupancy update are the game's job; this
    /// covers only the unit's side of the transaction.
    pub fn apply_move(&mut self, dest: Coord, cost: u32) {
        self.pos = Some(dest);
        self.fuel = self.fuel.saturating_sub(cost);
        self.move_left = self.move_left.saturating_sub(cost);
        if self.move_left == 0 {
            self.has_moved = true;
        }
    }

    /// Fire on `defender`, which defends with the given terrain bonus.
    /// Returns (attacker_losses, defender_losses).
    ///
    /// With no ammo this resolves as a (0, 0) no-op. Callers are expected to
    /// have checked `can_attack` first, so reaching the guard is a caller bug.
    pub fn attack(&mut self, defender: &mut Unit, terrain_bonus: u32) -> (u32, u32) {
        if self.ammo == 0 {
            tracing::warn!(unit = self.id.0, "attack with empty ammo resolves as a no-op");
            return (0, 0);
        }

        self.ammo -= 1;
        self.has_fired = true;

        let attacker_power = self.current_attack();
        let defender_power = defender.current_defense(terrain_bonus);
        let (attacker_losses, defender_losses) =
            exchange_losses(attacker_power, defender_power);

        defender.take_damage(defender_losses);
        self.take_damage(attacker_losses);

        self.experience += XP_PER_ATTACK;
        if defender.is_destroyed() {
            self.experience += XP_PER_KILL;
        }

        (attacker_losses, defender_losses)
    }

    /// Reduce strength, clamped at zero
    pub fn take_damage(&mut self, damage: u32) {
        self.strength = self.strength.saturating_sub(damage);
    }

    /// Partial resupply, clamped to the equipment maxima. Spends the whole
    /// turn.
    pub fn resupply(&mut self) {
        let profile = self.profile();
        self.ammo = (self.ammo + RESUPPLY_AMMO).min(profile.ammo);
        self.fuel = (self.fuel + RESUPPLY_FUEL).min(profile.fuel);
        self.has_moved = true;
        self.has_fired = true;
    }

    /// Restore strength, clamped at full health. Spends the whole turn.
    pub fn reinforce(&mut self, amount: u32) {
        self.strength = (self.strength + amount).min(MAX_STRENGTH);
        self.has_moved = true;
        self.has_fired = true;
    }

    /// Turn-boundary reset. Runs exactly once per owning side's turn.
    pub fn end_turn(&mut self) {
        self.move_left = self.profile().move_points;
        self.has_moved = false;
        self.has_fired = false;
    }
}

/// floor(base x strength/10 x (1 + experience/100) x (1 + bonus/100)),
/// computed in widened integer arithmetic so the floor is exact
fn scale_stat(base: u32, strength: u32, experience: u32, bonus: u32) -> u32 {
    let scaled = base as u64
        * strength as u64
        * (100 + experience as u64)
        * (100 + bonus as u64);
    (scaled / 100_000) as u32
}

/// Casualties for one fire exchange given effective attack and defense.
/// The defender always loses at least one point; return fire may be nil.
/// Returns (attacker_losses, defender_losses).
pub fn exchange_losses(attacker_power: u32, defender_power: u32) -> (u32, u32) {
    let ap = attacker_power as i64;
    let dp = defender_power as i64;
    let defender_losses = (ap - dp / 2).div_euclid(3).max(1);
    let attacker_losses = (dp - ap / 2).div_euclid(4).max(0);
    (attacker_losses as u32, defender_losses as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::equipment_id_to_index;

    fn unit(equipment: &str, owner: Side) -> Unit {
        Unit::new(
            UnitId(0),
            equipment_id_to_index(equipment).expect("catalog id"),
            owner,
        )
    }

    #[test]
    fn test_new_unit_is_fresh() {
        let u = unit("German_Tank", Side::Axis);
        assert_eq!(u.strength, 10);
        assert_eq!(u.experience, 0);
        assert_eq!(u.fuel, 60);
        assert_eq!(u.ammo, 8);
        assert_eq!(u.move_left, 6);
        assert!(!u.has_moved && !u.has_fired);
        assert!(u.pos.is_none());
    }

    #[test]
    fn test_stat_scaling() {
        let mut u = unit("German_Tank", Side::Axis);
        assert_eq!(u.current_attack(), 12);
        assert_eq!(u.current_defense(0), 10);
        // strength scales linearly, floored
        u.strength = 8;
        assert_eq!(u.current_defense(0), 8);
        u.strength = 10;
        // experience adds one percent per point
        u.experience = 10;
        assert_eq!(u.current_attack(), 13); // floor(12 * 1.10)
        u.experience = 5;
        assert_eq!(u.current_attack(), 12); // floor(12 * 1.05)
    }

    #[test]
    fn test_terrain_bonus_in_defense() {
        let u = unit("German_Infantry", Side::Axis);
        assert_eq!(u.current_defense(0), 8);
        assert_eq!(u.current_defense(40), 11); // floor(8 * 1.40)
        assert_eq!(u.current_defense(30), 10); // floor(8 * 1.30)
    }

    #[test]
    fn test_exchange_losses_reference_case() {
        // Panzer IV at full strength vs fresh infantry on clear ground
        let (attacker_losses, defender_losses) = exchange_losses(12, 8);
        assert_eq!(defender_losses, 2); // max(1, (12 - 4) / 3)
        assert_eq!(attacker_losses, 0); // max(0, (8 - 6) / 4)
    }

    #[test]
    fn test_exchange_losses_clamps() {
        // hopeless attack still scratches the defender
        let (a, d) = exchange_losses(1, 40);
        assert_eq!(d, 1);
        assert_eq!(a, 10); // (40 - 0) / 4
        // overwhelming attack draws no return fire
        let (a, d) = exchange_losses(40, 1);
        assert_eq!(d, 13); // (40 - 0) / 3
        assert_eq!(a, 0);
    }

    #[test]
    fn test_attack_consumes_ammo_and_grants_xp() {
        let mut attacker = unit("German_Tank", Side::Axis);
        let mut defender = unit("Allied_Infantry", Side::Allies);
        let (a, d) = attacker.attack(&mut defender, 0);
        assert_eq!((a, d), (0, 2));
        assert_eq!(defender.strength, 8);
        assert_eq!(attacker.strength, 10);
        assert_eq!(attacker.ammo, 7);
        assert!(attacker.has_fired);
        assert_eq!(attacker.experience, 5);
    }

    #[test]
    fn test_attack_kill_bonus() {
        let mut attacker = unit("German_Tank", Side::Axis);
        let mut defender = unit("Allied_Infantry", Side::Allies);
        defender.strength = 1;
        attacker.attack(&mut defender, 0);
        assert!(defender.is_destroyed());
        assert_eq!(attacker.experience, 15);
    }

    #[test]
    fn test_attack_without_ammo_is_noop() {
        let mut attacker = unit("German_Tank", Side::Axis);
        let mut defender = unit("Allied_Infantry", Side::Allies);
        attacker.ammo = 0;
        let (a, d) = attacker.attack(&mut defender, 0);
        assert_eq!((a, d), (0, 0));
        assert_eq!(defender.strength, 10);
        assert!(!attacker.has_fired);
        assert_eq!(attacker.experience, 0);
    }

    #[test]
    fn test_combat_is_deterministic() {
        for _ in 0..2 {
            let mut attacker = unit("German_Artillery", Side::Axis);
            let mut defender = unit("Allied_Tank", Side::Allies);
            // dp = floor(9 * 1.20) = 10, ap = 14
            let losses = attacker.attack(&mut defender, 20);
            assert_eq!(losses, (0, 3));
        }
    }

    #[test]
    fn test_can_move_requires_fuel() {
        let mut u = unit("German_Infantry", Side::Axis);
        assert!(u.can_move());
        u.fuel = 1;
        assert!(u.can_move()); // one drop of fuel still moves
        u.fuel = 0;
        assert!(!u.can_move()); // tank is dry even with move_left == 4
        assert_eq!(u.move_left, 4);
    }

    #[test]
    fn test_partial_movement() {
        let mut u = unit("German_Tank", Side::Axis);
        u.apply_move(Coord::new(1, 1), 2);
        assert_eq!(u.move_left, 4);
        assert_eq!(u.fuel, 58);
        assert!(!u.has_moved);
        u.apply_move(Coord::new(1, 3), 4);
        assert_eq!(u.move_left, 0);
        assert!(u.has_moved);
        assert_eq!(u.pos, Some(Coord::new(1, 3)));
    }

    #[test]
    fn test_move_deductions_never_go_negative() {
        let mut u = unit("German_Infantry", Side::Axis);
        u.fuel = 1;
        u.apply_move(Coord::new(0, 1), 2);
        assert_eq!(u.fuel, 0);
        assert_eq!(u.move_left, 2);
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut u = unit("German_Recon", Side::Axis);
        u.take_damage(4);
        assert_eq!(u.strength, 6);
        u.take_damage(100);
        assert_eq!(u.strength, 0);
        assert!(u.is_destroyed());
    }

    #[test]
    fn test_resupply_clamps_and_spends_turn() {
        let mut u = unit("German_Tank", Side::Axis);
        u.ammo = 2;
        u.fuel = 55;
        u.resupply();
        assert_eq!(u.ammo, 5);
        assert_eq!(u.fuel, 60); // clamped to the profile maximum
        assert!(u.has_moved && u.has_fired);
    }

    #[test]
    fn test_reinforce_clamps_at_full_strength() {
        let mut u = unit("German_Infantry", Side::Axis);
        u.strength = 6;
        u.reinforce(2);
        assert_eq!(u.strength, 8);
        u.reinforce(10);
        assert_eq!(u.strength, 10);
        assert!(u.has_moved && u.has_fired);
    }

    #[test]
    fn test_end_turn_reset_is_idempotent() {
        let mut u = unit("German_Tank", Side::Axis);
        u.apply_move(Coord::new(2, 2), 6);
        u.has_fired = true;
        u.end_turn();
        let snapshot = (u.move_left, u.has_moved, u.has_fired);
        u.end_turn();
        assert_eq!((u.move_left, u.has_moved, u.has_fired), snapshot);
        assert_eq!(u.move_left, 6);
    }
}
