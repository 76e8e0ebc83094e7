//! Equipment catalog: the immutable stat templates shared by all units of a
//! given kind

use serde::{Deserialize, Serialize};

/// Equipment identifier (index into EQUIPMENT)
pub type EquipmentId = u8;

/// Unit class. Per-class behavior (attack range, symbols) dispatches by
/// exhaustive match so new classes cannot be forgotten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Infantry,
    Tank,
    Recon,
    AntiTank,
    Artillery,
    Fighter,
    Bomber,
}

impl UnitClass {
    /// Attack range in map distance. Artillery fires over one extra ring;
    /// everything else fights adjacent.
    pub fn attack_range(self) -> u32 {
        match self {
            UnitClass::Artillery => 2,
            UnitClass::Infantry
            | UnitClass::Tank
            | UnitClass::Recon
            | UnitClass::AntiTank
            | UnitClass::Fighter
            | UnitClass::Bomber => 1,
        }
    }
}

/// Target classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Soft,
    Hard,
    Air,
    Naval,
}

/// Immutable equipment profile
#[derive(Clone, Debug)]
pub struct Equipment {
    pub id: &'static str,
    pub name: &'static str,
    pub class: UnitClass,
    pub kind: UnitKind,
    pub attack: u32,
    pub defense: u32,
    pub move_points: u32,
    pub fuel: u32,
    pub ammo: u32,
    pub cost: u32,
}

impl Equipment {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        id: &'static str,
        name: &'static str,
        class: UnitClass,
        kind: UnitKind,
        attack: u32,
        defense: u32,
        move_points: u32,
        fuel: u32,
        ammo: u32,
        cost: u32,
    ) -> Self {
        Self {
            id,
            name,
            class,
            kind,
            attack,
            defense,
            move_points,
            fuel,
            ammo,
            cost,
        }
    }
}

/// The full catalog
pub static EQUIPMENT: [Equipment; 8] = [
    Equipment::new("German_Infantry", "Infantry", UnitClass::Infantry, UnitKind::Soft, 6, 8, 4, 40, 10, 50),
    Equipment::new("German_Tank", "Panzer IV", UnitClass::Tank, UnitKind::Hard, 12, 10, 6, 60, 8, 150),
    Equipment::new("German_Recon", "Recon", UnitClass::Recon, UnitKind::Soft, 5, 6, 8, 70, 8, 80),
    Equipment::new("German_Artillery", "Artillery", UnitClass::Artillery, UnitKind::Soft, 14, 4, 3, 40, 6, 120),
    Equipment::new("Allied_Infantry", "Infantry", UnitClass::Infantry, UnitKind::Soft, 6, 8, 4, 40, 10, 50),
    Equipment::new("Allied_Tank", "Sherman", UnitClass::Tank, UnitKind::Hard, 10, 9, 6, 60, 8, 140),
    Equipment::new("Allied_Recon", "Recon", UnitClass::Recon, UnitKind::Soft, 5, 6, 8, 70, 8, 80),
    Equipment::new("Allied_Artillery", "Artillery", UnitClass::Artillery, UnitKind::Soft, 13, 4, 3, 40, 6, 120),
];

/// Get catalog index from string ID
pub fn equipment_id_to_index(id: &str) -> Option<EquipmentId> {
    EQUIPMENT.iter().position(|e| e.id == id).map(|i| i as u8)
}

/// Get equipment profile from index
pub fn get_equipment(idx: EquipmentId) -> &'static Equipment {
    &EQUIPMENT[idx as usize]
}
