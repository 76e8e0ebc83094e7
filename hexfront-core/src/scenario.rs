//! Scenario configuration: map setup and initial force deployment

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::equipment::equipment_id_to_index;
use crate::game::Game;
use crate::map::{Coord, Map, MAP_COLS, MAP_ROWS};
use crate::side::Side;

/// One starting unit: an equipment id from the catalog and its tile
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deployment {
    pub equipment: String,
    pub row: i16,
    pub col: i16,
}

impl Deployment {
    fn new(equipment: &str, row: i16, col: i16) -> Self {
        Self {
            equipment: equipment.to_string(),
            row,
            col,
        }
    }
}

/// A playable setup: map dimensions and seed, turn limit, and both sides'
/// starting forces
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub rows: i16,
    pub cols: i16,
    pub max_turns: u32,
    pub map_seed: u64,
    pub axis: Vec<Deployment>,
    pub allies: Vec<Deployment>,
}

impl Scenario {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario = serde_json::from_str(&content)?;
        Ok(scenario)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a ready match: generate the map from the seed, then deploy the
    /// Axis roster followed by the Allied one, preserving listed order.
    pub fn to_game(&self) -> anyhow::Result<Game> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.map_seed);
        let map = Map::generate(self.rows, self.cols, &mut rng);
        let mut game = Game::new(map, self.max_turns);

        for (side, deployments) in [(Side::Axis, &self.axis), (Side::Allies, &self.allies)] {
            for d in deployments {
                let equipment = equipment_id_to_index(&d.equipment)
                    .ok_or_else(|| anyhow::anyhow!("unknown equipment id: {}", d.equipment))?;
                game.deploy(equipment, side, Coord::new(d.row, d.col))
                    .map_err(|rejection| {
                        anyhow::anyhow!(
                            "cannot deploy {} at ({}, {}): {}",
                            d.equipment,
                            d.row,
                            d.col,
                            rejection
                        )
                    })?;
            }
        }

        Ok(game)
    }
}

impl Default for Scenario {
    /// The stock border-clash setup: five units a side on a 12x16 map
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            rows: MAP_ROWS,
            cols: MAP_COLS,
            max_turns: 20,
            map_seed: 12345,
            axis: vec![
                Deployment::new("German_Infantry", 2, 1),
                Deployment::new("German_Tank", 3, 2),
                Deployment::new("German_Infantry", 4, 1),
                Deployment::new("German_Artillery", 5, 2),
                Deployment::new("German_Recon", 6, 1),
            ],
            allies: vec![
                Deployment::new("Allied_Infantry", 2, 14),
                Deployment::new("Allied_Tank", 3, 13),
                Deployment::new("Allied_Infantry", 4, 14),
                Deployment::new("Allied_Artillery", 5, 13),
                Deployment::new("Allied_Recon", 6, 14),
            ],
        }
    }
}
