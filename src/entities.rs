use crate::maze::{CellCoords, CellIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Number of sprite styles to draw entity looks from.
pub const NUM_STYLES: u32 = 6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pumpkin {
    pub style_id: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Monster {
    pub style_id: u32,
    /// Where the monster stood before its last step. A freshly placed
    /// monster has none, so its first move carries no backtrack bias.
    pub prev: Option<CellCoords>,
}

/// Initial board population. Pumpkins and monsters are tracked in separate
/// maps; monsters may stack on a cell once the game is underway.
pub struct Entities {
    pub pumpkins: BTreeMap<CellIndex, Pumpkin>,
    pub monsters: BTreeMap<CellIndex, Vec<Monster>>,
}

pub fn random_style_id(rng: &mut impl Rng) -> u32 {
    rng.gen_range(0..NUM_STYLES)
}

/// Scatter pumpkins and monsters over a `width` x `height` grid.
///
/// Pumpkins avoid the start cell (0,0), the goal cell and each other.
/// Monsters additionally keep out of the safe zone around the start
/// (x < `safe_zone_size` or y < `safe_zone_size`) and off pumpkin cells.
///
/// Candidate cells are collected up front and sampled without replacement,
/// so placement cannot loop; a request larger than the candidate pool
/// panics as a configuration error.
pub fn place_entities(
    rng: &mut impl Rng,
    width: usize,
    height: usize,
    num_pumpkins: usize,
    num_monsters: usize,
    safe_zone_size: usize,
) -> Entities {
    let coords_to_index = |c: CellCoords| c.y * width + c.x;
    let start = CellCoords { x: 0, y: 0 };
    let goal = CellCoords {
        x: width - 1,
        y: height - 1,
    };

    let mut pumpkin_pool = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let coords = CellCoords { x, y };
            if coords != start && coords != goal {
                pumpkin_pool.push(coords);
            }
        }
    }
    assert!(
        num_pumpkins <= pumpkin_pool.len(),
        "cannot place {} pumpkins on {} free cells",
        num_pumpkins,
        pumpkin_pool.len()
    );
    pumpkin_pool.shuffle(rng);

    let mut pumpkins = BTreeMap::new();
    for &coords in &pumpkin_pool[..num_pumpkins] {
        pumpkins.insert(
            coords_to_index(coords),
            Pumpkin {
                style_id: random_style_id(rng),
            },
        );
    }

    let mut monster_pool = Vec::new();
    for y in safe_zone_size..height {
        for x in safe_zone_size..width {
            let coords = CellCoords { x, y };
            if coords != goal && !pumpkins.contains_key(&coords_to_index(coords)) {
                monster_pool.push(coords);
            }
        }
    }
    assert!(
        num_monsters <= monster_pool.len(),
        "cannot place {} monsters on {} free cells outside the safe zone",
        num_monsters,
        monster_pool.len()
    );
    monster_pool.shuffle(rng);

    let mut monsters: BTreeMap<CellIndex, Vec<Monster>> = BTreeMap::new();
    for &coords in &monster_pool[..num_monsters] {
        monsters.entry(coords_to_index(coords)).or_default().push(Monster {
            style_id: random_style_id(rng),
            prev: None,
        });
    }

    Entities { pumpkins, monsters }
}
