use crate::entities::{Entities, Monster, Pumpkin};
use crate::maze::{CellCoords, CellIndex, Dir, Maze, ALL_DIRS};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::mem;

/// One play-through: the board state that exists between entering Playing
/// and reaching Won or Lost.
pub struct Session {
    maze: Maze,
    avatar: CellCoords,
    pumpkins: BTreeMap<CellIndex, Pumpkin>,
    monsters: BTreeMap<CellIndex, Vec<Monster>>,
    captured: Vec<u32>,
    safe_zone_size: usize,
}

/// Current phase of the game, as seen by the front end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Init,
    Playing,
    Won,
    Lost,
}

pub enum GameState {
    Init,
    Playing(Session),
    Won(Session),
    Lost(Session),
}

enum Verdict {
    Won,
    Lost,
}

impl GameState {
    pub fn phase(&self) -> Phase {
        match self {
            GameState::Init => Phase::Init,
            GameState::Playing(_) => Phase::Playing,
            GameState::Won(_) => Phase::Won,
            GameState::Lost(_) => Phase::Lost,
        }
    }

    /// The board, if one exists. Won and Lost keep the final board around
    /// so it can still be drawn under the banner.
    pub fn session(&self) -> Option<&Session> {
        match self {
            GameState::Init => None,
            GameState::Playing(session) | GameState::Won(session) | GameState::Lost(session) => {
                Some(session)
            }
        }
    }

    /// Init -> Playing with a freshly generated board.
    pub fn start(&mut self, session: Session) {
        *self = GameState::Playing(session);
    }

    /// Back to Init. The next `start` brings a brand-new maze and placement.
    pub fn reset(&mut self) {
        *self = GameState::Init;
    }

    /// Apply one directional move intent. Outside Playing, and for moves
    /// into a wall or off the grid, this is a silent no-op.
    pub fn move_avatar(&mut self, dir: Dir) {
        let verdict = match self {
            GameState::Playing(session) => session.move_avatar(dir),
            _ => return,
        };
        self.settle(verdict);
    }

    /// Advance every monster by one cell from a single consistent snapshot.
    /// Outside Playing this is a no-op, which also keeps a stale tick timer
    /// from touching a finished session.
    pub fn tick_monsters(&mut self, rng: &mut impl Rng) {
        let verdict = match self {
            GameState::Playing(session) => session.tick_monsters(rng),
            _ => return,
        };
        self.settle(verdict);
    }

    fn settle(&mut self, verdict: Option<Verdict>) {
        let verdict = match verdict {
            Some(verdict) => verdict,
            None => return,
        };
        if let GameState::Playing(session) = mem::replace(self, GameState::Init) {
            *self = match verdict {
                Verdict::Won => GameState::Won(session),
                Verdict::Lost => GameState::Lost(session),
            };
        }
    }
}

impl Session {
    pub fn new(maze: Maze, entities: Entities, safe_zone_size: usize) -> Self {
        Session {
            maze,
            avatar: CellCoords { x: 0, y: 0 },
            pumpkins: entities.pumpkins,
            monsters: entities.monsters,
            captured: Vec::new(),
            safe_zone_size,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn avatar(&self) -> CellCoords {
        self.avatar
    }

    pub fn pumpkins(&self) -> &BTreeMap<CellIndex, Pumpkin> {
        &self.pumpkins
    }

    pub fn monsters(&self) -> &BTreeMap<CellIndex, Vec<Monster>> {
        &self.monsters
    }

    /// Style ids of captured pumpkins, in capture order.
    pub fn captured(&self) -> &[u32] {
        &self.captured
    }

    fn move_avatar(&mut self, dir: Dir) -> Option<Verdict> {
        let dest = self.maze.open_neighbor(self.avatar, dir)?;
        let dest_index = self.maze.coords_to_index(dest);
        self.avatar = dest;

        // A monster on the destination ends the game before any capture.
        if self.monsters.contains_key(&dest_index) {
            return Some(Verdict::Lost);
        }
        if let Some(pumpkin) = self.pumpkins.remove(&dest_index) {
            self.captured.push(pumpkin.style_id);
        }
        if dest == self.maze.goal() {
            // Arriving with pumpkins still out is a loss.
            return Some(if self.pumpkins.is_empty() {
                Verdict::Won
            } else {
                Verdict::Lost
            });
        }
        None
    }

    fn tick_monsters(&mut self, rng: &mut impl Rng) -> Option<Verdict> {
        let mut moved: BTreeMap<CellIndex, Vec<Monster>> = BTreeMap::new();
        let mut caught = false;
        for (&index, pack) in &self.monsters {
            let from = self.maze.index_to_coords(index);
            for monster in pack {
                let to = self.next_monster_cell(from, *monster, &mut caught, rng);
                moved.entry(self.maze.coords_to_index(to)).or_default().push(Monster {
                    style_id: monster.style_id,
                    prev: Some(from),
                });
            }
        }
        self.monsters = moved;
        if caught {
            Some(Verdict::Lost)
        } else {
            None
        }
    }

    fn next_monster_cell(
        &self,
        from: CellCoords,
        monster: Monster,
        caught: &mut bool,
        rng: &mut impl Rng,
    ) -> CellCoords {
        let mut candidates = Vec::new();
        for dir in ALL_DIRS {
            if let Some(next) = self.maze.open_neighbor(from, dir) {
                if next.x >= self.safe_zone_size && next.y >= self.safe_zone_size {
                    candidates.push(next);
                }
            }
        }
        // The avatar within reach is taken unconditionally.
        if candidates.contains(&self.avatar) {
            *caught = true;
            return self.avatar;
        }
        if let Some(prev) = monster.prev {
            if candidates.len() > 1 {
                candidates.retain(|&coords| coords != prev);
            }
        }
        match candidates.choose(rng) {
            Some(&coords) => coords,
            // Fully walled in; should not happen in a connected maze.
            None => from,
        }
    }
}
