use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Coordinates of a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellCoords {
    pub x: usize,
    pub y: usize,
}

/// Cell index, representing `y * width + x`.
pub type CellIndex = usize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

pub const ALL_DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

/// A maze cell. A wall flag set to `false` means passage exists in that
/// direction to the neighboring cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub top_wall: bool,
    pub right_wall: bool,
    pub bottom_wall: bool,
    pub left_wall: bool,
}

impl Cell {
    fn walled() -> Self {
        Cell {
            top_wall: true,
            right_wall: true,
            bottom_wall: true,
            left_wall: true,
        }
    }

    pub fn has_wall(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.top_wall,
            Dir::Down => self.bottom_wall,
            Dir::Left => self.left_wall,
            Dir::Right => self.right_wall,
        }
    }
}

/// A perfect maze: every pair of cells is connected by exactly one path.
pub struct Maze {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Maze {
    pub(crate) fn all_walls(width: usize, height: usize) -> Self {
        Maze {
            width,
            height,
            rows: vec![vec![Cell::walled(); width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, coords: CellCoords) -> &Cell {
        &self.rows[coords.y][coords.x]
    }

    pub fn coords_to_index(&self, coords: CellCoords) -> CellIndex {
        coords.y * self.width + coords.x
    }

    pub fn index_to_coords(&self, index: CellIndex) -> CellCoords {
        CellCoords {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// The bottom-right cell, conventionally the exit.
    pub fn goal(&self) -> CellCoords {
        CellCoords {
            x: self.width - 1,
            y: self.height - 1,
        }
    }

    /// The neighbor one step in `dir`, if it lies on the grid at all.
    pub fn neighbor(&self, coords: CellCoords, dir: Dir) -> Option<CellCoords> {
        let (dx, dy) = dir.delta();
        let nx = coords.x as isize + dx;
        let ny = coords.y as isize + dy;
        if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
            return None;
        }
        Some(CellCoords {
            x: nx as usize,
            y: ny as usize,
        })
    }

    /// The neighbor one step in `dir`, if there is no wall in between and it
    /// lies on the grid. This is the movement legality rule for avatars and
    /// monsters alike.
    pub fn open_neighbor(&self, coords: CellCoords, dir: Dir) -> Option<CellCoords> {
        if self.cell(coords).has_wall(dir) {
            return None;
        }
        self.neighbor(coords, dir)
    }

    pub(crate) fn remove_wall_between(&mut self, a: CellCoords, b: CellCoords) {
        if a.x < b.x {
            self.rows[a.y][a.x].right_wall = false;
            self.rows[b.y][b.x].left_wall = false;
        } else if a.x > b.x {
            self.rows[a.y][a.x].left_wall = false;
            self.rows[b.y][b.x].right_wall = false;
        } else if a.y < b.y {
            self.rows[a.y][a.x].bottom_wall = false;
            self.rows[b.y][b.x].top_wall = false;
        } else {
            self.rows[a.y][a.x].top_wall = false;
            self.rows[b.y][b.x].bottom_wall = false;
        }
    }

    /// Diagnostic rendering: `+--+` lattice rows with `|` side walls.
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                out.push('+');
                out.push_str(if self.rows[y][x].top_wall { "--" } else { "  " });
            }
            out.push_str("+\n");
            for x in 0..self.width {
                out.push(if self.rows[y][x].left_wall { '|' } else { ' ' });
                out.push_str("  ");
            }
            out.push(if self.rows[y][self.width - 1].right_wall {
                '|'
            } else {
                ' '
            });
            out.push('\n');
        }
        for x in 0..self.width {
            out.push('+');
            out.push_str(if self.rows[self.height - 1][x].bottom_wall {
                "--"
            } else {
                "  "
            });
        }
        out.push_str("+\n");
        out
    }
}

/// Generate a maze using Wilson's algorithm, i.e. loop-erased random walk.
///
/// Panics if `width < 2` or `height < 1`.
pub fn generate_maze(rng: &mut impl Rng, width: usize, height: usize) -> Maze {
    assert!(width >= 2, "maze width must be at least 2, got {}", width);
    assert!(height >= 1, "maze height must be at least 1, got {}", height);

    let mut maze = Maze::all_walls(width, height);
    let total = width * height;

    // Whether the cell is part of the maze. The top-left cell seeds it.
    let mut in_maze = vec![false; total];
    in_maze[0] = true;
    let mut cells_in_maze = 1;

    while cells_in_maze < total {
        // Start a walk from a random cell that is not yet part of the maze.
        let outside: Vec<CellIndex> = (0..total).filter(|&i| !in_maze[i]).collect();
        let start = *outside.choose(rng).unwrap();

        let mut path = vec![start];
        let mut position_in_path = HashMap::new();
        position_in_path.insert(start, 0);
        let mut current = start;

        loop {
            // Walk to a uniformly random grid neighbor. Walls are ignored
            // while walking; they only come down when a path is committed.
            let coords = maze.index_to_coords(current);
            let mut neighbors = Vec::new();
            for dir in ALL_DIRS {
                if let Some(next) = maze.neighbor(coords, dir) {
                    neighbors.push(next);
                }
            }
            let next = maze.coords_to_index(*neighbors.choose(rng).unwrap());

            if in_maze[next] {
                // Reached a cell that is already part of the maze. Commit
                // the whole path.
                path.push(next);
                for pair in path.windows(2) {
                    let a = maze.index_to_coords(pair[0]);
                    let b = maze.index_to_coords(pair[1]);
                    maze.remove_wall_between(a, b);
                }
                for &index in &path[..path.len() - 1] {
                    in_maze[index] = true;
                    cells_in_maze += 1;
                }
                break;
            } else if let Some(&seen_at) = position_in_path.get(&next) {
                // Loop detected. Erase it and resume from the first visit.
                for &index in &path[seen_at + 1..] {
                    position_in_path.remove(&index);
                }
                path.truncate(seen_at + 1);
                current = next;
            } else {
                position_in_path.insert(next, path.len());
                path.push(next);
                current = next;
            }
        }
    }

    // Force an entrance at the top-left and an exit at the bottom-right.
    maze.rows[0][0].left_wall = false;
    maze.rows[height - 1][width - 1].right_wall = false;
    maze
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    const SHAPES: [(u64, usize, usize); 6] =
        [(1, 10, 8), (2, 5, 5), (3, 15, 15), (4, 2, 1), (5, 3, 1), (6, 2, 15)];

    fn open_edge_count(maze: &Maze) -> usize {
        let mut edges = 0;
        for y in 0..maze.height() {
            for x in 0..maze.width() {
                let cell = maze.cell(CellCoords { x, y });
                if x + 1 < maze.width() && !cell.right_wall {
                    edges += 1;
                }
                if y + 1 < maze.height() && !cell.bottom_wall {
                    edges += 1;
                }
            }
        }
        edges
    }

    fn reachable_count(maze: &Maze) -> usize {
        let start = CellCoords { x: 0, y: 0 };
        let mut seen = vec![false; maze.width() * maze.height()];
        seen[0] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 1;
        while let Some(coords) = queue.pop_front() {
            for dir in ALL_DIRS {
                if let Some(next) = maze.open_neighbor(coords, dir) {
                    let index = maze.coords_to_index(next);
                    if !seen[index] {
                        seen[index] = true;
                        count += 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        count
    }

    #[test]
    fn generated_maze_is_a_spanning_tree() {
        for (seed, width, height) in SHAPES {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate_maze(&mut rng, width, height);
            // A spanning tree over W*H nodes has exactly W*H - 1 edges and
            // reaches every node; together that also rules out cycles.
            assert_eq!(open_edge_count(&maze), width * height - 1);
            assert_eq!(reachable_count(&maze), width * height);
        }
    }

    #[test]
    fn walls_are_symmetric() {
        for (seed, width, height) in SHAPES {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate_maze(&mut rng, width, height);
            for y in 0..height {
                for x in 0..width {
                    let cell = maze.cell(CellCoords { x, y });
                    if x + 1 < width {
                        let right = maze.cell(CellCoords { x: x + 1, y });
                        assert_eq!(cell.right_wall, right.left_wall);
                    }
                    if y + 1 < height {
                        let below = maze.cell(CellCoords { x, y: y + 1 });
                        assert_eq!(cell.bottom_wall, below.top_wall);
                    }
                }
            }
        }
    }

    #[test]
    fn entrance_and_exit_are_open() {
        for (seed, width, height) in SHAPES {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate_maze(&mut rng, width, height);
            assert!(!maze.cell(CellCoords { x: 0, y: 0 }).left_wall);
            assert!(!maze.cell(maze.goal()).right_wall);
        }
    }

    #[test]
    fn entrance_and_exit_do_not_leave_the_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = generate_maze(&mut rng, 4, 3);
        assert_eq!(maze.open_neighbor(CellCoords { x: 0, y: 0 }, Dir::Left), None);
        assert_eq!(maze.open_neighbor(maze.goal(), Dir::Right), None);
    }

    #[test]
    #[should_panic(expected = "width must be at least 2")]
    fn rejects_width_below_two() {
        let mut rng = StdRng::seed_from_u64(0);
        generate_maze(&mut rng, 1, 5);
    }

    #[test]
    #[should_panic(expected = "height must be at least 1")]
    fn rejects_height_below_one() {
        let mut rng = StdRng::seed_from_u64(0);
        generate_maze(&mut rng, 5, 0);
    }

    #[test]
    fn index_conversion_round_trips() {
        let maze = Maze::all_walls(7, 4);
        for index in 0..7 * 4 {
            assert_eq!(maze.coords_to_index(maze.index_to_coords(index)), index);
        }
        assert_eq!(maze.coords_to_index(CellCoords { x: 3, y: 2 }), 17);
    }

    #[test]
    fn ascii_rendering_has_lattice_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let maze = generate_maze(&mut rng, 4, 3);
        let ascii = maze.to_ascii();
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines.len(), 2 * 3 + 1);
        for line in &lines {
            assert_eq!(line.chars().count(), 3 * 4 + 1);
        }
        // The entrance shows up as a missing left wall on the first cell row.
        assert!(lines[1].starts_with(' '));
    }
}
