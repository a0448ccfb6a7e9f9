//! # Grid Map
//!
//! Static board topology: the tile kind of every cell, per-kind index lists and
//! legal-move computation. A map never changes after construction.

use crate::game::{Direction, Position};
use crate::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};

/// Category of a single board cell. Decides which effect fires on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Not part of any path; never landed on
    Empty,
    /// Starting tile, grants score and checks victory
    Spawner,
    /// Draws a task that can succeed or fail
    Task,
    /// Draws an opportunity
    Opportunity,
    /// Draws a destiny
    Destiny,
    /// Draws a punishment
    Punishment,
    /// Offers a jump to another teleport tile
    Teleport,
    /// Stuns the player
    Prison,
    /// Heals and stuns the player
    Hospital,
}

impl TileKind {
    /// Parses a layout character.
    pub fn from_char(c: char) -> Option<TileKind> {
        match c {
            '.' => Some(TileKind::Empty),
            'S' => Some(TileKind::Spawner),
            'T' => Some(TileKind::Task),
            'O' => Some(TileKind::Opportunity),
            'D' => Some(TileKind::Destiny),
            'P' => Some(TileKind::Punishment),
            'W' => Some(TileKind::Teleport),
            'J' => Some(TileKind::Prison),
            'H' => Some(TileKind::Hospital),
            _ => None,
        }
    }

    /// Layout character for this kind.
    pub fn to_char(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Spawner => 'S',
            TileKind::Task => 'T',
            TileKind::Opportunity => 'O',
            TileKind::Destiny => 'D',
            TileKind::Punishment => 'P',
            TileKind::Teleport => 'W',
            TileKind::Prison => 'J',
            TileKind::Hospital => 'H',
        }
    }

    /// Human-readable name used in the message feed.
    pub fn label(self) -> &'static str {
        match self {
            TileKind::Empty => "empty ground",
            TileKind::Spawner => "spawner",
            TileKind::Task => "task",
            TileKind::Opportunity => "opportunity",
            TileKind::Destiny => "destiny",
            TileKind::Punishment => "punishment",
            TileKind::Teleport => "teleport",
            TileKind::Prison => "prison",
            TileKind::Hospital => "hospital",
        }
    }

    /// Whether a path may run through this tile.
    pub fn is_walkable(self) -> bool {
        self != TileKind::Empty
    }
}

const STANDARD_LAYOUT: &str = "\
STOWDSDTOWS
D...P.D...P
O...W.O...W
O...W.O...W
WJHTDTWJHTP
S...D.W...S
DTOWDODTOWD
D...P.D...P
O...W.O...W
D...P.D...P
SJHTDSWJHTS";

const STANDARD_SPAWN_DIRECTIONS: [Direction; 8] = [
    Direction::East,
    Direction::East,
    Direction::South,
    Direction::North,
    Direction::South,
    Direction::North,
    Direction::West,
    Direction::West,
];

/// The game board.
///
/// Tiles are stored densely in row-major order. Index lists for the special kinds
/// are computed once at construction and only ever hold coordinates of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
    spawn_directions: Vec<Direction>,
    spawners: Vec<Position>,
    teleports: Vec<Position>,
    prisons: Vec<Position>,
    hospitals: Vec<Position>,
    punishments: Vec<Position>,
}

impl GridMap {
    /// Builds a map from rows of tiles and the facing of each spawner.
    ///
    /// Spawner directions are bound to spawners in row-major order. Construction
    /// fails if the rows are empty or ragged, or if the number of spawners does not
    /// match the number of directions.
    pub fn new(rows: Vec<Vec<TileKind>>, spawn_directions: Vec<Direction>) -> BoardResult<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(BoardError::InvalidMap("map has no tiles".to_string()));
        }
        if let Some(row) = rows.iter().position(|row| row.len() != width) {
            return Err(BoardError::InvalidMap(format!(
                "row {} has {} tiles, expected {}",
                row,
                rows[row].len(),
                width
            )));
        }

        let mut map = Self {
            width,
            height,
            tiles: rows.into_iter().flatten().collect(),
            spawn_directions,
            spawners: Vec::new(),
            teleports: Vec::new(),
            prisons: Vec::new(),
            hospitals: Vec::new(),
            punishments: Vec::new(),
        };

        for (index, tile) in map.tiles.iter().enumerate() {
            let pos = Position::new((index % width) as i32, (index / width) as i32);
            match tile {
                TileKind::Spawner => map.spawners.push(pos),
                TileKind::Teleport => map.teleports.push(pos),
                TileKind::Prison => map.prisons.push(pos),
                TileKind::Hospital => map.hospitals.push(pos),
                TileKind::Punishment => map.punishments.push(pos),
                _ => {}
            }
        }

        if map.spawners.len() != map.spawn_directions.len() {
            return Err(BoardError::InvalidMap(format!(
                "{} spawners but {} spawn directions",
                map.spawners.len(),
                map.spawn_directions.len()
            )));
        }

        Ok(map)
    }

    /// Parses a text layout, one character per cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk::{Direction, GridMap, Position, TileKind};
    ///
    /// let map = GridMap::parse("STO\nO.O\nOOO", vec![Direction::East]).unwrap();
    /// assert_eq!(map.width(), 3);
    /// assert_eq!(map.tile_at(Position::new(1, 0)).unwrap(), TileKind::Task);
    /// ```
    pub fn parse(layout: &str, spawn_directions: Vec<Direction>) -> BoardResult<Self> {
        let rows = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .map(|(x, c)| {
                        TileKind::from_char(c).ok_or_else(|| {
                            BoardError::InvalidMap(format!("unknown tile '{}' at ({}, {})", c, x, y))
                        })
                    })
                    .collect::<BoardResult<Vec<_>>>()
            })
            .collect::<BoardResult<Vec<_>>>()?;

        Self::new(rows, spawn_directions)
    }

    /// The 11x11 party board with eight spawners.
    pub fn standard() -> BoardResult<Self> {
        Self::parse(STANDARD_LAYOUT, STANDARD_SPAWN_DIRECTIONS.to_vec())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether a position lies on the board.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Returns the tile kind at a position.
    ///
    /// Callers are expected to stay in bounds; an out-of-bounds lookup is an error.
    pub fn tile_at(&self, pos: Position) -> BoardResult<TileKind> {
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        Ok(self.tiles[pos.y as usize * self.width + pos.x as usize])
    }

    /// Computes the directions a walker at `pos` may take.
    ///
    /// A direction is legal when its target is on the board and not Empty. The
    /// reverse of `incoming` is never offered, so walkers cannot backtrack. Results
    /// are ordered clockwise from north and pair each direction with its target.
    /// An empty result is a dead end; deciding what that means is up to the caller.
    pub fn legal_moves(&self, pos: Position, incoming: Option<Direction>) -> Vec<(Direction, Position)> {
        let backwards = incoming.map(Direction::reverse);
        Direction::all()
            .into_iter()
            .filter(|direction| Some(*direction) != backwards)
            .map(|direction| (direction, pos.step(direction)))
            .filter(|(_, target)| {
                self.tile_at(*target)
                    .map(TileKind::is_walkable)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Spawner coordinates paired with their configured facing.
    pub fn spawn_points(&self) -> Vec<(Position, Direction)> {
        self.spawners
            .iter()
            .copied()
            .zip(self.spawn_directions.iter().copied())
            .collect()
    }

    pub fn spawners(&self) -> &[Position] {
        &self.spawners
    }

    pub fn teleports(&self) -> &[Position] {
        &self.teleports
    }

    pub fn prisons(&self) -> &[Position] {
        &self.prisons
    }

    pub fn hospitals(&self) -> &[Position] {
        &self.hospitals
    }

    pub fn punishments(&self) -> &[Position] {
        &self.punishments
    }
}

impl std::fmt::Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.tiles.chunks(self.width) {
            let line: String = row.iter().map(|tile| tile.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
