//! Maze parsing and the board graph the ghosts search over.
//!
//! An ASCII map becomes a fixed grid of squares. Topology (which square lies
//! in each direction) never changes after parsing; who stands where is kept
//! separately in [`Occupancy`](crate::occupancy::Occupancy).

use std::path::Path;

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope, warn};
use rand::Rng;
use serde::Deserialize;

use crate::ai;
use crate::components::*;
use crate::resources::{EngineConfig, GhostRng};

pub struct MazePlugin;

impl Plugin for MazePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_units);
    }
}

// ---------------------------------------------------------------------------
// Tile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    Wall,
    Floor,
    Dot,
    /// Ghost-house door: ghosts pass, the player does not.
    Gate,
    PlayerSpawn,
    GhostSpawn,
}

impl TileType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(TileType::Wall),
            ' ' => Some(TileType::Floor),
            '.' => Some(TileType::Dot),
            '-' => Some(TileType::Gate),
            'P' => Some(TileType::PlayerSpawn),
            'G' => Some(TileType::GhostSpawn),
            _ => None,
        }
    }

    /// Whether the player and ghosts alike can stand here.
    pub fn is_walkable_floor(&self) -> bool {
        matches!(
            self,
            TileType::Floor | TileType::Dot | TileType::PlayerSpawn | TileType::GhostSpawn
        )
    }
}

/// Which kind of mover is asking. Traversability depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Player,
    Ghost,
}

/// How the board's outer edges connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Edges lead nowhere.
    #[default]
    Bounded,
    /// Leaving one side enters the opposite side (tunnels).
    Wrapping,
}

// ---------------------------------------------------------------------------
// Maze map resource
// ---------------------------------------------------------------------------

/// The parsed maze grid and spawn positions.
#[derive(Resource, Debug, Clone)]
pub struct MazeMap {
    pub width: usize,
    pub height: usize,
    pub topology: Topology,
    pub tiles: Vec<Vec<TileType>>,
    pub player_spawn: GridPosition,
    pub ghost_spawns: Vec<GridPosition>,
}

impl MazeMap {
    /// Parse an ASCII maze string into a bounded MazeMap.
    pub fn parse(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err("Empty maze".to_string());
        }

        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err("Maze has zero width".to_string());
        }

        let mut tiles = Vec::with_capacity(height);
        let mut player_spawn = None;
        let mut ghost_spawns = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            let mut row = Vec::with_capacity(width);
            for (x, ch) in line.chars().enumerate() {
                let tile = TileType::from_char(ch).ok_or_else(|| {
                    format!("Unknown tile character '{}' at ({}, {})", ch, x, y)
                })?;

                let pos = GridPosition::new(x as i32, y as i32);
                match tile {
                    TileType::PlayerSpawn => {
                        if player_spawn.is_some() {
                            return Err(format!("Multiple player spawns at ({}, {})", x, y));
                        }
                        player_spawn = Some(pos);
                    }
                    TileType::GhostSpawn => ghost_spawns.push(pos),
                    _ => {}
                }

                row.push(tile);
            }
            // Pad short rows with Floor
            while row.len() < width {
                row.push(TileType::Floor);
            }
            tiles.push(row);
        }

        let player_spawn = player_spawn.ok_or("No player spawn ('P') found in maze")?;

        Ok(MazeMap {
            width,
            height,
            topology: Topology::Bounded,
            tiles,
            player_spawn,
            ghost_spawns,
        })
    }

    /// Read and parse a maze file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read maze file {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("Failed to parse maze file {}: {}", path.display(), e))
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Whether a coordinate lies on the board at all (walls included).
    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Get tile type at a position, or None if out of bounds.
    pub fn tile_at(&self, pos: GridPosition) -> Option<TileType> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Resolve raw coordinates to a board square. Wrapping boards fold the
    /// coordinates back onto the grid; bounded boards reject them.
    pub fn square_at(&self, x: i32, y: i32) -> Option<GridPosition> {
        match self.topology {
            Topology::Bounded => Some(GridPosition::new(x, y)).filter(|p| self.contains(*p)),
            Topology::Wrapping => Some(GridPosition::new(
                x.rem_euclid(self.width as i32),
                y.rem_euclid(self.height as i32),
            )),
        }
    }

    /// The square adjacent to `pos` in `dir`, if that edge exists.
    pub fn neighbor(&self, pos: GridPosition, dir: Direction) -> Option<GridPosition> {
        if !self.contains(pos) {
            return None;
        }
        let (dx, dy) = dir.delta();
        self.square_at(pos.x + dx, pos.y + dy)
    }

    /// Follow `dir` edges `steps` times. The direction never changes along
    /// the walk; None if an edge runs out first.
    pub fn walk(&self, from: GridPosition, dir: Direction, steps: u32) -> Option<GridPosition> {
        (0..steps).try_fold(from, |pos, _| self.neighbor(pos, dir))
    }

    /// Floor or gate: somewhere at least one kind of mover can stand.
    pub fn is_walkable(&self, pos: GridPosition) -> bool {
        self.tile_at(pos)
            .is_some_and(|t| t.is_walkable_floor() || t == TileType::Gate)
    }

    /// Whether `agent` may occupy `pos`. Gates are ghost-only.
    pub fn is_traversable(&self, pos: GridPosition, agent: AgentKind) -> bool {
        match agent {
            AgentKind::Player => self.tile_at(pos).is_some_and(|t| t.is_walkable_floor()),
            AgentKind::Ghost => self.is_walkable(pos),
        }
    }

    /// Directions `agent` can legally move from `pos`, in N, S, E, W order.
    pub fn legal_directions(&self, pos: GridPosition, agent: AgentKind) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| {
                self.neighbor(pos, *dir)
                    .is_some_and(|n| self.is_traversable(n, agent))
            })
            .collect()
    }

    /// Adjacent squares `agent` may step onto, in N, S, E, W order.
    pub fn traversable_neighbors(&self, pos: GridPosition, agent: AgentKind) -> Vec<GridPosition> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.neighbor(pos, dir))
            .filter(|n| self.is_traversable(*n, agent))
            .collect()
    }

    /// Adjacent squares that are not walls, regardless of who asks.
    pub fn walkable_neighbors(&self, pos: GridPosition) -> Vec<GridPosition> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.neighbor(pos, dir))
            .filter(|n| self.is_walkable(*n))
            .collect()
    }

    /// Direction of the edge leading from `from` to an adjacent `to`.
    pub fn direction_between(&self, from: GridPosition, to: GridPosition) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| self.neighbor(from, *dir) == Some(to))
    }

    /// The walkable square closest (Manhattan) to one of the board corners.
    /// Ties resolve to the first square in row-major order.
    pub fn home_corner(&self, corner: Corner) -> Option<GridPosition> {
        let right = self.width as i32 - 1;
        let bottom = self.height as i32 - 1;
        let anchor = match corner {
            Corner::NorthWest => GridPosition::new(0, 0),
            Corner::NorthEast => GridPosition::new(right, 0),
            Corner::SouthWest => GridPosition::new(0, bottom),
            Corner::SouthEast => GridPosition::new(right, bottom),
        };
        (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| GridPosition::new(x, y)))
            .filter(|p| self.is_walkable(*p))
            .min_by_key(|p| ai::manhattan(p, &anchor))
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Spawn the player and one ghost per `G`, cycling through the ghost kinds.
#[span_fn]
pub fn spawn_units(
    mut commands: Commands,
    maze: Option<Res<MazeMap>>,
    config: Res<EngineConfig>,
    mut rng: ResMut<GhostRng>,
) {
    let Some(maze) = maze else {
        warn!("no maze loaded, nothing to spawn");
        return;
    };

    commands.spawn((
        Player,
        maze.player_spawn,
        Facing(Direction::West),
    ));

    for (i, spawn_pos) in maze.ghost_spawns.iter().enumerate() {
        let kind = GhostKind::ALL[i % GhostKind::ALL.len()];
        let home = maze.home_corner(kind.corner()).unwrap_or(*spawn_pos);
        let first = ai::move_interval(kind, &config, &mut rng.0);
        // Stagger the first decision so ghosts don't all leave on one frame.
        let delay = first + first.mul_f32(rng.0.gen_range(0.0..1.0));

        commands.spawn((
            Ghost,
            kind,
            *spawn_pos,
            Facing(Direction::North),
            HomeCorner(home),
            MoveTimer(Timer::new(delay, TimerMode::Repeating)),
        ));
    }

    info!(
        "spawned player at ({}, {}) and {} ghosts",
        maze.player_spawn.x,
        maze.player_spawn.y,
        maze.ghost_spawns.len()
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
