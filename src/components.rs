use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Grid and spatial
// ---------------------------------------------------------------------------

/// One square of the maze, addressed by column and row. Row 0 is the top.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compass direction, used both as an edge label and as a movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Fixed expansion order for every search over the board.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid offset for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Direction the unit is currently facing. Updated on every applied move.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing(pub Direction);

/// Direction chosen during the decision phase, consumed by the apply phase.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingMove(pub Direction);

/// Repeating countdown to the ghost's next decision. Its period is
/// re-sampled after every decision.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct MoveTimer(pub Timer);

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Player;

#[derive(Component, Debug)]
pub struct Ghost;

/// The ghost variant, selecting its pursuit targeting rule.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostKind {
    /// Heads straight for the player.
    Chaser,
    /// Aims four squares ahead of the player.
    Ambusher,
    /// Pivots around the nearest chaser.
    Flanker,
    /// Chases from afar, retreats home when close.
    Shy,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Chaser,
        GhostKind::Ambusher,
        GhostKind::Flanker,
        GhostKind::Shy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GhostKind::Chaser => "chaser",
            GhostKind::Ambusher => "ambusher",
            GhostKind::Flanker => "flanker",
            GhostKind::Shy => "shy",
        }
    }

    /// Corner this ghost patrols when not in pursuit.
    pub fn corner(self) -> Corner {
        match self {
            GhostKind::Chaser => Corner::NorthEast,
            GhostKind::Ambusher => Corner::NorthWest,
            GhostKind::Flanker => Corner::SouthEast,
            GhostKind::Shy => Corner::SouthWest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// Patrol target, resolved once against the maze at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeCorner(pub GridPosition);
