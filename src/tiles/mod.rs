//! Terrain and reactive tiles
//!
//! Tiles are a closed set of variants. Static capabilities (does water pass,
//! can it be chiselled, does it soak up water) come from [`TileKind::traits`];
//! variant state lives in the [`Tile`] payload. Per-tick behavior that needs
//! to look at neighbours is driven by the tile reactor in `simulation`.

pub mod codes;

use serde::{Deserialize, Serialize};

pub use codes::tile_from_code;

/// Dirt stops absorbing water at this hydration
pub const DIRT_MAX_HYDRATION: u8 = 5;

/// Dirt at or above this hydration has grown grass
pub const GRASS_HYDRATION: u8 = 3;

/// Saplings are fully grown (goal complete) at this hydration
pub const SAPLING_MAX_HYDRATION: u8 = 3;

/// Tile variant without its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Air,
    Stone,
    Dirt,
    CrackedStone,
    Perlite,
    Sapling,
}

/// Static capabilities of a tile variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileTraits {
    /// Water may flow into and through this tile
    pub transparent: bool,
    /// A chisel turns this tile into air
    pub chiselable: bool,
    /// The tile absorbs units of water into its own state
    pub hydratable: bool,
}

impl TileKind {
    pub const fn traits(self) -> TileTraits {
        match self {
            TileKind::Air => TileTraits {
                transparent: true,
                chiselable: false,
                hydratable: false,
            },
            TileKind::Stone => TileTraits {
                transparent: false,
                chiselable: true,
                hydratable: false,
            },
            TileKind::Dirt => TileTraits {
                transparent: false,
                chiselable: true,
                hydratable: true,
            },
            TileKind::CrackedStone => TileTraits {
                transparent: false,
                chiselable: false,
                hydratable: true,
            },
            TileKind::Perlite => TileTraits {
                transparent: false,
                chiselable: false,
                hydratable: true,
            },
            TileKind::Sapling => TileTraits {
                transparent: true,
                chiselable: false,
                hydratable: false,
            },
        }
    }
}

/// A tile together with its variant state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Air,
    Stone,
    /// Hydration 0..=5; grass from 3 upward
    Dirt { hydration: u8 },
    /// Becomes air on the update after it is cracked
    CrackedStone { cracked: bool },
    /// Holds at most one unit and drips it into the cell below
    Perlite { has_water: bool, drip_timer: u8 },
    /// Goal tile; grows with the hydration of the tile it stands on
    Sapling { hydration: u8 },
}

impl Tile {
    pub fn dirt(hydration: u8) -> Self {
        Tile::Dirt {
            hydration: hydration.min(DIRT_MAX_HYDRATION),
        }
    }

    pub fn cracked_stone() -> Self {
        Tile::CrackedStone { cracked: false }
    }

    pub fn perlite() -> Self {
        Tile::Perlite {
            has_water: false,
            drip_timer: 0,
        }
    }

    pub fn sapling() -> Self {
        Tile::Sapling { hydration: 0 }
    }

    pub fn kind(&self) -> TileKind {
        match self {
            Tile::Air => TileKind::Air,
            Tile::Stone => TileKind::Stone,
            Tile::Dirt { .. } => TileKind::Dirt,
            Tile::CrackedStone { .. } => TileKind::CrackedStone,
            Tile::Perlite { .. } => TileKind::Perlite,
            Tile::Sapling { .. } => TileKind::Sapling,
        }
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.kind().traits().transparent
    }

    #[inline]
    pub fn is_chiselable(&self) -> bool {
        self.kind().traits().chiselable
    }

    #[inline]
    pub fn is_hydratable(&self) -> bool {
        self.kind().traits().hydratable
    }

    /// Current hydration for hydratable tiles, `None` otherwise
    pub fn hydration(&self) -> Option<u8> {
        match *self {
            Tile::Dirt { hydration } => Some(hydration),
            Tile::CrackedStone { .. } => Some(0),
            Tile::Perlite { has_water, .. } => Some(u8::from(has_water)),
            _ => None,
        }
    }

    /// Offer up to `max` units of water; returns the units actually absorbed.
    ///
    /// Non-hydratable tiles absorb nothing.
    pub fn hydrate(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        match self {
            Tile::Dirt { hydration } => {
                if *hydration >= DIRT_MAX_HYDRATION {
                    return 0;
                }
                *hydration += 1;
                1
            }
            Tile::CrackedStone { cracked } => {
                *cracked = true;
                1
            }
            Tile::Perlite { has_water, .. } => {
                if *has_water {
                    return 0;
                }
                *has_water = true;
                1
            }
            _ => 0,
        }
    }

    /// True for tiles that count as level goals
    pub fn is_goal(&self) -> bool {
        matches!(self, Tile::Sapling { .. })
    }

    /// Goal predicate: a sapling that has reached full hydration
    pub fn goal_complete(&self) -> bool {
        matches!(self, Tile::Sapling { hydration } if *hydration >= SAPLING_MAX_HYDRATION)
    }

    /// Dirt that has reached the grass threshold
    pub fn has_grass(&self) -> bool {
        matches!(self, Tile::Dirt { hydration } if *hydration >= GRASS_HYDRATION)
    }

    /// Artwork stage for the renderer (dirt wetness 0..=3, sapling growth 0..=3)
    pub fn variant(&self) -> u8 {
        match *self {
            Tile::Dirt { hydration } => hydration.min(GRASS_HYDRATION),
            Tile::Sapling { hydration } => hydration,
            Tile::Perlite { has_water, .. } => u8::from(has_water),
            Tile::CrackedStone { cracked } => u8::from(cracked),
            _ => 0,
        }
    }
}
