//! Integer tile codes used by level data
//!
//! `-1` air, `0` stone, `1..=4` dirt at hydration 0..=3, `5` sapling,
//! `6` cracked stone, `7` perlite.

use crate::core::error::{Result, SimError};
use crate::tiles::Tile;

pub const CODE_AIR: i32 = -1;
pub const CODE_STONE: i32 = 0;
pub const CODE_DIRT_DRY: i32 = 1;
pub const CODE_DIRT_GRASS: i32 = 4;
pub const CODE_SAPLING: i32 = 5;
pub const CODE_CRACKED_STONE: i32 = 6;
pub const CODE_PERLITE: i32 = 7;

/// Build a fresh tile from its level-data code
pub fn tile_from_code(code: i32) -> Result<Tile> {
    match code {
        CODE_AIR => Ok(Tile::Air),
        CODE_STONE => Ok(Tile::Stone),
        CODE_DIRT_DRY..=CODE_DIRT_GRASS => Ok(Tile::dirt((code - CODE_DIRT_DRY) as u8)),
        CODE_SAPLING => Ok(Tile::sapling()),
        CODE_CRACKED_STONE => Ok(Tile::cracked_stone()),
        CODE_PERLITE => Ok(Tile::perlite()),
        other => Err(SimError::UnknownTileCode(other)),
    }
}
