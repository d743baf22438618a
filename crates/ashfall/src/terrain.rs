//! # Terrain
//!
//! A rectangular grid of tiles in row-major order. The terrain knows nothing
//! about world units; tile size belongs to whoever maps world space onto it
//! (see [`CollisionConfig`](crate::config::CollisionConfig)).

/// What occupies one tile.
///
/// Diagonal walls fill the half of the tile named by their corner, split
/// along the diagonal that does not touch that corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileType {
    /// Walkable.
    #[default]
    Floor,
    /// Fully solid.
    Wall,
    /// Solid top-right half.
    WallNE,
    /// Solid top-left half.
    WallNW,
    /// Solid bottom-right half.
    WallSE,
    /// Solid bottom-left half.
    WallSW,
    /// Walkable; moves colliders standing on it to `layer`.
    Ramp {
        /// Destination collision layer.
        layer: u8,
    },
}

impl TileType {
    /// One of the four half-tile walls.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            TileType::WallNE | TileType::WallNW | TileType::WallSE | TileType::WallSW
        )
    }

    /// Blocks at least part of the tile.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, TileType::Wall) || self.is_diagonal()
    }

    /// Map glyph, as accepted by [`Terrain::from_rows`].
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Some(match glyph {
            '.' => TileType::Floor,
            '#' => TileType::Wall,
            '7' => TileType::WallNE,
            'F' => TileType::WallNW,
            'J' => TileType::WallSE,
            'L' => TileType::WallSW,
            '0'..='9' => TileType::Ramp {
                layer: glyph.to_digit(10).map_or(0, |d| d as u8),
            },
            _ => return None,
        })
    }
}

/// Tile map consumed by the collision and terrain-layer systems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    width: u32,
    height: u32,
    tiles: Vec<TileType>,
}

impl Terrain {
    /// All-floor terrain.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileType::Floor; width as usize * height as usize],
        }
    }

    /// Builds terrain from text rows, one glyph per tile.
    ///
    /// `.` floor, `#` wall, `7` NE, `F` NW, `J` SE, `L` SW, a digit is a ramp
    /// to that layer. Returns `None` on an unknown glyph or ragged rows.
    ///
    /// Note that `7` is already a glyph, so ramps to layer 7 cannot be
    /// expressed this way; use [`Terrain::set`].
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut tiles = Vec::with_capacity(width * rows.len());

        for row in rows {
            let before = tiles.len();
            for glyph in row.chars() {
                tiles.push(TileType::from_glyph(glyph)?);
            }
            if tiles.len() - before != width {
                return None;
            }
        }

        Some(Self {
            width: u32::try_from(width).ok()?,
            height: u32::try_from(rows.len()).ok()?,
            tiles,
        })
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// The tile at `(x, y)`, or `None` outside the map.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// The tile at `(x, y)`. Outside the map everything is [`TileType::Wall`].
    #[must_use]
    pub fn tile(&self, x: i32, y: i32) -> TileType {
        self.get(x, y).unwrap_or(TileType::Wall)
    }

    /// Replaces a tile. Returns `false` outside the map.
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_is_wall() {
        let terrain = Terrain::new(4, 3);
        assert_eq!(terrain.tile(0, 0), TileType::Floor);
        assert_eq!(terrain.tile(3, 2), TileType::Floor);
        assert_eq!(terrain.tile(4, 0), TileType::Wall);
        assert_eq!(terrain.tile(-1, 0), TileType::Wall);
        assert_eq!(terrain.get(0, 3), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut terrain = Terrain::new(2, 2);
        assert!(terrain.set(1, 0, TileType::WallNE));
        assert!(!terrain.set(2, 0, TileType::Wall));
        assert_eq!(terrain.tile(1, 0), TileType::WallNE);
        assert!(terrain.tile(1, 0).is_diagonal());
    }

    #[test]
    fn test_from_rows() {
        let terrain = Terrain::from_rows(&["#.7", "L2."]).unwrap();
        assert_eq!(terrain.width(), 3);
        assert_eq!(terrain.height(), 2);
        assert_eq!(terrain.tile(0, 0), TileType::Wall);
        assert_eq!(terrain.tile(2, 0), TileType::WallNE);
        assert_eq!(terrain.tile(0, 1), TileType::WallSW);
        assert_eq!(terrain.tile(1, 1), TileType::Ramp { layer: 2 });

        assert!(Terrain::from_rows(&["..", "."]).is_none());
        assert!(Terrain::from_rows(&["?"]).is_none());
    }
}
