//! Colour keys for generated geometry.
//!
//! Geometry only carries a [`ColorKey`]; turning it into an actual colour is
//! left to whatever draws the scene.

use rand::Rng;
use serde::Serialize;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Leaf colour groups, cycled through by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Spring,
    Summer,
    AutumnYellow,
    AutumnOrange,
    AutumnRed,
}

impl Season {
    pub const ALL: [Season; 5] = [
        Season::Spring,
        Season::Summer,
        Season::AutumnYellow,
        Season::AutumnOrange,
        Season::AutumnRed,
    ];

    /// Wraps any palette index onto the cycle.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Three shades, dark to light.
    pub fn shades(self) -> [Rgb; 3] {
        match self {
            Season::Spring => [Rgb(0x4C, 0xAF, 0x50), Rgb(0x66, 0xBB, 0x6A), Rgb(0x81, 0xC7, 0x84)],
            Season::Summer => [Rgb(0x8B, 0xC3, 0x4A), Rgb(0x9C, 0xCC, 0x65), Rgb(0xAE, 0xD5, 0x81)],
            Season::AutumnYellow => [Rgb(0xFF, 0xC1, 0x07), Rgb(0xFF, 0xD5, 0x4F), Rgb(0xFF, 0xEE, 0x58)],
            Season::AutumnOrange => [Rgb(0xFF, 0x98, 0x00), Rgb(0xFF, 0xB7, 0x4D), Rgb(0xFF, 0xCC, 0x02)],
            Season::AutumnRed => [Rgb(0xF4, 0x43, 0x36), Rgb(0xEF, 0x53, 0x50), Rgb(0xE5, 0x73, 0x73)],
        }
    }
}

/// What a piece of geometry should be coloured as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorKey {
    /// Wood, darker near the trunk.
    Bark { level: u32 },
    Leaf { season: Season, shade: u8 },
    Blossom,
}

impl ColorKey {
    /// Random shade from the season selected by `palette_index`.
    pub fn random_leaf<R: Rng>(palette_index: usize, rng: &mut R) -> Self {
        ColorKey::Leaf {
            season: Season::from_index(palette_index),
            shade: rng.gen_range(0..3),
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            ColorKey::Bark { level } => bark(level),
            ColorKey::Leaf { season, shade } => season.shades()[shade as usize % 3],
            ColorKey::Blossom => BLOSSOM,
        }
    }
}

pub const BLOSSOM: Rgb = Rgb(0xFF, 0xB6, 0xC1);
pub const BLOSSOM_CENTER: Rgb = Rgb(0xFF, 0xD7, 0x00);
pub const SEED: Rgb = Rgb(0x8B, 0x45, 0x13);
pub const GROUND: Rgb = Rgb(0x8B, 0x73, 0x55);
pub const GRASS: Rgb = Rgb(0x4C, 0xAF, 0x50);

/// Brown ramp that lightens and desaturates with depth.
fn bark(level: u32) -> Rgb {
    let level = level.min(20) as f32;
    let hue = 25.0 + level * 5.0;
    let saturation = (60.0 - level * 8.0).max(20.0);
    let lightness = (25.0 - level * 2.0).max(15.0);
    hsl_to_rgb(hue, saturation / 100.0, lightness / 100.0)
}

fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = (hue.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(to_u8(r), to_u8(g), to_u8(b))
}
