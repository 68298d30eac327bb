//! Dice: the only source of randomness in the simulator.
//!
//! Every resolution call takes a `&mut dyn DieRoller`, so a season is a pure
//! function of its seed. `Dice` is the production roller (ChaCha8), and
//! `ScriptedDice` replays fixed faces for scenario tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub const DIE_FACES: u8 = 6;

pub trait DieRoller {
    /// One die, uniform over `1..=faces`.
    fn roll(&mut self) -> u8;

    /// White, red, green, in that order.
    fn roll_triad(&mut self) -> DiceRoll {
        let white = self.roll();
        let red = self.roll();
        let green = self.roll();
        DiceRoll::new(white, red, green)
    }
}

#[derive(Debug, Clone)]
pub struct Dice {
    rng: ChaCha8Rng,
    faces: u8,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_faces(seed, DIE_FACES)
    }

    pub fn with_faces(seed: u64, faces: u8) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), faces: faces.max(1) }
    }

    /// Dice for one scheduled game, independent of every other game.
    pub fn for_game(season_seed: u64, day: u32, game_index: u32) -> Self {
        Self::from_seed(game_seed(season_seed, day, game_index))
    }
}

impl DieRoller for Dice {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=self.faces)
    }
}

/// Replays a fixed list of faces, wrapping around when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(faces: impl Into<Vec<u8>>) -> Self {
        let mut faces = faces.into();
        if faces.is_empty() {
            faces.push(1);
        }
        Self { faces, cursor: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DieRoller for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}

/// SplitMix64 finalizer over the season seed, day and game slot.
pub fn game_seed(season_seed: u64, day: u32, game_index: u32) -> u64 {
    let mut z = season_seed
        ^ (u64::from(day)).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (u64::from(game_index)).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The three dice of one run-resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub white: u8,
    pub red: u8,
    pub green: u8,
}

impl DiceRoll {
    pub fn new(white: u8, red: u8, green: u8) -> Self {
        Self { white, red, green }
    }

    /// White, red and green read as a three-digit number.
    pub fn triad(&self) -> u16 {
        u16::from(self.white) * 100 + u16::from(self.red) * 10 + u16::from(self.green)
    }

    pub fn sum(&self) -> u8 {
        self.white + self.red + self.green
    }

    pub fn is_triples(&self) -> bool {
        self.white == self.red && self.red == self.green
    }

    /// Any two dice equal (triples count too).
    pub fn is_doubles(&self) -> bool {
        self.white_pairs() || self.red == self.green
    }

    pub fn white_pairs(&self) -> bool {
        self.white == self.red || self.white == self.green
    }

    /// `(pair value, odd die)` for the power chart: white pairs with red
    /// first, then with green.
    pub fn power_key(&self) -> Option<(u8, u8)> {
        if self.white == self.red {
            Some((self.white, self.green))
        } else if self.white == self.green {
            Some((self.white, self.red))
        } else {
            None
        }
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.white, self.red, self.green)
    }
}
