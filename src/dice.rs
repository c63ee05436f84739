use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, ParseError, Result},
    roll_parser::parse_dice,
    statistics::roller::{RandomSource, Roller},
};

/// `count` dice with `sides` faces each. Displayed and parsed as `NdM`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[display("{count}d{sides}")]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
}

impl DiceSpec {
    pub fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }

    pub fn roll(&self, random: &(impl RandomSource + ?Sized)) -> Result<i64> {
        roll_dice(self.count, self.sides, random)
    }
}

impl FromStr for DiceSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

/// The two ways of naming a set of dice: notation such as `"2d6"`, or an explicit spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceInput {
    Notation(String),
    Explicit(DiceSpec),
}

impl DiceInput {
    pub fn spec(&self) -> Result<DiceSpec> {
        match self {
            DiceInput::Notation(notation) => Ok(parse_dice(notation)?),
            DiceInput::Explicit(spec) => Ok(*spec),
        }
    }
}

impl From<&str> for DiceInput {
    fn from(value: &str) -> Self {
        DiceInput::Notation(value.to_string())
    }
}

impl From<String> for DiceInput {
    fn from(value: String) -> Self {
        DiceInput::Notation(value)
    }
}

impl From<DiceSpec> for DiceInput {
    fn from(value: DiceSpec) -> Self {
        DiceInput::Explicit(value)
    }
}

impl From<(u32, u32)> for DiceInput {
    fn from(value: (u32, u32)) -> Self {
        DiceInput::Explicit(value.into())
    }
}

/// Maps `r` in `[0, 1)` onto the integers `lower..=upper`:
/// `floor(lower + (upper + 1 - lower) * r)`.
pub fn draw(lower: u32, upper: u32, r: f64) -> u32 {
    let lower = f64::from(lower);
    let upper = f64::from(upper);
    (lower + (upper + 1.0 - lower) * r).floor() as u32
}

/// Rolls a single die. A zero-sided die always shows 0.
pub fn roll_die(sides: u32, random: &(impl RandomSource + ?Sized)) -> u32 {
    let r = random.random();
    if sides == 0 {
        return 0;
    }
    draw(1, sides, r)
}

/// Sums `count` independent dice of `sides` faces, saturating at `i64::MAX`.
pub fn roll_dice(count: u32, sides: u32, random: &(impl RandomSource + ?Sized)) -> Result<i64> {
    if count == 0 {
        return Err(Error::NonPositiveCount { count });
    }

    let total = (0..count).fold(0, |total, _| add_face(total, roll_die(sides, random)));
    log::trace!("Rolled {count}d{sides} = {total}");

    Ok(total)
}

fn add_face(total: i64, face: u32) -> i64 {
    total.saturating_add(i64::from(face))
}

pub fn roll_from_str(notation: &str, random: &(impl RandomSource + ?Sized)) -> Result<i64> {
    parse_dice(notation)?.roll(random)
}

/// Rolls either notation or an explicit `(count, sides)` pair.
pub fn d(input: impl Into<DiceInput>, random: &(impl RandomSource + ?Sized)) -> Result<i64> {
    input.into().spec()?.roll(random)
}

/// Rolls with a freshly seeded [`Roller`].
pub fn dice(count: u32, sides: u32) -> Result<i64> {
    roll_dice(count, sides, &Roller::new())
}
