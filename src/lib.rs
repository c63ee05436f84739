pub mod dice;
pub mod error;
pub mod modifier;
pub mod roll;
pub mod roll_parser;
pub mod statistics;

pub use error::{Error, ParseError, Result};

pub mod prelude {
    pub use crate::{
        dice::{DiceInput, DiceSpec, d, dice, draw, roll_dice, roll_die, roll_from_str},
        error::{Error, ParseError},
        modifier::{
            Combine, Minus, Modifier, Operand, Plus, advantage, combine, disadvantage, minus,
            modify, plus,
        },
        roll::{Evaluate, Roll, RollBuilder, roll},
        roll_parser::{parse_dice, validate_notation},
        statistics::{
            roller::{Constant, RandomSource, Roller},
            sample::{Sample, SampleSummary, sample},
        },
    };
}
