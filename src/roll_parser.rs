use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::all_consuming,
    sequence::separated_pair,
};

use crate::{dice::DiceSpec, error::ParseError};

/// Parses notation of the exact form `<digits>d<digits>`, e.g. `3d6` or `0d1`.
///
/// The `d` is case-sensitive and nothing else (signs, whitespace, modifiers)
/// is accepted anywhere in the input.
pub fn parse_dice(input: &str) -> Result<DiceSpec, ParseError> {
    let (_, (count, sides)) =
        all_consuming(dice_notation)
            .parse(input)
            .map_err(|_| ParseError::Malformed {
                notation: input.to_string(),
            })?;

    let overflow = |_| ParseError::Overflow {
        notation: input.to_string(),
    };
    let count = count.parse::<u32>().map_err(overflow)?;
    let sides = sides.parse::<u32>().map_err(overflow)?;

    Ok(DiceSpec { count, sides })
}

/// Checks notation without keeping the result, e.g. before offering it for sampling.
pub fn validate_notation(input: &str) -> Result<(), ParseError> {
    parse_dice(input).map(|_| ())
}

fn dice_notation(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(digit1, char('d'), digit1).parse(input)
}
