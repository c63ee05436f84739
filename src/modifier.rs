use std::{fmt, rc::Rc};

use crate::{
    dice::DiceSpec,
    error::{Error, Result},
    roll::{Evaluate, Roll},
    statistics::roller::{RandomSource, Roller},
};

/// Transforms a sequence of rolls into a new sequence of rolls.
///
/// Modifiers never roll anything themselves; they return derived rolls whose
/// totals are computed when asked for.
pub trait Modifier {
    fn apply(&self, rolls: Vec<Roll>) -> Vec<Roll>;
}

impl<F> Modifier for F
where
    F: Fn(Vec<Roll>) -> Vec<Roll>,
{
    fn apply(&self, rolls: Vec<Roll>) -> Vec<Roll> {
        (self)(rolls)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Up(i64),
    Down(i64),
}

struct Shifted {
    source: Roll,
    shift: Shift,
}

impl Evaluate for Shifted {
    fn total(&self) -> Result<i64> {
        let total = self.source.total()?;
        Ok(match self.shift {
            Shift::Up(delta) => total.saturating_add(delta),
            Shift::Down(delta) => total.saturating_sub(delta),
        })
    }
}

fn shift_each(rolls: Vec<Roll>, shift: Shift) -> Vec<Roll> {
    rolls
        .into_iter()
        .map(|source| {
            source.derive(Shifted {
                source: source.clone(),
                shift,
            })
        })
        .collect()
}

/// Adds `delta` to the total of every roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plus {
    pub delta: i64,
}

impl Modifier for Plus {
    fn apply(&self, rolls: Vec<Roll>) -> Vec<Roll> {
        shift_each(rolls, Shift::Up(self.delta))
    }
}

/// Subtracts `delta` from the total of every roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minus {
    pub delta: i64,
}

impl Modifier for Minus {
    fn apply(&self, rolls: Vec<Roll>) -> Vec<Roll> {
        shift_each(rolls, Shift::Down(self.delta))
    }
}

type Aggregate = Rc<dyn Fn(i64, i64) -> i64>;

struct Folded {
    sources: Vec<Roll>,
    aggregate: Aggregate,
    initial: i64,
}

impl Evaluate for Folded {
    fn total(&self) -> Result<i64> {
        let mut total = self.initial;
        for roll in &self.sources {
            total = (self.aggregate)(total, roll.total()?);
        }
        Ok(total)
    }
}

/// Collapses all rolls into one whose total left-folds the source totals.
///
/// The default aggregate is a sum that saturates at the `i64` bounds.
///
/// The combined roll has no dice of its own (its spec is `0d0`), so
/// [`Roll::evaluate`] on it yields no faces.
#[derive(Clone)]
pub struct Combine {
    aggregate: Aggregate,
    initial: i64,
}

impl Combine {
    pub fn new(aggregate: impl Fn(i64, i64) -> i64 + 'static, initial: i64) -> Self {
        Self {
            aggregate: Rc::new(aggregate),
            initial,
        }
    }

    pub fn initial(&self) -> i64 {
        self.initial
    }
}

impl Default for Combine {
    fn default() -> Self {
        Self::new(i64::saturating_add, 0)
    }
}

impl fmt::Debug for Combine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combine")
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

impl Modifier for Combine {
    fn apply(&self, rolls: Vec<Roll>) -> Vec<Roll> {
        let random: Rc<dyn RandomSource> = match rolls.first() {
            Some(first) => first.random().clone(),
            None => Rc::new(Roller::new()),
        };
        let folded = Folded {
            sources: rolls,
            aggregate: self.aggregate.clone(),
            initial: self.initial,
        };
        vec![Roll::with_evaluator(DiceSpec::default(), random, folded)]
    }
}

pub fn plus(delta: i64) -> Plus {
    Plus { delta }
}

pub fn minus(delta: i64) -> Minus {
    Minus { delta }
}

pub fn combine(aggregate: impl Fn(i64, i64) -> i64 + 'static, initial: i64) -> Combine {
    Combine::new(aggregate, initial)
}

/// Keeps the highest total.
pub fn advantage() -> Combine {
    Combine::new(std::cmp::max, i64::MIN)
}

/// Keeps the lowest total.
pub fn disadvantage() -> Combine {
    Combine::new(std::cmp::min, i64::MAX)
}

/// One argument to [`modify`]: either a roll or a modifier.
pub enum Operand {
    Roll(Roll),
    Modifier(Box<dyn Modifier>),
}

impl Operand {
    pub fn modifier(modifier: impl Modifier + 'static) -> Self {
        Operand::Modifier(Box::new(modifier))
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Roll(roll) => f.debug_tuple("Roll").field(roll).finish(),
            Operand::Modifier(_) => f.write_str("Modifier(..)"),
        }
    }
}

impl From<Roll> for Operand {
    fn from(value: Roll) -> Self {
        Operand::Roll(value)
    }
}

impl From<Plus> for Operand {
    fn from(value: Plus) -> Self {
        Operand::modifier(value)
    }
}

impl From<Minus> for Operand {
    fn from(value: Minus) -> Self {
        Operand::modifier(value)
    }
}

impl From<Combine> for Operand {
    fn from(value: Combine) -> Self {
        Operand::modifier(value)
    }
}

/// Applies every modifier, in order, to the rolls and returns the total of
/// the first resulting roll.
///
/// Rolls and modifiers may be interleaved freely; only their relative order
/// within each kind matters. Each modifier receives the whole sequence
/// produced by the previous one. Rolls left over after the last modifier are
/// ignored, so pipelines over several rolls normally end in a [`Combine`].
///
/// ```rust
/// # use tinydice::prelude::*;
/// let high = RollBuilder::new("1d6").random(Constant(0.999999)).build()?;
/// let low = RollBuilder::new("4d12").random(Constant(0.0)).build()?;
///
/// assert_eq!(modify(vec![high.clone().into(), plus(2).into()])?, 8);
/// assert_eq!(modify(vec![high.into(), low.into(), advantage().into()])?, 6);
/// # Ok::<(), tinydice::Error>(())
/// ```
pub fn modify(operands: Vec<Operand>) -> Result<i64> {
    let mut rolls = Vec::new();
    let mut modifiers = Vec::new();
    for operand in operands {
        match operand {
            Operand::Roll(roll) => rolls.push(roll),
            Operand::Modifier(modifier) => modifiers.push(modifier),
        }
    }

    if rolls.is_empty() {
        return Err(Error::NoRolls);
    }
    log::debug!(
        "Modifying {} roll(s) with {} modifier(s)",
        rolls.len(),
        modifiers.len()
    );

    let rolls = modifiers
        .iter()
        .fold(rolls, |rolls, modifier| modifier.apply(rolls));

    match rolls.first() {
        Some(roll) => roll.total(),
        None => Err(Error::NoRolls),
    }
}
