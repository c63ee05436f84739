use std::{fmt, rc::Rc};

use crate::{
    dice::{DiceInput, DiceSpec, roll_dice, roll_die},
    error::Result,
    statistics::roller::{RandomSource, Roller},
};

/// Computes the aggregate total of a derived [`Roll`].
pub trait Evaluate {
    fn total(&self) -> Result<i64>;
}

impl<F> Evaluate for F
where
    F: Fn() -> Result<i64>,
{
    fn total(&self) -> Result<i64> {
        (self)()
    }
}

/// A lazily evaluated set of dice.
///
/// Nothing is rolled until [`Roll::total`] or [`Roll::evaluate`] is called,
/// and every call rolls afresh. Cloning is cheap and shares the random source.
#[derive(Clone)]
pub struct Roll {
    spec: DiceSpec,
    random: Rc<dyn RandomSource>,
    evaluator: Option<Rc<dyn Evaluate>>,
}

impl Roll {
    pub fn new(spec: DiceSpec, random: Rc<dyn RandomSource>) -> Self {
        Self {
            spec,
            random,
            evaluator: None,
        }
    }

    pub fn with_evaluator(
        spec: DiceSpec,
        random: Rc<dyn RandomSource>,
        evaluator: impl Evaluate + 'static,
    ) -> Self {
        Self {
            spec,
            random,
            evaluator: Some(Rc::new(evaluator)),
        }
    }

    /// A roll with the same dice and random source, whose total comes from `evaluator`.
    pub fn derive(&self, evaluator: impl Evaluate + 'static) -> Self {
        Self::with_evaluator(self.spec, self.random.clone(), evaluator)
    }

    pub fn spec(&self) -> DiceSpec {
        self.spec
    }

    pub fn random(&self) -> &Rc<dyn RandomSource> {
        &self.random
    }

    pub fn is_derived(&self) -> bool {
        self.evaluator.is_some()
    }

    /// The aggregate value: the evaluator's result for derived rolls, otherwise
    /// the sum of the dice.
    pub fn total(&self) -> Result<i64> {
        match &self.evaluator {
            Some(evaluator) => evaluator.total(),
            None => roll_dice(self.spec.count, self.spec.sides, &*self.random),
        }
    }

    /// One face per die, always rolled from the dice themselves. Any evaluator is ignored.
    pub fn evaluate(&self) -> Vec<u32> {
        (0..self.spec.count)
            .map(|_| roll_die(self.spec.sides, &*self.random))
            .collect()
    }
}

impl fmt::Debug for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roll")
            .field("spec", &self.spec)
            .field("derived", &self.is_derived())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct RollBuilder {
    input: Option<DiceInput>,
    random: Option<Rc<dyn RandomSource>>,
    evaluator: Option<Rc<dyn Evaluate>>,
}

impl RollBuilder {
    pub fn new(input: impl Into<DiceInput>) -> Self {
        Self {
            input: Some(input.into()),
            ..Default::default()
        }
    }

    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Rc::new(random));
        self
    }

    pub fn shared_random(mut self, random: Rc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn evaluator(mut self, evaluator: impl Evaluate + 'static) -> Self {
        self.evaluator = Some(Rc::new(evaluator));
        self
    }

    /// Fails only if notation was given and does not parse.
    pub fn build(self) -> Result<Roll> {
        let spec = match &self.input {
            Some(input) => input.spec()?,
            None => DiceSpec::default(),
        };
        let random = self.random.unwrap_or_else(|| Rc::new(Roller::new()));

        Ok(Roll {
            spec,
            random,
            evaluator: self.evaluator,
        })
    }
}

/// Builds a roll that uses a freshly seeded [`Roller`].
pub fn roll(input: impl Into<DiceInput>) -> Result<Roll> {
    RollBuilder::new(input).build()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        error::{Error, ParseError},
        statistics::roller::Constant,
    };

    #[test]
    fn test_roll_stores_spec() {
        assert_eq!(roll((1, 6)).unwrap().spec(), DiceSpec::new(1, 6));
        assert_eq!(roll((3, 4)).unwrap().spec(), DiceSpec::new(3, 4));
        assert_eq!(roll("2d7").unwrap().spec(), DiceSpec::new(2, 7));
        assert_eq!(roll("12d20").unwrap().spec(), DiceSpec::new(12, 20));
    }

    #[test]
    fn test_roll_invalid_notation() {
        let err = roll("1d6x").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_roll_uses_given_random() {
        let high = RollBuilder::new("1d6").random(|| 0.9999).build().unwrap();
        assert_eq!(high.total().unwrap(), 6);
        let low = RollBuilder::new("1d6").random(Constant(0.0)).build().unwrap();
        assert_eq!(low.total().unwrap(), 1);
    }

    #[test]
    fn test_evaluate_faces() {
        for (count, sides) in [(1, 6), (2, 6), (3, 4), (12, 3)] {
            let roll = RollBuilder::new((count, sides))
                .random(Roller::test_rng())
                .build()
                .unwrap();
            for _ in 0..1000 {
                let faces = roll.evaluate();
                assert_eq!(faces.len(), count as usize);
                assert!(faces.iter().all(|face| (1..=sides).contains(face)));
            }
        }
    }

    #[test]
    fn test_total_in_range() {
        for notation in ["1d6", "2d6", "3d4", "12d3", "7d15"] {
            let roll = RollBuilder::new(notation)
                .random(Roller::test_rng())
                .build()
                .unwrap();
            let spec = roll.spec();
            let max = i64::from(spec.count * spec.sides);
            let total = roll.total().unwrap();
            assert!((i64::from(spec.count)..=max).contains(&total));
        }
    }

    #[test]
    fn test_total_rerolls_every_call() {
        let calls = Rc::new(Cell::new(0));
        let source = {
            let calls = calls.clone();
            move || {
                calls.set(calls.get() + 1);
                0.5
            }
        };
        let roll = RollBuilder::new("3d6").random(source).build().unwrap();
        roll.total().unwrap();
        roll.total().unwrap();
        roll.evaluate();
        assert_eq!(calls.get(), 9);
    }

    #[test]
    fn test_evaluator_overrides_total_only() {
        let roll = RollBuilder::new("2d6")
            .random(Constant(0.0))
            .evaluator(|| -> Result<i64> { Ok(42) })
            .build()
            .unwrap();
        assert!(roll.is_derived());
        assert_eq!(roll.total().unwrap(), 42);
        assert_eq!(roll.evaluate(), vec![1, 1]);
    }

    #[test]
    fn test_derive_keeps_spec_and_random() {
        let source = RollBuilder::new("4d8").random(Constant(0.0)).build().unwrap();
        let inner = source.clone();
        let derived = source.derive(move || -> Result<i64> { Ok(inner.total()? * 10) });
        assert_eq!(derived.spec(), DiceSpec::new(4, 8));
        assert!(Rc::ptr_eq(derived.random(), source.random()));
        assert_eq!(derived.total().unwrap(), 40);
        assert!(!source.is_derived());
    }

    #[test]
    fn test_zero_count_roll() {
        let roll = roll("0d6").unwrap();
        assert_eq!(roll.total().unwrap_err(), Error::NonPositiveCount { count: 0 });
        assert!(roll.evaluate().is_empty());
    }
}
