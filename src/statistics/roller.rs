use std::cell::RefCell;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A source of uniformly distributed floats in `[0, 1)`.
///
/// Every die draw consumes exactly one value. Returning values outside
/// `[0, 1)` is a contract violation and yields out-of-range faces.
pub trait RandomSource {
    fn random(&self) -> f64;
}

impl<F> RandomSource for F
where
    F: Fn() -> f64,
{
    fn random(&self) -> f64 {
        (self)()
    }
}

/// The default random source, a seedable `StdRng`.
#[derive(Debug)]
pub struct Roller {
    rng: RefCell<StdRng>,
}

impl Roller {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let rng = StdRng::from_os_rng();
        Roller {
            rng: RefCell::new(rng),
        }
    }

    /// Creates a new `Roller` seeded from this one, so a seeded parent yields
    /// reproducible but independent children.
    pub fn fork(&self) -> Self {
        let mut seed = [0u8; 32];
        self.rng.borrow_mut().fill(&mut seed);
        Roller {
            rng: RefCell::new(StdRng::from_seed(seed)),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Roller {
            rng: RefCell::new(rng),
        }
    }

    #[cfg(test)]
    pub fn test_rng() -> Self {
        Self::from_seed(42)
    }
}

impl RandomSource for Roller {
    fn random(&self) -> f64 {
        self.rng.borrow_mut().random::<f64>()
    }
}

/// Always yields the same value. Handy for pinning rolls to a known face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl RandomSource for Constant {
    fn random(&self) -> f64 {
        self.0
    }
}
