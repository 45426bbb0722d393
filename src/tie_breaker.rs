use std::sync::Mutex;

use rand::{rngs::StdRng, RngCore, SeedableRng};

/// The source of randomness used to settle rounds by coin toss.
///
/// This lives in managed state so that it can be replaced by a seeded
/// generator, making coin tosses reproducible.
pub struct TieBreaker {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl TieBreaker {
    /// Wrap the given generator.
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// A generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// A deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Run `f` with exclusive access to the generator.
    ///
    /// The lock is released when `f` returns, so `f` must not await.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        // The generator has no invariants a panic could break.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(rng.as_mut())
    }
}

impl Default for TieBreaker {
    fn default() -> Self {
        Self::from_entropy()
    }
}
