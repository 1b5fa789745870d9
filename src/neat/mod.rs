pub mod common;
pub mod compatibility;
pub mod error;
pub mod genome;
pub mod innovation;
pub mod network;
pub mod population;
pub mod species;
pub mod vector;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// A generator that replays the same run for the same seed.
pub fn seeded_rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

pub fn entropy_rng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::from_entropy()
}
