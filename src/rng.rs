//! A single seeded PRNG instance is threaded explicitly through the graph
//! builder and the balance planner so that a session is fully replay
//! deterministic from its seed. No implicit global RNG is used.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
