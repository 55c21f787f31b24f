use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn init_test() {
    drop(env_logger::builder().is_test(true).try_init());
}

/// Deterministic RNG so randomised tests replay the same operation sequence.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
