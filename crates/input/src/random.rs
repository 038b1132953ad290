//! Random sequence generation.

use rand::Rng;
use tracing::debug;

use crate::error::InputError;

/// Count and inclusive value range of a random sequence.
pub use sv_common::RandomSettings as RandomSpec;

/// Generate `spec.count` values uniformly from `spec.min..=spec.max`.
pub fn generate<R: Rng + ?Sized>(spec: &RandomSpec, rng: &mut R) -> Result<Vec<i32>, InputError> {
    if spec.count == 0 {
        return Err(InputError::InvalidSpec {
            reason: "count must be > 0".to_string(),
        });
    }
    if spec.min > spec.max {
        return Err(InputError::InvalidSpec {
            reason: format!("min {} is greater than max {}", spec.min, spec.max),
        });
    }

    let values: Vec<i32> = (0..spec.count)
        .map(|_| rng.gen_range(spec.min..=spec.max))
        .collect();
    debug!(count = spec.count, min = spec.min, max = spec.max, "Generated random sequence");
    Ok(values)
}

/// [`generate`] using the thread-local RNG.
pub fn generate_random(spec: &RandomSpec) -> Result<Vec<i32>, InputError> {
    generate(spec, &mut rand::thread_rng())
}
