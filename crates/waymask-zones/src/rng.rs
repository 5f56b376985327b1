use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seeded generator owned by a single zone construction.
///
/// ChaCha20 keeps the stream identical across platforms and rand releases.
/// Deliberately not `Clone`: one seed, one zone.
#[derive(Debug)]
pub struct DecoyRng(ChaCha20Rng);

impl DecoyRng {
    pub fn new(seed: i64) -> Self {
        Self(ChaCha20Rng::seed_from_u64(seed as u64))
    }

    /// Uniform in [0, 360).
    pub fn bearing_deg(&mut self) -> f64 {
        self.0.gen_range(0.0..360.0)
    }

    /// Uniform in [0, max_km]. A non-positive or NaN bound yields 0 without a draw.
    pub fn displacement_km(&mut self, max_km: f64) -> f64 {
        if !(max_km > 0.0) {
            return 0.0;
        }
        self.0.gen_range(0.0..=max_km)
    }
}
