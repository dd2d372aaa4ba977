use rand::{rngs::StdRng, seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub fn gen_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.rng.gen_range(0..len)
        }
    }

    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            low
        } else {
            self.rng.gen_range(low..high)
        }
    }

    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Draws from `Normal(mean, std_dev)`. A deviation that is not finite and positive returns the mean.
    pub fn gen_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }
}
