use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightInit {
    /// U(-1/sqrt(fan_in), 1/sqrt(fan_in)) for weights and biases alike.
    #[default]
    FanInUniform,

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `[fan_in, fan_out]` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        match self {
            WeightInit::FanInUniform => {
                let bound = fan_in_bound(shape.0);
                Array2::random_using(shape, Uniform::new_inclusive(-bound, bound), rng)
            }
            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize biases for a layer with `fan_in` inputs
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let bound = fan_in_bound(fan_in);
                Array1::random_using(size, Uniform::new_inclusive(-bound, bound), rng)
            }
            WeightInit::Zeros => Array1::zeros(size),
        }
    }
}

fn fan_in_bound(fan_in: usize) -> f32 {
    1.0 / (fan_in.max(1) as f32).sqrt()
}

/// The RNG every seeded construction in this crate draws from.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
