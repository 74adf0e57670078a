//! Named, independently seeded random number streams.
//!
//! Each part of the engine draws from its own stream, identified by a zero-sized
//! type declared with [`define_rng!`]. A stream is created lazily the first time
//! it is used, seeded with the model's base seed plus a hash of the stream's
//! name, so adding draws to one stream never perturbs another and the same base
//! seed always reproduces the same run.

use std::any::{Any, TypeId};
use std::cell::{RefCell, RefMut};
use std::hash::Hasher;

use log::trace;
use rustc_hash::FxHasher;

use crate::rand::distr::uniform::{SampleRange, SampleUniform};
use crate::rand::distr::Distribution;
use crate::rand::{Rng, SeedableRng};
use crate::HashMap;

/// Use this to define a unique type which will be used as a key to retrieve
/// an independent rng stream.
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        #[derive(Copy, Clone)]
        struct $random_id;

        impl $crate::random::RngId for $random_id {
            type RngType = $crate::rand::rngs::SmallRng;

            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }
    };
}
pub use define_rng;

pub trait RngId: Copy + Clone + 'static {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// Any `SeedableRng` can be stored; the concrete type is recovered by downcasting.
struct RngHolder {
    rng: Box<dyn Any>,
}

/// Stores the base seed and the lazily created streams. The streams live in a
/// `RefCell` so sampling only needs a shared borrow of the owner.
pub struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

impl RngData {
    #[must_use]
    pub fn new(base_seed: u64) -> RngData {
        RngData {
            base_seed,
            rng_holders: RefCell::new(HashMap::default()),
        }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }
}

impl Default for RngData {
    fn default() -> Self {
        RngData::new(0)
    }
}

fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_bytes());
    hasher.finish()
}

fn get_rng<R: RngId>(data: &RngData) -> RefMut<'_, R::RngType> {
    let rng_holders = data
        .rng_holders
        .try_borrow_mut()
        .expect("random number generator is already borrowed");
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for {}",
                    data.base_seed,
                    R::get_name()
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        data.base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .expect("RngId maps to a single generator type")
    })
}

/// Anything that owns an [`RngData`].
pub trait RngSource {
    fn rng_data(&self) -> &RngData;
    fn rng_data_mut(&mut self) -> &mut RngData;
}

/// Sampling helpers available on every [`RngSource`], in particular the `Model`.
pub trait ModelRandomExt: RngSource {
    /// Sets the base seed and discards existing streams so they are re-seeded on next use.
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module");
        let data = self.rng_data_mut();
        data.base_seed = base_seed;
        data.rng_holders.get_mut().clear();
    }

    /// Applies `sampler` to the stream identified by `R`.
    fn sample<R: RngId, T>(&self, _rng_id: R, sampler: impl FnOnce(&mut R::RngType) -> T) -> T {
        let mut rng = get_rng::<R>(self.rng_data());
        sampler(&mut rng)
    }

    /// Draws one value from `distribution` using the stream identified by `R`.
    fn sample_distr<R: RngId, T>(&self, _rng_id: R, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng,
    {
        let mut rng = get_rng::<R>(self.rng_data());
        distribution.sample::<R::RngType>(&mut rng)
    }

    /// Draws a value uniformly from `range` using the stream identified by `R`.
    fn sample_range<R: RngId, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Returns true with probability `p`.
    fn sample_bool<R: RngId>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }
}

impl<T: RngSource> ModelRandomExt for T {}
