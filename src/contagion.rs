//! Contagion descriptors, individual bouts of infection, and reproduction-number accounting.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ContagionError;
use crate::numeric::mean;
use crate::HashMap;

/// Index of a registered [`ContagionType`] within its `Model`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContagionId(pub(crate) usize);

impl ContagionId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The fixed constants describing one kind of contagion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContagionType {
    pub name: String,
    /// Mean of the Gaussian from which each bout's infectious duration (in ticks) is drawn.
    pub mean_duration: f64,
    pub duration_std_dev: f64,
    /// Chance that a single tick of contact with a neighbor transmits the contagion.
    pub transmission_probability: f64,
    /// Chance per tick that an immune person loses their immunity.
    pub immunity_loss_probability: f64,
}

impl ContagionType {
    #[must_use]
    pub fn new(
        name: &str,
        mean_duration: f64,
        duration_std_dev: f64,
        transmission_probability: f64,
        immunity_loss_probability: f64,
    ) -> ContagionType {
        ContagionType {
            name: name.to_string(),
            mean_duration,
            duration_std_dev,
            transmission_probability,
            immunity_loss_probability,
        }
    }

    /// A respiratory virus with a fortnight-long infectious period and waning immunity.
    #[must_use]
    pub fn covid() -> ContagionType {
        ContagionType::new("COVID", 15.0, 3.5, 0.01, 0.02)
    }

    /// # Errors
    ///
    /// Returns `ContagionError::InvalidParameter` if any constant is out of range.
    pub fn validate(&self) -> Result<(), ContagionError> {
        if self.name.is_empty() {
            return Err("contagion name must not be empty".into());
        }
        if !(self.mean_duration.is_finite() && self.mean_duration > 0.0) {
            return Err(format!("{}: mean_duration must be positive", self.name).into());
        }
        if !(self.duration_std_dev.is_finite() && self.duration_std_dev >= 0.0) {
            return Err(format!("{}: duration_std_dev must be non-negative", self.name).into());
        }
        for (field, p) in [
            ("transmission_probability", self.transmission_probability),
            ("immunity_loss_probability", self.immunity_loss_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{}: {field} must be in [0, 1]", self.name).into());
            }
        }
        Ok(())
    }

    /// Draws a personal infectious duration. Draws below one tick are raised to one tick so a
    /// cure is never due in the tick the infection started.
    pub fn sample_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let duration = match Normal::new(self.mean_duration, self.duration_std_dev) {
            Ok(normal) => normal.sample(rng),
            Err(_) => self.mean_duration,
        };
        duration.max(1.0)
    }

    /// Probability that at least one of `duration` independent per-tick contacts transmits.
    #[must_use]
    pub fn onward_probability(&self, duration: f64) -> f64 {
        (1.0 - (1.0 - self.transmission_probability).powf(duration)).clamp(0.0, 1.0)
    }

    /// Converts a uniform draw `u` in `(0, 1]` into the number of ticks until immunity is lost,
    /// matching the waiting time of a per-tick Bernoulli trial with the immunity-loss
    /// probability. Returns infinity when immunity is permanent.
    #[must_use]
    pub fn immunity_loss_delay(&self, u: f64) -> f64 {
        let q = self.immunity_loss_probability;
        if q <= 0.0 {
            return f64::INFINITY;
        }
        if q >= 1.0 {
            return 1.0;
        }
        // ln_1p keeps tiny q from rounding ln(1 - q) to zero.
        let delay = u.ln() / (-q).ln_1p();
        if delay.is_finite() {
            delay.max(1.0)
        } else {
            f64::INFINITY
        }
    }
}

impl fmt::Display for ContagionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Identifies one bout of infection for the whole life of the simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

/// Per-contagion record of onward infections attributed to instances during the current tick.
#[derive(Clone, Debug, Default)]
pub struct ReproductionAccumulator {
    counts: HashMap<InstanceId, u32>,
}

impl ReproductionAccumulator {
    #[must_use]
    pub fn new() -> ReproductionAccumulator {
        ReproductionAccumulator::default()
    }

    pub fn record(&mut self, instance: InstanceId, onward_infections: u32) {
        self.counts.insert(instance, onward_infections);
    }

    /// Mean onward infections over the recorded instances, or 1 when nothing was recorded.
    #[must_use]
    pub fn get_r(&self) -> f64 {
        let values: Vec<f64> = self.counts.values().map(|&c| f64::from(c)).collect();
        mean(&values).unwrap_or(1.0)
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// One person's bout of a contagion.
#[derive(Clone, Debug, PartialEq)]
pub struct ContagionInstance {
    pub(crate) id: InstanceId,
    pub(crate) contagion: ContagionId,
    pub(crate) duration: f64,
    pub(crate) infected_at: u64,
    pub(crate) onward_infections: u32,
}

impl ContagionInstance {
    pub(crate) fn new(
        id: InstanceId,
        contagion: ContagionId,
        duration: f64,
        infected_at: u64,
    ) -> ContagionInstance {
        ContagionInstance {
            id,
            contagion,
            duration,
            infected_at,
            onward_infections: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[must_use]
    pub fn contagion(&self) -> ContagionId {
        self.contagion
    }

    /// The sampled infectious duration, in ticks.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn infected_at(&self) -> u64 {
        self.infected_at
    }

    /// Ticks since infection as of tick `now`.
    #[must_use]
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.infected_at)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_cured(&self, now: u64) -> bool {
        self.elapsed(now) as f64 > self.duration
    }

    #[must_use]
    pub fn onward_infections(&self) -> u32 {
        self.onward_infections
    }

    pub(crate) fn record_onward_infection(&mut self) {
        self.onward_infections += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn covid_is_valid() {
        assert!(ContagionType::covid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_probabilities() {
        let mut contagion = ContagionType::covid();
        contagion.transmission_probability = 1.5;
        assert!(matches!(
            contagion.validate(),
            Err(ContagionError::InvalidParameter(_))
        ));

        let mut contagion = ContagionType::covid();
        contagion.duration_std_dev = -1.0;
        assert!(contagion.validate().is_err());
    }

    #[test]
    fn zero_std_dev_gives_mean_duration() {
        let contagion = ContagionType::new("flu", 15.0, 0.0, 0.1, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(contagion.sample_duration(&mut rng), 15.0);
        }
    }

    #[test]
    fn short_durations_are_raised_to_one_tick() {
        let contagion = ContagionType::new("blip", 0.1, 0.0, 0.1, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(contagion.sample_duration(&mut rng), 1.0);
    }

    #[test]
    fn onward_probability() {
        let never = ContagionType::new("never", 10.0, 0.0, 0.0, 0.0);
        assert_eq!(never.onward_probability(10.0), 0.0);

        let always = ContagionType::new("always", 10.0, 0.0, 1.0, 0.0);
        assert_eq!(always.onward_probability(10.0), 1.0);

        let half = ContagionType::new("half", 2.0, 0.0, 0.5, 0.0);
        assert_almost_eq!(half.onward_probability(2.0), 0.75, 1e-12);
    }

    #[test]
    fn immunity_loss_delay_extremes() {
        let permanent = ContagionType::new("permanent", 10.0, 0.0, 0.1, 0.0);
        assert_eq!(permanent.immunity_loss_delay(0.5), f64::INFINITY);
        assert_eq!(permanent.immunity_loss_delay(1.0), f64::INFINITY);

        let fleeting = ContagionType::new("fleeting", 10.0, 0.0, 0.1, 1.0);
        assert_eq!(fleeting.immunity_loss_delay(0.5), 1.0);
        assert_eq!(fleeting.immunity_loss_delay(1.0), 1.0);
    }

    #[test]
    fn immunity_loss_delay_tiny_probability() {
        let lasting = ContagionType::new("lasting", 10.0, 0.0, 0.1, 1e-17);
        assert!(lasting.immunity_loss_delay(0.5) > 1e6);
        assert_eq!(lasting.immunity_loss_delay(1.0), 1.0);

        let vanishing = ContagionType::new("vanishing", 10.0, 0.0, 0.1, f64::MIN_POSITIVE);
        assert_eq!(vanishing.immunity_loss_delay(f64::MIN_POSITIVE), f64::INFINITY);
    }

    #[test]
    fn immunity_loss_delay_inverse_cdf() {
        let contagion = ContagionType::new("c", 10.0, 0.0, 0.1, 0.5);
        // ln(1/8) / ln(1/2) = 3
        assert_almost_eq!(contagion.immunity_loss_delay(0.125), 3.0, 1e-12);
        // u = 1 would be zero ticks; it is raised to one.
        assert_eq!(contagion.immunity_loss_delay(1.0), 1.0);
    }

    #[test]
    fn accumulator_defaults_to_one() {
        let accumulator = ReproductionAccumulator::new();
        assert!(accumulator.is_empty());
        assert_eq!(accumulator.get_r(), 1.0);
    }

    #[test]
    fn accumulator_mean_and_reset() {
        let mut accumulator = ReproductionAccumulator::new();
        accumulator.record(InstanceId(0), 0);
        accumulator.record(InstanceId(1), 3);
        accumulator.record(InstanceId(2), 3);
        assert_almost_eq!(accumulator.get_r(), 2.0, 1e-12);

        // Re-recording an instance replaces its count.
        accumulator.record(InstanceId(0), 6);
        assert_eq!(accumulator.len(), 3);
        assert_almost_eq!(accumulator.get_r(), 4.0, 1e-12);

        accumulator.reset();
        assert_eq!(accumulator.get_r(), 1.0);
    }

    #[test]
    fn instance_cure_check() {
        let instance = ContagionInstance::new(InstanceId(0), ContagionId(0), 4.5, 10);
        assert_eq!(instance.elapsed(12), 2);
        assert!(!instance.is_cured(14));
        assert!(instance.is_cured(15));
    }
}
