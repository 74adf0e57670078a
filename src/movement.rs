//! Strategies for moving people between ticks.
//!
//! Infection never polls positions; moving a person only changes who counts as
//! their neighbor the next time someone near them is infected.

use rand_distr::Normal;

use crate::error::ContagionError;
use crate::model::Model;
use crate::parameters::MovementConfig;
use crate::people::PersonId;
use crate::position::Position;
use crate::random::ModelRandomExt;
use crate::define_rng;

define_rng!(MovementRng);

/// Decides where each person goes at the end of every tick.
pub trait MovementModel {
    /// The new position for `person`, or `None` to stay put.
    fn next_position(&self, model: &Model, person: PersonId, current: Position)
        -> Option<Position>;

    /// A stationary model lets the `Model` skip the per-person pass entirely.
    fn is_stationary(&self) -> bool {
        false
    }
}

/// Nobody moves.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stationary;

impl MovementModel for Stationary {
    fn next_position(&self, _: &Model, _: PersonId, _: Position) -> Option<Position> {
        None
    }

    fn is_stationary(&self) -> bool {
        true
    }
}

/// Each tick, every person takes an independent Gaussian step on each axis, clamped to the
/// world's extent.
#[derive(Copy, Clone, Debug)]
pub struct RandomWalk {
    step: Normal<f64>,
}

impl RandomWalk {
    /// # Errors
    ///
    /// Returns `ContagionError::InvalidParameter` if `step_std_dev` is negative or not finite.
    pub fn new(step_std_dev: f64) -> Result<RandomWalk, ContagionError> {
        let step = Normal::new(0.0, step_std_dev)
            .map_err(|e| ContagionError::InvalidParameter(format!("step_std_dev: {e}")))?;
        Ok(RandomWalk { step })
    }
}

impl MovementModel for RandomWalk {
    fn next_position(
        &self,
        model: &Model,
        _person: PersonId,
        current: Position,
    ) -> Option<Position> {
        let (half_width, half_height) = model.extent();
        let dx = model.sample_distr(MovementRng, self.step);
        let dy = model.sample_distr(MovementRng, self.step);
        Some(Position::new(
            (current.x + dx).clamp(-half_width, half_width),
            (current.y + dy).clamp(-half_height, half_height),
        ))
    }
}

pub(crate) fn from_config(config: MovementConfig) -> Result<Box<dyn MovementModel>, ContagionError> {
    Ok(match config {
        MovementConfig::Stationary => Box::new(Stationary),
        MovementConfig::RandomWalk { step_std_dev } => Box::new(RandomWalk::new(step_std_dev)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ModelParameters;
    use crate::people::ModelPeopleExt;

    #[test]
    fn stationary_never_moves() {
        let model = Model::new(&ModelParameters::default()).unwrap();
        let person = model.people()[0].id();
        assert!(Stationary
            .next_position(&model, person, Position::ORIGIN)
            .is_none());
        assert!(Stationary.is_stationary());
    }

    #[test]
    fn random_walk_stays_in_bounds() {
        let parameters = ModelParameters {
            population: 50,
            half_width: 2.0,
            half_height: 3.0,
            movement: MovementConfig::RandomWalk { step_std_dev: 10.0 },
            ..ModelParameters::default()
        };
        let mut model = Model::new(&parameters).unwrap();
        model.run(20);
        for person in model.people() {
            let p = person.position();
            assert!((-2.0..=2.0).contains(&p.x));
            assert!((-3.0..=3.0).contains(&p.y));
        }
        // Everyone is still findable through the spatial index at their new position.
        for person in model.people() {
            assert!(model
                .query_radius(person.position(), 1e-9)
                .contains(&person.id()));
        }
        let first = model.people()[0].id();
        assert!(!model.neighbors(first).contains(&first));
    }

    #[test]
    fn zero_step_random_walk_stays_put() {
        let walk = RandomWalk::new(0.0).unwrap();
        let model = Model::new(&ModelParameters::default()).unwrap();
        let person = model.people()[0].id();
        let start = Position::new(1.0, -1.0);
        assert_eq!(walk.next_position(&model, person, start), Some(start));
    }

    #[test]
    fn negative_step_rejected() {
        assert!(RandomWalk::new(-1.0).is_err());
    }
}
