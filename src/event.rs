//! The three kinds of scheduled state transition.
//!
//! Events are created when a person changes state and fire once, at the tick
//! they were scheduled for. Firing is total: an event whose target has already
//! moved out of the expected state does nothing.

use crate::contagion::{ContagionId, InstanceId};
use crate::model::Model;
use crate::people::{ModelPeopleExt, PersonId};

/// The bout of infection credited when an `Infect` event succeeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InfectionSource {
    pub person: PersonId,
    pub instance: InstanceId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Attempt to infect `target` with `contagion`.
    Infect {
        contagion: ContagionId,
        source: Option<InfectionSource>,
        target: PersonId,
    },
    /// Move `instance` from `person`'s active set to their immunities.
    Cure {
        person: PersonId,
        instance: InstanceId,
    },
    /// Drop the immunity that `instance` granted `person` against `contagion`.
    LoseImmunity {
        person: PersonId,
        contagion: ContagionId,
        instance: InstanceId,
    },
}

impl Event {
    pub fn fire(self, model: &mut Model) {
        match self {
            Event::Infect {
                contagion,
                source,
                target,
            } => {
                if model.infect_with(target, contagion) {
                    if let Some(source) = source {
                        model.attribute_onward_infection(source);
                    }
                }
            }
            Event::Cure { person, instance } => {
                model.cure(person, instance);
            }
            Event::LoseImmunity {
                person,
                contagion,
                instance,
            } => {
                model.lose_immunity(person, contagion, instance);
            }
        }
    }
}
