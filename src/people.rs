//! People and the infection state machine.
//!
//! For each contagion a person is in exactly one of three states:
//!
//! * **Susceptible**: no record of the contagion.
//! * **Active**: an instance of the contagion is in their active set.
//! * **Immune**: the cured instance sits in their immunities.
//!
//! `infect_with` moves Susceptible to Active and schedules the cure plus every
//! onward infection the new instance will cause; the cure moves Active to Immune
//! and schedules the loss of immunity; losing immunity returns the person to
//! Susceptible.

use std::fmt;

use log::trace;

use crate::contagion::{ContagionId, ContagionInstance, InstanceId};
use crate::event::{Event, InfectionSource};
use crate::model::Model;
use crate::parameters::ReproductionAccounting;
use crate::position::Position;
use crate::random::ModelRandomExt;
use crate::define_rng;

define_rng!(DurationRng);
define_rng!(TransmissionRng);
define_rng!(ImmunityRng);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Person {
    id: PersonId,
    pub(crate) position: Position,
    // At most one instance per contagion in each list, and never the same contagion in both.
    pub(crate) active: Vec<ContagionInstance>,
    pub(crate) immunities: Vec<ContagionInstance>,
}

impl Person {
    pub(crate) fn new(id: PersonId, position: Position) -> Person {
        Person {
            id,
            position,
            active: Vec::new(),
            immunities: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn active(&self) -> &[ContagionInstance] {
        &self.active
    }

    #[must_use]
    pub fn immunities(&self) -> &[ContagionInstance] {
        &self.immunities
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        !self.active.is_empty()
    }

    #[must_use]
    pub fn active_instance(&self, contagion: ContagionId) -> Option<&ContagionInstance> {
        self.active.iter().find(|i| i.contagion == contagion)
    }

    #[must_use]
    pub fn is_infected_with(&self, contagion: ContagionId) -> bool {
        self.active_instance(contagion).is_some()
    }

    #[must_use]
    pub fn is_immune_to(&self, contagion: ContagionId) -> bool {
        self.immunities.iter().any(|i| i.contagion == contagion)
    }

    /// The contagions this person can't currently catch again.
    pub fn immune_to(&self) -> impl Iterator<Item = ContagionId> + '_ {
        self.immunities.iter().map(ContagionInstance::contagion)
    }

    fn instance_mut(&mut self, instance: InstanceId) -> Option<&mut ContagionInstance> {
        self.active
            .iter_mut()
            .chain(self.immunities.iter_mut())
            .find(|i| i.id == instance)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.active.is_empty() {
            write!(f, "<{} at {}>", self.id, self.position)
        } else {
            write!(
                f,
                "<{} ({} active) at {}>",
                self.id,
                self.active.len(),
                self.position
            )
        }
    }
}

pub trait ModelPeopleExt {
    /// Infects `person` with `contagion` unless they already carry it or are immune to it.
    ///
    /// On success the cure is scheduled after the instance's sampled duration `D`, and each
    /// current neighbor is infected at a uniform delay in `[1, D]` with probability
    /// `1 - (1 - p)^D`. Returns `false`, with no state change, if the attempt was redundant.
    fn infect_with(&mut self, person: PersonId, contagion: ContagionId) -> bool;

    /// Tries every contagion `source` currently carries against `target`. Returns how many
    /// took hold.
    fn expose(&mut self, source: PersonId, target: PersonId) -> usize;

    /// Moves `instance` into `person`'s immunities and schedules the loss of that immunity.
    /// Returns `false` if the instance is no longer active.
    fn cure(&mut self, person: PersonId, instance: InstanceId) -> bool;

    /// Returns `person` to susceptibility for `contagion`. Returns `false` unless the immunity
    /// granted by `instance` against `contagion` is still held.
    fn lose_immunity(
        &mut self,
        person: PersonId,
        contagion: ContagionId,
        instance: InstanceId,
    ) -> bool;

    /// Everyone within the neighbor range of `person`, excluding `person`.
    fn neighbors(&self, person: PersonId) -> Vec<PersonId>;

    /// Moves `person` and keeps the spatial index in step.
    fn move_person(&mut self, person: PersonId, to: Position);
}

impl ModelPeopleExt for Model {
    fn infect_with(&mut self, person: PersonId, contagion: ContagionId) -> bool {
        {
            let target = &self.people[person.0];
            if target.is_infected_with(contagion) || target.is_immune_to(contagion) {
                return false;
            }
        }

        let now = self.now();
        let duration = self.sample(DurationRng, |rng| {
            self.contagions[contagion.0].sample_duration(rng)
        });
        let instance = self.next_instance_id();
        self.schedule.register(Event::Cure { person, instance }, duration);
        self.people[person.0]
            .active
            .push(ContagionInstance::new(instance, contagion, duration, now));
        self.on_infected(contagion);
        trace!(
            "{} infected with {} at tick {} for {:.2} ticks",
            person,
            self.contagions[contagion.0],
            now,
            duration
        );

        let probability = self.contagions[contagion.0].onward_probability(duration);
        let source = Some(InfectionSource { person, instance });
        for target in self.neighbors(person) {
            if self.sample_bool(TransmissionRng, probability) {
                let delay: f64 = self.sample_range(TransmissionRng, 1.0..=duration);
                self.schedule.register(
                    Event::Infect {
                        contagion,
                        source,
                        target,
                    },
                    delay,
                );
            }
        }
        true
    }

    fn expose(&mut self, source: PersonId, target: PersonId) -> usize {
        let carried: Vec<(ContagionId, InstanceId)> = self.people[source.0]
            .active
            .iter()
            .map(|i| (i.contagion, i.id))
            .collect();

        let mut infections = 0;
        for (contagion, instance) in carried {
            if self.infect_with(target, contagion) {
                self.attribute_onward_infection(InfectionSource {
                    person: source,
                    instance,
                });
                infections += 1;
            }
        }
        infections
    }

    fn cure(&mut self, person: PersonId, instance: InstanceId) -> bool {
        let holder = &mut self.people[person.0];
        let Some(index) = holder.active.iter().position(|i| i.id == instance) else {
            return false;
        };
        let cured = holder.active.remove(index);
        let contagion = cured.contagion;
        if self.reproduction_accounting == ReproductionAccounting::OnCure {
            self.accumulators[contagion.0].record(cured.id, cured.onward_infections);
        }
        holder.immunities.push(cured);
        self.on_cured(contagion);
        trace!(
            "{} cured of {} at tick {}",
            person,
            self.contagions[contagion.0],
            self.now()
        );

        let draw: f64 = self.sample_range(ImmunityRng, 0.0..1.0);
        // Uniform on (0, 1]
        let delay = self.contagions[contagion.0].immunity_loss_delay(1.0 - draw);
        self.schedule.register(
            Event::LoseImmunity {
                person,
                contagion,
                instance,
            },
            delay,
        );
        true
    }

    fn lose_immunity(
        &mut self,
        person: PersonId,
        contagion: ContagionId,
        instance: InstanceId,
    ) -> bool {
        let holder = &mut self.people[person.0];
        let Some(index) = holder
            .immunities
            .iter()
            .position(|i| i.id == instance && i.contagion == contagion)
        else {
            return false;
        };
        holder.immunities.remove(index);
        trace!(
            "{} lost immunity to {} at tick {}",
            person,
            self.contagions[contagion.0],
            self.now()
        );
        true
    }

    fn neighbors(&self, person: PersonId) -> Vec<PersonId> {
        let mut found = self.query_radius(self.people[person.0].position, self.neighbor_range());
        found.retain(|&other| other != person);
        found
    }

    fn move_person(&mut self, person: PersonId, to: Position) {
        let from = self.people[person.0].position;
        self.spatial.relocate(person, from, to);
        self.people[person.0].position = to;
    }
}

impl Model {
    /// Credits `source` with one onward infection, whether it is still active or already
    /// immune. Does nothing once the instance has been discarded.
    pub(crate) fn attribute_onward_infection(&mut self, source: InfectionSource) {
        if let Some(instance) = self.people[source.person.0].instance_mut(source.instance) {
            instance.record_onward_infection();
        }
    }
}
