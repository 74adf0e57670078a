//! The population model: owns every person, the schedule, the spatial index and the
//! aggregate time series, and advances them together one tick at a time.

use indexmap::IndexMap;
use log::{debug, info};

use crate::contagion::{ContagionId, ContagionType, InstanceId, ReproductionAccumulator};
use crate::density::InfectionGrid;
use crate::error::ContagionError;
use crate::event::Event;
use crate::movement::{self, MovementModel};
use crate::parameters::{ModelParameters, ReproductionAccounting};
use crate::people::{ModelPeopleExt, Person, PersonId};
use crate::position::Position;
use crate::random::{ModelRandomExt, RngData, RngSource};
use crate::schedule::Schedule;
use crate::series::{Series, SeriesKey, TickSnapshot};
use crate::spatial::SpatialIndex;
use crate::define_rng;

define_rng!(PopulationRng);
define_rng!(SeedingRng);

pub struct Model {
    pub(crate) schedule: Schedule<Event>,
    pub(crate) spatial: SpatialIndex<PersonId>,
    pub(crate) people: Vec<Person>,
    pub(crate) contagions: Vec<ContagionType>,
    pub(crate) accumulators: Vec<ReproductionAccumulator>,
    pub(crate) reproduction_accounting: ReproductionAccounting,
    series: IndexMap<SeriesKey, Series>,
    movement: Box<dyn MovementModel>,
    rng: RngData,
    neighbor_range: f64,
    half_width: f64,
    half_height: f64,
    instance_counter: u64,
    max_active_count: usize,
    max_smoothed_r: f64,
}

impl Model {
    /// Builds a model with `parameters.population` people placed uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail validation.
    pub fn new(parameters: &ModelParameters) -> Result<Model, ContagionError> {
        let mut model = Model::empty(parameters)?;
        for _ in 0..parameters.population {
            let x = model.sample_range(PopulationRng, -model.half_width..model.half_width);
            let y = model.sample_range(PopulationRng, -model.half_height..model.half_height);
            model.add_person(Position::new(x, y));
        }
        info!(
            "created model with {} people and {} contagions",
            model.people.len(),
            model.contagions.len()
        );
        Ok(model)
    }

    /// Builds a model with one person at each of `positions`, ignoring
    /// `parameters.population`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail validation.
    pub fn from_positions(
        parameters: &ModelParameters,
        positions: Vec<Position>,
    ) -> Result<Model, ContagionError> {
        let mut model = Model::empty(parameters)?;
        for position in positions {
            model.add_person(position);
        }
        Ok(model)
    }

    fn empty(parameters: &ModelParameters) -> Result<Model, ContagionError> {
        parameters.validate()?;
        let mut series = IndexMap::new();
        series.insert(SeriesKey::All, Series::with_rows(1));
        Ok(Model {
            schedule: Schedule::new(),
            spatial: SpatialIndex::new(parameters.neighbor_range),
            people: Vec::with_capacity(parameters.population),
            contagions: parameters.contagions.clone(),
            accumulators: vec![ReproductionAccumulator::new(); parameters.contagions.len()],
            reproduction_accounting: parameters.reproduction_accounting,
            series,
            movement: movement::from_config(parameters.movement)?,
            rng: RngData::new(parameters.seed),
            neighbor_range: parameters.neighbor_range,
            half_width: parameters.half_width,
            half_height: parameters.half_height,
            instance_counter: 0,
            max_active_count: 0,
            max_smoothed_r: 0.0,
        })
    }

    fn add_person(&mut self, position: Position) -> PersonId {
        let id = PersonId(self.people.len());
        self.people.push(Person::new(id, position));
        self.spatial.insert(id, position);
        id
    }

    /// Replaces the movement strategy.
    pub fn set_movement(&mut self, movement: Box<dyn MovementModel>) {
        self.movement = movement;
    }

    /// Advances the whole model by one tick and returns the finished rows.
    ///
    /// Opens a new row in every series, clears the reproduction accumulators, fires every
    /// event due now, moves people, folds each contagion's R into its series, and finally
    /// advances the clock.
    pub fn advance_tick(&mut self) -> TickSnapshot {
        for series in self.series.values_mut() {
            series.add_new_row();
        }
        for accumulator in &mut self.accumulators {
            accumulator.reset();
        }

        for event in self.schedule.advance() {
            event.fire(self);
        }

        if !self.movement.is_stationary() {
            for index in 0..self.people.len() {
                let person = PersonId(index);
                let current = self.people[index].position;
                if let Some(next) = self.movement.next_position(self, person, current) {
                    self.move_person(person, next);
                }
            }
        }

        for (key, series) in &mut self.series {
            if let SeriesKey::Contagion(contagion) = key {
                let smoothed = series.set_r(self.accumulators[contagion.0].get_r());
                self.max_smoothed_r = self.max_smoothed_r.max(smoothed);
            }
        }

        let snapshot = self.snapshot();
        self.schedule.tick();
        snapshot
    }

    /// Runs `ticks` updates and returns the last snapshot (or the current rows if `ticks` is 0).
    pub fn run(&mut self, ticks: u64) -> TickSnapshot {
        let mut snapshot = self.snapshot();
        for _ in 0..ticks {
            snapshot = self.advance_tick();
        }
        snapshot
    }

    /// Infects `count` people drawn at random (with replacement). Returns how many of the
    /// attempts took hold.
    pub fn seed_infection(&mut self, contagion: ContagionId, count: usize) -> usize {
        let mut infected = 0;
        for _ in 0..count {
            let Some(person) = self.random_person() else {
                break;
            };
            if self.infect_with(person, contagion) {
                infected += 1;
            }
        }
        debug!(
            "seeded {} of {} requested {} infections",
            infected, count, self.contagions[contagion.0]
        );
        infected
    }

    #[must_use]
    pub fn random_person(&self) -> Option<PersonId> {
        if self.people.is_empty() {
            return None;
        }
        Some(PersonId(
            self.sample_range(SeedingRng, 0..self.people.len()),
        ))
    }

    pub(crate) fn next_instance_id(&mut self) -> InstanceId {
        let id = InstanceId(self.instance_counter);
        self.instance_counter += 1;
        id
    }

    fn series_mut(&mut self, key: SeriesKey) -> &mut Series {
        // Pad late series so row i is tick i in every series.
        let rows = self.series[&SeriesKey::All].len();
        self.series
            .entry(key)
            .or_insert_with(|| Series::with_rows(rows))
    }

    pub(crate) fn on_infected(&mut self, contagion: ContagionId) {
        self.series_mut(SeriesKey::Contagion(contagion))
            .increment_active();
        let total = self.series_mut(SeriesKey::All).increment_active();
        self.max_active_count = self.max_active_count.max(total);
    }

    pub(crate) fn on_cured(&mut self, contagion: ContagionId) {
        self.series_mut(SeriesKey::Contagion(contagion))
            .decrement_active();
        self.series_mut(SeriesKey::All).decrement_active();
    }

    /// Latest row of every series, tagged with the current tick.
    #[must_use]
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick: self.now(),
            rows: self
                .series
                .iter()
                .filter_map(|(key, series)| Some((*key, series.last()?)))
                .collect(),
        }
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.schedule.now()
    }

    #[must_use]
    pub fn series(&self, key: SeriesKey) -> Option<&Series> {
        self.series.get(&key)
    }

    /// Keys of every series, in the order they were first observed ("All" first).
    pub fn series_keys(&self) -> impl Iterator<Item = SeriesKey> + '_ {
        self.series.keys().copied()
    }

    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    #[must_use]
    pub fn person(&self, person: PersonId) -> &Person {
        &self.people[person.0]
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn contagion(&self, contagion: ContagionId) -> &ContagionType {
        &self.contagions[contagion.0]
    }

    /// # Errors
    ///
    /// Returns `ContagionError::UnknownContagion` if no contagion has that name.
    pub fn contagion_id(&self, name: &str) -> Result<ContagionId, ContagionError> {
        self.contagions
            .iter()
            .position(|c| c.name == name)
            .map(ContagionId)
            .ok_or_else(|| ContagionError::UnknownContagion(name.to_string()))
    }

    pub fn contagion_ids(&self) -> impl Iterator<Item = ContagionId> {
        (0..self.contagions.len()).map(ContagionId)
    }

    #[must_use]
    pub fn accumulator(&self, contagion: ContagionId) -> &ReproductionAccumulator {
        &self.accumulators[contagion.0]
    }

    /// Everyone strictly closer than `radius` to `point`.
    #[must_use]
    pub fn query_radius(&self, point: Position, radius: f64) -> Vec<PersonId> {
        self.spatial.query(point, radius)
    }

    /// Everyone strictly inside the rectangle spanned by `bottom_left` and `top_right`.
    #[must_use]
    pub fn query_region(&self, bottom_left: Position, top_right: Position) -> Vec<PersonId> {
        self.spatial.query_region(bottom_left, top_right)
    }

    #[must_use]
    pub fn neighbor_range(&self) -> f64 {
        self.neighbor_range
    }

    /// Half width and half height of the world.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        (self.half_width, self.half_height)
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.schedule.pending()
    }

    /// Highest "All" active count seen so far.
    #[must_use]
    pub fn max_active_count(&self) -> usize {
        self.max_active_count
    }

    /// Highest smoothed R of any contagion seen so far.
    #[must_use]
    pub fn max_smoothed_r(&self) -> f64 {
        self.max_smoothed_r
    }

    /// Population and infection counts over cells of side `granularity` covering the world.
    /// With `contagion` set, a person counts as infected if they carry that contagion;
    /// otherwise each of their active infections counts once.
    ///
    /// # Panics
    ///
    /// Panics if `granularity` is not positive.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn infection_grid(&self, granularity: f64, contagion: Option<ContagionId>) -> InfectionGrid {
        assert!(granularity > 0.0, "granularity must be positive");
        let columns = (2.0 * self.half_width / granularity).ceil() as usize;
        let rows = (2.0 * self.half_height / granularity).ceil() as usize;
        let mut grid = InfectionGrid::new(granularity, columns, rows);

        for person in &self.people {
            let Position { x, y } = person.position;
            if x.abs() > self.half_width || y.abs() > self.half_height {
                continue;
            }
            // The far edges belong to the last column and row.
            let column = (((x + self.half_width) / granularity).floor() as usize).min(columns - 1);
            let row = (((y + self.half_height) / granularity).floor() as usize).min(rows - 1);
            let infected = match contagion {
                Some(contagion) => u32::from(person.is_infected_with(contagion)),
                None => person.active.len() as u32,
            };
            grid.add(column, row, infected);
        }
        grid
    }
}

impl RngSource for Model {
    fn rng_data(&self) -> &RngData {
        &self.rng
    }

    fn rng_data_mut(&mut self) -> &mut RngData {
        &mut self.rng
    }
}
