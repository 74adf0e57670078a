//! An event-driven engine for simulating the spread of contagions through a
//! spatially distributed population.
//!
//! The central object of a simulation is the [`Model`]. It owns every
//! [`Person`], the simulation clock, the future-event [`Schedule`], and a
//! uniform-grid [`SpatialIndex`] that answers "who is near this position".
//! The model advances one tick at a time; each tick it drains the events due
//! at that tick and updates per-contagion time series (active infections and
//! reproduction number).
//!
//! Transmission is decided eagerly: when a person becomes infected, the engine
//! rolls once per current neighbor to decide whether that neighbor will be
//! infected at some point during the infectious window, and if so schedules the
//! infection at a uniformly drawn delay. Cures and immunity loss are likewise
//! scheduled events, so no part of the engine polls individuals every tick.
//!
//! A minimal run looks like:
//!
//! ```rust
//! use contagion_sim::prelude::*;
//!
//! let parameters = ModelParameters::default();
//! let mut model = Model::new(&parameters).unwrap();
//! let covid = model.contagion_id("COVID").unwrap();
//! model.seed_infection(covid, 1);
//! let snapshot = model.run(10);
//! assert_eq!(snapshot.tick, 9);
//! ```
pub mod clock;
pub mod contagion;
pub mod density;
pub mod error;
pub mod event;
pub mod log;
pub mod model;
pub mod movement;
pub mod numeric;
pub mod parameters;
pub mod people;
pub mod position;
pub mod random;
pub mod schedule;
pub mod series;
pub mod spatial;

pub mod prelude;

pub use clock::Clock;
pub use contagion::{ContagionId, ContagionInstance, ContagionType, InstanceId};
pub use density::InfectionGrid;
pub use error::ContagionError;
pub use event::Event;
pub use model::Model;
pub use movement::{MovementModel, RandomWalk, Stationary};
pub use parameters::{ModelParameters, MovementConfig, ReproductionAccounting};
pub use people::{ModelPeopleExt, Person, PersonId};
pub use position::Position;
pub use random::{ModelRandomExt, RngId};
pub use schedule::Schedule;
pub use series::{Series, SeriesKey, SeriesRow, TickSnapshot};
pub use spatial::SpatialIndex;

// Deterministic hashing for everything keyed inside the engine.
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

// Re-exports so models built on the engine use the same versions.
pub use rand;
pub use rand_distr;
