pub use crate::contagion::{ContagionId, ContagionType};
pub use crate::error::ContagionError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::model::Model;
pub use crate::movement::{MovementModel, RandomWalk, Stationary};
pub use crate::parameters::{ModelParameters, MovementConfig, ReproductionAccounting};
pub use crate::people::{ModelPeopleExt, PersonId};
pub use crate::position::Position;
pub use crate::random::ModelRandomExt;
pub use crate::series::{SeriesKey, TickSnapshot};
pub use crate::define_rng;
