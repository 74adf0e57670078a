//! Runs a single simulation and logs every tick's series rows.
//!
//! Usage: `contagion-sim [parameters.json]`. Without an argument the default
//! parameters are used.

use contagion_sim::log::{enable_logging, set_log_level, LevelFilter};
use contagion_sim::prelude::*;

const TICKS: u64 = 1000;

fn main() -> Result<(), ContagionError> {
    enable_logging();
    set_log_level(LevelFilter::Info);

    let parameters = match std::env::args().nth(1) {
        Some(path) => ModelParameters::load_from_json(path)?,
        None => ModelParameters::default(),
    };

    let mut model = Model::new(&parameters)?;
    for contagion in model.contagion_ids().collect::<Vec<_>>() {
        model.seed_infection(contagion, 1);
    }

    for _ in 0..TICKS {
        let snapshot = model.advance_tick();
        for (key, row) in &snapshot.rows {
            let label = match key {
                SeriesKey::All => "All".to_string(),
                SeriesKey::Contagion(contagion) => model.contagion(*contagion).name.clone(),
            };
            info!(
                "tick {} {}: active {} R {:.2} smoothed R {:.2}",
                snapshot.tick, label, row.active_count, row.r, row.smoothed_r
            );
        }
    }

    info!(
        "finished {} ticks: peak active {}, peak smoothed R {:.2}",
        TICKS,
        model.max_active_count(),
        model.max_smoothed_r()
    );
    Ok(())
}
