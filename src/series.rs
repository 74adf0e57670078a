//! Per-contagion aggregate time series.
//!
//! Each [`Series`] holds one row per tick: the number of active infections, the raw
//! reproduction number, and a smoothed reproduction number. A new row is opened at the
//! start of every tick with the active count carried forward, raw R at zero, and
//! smoothed R at the sum of the last [`SMOOTHING_WINDOW`] raw values (the fresh zero
//! included) divided by the window. When the tick's raw R is known it is written to the
//! row and `raw_R / SMOOTHING_WINDOW` is added to the smoothed value, so the finished
//! row holds the mean of the window ending at this tick.

use indexmap::IndexMap;
use serde::Serialize;

use crate::contagion::ContagionId;

pub const SMOOTHING_WINDOW: usize = 6;

/// Names a series: the aggregate over all contagions or a single contagion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    All,
    Contagion(ContagionId),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    active_count: Vec<usize>,
    r_value: Vec<f64>,
    smoothed_r: Vec<f64>,
}

impl Series {
    /// A series that already spans `rows` ticks, with neutral R and no infections.
    pub(crate) fn with_rows(rows: usize) -> Series {
        Series {
            active_count: vec![0; rows],
            r_value: vec![1.0; rows],
            smoothed_r: vec![1.0; rows],
        }
    }

    pub(crate) fn add_new_row(&mut self) {
        self.r_value.push(0.0);
        let window_start = self.r_value.len().saturating_sub(SMOOTHING_WINDOW);
        #[allow(clippy::cast_precision_loss)]
        let smoothed = self.r_value[window_start..].iter().sum::<f64>() / SMOOTHING_WINDOW as f64;
        self.smoothed_r.push(smoothed);
        let carried = self.active_count.last().copied().unwrap_or(0);
        self.active_count.push(carried);
    }

    pub(crate) fn increment_active(&mut self) -> usize {
        let current = self
            .active_count
            .last_mut()
            .expect("series always has a current row");
        *current += 1;
        *current
    }

    pub(crate) fn decrement_active(&mut self) {
        let current = self
            .active_count
            .last_mut()
            .expect("series always has a current row");
        *current = current.saturating_sub(1);
    }

    /// Writes this tick's raw R and folds it into the smoothed value. Returns the smoothed R.
    pub(crate) fn set_r(&mut self, r: f64) -> f64 {
        if let Some(raw) = self.r_value.last_mut() {
            *raw = r;
        }
        let smoothed = self
            .smoothed_r
            .last_mut()
            .expect("series always has a current row");
        #[allow(clippy::cast_precision_loss)]
        {
            *smoothed += r / SMOOTHING_WINDOW as f64;
        }
        *smoothed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active_count.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count.is_empty()
    }

    #[must_use]
    pub fn active_count(&self) -> &[usize] {
        &self.active_count
    }

    #[must_use]
    pub fn r_value(&self) -> &[f64] {
        &self.r_value
    }

    #[must_use]
    pub fn smoothed_r(&self) -> &[f64] {
        &self.smoothed_r
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<SeriesRow> {
        Some(SeriesRow {
            active_count: *self.active_count.get(index)?,
            r: *self.r_value.get(index)?,
            smoothed_r: *self.smoothed_r.get(index)?,
        })
    }

    #[must_use]
    pub fn last(&self) -> Option<SeriesRow> {
        self.row(self.len().checked_sub(1)?)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SeriesRow {
    pub active_count: usize,
    pub r: f64,
    pub smoothed_r: f64,
}

/// The latest row of every series, as of the end of one model update.
#[derive(Clone, Debug, PartialEq)]
pub struct TickSnapshot {
    pub tick: u64,
    pub rows: IndexMap<SeriesKey, SeriesRow>,
}

impl TickSnapshot {
    #[must_use]
    pub fn get(&self, key: SeriesKey) -> Option<&SeriesRow> {
        self.rows.get(&key)
    }

    /// Active infections across all contagions.
    #[must_use]
    pub fn total_active(&self) -> usize {
        self.get(SeriesKey::All).map_or(0, |row| row.active_count)
    }
}
