//! Per-cell population and infection counts over the world's extent.

/// Counts on a regular grid of square cells, stored row-major with column index along `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct InfectionGrid {
    pub granularity: f64,
    pub columns: usize,
    pub rows: usize,
    pub(crate) population: Vec<u32>,
    pub(crate) infected: Vec<u32>,
}

impl InfectionGrid {
    pub(crate) fn new(granularity: f64, columns: usize, rows: usize) -> InfectionGrid {
        InfectionGrid {
            granularity,
            columns,
            rows,
            population: vec![0; columns * rows],
            infected: vec![0; columns * rows],
        }
    }

    pub(crate) fn add(&mut self, column: usize, row: usize, infected: u32) {
        let index = row * self.columns + column;
        self.population[index] += 1;
        self.infected[index] += infected;
    }

    #[must_use]
    pub fn population(&self, column: usize, row: usize) -> u32 {
        self.population[row * self.columns + column]
    }

    #[must_use]
    pub fn infected(&self, column: usize, row: usize) -> u32 {
        self.infected[row * self.columns + column]
    }

    /// Infections per person in the cell, or `None` for an empty cell.
    #[must_use]
    pub fn proportion(&self, column: usize, row: usize) -> Option<f64> {
        match self.population(column, row) {
            0 => None,
            population => Some(f64::from(self.infected(column, row)) / f64::from(population)),
        }
    }
}
