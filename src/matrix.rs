//! Observation data for one variable.
//!
//! An [`ObservationMatrix`] is a unit-by-observer grid of value indices into
//! the variable's label list. It is assembled once with [`MatrixBuilder`]
//! and read-only afterwards.

use std::collections::HashMap;

use crate::error::{IrrError, Result};
use crate::types::Scale;

/// One variable's unit-by-observer grid of observed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationMatrix {
    variable: String,
    observers: Vec<String>,
    units: Vec<String>,
    values: Vec<String>,
    scale: Scale,
    /// Row-major, `units.len() * observers.len()` cells.
    cells: Vec<Option<usize>>,
}

impl ObservationMatrix {
    /// Variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Observer identifiers in column order.
    pub fn observers(&self) -> &[String] {
        &self.observers
    }

    /// Unit identifiers in row order.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Value labels; a cell's index points into this list.
    ///
    /// For ordinal variables the list follows the declared order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Declared measurement scale.
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Number of units (rows).
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Number of observers (columns).
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Number of distinct value labels.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Value index observed by `observer` on `unit`, or `None` if missing.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn value(&self, unit: usize, observer: usize) -> Option<usize> {
        assert!(observer < self.observers.len(), "observer index out of range");
        self.cells[unit * self.observers.len() + observer]
    }

    /// All cells of one unit, one per observer.
    pub fn row(&self, unit: usize) -> &[Option<usize>] {
        let m = self.observers.len();
        &self.cells[unit * m..(unit + 1) * m]
    }

    /// Iterate over the unit rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<usize>]> {
        // chunks_exact(0) panics; a matrix without observers has no cells anyway.
        self.cells.chunks_exact(self.observers.len().max(1))
    }

    /// Total number of non-missing cells.
    pub fn observation_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Incremental builder for [`ObservationMatrix`].
///
/// Value labels are indexed in order of first appearance, unless an ordinal
/// order is declared with [`MatrixBuilder::scale`], in which case the
/// declared labels come first in declared order.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    variable: String,
    observers: Vec<String>,
    units: Vec<String>,
    values: Vec<String>,
    value_index: HashMap<String, usize>,
    scale: Scale,
    cells: Vec<Option<usize>>,
}

impl MatrixBuilder {
    /// Start a matrix for `variable` with the given observer columns.
    pub fn new<S: Into<String>>(variable: impl Into<String>, observers: impl IntoIterator<Item = S>) -> Self {
        Self {
            variable: variable.into(),
            observers: observers.into_iter().map(Into::into).collect(),
            units: Vec::new(),
            values: Vec::new(),
            value_index: HashMap::new(),
            scale: Scale::Nominal,
            cells: Vec::new(),
        }
    }

    /// Declare the scale. Must be called before any unit is pushed.
    ///
    /// An ordinal declaration seeds the label list in declared order and
    /// rejects labels it does not list.
    pub fn scale(mut self, scale: Scale) -> Result<Self> {
        if let Scale::Ordinal(order) = &scale {
            for label in order {
                if self.value_index.contains_key(label) {
                    return Err(IrrError::DuplicateValue {
                        variable: self.variable.clone(),
                        value: label.clone(),
                    });
                }
                self.value_index.insert(label.clone(), self.values.len());
                self.values.push(label.clone());
            }
        }
        self.scale = scale;
        Ok(self)
    }

    /// Append a unit row. `None` and empty strings mark missing cells;
    /// rows shorter than the observer list are padded with missing cells
    /// and extra cells are ignored.
    pub fn push_unit(&mut self, unit: impl Into<String>, cells: &[Option<&str>]) -> Result<()> {
        let m = self.observers.len();
        let mut row = Vec::with_capacity(m);
        for o in 0..m {
            let cell = match cells.get(o).copied().flatten() {
                Some(label) if !label.is_empty() => Some(self.intern(label)?),
                _ => None,
            };
            row.push(cell);
        }
        self.units.push(unit.into());
        self.cells.extend(row);
        Ok(())
    }

    /// Finish the matrix.
    pub fn build(self) -> ObservationMatrix {
        ObservationMatrix {
            variable: self.variable,
            observers: self.observers,
            units: self.units,
            values: self.values,
            scale: self.scale,
            cells: self.cells,
        }
    }

    fn intern(&mut self, label: &str) -> Result<usize> {
        if let Some(&idx) = self.value_index.get(label) {
            return Ok(idx);
        }
        if matches!(self.scale, Scale::Ordinal(_)) {
            return Err(IrrError::UnknownOrdinalValue {
                variable: self.variable.clone(),
                value: label.to_string(),
            });
        }
        let idx = self.values.len();
        self.values.push(label.to_string());
        self.value_index.insert(label.to_string(), idx);
        Ok(idx)
    }
}

/// Build a matrix from string rows; test and bench helper.
///
/// Each row is `(unit, cells)`, where an empty cell is missing.
pub fn matrix_from_rows(
    variable: &str,
    observers: &[&str],
    scale: Scale,
    rows: &[(&str, &[&str])],
) -> Result<ObservationMatrix> {
    let mut builder = MatrixBuilder::new(variable, observers.iter().copied()).scale(scale)?;
    for (unit, cells) in rows {
        let cells: Vec<Option<&str>> = cells.iter().map(|c| Some(*c)).collect();
        builder.push_unit(*unit, &cells)?;
    }
    Ok(builder.build())
}
