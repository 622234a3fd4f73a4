//! Dense Q-table for temporal difference learning

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    discretizer::StateDiscretizer,
    types::{Action, DiscreteState},
};

/// Table dimensions as `[height, distance, velocity, actions]`.
pub type TableShape = [usize; 4];

/// Raw array form of a [`QTable`]: the shape plus the row-major values.
///
/// This is what gets written to disk; learning parameters are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub shape: TableShape,
    pub values: Vec<f64>,
}

/// Q-table mapping (state, action) pairs to Q-values
///
/// Backed by a flat row-major array; every cell starts at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<f64>,
    shape: TableShape,
    strides: TableShape,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

fn strides_for(shape: &TableShape) -> TableShape {
    [
        shape[1] * shape[2] * shape[3],
        shape[2] * shape[3],
        shape[3],
        1,
    ]
}

impl QTable {
    /// Create a zeroed Q-table
    pub fn new(shape: TableShape, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            values: vec![0.0; shape.iter().product()],
            shape,
            strides: strides_for(&shape),
            learning_rate,
            discount_factor,
        }
    }

    /// Create a zeroed Q-table sized for the discretizer's bucket counts
    pub fn for_discretizer(
        discretizer: &StateDiscretizer,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Self {
        let (height, distance, velocity) = discretizer.bucket_counts();
        Self::new(
            [height, distance, velocity, Action::COUNT],
            learning_rate,
            discount_factor,
        )
    }

    /// Rebuild a table from its raw array form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptTable`] if the value count disagrees with the
    /// shape or a dimension is empty, and [`Error::ShapeMismatch`] if the
    /// last dimension is not the action count.
    pub fn from_snapshot(
        snapshot: TableSnapshot,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Result<Self> {
        let expected: usize = snapshot.shape.iter().product();
        if snapshot.shape.contains(&0) || snapshot.values.len() != expected {
            return Err(Error::CorruptTable {
                shape: snapshot.shape,
                expected,
                got: snapshot.values.len(),
            });
        }
        if snapshot.shape[3] != Action::COUNT {
            let [height, distance, velocity, _] = snapshot.shape;
            return Err(Error::ShapeMismatch {
                expected: [height, distance, velocity, Action::COUNT],
                got: snapshot.shape,
            });
        }
        Ok(Self {
            strides: strides_for(&snapshot.shape),
            shape: snapshot.shape,
            values: snapshot.values,
            learning_rate,
            discount_factor,
        })
    }

    /// Copy the table into its raw array form
    pub fn to_snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            shape: self.shape,
            values: self.values.clone(),
        }
    }

    pub fn shape(&self) -> TableShape {
        self.shape
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Flat offset of a cell.
    ///
    /// Out-of-range coordinates are a bug in the caller: they abort debug
    /// builds and are clamped to the last bucket in release builds.
    fn index(&self, state: &DiscreteState, action: Action) -> usize {
        let coords = [state.height, state.distance, state.velocity, action.index()];
        coords
            .iter()
            .zip(self.shape.iter())
            .zip(self.strides.iter())
            .map(|((&coord, &dim), &stride)| {
                debug_assert!(
                    coord < dim,
                    "coordinate {coord} out of range for dimension of size {dim} (state {state}, action {action})"
                );
                coord.min(dim - 1) * stride
            })
            .sum()
    }

    /// Get Q-value for a state-action pair
    pub fn value(&self, state: &DiscreteState, action: Action) -> f64 {
        self.values[self.index(state, action)]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: &DiscreteState, action: Action, value: f64) {
        let idx = self.index(state, action);
        self.values[idx] = value;
    }

    /// Get maximum Q-value over all actions in a state
    pub fn max_value(&self, state: &DiscreteState) -> f64 {
        Action::ALL
            .iter()
            .map(|&action| self.value(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Select greedy action (highest Q-value)
    ///
    /// Flap wins only when strictly greater; on a tie the later action
    /// (no-op) is chosen.
    pub fn best_action(&self, state: &DiscreteState) -> Action {
        let mut best = Action::ALL[0];
        let mut best_value = self.value(state, best);
        for &action in &Action::ALL[1..] {
            let value = self.value(state, action);
            if value >= best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }

    /// One-step TD update
    ///
    /// Q(s,a) ← (1-α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
    pub fn update(
        &mut self,
        state: &DiscreteState,
        action: Action,
        reward: f64,
        next_state: &DiscreteState,
    ) -> f64 {
        let next_max = self.max_value(next_state);
        let old = self.value(state, action);
        let target = reward + self.discount_factor * next_max;
        let new_q = (1.0 - self.learning_rate) * old + self.learning_rate * target;
        self.set(state, action, new_q);
        new_q
    }

    /// Reset all Q-values to zero
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Number of cells holding a non-zero value
    pub fn visited_cells(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    /// Total number of cells
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over every state in row-major order
    pub fn states(&self) -> impl Iterator<Item = DiscreteState> + '_ {
        let [height, distance, velocity, _] = self.shape;
        (0..height).flat_map(move |h| {
            (0..distance)
                .flat_map(move |d| (0..velocity).map(move |v| DiscreteState::new(h, d, v)))
        })
    }
}
