//! Core domain types shared by the discretizer, the Q-table and the environment port.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw features reported by the game for the current frame.
///
/// Field names follow the game's state dictionary so the record can be
/// deserialized straight from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawObservation {
    /// Vertical position of the bird.
    pub player_y: f64,
    /// Vertical velocity of the bird (negative is upward).
    pub player_vel: f64,
    /// Vertical position of the top edge of the next gap.
    pub next_pipe_top_y: f64,
    /// Horizontal distance from the bird to the next pipe.
    pub next_pipe_dist_to_player: f64,
}

impl RawObservation {
    /// Vertical offset between the bird and the top of the next gap.
    pub fn vertical_offset(&self) -> f64 {
        self.player_y - self.next_pipe_top_y
    }

    /// Horizontal distance to the next gap.
    pub fn horizontal_distance(&self) -> f64 {
        self.next_pipe_dist_to_player
    }

    /// Vertical velocity of the bird.
    pub fn velocity(&self) -> f64 {
        self.player_vel
    }
}

/// Discretized view of a [`RawObservation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscreteState {
    pub height: usize,
    pub distance: usize,
    pub velocity: usize,
}

impl DiscreteState {
    pub const fn new(height: usize, distance: usize, velocity: usize) -> Self {
        Self {
            height,
            distance,
            velocity,
        }
    }
}

impl fmt::Display for DiscreteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.distance, self.velocity)
    }
}

/// Abstract action understood by the agent.
///
/// The discriminant is the index into the environment's action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Flap = 0,
    NoOp = 1,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; 2] = [Action::Flap, Action::NoOp];

    /// Number of actions.
    pub const COUNT: usize = Self::ALL.len();

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Map an index back to an action, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Flap => write!(f, "flap"),
            Action::NoOp => write!(f, "no-op"),
        }
    }
}

/// Environment-specific codes for each [`Action`], in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSet<C> {
    codes: [C; Action::COUNT],
}

impl<C: Clone> ActionSet<C> {
    /// Build an action set from the codes reported by the environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidActionSet`] unless exactly one code per
    /// action is supplied.
    pub fn new(codes: Vec<C>) -> crate::Result<Self> {
        let got = codes.len();
        let codes: [C; Action::COUNT] =
            codes
                .try_into()
                .map_err(|_| crate::Error::InvalidActionSet {
                    expected: Action::COUNT,
                    got,
                })?;
        Ok(Self { codes })
    }

    /// Code the environment expects for `action`.
    pub fn code(&self, action: Action) -> &C {
        &self.codes[action.index()]
    }
}
