//! CLI infrastructure for the flappy-q toolkit
//!
//! This module provides the command-line interface for replaying scripted
//! training runs and inspecting persisted Q-table snapshots.

pub mod commands;
pub mod output;
