//! Subcommands of the `flappy-q` binary

pub mod inspect;
pub mod policy;
pub mod train;
