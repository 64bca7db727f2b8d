//! Command dispatch: bridges CLI args -> core operations -> output.

pub mod benchmark;
pub mod config_cmd;
pub mod discover;
pub mod gateway;
pub mod locker;
pub mod util;
