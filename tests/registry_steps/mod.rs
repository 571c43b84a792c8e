//! Step definitions for agent registry scenarios.

pub mod world;

mod given;
mod then;
mod when;
