//! league-core: a deterministic multi-division league and cup simulator.
//!
//! `LeagueEngine` owns the state; everything else is the machinery it
//! drives. See `engine.rs` for the command surface.

pub mod command;
pub mod config;
pub mod cup;
pub mod division;
pub mod engine;
pub mod error;
pub mod event;
pub mod fixture_scheduler;
pub mod match_engine;
pub mod name_generator;
pub mod rng;
pub mod roster;
pub mod scorers;
pub mod season;
pub mod snapshot;
pub mod standings;
pub mod store;
pub mod team;
pub mod types;
