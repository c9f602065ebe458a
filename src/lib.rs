//! Tunic tracker - reconstructs randomizer run state from game files
//!
//! Reads a save slot (`SAVES/*.tunic`) and, when available, the randomizer's
//! spoiler log to work out which checks are collected, which entrances have
//! been walked through and where they lead.

pub mod cli;
pub mod domain;
pub mod parse;
pub mod storage;
pub mod tracker;

pub use domain::{CodeRegistry, Door, Region, Save, WorldRegistry};
pub use parse::{ParseError, Parser};
pub use tracker::{Refresh, SnapshotHandle, Sources, Tracker};
