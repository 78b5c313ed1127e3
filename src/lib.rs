// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub mod model;
pub mod normalize;
pub mod snapshot;
pub mod delta;
pub mod ledger;
pub mod stats;
pub mod summary;

pub mod csv;
pub mod file;
pub mod report;
pub mod notify;
pub mod progress;
pub mod runner;
pub mod source;
pub mod store;
