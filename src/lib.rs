//! `salary-bands` library crate.
//!
//! The binary (`salary`) is a thin wrapper around this library so that the
//! form logic, scoring and prediction client are testable without spawning
//! processes or opening a terminal.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod scoring;
pub mod telemetry;
pub mod tui;
