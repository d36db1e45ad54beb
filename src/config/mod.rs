//! Configuration module
//!
//! Settings for the view surface: display, behavior, and export targets.

pub mod config;
