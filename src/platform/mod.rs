// ScanTrail - platform/mod.rs
//
// Platform abstraction layer: config file location and loading, and the
// filesystem boundary for input and output files.

pub mod config;
pub mod fs;
