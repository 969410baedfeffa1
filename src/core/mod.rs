// ScanTrail - core/mod.rs
//
// Core business logic layer: line decoding, attempt reconstruction,
// error classification, reporting, and export encoding.
// Must NOT depend on: platform, app, or the filesystem.

pub mod classify;
pub mod export;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod report;
