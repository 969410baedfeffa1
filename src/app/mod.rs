// ScanTrail - app/mod.rs
//
// Application layer: wires the core pipeline to the filesystem.

pub mod dataset;
