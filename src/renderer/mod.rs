//! Canvas snapshots
//!
//! The game draws into `sim::Canvas`; this module turns a canvas into
//! something a terminal can show.

pub mod ascii;

pub use ascii::render;
