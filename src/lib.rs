//! Grid tile packing and animated layout engine.
//!
//! Weighted items (transactions by size and fee rate) are sized into square
//! tiles, packed onto a discrete grid by one of three interchangeable
//! strategies, and successive layouts are tweened by stable id.
//!
//! [`core`] holds the engine and performs no I/O.  [`source`] and
//! [`config`] supply items and user settings to the terminal viewer.

pub mod config;
pub mod core;
pub mod source;
