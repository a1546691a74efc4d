//! Core algorithms – grid geometry, tile sizing, packing and layout tweening.
//!
//! Nothing in this module depends on any TUI or rendering crate and nothing
//! here performs I/O.  Every packer is a pure function of a [`grid::Grid`]
//! and a tile list, so all types are `Send + Sync` and can be shared across
//! async tasks.

pub mod animate;
pub mod grid;
pub mod layout;
pub mod scale;
pub mod skyline;
pub mod tetris;
pub mod tile;
pub mod treemap;
