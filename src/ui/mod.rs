//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the packed layouts and turns them into cells on the
//! terminal.  No packing happens here.

pub mod layout;
pub mod popup;
pub mod theme;
pub mod tile_view;
