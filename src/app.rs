//! Application module: the state the TUI renders and the key handlers act on.
//!
//! `App` owns the playlist and adds what only the interface cares about:
//! the selected row, the input mode and the last status message.

mod model;

pub use model::*;
