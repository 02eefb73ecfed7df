//! Player settings: which resolution service to talk to, how long an audio
//! download may stall, where the cache and saved playlist live, and the
//! key steps of the terminal UI.
//!
//! Read once at startup from `config.toml` with `TUBELOOP__` environment
//! overrides on top.

mod load;
mod schema;

pub use schema::*;
