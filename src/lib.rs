//! Housing price dashboard core: load sale records once, then filter and
//! aggregate them on every change of the user's selection.

pub mod config;
pub mod data;
pub mod state;
