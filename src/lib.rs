//! Lorebinder - flattens cross-referencing tabletop ruleset JSON into
//! display-ready JSON, resolving entity inheritance along the way.

pub mod compose;
pub mod core;
pub mod graph;
pub mod modify;
pub mod render;
pub mod resolve;
