//! Row extraction heuristics

pub mod fixers;

pub use fixers::FixersAnchorParser;
