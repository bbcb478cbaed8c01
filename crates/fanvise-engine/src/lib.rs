// Pure compute stages of the advisor: window resolution, candidate scoring
// and selection, move simulation and ranking. Nothing here performs I/O.

pub mod lineup;
pub mod pipeline;
pub mod policy;
pub mod rank;
pub mod scoring;
pub mod selection;
pub mod simulate;
pub mod window;

#[cfg(test)]
pub(crate) mod testutil;
