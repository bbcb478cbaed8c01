// Library root: the advisor entry point, its data providers, and aggregation.
// The `fanvise` binary and the integration tests build on this.

pub mod advisor;
pub mod aggregate;
pub mod espn;
pub mod fixture;
pub mod provider;
