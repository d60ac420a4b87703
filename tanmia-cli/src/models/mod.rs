//! Domain records for the project registry
//!
//! Three entities mirror the registry's tables: [`Project`] is the master
//! record, [`ProjectTracking`] its one-to-one schedule/cost companion, and
//! [`ExecutionRate`] a many-per-project progress snapshot.

pub mod execution_rate;
pub mod project;
pub mod tracking;

pub use execution_rate::ExecutionRate;
pub use project::{Project, YEAR_CHOICES};
pub use tracking::ProjectTracking;
