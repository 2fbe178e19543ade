//! Compound-growth projection engine. Pure functions only; no I/O.

pub mod annual;
mod error;
pub mod growth;
mod types;
pub mod yield_period;

pub use annual::{AnnualProjection, AnnualSchedule, YearWindow, project, projection};
pub use error::PreconditionViolation;
pub use growth::apply_year;
pub use types::{
    AnnualScheduleEntry, ProjectionPoint, ProjectionResult, SummaryResult, YieldPeriod,
};
pub use yield_period::{YieldPlan, series, summarize};
