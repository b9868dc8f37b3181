//! Fix generation and application.
//!
//! Rules attach a [`Fix`] to their findings through the pure functions in
//! [`generate`]. The [`Remediator`] applies fixes all-or-nothing and then
//! re-runs the catalog to check that the finding really went away.

mod edit;
mod error;
pub mod generate;
mod remediate;

pub use edit::{Edit, Fix};
pub use error::FixError;
pub use remediate::{AppliedFix, FixReport, Remediator, DEFAULT_MAX_PASSES};
