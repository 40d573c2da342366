//! Stateless repositories. Every method takes a `&Connection`, so callers
//! decide the transaction boundary.

mod allow_list;
mod roster;
mod tracked;

pub use allow_list::{AllowListRepo, LoadSummary};
pub use roster::RosterRepo;
pub use tracked::TrackedRepo;
