//! Services for the members API.

pub mod membership_service;

pub use membership_service::{AddMemberOutcome, MembershipService};
