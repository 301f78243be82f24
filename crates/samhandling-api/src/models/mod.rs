//! Request and response models for the members API.

pub mod requests;
pub mod responses;

pub use requests::{AddMemberOptions, AddMemberRequest};
pub use responses::MemberResponse;
