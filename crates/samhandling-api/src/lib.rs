//! County-key authorized group membership API.
//!
//! Exposes list, add and remove operations on Entra ID group membership.
//! Each request presents a county key; the key maps to a list of mail
//! domain suffixes that bounds which members are visible and which mail
//! addresses may be added or removed.
//!
//! # Routes
//!
//! - `GET /members/{group_name}`
//! - `POST /members/{group_name}`
//! - `POST /members/{group_name}/{user_mail}`
//! - `DELETE /members/{group_name}/{user_mail}`

pub mod county;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use county::{
    mail_matches_suffixes, normalize_suffixes, resolve_allowed_suffixes, CountyCredential,
    CountyKeys, COUNTY_KEY_HEADER, COUNTY_KEY_QUERY,
};
pub use error::{ApiError, ApiResult};
pub use models::{AddMemberOptions, AddMemberRequest, MemberResponse};
pub use router::{members_router, MembersState};
pub use services::{AddMemberOutcome, MembershipService};
