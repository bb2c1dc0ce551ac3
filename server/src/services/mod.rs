pub mod authorization;
pub mod member;

pub use authorization::{Access, EventAuthorizationService, EventCapability, GrantOutcome};
pub use member::{LoginSession, MemberService};
