pub mod event;
pub mod manage;
pub mod member;

pub use event::{Event, EventInput, Timeline};
pub use manage::{GrantRequest, Manage};
pub use member::{Member, MemberUpdate};
