pub mod extractor;
pub mod jwt;

pub use extractor::AuthMember;
pub use jwt::{issue_token, validate_token, Claims, JwtConfig};
