pub mod jwt;
pub mod middleware;
pub mod request_id;

pub use jwt::JwtVerifier;
pub use middleware::{auth_middleware, AuthUser};
pub use request_id::{request_id_middleware, RequestId};
