use db::models::user::UserRole;
use serde::{Deserialize, Serialize};
use services::Caller;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: UserRole,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The identity handed to host operations.
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.0.sub,
            role: self.0.role,
        }
    }
}
