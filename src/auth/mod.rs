pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, Role, TokenService};
pub use password::{admin_password_matches, PasswordError, PasswordService};
