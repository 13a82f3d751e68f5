pub mod claims;
pub mod errors;
pub mod handler;
pub mod key;

pub use claims::TokenClaims;
pub use errors::JwtError;
pub use errors::KeyError;
pub use handler::JwtHandler;
pub use key::SigningKey;
