pub mod authorities;
pub mod issuer;
pub mod manager;
pub mod models;
pub mod validator;

pub use authorities::normalize_authority;
pub use authorities::AuthorityExtractor;
pub use authorities::ROLE_PREFIX;
pub use issuer::PolicyError;
pub use issuer::TokenIssuer;
pub use issuer::TokenPolicy;
pub use manager::TokenManager;
pub use models::Principal;
pub use models::TokenClass;
pub use models::TokenPair;
pub use validator::TokenValidator;
