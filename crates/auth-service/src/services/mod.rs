pub mod auth_gateway;
pub mod revocation_registry;
pub mod session_service;
pub mod token_service;

pub use auth_gateway::{extract_bearer, VerificationGateway};
pub use revocation_registry::RevocationRegistry;
pub use session_service::SessionService;
pub use token_service::{read_unverified, TokenIssuer};
