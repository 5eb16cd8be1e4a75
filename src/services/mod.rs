//! External service integrations.

pub mod firebase;
pub mod hautai;

pub use firebase::{AuthUser, FirebaseTokenVerifier, TokenVerifier};
pub use hautai::{AnalysisHandles, HautAiClient, HautAiCredentials, ResultPayload};
