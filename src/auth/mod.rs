pub mod identity_token_source;
pub mod static_token_source;
pub mod stored_token_source;
pub mod token_source;

// Re-export from token_source.rs so we can do "use crate::auth::*;"
pub use identity_token_source::{IdentityConfig, IdentityTokenSource};
pub use token_source::{create_token_source, TokenChain, TokenSource, TokenSourceConfig};
