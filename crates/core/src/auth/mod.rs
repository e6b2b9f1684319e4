//! Authentication: token persistence, state broadcast and the coordinator
//! that sequences sign-in, sign-out and refresh.

pub mod coordinator;
pub mod ports;
pub mod state;
pub mod token_store;
pub mod validation;

pub use coordinator::AuthCoordinator;
pub use ports::{TokenStore, TokenStoreError};
pub use state::AuthStateStore;
pub use token_store::SecretTokenStore;
