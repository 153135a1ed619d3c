pub mod token;

pub use token::{RefreshResponse, TokenPair, TokenResponse, TokenStore};
