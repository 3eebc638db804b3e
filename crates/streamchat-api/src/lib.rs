// streamchat-api: auth REST client and network error plumbing for streamchat

pub mod auth;
pub mod classify;
pub mod error;
pub mod network_error;
pub mod result;
pub mod transport;

pub use auth::client::AuthClient;
pub use auth::{AuthDataSource, SessionToken, SignUpRecord};
pub use error::Error;
pub use network_error::NetworkError;
pub use result::{EmptyResult, ResultExt};
pub use transport::{TlsMode, TransportConfig};
