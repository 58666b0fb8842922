pub mod id_token;
pub mod oauth;
pub mod session;

pub use session::{Account, Credential, Purpose, Session};
