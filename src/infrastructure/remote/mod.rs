pub mod download;
pub mod http_client;

pub use download::*;
pub use http_client::*;
