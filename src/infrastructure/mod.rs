pub mod config;
pub mod installer;
pub mod network;
pub mod remote;
pub mod shell;

pub use config::*;
pub use installer::*;
pub use network::*;
pub use remote::*;
pub use shell::*;
