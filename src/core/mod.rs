//! 核心领域模型：清单、布局、环境绑定、回执与校验。

pub mod constants;
pub mod environment;
pub mod layout;
pub mod manifest;
pub mod receipt;
pub mod verify;

pub use environment::{standard_bindings, EnvBinding, EnvScope};
pub use layout::{InstallLayout, LayoutKind};
pub use manifest::{ArtifactKind, Manifest, ToolArtifact};
pub use receipt::{Receipt, ReceiptEntry};
pub use verify::{run_checks, CheckResult, VerifyReport};
