// 核心模块
pub mod cli;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod provision;
pub mod utils;

// 重新导出常用类型
pub use cli::{Cli, CommandHandler};
pub use error::*;
pub use utils::*;
// 使用命名空间导入常量，避免与内建 core 冲突
pub use self::core::constants as app_constants;

pub use self::core::layout::{InstallLayout, LayoutKind};
pub use self::core::manifest::{ArtifactKind, Manifest, ToolArtifact};
pub use self::core::receipt::{Receipt, ReceiptEntry};
pub use infrastructure::config::Config;
pub use infrastructure::network::NetworkTester;
pub use infrastructure::remote::DownloadOptions;
pub use infrastructure::shell::ShellType;
pub use provision::{ProvisionContext, ProvisionPlan, ProvisionStep};
