use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bioprov CLI 应用程序
#[derive(Parser)]
#[command(name = "bioprov")]
#[command(about = "生物信息学工具链镜像环境制备工具，版本锁定、线性步骤", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 顶级命令
#[derive(Subcommand)]
pub enum Commands {
    /// 按变体执行完整制备
    Provision {
        /// 变体名称（workstation / cluster / minimal）
        #[arg(short, long)]
        variant: Option<String>,
        /// 覆盖清单文件路径（TOML，按工具名覆盖内置锁定）
        #[arg(short, long)]
        manifest: Option<PathBuf>,
        /// 覆盖安装根目录
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// 只打印步骤序列，不执行
        #[arg(long)]
        dry_run: bool,
    },
    /// 打印变体展开后的步骤序列
    Plan {
        /// 变体名称
        #[arg(short, long)]
        variant: Option<String>,
        /// 覆盖清单文件路径
        #[arg(short, long)]
        manifest: Option<PathBuf>,
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 校验一次已完成的制备
    Verify {
        /// 变体名称
        #[arg(short, long)]
        variant: Option<String>,
        /// 覆盖清单文件路径（须与制备时一致，锁定才可比对）
        #[arg(short, long)]
        manifest: Option<PathBuf>,
        /// 覆盖安装根目录
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 渲染运行期环境变量声明
    Env {
        /// Shell 类型（bash / fish / dockerfile）
        #[arg(short, long, default_value = "bash")]
        shell: String,
        /// 变体名称
        #[arg(short, long)]
        variant: Option<String>,
        /// 覆盖清单文件路径
        #[arg(short, long)]
        manifest: Option<PathBuf>,
        /// 覆盖安装根目录
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
    /// 显示生效的版本锁定清单
    Manifest {
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
        /// 覆盖清单文件路径
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// 网络连接诊断
    NetworkTest,
}
