//! 安装目录布局。
//!
//! 两种布局对应三个历史配方的差异：用户本地的 `~/.local/{bin,src}` 树，
//! 以及系统级的 `/opt/bioprov/{bin,src,share}` 树。

use crate::core::constants::defaults;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 布局类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// 用户本地布局：~/.local
    UserLocal,
    /// 系统布局：/opt/bioprov
    Opt,
}

/// 安装目录布局
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallLayout {
    pub kind: LayoutKind,
    pub root: PathBuf,
}

impl InstallLayout {
    /// 解析布局；override_root 优先于布局默认根目录
    pub fn resolve(kind: LayoutKind, override_root: Option<&Path>) -> AppResult<Self> {
        let root = match override_root {
            Some(path) => path.to_path_buf(),
            None => match kind {
                LayoutKind::Opt => PathBuf::from(defaults::OPT_ROOT),
                LayoutKind::UserLocal => {
                    let home = dirs::home_dir()
                        .ok_or_else(|| AppError::config("无法获取用户主目录"))?;
                    home.join(defaults::USER_LOCAL_ROOT)
                }
            },
        };

        Ok(Self { kind, root })
    }

    /// 入口点符号链接目录
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// 版本化工具目录
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// conda 发行版目录
    pub fn conda_dir(&self) -> PathBuf {
        self.root.join(defaults::CONDA_DIR)
    }

    /// conda 的 bin 目录（snakemake 等入口）
    pub fn conda_bin_dir(&self) -> PathBuf {
        self.conda_dir().join("bin")
    }

    /// 运行时环境声明脚本路径
    pub fn profile_script(&self) -> PathBuf {
        self.root.join(defaults::PROFILE_SCRIPT)
    }

    /// 安装回执路径
    pub fn receipt_path(&self) -> PathBuf {
        self.root.join(defaults::RECEIPT_FILE)
    }

    /// 构建上下文暂存目录
    pub fn context_dir(&self) -> PathBuf {
        self.root.join(defaults::CONTEXT_DIR)
    }

    /// 工具的版本化安装目录
    pub fn tool_dir(&self, name: &str) -> PathBuf {
        self.src_dir().join(name)
    }

    /// 创建布局骨架目录
    pub fn create_skeleton(&self) -> AppResult<()> {
        for dir in [self.bin_dir(), self.src_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| AppError::Path {
                path: dir.display().to_string(),
                reason: format!("无法创建目录: {e}"),
            })?;
        }
        Ok(())
    }
}
