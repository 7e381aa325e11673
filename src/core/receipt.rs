//! 安装回执：成功制备结束时写入，记录每个制品的实际版本与摘要。
//!
//! `verify` 用它检查版本锁定是否成立；回执只是工具自身的记账，
//! 不构成应用状态。

use crate::error::{AppError, AppResult};
use crate::utils::FileSystemUtils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 单个制品的安装记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub url: Option<String>,
    /// 下载内容的实际 SHA256
    #[serde(default)]
    pub sha256: Option<String>,
    pub install_path: String,
    /// 是否为刻意不锁定的组件
    #[serde(default)]
    pub floating: bool,
}

/// 安装回执
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub variant: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<ReceiptEntry>,
}

impl Receipt {
    pub fn new(variant: &str) -> Self {
        Self {
            variant: variant.to_string(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// 记录一个制品；同名条目覆盖
    pub fn record(&mut self, entry: ReceiptEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ReceiptEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// 写入回执文件
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("序列化回执失败: {e}")))?;
        FileSystemUtils::write_to_string(path, &content)?;
        Ok(())
    }

    /// 读取回执文件
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Path {
            path: path.display().to_string(),
            reason: format!("无法读取回执文件: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| AppError::config(format!("解析回执失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry() -> ReceiptEntry {
        ReceiptEntry {
            name: "beagle".to_string(),
            version: "5.1-25Nov19.28d".to_string(),
            url: Some(
                "https://faculty.washington.edu/browning/beagle/beagle.25Nov19.28d.jar"
                    .to_string(),
            ),
            sha256: Some(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string(),
            ),
            install_path: "/opt/bioprov/src/beagle/beagle.25Nov19.28d.jar".to_string(),
            floating: false,
        }
    }

    #[test]
    fn test_record_overwrites_by_name() {
        let mut receipt = Receipt::new("cluster");
        receipt.record(sample_entry());

        let mut updated = sample_entry();
        updated.version = "5.4".to_string();
        receipt.record(updated);

        assert_eq!(receipt.entries.len(), 1);
        assert_eq!(receipt.get("beagle").unwrap().version, "5.4");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("share/bioprov/receipt.toml");

        let mut receipt = Receipt::new("cluster");
        receipt.record(sample_entry());
        receipt.save(&path).unwrap();

        let loaded = Receipt::load(&path).unwrap();
        assert_eq!(loaded.variant, "cluster");
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(
            loaded.get("beagle").unwrap().install_path,
            "/opt/bioprov/src/beagle/beagle.25Nov19.28d.jar"
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Receipt::load(&dir.path().join("missing.toml")).is_err());
    }
}
