//! 工具清单：每个工具的名称、版本、来源 URL 与安装方式。
//!
//! 除 conda 安装器（刻意不锁定）外，所有工具都锁定精确版本，
//! 两次构建之间不允许漂移。

use crate::error::{AppError, AppResult};
use crate::utils::{PathUtils, ValidationUtils};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 安装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// 源码编译安装（configure / make / make install）
    SourceBuild,
    /// 单个 jar，放入 src/<name>/ 后由环境变量引用
    Jar,
    /// zip 包，解压到 src/ 并符号链接入口点
    Zip,
    /// tar 归档，解压到 src/
    Tar,
    /// 单个可执行文件，放入 bin/
    Binary,
    /// 自解压安装器（conda bootstrap）
    Installer,
    /// 通过 conda 渠道安装的包
    CondaPackage,
}

/// 工具安装物（name, version, source URL, install kind）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolArtifact {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub url: Option<String>,
    /// 锁定的 SHA256 摘要，下载后校验；None 表示不校验
    #[serde(default)]
    pub sha256: Option<String>,
    pub kind: ArtifactKind,
    /// 入口点：归档类相对解包目录，源码编译类相对安装前缀；
    /// 可执行的符号链接进 bin，jar 由环境变量引用
    #[serde(default)]
    pub entrypoint: Option<String>,
    /// conda 包使用的渠道，按优先级排列
    #[serde(default)]
    pub channels: Vec<String>,
    /// 是否允许版本漂移（仅 conda 安装器这类刻意不锁定的组件）
    #[serde(default)]
    pub floating: bool,
}

impl ToolArtifact {
    /// 从 URL 推断下载文件名
    pub fn filename(&self) -> AppResult<String> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::config(format!("工具 '{}' 未提供下载 URL", self.name)))?;
        PathUtils::filename_from_url(url)
            .ok_or_else(|| AppError::config(format!("无法从 URL 推断文件名: {url}")))
    }

    /// 校验单个工具条目
    pub fn validate(&self) -> AppResult<()> {
        ValidationUtils::validate_tool_name(&self.name).map_err(|reason| {
            AppError::Validation {
                field: "name".to_string(),
                reason,
            }
        })?;

        if self.version.is_empty() {
            return Err(AppError::Validation {
                field: format!("{}.version", self.name),
                reason: "版本不能为空".to_string(),
            });
        }

        match self.kind {
            ArtifactKind::CondaPackage => {
                if self.channels.is_empty() {
                    return Err(AppError::Validation {
                        field: format!("{}.channels", self.name),
                        reason: "conda 包必须指定渠道".to_string(),
                    });
                }
            }
            _ => {
                let url = self.url.as_deref().ok_or_else(|| AppError::Validation {
                    field: format!("{}.url", self.name),
                    reason: "缺少下载 URL".to_string(),
                })?;
                ValidationUtils::validate_url(url).map_err(|reason| AppError::Validation {
                    field: format!("{}.url", self.name),
                    reason,
                })?;
            }
        }

        if let Some(digest) = &self.sha256 {
            ValidationUtils::validate_sha256(digest).map_err(|reason| AppError::Validation {
                field: format!("{}.sha256", self.name),
                reason,
            })?;
        }

        // 锁定工具不允许用漂移标记，防止 "latest" 蔓延
        if self.floating && self.kind != ArtifactKind::Installer {
            return Err(AppError::Validation {
                field: format!("{}.floating", self.name),
                reason: "只有 conda 安装器允许不锁定版本".to_string(),
            });
        }

        Ok(())
    }
}

/// 工具清单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub tools: Vec<ToolArtifact>,
}

impl Manifest {
    /// 内置默认清单（锁定版本）
    pub fn builtin() -> Self {
        let tools = vec![
            ToolArtifact {
                name: "bcftools".to_string(),
                version: "1.9".to_string(),
                url: Some(
                    "https://github.com/samtools/bcftools/releases/download/1.9/bcftools-1.9.tar.bz2"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::SourceBuild,
                entrypoint: Some("bin/bcftools".to_string()),
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "vcftools".to_string(),
                version: "0.1.16".to_string(),
                url: Some(
                    "https://github.com/vcftools/vcftools/releases/download/v0.1.16/vcftools-0.1.16.tar.gz"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::SourceBuild,
                entrypoint: Some("bin/vcftools".to_string()),
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "beagle".to_string(),
                version: "5.1-25Nov19.28d".to_string(),
                url: Some(
                    "https://faculty.washington.edu/browning/beagle/beagle.25Nov19.28d.jar"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Jar,
                entrypoint: Some("beagle.25Nov19.28d.jar".to_string()),
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "gatk4".to_string(),
                version: "4.1.4.1".to_string(),
                url: Some(
                    "https://github.com/broadinstitute/gatk/releases/download/4.1.4.1/gatk-4.1.4.1.zip"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Zip,
                entrypoint: Some("gatk-4.1.4.1/gatk".to_string()),
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "gatk3".to_string(),
                version: "3.8-1-0-gf15c1c3ef".to_string(),
                url: Some(
                    "https://storage.googleapis.com/gatk-software/package-archive/gatk/GenomeAnalysisTK-3.8-1-0-gf15c1c3ef.tar.bz2"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Tar,
                entrypoint: Some(
                    "GenomeAnalysisTK-3.8-1-0-gf15c1c3ef/GenomeAnalysisTK.jar".to_string(),
                ),
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "mc".to_string(),
                version: "RELEASE.2020-01-25T03-02-19Z".to_string(),
                url: Some(
                    "https://dl.min.io/client/mc/release/linux-amd64/archive/mc.RELEASE.2020-01-25T03-02-19Z"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Binary,
                entrypoint: None,
                channels: Vec::new(),
                floating: false,
            },
            ToolArtifact {
                name: "miniconda3".to_string(),
                // 刻意不锁定：上游只保证 latest 安装器可用
                version: "latest".to_string(),
                url: Some(
                    "https://repo.anaconda.com/miniconda/Miniconda3-latest-Linux-x86_64.sh"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Installer,
                entrypoint: None,
                channels: Vec::new(),
                floating: true,
            },
            ToolArtifact {
                name: "snakemake".to_string(),
                version: "5.8.1".to_string(),
                url: None,
                sha256: None,
                kind: ArtifactKind::CondaPackage,
                entrypoint: None,
                channels: crate::core::constants::defaults::CONDA_CHANNELS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                floating: false,
            },
        ];

        Manifest { tools }
    }

    /// 从 TOML 文件加载清单覆盖
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Path {
            path: path.display().to_string(),
            reason: format!("无法读取清单文件: {e}"),
        })?;
        let manifest: Manifest = toml::from_str(&content)
            .map_err(|e| AppError::config(format!("解析清单文件失败: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// 合并覆盖清单：同名条目整体替换，新条目追加
    pub fn merge_override(&mut self, other: Manifest) {
        for tool in other.tools {
            if let Some(existing) = self.tools.iter_mut().find(|t| t.name == tool.name) {
                *existing = tool;
            } else {
                self.tools.push(tool);
            }
        }
    }

    /// 按名称查找工具
    pub fn get(&self, name: &str) -> Option<&ToolArtifact> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// 按名称查找工具，找不到时返回错误
    pub fn require(&self, name: &str) -> AppResult<&ToolArtifact> {
        self.get(name)
            .ok_or_else(|| AppError::not_found(format!("清单中没有工具 '{name}'")))
    }

    /// 校验整个清单
    pub fn validate(&self) -> AppResult<()> {
        for tool in &self.tools {
            tool.validate()?;
        }

        // 名称必须唯一，环境变量才能指向单一制品
        for (i, tool) in self.tools.iter().enumerate() {
            if self.tools[i + 1..].iter().any(|t| t.name == tool.name) {
                return Err(AppError::Validation {
                    field: "tools".to_string(),
                    reason: format!("工具名称重复: {}", tool.name),
                });
            }
        }

        Ok(())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::builtin()
    }
}
