//! 二进制与归档抓取安装：固定 URL 下载到固定路径，可选解包与符号链接。

use async_trait::async_trait;
use tempfile::TempDir;

use crate::core::manifest::ArtifactKind;
use crate::error::{AppError, AppResult};
use crate::infrastructure::installer::{extract_tar, extract_zip};
use crate::provision::step::{ProvisionContext, ProvisionStep};
use crate::utils::FileSystemUtils;

/// 归档/二进制抓取安装步骤（Beagle jar、GATK4 zip、GATK3 tar、mc）
pub struct FetchArtifactStep {
    tool_name: String,
}

impl FetchArtifactStep {
    pub fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
        }
    }
}

#[async_trait]
impl ProvisionStep for FetchArtifactStep {
    fn name(&self) -> &'static str {
        "fetch-artifact"
    }

    fn describe(&self, ctx: &ProvisionContext) -> String {
        match ctx.manifest.get(&self.tool_name) {
            Some(tool) => {
                let action = match tool.kind {
                    ArtifactKind::Jar => "放置 jar",
                    ArtifactKind::Zip => "解压 zip 包",
                    ArtifactKind::Tar => "解压 tar 归档",
                    ArtifactKind::Binary => "安装可执行文件",
                    _ => "抓取",
                };
                format!("{} {} {}", action, tool.name, tool.version)
            }
            None => format!("抓取 {}（清单缺失）", self.tool_name),
        }
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        let tool = ctx.manifest.require(&self.tool_name)?.clone();
        println!("🚀 正在准备安装 {} {} ...", tool.name, tool.version);

        let tool_dir = ctx.layout.tool_dir(&tool.name);

        match tool.kind {
            ArtifactKind::Jar => {
                // 单个 jar：直接落到版本化目录，由环境变量引用
                let dest = tool_dir.join(tool.filename()?);
                ctx.download_artifact(&tool, &dest).await?;
            }
            ArtifactKind::Zip | ArtifactKind::Tar => {
                let work_dir = TempDir::new()?;
                let archive_path = work_dir.path().join(tool.filename()?);
                ctx.download_artifact(&tool, &archive_path).await?;

                if tool.kind == ArtifactKind::Zip {
                    extract_zip(&archive_path, &tool_dir).map_err(|e| {
                        AppError::extract_failed(archive_path.display().to_string(), e)
                    })?;
                } else {
                    extract_tar(&archive_path, &tool_dir).map_err(|e| {
                        AppError::extract_failed(archive_path.display().to_string(), e)
                    })?;
                }

                // 入口点必须真实存在，环境变量才能指向单一制品
                if let Some(entry) = &tool.entrypoint {
                    let entry_path = tool_dir.join(entry);
                    if !entry_path.exists() {
                        return Err(AppError::extract_failed(
                            archive_path.display().to_string(),
                            format!("解包后缺少入口点 {}", entry_path.display()),
                        ));
                    }

                    // 可执行入口点链接进 bin；jar 之类只被环境变量引用
                    if FileSystemUtils::is_executable(&entry_path) {
                        let link = ctx
                            .layout
                            .bin_dir()
                            .join(entry_path.file_name().unwrap_or_default());
                        FileSystemUtils::symlink_replace(&entry_path, &link)?;
                        println!("🔗 {} -> {}", link.display(), entry_path.display());
                    }

                    if let Some(record) =
                        ctx.receipt.entries.iter_mut().find(|e| e.name == tool.name)
                    {
                        record.install_path = entry_path.display().to_string();
                    }
                }
            }
            ArtifactKind::Binary => {
                let dest = ctx.layout.bin_dir().join(&tool.name);
                ctx.download_artifact(&tool, &dest).await?;
                FileSystemUtils::make_executable(&dest)?;
            }
            other => {
                return Err(AppError::internal(format!(
                    "FetchArtifactStep 不处理 {:?} 类型的工具 '{}'",
                    other, tool.name
                )));
            }
        }

        println!("✅ {} {} 安装完成", tool.name, tool.version);
        Ok(())
    }
}
