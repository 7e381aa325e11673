//! 源码编译安装：下载版本化源码包，configure / make / make install 到固定前缀。

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

use crate::error::{AppError, AppResult};
use crate::infrastructure::installer::extract_tar;
use crate::provision::step::{run_checked, ProvisionContext, ProvisionStep};
use crate::utils::FileSystemUtils;

/// 源码编译安装步骤（bcftools / vcftools）
pub struct SourceBuildStep {
    tool_name: String,
}

impl SourceBuildStep {
    pub fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
        }
    }

    /// 在源码目录内顺序执行构建阶段；任意非零退出立即终止
    fn build_stages(&self, build_dir: &Path, prefix: &Path) -> AppResult<()> {
        let envs = HashMap::new();
        let prefix_arg = format!("--prefix={}", prefix.display());

        let stages: [(&str, Vec<&str>); 3] = [
            ("configure", vec!["./configure", prefix_arg.as_str()]),
            ("make", vec!["make"]),
            ("install", vec!["make", "install"]),
        ];

        for (stage, argv) in stages {
            println!("🔧 {} {} ...", self.tool_name, stage);
            run_checked(argv[0], &argv[1..], &envs, Some(build_dir)).map_err(|e| {
                AppError::Build {
                    tool: self.tool_name.clone(),
                    stage: stage.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProvisionStep for SourceBuildStep {
    fn name(&self) -> &'static str {
        "source-build"
    }

    fn describe(&self, ctx: &ProvisionContext) -> String {
        match ctx.manifest.get(&self.tool_name) {
            Some(tool) => format!(
                "源码编译 {} {} 到前缀 {}",
                tool.name,
                tool.version,
                ctx.layout.root.display()
            ),
            None => format!("源码编译 {}（清单缺失）", self.tool_name),
        }
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        let tool = ctx.manifest.require(&self.tool_name)?.clone();
        println!("🚀 正在准备安装 {} {} ...", tool.name, tool.version);

        let work_dir = TempDir::new()?;
        let archive_path = work_dir.path().join(tool.filename()?);

        ctx.download_artifact(&tool, &archive_path).await?;

        // 解压并定位源码包惯例的唯一顶层目录
        let extract_dir = work_dir.path().join("src");
        extract_tar(&archive_path, &extract_dir)
            .map_err(|e| AppError::extract_failed(archive_path.display().to_string(), e))?;

        let build_dir = FileSystemUtils::single_subdir(&extract_dir)?
            .ok_or_else(|| {
                AppError::extract_failed(
                    archive_path.display().to_string(),
                    "源码包没有唯一的顶层目录".to_string(),
                )
            })?;

        self.build_stages(&build_dir, &ctx.layout.root)?;

        // 回执记录最终入口路径而非临时下载路径
        if let Some(entry) = &tool.entrypoint {
            let installed = ctx.layout.root.join(entry);
            if let Some(record) = ctx.receipt.entries.iter_mut().find(|e| e.name == tool.name)
            {
                record.install_path = installed.display().to_string();
            }
        }

        println!("✅ {} {} 安装完成", tool.name, tool.version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::{InstallLayout, LayoutKind};
    use crate::core::manifest::Manifest;
    use crate::infrastructure::config::builtin_variants;
    use crate::infrastructure::remote::DownloadOptions;

    fn test_context() -> ProvisionContext {
        let layout = InstallLayout::resolve(LayoutKind::Opt, None).unwrap();
        ProvisionContext::new(
            "cluster".to_string(),
            builtin_variants()["cluster"].clone(),
            layout,
            Manifest::builtin(),
            DownloadOptions::default(),
            "Etc/UTC".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_describe_names_tool_and_prefix() {
        let ctx = test_context();
        let step = SourceBuildStep::new("bcftools");
        let detail = step.describe(&ctx);
        assert!(detail.contains("bcftools"));
        assert!(detail.contains("1.9"));
        assert!(detail.contains("/opt/bioprov"));
    }

    #[tokio::test]
    async fn test_missing_manifest_entry_fails() {
        let mut ctx = test_context();
        let step = SourceBuildStep::new("samtools");
        assert!(step.run(&mut ctx).await.is_err());
    }
}
