//! conda 引导：安装自包含 Python 发行版，再从命名渠道装入工作流引擎。

use async_trait::async_trait;
use std::collections::HashMap;
use tempfile::TempDir;

use crate::core::receipt::ReceiptEntry;
use crate::error::{safe_path_to_str, AppResult};
use crate::provision::step::{run_checked, ProvisionContext, ProvisionStep};

/// conda 引导与 Snakemake 安装步骤
pub struct CondaBootstrapStep;

#[async_trait]
impl ProvisionStep for CondaBootstrapStep {
    fn name(&self) -> &'static str {
        "conda-bootstrap"
    }

    fn describe(&self, ctx: &ProvisionContext) -> String {
        let snakemake_version = ctx
            .manifest
            .get("snakemake")
            .map(|t| t.version.as_str())
            .unwrap_or("?");
        format!(
            "安装 Miniconda 到 {} 并装入 snakemake={}",
            ctx.layout.conda_dir().display(),
            snakemake_version
        )
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        let installer = ctx.manifest.require("miniconda3")?.clone();
        let snakemake = ctx.manifest.require("snakemake")?.clone();
        let conda_dir = ctx.layout.conda_dir();

        println!("🚀 引导 conda 发行版 ...");

        let work_dir = TempDir::new()?;
        let installer_path = work_dir.path().join(installer.filename()?);
        ctx.download_artifact(&installer, &installer_path).await?;

        // -b 批处理模式；目标目录已存在说明不是全新基础镜像，直接失败
        let envs = HashMap::new();
        let installer_str = safe_path_to_str(&installer_path)?;
        let conda_dir_str = safe_path_to_str(&conda_dir)?;
        run_checked(
            "bash",
            &[installer_str, "-b", "-p", conda_dir_str],
            &envs,
            None,
        )?;

        if let Some(record) = ctx
            .receipt
            .entries
            .iter_mut()
            .find(|e| e.name == installer.name)
        {
            record.install_path = conda_dir.display().to_string();
        }

        println!("📦 从渠道 {} 安装 snakemake ...", snakemake.channels.join(", "));

        let conda_bin = conda_dir.join("bin/conda");
        let conda_bin_str = safe_path_to_str(&conda_bin)?;
        let spec = format!("snakemake={}", snakemake.version);

        let mut args = vec!["install", "-y"];
        for channel in &snakemake.channels {
            args.push("-c");
            args.push(channel);
        }
        args.push(&spec);
        run_checked(conda_bin_str, &args, &envs, None)?;

        ctx.receipt.record(ReceiptEntry {
            name: snakemake.name.clone(),
            version: snakemake.version.clone(),
            url: None,
            sha256: None,
            install_path: ctx
                .layout
                .conda_bin_dir()
                .join("snakemake")
                .display()
                .to_string(),
            floating: false,
        });

        println!("✅ conda 与 snakemake 安装完成");
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

    #[test]
    fn test_describe_names_channels_target() {
        let layout = InstallLayout::resolve(LayoutKind::Opt, None).unwrap();
        let ctx = ProvisionContext::new(
            "minimal".to_string(),
            builtin_variants()["minimal"].clone(),
            layout,
            Manifest::builtin(),
            DownloadOptions::default(),
            "Etc/UTC".to_string(),
        )
        .unwrap();

        let detail = CondaBootstrapStep.describe(&ctx);
        assert!(detail.contains("/opt/bioprov/conda"));
        assert!(detail.contains("snakemake=5.8.1"));
    }
}
