//! 制备步骤抽象：严格线性执行，快速失败。

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::core::environment::EnvBinding;
use crate::core::layout::InstallLayout;
use crate::core::manifest::{Manifest, ToolArtifact};
use crate::core::receipt::{Receipt, ReceiptEntry};
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::VariantConfig;
use crate::infrastructure::installer::create_progress_bar;
use crate::infrastructure::remote::{download_to_file_with_options, file_sha256, DownloadOptions};

/// 制备上下文：被唯一写者（制备流程本身）顺序修改
pub struct ProvisionContext {
    pub variant_name: String,
    pub variant: VariantConfig,
    pub layout: InstallLayout,
    pub manifest: Manifest,
    pub download: DownloadOptions,
    pub timezone: String,
    pub client: reqwest::Client,
    /// 环境导出步骤建立的绑定
    pub bindings: Vec<EnvBinding>,
    pub receipt: Receipt,
}

impl ProvisionContext {
    pub fn new(
        variant_name: String,
        variant: VariantConfig,
        layout: InstallLayout,
        manifest: Manifest,
        download: DownloadOptions,
        timezone: String,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(download.connect_timeout_sec))
            .timeout(std::time::Duration::from_secs(download.read_timeout_sec))
            .user_agent(concat!("bioprov/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::download(format!("创建 HTTP 客户端失败: {e}")))?;

        let receipt = Receipt::new(&variant_name);

        Ok(Self {
            variant_name,
            variant,
            layout,
            manifest,
            download,
            timezone,
            client,
            bindings: Vec::new(),
            receipt,
        })
    }

    /// 下载一个制品到指定路径，带进度条与可选摘要校验；
    /// 返回实际 SHA256 并写入回执。
    pub async fn download_artifact(
        &mut self,
        tool: &ToolArtifact,
        dest: &Path,
    ) -> AppResult<String> {
        let url = tool
            .url
            .as_deref()
            .ok_or_else(|| AppError::config(format!("工具 '{}' 未提供下载 URL", tool.name)))?;

        // 目标已在位且摘要与锁定一致时直接复用（中断后的重跑场景）
        if let Some(expected) = &tool.sha256 {
            if dest.is_file() {
                if let Ok(actual) = file_sha256(dest).await {
                    if actual.eq_ignore_ascii_case(expected) {
                        println!("✅ {} 已在位且摘要匹配，跳过下载", tool.name);
                        self.record_download(tool, url, &actual, dest);
                        return Ok(actual);
                    }
                }
                let _ = tokio::fs::remove_file(dest).await;
            }
        }

        println!("📥 下载 {} {} ...", tool.name, tool.version);

        let pb = create_progress_bar();
        let digest = download_to_file_with_options(&self.client, url, dest, |downloaded, total| {
            if total > 0 {
                pb.set_length(total);
            }
            pb.set_position(downloaded);
        }, self.download.clone())
        .await
        .map_err(AppError::download)?;
        pb.finish_and_clear();

        // 摘要不符即终止，损坏的文件不留在原位
        if let Some(expected) = &tool.sha256 {
            if !digest.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(AppError::Checksum {
                    artifact: tool.name.clone(),
                    expected: expected.clone(),
                    actual: digest,
                });
            }
            println!("✅ {} SHA256 校验通过", tool.name);
        }

        self.record_download(tool, url, &digest, dest);
        Ok(digest)
    }

    fn record_download(&mut self, tool: &ToolArtifact, url: &str, digest: &str, dest: &Path) {
        self.receipt.record(ReceiptEntry {
            name: tool.name.clone(),
            version: tool.version.clone(),
            url: Some(url.to_string()),
            sha256: Some(digest.to_string()),
            install_path: dest.display().to_string(),
            floating: tool.floating,
        });
    }
}

/// 单个制备步骤
///
/// 每个步骤假设前序步骤已成功；任何失败都终止整个制备，
/// 没有重试，也没有回滚。
#[async_trait]
pub trait ProvisionStep: Send + Sync {
    fn name(&self) -> &'static str;

    /// 步骤内容的一行描述（plan / dry-run 输出）
    fn describe(&self, ctx: &ProvisionContext) -> String;

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()>;
}

/// 执行外部命令并在非零退出时失败
pub fn run_checked(
    program: &str,
    args: &[&str],
    envs: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> AppResult<()> {
    let mut command = Command::new(program);
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command
        .status()
        .map_err(|e| AppError::command_failed(program, format!("无法启动: {e}")))?;

    if !status.success() {
        return Err(AppError::command_failed(
            program,
            format!("退出状态 {status}，参数: {}", args.join(" ")),
        ));
    }

    Ok(())
}
