//! 系统包安装：编译工具链、压缩库、Java 运行时、R 与传输工具。

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::constants::{apt, env as env_names};
use crate::error::{AppError, AppResult};
use crate::provision::step::{run_checked, ProvisionContext, ProvisionStep};

/// 系统包安装步骤
pub struct SystemPackagesStep;

#[async_trait]
impl ProvisionStep for SystemPackagesStep {
    fn name(&self) -> &'static str {
        "system-packages"
    }

    fn describe(&self, _ctx: &ProvisionContext) -> String {
        format!("安装 {} 个系统包（apt-get, 非交互模式）", apt::PACKAGES.len())
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        println!("🚀 安装系统包 ...");

        // tzdata 等包在交互模式下会阻塞构建
        let mut envs = HashMap::new();
        envs.insert(
            env_names::DEBIAN_FRONTEND.to_string(),
            "noninteractive".to_string(),
        );
        envs.insert(env_names::TZ.to_string(), ctx.timezone.clone());

        run_checked(apt::APT_GET, &["update"], &envs, None)
            .map_err(|e| AppError::package(format!("更新软件源失败: {e}")))?;

        let mut args = vec!["install", "-y", "--no-install-recommends"];
        args.extend_from_slice(apt::PACKAGES);
        run_checked(apt::APT_GET, &args, &envs, None)
            .map_err(|e| AppError::package(format!("安装系统包失败: {e}")))?;

        println!("✅ 系统包安装完成");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_list_covers_required_stacks() {
        // 源码编译（bcftools）依赖的压缩库与工具链
        for pkg in ["build-essential", "zlib1g-dev", "libbz2-dev", "liblzma-dev"] {
            assert!(apt::PACKAGES.contains(&pkg), "missing {pkg}");
        }
        // Beagle / GATK3 需要 JRE，R 供下游统计脚本使用
        assert!(apt::PACKAGES.contains(&"openjdk-8-jre-headless"));
        assert!(apt::PACKAGES.contains(&"r-base-core"));
        // tzdata 必须与非交互模式一起装
        assert!(apt::PACKAGES.contains(&"tzdata"));
    }
}
