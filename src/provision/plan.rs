//! 制备计划：按变体展开成严格线性的步骤序列。
//!
//! 没有分支、没有重试、没有回滚；终态只有「完整制备」或「构建中止」。

use serde::Serialize;

use crate::error::ContextualResult;
use crate::infrastructure::config::VariantConfig;
use crate::infrastructure::network::NetworkTester;
use crate::provision::archive::FetchArtifactStep;
use crate::provision::conda::CondaBootstrapStep;
use crate::provision::env_export::EnvExportStep;
use crate::provision::source_build::SourceBuildStep;
use crate::provision::stage::StageInputsStep;
use crate::provision::step::{ProvisionContext, ProvisionStep};
use crate::provision::system::SystemPackagesStep;

/// 计划中一个步骤的描述（plan / dry-run 输出）
#[derive(Debug, Clone, Serialize)]
pub struct StepDescription {
    pub index: usize,
    pub name: String,
    pub detail: String,
}

/// 制备计划
pub struct ProvisionPlan {
    steps: Vec<Box<dyn ProvisionStep>>,
}

impl ProvisionPlan {
    /// 按变体构建步骤序列；顺序固定，差异点只增减步骤
    pub fn build(variant: &VariantConfig) -> Self {
        let mut steps: Vec<Box<dyn ProvisionStep>> = vec![Box::new(SystemPackagesStep)];

        steps.push(Box::new(SourceBuildStep::new("bcftools")));
        if variant.include_vcftools {
            steps.push(Box::new(SourceBuildStep::new("vcftools")));
        }

        steps.push(Box::new(FetchArtifactStep::new("beagle")));
        steps.push(Box::new(FetchArtifactStep::new("gatk4")));
        steps.push(Box::new(FetchArtifactStep::new("gatk3")));
        if variant.include_object_storage {
            steps.push(Box::new(FetchArtifactStep::new("mc")));
        }

        steps.push(Box::new(CondaBootstrapStep));

        if !variant.stage_inputs.is_empty() {
            steps.push(Box::new(StageInputsStep::new()));
        }

        // 环境导出必须殿后：中止的构建不能留下部分导出状态
        steps.push(Box::new(EnvExportStep));

        Self { steps }
    }

    /// 步骤描述列表
    pub fn describe(&self, ctx: &ProvisionContext) -> Vec<StepDescription> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepDescription {
                index: i + 1,
                name: step.name().to_string(),
                detail: step.describe(ctx),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 顺序执行全部步骤；任何失败立即中止，整个制备须从头重来
    pub async fn execute(&self, ctx: &mut ProvisionContext) -> ContextualResult<()> {
        ctx.layout.create_skeleton().map_err(|e| {
            let mut wrapped = e.with_context("创建安装目录骨架");
            wrapped.context.suggestions = vec!["检查安装根目录的写权限".to_string()];
            wrapped
        })?;

        let total = self.steps.len();
        for (i, step) in self.steps.iter().enumerate() {
            println!("\n📋 [{}/{}] {}", i + 1, total, step.describe(ctx));
            step.run(ctx).await.map_err(|e| {
                let suggestions = NetworkTester::provide_suggestions(&e.to_string());
                let mut wrapped = e.with_context(&format!("步骤 {} ({})", i + 1, step.name()));
                wrapped.context.suggestions = suggestions;
                wrapped
            })?;
        }

        println!("\n🎉 变体 '{}' 制备完成: {}", ctx.variant_name, ctx.layout.root.display());
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

    fn context_for(variant_name: &str) -> ProvisionContext {
        let variant = builtin_variants()[variant_name].clone();
        let layout = InstallLayout::resolve(LayoutKind::Opt, None).unwrap();
        ProvisionContext::new(
            variant_name.to_string(),
            variant,
            layout,
            Manifest::builtin(),
            DownloadOptions::default(),
            "Etc/UTC".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_cluster_plan_is_linear_and_complete() {
        let ctx = context_for("cluster");
        let plan = ProvisionPlan::build(&ctx.variant);
        let descriptions = plan.describe(&ctx);

        let names: Vec<&str> = descriptions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "system-packages",
                "source-build", // bcftools
                "source-build", // vcftools
                "fetch-artifact", // beagle
                "fetch-artifact", // gatk4
                "fetch-artifact", // gatk3
                "fetch-artifact", // mc
                "conda-bootstrap",
                "stage-inputs",
                "env-export",
            ]
        );

        // 索引从 1 开始且连续
        for (i, d) in descriptions.iter().enumerate() {
            assert_eq!(d.index, i + 1);
        }
    }

    #[test]
    fn test_minimal_plan_drops_optional_steps() {
        let ctx = context_for("minimal");
        let plan = ProvisionPlan::build(&ctx.variant);
        let descriptions = plan.describe(&ctx);

        assert!(!descriptions.iter().any(|d| d.detail.contains("vcftools")));
        assert!(!descriptions.iter().any(|d| d.detail.contains("mc ")));
        assert!(!descriptions.iter().any(|d| d.name == "stage-inputs"));

        // 环境导出永远是最后一步
        assert_eq!(descriptions.last().unwrap().name, "env-export");
    }

    #[test]
    fn test_workstation_plan_includes_vcftools() {
        let ctx = context_for("workstation");
        let plan = ProvisionPlan::build(&ctx.variant);
        let descriptions = plan.describe(&ctx);

        assert!(descriptions.iter().any(|d| d.detail.contains("vcftools")));
        assert!(descriptions.iter().any(|d| d.name == "stage-inputs"));
        assert!(!descriptions
            .iter()
            .any(|d| d.detail.contains("mc RELEASE")));
    }
}
