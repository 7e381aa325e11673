//! 环境导出：把固定变量集合绑定到前面步骤建立的路径上。
//!
//! 构建期导出写入制备进程自身；运行期声明渲染为 profile 脚本。
//! 该步骤排在最后，制备失败时不存在部分导出状态。

use async_trait::async_trait;

use crate::core::environment::{standard_bindings, EnvScope};
use crate::error::AppResult;
use crate::infrastructure::shell::{ScriptBuilder, ShellType};
use crate::provision::step::{ProvisionContext, ProvisionStep};
use crate::utils::{EnvVarUtils, FileSystemUtils};

/// 环境导出步骤
pub struct EnvExportStep;

#[async_trait]
impl ProvisionStep for EnvExportStep {
    fn name(&self) -> &'static str {
        "env-export"
    }

    fn describe(&self, ctx: &ProvisionContext) -> String {
        format!(
            "导出环境变量并写入 {}",
            ctx.layout.profile_script().display()
        )
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        println!("🚀 导出环境变量 ...");

        let bindings = standard_bindings(&ctx.layout, &ctx.manifest, &ctx.timezone)?;

        // 构建期：全部绑定注入当前进程，后续使用方（同一构建 shell）可见
        for binding in &bindings {
            if binding.prepend_path {
                let dirs: Vec<String> =
                    binding.value.split(':').map(|s| s.to_string()).collect();
                EnvVarUtils::prepend_path(&dirs)
                    .map_err(crate::error::AppError::internal)?;
            } else {
                EnvVarUtils::set(&binding.name, &binding.value)
                    .map_err(crate::error::AppError::internal)?;
            }
            let scope = match binding.scope {
                EnvScope::Build => "build",
                EnvScope::Runtime => "runtime",
            };
            println!("  🔑 {} [{}]", binding.name, scope);
        }

        // 运行期：声明写入 profile 脚本，容器启动时重新生效
        let builder = ScriptBuilder::new()?;
        let script = builder.render_runtime_env(ShellType::Bash, &bindings)?;
        FileSystemUtils::write_to_string(&ctx.layout.profile_script(), &script)?;

        ctx.bindings = bindings;

        // 最后落盘回执；至此所有制品均已就位
        ctx.receipt.save(&ctx.layout.receipt_path())?;

        println!("✅ 环境导出完成: {}", ctx.layout.profile_script().display());
        Ok(())
    }
}
