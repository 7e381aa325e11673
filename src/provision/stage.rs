//! 构建上下文暂存：Snakefile 与 WatchDog 目录原样复制进镜像。
//!
//! 这些输入的内部内容对本工具不透明，属于外部协作方。

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::provision::step::{ProvisionContext, ProvisionStep};
use crate::utils::FileSystemUtils;

/// 构建上下文暂存步骤
pub struct StageInputsStep {
    /// 输入查找目录；默认为当前工作目录
    source_dir: Option<PathBuf>,
}

impl StageInputsStep {
    pub fn new() -> Self {
        Self { source_dir: None }
    }

    pub fn with_source_dir(source_dir: PathBuf) -> Self {
        Self {
            source_dir: Some(source_dir),
        }
    }

    fn resolve_source_dir(&self) -> AppResult<PathBuf> {
        match &self.source_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(Into::into),
        }
    }
}

impl Default for StageInputsStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProvisionStep for StageInputsStep {
    fn name(&self) -> &'static str {
        "stage-inputs"
    }

    fn describe(&self, ctx: &ProvisionContext) -> String {
        format!(
            "原样复制构建上下文输入: {}",
            ctx.variant.stage_inputs.join(", ")
        )
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> AppResult<()> {
        let source_dir = self.resolve_source_dir()?;
        let context_dir = ctx.layout.context_dir();

        for input in &ctx.variant.stage_inputs {
            let source = source_dir.join(input);
            let target = context_dir.join(input);

            if source.is_dir() {
                println!("📂 复制目录 {} ...", input);
                FileSystemUtils::copy_dir_all(&source, &target)?;
            } else if source.is_file() {
                println!("📄 复制文件 {} ...", input);
                FileSystemUtils::copy_file(&source, &target)?;
            } else {
                return Err(AppError::not_found(format!(
                    "构建上下文输入 '{}' 不存在于 {}",
                    input,
                    source_dir.display()
                )));
            }
        }

        println!("✅ 构建上下文暂存完成");
        Ok(())
    }
}
