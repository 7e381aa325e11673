//! 环境变量绑定：下游工具按名称而不是按路径定位工具。
//!
//! 构建期绑定注入制备进程自身（后续步骤可见），运行期绑定渲染为
//! profile 脚本或容器 ENV 声明，容器生命周期内不再变更。

use crate::core::constants::env as env_names;
use crate::core::layout::InstallLayout;
use crate::core::manifest::Manifest;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 变量作用域：构建期 shell 导出 vs 运行期容器环境声明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvScope {
    Build,
    Runtime,
}

/// 环境变量绑定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvBinding {
    pub name: String,
    pub value: String,
    pub scope: EnvScope,
    /// PATH 语义：值是前置目录列表（冒号分隔），渲染时保留原 PATH
    pub prepend_path: bool,
}

impl EnvBinding {
    pub fn new(name: &str, value: impl Into<String>, scope: EnvScope) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            scope,
            prepend_path: false,
        }
    }

    pub fn path_prepend(dirs: &[PathBuf]) -> Self {
        let value = dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        Self {
            name: env_names::PATH.to_string(),
            value,
            scope: EnvScope::Runtime,
            prepend_path: true,
        }
    }
}

/// Beagle jar 的安装路径
pub fn beagle_jar_path(layout: &InstallLayout, manifest: &Manifest) -> AppResult<PathBuf> {
    let beagle = manifest.require("beagle")?;
    let entry = beagle
        .entrypoint
        .as_deref()
        .ok_or_else(|| AppError::config("beagle 条目缺少 entrypoint"))?;
    Ok(layout.tool_dir(&beagle.name).join(entry))
}

/// GATK4 本地 jar 的安装路径（zip 内随版本命名）
pub fn gatk4_local_jar_path(layout: &InstallLayout, manifest: &Manifest) -> AppResult<PathBuf> {
    let gatk4 = manifest.require("gatk4")?;
    let entry = gatk4
        .entrypoint
        .as_deref()
        .ok_or_else(|| AppError::config("gatk4 条目缺少 entrypoint"))?;
    let unpack_dir = PathBuf::from(entry)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    Ok(layout
        .tool_dir(&gatk4.name)
        .join(unpack_dir)
        .join(format!("gatk-package-{}-local.jar", gatk4.version)))
}

/// 旧版 GATK3 jar 的安装路径
pub fn gatk3_jar_path(layout: &InstallLayout, manifest: &Manifest) -> AppResult<PathBuf> {
    let gatk3 = manifest.require("gatk3")?;
    let entry = gatk3
        .entrypoint
        .as_deref()
        .ok_or_else(|| AppError::config("gatk3 条目缺少 entrypoint"))?;
    Ok(layout.tool_dir(&gatk3.name).join(entry))
}

/// 标准环境变量绑定集合
///
/// 固定的变量名集合，指向上面建立的安装路径；TZ 只在构建期生效，
/// 其余在运行期重新声明。
pub fn standard_bindings(
    layout: &InstallLayout,
    manifest: &Manifest,
    timezone: &str,
) -> AppResult<Vec<EnvBinding>> {
    let mut bindings = Vec::new();

    bindings.push(EnvBinding::new(
        env_names::TZ,
        timezone,
        EnvScope::Build,
    ));

    bindings.push(EnvBinding::path_prepend(&[
        layout.bin_dir(),
        layout.conda_bin_dir(),
    ]));

    let beagle_jar = beagle_jar_path(layout, manifest)?;
    // 历史名称 BEAGLE 与 BEAGLE_JAR 并存，WatchDog 只读后者
    bindings.push(EnvBinding::new(
        env_names::BEAGLE,
        beagle_jar.display().to_string(),
        EnvScope::Runtime,
    ));
    bindings.push(EnvBinding::new(
        env_names::BEAGLE_JAR,
        beagle_jar.display().to_string(),
        EnvScope::Runtime,
    ));

    bindings.push(EnvBinding::new(
        env_names::GATK_LOCAL_JAR,
        gatk4_local_jar_path(layout, manifest)?.display().to_string(),
        EnvScope::Runtime,
    ));

    bindings.push(EnvBinding::new(
        env_names::GATK3_JAR,
        gatk3_jar_path(layout, manifest)?.display().to_string(),
        EnvScope::Runtime,
    ));

    Ok(bindings)
}
