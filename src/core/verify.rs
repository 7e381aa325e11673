//! 安装校验：制备完成后对照清单与回执做只读检查。
//!
//! 校验从不修复，报告里每一项都带可读的结论。

use serde::Serialize;
use std::path::Path;

use crate::core::environment::{self, EnvScope};
use crate::core::layout::InstallLayout;
use crate::core::manifest::Manifest;
use crate::core::receipt::Receipt;
use crate::error::AppResult;
use crate::infrastructure::config::VariantConfig;
use crate::utils::FileSystemUtils;

/// 单项检查结果
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// 校验报告
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub variant: String,
    pub root: String,
    pub checks: Vec<CheckResult>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}

/// 运行期绑定指向的路径都应存在
pub fn check_bindings(
    layout: &InstallLayout,
    manifest: &Manifest,
    timezone: &str,
) -> AppResult<Vec<CheckResult>> {
    let mut results = Vec::new();

    for binding in environment::standard_bindings(layout, manifest, timezone)? {
        if binding.scope != EnvScope::Runtime {
            continue;
        }
        if binding.prepend_path {
            for dir in binding.value.split(':') {
                let name = format!("env:{}:{}", binding.name, dir);
                if Path::new(dir).is_dir() {
                    results.push(CheckResult::pass(name, "目录存在"));
                } else {
                    results.push(CheckResult::fail(name, format!("目录不存在: {dir}")));
                }
            }
        } else {
            let name = format!("env:{}", binding.name);
            if Path::new(&binding.value).is_file() {
                results.push(CheckResult::pass(name, binding.value));
            } else {
                results.push(CheckResult::fail(
                    name,
                    format!("指向的文件不存在: {}", binding.value),
                ));
            }
        }
    }

    Ok(results)
}

/// 入口点可执行且在位
pub fn check_entrypoints(layout: &InstallLayout, variant: &VariantConfig) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let bin_dir = layout.bin_dir();

    let mut executables = vec!["bcftools", "gatk"];
    if variant.include_vcftools {
        executables.push("vcftools");
    }
    if variant.include_object_storage {
        executables.push("mc");
    }

    for exe in executables {
        let path = bin_dir.join(exe);
        let name = format!("bin:{exe}");
        if !path.exists() {
            results.push(CheckResult::fail(name, format!("缺失: {}", path.display())));
        } else if FileSystemUtils::is_executable(&path) {
            results.push(CheckResult::pass(name, path.display().to_string()));
        } else {
            results.push(CheckResult::fail(
                name,
                format!("存在但不可执行: {}", path.display()),
            ));
        }
    }

    let snakemake = layout.conda_bin_dir().join("snakemake");
    if snakemake.exists() {
        results.push(CheckResult::pass(
            "conda:snakemake",
            snakemake.display().to_string(),
        ));
    } else {
        results.push(CheckResult::fail(
            "conda:snakemake",
            format!("缺失: {}", snakemake.display()),
        ));
    }

    results
}

/// 回执与清单的版本锁定一致
pub fn check_receipt(
    layout: &InstallLayout,
    manifest: &Manifest,
    variant: &VariantConfig,
) -> Vec<CheckResult> {
    let receipt_path = layout.receipt_path();
    let receipt = match Receipt::load(&receipt_path) {
        Ok(r) => r,
        Err(e) => {
            return vec![CheckResult::fail(
                "receipt",
                format!("无法读取回执: {e}"),
            )]
        }
    };

    let mut results = vec![CheckResult::pass(
        "receipt",
        format!("回执存在，变体 '{}'", receipt.variant),
    )];

    for tool in &manifest.tools {
        if tool.name == "vcftools" && !variant.include_vcftools {
            continue;
        }
        if tool.name == "mc" && !variant.include_object_storage {
            continue;
        }
        let name = format!("pin:{}", tool.name);
        let entry = match receipt.get(&tool.name) {
            Some(e) => e,
            None => {
                results.push(CheckResult::fail(name, "回执中无此工具"));
                continue;
            }
        };

        if tool.floating {
            results.push(CheckResult::pass(
                name,
                format!("浮动组件，实际版本 {}", entry.version),
            ));
            continue;
        }

        if entry.version != tool.version {
            results.push(CheckResult::fail(
                name,
                format!("版本漂移: 锁定 {}，回执 {}", tool.version, entry.version),
            ));
            continue;
        }

        match (&tool.sha256, &entry.sha256) {
            (Some(expected), Some(actual)) if expected != actual => {
                results.push(CheckResult::fail(
                    name,
                    format!("SHA256 不一致: 期望 {expected}，实际 {actual}"),
                ));
            }
            _ => {
                results.push(CheckResult::pass(name, format!("版本 {}", tool.version)));
            }
        }
    }

    results
}

/// PATH 前置生效：按导出后的 PATH 解析工具应命中本布局的目录
pub fn check_path_precedence(layout: &InstallLayout, variant: &VariantConfig) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let search_path = format!(
        "{}:{}:{}",
        layout.bin_dir().display(),
        layout.conda_bin_dir().display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let mut probes = vec![("bcftools", layout.bin_dir())];
    if variant.include_vcftools {
        probes.push(("vcftools", layout.bin_dir()));
    }
    probes.push(("snakemake", layout.conda_bin_dir()));

    for (exe, expected_dir) in probes {
        let name = format!("path:{exe}");
        match which::which_in(exe, Some(&search_path), "/") {
            Ok(resolved) => {
                if resolved.starts_with(&expected_dir) {
                    results.push(CheckResult::pass(name, resolved.display().to_string()));
                } else {
                    results.push(CheckResult::fail(
                        name,
                        format!("解析到布局之外: {}", resolved.display()),
                    ));
                }
            }
            Err(e) => {
                results.push(CheckResult::fail(name, format!("无法解析: {e}")));
            }
        }
    }

    results
}

/// 汇总所有检查为一份报告
pub fn run_checks(
    variant_name: &str,
    variant: &VariantConfig,
    layout: &InstallLayout,
    manifest: &Manifest,
    timezone: &str,
) -> AppResult<VerifyReport> {
    let mut checks = Vec::new();
    checks.extend(check_bindings(layout, manifest, timezone)?);
    checks.extend(check_entrypoints(layout, variant));
    checks.extend(check_receipt(layout, manifest, variant));
    checks.extend(check_path_precedence(layout, variant));

    Ok(VerifyReport {
        variant: variant_name.to_string(),
        root: layout.root.display().to_string(),
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::LayoutKind;
    use crate::core::manifest::Manifest;
    use crate::core::receipt::ReceiptEntry;
    use crate::infrastructure::config::builtin_variants;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_executable(path: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    fn fake_install(dir: &TempDir, variant: &crate::infrastructure::config::VariantConfig) -> InstallLayout {
        let layout = InstallLayout::resolve(LayoutKind::Opt, Some(dir.path())).unwrap();
        let manifest = Manifest::builtin();

        write_executable(&layout.bin_dir().join("bcftools"));
        write_executable(&layout.bin_dir().join("gatk"));
        if variant.include_vcftools {
            write_executable(&layout.bin_dir().join("vcftools"));
        }
        if variant.include_object_storage {
            write_executable(&layout.bin_dir().join("mc"));
        }
        write_executable(&layout.conda_bin_dir().join("snakemake"));

        // 运行期绑定指向的 jar 文件
        for tool in ["beagle", "gatk4", "gatk3"] {
            let path = match tool {
                "beagle" => environment::beagle_jar_path(&layout, &manifest).unwrap(),
                "gatk4" => environment::gatk4_local_jar_path(&layout, &manifest).unwrap(),
                _ => environment::gatk3_jar_path(&layout, &manifest).unwrap(),
            };
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"jar").unwrap();
        }

        let mut receipt = Receipt::new("cluster");
        for tool in &manifest.tools {
            receipt.record(ReceiptEntry {
                name: tool.name.clone(),
                version: tool.version.clone(),
                url: tool.url.clone(),
                sha256: None,
                install_path: layout.tool_dir(&tool.name).display().to_string(),
                floating: tool.floating,
            });
        }
        receipt.save(&layout.receipt_path()).unwrap();

        layout
    }

    #[test]
    #[cfg(unix)]
    fn test_complete_install_passes_all_checks() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);
        let manifest = Manifest::builtin();

        let report = run_checks("cluster", &variant, &layout, &manifest, "Etc/UTC").unwrap();
        assert!(
            report.passed(),
            "失败项: {:?}",
            report.failures()
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_missing_entrypoint_fails() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);

        fs::remove_file(layout.bin_dir().join("bcftools")).unwrap();

        let results = check_entrypoints(&layout, &variant);
        let bcftools = results.iter().find(|c| c.name == "bin:bcftools").unwrap();
        assert!(!bcftools.passed);
        assert!(bcftools.detail.contains("缺失"));
    }

    #[test]
    #[cfg(unix)]
    fn test_version_drift_detected() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);
        let manifest = Manifest::builtin();

        let mut receipt = Receipt::load(&layout.receipt_path()).unwrap();
        if let Some(entry) = receipt.entries.iter_mut().find(|e| e.name == "bcftools") {
            entry.version = "1.21".to_string();
        }
        receipt.save(&layout.receipt_path()).unwrap();

        let results = check_receipt(&layout, &manifest, &variant);
        let pin = results.iter().find(|c| c.name == "pin:bcftools").unwrap();
        assert!(!pin.passed);
        assert!(pin.detail.contains("版本漂移"));
    }

    #[test]
    #[cfg(unix)]
    fn test_floating_component_exempt_from_pin() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);
        let manifest = Manifest::builtin();

        let mut receipt = Receipt::load(&layout.receipt_path()).unwrap();
        if let Some(entry) = receipt.entries.iter_mut().find(|e| e.name == "miniconda3") {
            entry.version = "py312_24.1.2-0".to_string();
        }
        receipt.save(&layout.receipt_path()).unwrap();

        let results = check_receipt(&layout, &manifest, &variant);
        let pin = results.iter().find(|c| c.name == "pin:miniconda3").unwrap();
        assert!(pin.passed, "浮动组件不应因版本差异失败");
    }

    #[test]
    #[cfg(unix)]
    fn test_receipt_checked_against_merged_override() {
        use crate::core::manifest::{ArtifactKind, ToolArtifact};

        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);

        // 回执来自一次带覆盖清单的制备（beagle 升级）
        let mut receipt = Receipt::load(&layout.receipt_path()).unwrap();
        if let Some(entry) = receipt.entries.iter_mut().find(|e| e.name == "beagle") {
            entry.version = "5.4-22Jul22.46e".to_string();
        }
        receipt.save(&layout.receipt_path()).unwrap();

        // 对照内置清单会误报漂移
        let builtin = Manifest::builtin();
        let results = check_receipt(&layout, &builtin, &variant);
        let pin = results.iter().find(|c| c.name == "pin:beagle").unwrap();
        assert!(!pin.passed);
        assert!(pin.detail.contains("版本漂移"));

        // 对照制备时的合并清单应通过
        let mut merged = Manifest::builtin();
        merged.merge_override(Manifest {
            tools: vec![ToolArtifact {
                name: "beagle".to_string(),
                version: "5.4-22Jul22.46e".to_string(),
                url: Some(
                    "https://faculty.washington.edu/browning/beagle/beagle.22Jul22.46e.jar"
                        .to_string(),
                ),
                sha256: None,
                kind: ArtifactKind::Jar,
                entrypoint: Some("beagle.22Jul22.46e.jar".to_string()),
                channels: Vec::new(),
                floating: false,
            }],
        });
        let results = check_receipt(&layout, &merged, &variant);
        let pin = results.iter().find(|c| c.name == "pin:beagle").unwrap();
        assert!(pin.passed, "{}", pin.detail);
    }

    #[test]
    #[cfg(unix)]
    fn test_pinned_digest_mismatch_detected() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["cluster"].clone();
        let layout = fake_install(&dir, &variant);

        // 运维通过覆盖清单补充了摘要锁定
        let mut manifest = Manifest::builtin();
        if let Some(tool) = manifest.tools.iter_mut().find(|t| t.name == "beagle") {
            tool.sha256 = Some(
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".to_string(),
            );
        }

        let mut receipt = Receipt::load(&layout.receipt_path()).unwrap();
        if let Some(entry) = receipt.entries.iter_mut().find(|e| e.name == "beagle") {
            entry.sha256 = Some(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string(),
            );
        }
        receipt.save(&layout.receipt_path()).unwrap();

        let results = check_receipt(&layout, &manifest, &variant);
        let pin = results.iter().find(|c| c.name == "pin:beagle").unwrap();
        assert!(!pin.passed);
        assert!(pin.detail.contains("SHA256 不一致"));
    }

    #[test]
    fn test_missing_receipt_reported() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::resolve(LayoutKind::Opt, Some(dir.path())).unwrap();
        let manifest = Manifest::builtin();
        let variant = builtin_variants()["cluster"].clone();

        let results = check_receipt(&layout, &manifest, &variant);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }

    #[test]
    #[cfg(unix)]
    fn test_path_precedence_resolves_into_layout() {
        let dir = TempDir::new().unwrap();
        let variant = builtin_variants()["minimal"].clone();
        let layout = fake_install(&dir, &variant);

        let results = check_path_precedence(&layout, &variant);
        let bcftools = results.iter().find(|c| c.name == "path:bcftools").unwrap();
        assert!(bcftools.passed, "{}", bcftools.detail);
    }
}
