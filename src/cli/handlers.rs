use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::{OutputFormat, FORMATTER};
use crate::core::environment::{standard_bindings, EnvScope};
use crate::core::layout::InstallLayout;
use crate::core::manifest::Manifest;
use crate::core::verify;
use crate::infrastructure::config::{Config, VariantConfig};
use crate::infrastructure::network::NetworkTester;
use crate::infrastructure::remote::DownloadOptions;
use crate::infrastructure::shell::{ScriptBuilder, ShellType};
use crate::provision::plan::ProvisionPlan;
use crate::provision::step::ProvisionContext;

/// 命令处理器
pub struct CommandHandler {
    config: Config,
}

impl CommandHandler {
    /// 创建新的命令处理器
    pub fn new() -> Result<Self, String> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// 处理命令
    pub async fn handle_command(&mut self, command: Commands) -> Result<(), String> {
        match command {
            Commands::Provision {
                variant,
                manifest,
                root,
                dry_run,
            } => {
                self.handle_provision(variant.as_deref(), manifest.as_deref(), root, dry_run)
                    .await
            }
            Commands::Plan {
                variant,
                manifest,
                json,
            } => self.handle_plan(variant.as_deref(), manifest.as_deref(), json).await,
            Commands::Verify {
                variant,
                manifest,
                root,
                json,
            } => self.handle_verify(variant.as_deref(), manifest.as_deref(), root, json),
            Commands::Env {
                shell,
                variant,
                manifest,
                root,
            } => self.handle_env(&shell, variant.as_deref(), manifest.as_deref(), root),
            Commands::Manifest { json, manifest } => {
                self.handle_manifest(json, manifest.as_deref())
            }
            Commands::NetworkTest => {
                NetworkTester::run_full_diagnosis(&Manifest::builtin()).await
            }
        }
    }

    fn resolve_variant(
        &self,
        name: Option<&str>,
    ) -> Result<(String, VariantConfig), String> {
        self.config.resolve_variant(name)
    }

    fn load_manifest(override_path: Option<&Path>) -> Result<Manifest, String> {
        let mut manifest = Manifest::builtin();
        if let Some(path) = override_path {
            let overrides = Manifest::load(path).map_err(|e| e.to_string())?;
            manifest.merge_override(overrides);
        }
        manifest.validate().map_err(|e| e.to_string())?;
        Ok(manifest)
    }

    fn build_context(
        &self,
        variant_name: String,
        variant: VariantConfig,
        manifest: Manifest,
        root: Option<PathBuf>,
    ) -> Result<ProvisionContext, String> {
        let layout = InstallLayout::resolve(variant.layout, root.as_deref())
            .map_err(|e| e.to_string())?;
        let download = DownloadOptions::from_config(&self.config.download);
        ProvisionContext::new(
            variant_name,
            variant,
            layout,
            manifest,
            download,
            self.config.provision.timezone.clone(),
        )
        .map_err(|e| e.to_string())
    }

    async fn handle_provision(
        &self,
        variant: Option<&str>,
        manifest_path: Option<&Path>,
        root: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<(), String> {
        let (variant_name, variant_config) = self.resolve_variant(variant)?;
        let manifest = Self::load_manifest(manifest_path)?;
        let mut ctx =
            self.build_context(variant_name, variant_config, manifest, root)?;

        let plan = ProvisionPlan::build(&ctx.variant);

        if dry_run {
            let output = FORMATTER.format_plan(
                &ctx.variant_name,
                &plan.describe(&ctx),
                OutputFormat::Text,
            )?;
            print!("{}", output);
            return Ok(());
        }

        plan.execute(&mut ctx).await.map_err(|e| e.user_message())
    }

    async fn handle_plan(
        &self,
        variant: Option<&str>,
        manifest_path: Option<&Path>,
        json: bool,
    ) -> Result<(), String> {
        let (variant_name, variant_config) = self.resolve_variant(variant)?;
        let manifest = Self::load_manifest(manifest_path)?;
        let ctx = self.build_context(variant_name, variant_config, manifest, None)?;

        let plan = ProvisionPlan::build(&ctx.variant);
        let output = FORMATTER.format_plan(
            &ctx.variant_name,
            &plan.describe(&ctx),
            OutputFormat::from_json_flag(json),
        )?;
        print!("{}", output);
        Ok(())
    }

    fn handle_verify(
        &self,
        variant: Option<&str>,
        manifest_path: Option<&Path>,
        root: Option<PathBuf>,
        json: bool,
    ) -> Result<(), String> {
        let (variant_name, variant_config) = self.resolve_variant(variant)?;
        let layout = InstallLayout::resolve(variant_config.layout, root.as_deref())
            .map_err(|e| e.to_string())?;
        // 制备时用了覆盖清单，校验必须对照同一份锁定
        let manifest = Self::load_manifest(manifest_path)?;

        let report = verify::run_checks(
            &variant_name,
            &variant_config,
            &layout,
            &manifest,
            &self.config.provision.timezone,
        )
        .map_err(|e| e.to_string())?;

        let output = FORMATTER
            .format_verify_report(&report, OutputFormat::from_json_flag(json))?;
        print!("{}", output);

        if report.passed() {
            Ok(())
        } else {
            Err(format!("{} 项检查失败", report.failures().len()))
        }
    }

    fn handle_env(
        &self,
        shell: &str,
        variant: Option<&str>,
        manifest_path: Option<&Path>,
        root: Option<PathBuf>,
    ) -> Result<(), String> {
        let shell_type = ShellType::parse(shell)?;
        let (_, variant_config) = self.resolve_variant(variant)?;
        let layout = InstallLayout::resolve(variant_config.layout, root.as_deref())
            .map_err(|e| e.to_string())?;
        let manifest = Self::load_manifest(manifest_path)?;

        let bindings =
            standard_bindings(&layout, &manifest, &self.config.provision.timezone)
                .map_err(|e| e.to_string())?;
        let runtime: Vec<_> = bindings
            .into_iter()
            .filter(|b| b.scope == EnvScope::Runtime)
            .collect();

        let builder = ScriptBuilder::new().map_err(|e| e.to_string())?;
        let script = builder
            .render_runtime_env(shell_type, &runtime)
            .map_err(|e| e.to_string())?;
        print!("{}", script);
        Ok(())
    }

    fn handle_manifest(&self, json: bool, manifest_path: Option<&Path>) -> Result<(), String> {
        let manifest = Self::load_manifest(manifest_path)?;
        let output = FORMATTER
            .format_manifest(&manifest, OutputFormat::from_json_flag(json))?;
        print!("{}", output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CommandHandler {
        CommandHandler {
            config: Config::new(),
        }
    }

    #[test]
    fn test_resolve_default_variant() {
        let h = handler();
        let (name, _) = h.resolve_variant(None).unwrap();
        assert_eq!(name, "cluster");
    }

    #[test]
    fn test_resolve_unknown_variant_fails() {
        let h = handler();
        let err = h.resolve_variant(Some("hpc")).unwrap_err();
        assert!(err.contains("hpc"));
    }

    #[test]
    fn test_load_manifest_without_override() {
        let manifest = CommandHandler::load_manifest(None).unwrap();
        assert!(manifest.get("bcftools").is_some());
    }

    #[test]
    fn test_load_manifest_with_override() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[tools]]
name = "beagle"
version = "5.4-22Jul22.46e"
url = "https://faculty.washington.edu/browning/beagle/beagle.22Jul22.46e.jar"
kind = "jar"
entrypoint = "beagle.22Jul22.46e.jar"
"#
        )
        .unwrap();

        let manifest = CommandHandler::load_manifest(Some(file.path())).unwrap();
        assert_eq!(manifest.get("beagle").unwrap().version, "5.4-22Jul22.46e");
        // 未覆盖的条目保持内置锁定
        assert_eq!(manifest.get("bcftools").unwrap().version, "1.9");
    }
}
