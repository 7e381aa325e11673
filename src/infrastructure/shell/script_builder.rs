use handlebars::Handlebars;
use serde_json::json;

use crate::core::environment::{EnvBinding, EnvScope};
use crate::error::AppError;
use crate::infrastructure::shell::ShellType;

/// Bash 导出语句
const BASH_EXPORT_TEMPLATE: &str = r#"export {{name}}="{{{value}}}""#;
/// Bash PATH 前置语句（保留原 PATH）
const BASH_EXPORT_PATH_TEMPLATE: &str = r#"export {{name}}="{{{value}}}:${{name}}""#;

/// Fish 导出语句
const FISH_EXPORT_TEMPLATE: &str = r#"set -gx {{name}} "{{{value}}}""#;
/// Fish PATH 前置语句（fish 的 PATH 是列表语义）
const FISH_EXPORT_PATH_TEMPLATE: &str =
    r#"set -gx {{name}} {{#each values}}"{{{this}}}" {{/each}}${{name}}"#;

/// 容器 ENV 声明
const DOCKERFILE_ENV_TEMPLATE: &str = r#"ENV {{name}}="{{{value}}}""#;
const DOCKERFILE_ENV_PATH_TEMPLATE: &str = r#"ENV {{name}}="{{{value}}}:${{name}}""#;

/// 模板引擎包装器
pub struct ScriptBuilder {
    handlebars: Handlebars<'static>,
}

impl ScriptBuilder {
    /// 创建新的脚本生成器并注册模板
    pub fn new() -> Result<Self, AppError> {
        let mut handlebars = Handlebars::new();

        let register = |hb: &mut Handlebars, name: &str, template: &str| {
            hb.register_template_string(name, template).map_err(|e| {
                AppError::ScriptGeneration {
                    shell_type: name.to_string(),
                    reason: format!("注册模板失败: {e}"),
                }
            })
        };

        register(&mut handlebars, "bash_export", BASH_EXPORT_TEMPLATE)?;
        register(&mut handlebars, "bash_export_path", BASH_EXPORT_PATH_TEMPLATE)?;
        register(&mut handlebars, "fish_export", FISH_EXPORT_TEMPLATE)?;
        register(&mut handlebars, "fish_export_path", FISH_EXPORT_PATH_TEMPLATE)?;
        register(&mut handlebars, "dockerfile_env", DOCKERFILE_ENV_TEMPLATE)?;
        register(
            &mut handlebars,
            "dockerfile_env_path",
            DOCKERFILE_ENV_PATH_TEMPLATE,
        )?;

        Ok(Self { handlebars })
    }

    /// 渲染运行期环境声明脚本（只包含 Runtime 作用域的绑定）
    pub fn render_runtime_env(
        &self,
        shell: ShellType,
        bindings: &[EnvBinding],
    ) -> Result<String, AppError> {
        let mut lines = vec![self.header(shell)];

        for binding in bindings {
            if binding.scope != EnvScope::Runtime {
                continue;
            }
            lines.push(self.render_binding(shell, binding)?);
        }

        Ok(lines.join("\n") + "\n")
    }

    /// 渲染单条绑定
    pub fn render_binding(
        &self,
        shell: ShellType,
        binding: &EnvBinding,
    ) -> Result<String, AppError> {
        let template_name = match (shell, binding.prepend_path) {
            (ShellType::Bash, false) => "bash_export",
            (ShellType::Bash, true) => "bash_export_path",
            (ShellType::Fish, false) => "fish_export",
            (ShellType::Fish, true) => "fish_export_path",
            (ShellType::Dockerfile, false) => "dockerfile_env",
            (ShellType::Dockerfile, true) => "dockerfile_env_path",
        };

        let values: Vec<&str> = binding.value.split(':').collect();
        let data = json!({
            "name": binding.name,
            "value": binding.value,
            "values": values,
        });

        self.handlebars
            .render(template_name, &data)
            .map_err(|e| AppError::ScriptGeneration {
                shell_type: shell.to_string(),
                reason: format!("模板渲染失败: {e}"),
            })
    }

    fn header(&self, shell: ShellType) -> String {
        match shell {
            ShellType::Bash | ShellType::Fish => {
                "# bioprov 生成的运行时环境声明，请勿手工编辑".to_string()
            }
            ShellType::Dockerfile => "# bioprov 生成的容器 ENV 声明块".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_bindings() -> Vec<EnvBinding> {
        vec![
            EnvBinding::new("TZ", "Etc/UTC", EnvScope::Build),
            EnvBinding::path_prepend(&[
                PathBuf::from("/opt/bioprov/bin"),
                PathBuf::from("/opt/bioprov/conda/bin"),
            ]),
            EnvBinding::new(
                "BEAGLE_JAR",
                "/opt/bioprov/src/beagle/beagle.25Nov19.28d.jar",
                EnvScope::Runtime,
            ),
        ]
    }

    #[test]
    fn test_bash_script() {
        let builder = ScriptBuilder::new().unwrap();
        let script = builder
            .render_runtime_env(ShellType::Bash, &sample_bindings())
            .unwrap();

        assert!(script
            .contains(r#"export PATH="/opt/bioprov/bin:/opt/bioprov/conda/bin:$PATH""#));
        assert!(script
            .contains(r#"export BEAGLE_JAR="/opt/bioprov/src/beagle/beagle.25Nov19.28d.jar""#));
        // Build 作用域的 TZ 不进入运行时脚本
        assert!(!script.contains("TZ"));
    }

    #[test]
    fn test_fish_script() {
        let builder = ScriptBuilder::new().unwrap();
        let script = builder
            .render_runtime_env(ShellType::Fish, &sample_bindings())
            .unwrap();

        assert!(script.contains(r#"set -gx PATH "/opt/bioprov/bin" "/opt/bioprov/conda/bin" $PATH"#));
        assert!(script.contains("set -gx BEAGLE_JAR"));
    }

    #[test]
    fn test_dockerfile_env_block() {
        let builder = ScriptBuilder::new().unwrap();
        let script = builder
            .render_runtime_env(ShellType::Dockerfile, &sample_bindings())
            .unwrap();

        assert!(script
            .contains(r#"ENV PATH="/opt/bioprov/bin:/opt/bioprov/conda/bin:$PATH""#));
        assert!(script.contains(r#"ENV BEAGLE_JAR="#));
    }
}
