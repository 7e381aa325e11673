use crate::core::manifest::Manifest;
use crate::core::verify::VerifyReport;
use crate::error::safe_to_json_pretty;
use crate::provision::plan::StepDescription;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// 输出格式化器
pub struct OutputFormatter;

impl OutputFormatter {
    /// 格式化步骤序列
    pub fn format_plan(
        &self,
        variant: &str,
        steps: &[StepDescription],
        format: OutputFormat,
    ) -> Result<String, String> {
        match format {
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&format!("变体 '{}' 的制备步骤（{} 步，严格顺序）:\n", variant, steps.len()));
                for step in steps {
                    output.push_str(&format!("  {:>2}. [{}] {}\n", step.index, step.name, step.detail));
                }
                Ok(output)
            }
            OutputFormat::Json => {
                let json_output = serde_json::json!({
                    "variant": variant,
                    "steps": steps,
                });
                safe_to_json_pretty(&json_output).map_err(|e| e.to_string())
            }
        }
    }

    /// 格式化校验报告
    pub fn format_verify_report(
        &self,
        report: &VerifyReport,
        format: OutputFormat,
    ) -> Result<String, String> {
        match format {
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&format!(
                    "校验变体 '{}' @ {}\n",
                    report.variant, report.root
                ));
                for check in &report.checks {
                    let mark = if check.passed { "✅" } else { "❌" };
                    output.push_str(&format!("  {} {} — {}\n", mark, check.name, check.detail));
                }
                if report.passed() {
                    output.push_str("🎉 全部检查通过\n");
                } else {
                    output.push_str(&format!("⚠️  {} 项检查失败\n", report.failures().len()));
                }
                Ok(output)
            }
            OutputFormat::Json => safe_to_json_pretty(report).map_err(|e| e.to_string()),
        }
    }

    /// 格式化版本锁定清单
    pub fn format_manifest(
        &self,
        manifest: &Manifest,
        format: OutputFormat,
    ) -> Result<String, String> {
        match format {
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str("生效的版本锁定清单:\n");
                for tool in &manifest.tools {
                    let pin = if tool.floating { "浮动" } else { "锁定" };
                    output.push_str(&format!(
                        "  {:<12} {:<28} [{}] {}\n",
                        tool.name,
                        tool.version,
                        pin,
                        tool.url.as_deref().unwrap_or("-"),
                    ));
                }
                Ok(output)
            }
            OutputFormat::Json => safe_to_json_pretty(manifest).map_err(|e| e.to_string()),
        }
    }

    /// 格式化错误信息
    pub fn format_error(&self, error: &str, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => format!("Error: {}\n", error),
            OutputFormat::Json => {
                let json_output = serde_json::json!({
                    "error": error,
                    "success": false
                });
                safe_to_json_pretty(&json_output)
                    .unwrap_or_else(|_| format!("{{\"error\": \"{error}\"}}"))
            }
        }
    }
}

/// 全局格式化器实例
pub static FORMATTER: OutputFormatter = OutputFormatter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verify::CheckResult;

    #[test]
    fn test_format_plan_text() {
        let steps = vec![StepDescription {
            index: 1,
            name: "system-packages".to_string(),
            detail: "安装系统构建依赖".to_string(),
        }];
        let out = FORMATTER
            .format_plan("cluster", &steps, OutputFormat::Text)
            .unwrap();
        assert!(out.contains("cluster"));
        assert!(out.contains("1. [system-packages]"));
    }

    #[test]
    fn test_format_manifest_json_contains_pins() {
        let manifest = Manifest::builtin();
        let out = FORMATTER
            .format_manifest(&manifest, OutputFormat::Json)
            .unwrap();
        assert!(out.contains("bcftools"));
        assert!(out.contains("\"1.9\""));
    }

    #[test]
    fn test_format_verify_report_marks_failures() {
        let report = VerifyReport {
            variant: "minimal".to_string(),
            root: "/opt/bioprov".to_string(),
            checks: vec![CheckResult {
                name: "bin:bcftools".to_string(),
                passed: false,
                detail: "缺失".to_string(),
            }],
        };
        let out = FORMATTER
            .format_verify_report(&report, OutputFormat::Text)
            .unwrap();
        assert!(out.contains("❌"));
        assert!(out.contains("1 项检查失败"));
    }
}
