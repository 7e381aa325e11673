use regex::Regex;

/// 验证工具
pub struct ValidationUtils;

impl ValidationUtils {
    /// 验证工具名称是否有效
    pub fn validate_tool_name(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err("Tool name cannot be empty".to_string());
        }

        if name.len() > 50 {
            return Err("Tool name too long (max 50 characters)".to_string());
        }

        let pattern = Regex::new(crate::core::constants::patterns::TOOL_NAME_PATTERN)
            .map_err(|e| format!("Invalid pattern: {e}"))?;
        if !pattern.is_match(name) {
            return Err(format!(
                "Tool name '{name}' must start with a letter and contain only letters, digits, '-', '_' or '.'"
            ));
        }

        Ok(())
    }

    /// 验证 URL 是否有效
    pub fn validate_url(url: &str) -> Result<(), String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        // 简单的 URL 格式检查
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("URL must start with http:// or https://".to_string());
        }

        // 使用 url crate 进行更详细的验证
        match url::Url::parse(url) {
            Ok(_) => Ok(()),
            Err(e) => Err(format!("Invalid URL: {e}")),
        }
    }

    /// 验证 SHA256 摘要格式（64 位十六进制）
    pub fn validate_sha256(digest: &str) -> Result<(), String> {
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{digest}' is not a valid SHA256 hex digest"));
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tool_name() {
        assert!(ValidationUtils::validate_tool_name("bcftools").is_ok());
        assert!(ValidationUtils::validate_tool_name("gatk4").is_ok());
        assert!(ValidationUtils::validate_tool_name("miniconda3").is_ok());

        assert!(ValidationUtils::validate_tool_name("").is_err());
        assert!(ValidationUtils::validate_tool_name("1tool").is_err());
        assert!(ValidationUtils::validate_tool_name("a/b").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(ValidationUtils::validate_url(
            "https://github.com/samtools/bcftools/releases/download/1.9/bcftools-1.9.tar.bz2"
        )
        .is_ok());
        assert!(ValidationUtils::validate_url("ftp://example.com/a").is_err());
        assert!(ValidationUtils::validate_url("").is_err());
    }

    #[test]
    fn test_validate_sha256() {
        assert!(ValidationUtils::validate_sha256(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        )
        .is_ok());
        assert!(ValidationUtils::validate_sha256("deadbeef").is_err());
        assert!(ValidationUtils::validate_sha256(
            "zz7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        )
        .is_err());
    }
}
