use std::env;

/// 环境变量工具
pub struct EnvVarUtils;

impl EnvVarUtils {
    /// 设置环境变量
    pub fn set(key: &str, value: &str) -> Result<(), String> {
        env::set_var(key, value);
        Ok(())
    }

    /// 把若干目录前置到 PATH（按给定顺序保持优先级）
    pub fn prepend_path(dirs: &[String]) -> Result<String, String> {
        let current = env::var("PATH").unwrap_or_default();
        let joined = Self::join_path_dirs(dirs, &current);
        env::set_var("PATH", &joined);
        Ok(joined)
    }

    /// 生成前置后的 PATH 值，不修改进程环境
    pub fn join_path_dirs(dirs: &[String], current: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        for dir in dirs {
            if !parts.contains(dir) {
                parts.push(dir.clone());
            }
        }
        for part in current.split(':') {
            if !part.is_empty() && !parts.iter().any(|p| p == part) {
                parts.push(part.to_string());
            }
        }
        parts.join(":")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path_dirs() {
        let dirs = vec![
            "/opt/bioprov/bin".to_string(),
            "/opt/bioprov/conda/bin".to_string(),
        ];
        let joined = EnvVarUtils::join_path_dirs(&dirs, "/usr/bin:/bin");
        assert_eq!(
            joined,
            "/opt/bioprov/bin:/opt/bioprov/conda/bin:/usr/bin:/bin"
        );
    }

    #[test]
    fn test_join_path_dirs_dedup() {
        let dirs = vec!["/opt/bioprov/bin".to_string()];
        let joined = EnvVarUtils::join_path_dirs(&dirs, "/opt/bioprov/bin:/usr/bin");
        assert_eq!(joined, "/opt/bioprov/bin:/usr/bin");
    }

    #[test]
    fn test_set() {
        EnvVarUtils::set("BIOPROV_TEST_VAR", "1").unwrap();
        assert_eq!(env::var("BIOPROV_TEST_VAR").unwrap(), "1");
        env::remove_var("BIOPROV_TEST_VAR");
    }
}
