pub mod script_builder;

pub use script_builder::*;

/// 输出脚本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Fish,
    /// 容器 ENV 声明块
    Dockerfile,
}

impl ShellType {
    /// 解析 shell 类型名称
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "bash" | "sh" | "zsh" => Ok(ShellType::Bash),
            "fish" => Ok(ShellType::Fish),
            "dockerfile" | "docker" => Ok(ShellType::Dockerfile),
            other => Err(format!(
                "不支持的 shell 类型: '{other}'，支持 bash / fish / dockerfile"
            )),
        }
    }
}

impl std::fmt::Display for ShellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellType::Bash => write!(f, "bash"),
            ShellType::Fish => write!(f, "fish"),
            ShellType::Dockerfile => write!(f, "dockerfile"),
        }
    }
}
