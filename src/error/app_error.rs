use std::io;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("系统包安装错误: {message}")]
    Package { message: String },

    #[error("下载错误: {message}")]
    Download { message: String },

    #[error("校验错误: {artifact} - 期望 {expected}，实际 {actual}")]
    Checksum {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("解压错误: {archive} - {reason}")]
    Extract { archive: String, reason: String },

    #[error("命令执行错误: {program} - {reason}")]
    Command { program: String, reason: String },

    #[error("编译安装错误: {tool} 在 {stage} 阶段失败 - {reason}")]
    Build {
        tool: String,
        stage: String,
        reason: String,
    },

    #[error("配置错误: {message}")]
    Config { message: String },

    #[error("路径错误: {path} - {reason}")]
    Path { path: String, reason: String },

    #[error("验证错误: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Shell 脚本生成错误: {shell_type} - {reason}")]
    ScriptGeneration { shell_type: String, reason: String },

    #[error("未找到请求的资源: {resource}")]
    NotFound { resource: String },

    #[error("内部错误: {message}")]
    Internal { message: String },
}

/// 用于提供错误上下文和用户友好建议
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub operation: String,
    pub suggestions: Vec<String>,
    pub help_url: Option<String>,
}

impl AppError {
    /// 为错误添加上下文信息
    pub fn with_context(self, operation: &str) -> ContextualError {
        ContextualError {
            error: self,
            context: ErrorContext {
                operation: operation.to_string(),
                suggestions: Vec::new(),
                help_url: None,
            },
        }
    }
}

/// 带有上下文的错误
#[derive(Error, Debug)]
pub struct ContextualError {
    #[source]
    pub error: AppError,
    pub context: ErrorContext,
}

impl std::fmt::Display for ContextualError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "操作失败: {}\n错误: {}", self.context.operation, self.error)
    }
}

impl ContextualError {
    /// 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        let mut msg = format!("❌ {}\n", self.context.operation);
        msg.push_str(&format!("原因: {}\n", self.error));

        if !self.context.suggestions.is_empty() {
            msg.push_str("💡 建议:\n");
            for suggestion in &self.context.suggestions {
                msg.push_str(&format!("  • {}\n", suggestion));
            }
        }

        if let Some(help_url) = &self.context.help_url {
            msg.push_str(&format!("📖 更多帮助: {}\n", help_url));
        }

        msg
    }
}

/// 应用程序 Result 类型
pub type AppResult<T> = Result<T, AppError>;
pub type ContextualResult<T> = Result<T, ContextualError>;

/// 便捷的错误创建函数
impl AppError {
    pub fn download(message: impl Into<String>) -> Self {
        AppError::Download {
            message: message.into(),
        }
    }

    pub fn package(message: impl Into<String>) -> Self {
        AppError::Package {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config {
            message: message.into(),
        }
    }

    pub fn command_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Command {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn extract_failed(archive: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Extract {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn path_conversion_failed(path: &str) -> Self {
        AppError::Path {
            path: path.to_string(),
            reason: "路径包含无效的 UTF-8 字符".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
