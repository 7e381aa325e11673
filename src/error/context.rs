use crate::error::AppError;

/// 提供安全的路径转换，避免 unwrap()
pub fn safe_path_to_str(path: &std::path::Path) -> Result<&str, AppError> {
    path.to_str()
        .ok_or_else(|| AppError::path_conversion_failed(&format!("{:?}", path)))
}

/// 安全的 JSON 序列化
pub fn safe_to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
