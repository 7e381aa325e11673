use futures_util::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// 错误类型：用于区分临时错误和永久错误
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorType {
    /// 临时错误（网络问题、超时等，可以重试）
    Transient(String),
    /// 永久错误（404、403等，不应重试）
    Permanent(String),
}

/// 下载选项
#[derive(Clone)]
pub struct DownloadOptions {
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    pub exponential_backoff: bool,
    pub connect_timeout_sec: u64,
    pub read_timeout_sec: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            // 制备是一次性离线过程，默认快速失败
            retry_count: crate::core::constants::download::DEFAULT_RETRY_COUNT,
            retry_delay_ms: crate::core::constants::download::DEFAULT_RETRY_DELAY_MS,
            exponential_backoff: true,
            connect_timeout_sec: crate::core::constants::network::DEFAULT_CONNECT_TIMEOUT_SEC,
            read_timeout_sec: crate::core::constants::network::DEFAULT_READ_TIMEOUT_SEC,
        }
    }
}

impl DownloadOptions {
    /// 从配置创建下载选项
    pub fn from_config(config: &crate::infrastructure::config::DownloadConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            retry_delay_ms: config.retry_delay_ms,
            exponential_backoff: config.exponential_backoff,
            connect_timeout_sec: config.connect_timeout_sec,
            read_timeout_sec: config.read_timeout_sec,
        }
    }

    /// 计算重试延迟（支持指数退避）
    fn calculate_retry_delay(&self, attempt: u32) -> u64 {
        if self.exponential_backoff {
            // 指数退避：delay * 2^(attempt-1)，最大不超过 60 秒
            let delay = self.retry_delay_ms * 2_u64.pow(attempt.saturating_sub(1));
            delay.min(60000)
        } else {
            self.retry_delay_ms
        }
    }
}

/// 判断错误类型
pub fn classify_error(error: &str, status_code: Option<u16>) -> ErrorType {
    // 根据状态码判断
    if let Some(code) = status_code {
        match code {
            404 | 403 | 401 => {
                return ErrorType::Permanent(format!("资源不存在或无权访问 (HTTP {})", code))
            }
            500..=599 => return ErrorType::Transient(format!("服务器错误 (HTTP {})", code)),
            _ => {}
        }
    }

    // 根据错误消息判断
    let error_lower = error.to_lowercase();
    if error_lower.contains("not found") || error_lower.contains("404") {
        ErrorType::Permanent("资源未找到".to_string())
    } else if error_lower.contains("timeout") || error_lower.contains("timed out") {
        ErrorType::Transient("连接超时".to_string())
    } else if error_lower.contains("network") || error_lower.contains("connection") {
        ErrorType::Transient("网络连接问题".to_string())
    } else if error_lower.contains("dns") || error_lower.contains("resolve") {
        ErrorType::Transient("DNS 解析失败".to_string())
    } else {
        ErrorType::Transient(error.to_string())
    }
}

/// 计算文件哈希
pub async fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; crate::core::constants::download::BUFFER_SIZE];

    use tokio::io::AsyncReadExt;
    loop {
        let n = file.read(&mut buffer).await.map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[0..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// 通用的下载工具：流式下载到文件并回调进度，支持可配置重试。
/// 成功时返回下载内容的 SHA256（由调用方比对锁定摘要并写入安装回执）。
pub async fn download_to_file_with_options(
    client: &Client,
    url: &str,
    file_path: &Path,
    progress: impl Fn(u64, u64),
    options: DownloadOptions,
) -> Result<String, String> {
    let mut attempts = 0;
    let mut last_status_code: Option<u16> = None;

    loop {
        attempts += 1;
        match download_to_file_internal(client, url, file_path, &progress).await {
            Ok(digest) => return Ok(digest),
            Err(e) => {
                // 尝试从错误消息中提取状态码
                if e.contains("状态码:") {
                    if let Some(code_str) = e.split("状态码:").nth(1) {
                        if let Ok(code) = code_str
                            .trim()
                            .split_whitespace()
                            .next()
                            .unwrap_or("")
                            .parse::<u16>()
                        {
                            last_status_code = Some(code);
                        }
                    }
                }

                // 尝试删除可能未完成的文件
                let _ = tokio::fs::remove_file(file_path).await;

                let error_type = classify_error(&e, last_status_code);

                // 永久错误不重试
                if let ErrorType::Permanent(msg) = error_type {
                    return Err(format!("{}: {} (URL: {})", msg, e, url));
                }

                if attempts > options.retry_count {
                    return Err(format!(
                        "下载失败 (已重试 {} 次): {}。URL: {}，文件: {}",
                        options.retry_count,
                        e,
                        url,
                        file_path.display()
                    ));
                }

                let delay = options.calculate_retry_delay(attempts);
                println!(
                    "⚠️  下载出错 (尝试 {}/{}): {}。{}ms 后重试...",
                    attempts,
                    options.retry_count + 1,
                    e,
                    delay
                );
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }
        }
    }
}

async fn download_to_file_internal(
    client: &Client,
    url: &str,
    file_path: &Path,
    progress: &impl Fn(u64, u64),
) -> Result<String, String> {
    let response = client
        .get(url)
        .header(
            "User-Agent",
            concat!("bioprov/", env!("CARGO_PKG_VERSION")),
        )
        .send()
        .await
        .map_err(|e| {
            let error_msg = e.to_string();
            if error_msg.contains("timeout") {
                format!("连接超时: {}", error_msg)
            } else if error_msg.contains("dns") || error_msg.contains("resolve") {
                format!("DNS 解析失败: {}", error_msg)
            } else {
                format!("网络请求失败: {} (URL: {})", error_msg, url)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("服务器返回状态码: {} (URL: {})", status, url));
    }

    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded = 0u64;
    let mut hasher = Sha256::new();
    let mut stream = response.bytes_stream();

    if let Some(parent) = file_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("创建目录失败: {}", e))?;
    }

    // 使用临时文件
    let temp_path = file_path.with_extension("downloading");
    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| format!("创建文件失败: {}", e))?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| format!("读取数据失败: {}", e))?;
        downloaded += chunk.len() as u64;
        progress(downloaded, total_size);
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| format!("写入文件失败: {}", e))?;
    }

    file.flush().await.map_err(|e| format!("刷新文件失败: {}", e))?;
    drop(file); // 关闭文件

    // 重命名为目标文件
    tokio::fs::rename(&temp_path, file_path)
        .await
        .map_err(|e| format!("重命名文件失败: {}", e))?;

    Ok(hex::encode(hasher.finalize()))
}
