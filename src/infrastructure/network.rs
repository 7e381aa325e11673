use crate::core::manifest::Manifest;
use crate::infrastructure::remote::HttpClient;
use std::time::Duration;
use tokio::net::TcpStream;

/// 网络连接测试工具
pub struct NetworkTester;

impl NetworkTester {
    /// 运行完整的网络诊断：逐个探测清单中的上游分发源
    pub async fn run_full_diagnosis(manifest: &Manifest) -> Result<(), String> {
        println!("🔍 bioprov 网络连接诊断");
        println!("====================");

        // 测试基本网络连接
        Self::test_basic_connectivity().await?;

        // 测试 DNS 解析
        Self::test_dns_resolution(manifest).await?;

        // 测试上游分发源
        Self::test_upstream_sources(manifest).await?;

        println!("\n✅ 网络诊断完成");
        Ok(())
    }

    /// 测试基本网络连接
    async fn test_basic_connectivity() -> Result<(), String> {
        println!("\n🌐 测试基本网络连接...");

        let test_urls = vec![
            ("Google DNS", "8.8.8.8:53"),
            ("Cloudflare DNS", "1.1.1.1:53"),
        ];

        let timeout =
            Duration::from_secs(crate::core::constants::network::DIAGNOSIS_TIMEOUT_SEC);
        for (name, address) in test_urls {
            match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
                Ok(Ok(_)) => {
                    println!("  ✅ {name}: 连接成功");
                }
                Ok(Err(e)) => {
                    println!("  ❌ {name}: 连接失败 - {e}");
                }
                Err(_) => {
                    println!("  ⏰ {name}: 连接超时");
                }
            }
        }

        Ok(())
    }

    /// 测试 DNS 解析（清单中出现的主机）
    async fn test_dns_resolution(manifest: &Manifest) -> Result<(), String> {
        println!("\n🔍 测试 DNS 解析...");

        for host in Self::upstream_hosts(manifest) {
            match tokio::net::lookup_host(format!("{host}:443")).await {
                Ok(addresses) => {
                    let addr_vec: Vec<_> = addresses.collect();
                    if let Some(first) = addr_vec.first() {
                        println!("  ✅ {}: 解析成功 ({})", host, first);
                    } else {
                        println!("  ⚠️  {host}: 解析成功但无地址");
                    }
                }
                Err(e) => {
                    println!("  ❌ {host}: 解析失败 - {e}");
                }
            }
        }

        Ok(())
    }

    /// 测试上游分发源可达性（HEAD 请求，不触发完整下载）
    async fn test_upstream_sources(manifest: &Manifest) -> Result<(), String> {
        println!("\n📥 测试上游分发源...");

        let client = HttpClient::with_timeout(10)?;

        for tool in &manifest.tools {
            let Some(url) = tool.url.as_deref() else {
                continue;
            };
            match client.head(url).await {
                Ok(response) => {
                    if response.status().is_success() {
                        println!("  ✅ {}: 响应正常 ({})", tool.name, response.status());
                        if let Some(size) = response.headers().get("content-length") {
                            if let Ok(size_str) = size.to_str() {
                                if let Ok(bytes) = size_str.parse::<u64>() {
                                    println!("  📊 文件大小: {} MB", bytes / (1024 * 1024));
                                }
                            }
                        }
                    } else {
                        println!("  ⚠️  {}: 响应异常 ({})", tool.name, response.status());
                    }
                }
                Err(e) => {
                    println!("  ❌ {}: 请求失败 - {e}", tool.name);
                }
            }
        }

        Ok(())
    }

    /// 清单中去重后的上游主机列表
    pub fn upstream_hosts(manifest: &Manifest) -> Vec<String> {
        let mut hosts = Vec::new();
        for tool in &manifest.tools {
            let Some(url) = tool.url.as_deref() else {
                continue;
            };
            if let Ok(parsed) = url::Url::parse(url) {
                if let Some(host) = parsed.host_str() {
                    if !hosts.iter().any(|h: &String| h == host) {
                        hosts.push(host.to_string());
                    }
                }
            }
        }
        hosts
    }

    /// 提供网络问题的解决建议
    pub fn provide_suggestions(error: &str) -> Vec<String> {
        let mut suggestions = Vec::new();

        if error.contains("DNS") || error.contains("resolve") {
            suggestions.push("尝试更换 DNS 服务器（如 8.8.8.8 或 1.1.1.1）".to_string());
            suggestions.push("运行 'bioprov network-test' 进行详细诊断".to_string());
        }

        if error.contains("timeout") || error.contains("timed out") {
            suggestions.push("检查防火墙设置".to_string());
            suggestions.push("确认网络代理配置正确".to_string());
        }

        if error.contains("connection closed") || error.contains("reset") {
            suggestions.push("网络连接不稳定，请稍后重试".to_string());
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_hosts_dedup() {
        let manifest = Manifest::builtin();
        let hosts = NetworkTester::upstream_hosts(&manifest);

        assert!(hosts.iter().any(|h| h == "github.com"));
        assert!(hosts.iter().any(|h| h == "faculty.washington.edu"));
        assert!(hosts.iter().any(|h| h == "repo.anaconda.com"));

        // bcftools 与 vcftools 共享 github.com，必须去重
        let github_count = hosts.iter().filter(|h| h.as_str() == "github.com").count();
        assert_eq!(github_count, 1);
    }

    #[test]
    fn test_provide_suggestions() {
        assert!(!NetworkTester::provide_suggestions("DNS error").is_empty());
        assert!(!NetworkTester::provide_suggestions("timed out").is_empty());
        assert!(NetworkTester::provide_suggestions("other").is_empty());
    }
}
