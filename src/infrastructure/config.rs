use crate::core::constants::defaults;
use crate::core::layout::LayoutKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// 配置文件结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provision: ProvisionDefaults,
    #[serde(default)]
    pub download: DownloadConfig,
    /// 命名的制备变体；内置 workstation / cluster / minimal，可在配置中覆盖或扩展
    #[serde(default)]
    pub variants: BTreeMap<String, VariantConfig>,
}

/// 制备默认值
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvisionDefaults {
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_variant() -> String {
    defaults::DEFAULT_VARIANT.to_string()
}

fn default_timezone() -> String {
    defaults::DEFAULT_TIMEZONE.to_string()
}

impl Default for ProvisionDefaults {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            timezone: default_timezone(),
        }
    }
}

/// 下载配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// 重试次数；制备流程默认快速失败，不重试
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_true")]
    pub exponential_backoff: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_sec: u64,
}

fn default_retry_delay_ms() -> u64 {
    crate::core::constants::download::DEFAULT_RETRY_DELAY_MS
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    crate::core::constants::network::DEFAULT_CONNECT_TIMEOUT_SEC
}

fn default_read_timeout() -> u64 {
    crate::core::constants::network::DEFAULT_READ_TIMEOUT_SEC
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retry_count: crate::core::constants::download::DEFAULT_RETRY_COUNT,
            retry_delay_ms: default_retry_delay_ms(),
            exponential_backoff: true,
            connect_timeout_sec: default_connect_timeout(),
            read_timeout_sec: default_read_timeout(),
        }
    }
}

/// 制备变体：三个历史配方的差异点作为配置保留，不做猜测性统一
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    #[serde(default)]
    pub description: String,
    pub layout: LayoutKind,
    #[serde(default = "default_true")]
    pub include_vcftools: bool,
    #[serde(default)]
    pub include_object_storage: bool,
    /// 原样复制进镜像的构建上下文输入（Snakefile、WatchDog 目录）
    #[serde(default)]
    pub stage_inputs: Vec<String>,
}

/// 内置变体
pub fn builtin_variants() -> BTreeMap<String, VariantConfig> {
    let mut variants = BTreeMap::new();

    variants.insert(
        "workstation".to_string(),
        VariantConfig {
            description: "用户本地安装，含 vcftools，无对象存储客户端".to_string(),
            layout: LayoutKind::UserLocal,
            include_vcftools: true,
            include_object_storage: false,
            stage_inputs: vec!["Snakefile".to_string()],
        },
    );

    variants.insert(
        "cluster".to_string(),
        VariantConfig {
            description: "系统级安装，含对象存储客户端与 WatchDog".to_string(),
            layout: LayoutKind::Opt,
            include_vcftools: true,
            include_object_storage: true,
            stage_inputs: vec!["Snakefile".to_string(), "WatchDog".to_string()],
        },
    );

    variants.insert(
        "minimal".to_string(),
        VariantConfig {
            description: "核心工具集：bcftools、Beagle、GATK、conda/Snakemake".to_string(),
            layout: LayoutKind::Opt,
            include_vcftools: false,
            include_object_storage: false,
            stage_inputs: Vec::new(),
        },
    );

    variants
}

impl Config {
    /// 创建默认配置
    pub fn new() -> Self {
        Config {
            provision: ProvisionDefaults::default(),
            download: DownloadConfig::default(),
            variants: builtin_variants(),
        }
    }

    /// 从文件加载配置
    pub fn load() -> Result<Self, String> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            // 如果配置文件不存在，创建默认配置
            let config = Config::new();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| format!("无法读取配置文件: {}", e))?;

        let mut config: Config =
            toml::from_str(&content).map_err(|e| format!("解析配置文件失败: {}", e))?;

        // 内置变体兜底：用户配置只需要写差异
        for (name, variant) in builtin_variants() {
            config.variants.entry(name).or_insert(variant);
        }

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self) -> Result<(), String> {
        let config_path = get_config_path()?;

        // 确保配置目录存在
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("无法创建配置目录: {}", e))?;
        }

        let toml_content =
            toml::to_string_pretty(self).map_err(|e| format!("序列化配置失败: {}", e))?;

        fs::write(&config_path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))?;

        Ok(())
    }

    /// 解析变体名称；None 时使用配置的默认变体
    pub fn resolve_variant(&self, name: Option<&str>) -> Result<(String, VariantConfig), String> {
        let name = name.unwrap_or(&self.provision.variant);
        let variant = self
            .variants
            .get(name)
            .cloned()
            .ok_or_else(|| {
                let known: Vec<&str> = self.variants.keys().map(|s| s.as_str()).collect();
                format!("未知的变体 '{}'，可用变体: {}", name, known.join(", "))
            })?;
        Ok((name.to_string(), variant))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// 获取配置文件路径
pub fn get_config_path() -> Result<PathBuf, String> {
    let home_dir = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;

    let config_file = home_dir
        .join(defaults::DEFAULT_CONFIG_DIR)
        .join("config.toml");
    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_variants() {
        let variants = builtin_variants();
        assert_eq!(variants.len(), 3);

        let cluster = &variants["cluster"];
        assert_eq!(cluster.layout, LayoutKind::Opt);
        assert!(cluster.include_object_storage);
        assert!(cluster.stage_inputs.contains(&"WatchDog".to_string()));

        let workstation = &variants["workstation"];
        assert_eq!(workstation.layout, LayoutKind::UserLocal);
        assert!(!workstation.include_object_storage);

        let minimal = &variants["minimal"];
        assert!(!minimal.include_vcftools);
        assert!(minimal.stage_inputs.is_empty());
    }

    #[test]
    fn test_resolve_variant() {
        let config = Config::new();

        let (name, variant) = config.resolve_variant(Some("minimal")).unwrap();
        assert_eq!(name, "minimal");
        assert!(!variant.include_vcftools);

        // 默认变体
        let (name, _) = config.resolve_variant(None).unwrap();
        assert_eq!(name, defaults::DEFAULT_VARIANT);

        assert!(config.resolve_variant(Some("unknown")).is_err());
    }

    #[test]
    fn test_download_config_fail_fast_default() {
        let config = DownloadConfig::default();
        // 制备流程不重试，下载层默认同样快速失败
        assert_eq!(config.retry_count, 0);
        assert!(config.exponential_backoff);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::new();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.variants.len(), 3);
        assert_eq!(parsed.provision.timezone, "Etc/UTC");
    }
}
