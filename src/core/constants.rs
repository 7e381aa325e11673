//! 应用程序常量定义
//!
//! 本模块包含全局使用的常量，避免魔数并提供统一的配置值。

/// 网络相关常量
pub mod network {
    /// 默认连接超时时间（秒）
    pub const DEFAULT_CONNECT_TIMEOUT_SEC: u64 = 30;
    /// 默认读取超时时间（秒）
    pub const DEFAULT_READ_TIMEOUT_SEC: u64 = 300;
    /// 连通性诊断超时时间（秒）
    pub const DIAGNOSIS_TIMEOUT_SEC: u64 = 5;
}

/// 下载相关常量
pub mod download {
    /// 默认重试次数（制备流程快速失败，不重试）
    pub const DEFAULT_RETRY_COUNT: u32 = 0;
    /// 重试间隔（毫秒）
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
    /// 下载缓冲区大小（字节）
    pub const BUFFER_SIZE: usize = 8192;
}

/// 文件系统相关常量
pub mod fs {
    /// 可执行文件权限（Unix系统）
    pub const EXECUTABLE_FILE_PERMISSION: u32 = 0o755;
}

/// 环境变量名称
pub mod env {
    /// Beagle jar 路径（历史名称，WatchDog 读取）
    pub const BEAGLE: &str = "BEAGLE";
    /// Beagle jar 路径
    pub const BEAGLE_JAR: &str = "BEAGLE_JAR";
    /// GATK4 本地 jar 路径
    pub const GATK_LOCAL_JAR: &str = "GATK_LOCAL_JAR";
    /// 旧版 GATK3 jar 路径
    pub const GATK3_JAR: &str = "GATK3_JAR";
    /// 时区（安装系统包时避免交互式提示）
    pub const TZ: &str = "TZ";
    /// PATH
    pub const PATH: &str = "PATH";
    /// apt 非交互模式
    pub const DEBIAN_FRONTEND: &str = "DEBIAN_FRONTEND";
}

/// 系统包安装相关常量
pub mod apt {
    /// 包管理器可执行文件
    pub const APT_GET: &str = "apt-get";
    /// 需要安装的系统包：编译工具链、压缩库、Java 运行时、R、证书与传输工具
    pub const PACKAGES: &[&str] = &[
        "build-essential",
        "autoconf",
        "pkg-config",
        "zlib1g-dev",
        "libbz2-dev",
        "liblzma-dev",
        "libcurl4-openssl-dev",
        "libssl-dev",
        "openjdk-8-jre-headless",
        "r-base-core",
        "ca-certificates",
        "curl",
        "wget",
        "bzip2",
        "unzip",
        "tzdata",
    ];
}

/// 正则表达式模式
pub mod patterns {
    /// 工具名称验证模式
    pub const TOOL_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_.-]*$";
}

/// 默认配置值
pub mod defaults {
    /// 默认变体
    pub const DEFAULT_VARIANT: &str = "cluster";
    /// 默认时区（tzdata 安装时使用）
    pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";
    /// 默认配置目录
    pub const DEFAULT_CONFIG_DIR: &str = ".bioprov";
    /// /opt 布局的安装根目录
    pub const OPT_ROOT: &str = "/opt/bioprov";
    /// 用户布局的安装根目录（相对主目录）
    pub const USER_LOCAL_ROOT: &str = ".local";
    /// conda 安装目录名
    pub const CONDA_DIR: &str = "conda";
    /// conda 渠道，按优先级排列
    pub const CONDA_CHANNELS: &[&str] = &["bioconda", "conda-forge"];
    /// 运行时环境声明脚本（相对安装根目录）
    pub const PROFILE_SCRIPT: &str = "etc/profile.d/bioprov.sh";
    /// 安装回执文件（相对安装根目录）
    pub const RECEIPT_FILE: &str = "share/bioprov/receipt.toml";
    /// 构建上下文暂存目录（相对安装根目录）
    pub const CONTEXT_DIR: &str = "share/bioprov/context";
}
