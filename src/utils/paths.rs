/// 路径工具
pub struct PathUtils;

impl PathUtils {
    /// 从 URL 推断下载文件名（取最后一个路径段）
    pub fn filename_from_url(url: &str) -> Option<String> {
        let trimmed = url.trim_end_matches('/');
        let name = trimmed.rsplit('/').next()?;
        if name.is_empty() || name.contains("://") {
            None
        } else {
            Some(name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            PathUtils::filename_from_url(
                "https://faculty.washington.edu/browning/beagle/beagle.25Nov19.28d.jar"
            ),
            Some("beagle.25Nov19.28d.jar".to_string())
        );
        assert_eq!(
            PathUtils::filename_from_url("https://example.com/a/b/"),
            Some("b".to_string())
        );
        assert_eq!(PathUtils::filename_from_url("https://"), None);
    }
}
