use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件系统工具
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// 安全地创建目录
    pub fn create_dir_all(path: &Path) -> Result<(), io::Error> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// 安全地复制文件
    pub fn copy_file(src: &Path, dst: &Path) -> Result<(), io::Error> {
        // 确保目标目录存在
        if let Some(parent) = dst.parent() {
            Self::create_dir_all(parent)?;
        }

        fs::copy(src, dst)?;
        Ok(())
    }

    /// 原样复制整个目录树（保持相对结构）
    pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), io::Error> {
        for entry in WalkDir::new(src) {
            let entry = entry.map_err(io::Error::other)?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .map_err(io::Error::other)?;
            let target = dst.join(rel);
            if entry.file_type().is_dir() {
                Self::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                Self::copy_file(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    /// 写入文件，创建目录如果不存在
    pub fn write_to_string(path: &Path, content: &str) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            Self::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// 检查文件是否可读
    pub fn is_readable(path: &Path) -> bool {
        path.exists() && path.is_file()
    }

    /// 检查文件是否可执行（Unix 权限位）
    #[cfg(unix)]
    pub fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    pub fn is_executable(path: &Path) -> bool {
        Self::is_readable(path)
    }

    /// 设置文件为可执行
    #[cfg(unix)]
    pub fn make_executable(path: &Path) -> Result<(), io::Error> {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(crate::core::constants::fs::EXECUTABLE_FILE_PERMISSION);
        fs::set_permissions(path, perms)
    }

    #[cfg(not(unix))]
    pub fn make_executable(_path: &Path) -> Result<(), io::Error> {
        Ok(())
    }

    /// 创建符号链接，已存在时先替换
    #[cfg(unix)]
    pub fn symlink_replace(target: &Path, link: &Path) -> Result<(), io::Error> {
        if let Some(parent) = link.parent() {
            Self::create_dir_all(parent)?;
        }
        if link.symlink_metadata().is_ok() {
            fs::remove_file(link)?;
        }
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(not(unix))]
    pub fn symlink_replace(target: &Path, link: &Path) -> Result<(), io::Error> {
        Self::copy_file(target, link)
    }

    /// 列出目录下的一级子目录
    pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let mut subdirs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                subdirs.push(entry.path());
            }
        }
        Ok(subdirs)
    }

    /// 解压归档后定位唯一的顶层目录（源码包的惯例布局）
    pub fn single_subdir(dir: &Path) -> Result<Option<PathBuf>, io::Error> {
        let subdirs = Self::list_subdirs(dir)?;
        if subdirs.len() == 1 {
            Ok(subdirs.into_iter().next())
        } else {
            Ok(None)
        }
    }
}
