use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::process::Command;

pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta}) {percent}%")
            .unwrap()
            .progress_chars("#>-")
    );
    pb
}

pub fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<(), String> {
    let file = fs::File::open(zip_path).map_err(|e| format!("打开 ZIP 文件失败: {}", e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("读取 ZIP 文件失败: {}", e))?;
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("读取 ZIP 文件项失败: {}", e))?;
        let outpath = dest_dir.join(file.mangled_name());
        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath).map_err(|e| format!("创建目录失败: {}", e))?;
        } else {
            if let Some(p) = outpath.parent() {
                if !p.exists() {
                    fs::create_dir_all(p).map_err(|e| format!("创建父目录失败: {}", e))?;
                }
            }
            let mut outfile =
                fs::File::create(&outpath).map_err(|e| format!("创建文件失败: {}", e))?;
            std::io::copy(&mut file, &mut outfile).map_err(|e| format!("写入文件失败: {}", e))?;

            // 保留归档内的可执行位（gatk 包装脚本需要）
            #[cfg(unix)]
            if let Some(mode) = file.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(&outpath, fs::Permissions::from_mode(mode));
            }
        }
    }
    Ok(())
}

/// 解压 tar 归档；按扩展名选择压缩格式（目标系统总是带 tar）
pub fn extract_tar(tar_path: &Path, dest_dir: &Path) -> Result<(), String> {
    let name = tar_path.to_string_lossy();
    let flag = if name.ends_with(".tar.bz2") {
        "-xjf"
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        "-xzf"
    } else if name.ends_with(".tar.xz") {
        "-xJf"
    } else {
        "-xf"
    };

    fs::create_dir_all(dest_dir).map_err(|e| format!("创建目录失败: {}", e))?;

    let output = Command::new("tar")
        .args([
            flag,
            tar_path.to_str().ok_or("归档路径包含无效字符")?,
            "-C",
            dest_dir.to_str().ok_or("目标路径包含无效字符")?,
        ])
        .output()
        .map_err(|e| format!("执行解压命令失败: {}", e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("解压失败: {}", stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_extract_zip_roundtrip() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("bundle.zip");

        // 构造一个最小 zip：目录 + 文件
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        writer.add_directory("gatk-4.1.4.1/", options).unwrap();
        writer
            .start_file("gatk-4.1.4.1/gatk", options.unix_permissions(0o755))
            .unwrap();
        writer.write_all(b"#!/usr/bin/env python\n").unwrap();
        writer.finish().unwrap();

        let dest = dir.path().join("out");
        extract_zip(&zip_path, &dest).unwrap();

        let entry = dest.join("gatk-4.1.4.1/gatk");
        assert!(entry.is_file());
        #[cfg(unix)]
        assert!(crate::utils::FileSystemUtils::is_executable(&entry));
    }

    #[test]
    fn test_extract_zip_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(extract_zip(&dir.path().join("missing.zip"), dir.path()).is_err());
    }
}
