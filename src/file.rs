// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文件工具模块
//!
//! 底层的文件读写、移动与类型识别。MIME 类型优先通过文件头的魔数识别，
//! 其次检查内容是否为 UTF-8 文本，最后按扩展名查表。

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Local};
use log::{debug, warn};

use crate::exception::{Exception, Result};
use crate::param::{known_extensions, mime_table, FILE_TYPES, MIMES};
use crate::strings;

/// 按魔数识别的文件类型，匹配顺序即表中顺序。
const MAGIC_NUMBERS: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
    (b"II*\x00", "image/tiff"),
    (b"MM\x00*", "image/tiff"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/x-gzip"),
    (b"ID3", "audio/mpeg"),
    (b"8BPS", "application/x-photoshop"),
    (b"{\\rtf", "text/rtf"),
];

/// 内容嗅探的最大字节数
const SNIFF_LEN: usize = 512;

pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// 写入文件，父目录不存在时自动创建。
pub fn write(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
    write_mode(path.as_ref(), content.as_ref(), false)
}

/// 追加内容到文件末尾。
pub fn append(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
    write_mode(path.as_ref(), content.as_ref(), true)
}

fn write_mode(path: &Path, content: &[u8], append: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    file.write_all(content)?;
    debug!("写入文件{}（{}字节）", path.display(), content.len());
    Ok(())
}

pub fn read(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Exception::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

pub fn read_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Exception::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

/// 文件内容的 base64 编码。
pub fn base64(path: impl AsRef<Path>) -> Result<String> {
    Ok(STANDARD.encode(read_bytes(path)?))
}

/// `data:` URI；无法识别 MIME 类型时返回 `None`。
pub fn uri(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match mime(path) {
        Some(mime) => Ok(Some(format!("data:{};base64,{}", mime, base64(path)?))),
        None => Ok(None),
    }
}

/// 移动文件。源文件不存在或目标已存在时失败。
pub fn move_to(old: impl AsRef<Path>, new: impl AsRef<Path>) -> Result<()> {
    let (old, new) = (old.as_ref(), new.as_ref());
    check_transfer(old, new)?;
    fs::rename(old, new)?;
    Ok(())
}

/// 复制文件。源文件不存在或目标已存在时失败。
pub fn copy(file: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
    let (file, target) = (file.as_ref(), target.as_ref());
    check_transfer(file, target)?;
    fs::copy(file, target)?;
    Ok(())
}

fn check_transfer(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Exception::FileNotFound(from.display().to_string()));
    }
    if to.exists() {
        warn!("目标文件{}已存在", to.display());
        return Err(Exception::InvalidPath(format!("{} already exists", to.display())));
    }
    Ok(())
}

/// 删除普通文件。
pub fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Exception::FileNotFound(path.display().to_string()));
    }
    fs::remove_file(path)?;
    Ok(())
}

/// 小写扩展名，没有扩展名时为空串。
pub fn extension(file: &str) -> String {
    Path::new(file)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 替换扩展名，保留所在目录。
pub fn set_extension(file: &str, extension: &str) -> String {
    Path::new(file)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

/// 带扩展名的文件名
pub fn filename(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 不带扩展名的文件名
pub fn name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn dirname(file: &str) -> String {
    Path::new(file)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn size(path: impl AsRef<Path>) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// 人类可读的大小，例如 `1.5 kb`。0 或更小时为 `0 kb`。
pub fn nice_size(size: u64) -> String {
    const UNITS: [&str; 9] = ["b", "kb", "mb", "gb", "tb", "pb", "eb", "zb", "yb"];
    if size == 0 {
        return "0 kb".to_string();
    }
    let exponent = ((size as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = size as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

pub fn modified(path: impl AsRef<Path>) -> Result<DateTime<Local>> {
    let time = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(time))
}

/// 按 chrono 格式字符串输出修改时间。
pub fn modified_format(path: impl AsRef<Path>, format: &str) -> Result<String> {
    Ok(modified(path)?.format(format).to_string())
}

/// 识别文件的 MIME 类型；文件不存在时返回 `None`。
pub fn mime(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return None;
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    if let Ok(file) = File::open(path) {
        let _ = file.take(SNIFF_LEN as u64).read_to_end(&mut head);
    }

    // 纯文本无法区分 css、js、json 等格式，此时扩展名更可信
    let ext = extension(&path.to_string_lossy());
    match (sniff(&head), extension_to_mime(&ext)) {
        (Some("text/plain"), Some(mime)) | (None, Some(mime)) => Some(mime.to_string()),
        (Some(mime), _) => Some(mime.to_string()),
        (None, None) => None,
    }
}

/// 根据内容判断 MIME 类型。
pub fn sniff(head: &[u8]) -> Option<&'static str> {
    if let Some((_, mime)) = MAGIC_NUMBERS.iter().find(|(magic, _)| head.starts_with(magic)) {
        return Some(*mime);
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") {
        match &head[8..12] {
            b"WAVE" => return Some("audio/x-wav"),
            b"AVI " => return Some("video/x-msvideo"),
            _ => {}
        }
    }

    // UTF-8 文本：截断可能落在多字节字符中间，最多容忍末尾 3 个字节
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() && head.len() - e.valid_up_to() < 4 => {
            std::str::from_utf8(&head[..e.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };
    if text.is_empty() {
        return None;
    }
    let lowered = text.trim_start_matches(crate::param::BOM).trim_start().to_lowercase();
    if lowered.starts_with("<?php") {
        Some("text/x-php")
    } else if lowered.starts_with("<!doctype html") || lowered.starts_with("<html") {
        Some("text/html")
    } else if lowered.contains("<svg") {
        Some("image/svg+xml")
    } else if lowered.starts_with("<?xml") {
        Some("text/xml")
    } else {
        Some("text/plain")
    }
}

/// 扩展名 → MIME 映射表
pub fn mimes() -> &'static [(&'static str, &'static [&'static str])] {
    mime_table()
}

/// 文件分类：image、document、archive、code、video、audio。
///
/// 长度为 3 的参数被当作扩展名；没有扩展名的文件先识别 MIME 类型再推断扩展名。
pub fn type_of(file: &str) -> Option<&'static str> {
    let mut ext = if file.chars().count() == 3 {
        file.to_string()
    } else {
        extension(file)
    };
    if ext.is_empty() {
        ext = mime(file)
            .and_then(|m| mime_to_extension(&m))
            .unwrap_or_default()
            .to_string();
    }
    extension_to_type(&ext.to_lowercase())
}

/// 按扩展名（已知扩展名）或 MIME 类型（包含 `/`）判断文件。
pub fn is(file: &str, value: &str) -> bool {
    if known_extensions().any(|e| e == value) {
        extension(file) == value
    } else if value.contains('/') {
        mime(file).as_deref() == Some(value)
    } else {
        false
    }
}

pub fn mime_to_extension(mime: &str) -> Option<&'static str> {
    mime_table()
        .iter()
        .find(|(_, mimes)| mimes.contains(&mime))
        .map(|(ext, _)| *ext)
}

pub fn mime_to_type(mime: &str) -> Option<&'static str> {
    extension_to_type(mime_to_extension(mime)?)
}

/// 扩展名对应的首选 MIME 类型
pub fn extension_to_mime(extension: &str) -> Option<&'static str> {
    MIMES.get(extension).and_then(|m| m.first().copied())
}

pub fn extension_to_type(extension: &str) -> Option<&'static str> {
    FILE_TYPES
        .iter()
        .find(|(_, exts)| exts.contains(&extension))
        .map(|(kind, _)| *kind)
}

/// 全部已知扩展名，或某个分类下的扩展名。
pub fn extensions(kind: Option<&str>) -> Vec<&'static str> {
    match kind {
        None => known_extensions().collect(),
        Some(kind) => FILE_TYPES
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, exts)| exts.to_vec())
            .unwrap_or_default(),
    }
}

/// 生成安全的文件名：文件名与扩展名分别 slug 化。
pub fn safe_name(file: &str) -> String {
    let ext = extension(file);
    let end = if ext.is_empty() {
        String::new()
    } else {
        format!(".{}", strings::slug(&ext, "-", strings::SLUG_ALLOWED))
    };
    format!("{}{}", strings::slug(&name(file), "-", "a-z0-9@._-"), end)
}

pub fn is_writable(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map_or(false, |m| !m.permissions().readonly())
}

pub fn is_readable(path: impl AsRef<Path>) -> bool {
    File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/test.txt");
        write(&path, "hello").unwrap();
        append(&path, " world").unwrap();
        assert_eq!(read(&path).unwrap(), "hello world");
        assert_eq!(size(&path).unwrap(), 11);
        assert!(exists(&path));
        assert!(is_readable(&path));
        assert!(is_writable(&path));
        assert_eq!(base64(&path).unwrap(), "aGVsbG8gd29ybGQ=");
        assert_eq!(
            uri(&path).unwrap().as_deref(),
            Some("data:text/plain;base64,aGVsbG8gd29ybGQ=")
        );
    }

    #[test]
    fn test_move_copy_remove() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        write(&a, "x").unwrap();
        copy(&a, &b).unwrap();
        assert!(copy(&a, &b).is_err());
        move_to(&a, &c).unwrap();
        assert!(!exists(&a));
        assert!(matches!(move_to(&a, &c), Err(Exception::FileNotFound(_))));
        remove(&c).unwrap();
        assert!(remove(&c).is_err());
        assert!(read(&c).is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(extension("some/path/image.JPG"), "jpg");
        assert_eq!(extension("README"), "");
        assert_eq!(filename("some/path/image.jpg"), "image.jpg");
        assert_eq!(name("some/path/image.jpg"), "image");
        assert_eq!(dirname("some/path/image.jpg"), "some/path");
        assert_eq!(set_extension("some/path/image.jpg", "png"), "some/path/image.png");
        assert_eq!(safe_name("Über Image@2x.JPEG"), "ueber-image@2x.jpeg");
    }

    #[test]
    fn test_nice_size() {
        assert_eq!(nice_size(0), "0 kb");
        assert_eq!(nice_size(500), "500 b");
        assert_eq!(nice_size(1536), "1.5 kb");
        assert_eq!(nice_size(1024 * 1024 * 3), "3 mb");
    }

    #[test]
    fn test_mime_detection() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("image.bin");
        write(&png, b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR").unwrap();
        assert_eq!(mime(&png).as_deref(), Some("image/png"));

        let html = dir.path().join("page");
        write(&html, "<!DOCTYPE html><html></html>").unwrap();
        assert_eq!(mime(&html).as_deref(), Some("text/html"));

        let empty = dir.path().join("data.json");
        write(&empty, "").unwrap();
        assert_eq!(mime(&empty).as_deref(), Some("application/json"));

        let css = dir.path().join("style.css");
        write(&css, "body { color: red; }").unwrap();
        assert_eq!(mime(&css).as_deref(), Some("text/css"));

        assert_eq!(mime(dir.path().join("missing.txt")), None);
    }

    #[test]
    fn test_lookups() {
        assert_eq!(mime_to_extension("image/jpeg"), Some("jpg"));
        assert_eq!(mime_to_type("application/pdf"), Some("document"));
        assert_eq!(extension_to_mime("json"), Some("application/json"));
        assert_eq!(extension_to_type("mp3"), Some("audio"));
        assert_eq!(extension_to_type("exe"), None);
        assert_eq!(type_of("photo.png"), Some("image"));
        assert_eq!(type_of("zip"), Some("archive"));
        assert!(extensions(Some("archive")).contains(&"tgz"));
        assert!(extensions(None).contains(&"hqx"));
        assert!(extensions(Some("nope")).is_empty());
        assert!(is("photo.png", "png"));
        assert!(!is("photo.png", "nope"));
        assert_eq!(mimes().len(), MIMES.len());
    }
}
