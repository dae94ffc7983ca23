// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 媒体文件
//!
//! `Media` 把一个磁盘路径与可选的公开 URL 绑定在一起，并在 [`file`] 模块之上
//! 提供面向对象的访问方式。

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use log::debug;
use sha2::{Digest, Sha256};

use crate::exception::Result;
use crate::file;
use crate::header::{self, DownloadOptions, Header};

#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    root: PathBuf,
    url: Option<String>,
}

impl Media {
    /// 已存在的路径会被规范化为绝对路径。
    pub fn new(root: impl AsRef<Path>, url: Option<&str>) -> Self {
        let root = root.as_ref();
        Self {
            root: root.canonicalize().unwrap_or_else(|_| root.to_path_buf()),
            url: url.map(str::to_string),
        }
    }

    fn root_str(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }

    /// 根据根路径计算的稳定标识
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.root_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn dir(&self) -> String {
        file::dirname(&self.root_str())
    }

    pub fn filename(&self) -> String {
        file::filename(&self.root_str())
    }

    pub fn name(&self) -> String {
        file::name(&self.root_str())
    }

    pub fn safe_name(&self) -> String {
        file::safe_name(&self.filename())
    }

    pub fn extension(&self) -> String {
        file::extension(&self.root_str())
    }

    pub fn read(&self) -> Result<String> {
        file::read(&self.root)
    }

    pub fn write(&self, content: impl AsRef<[u8]>) -> Result<()> {
        file::write(&self.root, content)
    }

    pub fn append(&self, content: impl AsRef<[u8]>) -> Result<()> {
        file::append(&self.root, content)
    }

    /// 文件不存在时创建空文件，否则更新修改时间。
    pub fn touch(&self) -> Result<()> {
        let handle = OpenOptions::new().create(true).append(true).open(&self.root)?;
        handle.set_modified(SystemTime::now())?;
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        file::remove(&self.root)
    }

    /// 移动成功后 `root` 指向新位置。
    pub fn move_to(&mut self, to: impl AsRef<Path>) -> Result<()> {
        let to = to.as_ref();
        file::move_to(&self.root, to)?;
        debug!("{}已移动到{}", self.root.display(), to.display());
        self.root = to.canonicalize().unwrap_or_else(|_| to.to_path_buf());
        Ok(())
    }

    /// 复制到新位置并返回代表副本的 `Media`。
    pub fn copy(&self, to: impl AsRef<Path>) -> Result<Media> {
        file::copy(&self.root, to.as_ref())?;
        Ok(Media::new(to, None))
    }

    pub fn size(&self) -> Result<u64> {
        file::size(&self.root)
    }

    pub fn nice_size(&self) -> Result<String> {
        Ok(file::nice_size(self.size()?))
    }

    pub fn modified(&self) -> Result<DateTime<Local>> {
        file::modified(&self.root)
    }

    pub fn mime(&self) -> Option<String> {
        file::mime(&self.root)
    }

    pub fn type_of(&self) -> Option<&'static str> {
        file::type_of(&self.root_str())
    }

    pub fn is(&self, value: &str) -> bool {
        file::is(&self.root_str(), value)
    }

    pub fn base64(&self) -> Result<String> {
        file::base64(&self.root)
    }

    pub fn data_uri(&self) -> Result<Option<String>> {
        file::uri(&self.root)
    }

    pub fn exists(&self) -> bool {
        file::exists(&self.root)
    }

    pub fn is_writable(&self) -> bool {
        file::is_writable(&self.root)
    }

    pub fn is_readable(&self) -> bool {
        file::is_readable(&self.root)
    }

    /// 与文件 MIME 类型对应的 `Content-Type` 头部
    pub fn content_type(&self) -> Header {
        let mime = self.mime().unwrap_or_else(|| "application/octet-stream".to_string());
        header::content_type(&mime, None)
    }

    /// 下载该文件所需的头部，`filename` 缺省时使用文件名。
    pub fn download_headers(&self, filename: Option<&str>) -> Result<Vec<Header>> {
        let options = DownloadOptions {
            name: filename.map_or_else(|| self.filename(), str::to_string),
            size: Some(self.size()?),
            mime: self.mime().unwrap_or_else(|| "application/force-download".to_string()),
            modified: self.modified()?.with_timezone(&Utc),
        };
        Ok(header::download(&options))
    }
}

// --- Getter 访问器实现 ---
impl Media {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl std::fmt::Display for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root.display())
    }
}
