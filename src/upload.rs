// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 上传文件处理
//!
//! 把请求中登记的临时文件移动到目标位置。目标路径是一个模板，可以使用
//! `{name}` `{filename}` `{safeName}` `{safeFilename}` `{extension}` `{safeExtension}`。

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::exception::{Exception, Result, UploadError};
use crate::file;
use crate::media::Media;
use crate::request::{Request, UploadedFile};
use crate::strings;

/// 未设置 `max_size` 时允许的最大字节数
pub const DEFAULT_MAX_SIZE: u64 = 8 * 1024 * 1024;

/// 对临时文件做最后检查，返回 `false` 时拒绝上传。
pub type Accept = Arc<dyn Fn(&Media) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct UploadOptions {
    pub input: String,
    pub to: String,
    pub overwrite: bool,
    pub max_size: u64,
    pub accept: Option<Accept>,
}

impl UploadOptions {
    pub fn new(to: &str) -> Self {
        Self {
            input: "file".to_string(),
            to: to.to_string(),
            overwrite: true,
            max_size: DEFAULT_MAX_SIZE,
            accept: None,
        }
    }

    pub fn input(mut self, input: &str) -> Self {
        self.input = input.to_string();
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn accept<F>(mut self, accept: F) -> Self
    where
        F: Fn(&Media) -> bool + Send + Sync + 'static,
    {
        self.accept = Some(Arc::new(accept));
        self
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("input", &self.input)
            .field("to", &self.to)
            .field("overwrite", &self.overwrite)
            .field("max_size", &self.max_size)
            .field("accept", &self.accept.is_some())
            .finish()
    }
}

/// 一次上传的结果：成功时持有目标文件，失败时持有错误码。
#[derive(Debug)]
pub struct Upload {
    options: UploadOptions,
    source: Option<UploadedFile>,
    file: Option<Media>,
    error: Option<UploadError>,
}

impl Upload {
    /// 立即尝试移动文件，结果通过 [`Upload::file`] 和 [`Upload::error`] 获取。
    pub fn new(request: &Request, options: UploadOptions) -> Self {
        let mut upload = Self {
            source: request.file(&options.input).cloned(),
            options,
            file: None,
            error: None,
        };
        match upload.move_file() {
            Ok(target) => {
                debug!("[ID{}]上传文件已保存到{}", request.id(), target.display());
                upload.file = Some(Media::new(target, None));
            }
            Err(e) => {
                warn!("[ID{}]上传失败：{}", request.id(), e.message());
                upload.error = Some(e);
            }
        }
        upload
    }

    /// 展开目标路径模板；请求中没有该文件时返回 `None`。
    pub fn to(&self) -> Option<String> {
        let filename = client_filename(self.source.as_ref()?)?;
        let name = file::name(filename);
        let extension = file::extension(filename);
        let safe_name = strings::slug(&name, "-", "a-z0-9@._-");
        let safe_extension = extension.replace("jpeg", "jpg");
        let safe_filename = format!("{}.{}", safe_name, safe_extension);

        Some(strings::template(
            &self.options.to,
            [
                ("name", name.as_str()),
                ("filename", filename),
                ("safeName", safe_name.as_str()),
                ("safeFilename", safe_filename.as_str()),
                ("extension", extension.as_str()),
                ("safeExtension", safe_extension.as_str()),
            ],
        ))
    }

    fn move_file(&self) -> std::result::Result<PathBuf, UploadError> {
        let source = match &self.source {
            Some(s) if client_filename(s).is_some() && !s.tmp_name.as_os_str().is_empty() => s,
            _ => return Err(UploadError::MissingFile),
        };
        if source.error != 0 {
            return Err(UploadError::FailedUpload);
        }

        let target = PathBuf::from(self.to().ok_or(UploadError::MissingFile)?);
        if target.exists() && !self.options.overwrite {
            return Err(UploadError::UnallowedOverwrite);
        }
        if source.size > self.options.max_size {
            return Err(UploadError::FileTooBig);
        }
        if let Some(accept) = &self.options.accept {
            if !accept(&Media::new(&source.tmp_name, None)) {
                return Err(UploadError::Unaccepted);
            }
        }

        relocate(&source.tmp_name, &target).map_err(|_| UploadError::MoveFailed)?;
        Ok(target)
    }

    /// 失败时转为 `Result`，便于使用 `?`。
    pub fn into_result(self) -> Result<Media> {
        match (self.file, self.error) {
            (Some(file), _) => Ok(file),
            (None, Some(e)) => Err(Exception::Upload(e)),
            (None, None) => Err(Exception::Upload(UploadError::MissingFile)),
        }
    }
}

// --- Getter 访问器实现 ---
impl Upload {
    pub fn file(&self) -> Option<&Media> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<UploadError> {
        self.error
    }

    pub fn source(&self) -> Option<&UploadedFile> {
        self.source.as_ref()
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }
}

/// 客户端提交的文件名只取最后一段，`/` 与 `\\` 都视为分隔符。
fn client_filename(source: &UploadedFile) -> Option<&str> {
    source
        .name
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
}

/// 跨文件系统时 rename 会失败，此时退回复制后删除。
fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}
