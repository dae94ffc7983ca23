// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 头部生成
//!
//! 生成状态行与常用的响应头部。函数只返回头部内容，由调用方写入 [`Response`]。
//!
//! [`Response`]: crate::response::Response

use std::fmt;

use chrono::{DateTime, Utc};

use crate::file;
use crate::param::STATUS_CODES;

/// 未指定协议时使用的协议版本
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.0";

/// 一条响应头部
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// 把状态码规范化为已知状态码：未知状态码一律视为 400。
pub fn resolve(code: u16) -> (u16, &'static str) {
    match STATUS_CODES.get(&code) {
        Some(reason) => (code, *reason),
        None => (400, STATUS_CODES.get(&400).copied().unwrap_or("Bad Request")),
    }
}

/// 状态行，例如 `HTTP/1.1 404 Not Found`。
pub fn status(code: u16, protocol: Option<&str>) -> String {
    let (code, reason) = resolve(code);
    format!("{} {} {}", protocol.unwrap_or(DEFAULT_PROTOCOL), code, reason)
}

/// `Content-Type` 头部。`mime` 也可以是扩展名，例如 `json`。
pub fn content_type(mime: &str, charset: Option<&str>) -> Header {
    let mime = file::extension_to_mime(mime).unwrap_or(mime);
    let value = match charset {
        Some(charset) if !charset.is_empty() => format!("{}; charset={}", mime, charset),
        _ => mime.to_string(),
    };
    Header::new("Content-Type", value)
}

pub fn success() -> String {
    status(200, None)
}

pub fn created() -> String {
    status(201, None)
}

pub fn accepted() -> String {
    status(202, None)
}

pub fn error() -> String {
    status(400, None)
}

pub fn forbidden() -> String {
    status(403, None)
}

pub fn notfound() -> String {
    status(404, None)
}

pub fn missing() -> String {
    status(404, None)
}

pub fn panic() -> String {
    status(500, None)
}

pub fn unavailable() -> String {
    status(503, None)
}

/// 重定向：状态行与 `Location` 头部。
pub fn redirect(url: &str, code: u16) -> (String, Header) {
    (status(code, None), Header::new("Location", url))
}

/// 下载响应的参数
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub name: String,
    pub size: Option<u64>,
    pub mime: String,
    pub modified: DateTime<Utc>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            name: "download".to_string(),
            size: None,
            mime: "application/force-download".to_string(),
            modified: Utc::now(),
        }
    }
}

/// 强制浏览器下载所需的头部，按发送顺序排列。
pub fn download(options: &DownloadOptions) -> Vec<Header> {
    let mut headers = vec![
        Header::new("Pragma", "public"),
        Header::new("Expires", "0"),
        Header::new("Cache-Control", "must-revalidate, post-check=0, pre-check=0"),
        Header::new(
            "Last-Modified",
            format!("{} GMT", options.modified.format("%a, %d %b %Y %H:%M:%S")),
        ),
        Header::new("Cache-Control", "private"),
        content_type(&options.mime, Some("UTF-8")),
        Header::new(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", options.name),
        ),
        Header::new("Content-Transfer-Encoding", "binary"),
    ];
    if let Some(size) = options.size.filter(|s| *s > 0) {
        headers.push(Header::new("Content-Length", size.to_string()));
    }
    headers.push(Header::new("Connection", "close"));
    headers
}
