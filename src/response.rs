// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应
//!
//! `Response` 保存状态码、头部与正文，并负责按客户端的 `Accept-Encoding`
//! 选择 gzip / deflate / br 压缩，最后序列化为可以直接写入套接字的字节。

use crate::{
    header::{self, DownloadOptions, Header},
    param::*,
    request::Request,
    util::HtmlBuilder,
};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use bytes::Bytes;
use chrono::prelude::*;
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use log::{debug, error, warn};
use serde_json::Value;

use std::io::{self, Write};

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    date: DateTime<Utc>,
    content_encoding: Option<HttpEncoding>,
    server_name: String,
    headers: Vec<Header>,
    content: Bytes,
    head_only: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            date: Utc::now(),
            content_encoding: None,
            server_name: SERVER_NAME.to_string(),
            headers: Vec::new(),
            content: Bytes::new(),
            head_only: false,
        }
    }

    pub fn html(html: &str) -> Self {
        Self::new()
            .with_content_type("text/html;charset=utf-8")
            .with_body(html.to_string())
    }

    pub fn text(text: &str) -> Self {
        Self::new()
            .with_content_type("text/plain;charset=utf-8")
            .with_body(text.to_string())
    }

    pub fn json(value: &Value) -> Self {
        Self::new()
            .with_content_type("application/json")
            .with_body(value.to_string())
    }

    /// 重定向响应，未知状态码按 400 处理。
    pub fn redirect(url: &str, code: u16) -> Self {
        let (_, location) = header::redirect(url, code);
        Self::new().with_status(code).with_header(location)
    }

    /// 状态码对应的 HTML 错误页面。`204` 没有正文。
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        if code == 204 {
            return Self::new().with_status(204);
        }
        let note = note.or(match code {
            404 => Some(r"<h2>噢！</h2><p>你指定的网页无法找到。</p>"),
            405 => Some(r"<h2>噢！</h2><p>该地址不接受这种请求方法。</p>"),
            500 => Some(r"<h2>噢！</h2><p>服务器出现了一个内部错误。</p>"),
            _ => None,
        });
        Self::html(&HtmlBuilder::from_status_code(code, note).build()).with_status(code)
    }

    pub fn response_404() -> Self {
        Self::from_status_code(404, None)
    }

    pub fn response_400() -> Self {
        Self::from_status_code(400, None)
    }

    pub fn response_500() -> Self {
        Self::from_status_code(500, None)
    }

    /// 强制下载的响应。`options.size` 缺省时使用正文长度。
    pub fn download(content: impl Into<Bytes>, options: &DownloadOptions) -> Self {
        let content = content.into();
        let mut options = options.clone();
        options.size.get_or_insert(content.len() as u64);

        let mut response = Self::new().with_body(content);
        for h in header::download(&options) {
            match h.name.as_str() {
                // 这两项由 as_bytes 统一输出
                "Content-Length" => {}
                "Content-Type" => response.content_type = Some(h.value),
                _ => response.headers.push(h),
            }
        }
        response
    }

    pub fn with_status(mut self, code: u16) -> Self {
        self.set_code(code);
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.content = body.into();
        self.content_encoding = None;
        self
    }

    /// 响应 HTTP/1.0 请求时使用相同的协议版本。
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// HEAD 请求：保留 `Content-Length`，不发送正文。
    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }

    /// 按客户端支持的编码压缩正文。已经压缩过的媒体类型和空正文保持原样。
    pub fn compress(mut self, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        if self.content.is_empty() || self.content_encoding.is_some() {
            return self;
        }
        if let Some(t) = &self.content_type {
            if should_skip_compression(t) {
                debug!("[ID{}]{}类型无需压缩", id, t);
                return self;
            }
        }
        let encoding = decide_encoding(accept_encoding);
        match encoding {
            Some(HttpEncoding::Gzip) => debug!("[ID{}]使用Gzip压缩编码", id),
            Some(HttpEncoding::Br) => debug!("[ID{}]使用Brotli压缩编码", id),
            Some(HttpEncoding::Deflate) => debug!("[ID{}]使用Deflate压缩编码", id),
            None => return self,
        };
        match compress(self.content.to_vec(), encoding) {
            Ok(compressed) => {
                self.content = Bytes::from(compressed);
                self.content_encoding = encoding;
            }
            Err(e) => error!("[ID{}]压缩失败: {}，返回未压缩内容", id, e),
        }
        self
    }

    /// 按请求调整响应：协议版本、压缩与 HEAD。
    pub fn prepare(self, request: &Request) -> Self {
        let response = self
            .with_version(*request.version())
            .compress(request.accept_encoding(), request.id());
        if request.method() == HttpRequestMethod::Head {
            response.head_only()
        } else {
            response
        }
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        let (resolved, reason) = header::resolve(code);
        if resolved != code {
            warn!("未知的状态码：{}，改用{}", code, resolved);
        }
        self.status_code = resolved;
        self.information = reason.to_string();
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {} {}{}", self.version, self.status_code, self.information, CRLF);
        if let Some(t) = &self.content_type {
            head.push_str(&["Content-Type: ", t, CRLF].concat());
        }
        if let Some(e) = self.content_encoding {
            let name = match e {
                HttpEncoding::Gzip => "gzip",
                HttpEncoding::Deflate => "deflate",
                HttpEncoding::Br => "br",
            };
            head.push_str(&["Content-Encoding: ", name, CRLF].concat());
        }
        head.push_str(&format!("Content-Length: {}{}", self.content.len(), CRLF));
        head.push_str(&["Date: ", &format_date(&self.date), CRLF].concat());
        head.push_str(&["Server: ", &self.server_name, CRLF].concat());
        for h in &self.headers {
            head.push_str(&h.to_string());
            head.push_str(CRLF);
        }
        head.push_str(CRLF);

        let body: &[u8] = if self.head_only { b"" } else { &self.content };
        [head.as_bytes(), body].concat()
    }
}

// --- Getter 访问器实现 ---
impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// 第一条同名头部的值，名称大小写不敏感。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

fn compress(data: Vec<u8>, mode: Option<HttpEncoding>) -> io::Result<Vec<u8>> {
    let original_size = data.len();
    let result = match mode {
        Some(HttpEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Deflate) => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Br) => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
        None => Ok(data),
    };

    if let Ok(ref compressed) = result {
        let compressed_size = compressed.len();
        let ratio = if original_size > 0 {
            ((original_size as i64 - compressed_size as i64) as f64 / original_size as f64) * 100.0
        } else {
            0.0
        };
        debug!(
            "压缩完成: {:?}, 原始大小: {} bytes, 压缩后: {} bytes, 压缩率: {:.1}%",
            mode, original_size, compressed_size, ratio
        );
    }

    result
}

fn should_skip_compression(mime_type: &str) -> bool {
    let skip_types = [
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/gif",
        "image/webp",
        "image/bmp",
        "image/x-icon",
        "video/",
        "audio/",
        "application/zip",
        "application/x-zip",
        "application/x-rar",
        "application/x-7z-compressed",
        "application/gzip",
        "application/x-gzip",
        "application/pdf",
        "font/woff",
        "font/woff2",
    ];

    skip_types
        .iter()
        .any(|&skip_type| mime_type.starts_with(skip_type))
}

/// 优先 gzip，其次 deflate，最后 br。
fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    [HttpEncoding::Gzip, HttpEncoding::Deflate, HttpEncoding::Br]
        .into_iter()
        .find(|e| accept_encoding.contains(e))
}
