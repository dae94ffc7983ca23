// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 全部 HTTP 标头的提取（名称统一转为小写）。
//! 3. 请求体的读取，以及查询串/表单/JSON 数据的解析与清洗。
//! 4. 范围请求与内容协商相关字段。

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, error};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::exception::{Exception, Result};
use crate::param::*;
use crate::strings;

/// 客户端上传的一个文件，由服务器在接收完成后登记到请求上。
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// 客户端给出的原始文件名
    pub name: String,
    /// 服务器端的临时文件路径
    pub tmp_name: PathBuf,
    pub size: u64,
    pub mime: String,
    /// 0 表示上传成功
    pub error: u8,
}

/// 表示一个完整的 HTTP 请求。
#[derive(Debug, Clone)]
pub struct Request {
    /// 请求 ID，用于日志追踪
    id: u128,
    method: HttpRequestMethod,
    /// 请求目标（包含查询字符串）
    uri: String,
    version: HttpVersion,
    /// 小写标头名 → 标头值
    headers: HashMap<String, String>,
    body: Vec<u8>,
    accept_encoding: Vec<HttpEncoding>,
    https: bool,
    remote_addr: Option<String>,
    get_data: Map<String, Value>,
    post_data: Map<String, Value>,
    /// 合并后的请求数据，查询串优先
    data: Map<String, Value>,
    files: HashMap<String, UploadedFile>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// 标头部分必须是合法的 UTF-8；请求体按字节保存，存在 `Content-Length` 时按其截断。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self> {
        let (head, body) = match find_subsequence(buffer, b"\r\n\r\n") {
            Some(pos) => (&buffer[..pos], &buffer[pos + 4..]),
            None => (buffer, &[][..]),
        };

        let head = match std::str::from_utf8(head) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut lines = head.split(CRLF);
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split(' ').filter(|p| !p.is_empty()).collect();
        if parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::MalformedRequest(request_line.to_string()));
        }

        let method = parts[0].parse::<HttpRequestMethod>().map_err(|e| {
            error!("[ID{}]不支持的HTTP请求方法：{}", id, parts[0]);
            e
        })?;

        let version_str = parts[parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.0" => HttpVersion::V1_0,
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion(version_str));
            }
        };

        // 路径中出现空格虽然不规范，这里仍尝试拼接恢复
        let uri = parts[1..parts.len() - 1].join(" ");

        let mut request = Self::new(method, &uri);
        request.id = id;
        request.version = version;

        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                request.set_header(name, value.trim());
            }
        }

        let body = match request
            .header("content-length")
            .and_then(|len| len.parse::<usize>().ok())
        {
            Some(len) if len < body.len() => &body[..len],
            _ => body,
        };
        request.set_body(body.to_vec());

        debug!(
            "[ID{}]{} {} {}，标头{}个，请求体{}字节",
            id,
            request.method,
            request.uri,
            request.version,
            request.headers.len(),
            request.body.len()
        );
        Ok(request)
    }

    /// 直接构造一个请求，主要用于测试和路由分发。
    pub fn new(method: HttpRequestMethod, uri: &str) -> Self {
        let query = uri.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let get_data = sanitize_map(parse_urlencoded(query));
        Self {
            id: 0,
            method,
            uri: uri.to_string(),
            version: HttpVersion::V1_1,
            headers: HashMap::new(),
            body: Vec::new(),
            accept_encoding: Vec::new(),
            https: false,
            remote_addr: None,
            data: get_data.clone(),
            get_data,
            post_data: Map::new(),
            files: HashMap::new(),
        }
    }

    /// 设置（或覆盖）一个标头，并同步更新依赖标头的字段。
    pub fn set_header(&mut self, name: &str, value: &str) {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "accept-encoding" => self.accept_encoding = parse_accept_encoding(value),
            _ => {}
        }
        self.headers.insert(name, value.to_string());
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// 设置请求体。非 GET 请求会把请求体解析为表单数据（或 JSON 对象）并合并到 `data` 中。
    /// 替换请求体并重新解析表单数据。
    ///
    /// 旧请求体带来的字段被新字段取代，查询串字段仍然优先；
    /// 通过 [`Request::set`] 写入、且新请求体中没有的字段保持不变。
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
        let post_data = if self.method == HttpRequestMethod::Get {
            Map::new()
        } else {
            sanitize_map(parse_body(&self.body))
        };
        let stale = std::mem::replace(&mut self.post_data, post_data);
        for key in stale.keys() {
            if !self.get_data.contains_key(key) {
                self.data.remove(key);
            }
        }
        for (k, v) in &self.post_data {
            if !self.get_data.contains_key(k) {
                self.data.insert(k.clone(), v.clone());
            }
        }
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.set_body(body.to_vec());
        self
    }

    /// 标记请求来自 TLS 连接。
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn with_remote_addr(mut self, addr: &str) -> Self {
        self.remote_addr = Some(addr.to_string());
        self
    }

    /// 登记一个上传文件。
    pub fn with_file(mut self, input: &str, file: UploadedFile) -> Self {
        self.files.insert(input.to_string(), file);
        self
    }

    /// 读取合并后的请求数据。
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.data.get(key).cloned().unwrap_or(default)
    }

    /// 读取字符串形式的请求数据。
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// 设置或覆盖一项请求数据，值会经过与原始数据相同的清洗。
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), sanitize(value.into()));
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.get(key).map_or(false, |v| !v.is_null())
    }

    /// 判断请求方法，`ajax` 是特殊值。
    pub fn is(&self, method: &str) -> bool {
        if method.eq_ignore_ascii_case("ajax") {
            self.ajax()
        } else {
            method.to_uppercase() == self.method.to_string()
        }
    }

    pub fn ajax(&self) -> bool {
        self.header("x-requested-with")
            .map_or(false, |v| v.eq_ignore_ascii_case("xmlhttprequest"))
    }

    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    pub fn ssl(&self) -> bool {
        self.https
    }

    pub fn secure(&self) -> bool {
        self.ssl()
    }

    pub fn referer(&self) -> Option<&str> {
        self.header("referer")
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referer()
    }

    /// 按名称读取标头（大小写不敏感）。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn id(&self) -> u128 {
        self.id
    }

    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求目标（含查询参数）
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// 获取不含查询参数的路径
    pub fn path(&self) -> &str {
        self.uri.split(['?', '#']).next().unwrap_or_default()
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        self.header("user-agent").unwrap_or_default()
    }

    /// 获取客户端支持的压缩算法列表
    pub fn accept_encoding(&self) -> &[HttpEncoding] {
        &self.accept_encoding
    }

    /// 获取客户端接受的文件 MIME 类型
    pub fn accept(&self) -> Option<&str> {
        self.header("accept")
    }

    pub fn ip(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// 合并后的全部请求数据
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// 仅查询串数据
    pub fn get_data(&self) -> &Map<String, Value> {
        &self.get_data
    }

    /// 仅请求体数据
    pub fn post_data(&self) -> &Map<String, Value> {
        &self.post_data
    }

    pub fn files(&self) -> &HashMap<String, UploadedFile> {
        &self.files
    }

    pub fn file(&self, input: &str) -> Option<&UploadedFile> {
        self.files.get(input)
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_urlencoded(input: &str) -> Map<String, Value> {
    form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// 请求体优先按 JSON 对象解析，否则按 urlencoded 表单解析。
fn parse_body(body: &[u8]) -> Map<String, Value> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            return map;
        }
    }
    parse_urlencoded(trimmed)
}

/// 去除首尾空白和反斜杠转义，递归处理数组与对象。
fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(strings::stripslashes(&s).trim().to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(sanitize_map(map)),
        other => other,
    }
}

fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (k, sanitize(v))).collect()
}

/// 只要包含关键词即视为支持，顺序为 gzip、deflate、br。
fn parse_accept_encoding(value: &str) -> Vec<HttpEncoding> {
    let mut encodings = vec![];
    if value.contains("gzip") {
        encodings.push(HttpEncoding::Gzip);
    }
    if value.contains("deflate") {
        encodings.push(HttpEncoding::Deflate);
    }
    if value.contains("br") {
        encodings.push(HttpEncoding::Br);
    }
    encodings
}
