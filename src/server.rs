// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 服务器变量模块
//!
//! 从请求中派生出 CGI 风格的服务器变量（`REQUEST_METHOD`、`HTTP_HOST` 等）。
//! 主机名与端口来自客户端，读取时会被清洗。

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::request::Request;

lazy_static! {
    static ref TAGS: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref HOST_CHARS: Regex = Regex::new(r"[^A-Za-z0-9.:\-]").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVars {
    vars: BTreeMap<String, String>,
}

impl ServerVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据请求与本地端口构造服务器变量。
    pub fn from_request(request: &Request, server_port: u16) -> Self {
        let mut vars = Self::new();
        vars.set("REQUEST_METHOD", &request.method().to_string());
        vars.set("REQUEST_URI", request.uri());
        vars.set("SERVER_PROTOCOL", &request.version().to_string());
        vars.set("SERVER_PORT", &server_port.to_string());
        if request.ssl() {
            vars.set("HTTPS", "on");
        }
        if let Some(ip) = request.ip() {
            vars.set("REMOTE_ADDR", ip);
        }
        for (name, value) in request.headers() {
            let key = format!("HTTP_{}", name.replace('-', "_").to_uppercase());
            vars.set(&key, value);
        }
        let host = request
            .header("host")
            .map(|h| h.split(':').next().unwrap_or_default().to_string())
            .unwrap_or_default();
        vars.set("SERVER_NAME", &host);
        vars
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_uppercase(), value.to_string());
    }

    /// 读取变量，键名大小写不敏感。
    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.to_uppercase();
        let value = self.vars.get(&key)?;
        Some(match key.as_str() {
            "HTTP_HOST" | "SERVER_NAME" => sanitize_host(value),
            "SERVER_PORT" => value.chars().filter(char::is_ascii_digit).collect(),
            _ => value.clone(),
        })
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

/// 去掉标签后只保留主机名允许的字符。
fn sanitize_host(value: &str) -> String {
    let stripped = TAGS.replace_all(value, "");
    HOST_CHARS.replace_all(&stripped, "").into_owned()
}
