// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 访客信息模块

use crate::request::Request;

/// 基于单个请求的访客信息视图。
#[derive(Debug, Clone, Copy)]
pub struct Visitor<'a> {
    request: &'a Request,
}

impl<'a> Visitor<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self { request }
    }

    pub fn ip(&self) -> Option<&'a str> {
        self.request.ip()
    }

    pub fn ua(&self) -> Option<&'a str> {
        self.request.header("user-agent")
    }

    pub fn user_agent(&self) -> Option<&'a str> {
        self.ua()
    }

    pub fn accepted_language(&self) -> Option<&'a str> {
        self.request.header("accept-language")
    }

    /// `Accept-Language` 第一项中 `-` 之前的部分，小写。例如 `de-DE,en;q=0.5` → `de`。
    pub fn accepted_language_code(&self) -> Option<String> {
        let first = self.accepted_language()?.split(',').next()?;
        let code = first.split('-').next()?.trim().to_lowercase();
        if code.is_empty() {
            None
        } else {
            Some(code)
        }
    }

    pub fn referer(&self) -> Option<&'a str> {
        self.request.referer()
    }

    pub fn referrer(&self) -> Option<&'a str> {
        self.referer()
    }

    /// 访客 IP 是否在封禁列表中。
    pub fn banned(&self, list: &[&str]) -> bool {
        self.ip().map_or(false, |ip| list.contains(&ip))
    }
}
