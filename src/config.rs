// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 配置模块
//!
//! 演示服务器的运行参数，从 TOML 文件读取，缺失的字段使用默认值。

use log::warn;
use serde_derive::{Deserialize, Serialize};
use std::fs;

use crate::exception::{Exception, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    www_root: String,
    port: u16,
    /// 0 表示使用 CPU 核心数
    worker_threads: usize,
    /// 静态文件缓存的条目数
    cache_size: usize,
    /// 只监听 127.0.0.1
    local: bool,
    /// 站点首页地址，用于生成绝对 URL
    home: String,
    /// 默认语言代码
    language: String,
    /// 大于该字节数的静态文件不进入缓存
    cache_threshold: u64,
    /// 单个请求允许读取的最大字节数
    max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            www_root: ".".to_string(),
            port: 7878,
            worker_threads: 0,
            cache_size: 5,
            local: true,
            home: "http://127.0.0.1:7878".to_string(),
            language: "en".to_string(),
            cache_threshold: 1048576,
            max_request_size: 1048576,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 TOML 文本并规范化。
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| Exception::Config(e.to_string()))?;
        if config.worker_threads == 0 {
            config.worker_threads = num_cpus::get();
        }
        if config.cache_size == 0 {
            warn!("cache_size被设置为0，但目前尚不支持禁用缓存，因此该值将被改为5。");
            config.cache_size = 5;
        }
        Ok(config)
    }

    pub fn from_toml(filename: &str) -> Result<Self> {
        let content = fs::read_to_string(filename)
            .map_err(|e| Exception::Config(format!("无法读取配置文件{}：{}", filename, e)))?;
        Self::from_toml_str(&content)
    }
}

// --- Getter 访问器实现 ---
impl Config {
    pub fn www_root(&self) -> &str {
        &self.www_root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn cache_threshold(&self) -> u64 {
        self.cache_threshold
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }
}
