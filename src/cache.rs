// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 缓存模块
//!
//! - [`Driver`]：缓存驱动接口。驱动只需实现存取原始条目，过期判断由默认方法完成。
//! - [`MemoryDriver`]：基于 LRU 的进程内缓存，容量有上限。
//! - [`FileDriver`]：每个键一个 JSON 文件。
//! - [`Cache`]：按名称创建驱动的门面，没有驱动时所有调用都会失败。
//! - [`FileCache`]：服务器静态文件的字节缓存，以文件修改时间判断是否有效。

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use chrono::Utc;
use log::{debug, warn};
use lru::LruCache;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::exception::{Exception, Result};

/// 缓存中保存的条目。`expires == 0` 表示永不过期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheValue {
    pub value: Value,
    pub minutes: u64,
    pub created: i64,
    pub expires: i64,
}

impl CacheValue {
    /// `minutes` 为 `None` 或 0 时永不过期；过期时间超出 `i64` 范围时同样视为永不过期。
    pub fn new(value: Value, minutes: Option<u64>) -> Self {
        let created = Utc::now().timestamp();
        let minutes = minutes.unwrap_or(0);
        let expires = if minutes == 0 {
            0
        } else {
            i64::try_from(minutes)
                .ok()
                .and_then(|m| m.checked_mul(60))
                .and_then(|s| created.checked_add(s))
                .unwrap_or(0)
        };
        Self {
            value,
            minutes,
            created,
            expires,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires != 0 && self.expires < Utc::now().timestamp()
    }
}

pub trait Driver: Send {
    /// 写入原始条目
    fn store(&mut self, key: &str, value: CacheValue) -> Result<()>;
    /// 读取原始条目，不检查是否过期
    fn retrieve(&mut self, key: &str) -> Result<Option<CacheValue>>;
    fn remove(&mut self, key: &str) -> Result<bool>;
    fn flush(&mut self) -> Result<()>;

    fn set(&mut self, key: &str, value: Value, minutes: Option<u64>) -> Result<()> {
        self.store(key, CacheValue::new(value, minutes))
    }

    /// 读取未过期的值；过期条目会被顺便删除。
    fn get(&mut self, key: &str) -> Result<Option<Value>> {
        match self.retrieve(key)? {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value)),
            Some(_) => {
                debug!("缓存{}已过期", key);
                self.remove(key)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn get_or(&mut self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    fn exists(&mut self, key: &str) -> Result<bool> {
        Ok(!self.expired(key)?)
    }

    /// 不存在的键也视为已过期。
    fn expired(&mut self, key: &str) -> Result<bool> {
        Ok(self.retrieve(key)?.map_or(true, |entry| entry.is_expired()))
    }

    /// 过期时间戳，0 表示永不过期
    fn expires(&mut self, key: &str) -> Result<Option<i64>> {
        Ok(self.retrieve(key)?.map(|entry| entry.expires))
    }

    fn created(&mut self, key: &str) -> Result<Option<i64>> {
        Ok(self.retrieve(key)?.map(|entry| entry.created))
    }
}

pub struct MemoryDriver {
    cache: LruCache<String, CacheValue>,
}

impl MemoryDriver {
    pub fn from_capacity(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Exception::Cache("内存缓存的容量不能为0".to_string()))?;
        Ok(Self {
            cache: LruCache::new(capacity),
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

impl Driver for MemoryDriver {
    fn store(&mut self, key: &str, value: CacheValue) -> Result<()> {
        self.cache.put(key.to_string(), value);
        Ok(())
    }

    fn retrieve(&mut self, key: &str) -> Result<Option<CacheValue>> {
        Ok(self.cache.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.cache.pop(key).is_some())
    }

    fn flush(&mut self) -> Result<()> {
        self.cache.clear();
        Ok(())
    }
}

/// 条目保存在 `root` 目录下，文件名为键的 SHA-256。
pub struct FileDriver {
    root: PathBuf,
}

impl FileDriver {
    /// 目录不存在时自动创建。
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        if !crate::file::is_writable(&root) {
            return Err(Exception::Cache(format!(
                "缓存目录{}不可写",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.root.join(format!("{:x}", hasher.finalize()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Driver for FileDriver {
    fn store(&mut self, key: &str, value: CacheValue) -> Result<()> {
        fs::write(self.path(key), serde_json::to_vec(&value)?)?;
        Ok(())
    }

    fn retrieve(&mut self, key: &str) -> Result<Option<CacheValue>> {
        let path = self.path(key);
        if !path.is_file() {
            return Ok(None);
        }
        match serde_json::from_slice(&fs::read(&path)?) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!("缓存文件{}已损坏：{}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.path(key);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn flush(&mut self) -> Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// 缓存门面
#[derive(Default)]
pub struct Cache {
    driver: Option<Box<dyn Driver>>,
}

impl Cache {
    /// 没有驱动的缓存，调用任何方法都会返回错误。
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    /// 按名称创建驱动：
    /// - `memory`：参数 `{"capacity": 100}`，默认 100；
    /// - `file`：参数 `{"root": "path"}`，必填。
    pub fn setup(name: &str, args: &Value) -> Result<Self> {
        let driver: Box<dyn Driver> = match name {
            "memory" => {
                let capacity = args.get("capacity").and_then(Value::as_u64).unwrap_or(100);
                Box::new(MemoryDriver::from_capacity(capacity as usize)?)
            }
            "file" => {
                let root = args
                    .get("root")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Exception::Cache("file驱动需要root参数".to_string()))?;
                Box::new(FileDriver::new(root)?)
            }
            other => return Err(Exception::Cache(format!("未知的缓存驱动：{}", other))),
        };
        debug!("缓存驱动{}已初始化", name);
        Ok(Self::with_driver(driver))
    }

    fn driver(&mut self) -> Result<&mut (dyn Driver + 'static)> {
        self.driver
            .as_deref_mut()
            .ok_or_else(|| Exception::Cache("Please define a cache driver".to_string()))
    }

    pub fn set(&mut self, key: &str, value: Value, minutes: Option<u64>) -> Result<()> {
        self.driver()?.set(key, value, minutes)
    }

    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        self.driver()?.get(key)
    }

    pub fn get_or(&mut self, key: &str, default: Value) -> Result<Value> {
        self.driver()?.get_or(key, default)
    }

    pub fn retrieve(&mut self, key: &str) -> Result<Option<CacheValue>> {
        self.driver()?.retrieve(key)
    }

    pub fn exists(&mut self, key: &str) -> Result<bool> {
        self.driver()?.exists(key)
    }

    pub fn remove(&mut self, key: &str) -> Result<bool> {
        self.driver()?.remove(key)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.driver()?.flush()
    }

    pub fn expires(&mut self, key: &str) -> Result<Option<i64>> {
        self.driver()?.expires(key)
    }

    pub fn expired(&mut self, key: &str) -> Result<bool> {
        self.driver()?.expired(key)
    }

    pub fn created(&mut self, key: &str) -> Result<Option<i64>> {
        self.driver()?.created(key)
    }
}

#[derive(Clone)]
struct CacheEntry {
    content: Bytes,
    modified_time: SystemTime,
}

/// 静态文件缓存
pub struct FileCache {
    cache: LruCache<String, CacheEntry>,
}

impl FileCache {
    // 根据容量构造
    pub fn from_capacity(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Exception::Cache("文件缓存的容量不能为0".to_string()))?;
        Ok(Self {
            cache: LruCache::new(capacity),
        })
    }

    // 放入
    pub fn push(&mut self, filename: &str, bytes: Bytes, modified_time: SystemTime) {
        let entry = CacheEntry {
            content: bytes,
            modified_time,
        };
        self.cache.put(filename.to_string(), entry);
    }

    // 检查文件大小是否适合缓存
    pub fn should_cache(file_size: u64, threshold: u64) -> bool {
        file_size <= threshold
    }

    // 查询有效缓存：修改时间不一致的条目视为失效
    pub fn find(&mut self, filename: &str, current_modified_time: SystemTime) -> Option<&Bytes> {
        match self.cache.get(filename) {
            Some(entry) if entry.modified_time == current_modified_time => Some(&entry.content),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
