// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 数据适配器模块
//!
//! 按类型名或扩展名选择适配器，在 JSON 值与文本格式之间转换：
//! - `json`：标准 JSON。
//! - `kd`（扩展名 `md`、`txt`）：以 `----` 分隔的 `Key: value` 文本块。
//! - `php`（扩展名 `php`）：只支持编码为 `return array (...);` 形式的 PHP 文件。

use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;
use serde_json::{Map, Value};

use crate::exception::{Exception, Result};
use crate::file;
use crate::param::BOM;
use crate::strings;

/// 找不到适配器
pub const ERROR_INVALID_ADAPTER: u8 = 0;
/// 数据结构不能被该适配器编码
pub const ERROR_INVALID_DATA: u8 = 1;
/// 适配器不支持该操作
pub const ERROR_UNSUPPORTED: u8 = 2;

const KD_DIVIDER: &str = "\n\n----\n\n";
const KD_SAFE_DIVIDER: &str = "\n\n---\n\n";

pub type Encoder = Arc<dyn Fn(&Value) -> Result<String> + Send + Sync>;
pub type Decoder = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// 一个已注册的适配器
#[derive(Clone)]
pub struct Adapter {
    name: String,
    extensions: Vec<String>,
    encode: Encoder,
    decode: Decoder,
}

impl Adapter {
    pub fn new<E, D>(name: &str, extensions: &[&str], encode: E, decode: D) -> Self
    where
        E: Fn(&Value) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    pub fn encode(&self, data: &Value) -> Result<String> {
        (self.encode)(data)
    }

    pub fn decode(&self, input: &str) -> Result<Value> {
        (self.decode)(input)
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

// --- Getter 访问器实现 ---
impl Adapter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// 适配器注册表，按注册顺序查找扩展名。
#[derive(Debug, Clone)]
pub struct Adapters {
    adapters: Vec<Adapter>,
}

impl Default for Adapters {
    fn default() -> Self {
        let mut adapters = Self { adapters: Vec::new() };
        adapters.register(Adapter::new(
            "json",
            &["json"],
            |data| Ok(serde_json::to_string(data)?),
            |input| Ok(serde_json::from_str(input)?),
        ));
        adapters.register(Adapter::new("kd", &["md", "txt"], kd_encode, |input| {
            Ok(kd_decode(input))
        }));
        adapters.register(Adapter::new("php", &["php"], php_encode, |_| {
            Err(data_error(
                ERROR_UNSUPPORTED,
                "Decoding PHP strings is not supported",
            ))
        }));
        adapters
    }
}

impl Adapters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册适配器，同名适配器会被替换。
    pub fn register(&mut self, adapter: Adapter) {
        match self.adapters.iter_mut().find(|a| a.name == adapter.name) {
            Some(existing) => *existing = adapter,
            None => self.adapters.push(adapter),
        }
    }

    /// 先按名称查找，再按扩展名查找。
    pub fn adapter(&self, kind: &str) -> Result<&Adapter> {
        self.adapters
            .iter()
            .find(|a| a.name == kind)
            .or_else(|| {
                self.adapters
                    .iter()
                    .find(|a| a.extensions.iter().any(|e| e == kind))
            })
            .ok_or_else(|| data_error(ERROR_INVALID_ADAPTER, "Invalid adapter type"))
    }

    pub fn encode(&self, data: &Value, kind: &str) -> Result<String> {
        self.adapter(kind)?.encode(data)
    }

    pub fn decode(&self, input: &str, kind: &str) -> Result<Value> {
        self.adapter(kind)?.decode(input)
    }

    /// 读取并解码文件；未指定类型时使用文件扩展名。
    pub fn read(&self, path: impl AsRef<Path>, kind: Option<&str>) -> Result<Value> {
        let path = path.as_ref();
        let kind = resolve_kind(path, kind);
        let adapter = self.adapter(&kind)?;
        debug!("使用{}适配器读取{}", adapter.name, path.display());
        adapter.decode(&file::read(path)?)
    }

    /// 编码并写入文件；未指定类型时使用文件扩展名。
    pub fn write(&self, path: impl AsRef<Path>, data: &Value, kind: Option<&str>) -> Result<()> {
        let path = path.as_ref();
        let kind = resolve_kind(path, kind);
        let content = self.encode(data, &kind)?;
        file::write(path, content)
    }
}

fn resolve_kind(path: &Path, kind: Option<&str>) -> String {
    match kind {
        Some(kind) => kind.to_string(),
        None => file::extension(&path.to_string_lossy()),
    }
}

fn data_error(code: u8, message: &str) -> Exception {
    Exception::Data {
        code,
        message: message.to_string(),
    }
}

lazy_static! {
    static ref DEFAULT_ADAPTERS: Adapters = Adapters::default();
}

pub fn adapter(kind: &str) -> Result<&'static Adapter> {
    DEFAULT_ADAPTERS.adapter(kind)
}

pub fn encode(data: &Value, kind: &str) -> Result<String> {
    DEFAULT_ADAPTERS.encode(data, kind)
}

pub fn decode(input: &str, kind: &str) -> Result<Value> {
    DEFAULT_ADAPTERS.decode(input, kind)
}

pub fn read(path: impl AsRef<Path>, kind: Option<&str>) -> Result<Value> {
    DEFAULT_ADAPTERS.read(path, kind)
}

pub fn write(path: impl AsRef<Path>, data: &Value, kind: Option<&str>) -> Result<()> {
    DEFAULT_ADAPTERS.write(path, data, kind)
}

/// 字段值转为文本：字符串原样，数组与对象编码为 JSON。
fn kd_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kd_encode(data: &Value) -> Result<String> {
    let fields = data
        .as_object()
        .ok_or_else(|| data_error(ERROR_INVALID_DATA, "Kirby data must be an object"))?;

    let mut result: Vec<String> = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let key = strings::ucfirst(&strings::slug(key, "-", strings::SLUG_ALLOWED));
        if key.is_empty() || value.is_null() {
            continue;
        }
        let text = kd_value(value).replace(KD_DIVIDER, KD_SAFE_DIVIDER);
        result.push(format!("{}: {}", key, text.trim()));
    }
    Ok(result.join(KD_DIVIDER))
}

fn kd_decode(input: &str) -> Value {
    let input = input.replace(BOM, "");
    let mut data = Map::new();

    for field in input.split("\n----") {
        let Some(pos) = field.find(':') else {
            continue;
        };
        let key = field[..pos]
            .trim()
            .to_lowercase()
            .replace(['-', ' '], "_");
        if key.is_empty() {
            continue;
        }
        data.insert(key, Value::String(field[pos + 1..].trim().to_string()));
    }
    Value::Object(data)
}

fn php_encode(data: &Value) -> Result<String> {
    Ok(format!("<?php \n\nreturn {};\n\n?>", var_export(data, "")))
}

fn php_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn php_key(key: &str) -> String {
    match key.parse::<i64>() {
        Ok(n) if n.to_string() == key => key.to_string(),
        _ => php_string(key),
    }
}

/// 输出与 PHP `var_export` 相同布局的字面量。
fn var_export(value: &Value, indent: &str) -> String {
    let entries: Vec<(String, &Value)> = match value {
        Value::Null => return "NULL".to_string(),
        Value::Bool(b) => return b.to_string(),
        Value::Number(n) => return n.to_string(),
        Value::String(s) => return php_string(s),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (php_key(k), v)).collect(),
    };

    let inner = format!("{}  ", indent);
    let mut out = String::from("array (\n");
    for (key, item) in entries {
        out.push_str(&inner);
        out.push_str(&key);
        out.push_str(" => ");
        if item.is_array() || item.is_object() {
            out.push('\n');
            out.push_str(&inner);
        }
        out.push_str(&var_export(item, &inner));
        out.push_str(",\n");
    }
    out.push_str(indent);
    out.push(')');
    out
}
