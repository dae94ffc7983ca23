// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 键值存储模块
//!
//! `Silo` 是一个以字符串为键、JSON 值为值的简单存储，用于应用配置；
//! `Language` 在其之上增加了 `{key}` 模板替换，用于界面文案。
//! 两者都是显式传递的上下文对象，而不是进程级全局变量。

use serde_json::{Map, Value};

use crate::strings;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Silo {
    data: Map<String, Value>,
}

impl Silo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    /// 合并多个值，已有的键会被覆盖。
    pub fn set_many<K: Into<String>>(&mut self, values: impl IntoIterator<Item = (K, Value)>) {
        for (k, v) in values {
            self.data.insert(k.into(), v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.data.get(key).cloned().unwrap_or(default)
    }

    /// 读取字符串值；非字符串或不存在时返回 `None`。
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

/// 界面文案存储。
#[derive(Debug, Clone, Default)]
pub struct Language {
    silo: Silo,
}

impl Language {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.silo.set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.silo.get_str(key)
    }

    /// 读取文案并替换其中的 `{key}` 占位符。
    pub fn get_with(&self, key: &str, data: &[(&str, &str)]) -> Option<String> {
        self.get(key)
            .map(|value| strings::template(value, data.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let mut c = Silo::new();
        c.set("db.host", "localhost");
        c.set("debug", true);
        assert_eq!(c.get_str("db.host"), Some("localhost"));
        assert_eq!(c.get("debug"), Some(&json!(true)));
        assert_eq!(c.get_or("missing", json!("fallback")), json!("fallback"));

        c.set_many([("a", json!(1)), ("debug", json!(false))]);
        assert_eq!(c.get("debug"), Some(&json!(false)));
        assert_eq!(c.all().len(), 3);

        assert_eq!(c.remove("a"), Some(json!(1)));
        assert!(!c.has("a"));
        c.clear();
        assert!(c.all().is_empty());
    }

    #[test]
    fn test_language_template() {
        let mut l = Language::new();
        l.set("greeting", "Hello {name}");
        assert_eq!(l.get_with("greeting", &[("name", "Marge")]).as_deref(), Some("Hello Marge"));
        assert_eq!(l.get("greeting"), Some("Hello {name}"));
        assert_eq!(l.get_with("nope", &[]), None);
    }
}
