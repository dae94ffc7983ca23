// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 会话模块
//!
//! 进程内的会话存储。会话在 `start` 之后才可读写，未启动时写操作被忽略、读操作返回 `None`。

use log::debug;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct Session {
    id: Option<String>,
    data: Map<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动会话并生成 ID；已启动时不做任何事。
    pub fn start(&mut self) {
        if self.id.is_some() {
            return;
        }
        let id = Uuid::new_v4().simple().to_string();
        debug!("会话已启动：{}", id);
        self.id = Some(id);
    }

    pub fn started(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        if self.started() {
            self.data.insert(key.to_string(), value.into());
        }
    }

    pub fn set_many<K: Into<String>>(&mut self, values: impl IntoIterator<Item = (K, Value)>) {
        if !self.started() {
            return;
        }
        for (k, v) in values {
            self.data.insert(k.into(), v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        if !self.started() {
            return None;
        }
        self.data.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Option<Value> {
        if !self.started() {
            return None;
        }
        Some(self.data.get(key).cloned().unwrap_or(default))
    }

    pub fn all(&self) -> Option<&Map<String, Value>> {
        self.id.as_ref().map(|_| &self.data)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// 销毁会话及其全部数据。
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            debug!("会话已销毁：{}", id);
            self.data.clear();
        }
    }

    pub fn stop(&mut self) {
        self.destroy();
    }

    /// 销毁后重新启动，得到一个新的 ID。
    pub fn restart(&mut self) {
        self.destroy();
        self.start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_started() {
        let mut s = Session::new();
        s.set("user", "homer");
        assert_eq!(s.get("user"), None);
        assert_eq!(s.get_or("user", json!("x")), None);
        assert!(s.all().is_none());
        assert!(s.id().is_none());
    }

    #[test]
    fn test_lifecycle() {
        let mut s = Session::new();
        s.start();
        let id = s.id().unwrap().to_string();
        s.start();
        assert_eq!(s.id(), Some(id.as_str()));

        s.set("user", "homer");
        s.set_many([("a", json!(1)), ("b", json!(2))]);
        assert_eq!(s.get("user"), Some(&json!("homer")));
        assert_eq!(s.get_or("missing", json!(0)), Some(json!(0)));
        assert_eq!(s.all().map(|d| d.len()), Some(3));
        assert_eq!(s.remove("a"), Some(json!(1)));

        s.restart();
        assert_ne!(s.id(), Some(id.as_str()));
        assert_eq!(s.get("user"), None);

        s.stop();
        assert!(!s.started());
    }
}
