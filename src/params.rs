// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路径参数模块
//!
//! 解析与生成 `key:value/key:value` 形式的 URL 参数，保持插入顺序。

use std::fmt;

use crate::strings;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    items: Vec<(String, String)>,
}

impl Params {
    /// 解析 `a:1/b:2`。值中可以再包含 `:`，只按第一个冒号切分；重复的键以最后一次为准。
    pub fn parse(s: &str) -> Self {
        let mut params = Self::default();
        for part in strings::split(s, "/", 0) {
            let mut pieces = strings::split(&part, ":", 0).into_iter();
            let Some(key) = pieces.next() else {
                continue;
            };
            let value = pieces.collect::<Vec<_>>().join(":");
            params.set(&key, &value);
        }
        params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 设置参数；已有的键在原位置被替换。
    pub fn set(&mut self, key: &str, value: &str) {
        match self.items.iter_mut().find(|(k, _)| k == key) {
            Some(item) => item.1 = value.to_string(),
            None => self.items.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.items.iter().position(|(k, _)| k == key)?;
        Some(self.items.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.items.clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (k, v) in iter {
            params.set(&k.into(), &v.into());
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Params {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .items
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_to_string() {
        let p = Params::parse("tag:rust/page:2/time:10:30");
        assert_eq!(p.get("tag"), Some("rust"));
        assert_eq!(p.get("page"), Some("2"));
        assert_eq!(p.get("time"), Some("10:30"));
        assert_eq!(p.to_string(), "tag:rust/page:2/time:10:30");
    }

    #[test]
    fn test_from_pairs_and_set() {
        let mut p = Params::from(vec![("a", "1"), ("b", "2")]);
        p.set("a", "3");
        p.set("c", "4");
        assert_eq!(p.to_string(), "a:3/b:2/c:4");
        assert_eq!(p.remove("b").as_deref(), Some("2"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_empty() {
        let p = Params::parse("");
        assert!(p.is_empty());
        assert_eq!(p.to_string(), "");
    }
}
