// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 翻译表模块
//!
//! 键的形式为 `{语言代码}.{键}`，例如 `de.user.username`。

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Translations {
    data: HashMap<String, HashMap<String, String>>,
    language: Option<String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置输出语言，例如 `en`、`de`。
    pub fn set_language(&mut self, lang: &str) {
        self.language = Some(lang.to_string());
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// 设置一条翻译，第一个 `.` 之前的部分是语言代码。没有 `.` 的键会被忽略。
    pub fn set(&mut self, key: &str, value: &str) {
        let Some((lang, rest)) = key.split_once('.') else {
            return;
        };
        self.data
            .entry(lang.to_string())
            .or_default()
            .insert(rest.to_string(), value.to_string());
    }

    /// 为某个语言一次设置多条翻译。
    pub fn set_many<K, V>(&mut self, lang: &str, values: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.data.entry(lang.to_string()).or_default();
        for (k, v) in values {
            table.insert(k.into(), v.into());
        }
    }

    /// 返回当前语言下的翻译；未设置语言、语言不存在或键不存在时返回 `None`。
    pub fn get(&self, key: &str) -> Option<&str> {
        let lang = self.language.as_ref()?;
        self.data.get(lang)?.get(key).map(String::as_str)
    }
}
