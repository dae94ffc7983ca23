// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 验证器模块
//!
//! 两层接口：
//! - 强类型的验证函数，例如 [`email`]、[`between`]，可以直接调用；
//! - [`Validators`] 注册表，按名称调用作用于 JSON 值的验证器，[`invalid`] 基于它批量校验表单数据。
//!
//! 注册表中的名称与规则里使用的名称一致：`in`、`match`、`notIn` 分别对应
//! [`in_list`]、[`matches`]、[`not_in`]。

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use log::debug;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::collection::value_to_string;
use crate::exception::{Exception, Result};
use crate::file;

lazy_static! {
    static ref ALPHA: Regex = Regex::new(r"(?i)^[a-z]+$").unwrap();
    static ref ALPHANUM: Regex = Regex::new(r"(?i)^[a-z0-9]+$").unwrap();
    static ref FILENAME: Regex = Regex::new(r"(?i)^[a-z0-9@._-]+$").unwrap();
    static ref NUMERIC: Regex = Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
    static ref INTEGER: Regex = Regex::new(r"^\s*[+-]?(0|[1-9]\d*)\s*$").unwrap();
    static ref EMAIL: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$"
    )
    .unwrap();
    static ref DEFAULT_VALIDATORS: Validators = Validators::default();
}

/// 日期验证接受的格式
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// 数值的“大小”：数字取其值，数字字符串取解析后的值，字符串取去除首尾空白后的字符数，
/// 数组和对象取元素个数。
pub fn size(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if is_numeric(s) => s.trim().parse().unwrap_or(0.0),
        Value::String(s) => s.trim().chars().count() as f64,
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        Value::Bool(_) | Value::Null => 0.0,
    }
}

fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

pub fn accepted(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "yes" | "true" | "1" | "on"),
        _ => false,
    }
}

pub fn alpha(value: &str) -> bool {
    ALPHA.is_match(value)
}

pub fn alphanum(value: &str) -> bool {
    ALPHANUM.is_match(value)
}

pub fn between(value: &Value, min: f64, max: f64) -> bool {
    self::min(value, min) && self::max(value, max)
}

/// 可以被解析为真实存在的日历日期。
pub fn date(value: &str) -> bool {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
}

pub fn different(value: &Value, other: &Value) -> bool {
    value != other
}

pub fn email(value: &str) -> bool {
    value.len() <= 254 && EMAIL.is_match(value)
}

pub fn filename(value: &str) -> bool {
    FILENAME.is_match(value) && value.chars().count() >= 2
}

/// 严格比较：`"1"` 与 `1` 不相等。
pub fn in_list(value: &Value, list: &[Value]) -> bool {
    list.contains(value)
}

pub fn integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => INTEGER.is_match(s),
        Value::Bool(true) => true,
        _ => false,
    }
}

pub fn ip(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

/// 用正则表达式匹配。支持 `/pattern/flags` 形式（flags 中的 `i` `m` `s` `x` 生效）和裸正则。
pub fn matches(value: &str, pattern: &str) -> Result<bool> {
    Ok(compile_pattern(pattern)?.is_match(value))
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    let delimited = pattern
        .chars()
        .next()
        .filter(|c| !c.is_alphanumeric() && *c != '\\' && !c.is_whitespace())
        .and_then(|d| {
            let end = pattern.rfind(d).filter(|&end| end > 0)?;
            Some((&pattern[d.len_utf8()..end], &pattern[end + d.len_utf8()..]))
        });

    let (body, flags) = match delimited {
        Some((body, flags)) if flags.chars().all(|c| c.is_ascii_alphabetic()) => (body, flags),
        _ => (pattern, ""),
    };

    Ok(RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()?)
}

pub fn max(value: &Value, max: f64) -> bool {
    size(value) <= max
}

pub fn min(value: &Value, min: f64) -> bool {
    size(value) >= min
}

pub fn not_in(value: &Value, list: &[Value]) -> bool {
    !in_list(value, list)
}

pub fn num(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => is_numeric(s),
        _ => false,
    }
}

/// 值存在且不为 null、空字符串或空数组。`0`、`"0"` 与 `false` 都算已填写。
pub fn filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

pub fn required(key: &str, data: &Map<String, Value>) -> bool {
    filled(data.get(key))
}

pub fn same(value: &Value, other: &Value) -> bool {
    value == other
}

pub fn size_is(value: &Value, expected: f64) -> bool {
    size(value) == expected
}

/// 上传文件（带 `size` 字段，单位字节）不超过 `kilobytes`。
pub fn filesize(value: &Value, kilobytes: f64) -> bool {
    match value.get("size").and_then(Value::as_f64) {
        Some(bytes) => bytes / 1024.0 <= kilobytes,
        None => false,
    }
}

/// 文件路径，或带 `tmp_name` 字段的上传文件
fn file_path(value: &Value) -> Option<&str> {
    match value {
        Value::String(path) => Some(path.as_str()),
        Value::Object(map) => map.get("tmp_name").and_then(Value::as_str),
        _ => None,
    }
}

pub fn mime(value: &Value, allowed: &[&str]) -> bool {
    file_path(value)
        .and_then(|p| file::mime(Path::new(p)))
        .map_or(false, |m| allowed.contains(&m.as_str()))
}

pub fn image(value: &Value) -> bool {
    file_path(value)
        .and_then(|p| file::mime(Path::new(p)))
        .and_then(|m| file::mime_to_type(&m))
        == Some("image")
}

/// 注册表中的验证器：第一个参数是被验证的值，其余参数来自规则。
pub type Validator = Arc<dyn Fn(&Value, &[Value]) -> Result<bool> + Send + Sync>;

/// 名称 → 验证器的分发表
#[derive(Clone)]
pub struct Validators {
    table: HashMap<String, Validator>,
}

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index)
        .ok_or_else(|| Exception::ValidatorArguments(name.to_string()))
}

fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64> {
    let number = match arg(name, args, index)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.ok_or_else(|| Exception::ValidatorArguments(name.to_string()))
}

/// 列表参数：单个数组参数，或把剩余参数整体当作列表。
fn list_arg(args: &[Value]) -> Vec<Value> {
    match args {
        [Value::Array(items)] => items.clone(),
        other => other.to_vec(),
    }
}

impl Default for Validators {
    fn default() -> Self {
        let mut v = Self {
            table: HashMap::new(),
        };
        v.register("accepted", |value, _| Ok(accepted(value)));
        v.register("alpha", |value, _| Ok(alpha(&value_to_string(value))));
        v.register("alphanum", |value, _| Ok(alphanum(&value_to_string(value))));
        v.register("between", |value, args| {
            Ok(between(
                value,
                number_arg("between", args, 0)?,
                number_arg("between", args, 1)?,
            ))
        });
        v.register("date", |value, _| Ok(date(&value_to_string(value))));
        v.register("different", |value, args| {
            Ok(different(value, arg("different", args, 0)?))
        });
        v.register("email", |value, _| Ok(email(&value_to_string(value))));
        v.register("filename", |value, _| Ok(filename(&value_to_string(value))));
        v.register("in", |value, args| Ok(in_list(value, &list_arg(args))));
        v.register("integer", |value, _| Ok(integer(value)));
        v.register("ip", |value, _| Ok(ip(&value_to_string(value))));
        v.register("match", |value, args| {
            let pattern = arg("match", args, 0)?
                .as_str()
                .ok_or_else(|| Exception::ValidatorArguments("match".to_string()))?;
            matches(&value_to_string(value), pattern)
        });
        v.register("max", |value, args| Ok(max(value, number_arg("max", args, 0)?)));
        v.register("min", |value, args| Ok(min(value, number_arg("min", args, 0)?)));
        v.register("notIn", |value, args| Ok(not_in(value, &list_arg(args))));
        v.register("num", |value, _| Ok(num(value)));
        v.register("required", |value, _| Ok(filled(Some(value))));
        v.register("same", |value, args| Ok(same(value, arg("same", args, 0)?)));
        v.register("size", |value, args| {
            Ok(size_is(value, number_arg("size", args, 0)?))
        });
        v.register("filesize", |value, args| {
            Ok(filesize(value, number_arg("filesize", args, 0)?))
        });
        v.register("mime", |value, args| {
            let allowed = list_arg(args);
            let allowed: Vec<&str> = allowed.iter().filter_map(Value::as_str).collect();
            Ok(mime(value, &allowed))
        });
        v.register("image", |value, _| Ok(image(value)));
        v
    }
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或替换）一个验证器。
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value, &[Value]) -> Result<bool> + Send + Sync + 'static,
    {
        self.table.insert(name.to_string(), Arc::new(f));
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// 按名称排序的已注册验证器
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn call(&self, name: &str, value: &Value, args: &[Value]) -> Result<bool> {
        let validator = self
            .table
            .get(name)
            .ok_or_else(|| Exception::UnknownValidator(name.to_string()))?;
        validator(value, args)
    }

    /// 按规则校验数据，返回失败字段 → 错误信息。
    ///
    /// 未填写的字段只检查 `required`。字段的错误信息默认为字段名；
    /// 如果信息是数组，则按规则序号取对应的信息并累积为数组。
    pub fn invalid(
        &self,
        data: &Value,
        rules: &[(&str, Vec<Rule>)],
        messages: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let mut errors = Map::new();

        for (field, validations) in rules {
            let value = field_value(data, field);
            let is_filled = filled(value);
            let message = messages.get(*field);

            for (index, rule) in validations.iter().enumerate() {
                let passed = if rule.name == "required" {
                    is_filled
                } else if is_filled {
                    let value = value.unwrap_or(&Value::Null);
                    self.call(&rule.name, value, &rule.args)?
                } else {
                    true
                };
                if passed {
                    continue;
                }

                debug!("字段{}未通过{}验证", field, rule.name);
                match message {
                    Some(Value::Array(list)) => {
                        let text = list
                            .get(index)
                            .cloned()
                            .unwrap_or_else(|| Value::String(field.to_string()));
                        let entry = errors
                            .entry(field.to_string())
                            .or_insert_with(|| Value::Array(Vec::new()));
                        if let Value::Array(items) = entry {
                            items.push(text);
                        }
                    }
                    Some(text) => {
                        errors.insert(field.to_string(), text.clone());
                    }
                    None => {
                        errors.insert(field.to_string(), Value::String(field.to_string()));
                    }
                }
            }
        }
        Ok(errors)
    }
}

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validators").field("names", &self.names()).finish()
    }
}

/// 对象按键取值，数组按下标取值。
fn field_value<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    match data {
        Value::Object(map) => map.get(field),
        Value::Array(items) => field.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// 一条验证规则：验证器名称与附加参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub args: Vec<Value>,
}

impl Rule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with(name: &str, args: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }
}

impl From<&str> for Rule {
    fn from(name: &str) -> Self {
        Rule::new(name)
    }
}

/// 使用默认注册表调用验证器。
pub fn call(name: &str, value: &Value, args: &[Value]) -> Result<bool> {
    DEFAULT_VALIDATORS.call(name, value, args)
}

/// 使用默认注册表校验数据。
pub fn invalid(
    data: &Value,
    rules: &[(&str, Vec<Rule>)],
    messages: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    DEFAULT_VALIDATORS.invalid(data, rules, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn messages(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_match() {
        assert!(matches("super-09", "/[a-z0-9-]+/i").unwrap());
        assert!(!matches("#1asklajd.12jaxax", "/^[a-z0-9-]+$/i").unwrap());
        assert!(matches("ABC", "^[A-Z]+$").unwrap());
        assert!(matches("a/b", "#^a/b$#").unwrap());
        assert!(matches("x", "/(/").is_err());
    }

    #[test]
    fn test_same_different() {
        let a = json!("same same but different");
        let b = json!("same same but diffrent");
        assert!(same(&a, &a));
        assert!(!same(&a, &b));
        assert!(!different(&a, &a));
        assert!(different(&a, &b));
        assert!(different(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_date() {
        assert!(date("2017-12-24"));
        assert!(date("29.01.1989"));
        assert!(date("January 29, 1989"));
        assert!(!date("äöüß"));
        assert!(!date("2017-02-31"));
        assert!(!date("January 32, 1989"));
    }

    #[test]
    fn test_simple_validators() {
        assert!(email("bastian@getkirby.com"));
        assert!(!email("http://getkirby.com"));
        assert!(filename("my-awesome-image@2x.jpg"));
        assert!(!filename("my_broken!up#image.jpg"));
        assert!(accepted(&json!("on")));
        assert!(accepted(&json!("yes")));
        assert!(accepted(&json!("1")));
        assert!(accepted(&json!(1)));
        assert!(!accepted(&json!("no")));
        assert!(ip("127.0.0.1"));
        assert!(ip("::1"));
        assert!(!ip("not an ip"));
        assert!(alpha("abc"));
        assert!(!alpha("1234"));
        assert!(alphanum("abc1234"));
        assert!(!alphanum("#!asdas"));
        assert!(num(&json!("1234")));
        assert!(!num(&json!("abc")));
        assert!(integer(&json!("1234")));
        assert!(!integer(&json!("0.1")));
        assert!(integer(&json!(-5)));
    }

    #[test]
    fn test_min_max_between_size() {
        let range: Value = (0..=10).collect::<Vec<i32>>().into();
        assert!(min(&json!("superstring"), 5.0));
        assert!(!min(&json!("superstring"), 20.0));
        assert!(min(&json!(6), 5.0));
        assert!(!min(&json!(6), 20.0));
        assert!(min(&range, 5.0));
        assert!(max(&json!("superstring"), 11.0));
        assert!(!max(&json!("superstring"), 5.0));
        assert!(!max(&range, 5.0));
        assert!(between(&json!(6), 5.0, 11.0));
        assert!(!between(&json!(6), 3.0, 5.0));
        assert!(size_is(&json!("super"), 5.0));
        assert!(size_is(&json!("1234"), 1234.0));
        assert!(size_is(&json!([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]), 10.0));
    }

    #[test]
    fn test_in_not_in() {
        let list = [json!("a"), json!("b"), json!("c")];
        assert!(in_list(&json!("a"), &list));
        assert!(!in_list(&json!("d"), &list));
        assert!(not_in(&json!("d"), &list));
        assert!(!not_in(&json!("a"), &list));
    }

    #[test]
    fn test_filesize() {
        assert!(filesize(&json!({"size": 9000}), 9.0));
        assert!(!filesize(&json!({"size": 9000}), 8.0));
        assert!(!filesize(&json!({}), 8.0));
        assert!(!filesize(&json!("asdf"), 8.0));
    }

    #[test]
    fn test_mime_and_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kirby_test_mime");
        std::fs::write(&path, "sometext").unwrap();
        let p = path.to_string_lossy().to_string();
        assert!(mime(&json!({"tmp_name": p}), &["text/plain"]));
        assert!(mime(&json!(p), &["text/plain"]));
        assert!(!mime(&json!(p), &["image/png"]));
        assert!(!image(&json!(p)));

        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let gif = STANDARD
            .decode("R0lGODlhAQABAIABAP///wAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==")
            .unwrap();
        std::fs::write(&path, gif).unwrap();
        assert!(image(&json!(p)));
    }

    #[test]
    fn test_registry() {
        assert!(call("in", &json!("a"), &[json!(["a", "b"])]).unwrap());
        assert!(call("notIn", &json!("a"), &[json!("b"), json!("c")]).unwrap());
        assert!(call("between", &json!("homer"), &[json!(3), json!(6)]).unwrap());
        assert!(matches!(
            call("nope", &json!(1), &[]),
            Err(Exception::UnknownValidator(name)) if name == "nope"
        ));
        assert!(matches!(
            call("min", &json!(1), &[]),
            Err(Exception::ValidatorArguments(_))
        ));

        let mut validators = Validators::new();
        validators.register("even", |value, _| Ok(value.as_i64().map_or(false, |n| n % 2 == 0)));
        assert!(validators.has("even"));
        assert!(validators.call("even", &json!(4), &[]).unwrap());
    }

    #[test]
    fn test_invalid() {
        let rules = vec![
            ("username", vec![Rule::from("alpha")]),
            ("email", vec![Rule::from("required"), Rule::from("email")]),
            ("zip", vec![Rule::from("integer")]),
        ];
        let msgs = messages(json!({
            "username": "The username must not contain numbers",
            "email": "Invalid email",
            "zip": "The ZIP must contain only numbers"
        }));

        let data = json!({"username": 123, "email": "homersimpson.com", "zip": "abc"});
        assert_eq!(invalid(&data, &rules, &msgs).unwrap(), msgs);

        let data = json!({"username": "homer", "email": "homer@simpson.com", "zip": 123});
        assert!(invalid(&data, &rules, &msgs).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_simple() {
        let data = json!(["homer", null]);
        let rules = vec![("0", vec![Rule::from("alpha")]), ("1", vec![Rule::from("required")])];
        let result = invalid(&data, &rules, &Map::new()).unwrap();
        assert_eq!(result.get("1"), Some(&json!("1")));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_invalid_required() {
        let rules = vec![("email", vec![Rule::from("required")])];
        let msgs = messages(json!({"email": ""}));

        for data in [json!({"email": null}), json!({"name": "homer"}), json!({"email": ""}), json!({"email": []})] {
            assert_eq!(invalid(&data, &rules, &msgs).unwrap(), msgs);
        }
        for data in [json!({"email": "0"}), json!({"email": 0}), json!({"email": false}), json!({"email": "homer@simpson.com"})] {
            assert!(invalid(&data, &rules, &msgs).unwrap().is_empty());
        }
    }

    #[test]
    fn test_invalid_options() {
        let msgs = messages(json!({"username": ""}));
        let rules = vec![("username", vec![Rule::with("min", vec![json!(6)])])];
        assert_eq!(invalid(&json!({"username": "homer"}), &rules, &msgs).unwrap(), msgs);
        assert!(invalid(&json!({"username": "homersimpson"}), &rules, &msgs).unwrap().is_empty());

        let rules = vec![("username", vec![Rule::with("between", vec![json!(3), json!(6)])])];
        assert_eq!(invalid(&json!({"username": "ho"}), &rules, &msgs).unwrap(), msgs);
        assert_eq!(invalid(&json!({"username": "homersimpson"}), &rules, &msgs).unwrap(), msgs);
        assert!(invalid(&json!({"username": "homer"}), &rules, &msgs).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_message_list() {
        let rules = vec![("name", vec![Rule::from("alpha"), Rule::with("min", vec![json!(5)])])];
        let msgs = messages(json!({"name": ["letters only", "too short"]}));
        let result = invalid(&json!({"name": "a1"}), &rules, &msgs).unwrap();
        assert_eq!(result.get("name"), Some(&json!(["letters only", "too short"])));
    }
}
