// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # SQL 构建模块
//!
//! 生成带命名绑定参数的 SQL 语句。每个构建方法都返回 [`Statement`]，
//! 同时把绑定参数按查询字符串记录下来，供 [`Sql::bindings`] 查询。
//!
//! `WHERE`、`ON`、`GROUP BY`、`HAVING`、`ORDER BY` 子句原样拼接，调用方负责其安全性；
//! 写入的值一律通过绑定参数传递。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::exception::{Exception, Result};
use crate::strings;

/// 只设置偏移量时使用的最大 LIMIT 值。
pub const MAX_LIMIT: u64 = 18446744073709551615;

/// 允许的 JOIN 类型。
pub const JOIN_TYPES: &[&str] = &[
    "JOIN",
    "INNER JOIN",
    "OUTER JOIN",
    "LEFT OUTER JOIN",
    "LEFT JOIN",
    "RIGHT OUTER JOIN",
    "RIGHT JOIN",
    "FULL OUTER JOIN",
    "FULL JOIN",
    "NATURAL JOIN",
    "CROSS JOIN",
    "SELF JOIN",
];

/// 不需要绑定、直接写入语句的字面量。
const LITERAL_NOW: &str = "NOW()";

lazy_static! {
    static ref BINDING_LABEL: Regex = Regex::new("^[a-z0-9]+$").unwrap();
    static ref BINDING_COUNTER: AtomicU64 = AtomicU64::new(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default()
    );
}

/// 有序的绑定参数列表：(`:name`, 值)。
pub type Bindings = Vec<(String, Value)>;

/// 一条生成好的语句及其绑定参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub query: String,
    pub bindings: Bindings,
}

impl Statement {
    fn new(query: String, bindings: Bindings) -> Self {
        Self { query, bindings }
    }

    /// 查找某个绑定参数的值。
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

/// 数据库方言，决定 `CREATE TABLE` 的写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Mysql,
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dialect::Mysql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = Exception;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(Exception::Database(format!("Invalid database connector: {}", other))),
        }
    }
}

/// 一个 JOIN 子句。`kind` 为空表示普通 `JOIN`。
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: String,
    pub table: String,
    pub on: String,
}

impl Join {
    pub fn new(kind: &str, table: &str, on: &str) -> Self {
        Self {
            kind: kind.to_string(),
            table: table.to_string(),
            on: on.to_string(),
        }
    }
}

/// `SELECT` 语句的各个部分。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub table: String,
    pub columns: Vec<String>,
    pub distinct: bool,
    pub joins: Vec<Join>,
    pub where_: Option<String>,
    pub group: Option<String>,
    pub having: Option<String>,
    pub order: Option<String>,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Select {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn where_(mut self, condition: &str) -> Self {
        self.where_ = Some(condition.to_string());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn having(mut self, having: &str) -> Self {
        self.having = Some(having.to_string());
        self
    }

    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// `CREATE TABLE` 中的一列。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub name: String,
    /// id、varchar、text、int、timestamp
    pub kind: Option<String>,
    /// `Some(false)` 生成 `NOT NULL`，其余情况生成 `NULL`
    pub null: Option<bool>,
    /// PRIMARY、PRIMARY KEY 或 INDEX（大小写不敏感）
    pub key: Option<String>,
    pub default: Option<Value>,
}

impl Column {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// SQL 构建器。
#[derive(Debug, Clone)]
pub struct Sql {
    dialect: Dialect,
    bindings: HashMap<String, Bindings>,
}

impl Sql {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            bindings: HashMap::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 生成唯一的绑定参数名 `:label_xxxxxxxxxxxxx`。不符合 `^[a-z0-9]+$` 的标签被替换为 `invalid`。
    pub fn generate_binding_name(label: &str) -> String {
        let label = if BINDING_LABEL.is_match(label) {
            label
        } else {
            "invalid"
        };
        let unique = BINDING_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x000f_ffff_ffff_ffff;
        format!(":{}_{:013x}", label, unique)
    }

    /// 某条查询记录的绑定参数；未记录时为空。
    pub fn bindings(&self, query: &str) -> &[(String, Value)] {
        self.bindings.get(query).map(Vec::as_slice).unwrap_or_default()
    }

    fn record(&mut self, query: String, bindings: Bindings) -> Statement {
        debug!("生成SQL：{}（{}个绑定参数）", query, bindings.len());
        self.bindings.insert(query.clone(), bindings.clone());
        Statement::new(query, bindings)
    }

    pub fn select(&mut self, select: &Select) -> Result<Statement> {
        let mut query = vec!["SELECT".to_string()];
        let mut bindings = Bindings::new();

        if select.distinct {
            query.push("DISTINCT".to_string());
        }

        if select.columns.is_empty() {
            query.push("*".to_string());
        } else {
            query.push(select.columns.join(", "));
        }

        query.push(format!("FROM {}", select.table));

        for join in &select.joins {
            let join_type = format!("{} JOIN", join.kind.to_uppercase()).trim_start().to_string();
            if !JOIN_TYPES.contains(&join_type.as_str()) {
                return Err(Exception::Sql(format!("Invalid join type {}", join_type)));
            }
            query.push(format!("{} {} ON {}", join_type, join.table, join.on));
        }

        let clauses = [
            ("WHERE", &select.where_),
            ("GROUP BY", &select.group),
            ("HAVING", &select.having),
            ("ORDER BY", &select.order),
        ];
        for (keyword, clause) in clauses {
            if let Some(clause) = clause.as_ref().filter(|c| !c.is_empty()) {
                query.push(format!("{} {}", keyword, clause));
            }
        }

        if select.offset > 0 || select.limit.is_some() {
            let limit = select.limit.unwrap_or(MAX_LIMIT);
            let offset_binding = Self::generate_binding_name("offset");
            let limit_binding = Self::generate_binding_name("limit");
            query.push(format!("LIMIT {}, {}", offset_binding, limit_binding));
            bindings.push((offset_binding, Value::from(select.offset)));
            bindings.push((limit_binding, Value::from(limit)));
        }

        Ok(self.record(query.join(" "), bindings))
    }

    pub fn insert<K: AsRef<str>>(&mut self, table: &str, values: &[(K, Value)]) -> Statement {
        let (clause, bindings) = Self::values(values, ", ", false);
        let query = format!("INSERT INTO {} {}", table, clause);
        self.record(query, bindings)
    }

    pub fn update<K: AsRef<str>>(&mut self, table: &str, values: &[(K, Value)], where_: Option<&str>) -> Statement {
        let (clause, bindings) = Self::values(values, ", ", true);
        let mut query = format!("UPDATE {} SET {}", table, clause);
        if let Some(condition) = where_.filter(|w| !w.is_empty()) {
            query.push_str(&format!(" WHERE {}", condition));
        }
        self.record(query, bindings)
    }

    pub fn delete(&mut self, table: &str, where_: Option<&str>) -> Statement {
        let mut query = format!("DELETE FROM {}", table);
        if let Some(condition) = where_.filter(|w| !w.is_empty()) {
            query.push_str(&format!(" WHERE {}", condition));
        }
        self.record(query, Bindings::new())
    }

    /// 生成值列表。
    ///
    /// `set` 为真时生成 `key = :value_x` 列表，否则生成 `(keys) VALUES (:value_x, ...)`。
    /// `NOW()` 与 null 直接写入语句，数组和对象以 JSON 字符串绑定。
    pub fn values<K: AsRef<str>>(values: &[(K, Value)], separator: &str, set: bool) -> (String, Bindings) {
        let mut fields = vec![];
        let mut output = vec![];
        let mut bindings = Bindings::new();

        for (key, value) in values {
            let key = key.as_ref();
            let rendered = match value {
                Value::Null => "null".to_string(),
                Value::String(s) if s == LITERAL_NOW => s.clone(),
                _ => {
                    let bound = match value {
                        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
                        other => other.clone(),
                    };
                    let name = Self::generate_binding_name("value");
                    bindings.push((name.clone(), bound));
                    name
                }
            };
            if set {
                output.push(format!("{} = {}", key, rendered));
            } else {
                fields.push(key.to_string());
                output.push(rendered);
            }
        }

        let clause = if set {
            output.join(separator)
        } else {
            format!("({}) VALUES ({})", fields.join(separator), output.join(separator))
        };
        (clause, bindings)
    }

    pub fn drop_table(&mut self, table: &str) -> Statement {
        self.record(format!("DROP TABLE {}", table), Bindings::new())
    }

    /// 生成建表语句。SQLite 方言下的索引以 `;` 分隔的额外语句附加在后面。
    pub fn create_table(&mut self, table: &str, columns: &[Column]) -> Result<Statement> {
        let mut output = vec![];
        let mut keys: Vec<(String, String)> = vec![];
        let mut bindings = Bindings::new();

        for column in columns {
            let kind = column
                .kind
                .as_deref()
                .ok_or_else(|| Exception::Sql(format!("No column type given for column {}", column.name)))?;
            let mut key = column.key.clone();
            let template = match (self.dialect, kind) {
                (Dialect::Mysql, "id") => {
                    key = Some("PRIMARY".to_string());
                    "{column.name} INT(11) UNSIGNED NOT NULL AUTO_INCREMENT"
                }
                (Dialect::Mysql, "varchar") => "{column.name} varchar(255) {column.null} {column.default}",
                (Dialect::Mysql, "text") => "{column.name} TEXT",
                (Dialect::Mysql, "int") | (Dialect::Mysql, "timestamp") => {
                    "{column.name} INT(11) UNSIGNED {column.null} {column.default}"
                }
                (Dialect::Sqlite, "id") => "{column.name} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL UNIQUE",
                (Dialect::Sqlite, "varchar") | (Dialect::Sqlite, "text") => {
                    "{column.name} TEXT {column.null} {column.key} {column.default}"
                }
                (Dialect::Sqlite, "int") | (Dialect::Sqlite, "timestamp") => {
                    "{column.name} INTEGER {column.null} {column.key} {column.default}"
                }
                (_, other) => return Err(Exception::Sql(format!("Unsupported column type: {}", other))),
            };

            let null = if column.null == Some(false) { "NOT NULL" } else { "NULL" };

            let key = key.map(|k| k.to_uppercase()).map(|k| {
                if k == "PRIMARY" {
                    "PRIMARY KEY".to_string()
                } else {
                    k
                }
            });
            let key = key.filter(|k| k == "PRIMARY KEY" || k == "INDEX");
            if let Some(k) = &key {
                keys.push((column.name.clone(), k.clone()));
            }

            let default = match &column.default {
                Some(value) => {
                    let name = Self::generate_binding_name("default");
                    bindings.push((name.clone(), value.clone()));
                    format!("DEFAULT {}", name)
                }
                None => String::new(),
            };

            let column_key = key.filter(|k| k != "INDEX").unwrap_or_default();
            let rendered = strings::template(
                template,
                [
                    ("column.name", column.name.as_str()),
                    ("column.null", null),
                    ("column.key", column_key.as_str()),
                    ("column.default", default.as_str()),
                ],
            );
            output.push(rendered.trim().to_string());
        }

        let mut inner = output.join(",\n");
        match self.dialect {
            Dialect::Mysql => {
                for (name, key) in &keys {
                    inner.push_str(&format!(",\n{} ({})", key, name));
                }
                Ok(self.record(format!("CREATE TABLE {} (\n{}\n)", table, inner), bindings))
            }
            Dialect::Sqlite => {
                // 绑定参数只属于建表语句，按建表语句记录
                let create = format!("CREATE TABLE \"{}\" (\n{}\n)", table, inner);
                let mut statement = self.record(create, bindings);
                for (name, _) in keys.iter().filter(|(_, key)| key == "INDEX") {
                    statement
                        .query
                        .push_str(&format!(";\nCREATE INDEX {} ON \"{}\" ({})", name, table, name));
                }
                Ok(statement)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binding_names() {
        let a = Sql::generate_binding_name("value");
        let b = Sql::generate_binding_name("value");
        assert!(a.starts_with(":value_"));
        assert_eq!(a.len(), ":value_".len() + 13);
        assert_ne!(a, b);
        assert!(Sql::generate_binding_name("x; DROP").starts_with(":invalid_"));
        assert!(Sql::generate_binding_name("Upper").starts_with(":invalid_"));
    }

    #[test]
    fn test_select() {
        let mut sql = Sql::new(Dialect::Mysql);
        let stmt = sql.select(&Select::new("users")).unwrap();
        assert_eq!(stmt.query, "SELECT * FROM users");
        assert!(stmt.bindings.is_empty());

        let select = Select::new("users")
            .columns(&["id", "name"])
            .distinct(true)
            .join(Join::new("left", "posts", "posts.user = users.id"))
            .where_("id > 1")
            .group("name")
            .having("count(id) > 2")
            .order("name ASC");
        let stmt = sql.select(&select).unwrap();
        assert_eq!(
            stmt.query,
            "SELECT DISTINCT id, name FROM users LEFT JOIN posts ON posts.user = users.id WHERE id > 1 GROUP BY name HAVING count(id) > 2 ORDER BY name ASC"
        );
        assert_eq!(sql.bindings(&stmt.query).len(), 0);
    }

    #[test]
    fn test_select_limit_and_offset() {
        let mut sql = Sql::new(Dialect::Sqlite);
        let stmt = sql.select(&Select::new("users").offset(10)).unwrap();
        assert!(stmt.query.starts_with("SELECT * FROM users LIMIT :offset_"));
        assert_eq!(stmt.bindings[0].1, json!(10));
        assert_eq!(stmt.bindings[1].1, json!(MAX_LIMIT));
        assert_eq!(sql.bindings(&stmt.query), stmt.bindings.as_slice());

        let stmt = sql.select(&Select::new("users").limit(5)).unwrap();
        assert_eq!(stmt.bindings[0].1, json!(0));
        assert_eq!(stmt.bindings[1].1, json!(5));
    }

    #[test]
    fn test_invalid_join() {
        let mut sql = Sql::new(Dialect::Mysql);
        let result = sql.select(&Select::new("a").join(Join::new("sideways", "b", "a.id = b.id")));
        assert!(matches!(result, Err(Exception::Sql(_))));
        let ok = sql.select(&Select::new("a").join(Join::new("", "b", "a.id = b.id"))).unwrap();
        assert_eq!(ok.query, "SELECT * FROM a JOIN b ON a.id = b.id");
    }

    #[test]
    fn test_insert_update_delete() {
        let mut sql = Sql::new(Dialect::Mysql);
        let values = vec![
            ("name", json!("Homer")),
            ("created", json!("NOW()")),
            ("deleted", Value::Null),
            ("tags", json!(["a", "b"])),
        ];
        let stmt = sql.insert("users", &values);
        assert!(stmt.query.starts_with("INSERT INTO users (name, created, deleted, tags) VALUES (:value_"));
        assert!(stmt.query.contains(", NOW(), null, :value_"));
        assert_eq!(stmt.bindings.len(), 2);
        assert_eq!(stmt.bindings[1].1, json!("[\"a\",\"b\"]"));

        let stmt = sql.update("users", &[("name", json!("Marge"))], Some("id = 1"));
        let name = &stmt.bindings[0].0;
        assert_eq!(stmt.query, format!("UPDATE users SET name = {} WHERE id = 1", name));

        let stmt = sql.delete("users", Some("id = 1"));
        assert_eq!(stmt.query, "DELETE FROM users WHERE id = 1");
        assert_eq!(sql.drop_table("users").query, "DROP TABLE users");
    }

    #[test]
    fn test_create_table_mysql() {
        let mut sql = Sql::new(Dialect::Mysql);
        let columns = vec![
            Column::new("id", "id"),
            Column::new("title", "varchar").null(false),
            Column::new("body", "text"),
            Column::new("views", "int").default_value(0).key("index"),
        ];
        let stmt = sql.create_table("posts", &columns).unwrap();
        let default = &stmt.bindings[0].0;
        assert_eq!(
            stmt.query,
            format!(
                "CREATE TABLE posts (\nid INT(11) UNSIGNED NOT NULL AUTO_INCREMENT,\ntitle varchar(255) NOT NULL,\nbody TEXT,\nviews INT(11) UNSIGNED NULL DEFAULT {},\nPRIMARY KEY (id),\nINDEX (views)\n)",
                default
            )
        );
    }

    #[test]
    fn test_create_table_sqlite() {
        let mut sql = Sql::new(Dialect::Sqlite);
        let columns = vec![
            Column::new("id", "id"),
            Column::new("slug", "varchar").key("primary"),
            Column::new("views", "int").key("INDEX"),
        ];
        let stmt = sql.create_table("posts", &columns).unwrap();
        assert_eq!(
            stmt.query,
            "CREATE TABLE \"posts\" (\nid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL UNIQUE,\nslug TEXT NULL PRIMARY KEY,\nviews INTEGER NULL\n);\nCREATE INDEX views ON \"posts\" (views)"
        );

        let columns = vec![Column::new("views", "int").key("index").default_value(0)];
        let stmt = sql.create_table("stats", &columns).unwrap();
        let (create, index) = stmt.query.split_once(";\n").unwrap();
        assert_eq!(index, "CREATE INDEX views ON \"stats\" (views)");
        assert_eq!(sql.bindings(create), stmt.bindings.as_slice());
        assert_eq!(sql.bindings(create).len(), 1);
        assert!(sql.bindings(&stmt.query).is_empty());
    }

    #[test]
    fn test_create_table_errors() {
        let mut sql = Sql::new(Dialect::Sqlite);
        let missing = Column {
            name: "x".to_string(),
            ..Column::default()
        };
        assert!(sql.create_table("t", &[missing]).is_err());
        assert!(sql.create_table("t", &[Column::new("x", "blob")]).is_err());
    }
}
