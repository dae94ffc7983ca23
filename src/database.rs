// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 数据库模块
//!
//! 在外部提供的连接（[`Driver`]）之上记录查询状态：影响行数、最后插入 ID、
//! 最后一次查询与错误，以及完整的查询轨迹。
//!
//! 查询失败默认只被记录；调用 [`Database::fail`] 后，下一次查询的失败会作为错误返回。
//! 该标志在每次查询后重置。

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use lazy_static::lazy_static;

use log::{debug, error, info};
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::collection::Collection;
use crate::exception::{DriverError, Exception, Result};
use crate::sql::{Bindings, Column, Dialect, Select, Sql, Statement};

lazy_static! {
    static ref COLUMN_NAME: Regex = Regex::new(r"^[A-Za-z0-9_.]+$").unwrap();
}

/// 查询结果中的一行。
pub type Row = Map<String, Value>;

/// 驱动执行一条语句后的结果。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub affected: u64,
    pub last_id: Option<String>,
    pub rows: Vec<Row>,
}

/// 外部数据库连接。
#[cfg_attr(test, mockall::automock)]
pub trait Driver: Send {
    /// 以命名绑定参数执行一条语句。
    fn execute(&mut self, query: &str, bindings: &[(String, Value)]) -> std::result::Result<QueryResult, DriverError>;

    /// 按数据库规则给字符串加引号并转义。
    fn quote(&self, value: &str) -> String;
}

/// 连接参数。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectOptions {
    /// 连接器名称，默认 `mysql`
    pub kind: String,
    pub host: Option<String>,
    pub database: Option<String>,
    pub charset: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// 表名前缀
    pub prefix: Option<String>,
    /// 连接 ID，缺省时自动生成
    pub id: Option<String>,
}

impl ConnectOptions {
    pub fn mysql(host: &str, database: &str) -> Self {
        Self {
            kind: "mysql".to_string(),
            host: Some(host.to_string()),
            database: Some(database.to_string()),
            ..Self::default()
        }
    }

    pub fn sqlite(database: &str) -> Self {
        Self {
            kind: "sqlite".to_string(),
            database: Some(database.to_string()),
            ..Self::default()
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// 连接器：根据连接参数生成 DSN。
pub type Connector = fn(&ConnectOptions) -> Result<String>;

fn mysql_connector(options: &ConnectOptions) -> Result<String> {
    let host = options
        .host
        .as_deref()
        .ok_or_else(|| Exception::Database("The mysql connection requires a \"host\" parameter".to_string()))?;
    let database = options
        .database
        .as_deref()
        .ok_or_else(|| Exception::Database("The mysql connection requires a \"database\" parameter".to_string()))?;
    Ok(format!(
        "mysql:host={};dbname={};charset={}",
        host,
        database,
        options.charset.as_deref().unwrap_or("utf8")
    ))
}

fn sqlite_connector(options: &ConnectOptions) -> Result<String> {
    let database = options
        .database
        .as_deref()
        .ok_or_else(|| Exception::Database("The sqlite connection requires a \"database\" parameter".to_string()))?;
    Ok(format!("sqlite:{}", database))
}

/// 连接器注册表，按名称查找。
#[derive(Debug, Clone)]
pub struct Connectors {
    table: HashMap<String, (Dialect, Connector)>,
}

impl Default for Connectors {
    fn default() -> Self {
        let mut connectors = Self {
            table: HashMap::new(),
        };
        connectors.register("mysql", Dialect::Mysql, mysql_connector);
        connectors.register("sqlite", Dialect::Sqlite, sqlite_connector);
        connectors
    }
}

impl Connectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或替换）一个连接器，`dialect` 决定生成 SQL 的方言。
    pub fn register(&mut self, name: &str, dialect: Dialect, connector: Connector) {
        self.table.insert(name.to_string(), (dialect, connector));
    }

    /// 返回方言与 DSN；未知的连接器名称是错误。
    pub fn dsn(&self, options: &ConnectOptions) -> Result<(Dialect, String)> {
        let kind = if options.kind.is_empty() { "mysql" } else { options.kind.as_str() };
        let (dialect, connector) = self
            .table
            .get(kind)
            .ok_or_else(|| Exception::Database(format!("Invalid database connector: {}", kind)))?;
        Ok((*dialect, connector(options)?))
    }
}

/// 查询轨迹中的一条记录。
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub query: String,
    pub bindings: Bindings,
    pub error: Option<DriverError>,
}

/// 最近一次查询的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum LastResult {
    Rows(Vec<Row>),
    Success(bool),
}

pub struct Database {
    id: String,
    dialect: Dialect,
    dsn: String,
    prefix: String,
    driver: Box<dyn Driver>,
    sql: Sql,
    fail: bool,
    affected: u64,
    last_id: Option<String>,
    last_query: Option<String>,
    last_result: Option<LastResult>,
    last_error: Option<DriverError>,
    trace: Vec<TraceEntry>,
}

impl Database {
    /// 使用默认连接器建立连接。
    pub fn connect(options: ConnectOptions, driver: Box<dyn Driver>) -> Result<Self> {
        Self::connect_with(&Connectors::default(), options, driver)
    }

    pub fn connect_with(connectors: &Connectors, options: ConnectOptions, driver: Box<dyn Driver>) -> Result<Self> {
        let (dialect, dsn) = connectors.dsn(&options).map_err(|e| {
            error!("数据库连接失败：{}", e);
            e
        })?;
        let id = options
            .id
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        info!("数据库连接{}已建立：{}", id, dsn);
        Ok(Self {
            id,
            dialect,
            dsn,
            prefix: options.prefix.unwrap_or_default(),
            driver,
            sql: Sql::new(dialect),
            fail: false,
            affected: 0,
            last_id: None,
            last_query: None,
            last_result: None,
            last_error: None,
            trace: vec![],
        })
    }

    /// 让下一次查询在失败时返回错误。
    pub fn fail(&mut self) -> &mut Self {
        self.fail = true;
        self
    }

    /// 转义字符串，不带外层引号。
    pub fn escape(&self, value: &str) -> String {
        let quoted = self.driver.quote(value);
        let mut chars = quoted.chars();
        chars.next();
        chars.next_back();
        chars.as_str().to_string()
    }

    /// 执行语句并记录状态。成功返回 `Some(rows)`；失败返回 `None`，或在 `fail` 时返回错误。
    fn hit(&mut self, query: &str, bindings: &[(String, Value)]) -> Result<Option<Vec<Row>>> {
        let fail = std::mem::replace(&mut self.fail, false);
        let outcome = self.driver.execute(query, bindings);
        self.last_query = Some(query.to_string());

        let (rows, err) = match outcome {
            Ok(result) => {
                debug!("查询成功：{}（影响{}行）", query, result.affected);
                self.affected = result.affected;
                self.last_id = result.last_id;
                self.last_error = None;
                (Some(result.rows), None)
            }
            Err(e) => {
                error!("查询失败：{}：{}", query, e);
                self.affected = 0;
                self.last_id = None;
                self.last_error = Some(e.clone());
                (None, Some(e))
            }
        };

        self.trace.push(TraceEntry {
            query: query.to_string(),
            bindings: bindings.to_vec(),
            error: self.last_error.clone(),
        });

        match err {
            Some(e) if fail => Err(Exception::Driver(e)),
            _ => Ok(rows),
        }
    }

    /// 执行查询并返回结果行。
    pub fn query(&mut self, query: &str, bindings: &[(String, Value)]) -> Result<Option<Vec<Row>>> {
        let rows = self.hit(query, bindings)?;
        if let Some(rows) = &rows {
            self.last_result = Some(LastResult::Rows(rows.clone()));
        }
        Ok(rows)
    }

    /// 执行不返回结果集的语句，返回是否成功。
    pub fn execute(&mut self, query: &str, bindings: &[(String, Value)]) -> Result<bool> {
        let success = self.hit(query, bindings)?.is_some();
        self.last_result = Some(LastResult::Success(success));
        Ok(success)
    }

    pub fn execute_statement(&mut self, statement: &Statement) -> Result<bool> {
        self.execute(&statement.query, &statement.bindings)
    }

    /// 以带前缀的表名开始一个查询。
    pub fn table(&mut self, name: &str) -> Query<'_> {
        let table = format!("{}{}", self.prefix, name);
        Query::new(self, table)
    }

    /// 建表。SQLite 的索引语句在表创建成功后依次执行。
    pub fn create_table(&mut self, table: &str, columns: &[Column]) -> Result<bool> {
        let statement = self.sql.create_table(table, columns)?;
        let mut queries = statement.query.split(';').map(str::trim).filter(|q| !q.is_empty());
        if let Some(first) = queries.next() {
            if !self.execute(first, &statement.bindings)? {
                return Ok(false);
            }
        }
        for query in queries {
            if !self.execute(query, &[])? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn drop_table(&mut self, table: &str) -> Result<bool> {
        let statement = self.sql.drop_table(table);
        self.execute_statement(&statement)
    }

    pub fn sql(&mut self) -> &mut Sql {
        &mut self.sql
    }
}

impl Database {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn affected(&self) -> u64 {
        self.affected
    }

    pub fn last_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&DriverError> {
        self.last_error.as_ref()
    }
}

/// 已建立连接的注册表，按 ID 查找。
#[derive(Default)]
pub struct Databases {
    connections: HashMap<String, Database>,
    order: Vec<String>,
}

impl Databases {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个连接，同 ID 的旧连接被替换。
    pub fn add(&mut self, database: Database) -> &mut Database {
        let id = database.id().to_string();
        self.order.retain(|existing| existing != &id);
        self.order.push(id.clone());
        match self.connections.entry(id) {
            Entry::Occupied(mut entry) => {
                entry.insert(database);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(database),
        }
    }

    pub fn instance(&mut self, id: &str) -> Option<&mut Database> {
        self.connections.get_mut(id)
    }

    /// 最后登记的连接。
    pub fn last(&mut self) -> Option<&mut Database> {
        let id = self.order.last()?;
        self.connections.get_mut(id)
    }

    /// 按登记顺序返回全部连接 ID。
    pub fn instances(&self) -> &[String] {
        &self.order
    }
}

/// 单表查询构建器。
pub struct Query<'a> {
    database: &'a mut Database,
    select: Select,
    bindings: Bindings,
}

impl<'a> Query<'a> {
    fn new(database: &'a mut Database, table: String) -> Self {
        Self {
            database,
            select: Select::new(&table),
            bindings: Bindings::new(),
        }
    }

    pub fn select<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.select = self.select.columns(columns);
        self
    }

    /// 追加原样拼接的条件，多个条件以 AND 连接。
    pub fn where_(mut self, condition: &str) -> Self {
        self.select.where_ = Some(match self.select.where_.take() {
            Some(existing) => format!("{} AND {}", existing, condition),
            None => condition.to_string(),
        });
        self
    }

    /// 追加 `column = :binding` 条件，列名只能包含字母、数字、`_` 与 `.`。
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Result<Self> {
        if !COLUMN_NAME.is_match(column) {
            return Err(Exception::Sql(format!("Invalid column name: {}", column)));
        }
        let name = Sql::generate_binding_name("where");
        self.bindings.push((name.clone(), value.into()));
        Ok(self.where_(&format!("{} = {}", column, name)))
    }

    pub fn order(mut self, order: &str) -> Self {
        self.select.order = Some(order.to_string());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.select.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.select.offset = offset;
        self
    }

    fn select_statement(&mut self) -> Result<Statement> {
        let mut statement = self.database.sql.select(&self.select)?;
        let mut bindings = self.bindings.clone();
        bindings.append(&mut statement.bindings);
        statement.bindings = bindings;
        Ok(statement)
    }

    /// 全部匹配的行，键为行号。
    pub fn all(mut self) -> Result<Option<Collection<Row>>> {
        let statement = self.select_statement()?;
        let rows = self.database.query(&statement.query, &statement.bindings)?;
        Ok(rows.map(Collection::from_vec))
    }

    pub fn first(self) -> Result<Option<Row>> {
        let rows = self.limit(1).all()?;
        Ok(rows.and_then(|rows| rows.first().cloned()))
    }

    pub fn insert<K: AsRef<str>>(self, values: &[(K, Value)]) -> Result<bool> {
        let statement = self.database.sql.insert(&self.select.table, values);
        self.database.execute_statement(&statement)
    }

    pub fn update<K: AsRef<str>>(self, values: &[(K, Value)]) -> Result<bool> {
        let mut statement = self
            .database
            .sql
            .update(&self.select.table, values, self.select.where_.as_deref());
        statement.bindings.extend(self.bindings);
        self.database.execute_statement(&statement)
    }

    pub fn delete(self) -> Result<bool> {
        let mut statement = self
            .database
            .sql
            .delete(&self.select.table, self.select.where_.as_deref());
        statement.bindings.extend(self.bindings);
        self.database.execute_statement(&statement)
    }
}
