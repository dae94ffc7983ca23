// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # toolkit
//!
//! Web 应用常用的工具集合：路由、SQL 构建与数据库抽象、请求与会话、
//! URL 与文件工具、数据适配器、验证器和缓存。
//!
//! 所有状态都保存在显式传递的上下文对象中（`Silo`、`Session`、`UrlContext`、
//! `Databases` 等），不依赖进程级全局变量。

pub mod cache;
pub mod collection;
pub mod config;
pub mod data;
pub mod database;
pub mod escape;
pub mod exception;
pub mod file;
pub mod header;
pub mod media;
pub mod param;
pub mod params;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod session;
pub mod silo;
pub mod sql;
pub mod strings;
pub mod translation;
pub mod upload;
pub mod url;
pub mod util;
pub mod validator;
pub mod visitor;

pub use cache::{Cache, FileCache, MemoryDriver};
pub use collection::{Collection, HasField};
pub use config::Config;
pub use database::{Database, Databases};
pub use exception::{Exception, Result};
pub use media::Media;
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::Response;
pub use router::{Route, RouteOptions, Router};
pub use session::Session;
pub use silo::Silo;
pub use sql::{Sql, Statement};
pub use upload::Upload;
pub use url::UrlContext;
pub use util::HtmlBuilder;
pub use validator::Validators;

/// 工具集版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
