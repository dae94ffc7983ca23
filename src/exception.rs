// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了工具集中所有可能抛出的异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析、文件系统、SQL 构建、数据库驱动、缓存、上传与数据适配器等错误。
//! - **错误码**：上传与数据适配器错误附带一个小整数错误码，调用方可以据此区分失败原因。
//! - **用户友好**：所有变体都实现了 `Display`，可以直接写入日志或返回给客户端。

use thiserror::Error;

/// 上传失败时的错误码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// 请求中没有找到指定的上传文件
    MissingFile = 0,
    /// 客户端上传过程本身失败
    FailedUpload = 1,
    /// 目标文件已存在且不允许覆盖
    UnallowedOverwrite = 2,
    /// 文件大小超过限制
    FileTooBig = 3,
    /// 无法把临时文件移动到目标位置
    MoveFailed = 4,
    /// 文件被 `accept` 回调拒绝
    Unaccepted = 5,
}

impl UploadError {
    pub fn message(&self) -> &'static str {
        match self {
            UploadError::MissingFile => "The file has not been found",
            UploadError::FailedUpload => "The upload failed",
            UploadError::UnallowedOverwrite => "The file exists and cannot be overwritten",
            UploadError::FileTooBig => "The file is too big",
            UploadError::MoveFailed => "The file could not be moved",
            UploadError::Unaccepted => "The file is not accepted by the server",
        }
    }
}

/// 数据库驱动返回的错误，会被记录到 `Database::last_error` 中。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 工具集处理过程中发生的异常类型。
#[derive(Debug, Error)]
pub enum Exception {
    /// 请求字节流无法解析为合法的 UTF-8 字符串。
    #[error("Request bytes can't be parsed in UTF-8")]
    RequestIsNotUtf8,
    /// 请求行格式不正确。
    #[error("Malformed request line: {0}")]
    MalformedRequest(String),
    /// 不支持的 HTTP 方法。
    #[error("Unsupported request method: {0}")]
    UnsupportedRequestMethod(String),
    /// 不支持的 HTTP 协议版本。
    #[error("Unsupported HTTP version: {0}")]
    UnsupportedHttpVersion(String),
    /// 文件不存在。
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// 路径格式非法或包含越权尝试。
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// SQL 构建失败（非法的 JOIN 类型、不支持的列类型等）。
    #[error("SQL error: {0}")]
    Sql(String),
    /// 数据库连接参数或连接器错误。
    #[error("Database error: {0}")]
    Database(String),
    /// 驱动执行查询失败。
    #[error("Query failed: {0}")]
    Driver(#[from] DriverError),
    /// 数据适配器错误，附带错误码。
    #[error("{message}")]
    Data { code: u8, message: String },
    /// 上传错误，附带错误码。
    #[error("{}", .0.message())]
    Upload(UploadError),
    /// 集合操作失败（例如无法分组的值）。
    #[error("Collection error: {0}")]
    Collection(String),
    /// 缓存门面或驱动错误。
    #[error("Cache error: {0}")]
    Cache(String),
    /// 调用了未注册的验证器。
    #[error("The validator does not exist: {0}")]
    UnknownValidator(String),
    /// 验证器参数缺失或类型不对。
    #[error("Invalid arguments for validator {0}")]
    ValidatorArguments(String),
    /// 配置文件错误。
    #[error("Config error: {0}")]
    Config(String),
}

impl Exception {
    /// 返回异常附带的错误码；没有错误码的异常返回 `None`。
    pub fn code(&self) -> Option<u8> {
        match self {
            Exception::Data { code, .. } => Some(*code),
            Exception::Upload(e) => Some(*e as u8),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Exception>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_codes() {
        assert_eq!(Exception::Upload(UploadError::MissingFile).code(), Some(0));
        assert_eq!(Exception::Upload(UploadError::Unaccepted).code(), Some(5));
        assert_eq!(
            Exception::Upload(UploadError::FileTooBig).to_string(),
            "The file is too big"
        );
    }

    #[test]
    fn test_data_code_and_plain_errors() {
        let e = Exception::Data {
            code: 0,
            message: "Invalid adapter type".to_string(),
        };
        assert_eq!(e.code(), Some(0));
        assert_eq!(e.to_string(), "Invalid adapter type");
        assert_eq!(Exception::Sql("x".to_string()).code(), None);
    }
}
