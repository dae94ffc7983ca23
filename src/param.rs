// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了工具集共用的常量和数据结构，包括：
//! - HTTP 状态码及其原因短语。
//! - 文件扩展名到 MIME 类型的映射表，以及文件分类表。
//! - HTTP 方法、版本及编码格式的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::exception::Exception;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "toolkit-server";

/// HTTP 协议规定的换行符
pub const CRLF: &str = "\r\n";

/// 文件开头可能出现的 UTF-8 BOM
pub const BOM: &str = "\u{feff}";

const STATUS_TABLE: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (204, "No Content"),
    (206, "Partial Content"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (413, "Content Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (422, "Unprocessable Content"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
];

const MIME_TABLE: &[(&str, &[&str])] = &[
    ("hqx", &["application/mac-binhex40"]),
    ("cpt", &["application/mac-compactpro"]),
    ("csv", &["text/x-comma-separated-values", "text/comma-separated-values", "application/octet-stream"]),
    ("bin", &["application/macbinary"]),
    ("dms", &["application/octet-stream"]),
    ("exe", &["application/octet-stream", "application/x-msdownload"]),
    ("psd", &["application/x-photoshop"]),
    ("dll", &["application/octet-stream"]),
    ("pdf", &["application/pdf", "application/x-download"]),
    ("ai", &["application/postscript"]),
    ("eps", &["application/postscript"]),
    ("ps", &["application/postscript"]),
    ("xls", &["application/excel", "application/vnd.ms-excel", "application/msexcel"]),
    ("ppt", &["application/powerpoint", "application/vnd.ms-powerpoint"]),
    ("gtar", &["application/x-gtar"]),
    ("gz", &["application/x-gzip"]),
    ("php", &["application/x-httpd-php", "text/x-php"]),
    ("js", &["application/x-javascript"]),
    ("swf", &["application/x-shockwave-flash"]),
    ("tar", &["application/x-tar"]),
    ("tgz", &["application/x-tar", "application/x-gzip-compressed"]),
    ("xhtml", &["application/xhtml+xml"]),
    ("xht", &["application/xhtml+xml"]),
    ("zip", &["application/x-zip", "application/zip", "application/x-zip-compressed"]),
    ("mid", &["audio/midi"]),
    ("midi", &["audio/midi"]),
    ("mp2", &["audio/mpeg"]),
    ("mp3", &["audio/mpeg", "audio/mpg", "audio/mpeg3", "audio/mp3"]),
    ("aif", &["audio/x-aiff"]),
    ("aiff", &["audio/x-aiff"]),
    ("wav", &["audio/x-wav"]),
    ("bmp", &["image/bmp"]),
    ("gif", &["image/gif"]),
    ("ico", &["image/x-icon"]),
    ("jpg", &["image/jpeg", "image/pjpeg"]),
    ("jpeg", &["image/jpeg", "image/pjpeg"]),
    ("jpe", &["image/jpeg", "image/pjpeg"]),
    ("png", &["image/png"]),
    ("tiff", &["image/tiff"]),
    ("tif", &["image/tiff"]),
    ("svg", &["image/svg+xml"]),
    ("css", &["text/css"]),
    ("html", &["text/html"]),
    ("htm", &["text/html"]),
    ("shtml", &["text/html"]),
    ("txt", &["text/plain"]),
    ("text", &["text/plain"]),
    ("log", &["text/plain", "text/x-log"]),
    ("rtx", &["text/richtext"]),
    ("rtf", &["text/rtf"]),
    ("xml", &["text/xml"]),
    ("xsl", &["text/xml"]),
    ("mpeg", &["video/mpeg"]),
    ("mpg", &["video/mpeg"]),
    ("mpe", &["video/mpeg"]),
    ("qt", &["video/quicktime"]),
    ("mov", &["video/quicktime"]),
    ("avi", &["video/x-msvideo"]),
    ("movie", &["video/x-sgi-movie"]),
    ("doc", &["application/msword"]),
    ("docx", &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"]),
    ("xlsx", &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"]),
    ("word", &["application/msword", "application/octet-stream"]),
    ("xl", &["application/excel"]),
    ("eml", &["message/rfc822"]),
    ("json", &["application/json", "text/json"]),
    ("odt", &["application/vnd.oasis.opendocument.text"]),
    ("odc", &["application/vnd.oasis.opendocument.chart"]),
    ("odp", &["application/vnd.oasis.opendocument.presentation"]),
];

/// 文件分类表。顺序有意义：按表中顺序查找第一个包含扩展名的分类。
pub const FILE_TYPES: &[(&str, &[&str])] = &[
    ("image", &["jpeg", "jpg", "jpe", "gif", "png", "svg", "ico", "tif", "tiff", "bmp", "psd", "ai", "eps", "ps"]),
    ("document", &["txt", "text", "mdown", "md", "markdown", "pdf", "doc", "docx", "word", "xl", "xls", "xlsx", "ppt", "csv", "rtf", "rtx", "log", "odt", "odp", "odc"]),
    ("archive", &["zip", "tar", "gz", "gzip", "tgz"]),
    ("code", &["js", "css", "scss", "htm", "html", "shtml", "xhtml", "php", "php3", "php4", "rb", "xml", "json"]),
    ("video", &["mov", "movie", "avi", "ogg", "ogv", "webm", "flv", "swf", "mp4", "mv4", "mpg", "mpe"]),
    ("audio", &["mp3", "m4a", "wav", "aif", "aiff", "midi"]),
];

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> =
        STATUS_TABLE.iter().copied().collect();

    /// 文件扩展名到 MIME 类型列表的映射表，列表中第一个类型为首选。
    pub static ref MIMES: HashMap<&'static str, &'static [&'static str]> =
        MIME_TABLE.iter().copied().collect();
}

/// 按表中顺序返回全部已知扩展名。
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    MIME_TABLE.iter().map(|(ext, _)| *ext)
}

/// 按表中顺序遍历 MIME 映射。
pub fn mime_table() -> &'static [(&'static str, &'static [&'static str])] {
    MIME_TABLE
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    V1_0,
    V1_1,
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpRequestMethod {
    Get,
    Post,
    Head,
    Put,
    Patch,
    Delete,
}

impl HttpRequestMethod {
    /// 路由器可注册的全部方法，顺序即 `ALL` 展开后的顺序。
    pub const ALL: [HttpRequestMethod; 6] = [
        HttpRequestMethod::Get,
        HttpRequestMethod::Post,
        HttpRequestMethod::Head,
        HttpRequestMethod::Put,
        HttpRequestMethod::Patch,
        HttpRequestMethod::Delete,
    ];
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    Gzip,
    Deflate,
    Br,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "HTTP/1.0"),
            HttpVersion::V1_1 => write!(f, "HTTP/1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            HttpRequestMethod::Get => "GET",
            HttpRequestMethod::Post => "POST",
            HttpRequestMethod::Head => "HEAD",
            HttpRequestMethod::Put => "PUT",
            HttpRequestMethod::Patch => "PATCH",
            HttpRequestMethod::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for HttpRequestMethod {
    type Err = Exception;

    /// 方法名大小写不敏感。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpRequestMethod::Get),
            "POST" => Ok(HttpRequestMethod::Post),
            "HEAD" => Ok(HttpRequestMethod::Head),
            "PUT" => Ok(HttpRequestMethod::Put),
            "PATCH" => Ok(HttpRequestMethod::Patch),
            "DELETE" => Ok(HttpRequestMethod::Delete),
            other => Err(Exception::UnsupportedRequestMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}
