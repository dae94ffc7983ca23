// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URL 工具模块
//!
//! 提供 URL 的拆解、重组与改写功能。路径中形如 `key:value` 的段被视为参数（params），
//! 其余段为片段（fragments）。例如 `http://example.com/blog/tag:rust?page=2#top`：
//! - fragments: `["blog"]`
//! - params: `[("tag", "rust")]`
//! - query: `[("page", "2")]`
//! - hash: `top`
//!
//! 所有函数都接收显式的 URL；“当前 URL”和主页地址保存在 [`UrlContext`] 中。

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use url::{form_urlencoded, Url};

use crate::request::Request;
use crate::strings;

lazy_static! {
    static ref FIXABLE_SCHEME: Regex = Regex::new(r"(?i)^(https|http|ftp)://").unwrap();
}

/// 相对路径在解析前会被挂到这个占位主机下。
const PLACEHOLDER_BASE: &str = "http://0.0.0.0/";

fn parse(url: &str) -> Option<Url> {
    Url::parse(url).ok()
}

fn parse_lenient(url: &str) -> Option<Url> {
    if is_absolute(url) {
        parse(url)
    } else {
        parse(&format!("{}{}", PLACEHOLDER_BASE, url.trim_start_matches('/')))
    }
}

pub fn scheme(url: &str) -> Option<String> {
    parse(url).map(|u| u.scheme().to_string())
}

pub fn host(url: &str) -> Option<String> {
    parse(url).and_then(|u| u.host_str().map(str::to_string))
}

/// 返回显式写出的端口（协议默认端口返回 `None`）。
pub fn port(url: &str) -> Option<u16> {
    parse(url).and_then(|u| u.port())
}

/// 返回去掉首尾 `/` 的路径；相对路径按绝对路径处理。
pub fn path(url: &str) -> String {
    parse_lenient(url)
        .map(|u| u.path().trim_matches('/').to_string())
        .unwrap_or_default()
}

/// 路径中的 `key:value` 参数。
pub fn params(url: &str) -> Vec<(String, String)> {
    path(url)
        .split('/')
        .filter_map(|part| part.split_once(':'))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 不含参数的路径段。
pub fn fragments(url: &str) -> Vec<String> {
    path(url)
        .split('/')
        .filter(|part| !part.is_empty() && !part.contains(':'))
        .map(str::to_string)
        .collect()
}

pub fn query(url: &str) -> Vec<(String, String)> {
    parse_lenient(url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

pub fn hash(url: &str) -> Option<String> {
    parse_lenient(url)
        .and_then(|u| u.fragment().map(str::to_string))
        .filter(|h| !h.is_empty())
}

pub fn has_query(url: &str) -> bool {
    parse_lenient(url)
        .and_then(|u| u.query().map(|q| !q.is_empty()))
        .unwrap_or(false)
}

/// URL 的各组成部分，用于 [`build`]。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub fragments: Vec<String>,
    pub params: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub hash: Option<String>,
}

impl UrlParts {
    /// 拆解一个绝对 URL；无法解析时返回 `None`。
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = parse(url)?;
        Some(Self {
            scheme: parsed.scheme().to_string(),
            host: parsed.host_str().unwrap_or_default().to_string(),
            port: parsed.port(),
            fragments: fragments(url),
            params: params(url),
            query: parsed.query_pairs().into_owned().collect(),
            hash: parsed.fragment().filter(|h| !h.is_empty()).map(str::to_string),
        })
    }

    pub fn build(&self) -> String {
        let mut result = vec![match self.port {
            Some(p) => format!("{}://{}:{}", self.scheme, self.host, p),
            None => format!("{}://{}", self.scheme, self.host),
        }];
        if !self.fragments.is_empty() {
            result.push(self.fragments.join("/"));
        }
        if !self.params.is_empty() {
            result.push(params_to_string(&self.params));
        }
        if !self.query.is_empty() {
            result.push(format!("?{}", query_to_string(&self.query)));
        }
        if let Some(h) = self.hash.as_ref().filter(|h| !h.is_empty()) {
            result.push(format!("#{}", h));
        }
        result.join("/")
    }
}

/// 以 `url` 为默认值，应用 `modify` 后重新组装。无法解析的 URL 原样返回。
pub fn build(url: &str, modify: impl FnOnce(&mut UrlParts)) -> String {
    match UrlParts::from_url(url) {
        Some(mut parts) => {
            modify(&mut parts);
            parts.build()
        }
        None => url.to_string(),
    }
}

pub fn query_to_string(query: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

pub fn params_to_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join("/")
}

pub fn strip_path(url: &str) -> String {
    build(url, |p| {
        p.fragments.clear();
        p.params.clear();
    })
}

pub fn strip_fragments(url: &str) -> String {
    build(url, |p| p.fragments.clear())
}

pub fn strip_params(url: &str) -> String {
    build(url, |p| p.params.clear())
}

pub fn strip_query(url: &str) -> String {
    build(url, |p| p.query.clear())
}

pub fn strip_hash(url: &str) -> String {
    build(url, |p| p.hash = None)
}

pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 把相对路径挂到 `home` 下，绝对 URL 原样返回。
pub fn make_absolute(path: &str, home: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return home.to_string();
    }
    if home == "/" {
        format!("/{}", path)
    } else {
        format!("{}/{}", home, path)
    }
}

/// 为缺少协议的 URL 补上 `http://`。
pub fn fix(url: &str) -> String {
    if FIXABLE_SCHEME.is_match(url) {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// `scheme://host`
pub fn base(url: &str) -> Option<String> {
    let parsed = parse(url)?;
    Some(format!("{}://{}", parsed.scheme(), parsed.host_str()?))
}

/// 去掉协议、开头的 `www.` 与末尾 `/`，再按 `length` 截断（0 表示不截断）。
pub fn short(url: &str, length: usize, base_only: bool, rep: &str) -> String {
    let mut url = if base_only {
        base(url).unwrap_or_else(|| url.to_string())
    } else {
        url.to_string()
    };
    for prefix in ["http://", "https://", "ftp://"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            url = rest.to_string();
            break;
        }
    }
    if let Some(rest) = url.strip_prefix("www.") {
        url = rest.to_string();
    }
    let url = url.trim_end_matches('/');
    strings::short(url, length, rep)
}

/// 以 `base` 为基准解析相对路径。
///
/// 以 `/` 开头的路径相对于主机根目录；其余路径替换基准 URL 的最后一个片段，
/// 除非基准路径以 `/` 结尾。基准中的参数、查询串和锚点都会被丢弃。
pub fn solve_relative(base_url: &str, relative: &str) -> String {
    if is_absolute(relative) {
        return relative.to_string();
    }
    let Some(parsed) = parse(base_url) else {
        return relative.to_string();
    };

    let mut segments = if relative.starts_with('/') {
        Vec::new()
    } else {
        let mut base_fragments = fragments(base_url);
        if !parsed.path().ends_with('/') {
            base_fragments.pop();
        }
        base_fragments
    };
    segments.extend(strings::split(relative, "/", 0));

    let parts = UrlParts {
        scheme: parsed.scheme().to_string(),
        host: parsed.host_str().unwrap_or_default().to_string(),
        port: parsed.port(),
        fragments: segments,
        ..UrlParts::default()
    };
    parts.build()
}

/// URL 生成器：把站内路径转换为完整链接。
pub type UrlGenerator = Arc<dyn Fn(&UrlContext, &str) -> String + Send + Sync>;

/// 保存主页地址、当前 URL 和可替换的 URL 生成器。
#[derive(Clone)]
pub struct UrlContext {
    home: String,
    current: Option<String>,
    generator: UrlGenerator,
}

impl fmt::Debug for UrlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlContext")
            .field("home", &self.home)
            .field("current", &self.current)
            .finish()
    }
}

impl Default for UrlContext {
    fn default() -> Self {
        Self::new("/")
    }
}

impl UrlContext {
    pub fn new(home: &str) -> Self {
        Self {
            home: home.to_string(),
            current: None,
            generator: Arc::new(|ctx: &UrlContext, path: &str| {
                if is_absolute(path) {
                    return path.to_string();
                }
                let path = path.trim_start_matches('/');
                if path.is_empty() {
                    return ctx.home().to_string();
                }
                format!("{}/{}", ctx.home().trim_end_matches('/'), path)
            }),
        }
    }

    /// 根据请求推算当前 URL 与主页地址。
    pub fn for_request(request: &Request) -> Self {
        let host = request.header("host").unwrap_or("localhost").to_string();
        let current = format!("{}://{}{}", request.scheme(), host, request.uri());
        let mut ctx = Self::new(&format!("{}://{}", request.scheme(), host));
        ctx.current = Some(current);
        ctx
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn set_home(&mut self, home: &str) {
        self.home = home.to_string();
    }

    pub fn current(&self) -> &str {
        self.current.as_deref().unwrap_or(&self.home)
    }

    pub fn set_current(&mut self, url: &str) {
        self.current = Some(url.to_string());
    }

    /// 当前 URL 所在的“目录”。
    pub fn current_dir(&self) -> String {
        let current = self.current();
        match current.rsplit_once('/') {
            Some((dir, _)) if !dir.ends_with(':') && !dir.ends_with('/') => dir.to_string(),
            _ => current.to_string(),
        }
    }

    /// 替换 URL 生成器。
    pub fn set_generator(&mut self, generator: UrlGenerator) {
        self.generator = generator;
    }

    /// 通过当前生成器生成链接。
    pub fn to(&self, path: &str) -> String {
        (self.generator)(self, path)
    }

    pub fn make_absolute(&self, path: &str) -> String {
        make_absolute(path, &self.home)
    }

    /// 用户来的上一个页面。
    pub fn last<'a>(&self, request: &'a Request) -> Option<&'a str> {
        request.referer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let url = "http://getkirby.com/docs/tag:rust/page:2?search=some&x=1#top";
        assert_eq!(scheme(url).as_deref(), Some("http"));
        assert_eq!(host(url).as_deref(), Some("getkirby.com"));
        assert_eq!(port(url), None);
        assert_eq!(path(url), "docs/tag:rust/page:2");
        assert_eq!(fragments(url), vec!["docs"]);
        assert_eq!(
            params(url),
            vec![("tag".to_string(), "rust".to_string()), ("page".to_string(), "2".to_string())]
        );
        assert_eq!(query(url).len(), 2);
        assert_eq!(hash(url).as_deref(), Some("top"));
        assert_eq!(port("http://localhost:8080/a"), Some(8080));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(path("some/path/"), "some/path");
        assert_eq!(fragments("/a/b:c/d"), vec!["a", "d"]);
        assert!(fragments("http://getkirby.com").is_empty());
        assert_eq!(hash("docs/page?x=1#intro").as_deref(), Some("intro"));
        assert_eq!(hash("/docs/page"), None);
    }

    #[test]
    fn test_has_query() {
        assert!(has_query("http://getkirby.com/?search=some"));
        assert!(!has_query("http://getkirby.com/docs/support"));
    }

    #[test]
    fn test_strip() {
        assert_eq!(
            strip_query("http://www.youtube.com/watch?v=9q_aXttJduk"),
            "http://www.youtube.com/watch"
        );
        assert_eq!(strip_hash("http://testurl.com/#somehash"), "http://testurl.com");
        assert_eq!(
            strip_params("http://example.com/blog/tag:rust"),
            "http://example.com/blog"
        );
        assert_eq!(
            strip_path("http://example.com/blog/tag:rust?a=b"),
            "http://example.com/?a=b"
        );
    }

    #[test]
    fn test_short() {
        assert_eq!(short("http://no-www.org", 0, false, "…"), "no-www.org");
        assert_eq!(short("https://www.example.com/", 0, false, "…"), "example.com");
        assert_eq!(short("http://veryveryverylongurl.com/a/b", 0, true, "…"), "veryveryverylongurl.com");
        assert_eq!(short("http://veryveryverylongurl.com", 8, false, "…"), "veryvery…");
    }

    #[test]
    fn test_solve_relative() {
        assert_eq!(solve_relative("http://getkirby.com", "/"), "http://getkirby.com");
        assert_eq!(
            solve_relative("http://getkirby.com", "http://someothersite.com"),
            "http://someothersite.com"
        );
        assert_eq!(
            solve_relative("http://getkirby.com", "/a/root/path"),
            "http://getkirby.com/a/root/path"
        );
        assert_eq!(solve_relative("http://getkirby.com/page-a", "page-b"), "http://getkirby.com/page-b");
        assert_eq!(
            solve_relative("http://getkirby.com/parent/", "child"),
            "http://getkirby.com/parent/child"
        );
        assert_eq!(
            solve_relative("https://getkirby.com/page/parent-a", "parent-b/subpage"),
            "https://getkirby.com/page/parent-b/subpage"
        );
        assert_eq!(solve_relative("http://getkirby.com/?query=weird", "page"), "http://getkirby.com/page");
        assert_eq!(solve_relative("http://getkirby.com/#hash", "page"), "http://getkirby.com/page");
        assert_eq!(solve_relative("http://getkirby.com/param:kirby", "page"), "http://getkirby.com/page");
    }

    #[test]
    fn test_make_absolute_and_fix() {
        assert_eq!(make_absolute("/blog", "/"), "/blog");
        assert_eq!(make_absolute("blog", "http://example.com"), "http://example.com/blog");
        assert_eq!(make_absolute("", "http://example.com"), "http://example.com");
        assert_eq!(make_absolute("https://x.org", "/"), "https://x.org");
        assert_eq!(fix("example.com"), "http://example.com");
        assert_eq!(fix("FTP://example.com"), "FTP://example.com");
        assert_eq!(base("https://example.com/a/b?c").as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_context_generator() {
        let mut ctx = UrlContext::new("http://example.com");
        assert_eq!(ctx.to("/blog"), "http://example.com/blog");
        assert_eq!(ctx.to(""), "http://example.com");
        assert_eq!(ctx.to("https://other.org"), "https://other.org");

        ctx.set_generator(Arc::new(|_, path| format!("/en/{}", path.trim_start_matches('/'))));
        assert_eq!(ctx.to("/blog"), "/en/blog");

        ctx.set_current("http://example.com/blog/article");
        assert_eq!(ctx.current_dir(), "http://example.com/blog");
    }
}
