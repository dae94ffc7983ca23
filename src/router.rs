// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模块
//!
//! 按请求方法分组保存路由，并按注册顺序线性匹配路径。
//!
//! 模式中可以使用通配符：
//! - `(:num)` 数字，`(:alpha)` 字母，`(:any)` URL 安全字符，`(:all)` 任意内容（包括 `/`）
//! - 在前面加 `/` 并在名称后加 `?` 表示可选段，例如 `blog/(:num?)`
//!
//! 每条路由的正则表达式在注册时编译一次。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use regex::Regex;

use crate::exception::Result;
use crate::param::HttpRequestMethod;
use crate::request::Request;
use crate::response::Response;
use crate::url;

/// 路由处理函数，接收请求与通配符捕获的参数。
pub type Action = Arc<dyn Fn(&Request, &[String]) -> Response + Send + Sync>;

/// 路由过滤器，返回 `false` 时拒绝匹配到的路由。
pub type Filter = Arc<dyn Fn(&Route) -> bool + Send + Sync>;

const WILDCARDS: &[(&str, &str)] = &[
    ("(:num)", "([0-9]+)"),
    ("(:alpha)", "([a-zA-Z]+)"),
    ("(:any)", r"([a-zA-Z0-9\.\-_%=]+)"),
    ("(:all)", "(.*)"),
];

const OPTIONAL_WILDCARDS: &[(&str, &str)] = &[
    ("/(:num?)", "(?:/([0-9]+)"),
    ("/(:alpha?)", "(?:/([a-zA-Z]+)"),
    ("/(:any?)", r"(?:/([a-zA-Z0-9\.\-_%=]+)"),
    ("/(:all?)", "(?:/(.*)"),
];

/// 把路由模式翻译为正则表达式（不含锚点）。
///
/// 可选通配符先被替换为不闭合的非捕获组，再按替换次数在末尾补上 `)?`。
pub fn wildcards(pattern: &str) -> String {
    let mut translated = pattern.to_string();
    let mut count = 0;
    for (search, replace) in OPTIONAL_WILDCARDS {
        count += translated.matches(search).count();
        translated = translated.replace(search, replace);
    }
    translated.push_str(&")?".repeat(count));
    for (search, replace) in WILDCARDS {
        translated = translated.replace(search, replace);
    }
    translated
}

/// 一条已注册的路由。
#[derive(Clone)]
pub struct Route {
    pattern: String,
    methods: Vec<HttpRequestMethod>,
    https: bool,
    ajax: bool,
    filters: Vec<String>,
    attributes: HashMap<String, String>,
    action: Option<Action>,
    arguments: Vec<String>,
    regex: Option<Regex>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("https", &self.https)
            .field("ajax", &self.ajax)
            .field("filters", &self.filters)
            .field("attributes", &self.attributes)
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl Route {
    /// 调用路由的处理函数；没有处理函数时返回 404 页面。
    pub fn call(&self, request: &Request) -> Response {
        match &self.action {
            Some(action) => action(request, &self.arguments),
            None => Response::from_status_code(404, None),
        }
    }

    /// 按字段名读取路由属性，`pattern` 为内置字段。
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "pattern" => Some(&self.pattern),
            _ => self.attributes.get(name).map(String::as_str),
        }
    }

    fn is_match(&self, path: &str) -> Option<Vec<String>> {
        if self.pattern == path {
            return Some(vec![]);
        }
        let captures = self.regex.as_ref()?.captures(path)?;
        let mut groups: Vec<Option<&str>> = captures.iter().skip(1).map(|m| m.map(|m| m.as_str())).collect();
        // 末尾未参与匹配的可选组不算参数
        while let Some(None) = groups.last() {
            groups.pop();
        }
        Some(
            groups
                .into_iter()
                .map(|g| g.unwrap_or_default().to_string())
                .collect(),
        )
    }
}

// --- Getter 访问器实现 ---
impl Route {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> &[HttpRequestMethod] {
        &self.methods
    }

    pub fn https(&self) -> bool {
        self.https
    }

    pub fn ajax(&self) -> bool {
        self.ajax
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// 最近一次匹配中捕获的参数
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// 注册路由时的选项。
#[derive(Clone)]
pub struct RouteOptions {
    method: String,
    https: bool,
    ajax: bool,
    filters: Vec<String>,
    attributes: HashMap<String, String>,
    action: Option<Action>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            https: false,
            ajax: false,
            filters: vec![],
            attributes: HashMap::new(),
            action: None,
        }
    }
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单个方法、`GET|POST` 形式的列表，或 `ALL`。
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn ajax(mut self, ajax: bool) -> Self {
        self.ajax = ajax;
        self
    }

    pub fn filter(mut self, name: &str) -> Self {
        self.filters.push(name.to_string());
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Request, &[String]) -> Response + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }
}

fn parse_methods(spec: &str) -> Result<Vec<HttpRequestMethod>> {
    if spec.trim().eq_ignore_ascii_case("ALL") {
        return Ok(HttpRequestMethod::ALL.to_vec());
    }
    spec.split('|')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| m.parse::<HttpRequestMethod>())
        .collect()
}

#[derive(Default)]
pub struct Router {
    routes: HashMap<HttpRequestMethod, Vec<Route>>,
    filters: HashMap<String, Filter>,
    route: Option<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一条路由。同一方法下已存在相同模式时，在原位置替换。
    pub fn register(&mut self, pattern: &str, options: RouteOptions) -> Result<Route> {
        let methods = parse_methods(&options.method)?;
        let regex = if pattern.contains('(') {
            Some(Regex::new(&format!("^{}$", wildcards(pattern)))?)
        } else {
            None
        };

        let route = Route {
            pattern: pattern.to_string(),
            methods: methods.clone(),
            https: options.https,
            ajax: options.ajax,
            filters: options.filters,
            attributes: options.attributes,
            action: options.action,
            arguments: vec![],
            regex,
        };

        for method in methods {
            let routes = self.routes.entry(method).or_default();
            match routes.iter_mut().find(|r| r.pattern == pattern) {
                Some(existing) => *existing = route.clone(),
                None => routes.push(route.clone()),
            }
        }
        debug!("注册路由：{} {:?}", pattern, route.methods);
        Ok(route)
    }

    /// 注册一个命名过滤器，同名过滤器会被替换。
    pub fn filter<F>(&mut self, name: &str, filter: F)
    where
        F: Fn(&Route) -> bool + Send + Sync + 'static,
    {
        self.filters.insert(name.to_string(), Arc::new(filter));
    }

    pub fn filters(&self) -> &HashMap<String, Filter> {
        &self.filters
    }

    /// 某个方法下按注册顺序排列的路由。
    pub fn routes(&self, method: HttpRequestMethod) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or_default()
    }

    /// 最近一次 `run` 匹配并通过过滤器的路由。
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn arguments(&self) -> Option<&[String]> {
        self.route.as_ref().map(Route::arguments)
    }

    /// 查找匹配的路由，不修改路由器状态。
    pub fn find(&self, method: HttpRequestMethod, path: &str, ajax: bool, https: bool) -> Option<Route> {
        let path = if path.is_empty() { "/" } else { path };

        let mut matched = None;
        for route in self.routes(method) {
            if route.https && !https {
                continue;
            }
            if route.ajax && !ajax {
                continue;
            }
            if let Some(arguments) = route.is_match(path) {
                let mut route = route.clone();
                route.arguments = arguments;
                matched = Some(route);
                break;
            }
        }

        let route = matched?;
        if self.apply_filters(&route) {
            Some(route)
        } else {
            debug!("路由{}被过滤器拒绝", route.pattern);
            None
        }
    }

    /// 匹配路由并记录结果，可通过 [`Router::route`] 与 [`Router::arguments`] 读取。
    pub fn run(&mut self, method: HttpRequestMethod, path: &str, ajax: bool, https: bool) -> Option<&Route> {
        self.route = self.find(method, path, ajax, https);
        self.route.as_ref()
    }

    /// 以请求路径（去掉参数段后的片段）进行匹配。
    pub fn dispatch(&mut self, request: &Request) -> Option<&Route> {
        let path = Self::request_path(request);
        self.run(request.method(), &path, request.ajax(), request.ssl())
    }

    /// [`Router::dispatch`] 的只读版本，供多个连接共享同一个路由器。
    pub fn resolve(&self, request: &Request) -> Option<Route> {
        let path = Self::request_path(request);
        self.find(request.method(), &path, request.ajax(), request.ssl())
    }

    fn request_path(request: &Request) -> String {
        url::fragments(request.path()).join("/")
    }

    /// 路由引用的第一个已注册过滤器决定结果；都未注册时放行。
    fn apply_filters(&self, route: &Route) -> bool {
        for name in &route.filters {
            if let Some(filter) = self.filters.get(name) {
                return filter(route);
            }
            warn!("路由{}引用了未注册的过滤器{}", route.pattern, name);
        }
        true
    }

    /// 按字段查找第一个路由（按方法顺序遍历）。
    pub fn find_route_by(&self, field: &str, value: &str) -> Option<&Route> {
        HttpRequestMethod::ALL
            .iter()
            .flat_map(|method| self.routes(*method))
            .find(|route| route.field(field) == Some(value))
    }
}
