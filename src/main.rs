// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示服务器
//!
//! 基于 Tokio 运行时的多线程 HTTP 服务器，用来演示工具集的各个模块：
//! - 路由表分发动态请求（JSON 接口、验证、slug 生成）
//! - 未命中路由时回退到 `www_root` 下的静态文件，并使用 LRU 文件缓存
//! - 响应根据 `Accept-Encoding` 自动压缩
//! - 后台管理控制台（stop / status / help）

use log::{debug, error, info, warn};
use serde_json::{json, Map, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::{Component, Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

use toolkit::{
    file, strings,
    validator::{self, Rule},
    translation::Translations,
    visitor::Visitor,
    Config, Exception, FileCache, Request, Response, RouteOptions, Router, UrlContext,
};

const CONFIG_FILE: &str = "config/development.toml";
const LOG_CONFIG_FILE: &str = "config/log4rs.yaml";

fn main() {
    // 1. 日志系统：log4rs 通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
        return;
    }

    // 2. 配置加载：读取失败时使用默认值继续运行
    let config = match Config::from_toml(CONFIG_FILE) {
        Ok(config) => {
            info!("配置文件已载入");
            config
        }
        Err(e) => {
            warn!("{}，使用默认配置", e);
            Config::default()
        }
    };
    info!("www root: {}", config.www_root());

    // 3. 异步运行时：工作线程数来自配置
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads().max(1))
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            return;
        }
    };

    if let Err(e) = runtime.block_on(serve(config)) {
        error!("服务器异常退出：{}", e);
    }
}

async fn serve(config: Config) -> Result<(), Exception> {
    let cache = Arc::new(Mutex::new(FileCache::from_capacity(config.cache_size())?));
    let router = Arc::new(build_router(config.language())?);
    let config = Arc::new(config);

    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    let socket = SocketAddrV4::new(address, config.port());
    let listener = TcpListener::bind(socket).await.map_err(|e| {
        error!("无法绑定端口：{}，错误：{}", config.port(), e);
        e
    })?;
    info!("服务端在{}上监听Socket连接", socket);

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let active_connection = Arc::new(AtomicU32::new(0));
    tokio::spawn(console(Arc::clone(&shutdown_flag), Arc::clone(&active_connection)));

    let mut id: u128 = 0;
    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            info!("主循环接收到停机指令，正在退出...");
            break;
        }

        let (mut stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]TCP连接已建立：{}", id, addr);

        let active_connection = Arc::clone(&active_connection);
        let cache = Arc::clone(&cache);
        let config = Arc::clone(&config);
        let router = Arc::clone(&router);
        let remote = addr.ip().to_string();

        tokio::spawn(async move {
            active_connection.fetch_add(1, Ordering::SeqCst);
            handle_connection(&mut stream, id, &remote, &router, cache, config).await;
            active_connection.fetch_sub(1, Ordering::SeqCst);
        });

        id += 1;
    }
    Ok(())
}

/// 管理控制台：从标准输入读取指令。
async fn console(shutdown_flag: Arc<AtomicBool>, active_connection: Arc<AtomicU32>) {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut input = String::new();
    loop {
        input.clear();
        match reader.read_line(&mut input).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        match input.trim() {
            "stop" => {
                shutdown_flag.store(true, Ordering::SeqCst);
                println!("停机指令已激活，服务器将在处理完下一个请求后关闭...");
                break;
            }
            "status" => {
                println!("== toolkit {} ==", toolkit::VERSION);
                println!("当前活跃连接数: {}", active_connection.load(Ordering::SeqCst));
            }
            "help" => {
                println!("stop   - 发出停机信号");
                println!("status - 查看当前服务器运行状态");
                println!("help   - 显示此帮助信息");
            }
            cmd => println!("无效的命令：{}", cmd),
        }
    }
}

/// 演示路由表。`language` 是未能从请求中识别语言时的默认语言。
fn build_router(language: &str) -> Result<Router, Exception> {
    let mut router = Router::new();

    let mut translations = Translations::new();
    translations.set_many("en", [("greeting", "Hello"), ("unknown", "stranger")]);
    translations.set_many("de", [("greeting", "Hallo"), ("unknown", "Fremder")]);
    let default_language = language.to_string();

    router.register(
        "api/whoami",
        RouteOptions::new().attribute("name", "whoami").action(move |request, _| {
            let visitor = Visitor::new(request);
            let mut translations = translations.clone();
            let code = visitor
                .accepted_language_code()
                .unwrap_or_else(|| default_language.clone());
            translations.set_language(&code);
            if translations.get("greeting").is_none() {
                translations.set_language(&default_language);
            }
            let ctx = UrlContext::for_request(request);
            Response::json(&json!({
                "greeting": translations.get("greeting"),
                "ip": visitor.ip().or(translations.get("unknown")),
                "user_agent": visitor.user_agent(),
                "url": ctx.current(),
                "home": ctx.to("/"),
            }))
        }),
    )?;

    router.register(
        "api/hello/(:any)",
        RouteOptions::new().attribute("name", "hello").action(|_, args| {
            let name = args.first().map(String::as_str).unwrap_or("world");
            Response::json(&json!({ "hello": name, "version": toolkit::VERSION }))
        }),
    )?;

    router.register(
        "api/slug/(:all)",
        RouteOptions::new().attribute("name", "slug").action(|_, args| {
            let input = args.first().map(String::as_str).unwrap_or_default();
            let decoded = urlencoding::decode(input)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| input.to_string());
            Response::json(&json!({ "slug": strings::slug(&decoded, "-", "a-z0-9") }))
        }),
    )?;

    router.register(
        "api/signup",
        RouteOptions::new()
            .method("POST")
            .attribute("name", "signup")
            .action(|request, _| signup(request)),
    )?;

    Ok(router)
}

fn signup(request: &Request) -> Response {
    let data = Value::Object(request.data().clone());
    let rules = [
        ("email", vec![Rule::new("required"), Rule::new("email")]),
        (
            "name",
            vec![Rule::new("required"), Rule::with("min", vec![json!(2)])],
        ),
    ];
    let mut messages = Map::new();
    messages.insert("email".to_string(), json!(["Email is required", "Invalid email"]));

    match validator::invalid(&data, &rules, &messages) {
        Ok(errors) if errors.is_empty() => Response::json(&json!({ "status": "ok" })).with_status(201),
        Ok(errors) => Response::json(&json!({ "status": "error", "errors": errors })).with_status(400),
        Err(e) => {
            error!("[ID{}]验证失败：{}", request.id(), e);
            Response::response_500()
        }
    }
}

/// 处理单个 TCP 连接。
async fn handle_connection(
    stream: &mut TcpStream,
    id: u128,
    remote: &str,
    router: &Router,
    cache: Arc<Mutex<FileCache>>,
    config: Arc<Config>,
) {
    let mut buffer = vec![0; 4096];
    let size = match stream.read(&mut buffer).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
    };
    buffer.truncate(size);
    read_remaining_body(stream, &mut buffer, config.max_request_size(), id).await;
    debug!("[ID{}]HTTP请求接收完毕，共{}字节", id, buffer.len());

    let start_time = Instant::now();

    let request = match Request::try_from(&buffer, id) {
        Ok(request) => request.with_remote_addr(remote),
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            let bytes = Response::response_400().as_bytes();
            let _ = stream.write_all(&bytes).await;
            return;
        }
    };

    let response = match router.resolve(&request) {
        Some(route) => {
            debug!("[ID{}]命中路由{}", id, route.pattern());
            route.call(&request)
        }
        None => serve_static(&request, &cache, &config).await,
    };
    let response = response.prepare(&request);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    let bytes = response.as_bytes();
    if let Err(e) = stream.write_all(&bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

/// 按 `Content-Length` 继续读取尚未到达的请求体，总量不超过 `limit`。
async fn read_remaining_body(stream: &mut TcpStream, buffer: &mut Vec<u8>, limit: usize, id: u128) {
    let head_end = match buffer.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(pos) => pos + 4,
        None => return,
    };
    let expected = std::str::from_utf8(&buffer[..head_end])
        .ok()
        .and_then(|head| {
            head.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.trim().eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
        })
        .unwrap_or(0);
    let total = (head_end + expected).min(limit);

    let mut chunk = vec![0; 4096];
    while buffer.len() < total {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) => {
                warn!("[ID{}]读取请求体失败: {}", id, e);
                break;
            }
        }
    }
    buffer.truncate(total.max(head_end));
}

/// 静态文件回退：路径越权返回 400，文件不存在返回 404。
async fn serve_static(request: &Request, cache: &Mutex<FileCache>, config: &Config) -> Response {
    let id = request.id();
    let path = match locate(config.www_root(), request.path()).await {
        Ok(path) => path,
        Err(Exception::InvalidPath(p)) => {
            warn!("[ID{}]请求的路径：{} 包含非法字符，返回400", id, p);
            return Response::response_400();
        }
        Err(e) => {
            warn!("[ID{}]{}，返回404", id, e);
            return Response::response_404();
        }
    };

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("[ID{}]无法读取文件元数据：{}", id, e);
            return Response::response_500();
        }
    };
    let key = path.to_string_lossy().to_string();
    let modified = metadata.modified().ok();

    if let Some(modified) = modified {
        if let Ok(mut guard) = cache.lock() {
            if let Some(bytes) = guard.find(&key, modified) {
                debug!("[ID{}]缓存命中：{}", id, key);
                return file_response(&path, bytes.clone());
            }
        }
    }

    let content = match tokio::fs::read(&path).await {
        Ok(content) => bytes::Bytes::from(content),
        Err(e) => {
            error!("[ID{}]读取文件{}失败：{}", id, key, e);
            return Response::response_500();
        }
    };

    if let Some(modified) = modified {
        if FileCache::should_cache(metadata.len(), config.cache_threshold()) {
            if let Ok(mut guard) = cache.lock() {
                guard.push(&key, content.clone(), modified);
                debug!("[ID{}]已缓存：{}", id, key);
            }
        }
    }
    file_response(&path, content)
}

fn file_response(path: &Path, content: bytes::Bytes) -> Response {
    let mime = file::mime(path).unwrap_or_else(|| "application/octet-stream".to_string());
    Response::new().with_content_type(&mime).with_body(content)
}

/// 把请求路径映射到 `root` 下的文件，目录映射到其中的 `index.html`。
async fn locate(root: &str, request_path: &str) -> Result<PathBuf, Exception> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| Exception::InvalidPath(request_path.to_string()))?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(Exception::InvalidPath(request_path.to_string()));
    }

    let not_found = || Exception::FileNotFound(request_path.to_string());
    let mut path = Path::new(root).join(relative);
    let mut metadata = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
    if metadata.is_dir() {
        path = path.join("index.html");
        metadata = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
    }
    if !metadata.is_file() {
        return Err(not_found());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use toolkit::param::HttpRequestMethod;

    #[tokio::test]
    async fn test_locate_rejects_traversal() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        assert!(matches!(locate(root, "/../etc/passwd").await, Err(Exception::InvalidPath(_))));
        assert!(matches!(locate(root, "/%2e%2e/secret").await, Err(Exception::InvalidPath(_))));
        assert!(matches!(locate(root, "/missing.txt").await, Err(Exception::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_locate_index() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        assert!(matches!(locate(root, "/docs").await, Err(Exception::FileNotFound(_))));

        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        assert_eq!(locate(root, "/").await.unwrap(), dir.path().join("index.html"));
        std::fs::write(dir.path().join("docs/page.css"), "p {}").unwrap();
        assert_eq!(locate(root, "/docs/page.css").await.unwrap(), dir.path().join("docs/page.css"));
    }

    #[test]
    fn test_demo_routes() {
        let router = build_router("en").unwrap();
        let request = Request::new(HttpRequestMethod::Get, "/api/hello/kirby");
        let response = router.resolve(&request).unwrap().call(&request);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["hello"], "kirby");

        let request = Request::new(HttpRequestMethod::Get, "/api/whoami")
            .with_header("Accept-Language", "de-DE,de;q=0.9")
            .with_header("Host", "example.com");
        let response = router.resolve(&request).unwrap().call(&request);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["greeting"], "Hallo");
        assert_eq!(body["home"], "http://example.com");

        let request = Request::new(HttpRequestMethod::Post, "/api/signup?email=nope&name=a");
        let response = router.resolve(&request).unwrap().call(&request);
        assert_eq!(response.status_code(), 400);
    }
}
