// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::io::Read;

use flate2::read::GzDecoder;
use serde_json::{json, Value};

use toolkit::header::{self, DownloadOptions};
use toolkit::param::HttpEncoding;
use toolkit::{Request, Response, RouteOptions, Router, UrlContext};

fn parse(raw: &str) -> Request {
    Request::try_from(raw.as_bytes(), 1).unwrap()
}

fn router() -> Router {
    let mut router = Router::new();
    router
        .register(
            "blog/(:num)/(:any?)",
            RouteOptions::new().action(|_, args| Response::json(&json!({ "args": args }))),
        )
        .unwrap();
    router
        .register(
            "comments",
            RouteOptions::new()
                .method("POST")
                .action(|request, _| Response::text(request.get_str("text").unwrap_or_default()).with_status(201)),
        )
        .unwrap();
    router
        .register(
            "admin",
            RouteOptions::new()
                .filter("auth")
                .action(|_, _| Response::text("secret")),
        )
        .unwrap();
    router.filter("auth", |_| false);
    router
}

fn body_json(response: &Response) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn test_get_dispatch_with_arguments() {
    let router = router();
    let request = parse("GET /blog/12/hello-world?preview=1 HTTP/1.1\r\nHost: example.com\r\n\r\n");
    let route = router.resolve(&request).unwrap();
    assert_eq!(route.arguments(), ["12".to_string(), "hello-world".to_string()]);
    assert_eq!(body_json(&route.call(&request))["args"], json!(["12", "hello-world"]));

    let request = parse("GET /blog/12 HTTP/1.1\r\nHost: example.com\r\n\r\n");
    assert_eq!(router.resolve(&request).unwrap().arguments(), ["12".to_string()]);

    let request = parse("GET /blog/abc HTTP/1.1\r\nHost: example.com\r\n\r\n");
    assert!(router.resolve(&request).is_none());
}

#[test]
fn test_post_body_reaches_action() {
    let router = router();
    let request = parse(
        "POST /comments HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 14\r\n\r\ntext=hi+there!",
    );
    assert_eq!(request.get_str("text"), Some("hi there!"));
    let response = router.resolve(&request).unwrap().call(&request);
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.body(), b"hi there!");

    // 同一路径的 GET 没有注册
    let request = parse("GET /comments HTTP/1.1\r\n\r\n");
    assert!(router.resolve(&request).is_none());
}

#[test]
fn test_filter_blocks_route() {
    let router = router();
    let request = parse("GET /admin HTTP/1.1\r\n\r\n");
    assert!(router.resolve(&request).is_none());
}

#[test]
fn test_prepare_compresses_and_handles_head() {
    let request = parse("GET / HTTP/1.0\r\nAccept-Encoding: gzip, br\r\n\r\n");
    let text = "hello ".repeat(200);
    let response = Response::text(&text).prepare(&request);
    assert_eq!(response.content_encoding(), Some(HttpEncoding::Gzip));

    let mut decoded = String::new();
    GzDecoder::new(response.body()).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, text);

    let bytes = String::from_utf8_lossy(&response.as_bytes()).to_string();
    assert!(bytes.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(bytes.contains("Content-Encoding: gzip\r\n"));

    let head = parse("HEAD / HTTP/1.1\r\n\r\n");
    let bytes = Response::text("body").prepare(&head).as_bytes();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Content-Length: 4\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn test_redirect_and_download_headers() {
    let response = Response::redirect("https://getkirby.com", 301);
    assert_eq!(response.status_code(), 301);
    assert_eq!(response.header("location"), Some("https://getkirby.com"));

    let options = DownloadOptions {
        name: "report.csv".to_string(),
        ..DownloadOptions::default()
    };
    let response = Response::download("a,b\n1,2\n", &options);
    assert!(response
        .header("content-disposition")
        .map_or(false, |v| v.contains("report.csv")));

    assert_eq!(header::status(404, None), "HTTP/1.0 404 Not Found");
}

#[test]
fn test_url_context_from_request() {
    let request = parse("GET /docs/page?x=1 HTTP/1.1\r\nHost: example.com\r\nReferer: http://example.com/start\r\n\r\n");
    let ctx = UrlContext::for_request(&request);
    assert_eq!(ctx.home(), "http://example.com");
    assert_eq!(ctx.current(), "http://example.com/docs/page?x=1");
    assert_eq!(ctx.to("about"), "http://example.com/about");
    assert_eq!(ctx.last(&request), Some("http://example.com/start"));
}

#[test]
fn test_malformed_requests() {
    assert!(Request::try_from(b"GARBAGE\r\n\r\n", 0).is_err());
    assert!(Request::try_from(b"BREW / HTTP/1.1\r\n\r\n", 0).is_err());
    assert!(Request::try_from(b"GET / HTTP/2.0\r\n\r\n", 0).is_err());
    assert!(Request::try_from(&[0xff, 0xfe, 0x00], 0).is_err());
}
