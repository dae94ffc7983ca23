// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTML 页面构建
//!
//! 为错误响应生成简单的 HTML 页面。

use log::warn;

use crate::escape;
use crate::param::STATUS_CODES;

pub struct HtmlBuilder {
    title: String,
    css: String,
    script: String,
    body: String,
}

impl HtmlBuilder {
    /// 状态码页面。`note` 为 `None` 时使用状态码的原因短语；
    /// 未知的状态码使用通用说明。
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let description = match note {
            Some(n) => n.to_string(),
            None => match STATUS_CODES.get(&code) {
                Some(d) => d.to_string(),
                None => {
                    warn!("未知的状态码：{}", code);
                    "Something went wrong".to_string()
                }
            },
        };
        let body = format!(
            r"
            <h1>{}</h1>
            <p>{}</p>
            ",
            code, description
        );
        Self::new(&code.to_string(), &body)
    }

    /// 标题会被转义，正文按原样插入。
    pub fn new(title: &str, body: &str) -> Self {
        let css = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }
            "
        .to_string();
        Self {
            title: escape::html(title),
            css,
            script: String::new(),
            body: body.to_string(),
        }
    }

    pub fn with_script(mut self, script: &str) -> Self {
        self.script = script.to_string();
        self
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
            <html>
                <head>
                    <meta charset="utf-8">
                    <script>{}</script>
                    <title>{}</title>
                    <style>{}</style>
                </head>
                <body>
                {}
                </body>
            </html>"##,
            self.script, self.title, self.css, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_builder_from_status_code() {
        let html = HtmlBuilder::from_status_code(404, Some("测试404")).build();
        assert!(html.contains("404"));
        assert!(html.contains("测试404"));
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn test_html_builder_from_status_code_no_note() {
        let html = HtmlBuilder::from_status_code(200, None).build();
        assert!(html.contains("200"));
        assert!(html.contains("OK"));
    }

    #[test]
    fn test_html_builder_unknown_status_code() {
        let html = HtmlBuilder::from_status_code(999, None).build();
        assert!(html.contains("999"));
        assert!(html.contains("Something went wrong"));
    }

    #[test]
    fn test_html_builder_escapes_title() {
        let html = HtmlBuilder::new("<b>", "<p>x</p>").with_script("var a = 1;").build();
        assert!(html.contains("<title>&lt;b&gt;</title>"));
        assert!(html.contains("<p>x</p>"));
        assert!(html.contains("<script>var a = 1;</script>"));
    }

    #[test]
    fn test_html_builder_structure() {
        let html = HtmlBuilder::from_status_code(404, Some("测试")).build();
        for tag in ["<html>", "</html>", "<head>", "</head>", "<body>", "</body>", "<title>", "<style>"] {
            assert!(html.contains(tag), "缺少{}", tag);
        }
        assert!(html.contains("charset=\"utf-8\""));
    }
}
