// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 上下文转义模块
//!
//! 按输出位置（HTML 正文、属性、JavaScript、CSS、URL 参数）分别转义不可信数据，
//! 规则参照 OWASP XSS 防护清单。

use std::fmt::Write;

/// 空串与纯数字无需转义
fn no_need_to_escape(s: &str) -> bool {
    s.is_empty() || s.bytes().all(|b| b.is_ascii_digit())
}

/// HTML 中未定义的控制字符
fn is_undefined(c: char) -> bool {
    let code = c as u32;
    (code <= 0x1f && !matches!(c, '\t' | '\n' | '\r')) || (0x7f..=0x9f).contains(&code)
}

fn escape_with(s: &str, keep: impl Fn(char) -> bool, escape: impl Fn(char, &mut String)) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if keep(c) {
            out.push(c);
        } else {
            escape(c, &mut out);
        }
    }
    out
}

/// HTML 元素内容：转义 `& < > " '`。
pub fn html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// 普通 HTML 属性值
pub fn attr(s: &str) -> String {
    if no_need_to_escape(s) {
        return s.to_string();
    }
    escape_with(
        s,
        |c| c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '-' | '_'),
        |c, out| {
            if is_undefined(c) {
                out.push_str("&#xFFFD;");
                return;
            }
            let _ = match c {
                '"' => write!(out, "&quot;"),
                '&' => write!(out, "&amp;"),
                '<' => write!(out, "&lt;"),
                '>' => write!(out, "&gt;"),
                c if (c as u32) > 255 => write!(out, "&#x{:04X};", c as u32),
                c => write!(out, "&#x{:02X};", c as u32),
            };
        },
    )
}

/// JavaScript 字符串字面量或事件处理器属性
pub fn js(s: &str) -> String {
    if no_need_to_escape(s) {
        return s.to_string();
    }
    escape_with(
        s,
        |c| c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '_'),
        |c, out| {
            if c.is_ascii() {
                let _ = write!(out, "\\x{:02X}", c as u32);
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
        },
    )
}

/// CSS 属性值
pub fn css(s: &str) -> String {
    if no_need_to_escape(s) {
        return s.to_string();
    }
    escape_with(
        s,
        |c| c.is_ascii_alphanumeric(),
        |c, out| {
            let _ = write!(out, "\\{:X} ", c as u32);
        },
    )
}

/// URL 参数值，按 RFC 3986 百分号编码。
pub fn url(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html() {
        assert_eq!(
            html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_attr() {
        assert_eq!(attr(""), "");
        assert_eq!(attr("123"), "123");
        assert_eq!(attr("a-b_c.d,e"), "a-b_c.d,e");
        assert_eq!(attr("a b\"<>&"), "a&#x20;b&quot;&lt;&gt;&amp;");
        assert_eq!(attr("ü"), "&#xFC;");
        assert_eq!(attr("€"), "&#x20AC;");
        assert_eq!(attr("\u{1}"), "&#xFFFD;");
    }

    #[test]
    fn test_js() {
        assert_eq!(js("42"), "42");
        assert_eq!(js("alert('x')"), "alert\\x28\\x27x\\x27\\x29");
        assert_eq!(js("ü"), "\\u00FC");
        assert_eq!(js("😀"), "\\uD83D\\uDE00");
    }

    #[test]
    fn test_css() {
        assert_eq!(css("red"), "red");
        assert_eq!(css("a;b"), "a\\3B b");
        assert_eq!(css("ü"), "\\FC ");
    }

    #[test]
    fn test_url() {
        assert_eq!(url("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
        assert_eq!(url("safe-._~"), "safe-._~");
    }
}
