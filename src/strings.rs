// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 字符串工具模块
//!
//! 工具集中其他模块共用的字符串辅助函数：拆分、`{key}` 模板替换、
//! slug 生成、截断等。所有长度均以 Unicode 字符计算，而不是字节。

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

/// `slug` 默认允许的字符集合（正则字符类的内容）。
pub const SLUG_ALLOWED: &str = "a-z0-9";

lazy_static! {
    static ref TEMPLATE_TOKEN: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();
    static ref DEFAULT_SLUG_CLASS: Regex = Regex::new("[^a-z0-9]").unwrap();
}

const TRANSLITERATION: &[(char, &str)] = &[
    ('ä', "ae"), ('ö', "oe"), ('ü', "ue"), ('Ä', "Ae"), ('Ö', "Oe"), ('Ü', "Ue"),
    ('ß', "ss"), ('æ', "ae"), ('Æ', "Ae"), ('œ', "oe"), ('Œ', "Oe"),
    ('à', "a"), ('á', "a"), ('â', "a"), ('ã', "a"), ('å', "a"),
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Å', "A"),
    ('ç', "c"), ('Ç', "C"),
    ('è', "e"), ('é', "e"), ('ê', "e"), ('ë', "e"),
    ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"),
    ('ì', "i"), ('í', "i"), ('î', "i"), ('ï', "i"),
    ('Ì', "I"), ('Í', "I"), ('Î', "I"), ('Ï', "I"),
    ('ñ', "n"), ('Ñ', "N"),
    ('ò', "o"), ('ó', "o"), ('ô', "o"), ('õ', "o"), ('ø', "o"),
    ('Ò', "O"), ('Ó', "O"), ('Ô', "O"), ('Õ', "O"), ('Ø', "O"),
    ('ù', "u"), ('ú', "u"), ('û', "u"), ('Ù', "U"), ('Ú', "U"), ('Û', "U"),
    ('ý', "y"), ('ÿ', "y"), ('Ý', "Y"),
];

/// 按分隔符拆分字符串，去除每段首尾空白，并丢弃空段和长度小于 `min_len` 的段。
pub fn split(s: &str, separator: &str, min_len: usize) -> Vec<String> {
    s.split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty() && length(part) >= min_len)
        .map(str::to_string)
        .collect()
}

/// 将 `{key}` 形式的占位符替换为 `data` 中对应的值，未知占位符保持原样。
pub fn template<K, V>(s: &str, data: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let data: Vec<(K, V)> = data.into_iter().collect();
    TEMPLATE_TOKEN
        .replace_all(s, |caps: &regex::Captures| {
            let key = &caps[1];
            data.iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v.as_ref().to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// 把常见的带音调拉丁字符转换为 ASCII 近似写法。
pub fn ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match TRANSLITERATION.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// 生成 URL 友好的 slug。
///
/// `allowed` 是正则字符类的内容（例如 `a-z0-9@._-`），不在其中的连续字符会被替换为
/// 一个 `separator`，首尾的分隔符会被去除。
pub fn slug(s: &str, separator: &str, allowed: &str) -> String {
    let lowered = ascii(s.trim()).to_lowercase();

    let replaced = match Regex::new(&format!("[^{}]", allowed)) {
        Ok(re) => re.replace_all(&lowered, separator).into_owned(),
        Err(e) => {
            warn!("slug字符集{}无效：{}，改用默认字符集", allowed, e);
            DEFAULT_SLUG_CLASS.replace_all(&lowered, separator).into_owned()
        }
    };

    if separator.is_empty() {
        return replaced;
    }

    let doubled = format!("{}{}", separator, separator);
    let mut collapsed = replaced;
    while collapsed.contains(&doubled) {
        collapsed = collapsed.replace(&doubled, separator);
    }

    let mut trimmed = collapsed.as_str();
    while let Some(rest) = trimmed.strip_prefix(separator) {
        trimmed = rest;
    }
    while let Some(rest) = trimmed.strip_suffix(separator) {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// 截断到 `length` 个字符，并在被截断时追加 `rep`。`length == 0` 时原样返回。
pub fn short(s: &str, length: usize, rep: &str) -> String {
    if length == 0 || self::length(s) <= length {
        return s.to_string();
    }
    let mut out: String = s.chars().take(length).collect();
    out.push_str(rep);
    out
}

/// 首字母大写。
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

pub fn upper(s: &str) -> String {
    s.to_uppercase()
}

/// 字符数
pub fn length(s: &str) -> usize {
    s.chars().count()
}

/// 按字符截取子串；`start` 为负数时从末尾倒数。
pub fn substr(s: &str, start: isize, len: Option<usize>) -> String {
    let total = length(s) as isize;
    let begin = if start < 0 {
        (total + start).max(0)
    } else {
        start.min(total)
    } as usize;
    let iter = s.chars().skip(begin);
    match len {
        Some(n) => iter.take(n).collect(),
        None => iter.collect(),
    }
}

pub fn starts_with(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

/// 判断是否包含子串，`insensitive` 为真时忽略大小写。
pub fn contains(s: &str, needle: &str, insensitive: bool) -> bool {
    if insensitive {
        s.to_lowercase().contains(&needle.to_lowercase())
    } else {
        s.contains(needle)
    }
}

/// 去除反斜杠转义：`\'` → `'`，`\\` → `\`。
pub fn stripslashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split() {
        assert_eq!(split("a, b,, c ", ",", 0), vec!["a", "b", "c"]);
        assert_eq!(split("GET|POST", "|", 0), vec!["GET", "POST"]);
        assert_eq!(split("a|bb|ccc", "|", 2), vec!["bb", "ccc"]);
    }

    #[test]
    fn test_template() {
        let out = template("Hello {name}, {missing}!", [("name", "Homer")]);
        assert_eq!(out, "Hello Homer, {missing}!");
        let out = template("{column.name} TEXT", [("column.name", "title")]);
        assert_eq!(out, "title TEXT");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Über genious", "-", SLUG_ALLOWED), "ueber-genious");
        assert_eq!(slug("  --Hello   World!!-- ", "-", SLUG_ALLOWED), "hello-world");
        assert_eq!(slug("my image@2x.JPG", "-", "a-z0-9@._-"), "my-image@2x.jpg");
    }

    #[test]
    fn test_short() {
        assert_eq!(short("veryveryverylongurl.com", 8, "…"), "veryvery…");
        assert_eq!(short("short", 10, "…"), "short");
        assert_eq!(short("short", 0, "…"), "short");
    }

    #[test]
    fn test_misc() {
        assert_eq!(ucfirst("title"), "Title");
        assert_eq!(substr("en.user.name", 3, None), "user.name");
        assert_eq!(substr("abcdef", -2, None), "ef");
        assert_eq!(substr("abcdef", 1, Some(2)), "bc");
        assert_eq!(stripslashes(r"it\'s a \\ test"), r"it's a \ test");
        assert!(contains("Hello World", "world", true));
        assert!(!contains("Hello World", "world", false));
    }

    proptest! {
        #[test]
        fn slug_only_contains_allowed_chars(input in ".{0,40}") {
            let out = slug(&input, "-", SLUG_ALLOWED);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!out.starts_with('-') && !out.ends_with('-'));
            prop_assert!(!out.contains("--"));
        }

        #[test]
        fn short_never_exceeds_length(input in ".{0,40}", len in 1usize..20) {
            let out = short(&input, len, "");
            prop_assert!(length(&out) <= len);
        }
    }
}
