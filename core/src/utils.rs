//! 工具函数模块

/// 时间类型输出格式：`YYYY-MM-DD HH:MM:SS`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 转义 SQL 标识符（反引号包裹，内部反引号双写）
pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// 逐个转义标识符后用 `, ` 连接
pub fn escape_identifiers<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| escape_identifier(name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 反斜杠转义字符串中的 `\`、`"`、`'`、NUL 以及换行、回车、制表符和 `\x1a`
///
/// 只是简单的 C 风格转义，不是安全级别的 SQL 过滤。输出不含换行。
pub fn add_slashes(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' | '"' | '\'' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x1a' => escaped.push_str("\\Z"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 双引号包裹的字符串字面量
pub fn quote_string(value: &str) -> String {
    format!("\"{}\"", add_slashes(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("users"), "`users`");
        assert_eq!(escape_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_escape_identifiers_joins_each_name() {
        assert_eq!(
            escape_identifiers(&["id", "name", "email"]),
            "`id`, `name`, `email`"
        );
        assert_eq!(escape_identifiers::<&str>(&[]), "");
    }

    #[test]
    fn test_escape_identifiers_name_containing_separator() {
        // 每个名字单独包裹，名字里带 ", " 也不会被拆开
        assert_eq!(escape_identifiers(&["a, b"]), "`a, b`");
    }

    #[test]
    fn test_add_slashes() {
        assert_eq!(add_slashes("plain"), "plain");
        assert_eq!(add_slashes(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(add_slashes("O'Reilly"), r"O\'Reilly");
        assert_eq!(add_slashes(r"C:\temp"), r"C:\\temp");
        assert_eq!(add_slashes("a\0b"), r"a\0b");
    }

    #[test]
    fn test_add_slashes_control_characters() {
        assert_eq!(add_slashes("line one\nline two\r\n"), r"line one\nline two\r\n");
        assert_eq!(add_slashes("a\tb"), r"a\tb");
        assert_eq!(add_slashes("eof\x1a"), r"eof\Z");
        assert!(!add_slashes("\r\n\n").contains(['\n', '\r']));
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("John Doe"), "\"John Doe\"");
        assert_eq!(quote_string(""), "\"\"");
    }
}
