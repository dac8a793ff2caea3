//! 列选择策略
//!
//! `only` / `except` 互相覆盖，而不是叠加：最后一次调用生效，所以用单个枚举保存。

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// 列选择
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "columns")]
pub enum Selection {
    /// 所有列（默认）
    #[default]
    All,
    /// 只包含指定列，按给定顺序
    Only(Vec<String>),
    /// 全部列减去指定列，保持原始顺序
    Except(Vec<String>),
}

/// 生成 INSERT 时的配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertOptions {
    pub selection: Selection,
    /// 是否输出隐藏列
    pub include_hidden: bool,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定要输出的列；空列表不做任何修改
    pub fn only<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        if !columns.is_empty() {
            self.selection = Selection::Only(to_owned_names(columns));
        }
        self
    }

    /// 排除指定的列；空列表不做任何修改
    pub fn except<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        if !columns.is_empty() {
            self.selection = Selection::Except(to_owned_names(columns));
        }
        self
    }

    pub fn include_hidden(mut self) -> Self {
        self.include_hidden = true;
        self
    }

    /// 解析最终要输出的列名
    ///
    /// - `All` / `Except`：基于快照的全部列，原始顺序；未开启 `include_hidden` 时去掉隐藏列
    /// - `Only`：显式指定的列总是输出，不受隐藏列影响
    ///
    /// 结果去重，保留第一次出现的位置。`Only` 中不存在于快照的列会原样保留，
    /// 由渲染阶段报告 `MissingAttribute`。
    pub fn resolve_columns<H: AsRef<str>>(&self, snapshot: &Snapshot, hidden: &[H]) -> Vec<String> {
        let is_hidden = |name: &str| {
            !self.include_hidden && hidden.iter().any(|h| h.as_ref() == name)
        };

        let candidates: Vec<&str> = match &self.selection {
            Selection::All => snapshot.keys().filter(|name| !is_hidden(*name)).collect(),
            Selection::Except(excluded) => snapshot
                .keys()
                .filter(|name| !excluded.iter().any(|e| e.as_str() == *name))
                .filter(|name| !is_hidden(*name))
                .collect(),
            Selection::Only(columns) => columns.iter().map(String::as_str).collect(),
        };

        let mut resolved: Vec<String> = Vec::with_capacity(candidates.len());
        for name in candidates {
            if !resolved.iter().any(|r| r.as_str() == name) {
                resolved.push(name.to_string());
            }
        }
        resolved
    }
}

fn to_owned_names<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_snapshot() -> Snapshot {
        Snapshot::new()
            .with("id", 1i64)
            .with("name", "John Doe")
            .with("email", "john@example.com")
            .with("password", "secret")
            .with("email_verified_at", None::<String>)
    }

    const HIDDEN: &[&str] = &["password"];

    #[test]
    fn test_all_excludes_hidden_by_default() {
        let columns = InsertOptions::new().resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["id", "name", "email", "email_verified_at"]);
    }

    #[test]
    fn test_all_with_include_hidden() {
        let columns = InsertOptions::new()
            .include_hidden()
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(
            columns,
            vec!["id", "name", "email", "password", "email_verified_at"]
        );
    }

    #[test]
    fn test_only_keeps_given_order() {
        let columns = InsertOptions::new()
            .only(&["email", "id"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["email", "id"]);
    }

    #[test]
    fn test_only_bypasses_hidden() {
        let columns = InsertOptions::new()
            .only(&["name", "password"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["name", "password"]);
    }

    #[test]
    fn test_only_deduplicates() {
        let columns = InsertOptions::new()
            .only(&["name", "id", "name"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["name", "id"]);
    }

    #[test]
    fn test_except_respects_hidden() {
        let columns = InsertOptions::new()
            .except(&["email"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["id", "name", "email_verified_at"]);
    }

    #[test]
    fn test_only_then_except_overwrites() {
        let options = InsertOptions::new().only(&["id", "name"]).except(&["id"]);
        assert_eq!(options.selection, Selection::Except(vec!["id".to_string()]));
        let columns = options.resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["name", "email", "email_verified_at"]);
    }

    #[test]
    fn test_except_then_only_overwrites() {
        let columns = InsertOptions::new()
            .except(&["id"])
            .only(&["id"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert_eq!(columns, vec!["id"]);
    }

    #[test]
    fn test_empty_filters_are_noop() {
        let empty: [&str; 0] = [];
        let options = InsertOptions::new().only(&["id"]).only(&empty).except(&empty);
        assert_eq!(options.selection, Selection::Only(vec!["id".to_string()]));
        assert_eq!(InsertOptions::new().except(&empty).selection, Selection::All);
    }

    #[test]
    fn test_except_everything_is_empty() {
        let columns = InsertOptions::new()
            .except(&["id", "name", "email", "email_verified_at"])
            .resolve_columns(&users_snapshot(), HIDDEN);
        assert!(columns.is_empty());
    }

    #[test]
    fn test_options_deserialize() {
        let options: InsertOptions = serde_json::from_str(
            r#"{"selection": {"mode": "except", "columns": ["password"]}, "include_hidden": true}"#,
        )
        .unwrap();
        assert_eq!(
            options,
            InsertOptions {
                selection: Selection::Except(vec!["password".to_string()]),
                include_hidden: true,
            }
        );

        let defaults: InsertOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, InsertOptions::default());
    }
}
