//! Insert Builder - 把记录快照渲染为单行 INSERT 语句

use crate::error::{Result, RowSqlError};
use crate::selection::InsertOptions;
use crate::snapshot::Snapshot;
use crate::traits::Record;
use crate::utils::{escape_identifier, escape_identifiers};
use crate::value::SqlValue;

/// Insert Builder - 支持 only / except / include_hidden 链式配置
///
/// 快照在构造时复制一份，之后不再变化；`to_query` 不修改任何状态，可重复调用。
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSql {
    table: String,
    snapshot: Snapshot,
    hidden: Vec<String>,
    options: InsertOptions,
}

/// 解析后的列和值，两者一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInsert<'a> {
    pub table: &'a str,
    pub columns: Vec<String>,
    pub values: Vec<&'a SqlValue>,
}

impl ResolvedInsert<'_> {
    /// 生成 SQL
    pub fn to_sql(&self) -> String {
        let values = self
            .values
            .iter()
            .map(|value| value.to_sql_literal())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            escape_identifier(self.table),
            escape_identifiers(self.columns.as_slice()),
            values
        )
    }
}

impl InsertSql {
    /// 创建 InsertSql
    ///
    /// 表名为空（或只有空白）、快照为空时返回 `InvalidInput`。
    pub fn from_record<S: AsRef<str>>(
        table: impl Into<String>,
        attributes: Snapshot,
        hidden: &[S],
    ) -> Result<Self> {
        let table = table.into();
        if table.trim().is_empty() {
            return Err(RowSqlError::InvalidInput(
                "table name must not be blank".to_string(),
            ));
        }
        if attributes.is_empty() {
            return Err(RowSqlError::InvalidInput(format!(
                "attribute snapshot for '{}' is empty",
                table
            )));
        }

        Ok(Self {
            table,
            snapshot: attributes,
            hidden: hidden.iter().map(|h| h.as_ref().to_string()).collect(),
            options: InsertOptions::default(),
        })
    }

    /// 从实现了 `Record` 的模型创建 InsertSql
    pub fn from_model<R: Record>(record: &R) -> Result<Self> {
        Self::from_record(R::TABLE, record.snapshot(), R::HIDDEN)
    }

    /// 只输出指定的列（按给定顺序）；空列表不做修改
    pub fn only<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.options = self.options.only(columns);
        tracing::trace!(table = %self.table, selection = ?self.options.selection, "only");
        self
    }

    /// 排除指定的列，基于全部列计算；空列表不做修改
    pub fn except<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.options = self.options.except(columns);
        tracing::trace!(table = %self.table, selection = ?self.options.selection, "except");
        self
    }

    /// 输出隐藏列
    pub fn include_hidden(mut self) -> Self {
        self.options = self.options.include_hidden();
        self
    }

    /// 一次性替换全部配置
    pub fn with_options(mut self, options: InsertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// 解析列和值
    pub fn resolve(&self) -> Result<ResolvedInsert<'_>> {
        resolve(&self.table, &self.snapshot, self.hidden.as_slice(), &self.options)
    }

    /// 生成 INSERT 语句
    pub fn to_query(&self) -> Result<String> {
        let resolved = self.resolve()?;
        let sql = resolved.to_sql();
        tracing::debug!(
            table = %self.table,
            columns = resolved.columns.len(),
            "rendered INSERT statement"
        );
        Ok(sql)
    }
}

/// 按配置渲染 INSERT 语句，不依赖任何 builder 状态
pub fn render<S: AsRef<str>>(
    table: &str,
    snapshot: &Snapshot,
    hidden: &[S],
    options: &InsertOptions,
) -> Result<String> {
    Ok(resolve(table, snapshot, hidden, options)?.to_sql())
}

fn resolve<'a, S: AsRef<str>>(
    table: &'a str,
    snapshot: &'a Snapshot,
    hidden: &[S],
    options: &InsertOptions,
) -> Result<ResolvedInsert<'a>> {
    // 确定要插入的字段列表
    let columns = options.resolve_columns(snapshot, hidden);
    if columns.is_empty() {
        return Err(RowSqlError::EmptySelection {
            table: table.to_string(),
        });
    }

    // 按列名取值，而不是按位置
    let values = columns
        .iter()
        .map(|column| {
            snapshot
                .get(column)
                .ok_or_else(|| RowSqlError::MissingAttribute {
                    column: column.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedInsert {
        table,
        columns,
        values,
    })
}
