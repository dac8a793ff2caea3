use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rowsql::{Snapshot, SqlValue};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::types::{BigDecimal, JsonValue, Uuid};
use sqlx::{Column, MySql, Pool, Postgres, Row, Sqlite, TypeInfo, ValueRef};

/// 数据库驱动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    MySql,
    Postgres,
    Sqlite,
}

impl DbDriver {
    /// 从数据库 URL 推断驱动类型
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(Self::MySql)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            anyhow::bail!("Unsupported database URL. Supported: mysql://, postgres://, sqlite://")
        }
    }

    /// 转义 SQL 标识符（内部的引号字符双写）
    fn quote(&self, name: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", name.replace('`', "``")),
            Self::Postgres | Self::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::MySql | Self::Sqlite => "?",
            Self::Postgres => "$1",
        }
    }

    /// 生成读取单行的 SELECT
    ///
    /// 有主键值时按主键查询，否则取主键最小的一行。
    pub fn select_one_sql(&self, table: &str, pk: &str, by_id: bool) -> String {
        let table = self.quote(table);
        let pk = self.quote(pk);
        if by_id {
            format!(
                "SELECT * FROM {} WHERE {} = {} LIMIT 1",
                table,
                pk,
                self.placeholder()
            )
        } else {
            format!("SELECT * FROM {} ORDER BY {} LIMIT 1", table, pk)
        }
    }
}

/// 命令行传入的主键值：能解析为整数时按整数绑定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValue {
    Int(i64),
    Text(String),
}

impl IdValue {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(i) => Self::Int(i),
            Err(_) => Self::Text(raw.to_string()),
        }
    }
}

/// 数据库连接池（枚举类型以支持不同数据库）
pub enum DbPool {
    MySql(Pool<MySql>),
    Postgres(Pool<Postgres>),
    Sqlite(Pool<Sqlite>),
}

impl DbPool {
    /// 连接到数据库
    pub async fn connect(url: &str) -> Result<Self> {
        let driver = DbDriver::from_url(url)?;

        match driver {
            DbDriver::MySql => {
                let pool = sqlx::MySqlPool::connect(url)
                    .await
                    .context("Failed to connect to MySQL database")?;
                Ok(Self::MySql(pool))
            }
            DbDriver::Postgres => {
                let pool = sqlx::PgPool::connect(url)
                    .await
                    .context("Failed to connect to PostgreSQL database")?;
                Ok(Self::Postgres(pool))
            }
            DbDriver::Sqlite => {
                let pool = sqlx::SqlitePool::connect(url)
                    .await
                    .context("Failed to connect to SQLite database")?;
                Ok(Self::Sqlite(pool))
            }
        }
    }

    /// 获取驱动类型
    pub fn driver(&self) -> DbDriver {
        match self {
            Self::MySql(_) => DbDriver::MySql,
            Self::Postgres(_) => DbDriver::Postgres,
            Self::Sqlite(_) => DbDriver::Sqlite,
        }
    }

    /// 获取所有表名
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        match self {
            Self::MySql(pool) => {
                let tables = sqlx::query_scalar::<_, String>(
                    "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'"
                )
                .fetch_all(pool)
                .await
                .context("Failed to query MySQL tables")?;
                Ok(tables)
            }
            Self::Postgres(pool) => {
                let tables = sqlx::query_scalar::<_, String>(
                    "SELECT tablename FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename"
                )
                .fetch_all(pool)
                .await
                .context("Failed to query PostgreSQL tables")?;
                Ok(tables)
            }
            Self::Sqlite(pool) => {
                let tables = sqlx::query_scalar::<_, String>(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
                )
                .fetch_all(pool)
                .await
                .context("Failed to query SQLite tables")?;
                Ok(tables)
            }
        }
    }

    /// 读取一行并转换为快照，找不到时返回 None
    ///
    /// `table` 和 `pk` 会直接拼进 SQL，调用方需先校验。
    pub async fn fetch_snapshot(
        &self,
        table: &str,
        pk: &str,
        id: Option<&IdValue>,
    ) -> Result<Option<Snapshot>> {
        let sql = self.driver().select_one_sql(table, pk, id.is_some());
        tracing::debug!(sql = %sql, "fetching row");

        match self {
            Self::MySql(pool) => {
                let mut query = sqlx::query(&sql);
                query = match id {
                    Some(IdValue::Int(i)) => query.bind(*i),
                    Some(IdValue::Text(s)) => query.bind(s.clone()),
                    None => query,
                };
                let row = query
                    .fetch_optional(pool)
                    .await
                    .with_context(|| format!("Failed to query MySQL table '{}'", table))?;
                row.map(|row| mysql_snapshot(&row)).transpose()
            }
            Self::Postgres(pool) => {
                let mut query = sqlx::query(&sql);
                query = match id {
                    Some(IdValue::Int(i)) => query.bind(*i),
                    Some(IdValue::Text(s)) => query.bind(s.clone()),
                    None => query,
                };
                let row = query
                    .fetch_optional(pool)
                    .await
                    .with_context(|| format!("Failed to query PostgreSQL table '{}'", table))?;
                row.map(|row| postgres_snapshot(&row)).transpose()
            }
            Self::Sqlite(pool) => {
                let mut query = sqlx::query(&sql);
                query = match id {
                    Some(IdValue::Int(i)) => query.bind(*i),
                    Some(IdValue::Text(s)) => query.bind(s.clone()),
                    None => query,
                };
                let row = query
                    .fetch_optional(pool)
                    .await
                    .with_context(|| format!("Failed to query SQLite table '{}'", table))?;
                row.map(|row| sqlite_snapshot(&row)).transpose()
            }
        }
    }
}

/// 二进制数据输出为十六进制字面量
fn hex_literal(bytes: &[u8]) -> SqlValue {
    let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    SqlValue::opaque(format!("X'{}'", hex))
}

/// 兜底按文本解码；无法解码为文本的类型返回 None，由调用方跳过该列
fn text_or_none(decoded: sqlx::Result<String>) -> Option<SqlValue> {
    decoded.ok().map(SqlValue::from)
}

fn skip_column(name: &str, type_name: &str) {
    tracing::warn!(
        "⚠️  Skipping column '{}': type {} cannot be decoded as text",
        name,
        type_name
    );
}

fn mysql_snapshot(row: &MySqlRow) -> Result<Snapshot> {
    let mut snapshot = Snapshot::with_capacity(row.columns().len());
    for column in row.columns() {
        let type_name = column.type_info().name().to_uppercase();
        let value = decode_mysql(row, column.ordinal(), &type_name).with_context(|| {
            format!("Failed to decode column '{}' ({})", column.name(), type_name)
        })?;
        match value {
            Some(value) => snapshot.insert(column.name(), value),
            None => skip_column(column.name(), &type_name),
        }
    }
    Ok(snapshot)
}

fn decode_mysql(row: &MySqlRow, index: usize, type_name: &str) -> Result<Option<SqlValue>> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Some(SqlValue::Null));
    }

    let value = match type_name {
        "BOOLEAN" => SqlValue::from(row.try_get::<bool, _>(index)?),
        t if t.ends_with("UNSIGNED") => SqlValue::from(row.try_get::<u64, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            SqlValue::from(row.try_get::<i64, _>(index)?)
        }
        "FLOAT" => SqlValue::from(row.try_get::<f32, _>(index)?),
        "DOUBLE" => SqlValue::from(row.try_get::<f64, _>(index)?),
        "DECIMAL" => SqlValue::from(row.try_get::<BigDecimal, _>(index)?),
        "DATETIME" => SqlValue::from(row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMP" => SqlValue::from(row.try_get::<DateTime<Utc>, _>(index)?),
        "DATE" => SqlValue::from(row.try_get::<NaiveDate, _>(index)?),
        "TIME" => rowsql::ToSqlValue::to_sql_value(&row.try_get::<NaiveTime, _>(index)?),
        "JSON" => SqlValue::from(row.try_get::<JsonValue, _>(index)?),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            hex_literal(&row.try_get::<Vec<u8>, _>(index)?)
        }
        _ => return Ok(text_or_none(row.try_get::<String, _>(index))),
    };
    Ok(Some(value))
}

fn postgres_snapshot(row: &PgRow) -> Result<Snapshot> {
    let mut snapshot = Snapshot::with_capacity(row.columns().len());
    for column in row.columns() {
        let type_name = column.type_info().name().to_uppercase();
        let value = decode_postgres(row, column.ordinal(), &type_name).with_context(|| {
            format!("Failed to decode column '{}' ({})", column.name(), type_name)
        })?;
        match value {
            Some(value) => snapshot.insert(column.name(), value),
            None => skip_column(column.name(), &type_name),
        }
    }
    Ok(snapshot)
}

fn decode_postgres(row: &PgRow, index: usize, type_name: &str) -> Result<Option<SqlValue>> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Some(SqlValue::Null));
    }

    let value = match type_name {
        "BOOL" => SqlValue::from(row.try_get::<bool, _>(index)?),
        "INT2" => SqlValue::from(row.try_get::<i16, _>(index)?),
        "INT4" => SqlValue::from(row.try_get::<i32, _>(index)?),
        "INT8" => SqlValue::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => SqlValue::from(row.try_get::<f32, _>(index)?),
        "FLOAT8" => SqlValue::from(row.try_get::<f64, _>(index)?),
        "NUMERIC" => SqlValue::from(row.try_get::<BigDecimal, _>(index)?),
        "TIMESTAMP" => SqlValue::from(row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => SqlValue::from(row.try_get::<DateTime<Utc>, _>(index)?),
        "DATE" => SqlValue::from(row.try_get::<NaiveDate, _>(index)?),
        "TIME" => rowsql::ToSqlValue::to_sql_value(&row.try_get::<NaiveTime, _>(index)?),
        "JSON" | "JSONB" => SqlValue::from(row.try_get::<JsonValue, _>(index)?),
        "UUID" => SqlValue::from(row.try_get::<Uuid, _>(index)?.to_string()),
        "BYTEA" => hex_literal(&row.try_get::<Vec<u8>, _>(index)?),
        _ => return Ok(text_or_none(row.try_get::<String, _>(index))),
    };
    Ok(Some(value))
}

fn sqlite_snapshot(row: &SqliteRow) -> Result<Snapshot> {
    let mut snapshot = Snapshot::with_capacity(row.columns().len());
    for column in row.columns() {
        let declared = column.type_info().name().to_uppercase();
        let value = decode_sqlite(row, column.ordinal(), &declared).with_context(|| {
            format!("Failed to decode column '{}' ({})", column.name(), declared)
        })?;
        match value {
            Some(value) => snapshot.insert(column.name(), value),
            None => skip_column(column.name(), &declared),
        }
    }
    Ok(snapshot)
}

/// SQLite 是动态类型：日期和布尔按声明类型解码，其余按值的实际存储类型解码
fn decode_sqlite(row: &SqliteRow, index: usize, declared: &str) -> Result<Option<SqlValue>> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Some(SqlValue::Null));
    }
    let storage = raw.type_info().name().to_uppercase();

    let value = match declared {
        "BOOLEAN" => SqlValue::from(row.try_get::<bool, _>(index)?),
        "DATETIME" => match row.try_get::<NaiveDateTime, _>(index) {
            Ok(dt) => SqlValue::from(dt),
            Err(_) => return Ok(text_or_none(row.try_get::<String, _>(index))),
        },
        "DATE" => match row.try_get::<NaiveDate, _>(index) {
            Ok(d) => SqlValue::from(d),
            Err(_) => return Ok(text_or_none(row.try_get::<String, _>(index))),
        },
        _ => match storage.as_str() {
            "INTEGER" => SqlValue::from(row.try_get::<i64, _>(index)?),
            "REAL" => SqlValue::from(row.try_get::<f64, _>(index)?),
            "BLOB" => hex_literal(&row.try_get::<Vec<u8>, _>(index)?),
            _ => return Ok(text_or_none(row.try_get::<String, _>(index))),
        },
    };
    Ok(Some(value))
}
