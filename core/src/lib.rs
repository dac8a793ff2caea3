//! 把一条记录的属性快照渲染为单行 SQL INSERT 语句，用于调试、造数或导出数据。
//!
//! ```rust
//! use rowsql::{InsertSql, Snapshot};
//!
//! let snapshot = Snapshot::new()
//!     .with("id", 1i64)
//!     .with("name", "John Doe")
//!     .with("email_verified_at", None::<String>);
//!
//! let sql = InsertSql::from_record("users", snapshot, &["password"])?
//!     .only(&["name", "email_verified_at"])
//!     .to_query()?;
//!
//! assert_eq!(
//!     sql,
//!     "INSERT INTO `users` (`name`, `email_verified_at`) VALUES (\"John Doe\", NULL);"
//! );
//! # Ok::<(), rowsql::RowSqlError>(())
//! ```

pub mod builder;
pub mod error;
pub mod selection;
pub mod snapshot;
pub mod traits;
pub mod utils;
pub mod value;

pub use builder::{render, InsertSql, ResolvedInsert};
pub use selection::{InsertOptions, Selection};
pub use snapshot::Snapshot;
pub use traits::Record;
pub use value::{Number, SqlValue, ToSqlValue};

// 重新导出 derive 的所有公共 API（宏）
pub use error::{Result, RowSqlError};
pub use rowsql_derive::*;
