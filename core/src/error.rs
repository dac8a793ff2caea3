use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RowSqlError {
    /// 构造参数非法（空快照、空表名）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// 已解析的列在快照中没有对应的值
    #[error("Missing attribute: column '{column}' has no value in the snapshot")]
    MissingAttribute { column: String },
    /// 列选择结果为空，无法生成 INSERT
    #[error("Empty selection: no columns left to insert into '{table}'")]
    EmptySelection { table: String },
    /// Snapshot source is not a flat object
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, RowSqlError>;
