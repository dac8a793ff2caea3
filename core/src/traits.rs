use crate::builder::InsertSql;
use crate::error::Result;
use crate::snapshot::Snapshot;

/// Record trait 描述一条可以导出为 INSERT 语句的记录
///
/// 通常由 `#[derive(Record)]` 生成，也可以手动实现。
pub trait Record {
    /// 表名
    const TABLE: &'static str;
    /// 隐藏列（如密码、令牌），默认不输出
    const HIDDEN: &'static [&'static str] = &[];

    /// 采集当前所有字段的值，按字段声明顺序
    fn snapshot(&self) -> Snapshot;

    /// 以当前记录创建 InsertSql
    fn to_insert_sql(&self) -> Result<InsertSql>
    where
        Self: Sized,
    {
        InsertSql::from_model(self)
    }
}
