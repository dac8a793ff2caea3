//! Builder 模块
//!
//! 提供 InsertSql 用于把记录快照渲染为 INSERT 语句

pub mod insert_builder;

pub use insert_builder::{render, InsertSql, ResolvedInsert};
