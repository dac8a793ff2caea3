//! 快照中的值类型
//!
//! 值在采集快照时就确定种类（`SqlValue`），渲染时只做模式匹配，不再做运行时类型判断。

use crate::utils::{quote_string, DATETIME_FORMAT};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;

/// 数值
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Decimal(BigDecimal),
}

impl Number {
    /// 浮点数的 NaN 和无穷大不是合法的 SQL 字面量
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Float(v) => v.is_finite(),
            Number::Float32(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::UInt(u) => write!(f, "{}", u),
            Number::Float(v) => write!(f, "{}", v),
            Number::Float32(v) => write!(f, "{}", v),
            Number::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// 单个属性值
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
    /// 日期时间，渲染为带引号的 `YYYY-MM-DD HH:MM:SS`
    Temporal(NaiveDateTime),
    /// 其他类型：按原样输出，不加引号
    Opaque(String),
}

impl SqlValue {
    /// 用任意实现了 Display 的值构造 Opaque
    pub fn opaque(value: impl fmt::Display) -> Self {
        SqlValue::Opaque(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// 转换为 SQL 字面量
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Text(s) => quote_string(s),
            // NaN 和无穷大按 NULL 输出
            SqlValue::Number(n) if !n.is_finite() => "NULL".to_string(),
            SqlValue::Number(n) => n.to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Temporal(dt) => format!("\"{}\"", dt.format(DATETIME_FORMAT)),
            SqlValue::Opaque(raw) => raw.clone(),
        }
    }
}

/// 把 Rust 值转换为 `SqlValue`，由 `#[derive(Record)]` 生成的代码调用
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for &T {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Number(Number::Int(i64::from(*self)))
                }
            }

            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    v.to_sql_value()
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Number(Number::UInt(u64::from(*self)))
                }
            }

            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    v.to_sql_value()
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Number(Number::Float(*self))
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Number(Number::Float32(*self))
    }
}

impl ToSqlValue for BigDecimal {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Number(Number::Decimal(self.clone()))
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Temporal(*self)
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Temporal(self.and_time(NaiveTime::MIN))
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.format("%H:%M:%S").to_string())
    }
}

/// 带时区的时间取其本地墙上时间
impl<Tz: TimeZone> ToSqlValue for DateTime<Tz> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Temporal(self.naive_local())
    }
}

/// JSON 数组和对象按序列化后的文本保存
impl ToSqlValue for serde_json::Value {
    fn to_sql_value(&self) -> SqlValue {
        use serde_json::Value;
        match self {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    SqlValue::Number(Number::UInt(u))
                } else {
                    // 非整数一定能表示为 f64
                    SqlValue::Number(Number::Float(n.as_f64().unwrap_or_default()))
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(self.to_string()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Number(Number::Float(f))
    }
}

impl From<f32> for SqlValue {
    fn from(f: f32) -> Self {
        SqlValue::Number(Number::Float32(f))
    }
}

impl From<BigDecimal> for SqlValue {
    fn from(d: BigDecimal) -> Self {
        SqlValue::Number(Number::Decimal(d))
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(dt: NaiveDateTime) -> Self {
        SqlValue::Temporal(dt)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        d.to_sql_value()
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for SqlValue {
    fn from(dt: DateTime<Tz>) -> Self {
        dt.to_sql_value()
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        v.to_sql_value()
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use std::str::FromStr;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_non_finite_float_literal_is_null() {
        assert_eq!(SqlValue::from(f64::NAN).to_sql_literal(), "NULL");
        assert_eq!(SqlValue::from(f64::INFINITY).to_sql_literal(), "NULL");
        assert_eq!(SqlValue::from(f32::NEG_INFINITY).to_sql_literal(), "NULL");
        assert_eq!(SqlValue::from(-0.5f64).to_sql_literal(), "-0.5");
        assert!(!Number::Float(f64::NAN).is_finite());
        assert!(Number::Int(i64::MIN).is_finite());
    }

    #[test]
    fn test_null_literal() {
        assert_eq!(SqlValue::Null.to_sql_literal(), "NULL");
        assert_eq!(SqlValue::from(None::<i64>).to_sql_literal(), "NULL");
    }

    #[test]
    fn test_text_literal_is_double_quoted_and_escaped() {
        assert_eq!(SqlValue::from("John Doe").to_sql_literal(), "\"John Doe\"");
        assert_eq!(
            SqlValue::from(r#"the "best" one"#).to_sql_literal(),
            r#""the \"best\" one""#
        );
    }

    #[test]
    fn test_numeric_literals_are_unquoted() {
        assert_eq!(SqlValue::from(1i64).to_sql_literal(), "1");
        assert_eq!(SqlValue::from(-7i16).to_sql_literal(), "-7");
        assert_eq!(SqlValue::from(42u32).to_sql_literal(), "42");
        assert_eq!(SqlValue::from(1.5f64).to_sql_literal(), "1.5");
        assert_eq!(SqlValue::from(0.25f32).to_sql_literal(), "0.25");
        assert_eq!(
            SqlValue::from(BigDecimal::from_str("19.90").unwrap()).to_sql_literal(),
            "19.90"
        );
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(SqlValue::from(true).to_sql_literal(), "true");
        assert_eq!(SqlValue::from(false).to_sql_literal(), "false");
    }

    #[test]
    fn test_temporal_literal_is_always_quoted() {
        let dt = datetime("2021-01-01 15:15:15");
        assert_eq!(SqlValue::from(dt).to_sql_literal(), "\"2021-01-01 15:15:15\"");
    }

    #[test]
    fn test_date_becomes_midnight() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(SqlValue::from(d).to_sql_literal(), "\"2021-01-01 00:00:00\"");
    }

    #[test]
    fn test_datetime_with_zone_uses_wall_clock() {
        let utc = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(SqlValue::from(utc).to_sql_literal(), "\"2021-01-01 00:00:00\"");

        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let local = utc.with_timezone(&offset);
        assert_eq!(
            SqlValue::from(local).to_sql_literal(),
            "\"2021-01-01 08:00:00\""
        );
    }

    #[test]
    fn test_time_of_day_is_text() {
        let t = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(t.to_sql_value(), SqlValue::Text("09:30:00".to_string()));
    }

    #[test]
    fn test_opaque_is_raw() {
        assert_eq!(SqlValue::opaque("CURRENT_TIMESTAMP").to_sql_literal(), "CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_json_values() {
        use serde_json::json;
        assert_eq!(SqlValue::from(json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from(json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(json!(3)), SqlValue::Number(Number::Int(3)));
        assert_eq!(
            SqlValue::from(json!(u64::MAX)),
            SqlValue::Number(Number::UInt(u64::MAX))
        );
        assert_eq!(SqlValue::from(json!(2.5)), SqlValue::Number(Number::Float(2.5)));
        assert_eq!(SqlValue::from(json!("x")), SqlValue::Text("x".to_string()));
        assert_eq!(
            SqlValue::from(json!({"a": [1, 2]})).to_sql_literal(),
            r#""{\"a\":[1,2]}""#
        );
    }

    #[test]
    fn test_option_and_reference_impls() {
        let name = Some("Jane".to_string());
        assert_eq!(name.to_sql_value(), SqlValue::Text("Jane".to_string()));
        let missing: Option<String> = None;
        assert!(missing.to_sql_value().is_null());
        let id = 5i32;
        assert_eq!((&id).to_sql_value(), SqlValue::Number(Number::Int(5)));
    }
}
