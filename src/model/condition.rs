//! Arguments accepted by WHERE and DELETE.

use crate::db::Value;

/// A WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Raw, unparameterised `1` or `0`.
    ///
    /// `true` matches every row. Nothing guards against using it with
    /// UPDATE or DELETE.
    Literal(bool),
    /// `field = :bind` pairs, in order.
    Fields(Vec<(String, Value)>),
}

impl Condition {
    pub fn is_empty(&self) -> bool {
        matches!(self, Condition::Fields(fields) if fields.is_empty())
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(value)
    }
}

impl<K, V> From<Vec<(K, V)>> for Condition
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(fields: Vec<(K, V)>) -> Self {
        Condition::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Condition
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(fields: [(K, V); N]) -> Self {
        Condition::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What a DELETE removes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    /// Raw literal predicate; `true` deletes every row.
    Literal(bool),
    /// A bare primary-key value.
    Key(Value),
    /// `field = :bind` pairs joined with AND.
    Fields(Vec<(String, Value)>),
}

impl From<bool> for DeleteTarget {
    fn from(value: bool) -> Self {
        DeleteTarget::Literal(value)
    }
}

impl From<Condition> for DeleteTarget {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Literal(value) => DeleteTarget::Literal(value),
            Condition::Fields(fields) => DeleteTarget::Fields(fields),
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for DeleteTarget
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(fields: Vec<(K, V)>) -> Self {
        Condition::from(fields).into()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for DeleteTarget
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(fields: [(K, V); N]) -> Self {
        Condition::from(fields).into()
    }
}

macro_rules! impl_key_target {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DeleteTarget {
                fn from(value: $ty) -> Self {
                    DeleteTarget::Key(value.into())
                }
            }
        )*
    };
}

impl_key_target!(i32, i64, u32, &str, String, Value);
