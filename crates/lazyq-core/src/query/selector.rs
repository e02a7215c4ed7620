//! Selectors and named-field lookup.
//!
//! The combinators only ever see plain closures. This module derives such
//! closures from field names for items implementing [`Record`]: dynamic rows
//! answer directly, and any `serde::Serialize` type can opt in through
//! [`impl_record!`](crate::impl_record) or [`serde_field`].

use std::any::type_name;
use std::rc::Rc;

use serde::Serialize;

use crate::error::Error;
use lazyq_value::{Key, Row, Value};

/// Shared, fallible key selector.
pub(crate) type KeyFn<'a, T, K> = Rc<dyn Fn(&T) -> Result<K, Error> + 'a>;

/// An item whose fields can be looked up by name.
pub trait Record {
    /// Return the value of the named field.
    fn field(&self, name: &str) -> Result<Value, Error>;
}

impl Record for Row {
    fn field(&self, name: &str) -> Result<Value, Error> {
        Ok(Row::field(self, name)?.clone())
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> Result<Value, Error> {
        Ok(Value::field(self, name)?.clone())
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Result<Value, Error> {
        match self {
            serde_json::Value::Object(map) => map
                .get(name)
                .cloned()
                .map(Value::from)
                .ok_or_else(|| Error::FieldNotFound {
                    field: name.to_string(),
                    type_name: type_name::<serde_json::Value>(),
                }),
            _ => Err(Error::NotARecord {
                type_name: type_name::<serde_json::Value>(),
            }),
        }
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> Result<Value, Error> {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Rc<T> {
    fn field(&self, name: &str) -> Result<Value, Error> {
        (**self).field(name)
    }
}

/// Look up a named field through the item's `Serialize` implementation.
///
/// `name` is the serialized field name, so `#[serde(rename)]` and
/// `rename_all` apply. The item must serialize as a map (structs do);
/// anything else is reported as [`Error::NotARecord`]. The whole item is
/// serialized on every call.
pub fn serde_field<T: Serialize + ?Sized>(item: &T, name: &str) -> Result<Value, Error> {
    match serde_json::to_value(item)? {
        serde_json::Value::Object(mut map) => {
            map.remove(name)
                .map(Value::from)
                .ok_or_else(|| Error::FieldNotFound {
                    field: name.to_string(),
                    type_name: type_name::<T>(),
                })
        }
        _ => Err(Error::NotARecord {
            type_name: type_name::<T>(),
        }),
    }
}

/// Convert a serializable item into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(item: &T) -> Result<Value, Error> {
    Ok(Value::from(serde_json::to_value(item)?))
}

/// Selector returning the named field of an item.
pub fn field_selector<T: Record>(name: &str) -> impl Fn(&T) -> Result<Value, Error> {
    let name = name.to_string();
    move |item| item.field(&name)
}

/// Selector returning the named field of an item as a hashable key.
pub fn field_key<T: Record>(name: &str) -> impl Fn(&T) -> Result<Key, Error> {
    let name = name.to_string();
    move |item| Ok(item.field(&name)?.to_key()?)
}

/// Implement [`Record`] for serializable types by looking fields up through
/// their `Serialize` output.
///
/// Field names are the serialized names: a struct with
/// `#[serde(rename_all = "camelCase")]` answers `"orderId"`, not
/// `"order_id"`. Every lookup serializes the item; types queried on many
/// fields in a hot loop should implement [`Record`] by hand.
///
/// ```
/// use lazyq_core::query::Record;
/// use lazyq_core::Value;
///
/// #[derive(serde::Serialize)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// lazyq_core::impl_record!(User);
///
/// let user = User { id: 7, name: "ada".into() };
/// assert_eq!(user.field("id").unwrap(), Value::Int64(7));
/// ```
#[macro_export]
macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::query::Record for $ty {
                fn field(&self, name: &str) -> ::std::result::Result<$crate::Value, $crate::Error> {
                    $crate::query::serde_field(self, name)
                }
            }
        )+
    };
}
