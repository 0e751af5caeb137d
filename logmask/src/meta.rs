//! Raw metadata graphs.
//!
//! [`Meta`] is what callers hand to the logger. Lists and objects are shared,
//! interior-mutable handles, so a graph may contain diamonds and cycles:
//!
//! ```rust
//! use logmask::{Meta, Object};
//!
//! let root = Object::new();
//! root.insert("name", "root");
//! root.insert("me", root.clone()); // self-reference
//! let _meta = Meta::from(root.clone());
//!
//! // Handles are reference counted, so a cycle is never freed on its own.
//! // Break it once the graph is no longer needed.
//! root.remove("me");
//! ```
//!
//! Identity lives only here. [`crate::SafeSerializer`] turns a graph into a
//! plain `serde_json::Value` tree and nothing downstream sees handles again.

use std::{
    borrow::Cow,
    cell::{BorrowError, Ref, RefCell, RefMut},
    collections::{BTreeMap, HashMap},
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use serde::Serialize;
use serde_json::{Number, Value};

use crate::{
    error::SerializeError,
    sanitize::{CapturedError, ErrorLike},
};

/// A node of a raw metadata graph.
#[derive(Clone, Default)]
pub enum Meta {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(List),
    Object(Object),
    /// An error-like value. Normalized into an object during serialization.
    Error(Rc<dyn ErrorLike>),
}

impl Meta {
    /// Captures a Rust error as an error-like node.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::Error(Rc::new(CapturedError::new(&err)))
    }

    /// Wraps any [`ErrorLike`] implementation.
    pub fn error_like<E>(err: E) -> Self
    where
        E: ErrorLike + 'static,
    {
        Self::Error(Rc::new(err))
    }

    /// Converts a `serde::Serialize` value into an acyclic metadata tree.
    pub fn from_serialize<T>(value: &T) -> Result<Self, SerializeError>
    where
        T: Serialize + ?Sized,
    {
        Ok(serde_json::to_value(value)?.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}

// Graphs may be cyclic, so `Debug` never descends into containers.
impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Self::String(value) => f.debug_tuple("String").field(value).finish(),
            Self::List(list) => fmt::Debug::fmt(list, f),
            Self::Object(object) => fmt::Debug::fmt(object, f),
            Self::Error(err) => f
                .debug_struct("Error")
                .field("name", &err.name())
                .field("message", &err.message())
                .finish(),
        }
    }
}

/// Shared, ordered sequence of metadata nodes.
///
/// A list that contains itself, directly or through other containers, leaks
/// unless the cycle is broken, e.g. with `list.borrow_mut().clear()`.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vec<Meta>>>);

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: impl Into<Meta>) {
        self.0.borrow_mut().push(value.into());
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Mutable access to the items. Holding the guard across a log call makes
    /// that call fail with [`SerializeError::Borrowed`].
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Meta>> {
        self.0.borrow_mut()
    }

    /// True when both handles point at the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn try_items(&self) -> Result<Ref<'_, Vec<Meta>>, BorrowError> {
        self.0.try_borrow()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(items) => write!(f, "List({} items @ {:p})", items.len(), Rc::as_ptr(&self.0)),
            Err(_) => write!(f, "List(<borrowed> @ {:p})", Rc::as_ptr(&self.0)),
        }
    }
}

impl<T> FromIterator<T> for List
where
    T: Into<Meta>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(Rc::new(RefCell::new(iter.into_iter().map(Into::into).collect())))
    }
}

/// Shared mapping from field names to metadata nodes, in insertion order.
///
/// Cloning copies the handle. An object reachable from itself is never
/// dropped until the back-reference is removed with [`Object::remove`].
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<Vec<(String, Meta)>>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. An existing field keeps its position and gets the new value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Meta>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.borrow_mut();
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
    }

    /// Returns a handle to the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Meta> {
        self.0
            .borrow()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
    }

    /// Removes a field and returns its value. This is how a cycle through
    /// `key` is broken.
    pub fn remove(&self, key: &str) -> Option<Meta> {
        let mut entries = self.0.borrow_mut();
        let index = entries.iter().position(|(existing, _)| existing == key)?;
        Some(entries.remove(index).1)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Mutable access to the entries. Holding the guard across a log call makes
    /// that call fail with [`SerializeError::Borrowed`].
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<(String, Meta)>> {
        self.0.borrow_mut()
    }

    /// True when both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn try_entries(&self) -> Result<Ref<'_, Vec<(String, Meta)>>, BorrowError> {
        self.0.try_borrow()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
                write!(f, "Object({keys:?} @ {:p})", Rc::as_ptr(&self.0))
            }
            Err(_) => write!(f, "Object(<borrowed> @ {:p})", Rc::as_ptr(&self.0)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<String>,
    V: Into<Meta>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// =============================================================================
// Conversions into Meta
// =============================================================================

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Meta {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Meta {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<f32> for Meta {
    fn from(value: f32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<bool> for Meta {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Meta {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Meta {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Cow<'_, str>> for Meta {
    fn from(value: Cow<'_, str>) -> Self {
        Self::String(value.into_owned())
    }
}

impl From<List> for Meta {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl From<Object> for Meta {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl<T> From<Option<T>> for Meta
where
    T: Into<Meta>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Meta
where
    T: Into<Meta>,
{
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().collect())
    }
}

impl From<Value> for Meta {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::List(items.into_iter().collect()),
            Value::Object(entries) => Self::Object(entries.into_iter().collect()),
        }
    }
}

// =============================================================================
// ToMeta - borrowed conversion, implemented by #[derive(ToMeta)]
// =============================================================================

/// Types that can describe themselves as log metadata.
///
/// Derive it with `#[derive(ToMeta)]`:
///
/// ```rust
/// use logmask::{Meta, ToMeta};
///
/// #[derive(ToMeta)]
/// #[meta(rename_all = "camelCase")]
/// struct Login {
///     user_name: String,
///     password: String,
///     #[meta(skip)]
///     attempts: u32,
/// }
///
/// let login = Login { user_name: "ana".into(), password: "hunter2".into(), attempts: 3 };
/// let meta = login.to_meta();
/// assert_eq!(meta.as_object().unwrap().keys(), vec!["userName", "password"]);
/// ```
pub trait ToMeta {
    fn to_meta(&self) -> Meta;
}

macro_rules! impl_to_meta_via_from {
    ($($ty:ty),*) => {
        $(
            impl ToMeta for $ty {
                fn to_meta(&self) -> Meta {
                    Meta::from(*self)
                }
            }
        )*
    };
}

impl_to_meta_via_from!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ToMeta for () {
    fn to_meta(&self) -> Meta {
        Meta::Null
    }
}

impl<T: ?Sized> ToMeta for PhantomData<T> {
    fn to_meta(&self) -> Meta {
        Meta::Null
    }
}

impl ToMeta for char {
    fn to_meta(&self) -> Meta {
        Meta::String(self.to_string())
    }
}

impl ToMeta for str {
    fn to_meta(&self) -> Meta {
        Meta::from(self)
    }
}

impl ToMeta for String {
    fn to_meta(&self) -> Meta {
        Meta::String(self.clone())
    }
}

impl ToMeta for Cow<'_, str> {
    fn to_meta(&self) -> Meta {
        Meta::String(self.to_string())
    }
}

impl ToMeta for Meta {
    fn to_meta(&self) -> Meta {
        self.clone()
    }
}

impl ToMeta for List {
    fn to_meta(&self) -> Meta {
        Meta::List(self.clone())
    }
}

impl ToMeta for Object {
    fn to_meta(&self) -> Meta {
        Meta::Object(self.clone())
    }
}

impl ToMeta for Value {
    fn to_meta(&self) -> Meta {
        Meta::from(self.clone())
    }
}

impl<T> ToMeta for &T
where
    T: ToMeta + ?Sized,
{
    fn to_meta(&self) -> Meta {
        (**self).to_meta()
    }
}

impl<T> ToMeta for Option<T>
where
    T: ToMeta,
{
    fn to_meta(&self) -> Meta {
        self.as_ref().map_or(Meta::Null, ToMeta::to_meta)
    }
}

impl<T> ToMeta for Box<T>
where
    T: ToMeta + ?Sized,
{
    fn to_meta(&self) -> Meta {
        (**self).to_meta()
    }
}

impl<T> ToMeta for Rc<T>
where
    T: ToMeta + ?Sized,
{
    fn to_meta(&self) -> Meta {
        (**self).to_meta()
    }
}

impl<T> ToMeta for [T]
where
    T: ToMeta,
{
    fn to_meta(&self) -> Meta {
        Meta::List(self.iter().map(ToMeta::to_meta).collect())
    }
}

impl<T> ToMeta for Vec<T>
where
    T: ToMeta,
{
    fn to_meta(&self) -> Meta {
        self.as_slice().to_meta()
    }
}

impl<K, V, S> ToMeta for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: ToMeta,
{
    fn to_meta(&self) -> Meta {
        Meta::Object(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_owned(), value.to_meta()))
                .collect(),
        )
    }
}

impl<K, V> ToMeta for BTreeMap<K, V>
where
    K: AsRef<str>,
    V: ToMeta,
{
    fn to_meta(&self) -> Meta {
        Meta::Object(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_owned(), value.to_meta()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, rc::Rc};

    use serde_json::json;

    use super::{List, Meta, Object, ToMeta};

    #[test]
    fn removing_the_back_reference_frees_a_cycle() {
        let object = Object::new();
        object.insert("me", object.clone());
        assert_eq!(Rc::strong_count(&object.0), 2);

        drop(object.remove("me"));
        assert_eq!(Rc::strong_count(&object.0), 1);

        let list = List::new();
        list.push(list.clone());
        assert_eq!(Rc::strong_count(&list.0), 2);
        list.borrow_mut().clear();
        assert_eq!(Rc::strong_count(&list.0), 1);
    }

    #[test]
    fn insert_replaces_in_place() {
        let object = Object::new();
        object.insert("a", 1);
        object.insert("b", 2);
        object.insert("a", 3);
        assert_eq!(object.keys(), vec!["a", "b"]);
        assert!(matches!(object.get("a"), Some(Meta::Number(n)) if n.as_i64() == Some(3)));
    }

    #[test]
    fn remove_returns_value() {
        let object: Object = [("a", 1), ("b", 2)].into_iter().collect();
        assert!(object.remove("a").is_some());
        assert!(object.remove("a").is_none());
        assert_eq!(object.len(), 1);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert!(Meta::from(f64::NAN).is_null());
        assert!(Meta::from(f64::INFINITY).is_null());
        assert!(matches!(Meta::from(1.5_f64), Meta::Number(_)));
    }

    #[test]
    fn json_values_convert_to_fresh_containers() {
        let meta = Meta::from(json!({"a": [1, 2], "b": {"c": null}}));
        let object = meta.as_object().unwrap();
        assert_eq!(object.keys(), vec!["a", "b"]);
        assert_eq!(object.get("a").unwrap().as_list().unwrap().len(), 2);
    }

    #[test]
    fn debug_does_not_follow_cycles() {
        let object = Object::new();
        object.insert("self", object.clone());
        let rendered = format!("{:?}", Meta::from(object));
        assert!(rendered.starts_with("Object([\"self\"]"));
    }

    #[test]
    fn handles_share_identity() {
        let list = List::new();
        let alias = list.clone();
        alias.push("x");
        assert!(list.ptr_eq(&alias));
        assert_eq!(list.len(), 1);
        assert!(!list.ptr_eq(&List::new()));
    }

    #[test]
    fn to_meta_for_std_types() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), vec![Some(1_u8), None]);
        let meta = map.to_meta();
        let inner = meta.as_object().unwrap().get("k").unwrap();
        let list = inner.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(matches!('x'.to_meta(), Meta::String(s) if s == "x"));
        assert!(().to_meta().is_null());
    }

    #[test]
    fn from_serialize_reports_failures() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], "non-string key");
        assert!(Meta::from_serialize(&map).is_err());
        assert!(Meta::from_serialize(&json!({"ok": true})).is_ok());
    }
}
