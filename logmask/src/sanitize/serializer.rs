//! Bounded, cycle-safe flattening of metadata graphs.
//!
//! The serializer keeps the identities of the containers on the current path.
//! A container that is already on the path is a back-reference and becomes the
//! circular placeholder. Containers that are merely shared (diamonds) are
//! emitted once per occurrence.
//!
//! Bounds:
//! - the root container sits at depth 1; a non-empty container beyond
//!   `maximum_depth` becomes `"[Object]"` or `"[Array]"`, an empty one stays
//!   `{}` or `[]`
//! - lists keep their first `maximum_breadth` items plus one
//!   `"... N items not stringified"` marker
//! - objects keep their first `maximum_breadth` keys plus a `"..."` key
//!
//! Since depth is bounded, recursion is bounded too, whatever the graph shape.

use std::rc::Rc;

use serde_json::{Map, Value};

use super::errors::normalize_error;
use crate::{
    config::SanitizerConfig,
    error::SerializeError,
    meta::{List, Meta, Object},
};

const OBJECT_MARKER: &str = "[Object]";
const ARRAY_MARKER: &str = "[Array]";
const OMITTED_KEY: &str = "...";

/// Flattens [`Meta`] graphs into plain JSON values under a [`SanitizerConfig`].
#[derive(Clone, Copy, Debug)]
pub struct SafeSerializer<'a> {
    config: &'a SanitizerConfig,
}

impl<'a> SafeSerializer<'a> {
    pub fn new(config: &'a SanitizerConfig) -> Self {
        Self { config }
    }

    /// Flattens `meta`.
    ///
    /// Fails only when a container is mutably borrowed while it is read, or
    /// when an error-like value produces such a container.
    pub fn serialize(&self, meta: &Meta) -> Result<Value, SerializeError> {
        let mut ancestors = Vec::new();
        self.node(meta, 0, &mut ancestors).map_err(|err| match err {
            SerializeError::Borrowed { path } if path.is_empty() => SerializeError::Borrowed {
                path: "$".to_owned(),
            },
            SerializeError::Borrowed { path } => SerializeError::Borrowed {
                path: format!("$.{path}"),
            },
            other => other,
        })
    }

    fn node(
        &self,
        meta: &Meta,
        depth: usize,
        ancestors: &mut Vec<usize>,
    ) -> Result<Value, SerializeError> {
        match meta {
            Meta::Null => Ok(Value::Null),
            Meta::Bool(value) => Ok(Value::Bool(*value)),
            Meta::Number(value) => Ok(Value::Number(value.clone())),
            Meta::String(value) => Ok(Value::String(value.clone())),
            Meta::List(list) => self.list(list, depth, ancestors),
            Meta::Object(object) => {
                let id = object.identity();
                if let Some(value) = self.circular(id, ancestors) {
                    return Ok(value);
                }
                self.object(id, object, depth, ancestors)
            }
            Meta::Error(err) => {
                let id = Rc::as_ptr(err).cast::<()>() as usize;
                if let Some(value) = self.circular(id, ancestors) {
                    return Ok(value);
                }
                let normalized = normalize_error(err.as_ref());
                self.object(id, &normalized, depth, ancestors)
            }
        }
    }

    fn circular(&self, id: usize, ancestors: &[usize]) -> Option<Value> {
        ancestors
            .contains(&id)
            .then(|| Value::String(self.config.circular_value.clone()))
    }

    fn past_depth(&self, depth: usize) -> bool {
        depth >= self.config.maximum_depth
    }

    fn list(
        &self,
        list: &List,
        depth: usize,
        ancestors: &mut Vec<usize>,
    ) -> Result<Value, SerializeError> {
        let id = list.identity();
        if let Some(value) = self.circular(id, ancestors) {
            return Ok(value);
        }
        // Empty containers are kept as they are, even past the depth bound.
        if self.past_depth(depth) {
            return Ok(match list.try_items() {
                Ok(items) if items.is_empty() => Value::Array(Vec::new()),
                _ => Value::String(ARRAY_MARKER.to_owned()),
            });
        }
        let items = list.try_items().map_err(|_| borrowed())?;

        let kept = items.len().min(self.config.maximum_breadth);
        let mut out = Vec::with_capacity(kept + 1);
        ancestors.push(id);
        for (index, item) in items.iter().take(kept).enumerate() {
            let value = self
                .node(item, depth + 1, ancestors)
                .map_err(|err| within(err, &index.to_string()))?;
            out.push(value);
        }
        ancestors.pop();

        if items.len() > kept {
            out.push(Value::String(format!(
                "... {} not stringified",
                item_count(items.len() - kept)
            )));
        }
        Ok(Value::Array(out))
    }

    fn object(
        &self,
        id: usize,
        object: &Object,
        depth: usize,
        ancestors: &mut Vec<usize>,
    ) -> Result<Value, SerializeError> {
        if self.past_depth(depth) {
            return Ok(match object.try_entries() {
                Ok(entries) if entries.is_empty() => Value::Object(Map::new()),
                _ => Value::String(OBJECT_MARKER.to_owned()),
            });
        }
        let entries = object.try_entries().map_err(|_| borrowed())?;

        let mut order: Vec<&(String, Meta)> = entries.iter().collect();
        if self.config.deterministic {
            order.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        let kept = order.len().min(self.config.maximum_breadth);
        let mut out = Map::new();
        ancestors.push(id);
        for (key, value) in order.iter().take(kept) {
            let value = self
                .node(value, depth + 1, ancestors)
                .map_err(|err| within(err, key))?;
            out.insert(key.clone(), value);
        }
        ancestors.pop();

        if order.len() > kept {
            out.insert(
                OMITTED_KEY.to_owned(),
                Value::String(format!(
                    "{} not stringified",
                    item_count(order.len() - kept)
                )),
            );
        }
        Ok(Value::Object(out))
    }
}

fn item_count(count: usize) -> String {
    if count == 1 {
        "1 item".to_owned()
    } else {
        format!("{count} items")
    }
}

fn borrowed() -> SerializeError {
    SerializeError::Borrowed {
        path: String::new(),
    }
}

// Prefixes the failing node's path with the segment of the enclosing container.
fn within(err: SerializeError, segment: &str) -> SerializeError {
    match err {
        SerializeError::Borrowed { path } if path.is_empty() => SerializeError::Borrowed {
            path: segment.to_owned(),
        },
        SerializeError::Borrowed { path } => SerializeError::Borrowed {
            path: format!("{segment}.{path}"),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde_json::json;

    use super::SafeSerializer;
    use crate::{
        config::SanitizerConfig,
        error::SerializeError,
        meta::{List, Meta, Object},
    };

    fn config() -> SanitizerConfig {
        SanitizerConfig::default()
    }

    #[test]
    fn scalars_pass_through() {
        let config = config();
        let serializer = SafeSerializer::new(&config);
        assert_eq!(serializer.serialize(&Meta::Null).unwrap(), json!(null));
        assert_eq!(serializer.serialize(&Meta::from(7)).unwrap(), json!(7));
        assert_eq!(serializer.serialize(&Meta::from("x")).unwrap(), json!("x"));
    }

    #[test]
    fn self_reference_becomes_placeholder() {
        let root = Object::new();
        root.insert("abc", "saudades");
        root.insert("a", root.clone());

        let config = config();
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        assert_eq!(value, json!({"abc": "saudades", "a": "Circular"}));
    }

    #[test]
    fn indirect_cycles_terminate() {
        let a = Object::new();
        let b = Object::new();
        let items = List::new();
        a.insert("b", b.clone());
        b.insert("items", items.clone());
        items.push(a.clone());
        items.push(items.clone());

        let config = SanitizerConfig {
            circular_value: "[CircularRef]".to_owned(),
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(a))
            .unwrap();
        assert_eq!(
            value,
            json!({"b": {"items": ["[CircularRef]", "[CircularRef]"]}})
        );
    }

    #[test]
    fn shared_non_ancestors_are_repeated() {
        let shared = Object::new();
        shared.insert("v", 1);
        let root = Object::new();
        root.insert("left", shared.clone());
        root.insert("right", shared);

        let config = config();
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        assert_eq!(value, json!({"left": {"v": 1}, "right": {"v": 1}}));
    }

    #[test]
    fn depth_bound_replaces_deep_containers() {
        let leaf = Object::new();
        leaf.insert("deep", true);
        let mid = Object::new();
        mid.insert("leaf", leaf);
        mid.insert("list", List::from_iter([1, 2]));
        let root = Object::new();
        root.insert("mid", mid);

        let config = SanitizerConfig {
            maximum_depth: 2,
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        assert_eq!(
            value,
            json!({"mid": {"leaf": "[Object]", "list": "[Array]"}})
        );
    }

    #[test]
    fn depth_one_keeps_only_root_scalars() {
        let child = Object::new();
        child.insert("k", "v");
        let root = Object::new();
        root.insert("n", 1);
        root.insert("child", child);

        let config = SanitizerConfig {
            maximum_depth: 1,
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        assert_eq!(value, json!({"n": 1, "child": "[Object]"}));
    }

    #[test]
    fn empty_containers_past_the_depth_bound_stay_empty() {
        let root = Object::new();
        root.insert("e", Object::new());
        root.insert("l", List::new());
        root.insert("full", List::from_iter([1]));

        let config = SanitizerConfig {
            maximum_depth: 1,
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        assert_eq!(value, json!({"e": {}, "l": [], "full": "[Array]"}));
    }

    #[test]
    fn borrowed_container_past_the_depth_bound_is_a_marker() {
        let inner = Object::new();
        let root = Object::new();
        root.insert("inner", inner.clone());

        let config = SanitizerConfig {
            maximum_depth: 1,
            ..config()
        };
        let guard = inner.borrow_mut();
        let value = SafeSerializer::new(&config).serialize(&Meta::from(root));
        drop(guard);
        assert_eq!(value.unwrap(), json!({"inner": "[Object]"}));
    }

    #[test]
    fn breadth_bound_truncates_lists() {
        let list: List = (0..5).collect();
        let config = SanitizerConfig {
            maximum_breadth: 3,
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(list))
            .unwrap();
        assert_eq!(value, json!([0, 1, 2, "... 2 items not stringified"]));
    }

    #[test]
    fn breadth_bound_truncates_objects() {
        let object: Object = [("c", 3), ("a", 1), ("b", 2)].into_iter().collect();
        let config = SanitizerConfig {
            maximum_breadth: 2,
            deterministic: true,
            ..config()
        };
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(object))
            .unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2, "...": "1 item not stringified"}));
    }

    #[test]
    fn deterministic_sorts_keys_and_default_keeps_insertion_order() {
        let object: Object = [("b", 1), ("a", 2)].into_iter().collect();
        let meta = Meta::from(object);

        let config = config();
        let value = SafeSerializer::new(&config).serialize(&meta).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);

        let config = SanitizerConfig {
            deterministic: true,
            ..config
        };
        let value = SafeSerializer::new(&config).serialize(&meta).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn errors_are_normalized() {
        let root = Object::new();
        root.insert(
            "error",
            Meta::error(io::Error::new(io::ErrorKind::Other, "Falha")),
        );

        let config = config();
        let value = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap();
        let error = &value["error"];
        assert_eq!(error["name"], json!("Error"));
        assert_eq!(error["message"], json!("Falha"));
        assert!(error["stack"].is_string());
    }

    #[test]
    fn borrowed_container_reports_its_path() {
        let inner = List::new();
        let root = Object::new();
        root.insert("outer", Object::from_iter([("inner", inner.clone())]));

        let _guard = inner.borrow_mut();
        let config = config();
        let err = SafeSerializer::new(&config)
            .serialize(&Meta::from(root))
            .unwrap_err();
        match err {
            SerializeError::Borrowed { path } => assert_eq!(path, "$.outer.inner"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
