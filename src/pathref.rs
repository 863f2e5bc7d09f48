use std::cell::RefCell;
use std::rc::Rc;

use crate::path::{self, PathKey};
use crate::value::Value;
use crate::KyoError;

/// The document under construction, shared by every reference into it.
pub type SharedValue = Rc<RefCell<Value>>;

/// An addressable slot in a shared document: a container path plus a key.
///
/// References never hold a borrow between calls. Each operation borrows the root
/// for its own duration only, so handlers may freely read then write.
#[derive(Debug, Clone)]
pub struct PathRef {
    root: SharedValue,
    container: Vec<PathKey>,
    key: PathKey,
    path: String,
}

impl PathRef {
    /// Fails if `container` does not resolve, or resolves to the wrong kind of
    /// container for `key` (objects take keys, arrays take indices).
    pub fn new(
        root: SharedValue,
        container: Vec<PathKey>,
        key: PathKey,
        path: impl Into<String>,
    ) -> Result<Self, KyoError> {
        let path = path.into();

        {
            let doc = root.borrow();
            match (path::lookup(&doc, &container), &key) {
                (Some(Value::Object(_)), PathKey::Key(_)) | (Some(Value::Array(_)), PathKey::Index(_)) => {}
                (Some(other), _) => {
                    return Err(KyoError::InvalidReference {
                        path,
                        message: format!("cannot address {} inside a {}", key, other.type_name()),
                    });
                }
                (None, _) => {
                    return Err(KyoError::InvalidReference {
                        path,
                        message: "container does not exist".into(),
                    });
                }
            }
        }

        Ok(Self {
            root,
            container,
            key,
            path,
        })
    }

    /// Reference to `document` inside a fresh `{ "document": {} }` root.
    pub fn document() -> Self {
        let mut root = Value::object();
        root.insert("document", Value::object());

        Self {
            root: Rc::new(RefCell::new(root)),
            container: Vec::new(),
            key: PathKey::Key("document".into()),
            path: "document".into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn key(&self) -> &PathKey {
        &self.key
    }

    pub fn root(&self) -> &SharedValue {
        &self.root
    }

    /// Current value, if the slot is populated.
    pub fn get(&self) -> Option<Value> {
        self.with_value(|v| v.cloned())
    }

    pub fn with_value<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let doc = self.root.borrow();
        f(self.slot(&doc))
    }

    /// Current value of the container holding this slot.
    pub fn base(&self) -> Option<Value> {
        let doc = self.root.borrow();
        path::lookup(&doc, &self.container).cloned()
    }

    /// `container[key] = f(container[key])`. A missing key reads as `Null`.
    ///
    /// On arrays, an index equal to the length appends.
    pub fn replace(&self, f: impl FnOnce(Value) -> Value) -> Result<(), KyoError> {
        let next = f(self.get().unwrap_or_default());

        let mut doc = self.root.borrow_mut();
        let container = path::lookup_mut(&mut doc, &self.container)
            .ok_or_else(|| self.invalid("container no longer exists".into()))?;

        match (container, &self.key) {
            (Value::Object(map), PathKey::Key(k)) => {
                map.insert(k.clone(), next);
                Ok(())
            }
            (Value::Array(items), PathKey::Index(i)) => {
                let len = items.len();
                match *i {
                    i if i < len => items[i] = next,
                    i if i == len => items.push(next),
                    i => {
                        return Err(self.invalid(format!(
                            "index {} out of bounds for array of length {}",
                            i, len
                        )));
                    }
                }
                Ok(())
            }
            (other, key) => Err(self.invalid(format!(
                "cannot set {} on a {}",
                key,
                other.type_name()
            ))),
        }
    }

    pub fn set(&self, value: Value) -> Result<(), KyoError> {
        self.replace(|_| value)
    }

    /// Reference to `key` inside this slot, which must hold an object.
    pub fn child(&self, key: impl Into<String>) -> Result<PathRef, KyoError> {
        self.descend(PathKey::Key(key.into()))
    }

    /// Reference to item `index` inside this slot, which must hold an array.
    pub fn index(&self, index: usize) -> Result<PathRef, KyoError> {
        self.descend(PathKey::Index(index))
    }

    /// Host-facing projection of this reference.
    pub fn handle(&self) -> NodeHandle {
        NodeHandle {
            target: self.clone(),
        }
    }

    fn descend(&self, key: PathKey) -> Result<PathRef, KyoError> {
        let mut container = self.container.clone();
        container.push(self.key.clone());
        let path = key.join(&self.path);
        PathRef::new(Rc::clone(&self.root), container, key, path)
    }

    fn slot<'v>(&self, doc: &'v Value) -> Option<&'v Value> {
        path::lookup(doc, &self.container).and_then(|c| self.key.get(c))
    }

    fn invalid(&self, message: String) -> KyoError {
        KyoError::InvalidReference {
            path: self.path.clone(),
            message,
        }
    }
}

/// What a directive sees of the node it is applied to.
///
/// Reads return snapshots. Writes go straight into the shared document.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    target: PathRef,
}

impl NodeHandle {
    /// Full path of the node, e.g. `document.server.port`.
    pub fn path(&self) -> &str {
        self.target.path()
    }

    pub fn key(&self) -> &PathKey {
        self.target.key()
    }

    /// Current value of the node, `Null` if unset.
    pub fn value(&self) -> Value {
        self.target.get().unwrap_or_default()
    }

    /// The container holding the node.
    pub fn base(&self) -> Value {
        self.target.base().unwrap_or_default()
    }

    /// Snapshot of the whole tree, with the document under `document`.
    pub fn root(&self) -> Value {
        self.target.root().borrow().clone()
    }

    /// Look up any path from the root, e.g. `get("document.server.port")`.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.target.root().borrow().lookup(path).cloned()
    }

    pub fn set(&self, value: impl Into<Value>) -> Result<(), KyoError> {
        self.target.set(value.into())
    }

    pub fn update(&self, f: impl FnOnce(Value) -> Value) -> Result<(), KyoError> {
        self.target.replace(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shared(value: serde_json::Value) -> SharedValue {
        Rc::new(RefCell::new(value.into()))
    }

    fn key(k: &str) -> PathKey {
        PathKey::Key(k.into())
    }

    #[test]
    fn test_new_fails_without_container() {
        let root = shared(json!({ "document": {} }));
        let err = PathRef::new(root, vec![key("missing")], key("x"), "missing.x").unwrap_err();
        assert!(matches!(err, KyoError::InvalidReference { .. }));
    }

    #[test]
    fn test_new_fails_on_wrong_container_kind() {
        let root = shared(json!({ "document": { "list": [1], "text": "hi" } }));

        assert!(PathRef::new(root.clone(), vec![key("document"), key("list")], key("a"), "x").is_err());
        assert!(PathRef::new(root.clone(), vec![key("document")], PathKey::Index(0), "x").is_err());
        assert!(PathRef::new(root, vec![key("document"), key("text")], key("a"), "x").is_err());
    }

    #[test]
    fn test_child_extends_path() {
        let root = shared(json!({ "document": { "block": { "foo": "bar" } } }));
        let node = PathRef::new(root, vec![key("document")], key("block"), "document.block").unwrap();
        let child = node.child("foo").unwrap();

        assert_eq!(node.path(), "document.block");
        assert_eq!(child.path(), "document.block.foo");
        assert_eq!(child.get(), Some(Value::from("bar")));
    }

    #[test]
    fn test_index_extends_path() {
        let root = shared(json!({ "document": { "foo": ["bar"] } }));
        let node = PathRef::new(root, vec![key("document")], key("foo"), "document.foo").unwrap();
        let child = node.index(0).unwrap();

        assert_eq!(child.path(), "document.foo[0]");
        assert_eq!(child.get(), Some(Value::from("bar")));
    }

    #[test]
    fn test_child_fails_fast_on_non_objects() {
        let root = shared(json!({ "document": { "foo": ["bar"] } }));
        let node = PathRef::new(root, vec![key("document")], key("foo"), "document.foo").unwrap();

        assert!(node.child("x").is_err());
        assert!(node.index(0).unwrap().index(0).is_err());
    }

    #[test]
    fn test_replace_reads_missing_as_null_and_appends() {
        let doc = PathRef::document();
        doc.child("count")
            .unwrap()
            .replace(|v| {
                assert_eq!(v, Value::Null);
                Value::from(1)
            })
            .unwrap();

        doc.child("list").unwrap().set(Value::Array(vec![])).unwrap();
        let list = doc.child("list").unwrap();
        list.index(0).unwrap().set(Value::from("a")).unwrap();
        list.index(1).unwrap().set(Value::from("b")).unwrap();
        assert!(list.index(3).unwrap().set(Value::from("gap")).is_err());

        assert_eq!(
            doc.get(),
            Some(json!({ "count": 1, "list": ["a", "b"] }).into())
        );
    }

    #[test]
    fn test_handle_projection() {
        let root = shared(json!({
            "document": { "foo": ["bar"] },
            "other": { "item": "yay" }
        }));
        let node = PathRef::new(root, vec![key("document")], key("foo"), "document.foo").unwrap();
        let handle = node.handle();

        assert_eq!(handle.path(), "document.foo");
        assert_eq!(handle.key(), &key("foo"));
        assert_eq!(handle.value(), json!(["bar"]).into());
        assert_eq!(handle.base(), json!({ "foo": ["bar"] }).into());
        assert_eq!(handle.root().lookup("other.item"), Some(&Value::from("yay")));
        assert_eq!(handle.get("other.item"), Some(Value::from("yay")));
    }

    #[test]
    fn test_handle_set_writes_through() {
        let root = shared(json!({ "document": { "foo": ["bar"] } }));
        let node = PathRef::new(
            Rc::clone(&root),
            vec![key("document"), key("foo")],
            PathKey::Index(0),
            "document.foo[0]",
        )
        .unwrap();

        node.handle().set("hi").unwrap();
        assert_eq!(root.borrow().lookup("document.foo[0]"), Some(&Value::from("hi")));

        node.handle()
            .update(|v| Value::from(format!("{}!", v)))
            .unwrap();
        assert_eq!(root.borrow().lookup("document.foo[0]"), Some(&Value::from("hi!")));
    }
}
