//! Variable store.
//!
//! Names are dotted paths (`window.run.window.play`) addressing a tree of
//! nested maps.  Writing a path creates the intermediate map nodes it needs,
//! replacing any non-map value found on the way: after `a.b = 1`, writing
//! `a.b.c = 2` turns `a.b` into `{c: 2}`.  Reading a missing path yields
//! `None`.
//!
//! Substituting a name bound to a map inserts its rendered form,
//! `{key: value, ...}` in key order with keys and strings unquoted.  That
//! text is not itself an expression, so `print a` on a map prints it
//! verbatim.

use std::collections::BTreeMap;

use crate::script::value::Value;

/// Dotted-path variable store.  One per interpreter run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VarStore {
    root: BTreeMap<String, Value>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `path` to `value`, creating (or replacing) intermediate maps.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };
        let mut node = &mut self.root;
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            let slot = node.entry(segment.to_owned()).or_insert_with(Value::empty_map);
            node = coerce_map(slot);
        }
        node.insert(leaf.to_owned(), value.into());
    }

    /// Look up `path`.  `None` if any segment is missing or passes through a
    /// non-map value.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut cur = self.root.get(segments.next()?)?;
        for segment in segments {
            match cur {
                Value::Map(children) => cur = children.get(segment)?,
                _ => return None,
            }
        }
        Some(cur)
    }

    /// Returns `true` if `path` is bound.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of top-level names.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Replace every bound identifier or dotted path in `text` with the
    /// rendered value.  Unbound names are left as written.
    ///
    /// A name starts with an ASCII letter or `_` and continues with word
    /// characters or `.`.  Quoted text is not special.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            if !(c == '_' || c.is_ascii_alphabetic()) {
                out.push(c);
                continue;
            }
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if n == '_' || n == '.' || n.is_alphanumeric() {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = &text[start..end];
            match self.get(name) {
                Some(value) => out.push_str(&value.to_string()),
                None => out.push_str(name),
            }
        }
        out
    }
}

/// Turn `slot` into an empty map unless it already is one.
fn coerce_map(slot: &mut Value) -> &mut BTreeMap<String, Value> {
    if !matches!(slot, Value::Map(_)) {
        *slot = Value::empty_map();
    }
    match slot {
        Value::Map(children) => children,
        _ => unreachable!("slot was just replaced with a map"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
