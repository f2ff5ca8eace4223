//! The render context passed explicitly to every component.

use reactk_props::{Value, ValueMap};

/// Key/value data components read while rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: ValueMap,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: ValueMap::new(),
        }
    }

    /// Reads a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Reads a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Writes a value, returning `true` if the context changed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        if self.values.get(&key) == Some(&value) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Removes a value, returning `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// All values.
    #[must_use]
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_changes() {
        let mut ctx = Context::new();
        assert!(ctx.set("title", "a"));
        assert!(!ctx.set("title", "a"));
        assert!(ctx.set("title", "b"));
        assert_eq!(ctx.get_str("title"), Some("b"));
        assert!(ctx.remove("title"));
        assert!(!ctx.remove("title"));
    }
}
