//! Host capability: access to a resource's configuration and identity.
//!
//! The plugin host owns resource state between invocations. The engine only
//! needs typed getters, a change query and the persisted identifier, so
//! that is all [`ResourceData`] exposes.

use ibx_common::{IpamError, IpamResult, ObjectRef};
use serde_json::{Map, Value};

use crate::schema::Schema;

/// Configuration and identity of one resource instance.
pub trait ResourceData {
    /// String attribute, or an empty string when unset.
    fn get_str(&self, key: &str) -> String;

    /// Integer attribute, or zero when unset.
    fn get_int(&self, key: &str) -> i64;

    /// Attribute value if it is set to something other than its zero value.
    fn get_ok(&self, key: &str) -> Option<&Value>;

    /// Whether the attribute differs from the prior state.
    fn has_change(&self, key: &str) -> bool;

    /// The persisted identifier, if any.
    fn id(&self) -> Option<&ObjectRef>;

    /// Persist an identifier.
    fn set_id(&mut self, id: ObjectRef);

    /// Forget the persisted identifier.
    fn clear_id(&mut self);
}

/// Map-backed [`ResourceData`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    attributes: Map<String, Value>,
    prior: Option<Map<String, Value>>,
    id: Option<ObjectRef>,
}

impl ResourceState {
    /// Build state from a configuration object, checked against `schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is not an object or does not satisfy
    /// the schema.
    pub fn new(schema: &Schema, config: &Value) -> IpamResult<Self> {
        let object = config
            .as_object()
            .ok_or_else(|| IpamError::config("resource configuration must be an object"))?;
        Ok(Self {
            attributes: schema.apply(object)?,
            prior: None,
            id: None,
        })
    }

    /// Attach a persisted identifier.
    #[must_use]
    pub fn with_id(mut self, id: ObjectRef) -> Self {
        self.id = Some(id);
        self
    }

    /// Planned state for an update: `config` becomes current, this state's
    /// attributes become the prior values and the identifier carries over.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not satisfy the schema.
    pub fn planned(&self, schema: &Schema, config: &Value) -> IpamResult<Self> {
        let mut next = Self::new(schema, config)?;
        next.prior = Some(self.attributes.clone());
        next.id.clone_from(&self.id);
        Ok(next)
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl ResourceData for ResourceState {
    fn get_str(&self, key: &str) -> String {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn get_int(&self, key: &str) -> i64 {
        self.attributes
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    fn get_ok(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !is_zero(v))
    }

    fn has_change(&self, key: &str) -> bool {
        self.prior
            .as_ref()
            .is_some_and(|prior| prior.get(key) != self.attributes.get(key))
    }

    fn id(&self) -> Option<&ObjectRef> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ObjectRef) {
        self.id = Some(id);
    }

    fn clear_id(&mut self) {
        self.id = None;
    }
}
