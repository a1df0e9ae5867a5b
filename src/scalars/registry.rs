/// Scalar Coercion Registry
///
/// Maps a field's declared value class (the type name used in the entity
/// model, e.g. `String`, `Long`, `JsonNode`) to the scalar binding that knows
/// how to coerce, encode and compare its values.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::coercing::{
    Coercing, CoercingError, ObjectCoercing, PassThroughCoercing, ScalarKind, StorageRepr,
};
use super::operators::FilterOperator;

/// Encode/decode/compare contract for one value type.
#[derive(Debug, Clone)]
pub struct ScalarBinding {
    /// GraphQL scalar name exposed in the schema
    pub name: String,
    pub description: String,
    pub kind: ScalarKind,
    pub storage: StorageRepr,
    /// Whether `CONTAINS` (whole-document structural equality) is offered
    pub supports_containment: bool,
    coercing: Arc<dyn Coercing>,
}

impl ScalarBinding {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ScalarKind,
        coercing: Arc<dyn Coercing>,
    ) -> Self {
        let storage = if kind == ScalarKind::Opaque {
            StorageRepr::EncodedText
        } else {
            StorageRepr::Native
        };
        ScalarBinding {
            name: name.into(),
            description: description.into(),
            kind,
            storage,
            supports_containment: false,
            coercing,
        }
    }

    /// Binding for an opaque payload type stored as JSON text.
    pub fn opaque(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, ScalarKind::Opaque, Arc::new(ObjectCoercing))
    }

    pub fn with_containment(mut self) -> Self {
        self.supports_containment = true;
        self
    }

    pub fn with_storage(mut self, storage: StorageRepr) -> Self {
        self.storage = storage;
        self
    }

    pub fn coercing(&self) -> &dyn Coercing {
        self.coercing.as_ref()
    }

    pub fn is_opaque(&self) -> bool {
        self.kind == ScalarKind::Opaque
    }

    /// Operators valid for fields bound to this scalar, in schema order.
    pub fn operators(&self) -> Vec<FilterOperator> {
        let mut ops = vec![FilterOperator::Eq, FilterOperator::Ne];
        if self.kind.is_ordered() {
            ops.extend([
                FilterOperator::Gt,
                FilterOperator::Ge,
                FilterOperator::Lt,
                FilterOperator::Le,
            ]);
        }
        if !self.is_opaque() {
            ops.extend([FilterOperator::In, FilterOperator::Nin]);
        }
        ops.extend([FilterOperator::IsNull, FilterOperator::NotNull]);
        if self.kind == ScalarKind::Text {
            ops.push(FilterOperator::Like);
        }
        if self.kind == ScalarKind::Text || self.is_opaque() {
            ops.push(FilterOperator::Locate);
        }
        if self.is_opaque() && self.supports_containment {
            ops.push(FilterOperator::Contains);
        }
        ops
    }

    pub fn supports(&self, op: FilterOperator) -> bool {
        self.operators().contains(&op)
    }
}

fn pass_through(name: &str, description: &str, kind: ScalarKind) -> Arc<ScalarBinding> {
    Arc::new(ScalarBinding::new(
        name,
        description,
        kind,
        Arc::new(PassThroughCoercing::new(name, kind)),
    ))
}

// Default bindings for ordinary scalar classes, keyed by value class
lazy_static::lazy_static! {
    static ref DEFAULT_BINDINGS: HashMap<&'static str, Arc<ScalarBinding>> = {
        let mut m = HashMap::new();

        let string = pass_through("String", "Built-in String", ScalarKind::Text);
        m.insert("String", string.clone());
        m.insert("Text", string);

        m.insert("ID", pass_through("ID", "Built-in ID", ScalarKind::Text));

        let int = pass_through("Int", "Built-in Int", ScalarKind::Integer);
        m.insert("Int", int.clone());
        m.insert("Integer", int.clone());
        m.insert("Short", int);

        m.insert("Long", pass_through("Long", "Long type", ScalarKind::Integer));

        let float = pass_through("Float", "Built-in Float", ScalarKind::Float);
        m.insert("Float", float.clone());
        m.insert("Double", float);

        m.insert(
            "BigDecimal",
            pass_through("BigDecimal", "Arbitrary precision decimal", ScalarKind::Float),
        );

        m.insert("Boolean", pass_through("Boolean", "Built-in Boolean", ScalarKind::Boolean));

        let date = pass_through("Date", "Calendar date (YYYY-MM-DD)", ScalarKind::Date);
        m.insert("Date", date.clone());
        m.insert("LocalDate", date);

        let datetime = pass_through("DateTime", "Date and time (RFC 3339)", ScalarKind::DateTime);
        m.insert("DateTime", datetime.clone());
        m.insert("Instant", datetime.clone());
        m.insert("LocalDateTime", datetime);

        m
    };

    static ref GLOBAL_SCALARS: RwLock<ScalarRegistry> = RwLock::new(ScalarRegistry::new());
}

/// Registry of scalar bindings keyed by value class.
///
/// Registrations override the built-in pass-through bindings; the last
/// registration for a class wins.
#[derive(Debug, Clone, Default)]
pub struct ScalarRegistry {
    bindings: HashMap<String, Arc<ScalarBinding>>,
}

impl ScalarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, value_class: impl Into<String>, binding: ScalarBinding) {
        let value_class = value_class.into();
        log::debug!("Registering scalar '{}' for class '{}'", binding.name, value_class);
        self.bindings.insert(value_class, Arc::new(binding));
    }

    pub fn resolve(&self, value_class: &str) -> Option<Arc<ScalarBinding>> {
        self.bindings
            .get(value_class)
            .or_else(|| DEFAULT_BINDINGS.get(value_class))
            .cloned()
    }

    /// Every distinct binding reachable through this registry, custom ones first.
    pub fn bindings(&self) -> Vec<Arc<ScalarBinding>> {
        let mut seen: Vec<Arc<ScalarBinding>> = Vec::new();
        let mut custom: Vec<(&str, &Arc<ScalarBinding>)> =
            self.bindings.iter().map(|(k, v)| (k.as_str(), v)).collect();
        custom.sort_by(|a, b| a.0.cmp(b.0));
        let mut defaults: Vec<(&str, &Arc<ScalarBinding>)> =
            DEFAULT_BINDINGS.iter().map(|(k, v)| (*k, v)).collect();
        defaults.sort_by(|a, b| a.0.cmp(b.0));
        for (_, binding) in custom.into_iter().chain(defaults) {
            if !seen.iter().any(|b| b.name == binding.name) {
                seen.push(binding.clone());
            }
        }
        seen
    }

    pub fn coerce_literal(
        &self,
        binding: &ScalarBinding,
        literal: &Value,
    ) -> Result<Value, CoercingError> {
        binding.coercing().parse_literal(literal)
    }

    pub fn coerce_variable(
        &self,
        binding: &ScalarBinding,
        input: &Value,
    ) -> Result<Value, CoercingError> {
        binding.coercing().parse_value(input)
    }

    /// Decode a stored column value for output.
    pub fn serialize(&self, binding: &ScalarBinding, stored: &Value) -> Result<Value, CoercingError> {
        if stored.is_null() {
            return Ok(Value::Null);
        }
        binding.coercing().serialize(stored)
    }
}

/// Register a binding in the process-wide registry.
pub fn register(value_class: impl Into<String>, binding: ScalarBinding) {
    let mut registry = GLOBAL_SCALARS.write().unwrap_or_else(|e| e.into_inner());
    registry.register(value_class, binding);
}

/// Snapshot of the process-wide registry, taken when a schema is built.
pub fn global_registry() -> ScalarRegistry {
    GLOBAL_SCALARS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}
