use std::fmt;

/// A parsed query document. Only read (`query`) operations are accepted.
#[derive(Debug, PartialEq, Clone)]
pub struct Document<'a> {
    pub operation: OperationDefinition<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OperationDefinition<'a> {
    pub name: Option<&'a str>,
    pub variable_definitions: Vec<VariableDefinition<'a>>,
    pub selection_set: Vec<Field<'a>>,
}

/// `$name: Type = default`
#[derive(Debug, PartialEq, Clone)]
pub struct VariableDefinition<'a> {
    pub name: &'a str,
    pub var_type: TypeRef<'a>,
    pub default_value: Option<Value<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TypeRef<'a> {
    Named(&'a str),
    List(Box<TypeRef<'a>>),
    NonNull(Box<TypeRef<'a>>),
}

impl TypeRef<'_> {
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Field<'a> {
    pub alias: Option<&'a str>,
    pub name: &'a str,
    pub arguments: Vec<(&'a str, Value<'a>)>,
    pub selection_set: Vec<Field<'a>>,
}

impl<'a> Field<'a> {
    /// Key under which the field's value is returned
    pub fn response_key(&self) -> &'a str {
        self.alias.unwrap_or(self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value<'a>> {
        self.arguments
            .iter()
            .find(|(arg, _)| *arg == name)
            .map(|(_, value)| value)
    }
}

/// Input values. Strings are owned because escape sequences are decoded.
#[derive(Debug, PartialEq, Clone)]
pub enum Value<'a> {
    Variable(&'a str),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(&'a str),
    List(Vec<Value<'a>>),
    Object(Vec<(&'a str, Value<'a>)>),
}

impl<'a> Value<'a> {
    pub fn as_object(&self) -> Option<&[(&'a str, Value<'a>)]> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }
}
