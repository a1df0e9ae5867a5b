use serde::{Deserialize, Serialize};

/// Semantic type of an entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Plain column holding a value of the named value class
    Scalar { value_class: String },
    /// Many-to-one / one-to-one: `join_column` on this table references the target's id
    ToOne { target: String, join_column: String },
    /// One-to-many: `mapped_by` on the target table references this entity's id
    ToMany { target: String, mapped_by: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Store column; for to-one associations this is the join column
    pub column: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn is_association(&self) -> bool {
        !matches!(self.kind, FieldKind::Scalar { .. })
    }

    pub fn value_class(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Scalar { value_class } => Some(value_class),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ToOne { target, .. } | FieldKind::ToMany { target, .. } => Some(target),
            FieldKind::Scalar { .. } => None,
        }
    }
}

/// Relational mapping of one entity type.
///
/// Fields keep declaration order; that order is the default projection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    /// Root query field name; derived from `name` when absent
    pub plural: Option<String>,
    pub database: Option<String>,
    pub table: String,
    pub id_field: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        EntityDescriptor {
            name: name.into(),
            plural: None,
            database: None,
            table: table.into(),
            id_field: None,
            fields: Vec::new(),
        }
    }

    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Declare a scalar field and mark it as the identifier.
    pub fn id(mut self, name: impl Into<String>, value_class: impl Into<String>) -> Self {
        let name = name.into();
        self.id_field = Some(name.clone());
        self.scalar(name, value_class)
    }

    /// Declare a scalar field stored in the snake_case column of the same name.
    pub fn scalar(self, name: impl Into<String>, value_class: impl Into<String>) -> Self {
        let name = name.into();
        let column = to_snake_case(&name);
        self.scalar_column(name, value_class, column)
    }

    pub fn scalar_column(
        mut self,
        name: impl Into<String>,
        value_class: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            column: column.into(),
            kind: FieldKind::Scalar {
                value_class: value_class.into(),
            },
        });
        self
    }

    pub fn to_one(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        join_column: impl Into<String>,
    ) -> Self {
        let join_column = join_column.into();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            column: join_column.clone(),
            kind: FieldKind::ToOne {
                target: target.into(),
                join_column,
            },
        });
        self
    }

    pub fn to_many(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        let mapped_by = mapped_by.into();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            column: mapped_by.clone(),
            kind: FieldKind::ToMany {
                target: target.into(),
                mapped_by,
            },
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn id_descriptor(&self) -> Option<&FieldDescriptor> {
        self.id_field.as_deref().and_then(|id| self.field(id))
    }

    pub fn root_name(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| pluralize(&self.name))
    }

    /// Table reference including the database prefix when configured
    pub fn qualified_table(&self) -> String {
        match &self.database {
            Some(db) if !db.is_empty() => format!("{}.{}", db, self.table),
            _ => self.table.clone(),
        }
    }
}

/// English plural used for root field names (`Book` -> `Books`, `JsonEntity` -> `JsonEntities`)
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with('y')
        && !lower.ends_with("ay")
        && !lower.ends_with("ey")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        format!("{}ies", &name[..name.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{}es", name)
    } else {
        format!("{}s", name)
    }
}

pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
