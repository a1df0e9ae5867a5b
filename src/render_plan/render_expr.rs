use serde::{Deserialize, Serialize};

/// Dialect-neutral predicate and projection expressions of a compiled query.
///
/// Store-specific spellings (text casts, substring position, structural
/// comparison) stay symbolic here so each store can render or evaluate them
/// its own way.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum RenderExpr {
    Literal(Literal),

    PropertyAccessExp(PropertyAccess),

    /// Named bind parameter, value held in `CompiledQuery::parameters`
    Parameter(String),

    List(Vec<RenderExpr>),

    /// Textual projection of a stored value
    ToText(Box<RenderExpr>),

    /// 1-based position of `needle` inside `haystack`, 0 when absent
    Locate(Locate),

    /// Whole-document equality of two encoded structures
    StructuralEquals(StructuralEquals),

    OperatorApplicationExp(OperatorApplication),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TableAlias(pub String);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub table_alias: TableAlias,
    pub column: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Locate {
    pub needle: Box<RenderExpr>,
    pub haystack: Box<RenderExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StructuralEquals {
    pub left: Box<RenderExpr>,
    pub right: Box<RenderExpr>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Like,
    And,
    Or,
    In,
    NotIn,
    Not,
    IsNull,
    IsNotNull,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<RenderExpr>,
}

impl RenderExpr {
    pub fn column(table_alias: impl Into<String>, column: impl Into<String>) -> Self {
        RenderExpr::PropertyAccessExp(PropertyAccess {
            table_alias: TableAlias(table_alias.into()),
            column: column.into(),
        })
    }

    pub fn apply(operator: Operator, operands: Vec<RenderExpr>) -> Self {
        RenderExpr::OperatorApplicationExp(OperatorApplication { operator, operands })
    }

    pub fn binary(operator: Operator, left: RenderExpr, right: RenderExpr) -> Self {
        Self::apply(operator, vec![left, right])
    }

    pub fn to_text(self) -> Self {
        RenderExpr::ToText(Box::new(self))
    }

    /// Conjunction; a single operand is returned unwrapped and an empty one is `true`.
    pub fn and(mut operands: Vec<RenderExpr>) -> Self {
        match operands.len() {
            0 => RenderExpr::Literal(Literal::Boolean(true)),
            1 => operands.remove(0),
            _ => Self::apply(Operator::And, operands),
        }
    }

    /// Disjunction; a single operand is returned unwrapped and an empty one is `false`.
    pub fn or(mut operands: Vec<RenderExpr>) -> Self {
        match operands.len() {
            0 => RenderExpr::Literal(Literal::Boolean(false)),
            1 => operands.remove(0),
            _ => Self::apply(Operator::Or, operands),
        }
    }

    pub fn not(operand: RenderExpr) -> Self {
        Self::apply(Operator::Not, vec![operand])
    }

    /// Parameter names referenced by this expression, in occurrence order
    pub fn parameters(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            RenderExpr::Parameter(name) => names.push(name),
            RenderExpr::List(items) => items.iter().for_each(|i| i.collect_parameters(names)),
            RenderExpr::ToText(inner) => inner.collect_parameters(names),
            RenderExpr::Locate(locate) => {
                locate.needle.collect_parameters(names);
                locate.haystack.collect_parameters(names);
            }
            RenderExpr::StructuralEquals(eq) => {
                eq.left.collect_parameters(names);
                eq.right.collect_parameters(names);
            }
            RenderExpr::OperatorApplicationExp(op) => {
                op.operands.iter().for_each(|o| o.collect_parameters(names))
            }
            RenderExpr::Literal(_) | RenderExpr::PropertyAccessExp(_) => {}
        }
    }
}
