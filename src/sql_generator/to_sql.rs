use crate::render_plan::render_expr::{
    Literal, Locate, Operator, OperatorApplication, PropertyAccess, RenderExpr, StructuralEquals,
};
use crate::render_plan::{CompiledQuery, Join, JoinType, OrderByItem, OrderByOrder, SelectItem};

use super::parameter_substitution::escape_string;

pub trait ToSql {
    fn to_sql(&self) -> String;
}

impl ToSql for Literal {
    fn to_sql(&self) -> String {
        match self {
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::String(s) => format!("'{}'", escape_string(s)),
            Literal::Null => "NULL".to_string(),
        }
    }
}

impl ToSql for PropertyAccess {
    fn to_sql(&self) -> String {
        format!("{}.{}", self.table_alias.0, self.column)
    }
}

impl ToSql for Locate {
    fn to_sql(&self) -> String {
        format!("position({}, {})", self.haystack.to_sql(), self.needle.to_sql())
    }
}

impl ToSql for StructuralEquals {
    fn to_sql(&self) -> String {
        // JSONExtractRaw with no path normalizes the whole document
        format!(
            "JSONExtractRaw({}) = JSONExtractRaw({})",
            self.left.to_sql(),
            self.right.to_sql()
        )
    }
}

impl ToSql for OperatorApplication {
    fn to_sql(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(|o| o.to_sql()).collect();
        let binary = |sym: &str| match operands.as_slice() {
            [left, right] => format!("{} {} {}", left, sym, right),
            _ => operands.join(&format!(" {} ", sym)),
        };

        match self.operator {
            Operator::Equal => binary("="),
            Operator::NotEqual => binary("<>"),
            Operator::LessThan => binary("<"),
            Operator::GreaterThan => binary(">"),
            Operator::LessThanEqual => binary("<="),
            Operator::GreaterThanEqual => binary(">="),
            Operator::Like => binary("LIKE"),
            Operator::In => binary("IN"),
            Operator::NotIn => binary("NOT IN"),
            Operator::And => format!("({})", operands.join(" AND ")),
            Operator::Or => format!("({})", operands.join(" OR ")),
            Operator::Not => format!("NOT ({})", operands.join(", ")),
            Operator::IsNull => format!("{} IS NULL", operands.join(", ")),
            Operator::IsNotNull => format!("{} IS NOT NULL", operands.join(", ")),
        }
    }
}

impl ToSql for RenderExpr {
    fn to_sql(&self) -> String {
        match self {
            RenderExpr::Literal(lit) => lit.to_sql(),
            RenderExpr::PropertyAccessExp(pa) => pa.to_sql(),
            RenderExpr::Parameter(name) => format!("${}", name),
            RenderExpr::List(items) => {
                let items: Vec<String> = items.iter().map(|i| i.to_sql()).collect();
                format!("({})", items.join(", "))
            }
            RenderExpr::ToText(inner) => format!("toString({})", inner.to_sql()),
            RenderExpr::Locate(locate) => locate.to_sql(),
            RenderExpr::StructuralEquals(eq) => eq.to_sql(),
            RenderExpr::OperatorApplicationExp(op) => op.to_sql(),
        }
    }
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        format!("{} AS \"{}\"", self.expression.to_sql(), self.col_alias)
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let keyword = match self.join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        };
        format!(
            "{} {} AS {} ON {}\n",
            keyword,
            self.table_name,
            self.table_alias,
            self.joining_on.to_sql()
        )
    }
}

impl ToSql for OrderByItem {
    fn to_sql(&self) -> String {
        let order = match self.order {
            OrderByOrder::Asc => "ASC",
            OrderByOrder::Desc => "DESC",
        };
        format!("{} {}", self.expression.to_sql(), order)
    }
}

/// Render a compiled query to ClickHouse SQL with `$pN` placeholders.
impl ToSql for CompiledQuery {
    fn to_sql(&self) -> String {
        let mut sql = String::new();

        sql.push_str("SELECT \n");
        for (i, item) in self.select.iter().enumerate() {
            sql.push_str("      ");
            sql.push_str(&item.to_sql());
            if i + 1 < self.select.len() {
                sql.push_str(", ");
            }
            sql.push('\n');
        }

        sql.push_str(&format!(
            "FROM {} AS {}\n",
            self.from.table_name, self.from.table_alias
        ));

        for join in &self.joins {
            sql.push_str(&join.to_sql());
        }

        if let Some(filter) = &self.filter {
            sql.push_str(&format!("WHERE {}\n", filter.to_sql()));
        }

        if !self.order_by.is_empty() {
            let items: Vec<String> = self.order_by.iter().map(|o| o.to_sql()).collect();
            sql.push_str(&format!("ORDER BY {}\n", items.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!("LIMIT {}\n", limit));
        }

        sql
    }
}
