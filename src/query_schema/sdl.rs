//! SDL rendering of the query schema, served by `GET /schema`.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::scalars::FilterOperator;

use super::types::{CriteriaType, OutputType, QuerySchema};

const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

impl QuerySchema {
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();

        // Custom scalars and their criteria inputs, deduplicated by scalar name
        let mut scalar_criteria: BTreeMap<String, (String, Vec<FilterOperator>)> = BTreeMap::new();
        for entity in &self.entities {
            for field in entity.scalar_fields() {
                if let (Some(binding), CriteriaType::Scalar { type_name, operators }) =
                    (&field.binding, &field.criteria)
                {
                    scalar_criteria
                        .entry(type_name.clone())
                        .or_insert_with(|| (binding.name.clone(), operators.clone()));
                }
            }
        }

        let mut custom_scalars: Vec<&str> = scalar_criteria
            .values()
            .map(|(scalar, _)| scalar.as_str())
            .filter(|s| !BUILT_IN_SCALARS.contains(s))
            .collect();
        custom_scalars.dedup();
        for scalar in custom_scalars {
            if let Some(binding) = self
                .registry
                .bindings()
                .into_iter()
                .find(|b| b.name == scalar)
            {
                let _ = writeln!(out, "\"{}\"", binding.description);
            }
            let _ = writeln!(out, "scalar {}\n", scalar);
        }

        let _ = writeln!(out, "type Query {{");
        for entity in &self.entities {
            let _ = writeln!(
                out,
                "  {}(where: {}): {}",
                entity.root_name, entity.criteria_type_name, entity.root_name
            );
        }
        let _ = writeln!(out, "}}\n");

        for entity in &self.entities {
            let _ = writeln!(out, "type {} {{", entity.root_name);
            let _ = writeln!(out, "  select: [{}]", entity.name());
            let _ = writeln!(out, "}}\n");

            let _ = writeln!(out, "type {} {{", entity.name());
            for field in &entity.fields {
                let ty = match &field.output {
                    OutputType::Scalar(name) => name.clone(),
                    OutputType::Object(name) => name.clone(),
                    OutputType::List(name) => format!("[{}]", name),
                };
                let args = if matches!(field.output, OutputType::Scalar(_)) {
                    "(orderBy: OrderBy)"
                } else {
                    ""
                };
                let _ = writeln!(out, "  {}{}: {}", field.name(), args, ty);
            }
            let _ = writeln!(out, "}}\n");

            let criteria = &entity.criteria_type_name;
            let _ = writeln!(out, "input {} {{", criteria);
            let _ = writeln!(out, "  AND: [{}!]", criteria);
            let _ = writeln!(out, "  OR: [{}!]", criteria);
            let _ = writeln!(out, "  NOT: {}", criteria);
            for field in &entity.fields {
                let type_name = match &field.criteria {
                    CriteriaType::Scalar { type_name, .. } => type_name,
                    CriteriaType::Association { type_name } => type_name,
                };
                let _ = writeln!(out, "  {}: {}", field.name(), type_name);
            }
            let _ = writeln!(out, "}}\n");
        }

        for (criteria, (scalar, operators)) in &scalar_criteria {
            let _ = writeln!(out, "input {} {{", criteria);
            for op in operators {
                let operand = if op.takes_list() {
                    format!("[{}]", scalar)
                } else if op.takes_flag() {
                    "Boolean".to_string()
                } else if *op == FilterOperator::Like {
                    "String".to_string()
                } else {
                    scalar.clone()
                };
                let _ = writeln!(out, "  {}: {}", op, operand);
            }
            let _ = writeln!(out, "}}\n");
        }

        let _ = writeln!(out, "enum OrderBy {{\n  ASC\n  DESC\n}}");
        out
    }
}
