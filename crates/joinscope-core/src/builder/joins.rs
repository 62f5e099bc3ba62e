use super::{GraphBuilder, JoinRelation};
use crate::types::{field_id, JoinConfidence, JoinTarget};
#[cfg(feature = "tracing")]
use tracing::debug;

impl GraphBuilder<'_> {
    /// Turns every JOIN with two qualified column sides into a relation.
    ///
    /// Qualifiers resolve through the alias map; a qualifier that names
    /// neither a table nor an alias is registered as a table so the relation
    /// stays anchored.
    pub(super) fn extract_relations(&mut self) {
        let statement = self.statement;

        for join in &statement.joins {
            let (Some(left), Some(right)) = (&join.on_left, &join.on_right) else {
                continue;
            };
            let (Some(left_table), Some(right_table)) = (
                qualifier(left.table.as_deref()),
                qualifier(right.table.as_deref()),
            ) else {
                continue;
            };
            let (left_field, right_field) = (left.column.trim(), right.column.trim());
            if left_field.is_empty() || right_field.is_empty() {
                continue;
            }

            for table in [left_table, right_table] {
                if self.is_unknown(table) {
                    self.register_table(table);
                }
            }

            let left_real = self.resolve(left_table);
            let right_real = self.resolve(right_table);

            self.add_field(left_table, &left_real, left_field);
            self.add_field(right_table, &right_real, right_field);

            for (written, real, field) in [
                (left_table, &left_real, left_field),
                (right_table, &right_real, right_field),
            ] {
                if written != real.as_str() {
                    self.field_display
                        .insert(field_id(real, field), format!("{field} ({real}.{field})"));
                }
            }

            let left_alias = (left_table != left_real).then(|| left_table.to_string());
            let right_alias = (right_table != right_real).then(|| right_table.to_string());

            self.endpoints.push(JoinTarget {
                table: left_real.clone(),
                field: left_field.to_string(),
                table_alias: left_alias.clone(),
                target_table: right_real.clone(),
                target_field: right_field.to_string(),
                target_table_alias: right_alias.clone(),
                is_source_field: true,
            });
            self.endpoints.push(JoinTarget {
                table: right_real.clone(),
                field: right_field.to_string(),
                table_alias: right_alias,
                target_table: left_real.clone(),
                target_field: left_field.to_string(),
                target_table_alias: left_alias,
                is_source_field: false,
            });

            self.relations.push(JoinRelation {
                left_field: left_field.to_string(),
                right_field: right_field.to_string(),
                left_real,
                right_real,
                condition: format!("{left_table}.{left_field} = {right_table}.{right_field}"),
                confidence: JoinConfidence::Parsed,
            });
        }
    }

    /// Chains consecutive real tables with `<left>.id = <right>.<left>_id`.
    ///
    /// The key columns are placeholders; the relations are tagged
    /// [`JoinConfidence::Inferred`].
    pub(super) fn infer_relations(&mut self) {
        let tables: Vec<String> = self.tables.iter().cloned().collect();

        for pair in tables.windows(2) {
            let [left, right] = pair else {
                continue;
            };
            if self.aliases.contains_key(left) || self.aliases.contains_key(right) {
                continue;
            }

            let right_field = format!("{left}_id");

            #[cfg(feature = "tracing")]
            debug!(left = %left, right = %right, "inferring join between consecutive tables");

            self.endpoints.push(JoinTarget {
                table: left.clone(),
                field: "id".to_string(),
                table_alias: None,
                target_table: right.clone(),
                target_field: right_field.clone(),
                target_table_alias: None,
                is_source_field: true,
            });
            self.endpoints.push(JoinTarget {
                table: right.clone(),
                field: right_field.clone(),
                table_alias: None,
                target_table: left.clone(),
                target_field: "id".to_string(),
                target_table_alias: None,
                is_source_field: false,
            });

            self.relations.push(JoinRelation {
                left_field: "id".to_string(),
                condition: format!("{left}.id = {right}.{right_field}"),
                right_field,
                left_real: left.clone(),
                right_real: right.clone(),
                confidence: JoinConfidence::Inferred,
            });
        }
    }
}

fn qualifier(table: Option<&str>) -> Option<&str> {
    table.map(str::trim).filter(|t| !t.is_empty())
}
