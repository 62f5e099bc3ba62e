use super::GraphBuilder;
use crate::types::{field_id, ColumnRef};

impl GraphBuilder<'_> {
    /// Attributes projected columns and the WHERE column to tables.
    ///
    /// Qualified columns resolve through the alias map; unqualified columns
    /// are attributed only when the statement has a single table. Columns
    /// whose qualifier names no known table are left out of the graph.
    pub(super) fn attribute_fields(&mut self) {
        let statement = self.statement;

        for projected in &statement.projected_columns {
            let field = projected.column.trim();
            if field.is_empty() {
                continue;
            }
            self.result_fields.insert(field.to_string());

            let column_alias = projected
                .alias
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty());

            let Some((qualifier, real)) = self.owner_of(&projected.column_ref()) else {
                continue;
            };
            self.add_field(&qualifier, &real, field);

            let display = match (column_alias, qualifier.as_str()) {
                (Some(alias), _) if projected.table.is_some() => {
                    format!("{alias} ({qualifier}.{field})")
                }
                (Some(alias), _) => format!("{alias} ({field})"),
                (None, written) if written != real => {
                    format!("{written}.{field} ({real}.{field})")
                }
                (None, _) => field.to_string(),
            };
            self.field_display.insert(field_id(&real, field), display);
        }

        if let Some(condition) = &statement.where_condition {
            let field = condition.left.column.trim();
            if !field.is_empty() {
                if let Some((qualifier, real)) = self.owner_of(&condition.left) {
                    self.add_field(&qualifier, &real, field);
                }
            }
        }
    }

    /// Folds every alias's field set into its real table's set.
    pub(super) fn merge_alias_fields(&mut self) {
        let aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(alias, real)| (alias.clone(), real.clone()))
            .collect();

        for (alias, real) in aliases {
            let fields = self.table_fields.get(&alias).cloned().unwrap_or_default();
            if let Some(real_fields) = self.table_fields.get_mut(&real) {
                real_fields.extend(fields);
            }
        }
    }

    /// `(qualifier as written, real table)` owning a column, if any.
    fn owner_of(&self, column: &ColumnRef) -> Option<(String, String)> {
        match column.table.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(qualifier) => {
                let real = self.resolve(qualifier);
                self.tables
                    .contains(&real)
                    .then(|| (qualifier.to_string(), real))
            }
            None if self.tables.len() == 1 => {
                let only = self.tables.first()?.clone();
                Some((only.clone(), only))
            }
            None => None,
        }
    }
}
