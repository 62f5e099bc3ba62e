use super::GraphBuilder;
use crate::error::GraphConstructionError;

impl GraphBuilder<'_> {
    /// Registers every real table, then every alias.
    ///
    /// Aliases are bound after all real tables are known so that an alias
    /// which collides with a real table name can be dropped; the first
    /// binding of an alias wins.
    pub(super) fn register_tables(&mut self) -> Result<(), GraphConstructionError> {
        let statement = self.statement;

        for (position, table) in statement.tables.iter().enumerate() {
            let name = table.name.trim();
            if name.is_empty() {
                return Err(GraphConstructionError::EmptyTableName(position));
            }
            self.register_table(name);
        }

        for table in &statement.tables {
            let name = table.name.trim();
            let Some(alias) = table.alias.as_deref().map(str::trim) else {
                continue;
            };
            if alias.is_empty() || alias == name || self.tables.contains(alias) {
                continue;
            }
            if !self.aliases.contains_key(alias) {
                self.aliases.insert(alias.to_string(), name.to_string());
                self.table_fields.entry(alias.to_string()).or_default();
            }
        }

        Ok(())
    }

    pub(super) fn register_table(&mut self, name: &str) {
        self.tables.insert(name.to_string());
        self.table_fields.entry(name.to_string()).or_default();
    }

    /// True for names that are neither a registered table nor an alias.
    pub(super) fn is_unknown(&self, name: &str) -> bool {
        !self.tables.contains(name) && !self.aliases.contains_key(name)
    }
}
