use std::mem;

use super::{pair_key, GraphBuilder};
use crate::error::GraphConstructionError;
use crate::types::{field_id, table_id, JoinTarget, Link, Node};

impl GraphBuilder<'_> {
    /// One node per real table, then one node per alias with its
    /// `alias-table` link.
    pub(super) fn emit_table_nodes(&mut self) {
        let tables: Vec<String> = self
            .tables
            .iter()
            .filter(|table| !self.aliases.contains_key(*table))
            .cloned()
            .collect();
        for table in tables {
            self.push_node(Node::table(table.clone(), table));
        }

        let aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(alias, real)| (alias.clone(), real.clone()))
            .collect();
        for (alias, real) in aliases {
            self.push_node(Node::alias_table(&alias, &real));
            self.links
                .push(Link::alias_table(table_id(&alias), table_id(&real)));
        }
    }

    /// One node per (real table, field) pair, linked to its table.
    pub(super) fn emit_field_nodes(&mut self) {
        let owned: Vec<(String, String)> = self
            .table_fields
            .iter()
            .filter(|(table, _)| self.tables.contains(*table) && !self.aliases.contains_key(*table))
            .flat_map(|(table, fields)| fields.iter().map(move |f| (table.clone(), f.clone())))
            .collect();

        for (table, field) in owned {
            let id = field_id(&table, &field);
            let join_target = self.join_target(&table, &field);
            let display = self
                .field_display
                .get(&id)
                .cloned()
                .unwrap_or_else(|| field.clone());

            let node = Node::field(&table, &field, display)
                .with_result(self.result_fields.contains(&field))
                .with_join_field(join_target.is_some())
                .with_join_target(join_target);
            if self.push_node(node) {
                self.links.push(Link::field_table(id, table_id(&table)));
            }
        }
    }

    /// A `table-join` and a `field-join` link per distinct table pair.
    pub(super) fn emit_join_links(&mut self) -> Result<(), GraphConstructionError> {
        for relation in mem::take(&mut self.relations) {
            let source = table_id(&relation.left_real);
            let target = table_id(&relation.right_real);
            for (table, id) in [(&relation.left_real, &source), (&relation.right_real, &target)] {
                if !self.node_ids.contains(id) {
                    return Err(GraphConstructionError::UnanchoredJoin {
                        table: table.clone(),
                        condition: relation.condition.clone(),
                    });
                }
            }

            if !self
                .processed_pairs
                .insert(pair_key(&relation.left_real, &relation.right_real))
            {
                continue;
            }

            self.links.push(Link::table_join(
                source,
                target,
                relation.condition.clone(),
                relation.confidence,
            ));

            let source_field = self.ensure_join_field(&relation.left_real, &relation.left_field);
            let target_field = self.ensure_join_field(&relation.right_real, &relation.right_field);
            self.links.push(Link::field_join(
                source_field,
                target_field,
                relation.condition,
                relation.confidence,
            ));
        }
        Ok(())
    }

    /// Join links between alias nodes, labelled as written.
    pub(super) fn emit_alias_joins(&mut self) {
        for endpoint in mem::take(&mut self.endpoints) {
            let (source, target) = match (&endpoint.table_alias, &endpoint.target_table_alias) {
                (Some(alias), Some(target_alias)) => (alias, target_alias),
                (Some(alias), None) => (alias, &endpoint.target_table),
                (None, Some(target_alias)) => (&endpoint.table, target_alias),
                (None, None) => continue,
            };
            if source == target || !self.processed_pairs.insert(pair_key(source, target)) {
                continue;
            }

            let condition = format!(
                "{source}.{} = {target}.{}",
                endpoint.field, endpoint.target_field
            );
            self.links
                .push(Link::alias_join(table_id(source), table_id(target), condition));
        }
    }

    /// Id of a join key's field node, creating the node if the key was never
    /// projected or filtered on.
    fn ensure_join_field(&mut self, table: &str, field: &str) -> String {
        let id = field_id(table, field);
        if self.node_ids.contains(&id) {
            return id;
        }

        if let Some(fields) = self.table_fields.get_mut(table) {
            fields.insert(field.to_string());
        }
        let node = Node::field(table, field, field)
            .with_result(self.result_fields.contains(field))
            .with_join_field(true)
            .with_join_target(self.join_target(table, field));
        self.push_node(node);
        self.links.push(Link::field_table(id.clone(), table_id(table)));
        id
    }

    fn join_target(&self, table: &str, field: &str) -> Option<JoinTarget> {
        self.endpoints
            .iter()
            .find(|e| e.table == table && e.field == field)
            .cloned()
    }

    /// Adds a node unless its id is taken. Returns whether it was added.
    fn push_node(&mut self, node: Node) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }
}
