//! Response types: the relationship graph handed to a renderer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::statement::CanonicalStatement;
use crate::error::GraphConstructionError;

/// Label of the table node emitted when a statement yields nothing drawable.
pub const PLACEHOLDER_TABLE: &str = "Query Result";
/// Label of the field node emitted when a statement yields nothing drawable.
pub const PLACEHOLDER_FIELD: &str = "data";
/// Label of the table node of a diagnostic graph.
pub const DIAGNOSTIC_TABLE: &str = "Parse Error";
/// Id suffix of the field node of a diagnostic graph.
pub const DIAGNOSTIC_FIELD: &str = "Error Message";

/// Everything produced for one statement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphResult {
    /// The relationship graph
    pub graph: Graph,

    /// The normalized statement the graph was built from
    pub statement: CanonicalStatement,

    /// Which parser produced the statement
    pub parser_used: ParserKind,
}

/// Which parser slot produced the raw AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ParserKind {
    /// An injected parser function
    GrammarFn,
    /// An injected (or the built-in sqlparser) grammar parser object
    Grammar,
    /// The built-in pattern-matching parser
    Fallback,
}

/// Nodes and links of a table/field relationship graph.
///
/// Identity, type, and the node/link sets are fixed once returned; renderers
/// may attach layout data of their own but must not edit these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,

    /// True when construction failed and this is a diagnostic stand-in
    #[serde(default)]
    pub diagnostic: bool,

    /// Alias to table bindings declared by the statement
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

impl Graph {
    /// A one-table, one-field graph carrying an error description.
    pub fn diagnostic(message: impl Into<String>) -> Self {
        let message = message.into();
        let table_id = table_id(DIAGNOSTIC_TABLE);
        let field_id = format!("field:{DIAGNOSTIC_FIELD}");

        let table = Node::table(DIAGNOSTIC_TABLE, DIAGNOSTIC_TABLE);
        let mut field = Node::field(DIAGNOSTIC_TABLE, DIAGNOSTIC_FIELD, message.clone());
        field.id = field_id.clone();
        field.original_name = message;
        field.is_result = Some(true);

        Self {
            nodes: vec![table, field],
            links: vec![Link::field_table(field_id, table_id)],
            diagnostic: true,
            aliases: BTreeMap::new(),
        }
    }

    /// The stand-in emitted when a statement names no tables or fields.
    pub fn placeholder() -> Self {
        let table_id = table_id(PLACEHOLDER_TABLE);
        let field_id = format!("field:{PLACEHOLDER_FIELD}");

        let table = Node::table(PLACEHOLDER_TABLE, PLACEHOLDER_TABLE);
        let mut field = Node::field(PLACEHOLDER_TABLE, PLACEHOLDER_FIELD, PLACEHOLDER_FIELD);
        field.id = field_id.clone();
        field.is_result = Some(true);

        Self {
            nodes: vec![table, field],
            links: vec![Link::field_table(field_id, table_id)],
            diagnostic: false,
            aliases: BTreeMap::new(),
        }
    }

    /// Whether this graph stands in for a failed construction.
    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic
    }

    /// Whether this is the empty-result placeholder.
    pub fn is_placeholder(&self) -> bool {
        !self.diagnostic && self.node(&table_id(PLACEHOLDER_TABLE)).is_some() && self.nodes.len() == 2
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn table_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.node_type == NodeType::Table)
    }

    pub fn field_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.node_type == NodeType::Field)
    }

    pub fn links_of_type(&self, link_type: LinkType) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.link_type == link_type)
    }

    /// Finds a link of the given type between two nodes, in either direction.
    pub fn link_between(&self, link_type: LinkType, a: &str, b: &str) -> Option<&Link> {
        self.links_of_type(link_type).find(|l| {
            (l.source == a && l.target == b) || (l.source == b && l.target == a)
        })
    }

    /// Checks structural consistency.
    ///
    /// Every link endpoint must name an existing node, and every field node
    /// must be attached to exactly one existing table node.
    pub fn validate(&self) -> Result<(), GraphConstructionError> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();

        for link in &self.links {
            if !ids.contains(link.source.as_str()) || !ids.contains(link.target.as_str()) {
                return Err(GraphConstructionError::DanglingLink {
                    kind: link.link_type.as_str().to_string(),
                    source_id: link.source.clone(),
                    target_id: link.target.clone(),
                });
            }
        }

        let mut ownership: HashMap<&str, usize> = HashMap::new();
        for link in self.links_of_type(LinkType::FieldTable) {
            *ownership.entry(link.source.as_str()).or_default() += 1;
        }

        for field in self.field_nodes() {
            let owner = field.table.as_deref().unwrap_or_default();
            let owned_once = ownership.get(field.id.as_str()) == Some(&1);
            if !owned_once || !ids.contains(table_id(owner).as_str()) {
                return Err(GraphConstructionError::OrphanField {
                    field: field.id.clone(),
                    table: owner.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Node id of a table (or alias) node.
pub fn table_id(name: &str) -> String {
    format!("table:{name}")
}

/// Node id of a field node.
pub fn field_id(table: &str, field: &str) -> String {
    format!("field:{table}.{field}")
}

/// A table, alias, or field node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// `table:<name>` or `field:<table>.<field>`
    pub id: String,

    /// Display label
    pub name: String,

    /// Undecorated table or field name
    pub original_name: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Set on alias table nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alias: Option<bool>,

    /// Real table behind an alias node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_for: Option<String>,

    /// Owning table of a field node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Field appears in the SELECT list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_result: Option<bool>,

    /// Field is an endpoint of a join relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_join_field: Option<bool>,

    /// Where this join key points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_target: Option<JoinTarget>,
}

impl Node {
    /// Create a real table node.
    pub fn table(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: table_id(&name),
            name: display_name.into(),
            original_name: name,
            node_type: NodeType::Table,
            is_alias: None,
            alias_for: None,
            table: None,
            is_result: None,
            is_join_field: None,
            join_target: None,
        }
    }

    /// Create an alias table node. `original_name` is the real table.
    pub fn alias_table(alias: &str, real_table: &str) -> Self {
        Self {
            id: table_id(alias),
            name: format!("{alias} ({real_table})"),
            original_name: real_table.to_string(),
            node_type: NodeType::Table,
            is_alias: Some(true),
            alias_for: Some(real_table.to_string()),
            table: None,
            is_result: None,
            is_join_field: None,
            join_target: None,
        }
    }

    /// Create a field node owned by `table`.
    pub fn field(table: &str, field: &str, display_name: impl Into<String>) -> Self {
        Self {
            id: field_id(table, field),
            name: display_name.into(),
            original_name: field.to_string(),
            node_type: NodeType::Field,
            is_alias: None,
            alias_for: None,
            table: Some(table.to_string()),
            is_result: Some(false),
            is_join_field: Some(false),
            join_target: None,
        }
    }

    pub fn with_result(mut self, is_result: bool) -> Self {
        self.is_result = Some(is_result);
        self
    }

    pub fn with_join_field(mut self, is_join_field: bool) -> Self {
        self.is_join_field = Some(is_join_field);
        self
    }

    pub fn with_join_target(mut self, target: Option<JoinTarget>) -> Self {
        self.join_target = target;
        self
    }

    pub fn is_alias(&self) -> bool {
        self.is_alias.unwrap_or(false)
    }

    pub fn is_result_field(&self) -> bool {
        self.is_result.unwrap_or(false)
    }

    pub fn is_join_field(&self) -> bool {
        self.is_join_field.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Table,
    Field,
}

/// One side of a join relation, seen from a join key field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinTarget {
    /// Real table owning the key
    pub table: String,
    pub field: String,
    /// Alias the key was written with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_alias: Option<String>,
    /// Real table on the other side
    pub target_table: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_alias: Option<String>,
    /// True for the left side of the ON equality
    pub is_source_field: bool,
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source: String,
    pub target: String,

    #[serde(rename = "type")]
    pub link_type: LinkType,

    /// Join condition text, as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alias_link: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alias_join: Option<bool>,

    /// Whether a join link was parsed or guessed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<JoinConfidence>,
}

impl Link {
    fn new(source: String, target: String, link_type: LinkType) -> Self {
        Self {
            source,
            target,
            link_type,
            condition: None,
            is_alias_link: None,
            is_alias_join: None,
            confidence: None,
        }
    }

    pub fn field_table(field_id: String, table_id: String) -> Self {
        Self::new(field_id, table_id, LinkType::FieldTable)
    }

    pub fn alias_table(alias_id: String, table_id: String) -> Self {
        let mut link = Self::new(alias_id, table_id, LinkType::AliasTable);
        link.is_alias_link = Some(true);
        link
    }

    pub fn table_join(
        source: String,
        target: String,
        condition: impl Into<String>,
        confidence: JoinConfidence,
    ) -> Self {
        let mut link = Self::new(source, target, LinkType::TableJoin);
        link.condition = Some(condition.into());
        link.confidence = Some(confidence);
        link
    }

    pub fn field_join(
        source: String,
        target: String,
        condition: impl Into<String>,
        confidence: JoinConfidence,
    ) -> Self {
        let mut link = Self::new(source, target, LinkType::FieldJoin);
        link.condition = Some(condition.into());
        link.confidence = Some(confidence);
        link
    }

    /// A table join drawn between alias nodes, labelled with the alias names.
    pub fn alias_join(source: String, target: String, condition: impl Into<String>) -> Self {
        let mut link = Self::new(source, target, LinkType::TableJoin);
        link.condition = Some(condition.into());
        link.is_alias_join = Some(true);
        link.confidence = Some(JoinConfidence::Parsed);
        link
    }

    pub fn is_alias_join(&self) -> bool {
        self.is_alias_join.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// Field to its owning table
    FieldTable,
    /// Table to table join
    TableJoin,
    /// Join key to join key
    FieldJoin,
    /// Alias node to its real table
    AliasTable,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldTable => "field-table",
            Self::TableJoin => "table-join",
            Self::FieldJoin => "field-join",
            Self::AliasTable => "alias-table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum JoinConfidence {
    /// Read from an ON clause
    Parsed,
    /// Guessed from table order with placeholder key names
    Inferred,
}
