use joinscope_core::{
    generate_graph, parse_fallback, GraphRequest, LinkType, ParserPreference,
};
use proptest::prelude::*;

fn request(sql: String, parser: ParserPreference) -> GraphRequest {
    GraphRequest {
        parser,
        ..GraphRequest::new(sql)
    }
}

fn preference() -> impl Strategy<Value = ParserPreference> {
    prop_oneof![Just(ParserPreference::Auto), Just(ParserPreference::Fallback)]
}

proptest! {
    #[test]
    fn fallback_parser_never_panics(sql in "\\PC{0,200}") {
        let _ = parse_fallback(&sql);
    }

    #[test]
    fn any_text_yields_a_consistent_graph(sql in "\\PC{1,200}", parser in preference()) {
        prop_assume!(!sql.trim().is_empty());

        let result = generate_graph(&request(sql, parser)).unwrap();

        prop_assert!(!result.graph.nodes.is_empty());
        prop_assert!(result.graph.validate().is_ok());
    }

    #[test]
    fn random_simple_join(
        table_a in "t_[a-z]{1,8}",
        table_b in "t_[a-z]{1,8}",
        col_a in "c_[a-z]{1,8}",
        col_b in "c_[a-z]{1,8}",
        parser in preference(),
    ) {
        // Require distinct table names so the graph has two table nodes.
        prop_assume!(table_a != table_b);

        let sql = format!(
            "SELECT {ta}.{ca}, {tb}.{cb} FROM {ta} JOIN {tb} ON {ta}.{ca} = {tb}.{cb}",
            ta = table_a,
            tb = table_b,
            ca = col_a,
            cb = col_b,
        );

        let graph = generate_graph(&request(sql, parser)).unwrap().graph;

        prop_assert!(!graph.is_diagnostic());
        prop_assert_eq!(graph.table_nodes().count(), 2);
        prop_assert_eq!(graph.links_of_type(LinkType::TableJoin).count(), 1);
        let source = format!("field:{table_a}.{col_a}");
        let target = format!("field:{table_b}.{col_b}");
        prop_assert!(graph.link_between(LinkType::FieldJoin, &source, &target).is_some());
    }

    #[test]
    fn aliases_never_produce_alias_field_nodes(
        table in "t_[a-z]{1,8}",
        alias in "a_[a-z]{1,4}",
        column in "c_[a-z]{1,8}",
        parser in preference(),
    ) {
        let sql = format!("SELECT {alias}.{column} FROM {table} AS {alias}");

        let graph = generate_graph(&request(sql, parser)).unwrap().graph;

        let alias_field = format!("field:{alias}.{column}");
        let real_field = format!("field:{table}.{column}");
        let alias_table = format!("table:{alias}");
        prop_assert!(graph.node(&alias_field).is_none());
        prop_assert!(graph.node(&real_field).is_some());
        prop_assert!(graph.node(&alias_table).is_some_and(|n| n.is_alias()));
    }
}
