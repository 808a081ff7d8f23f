//! Edge case tests for oxc-pre

#[cfg(test)]
mod tests {
    use crate::*;
    use oxc_eval::{DataSourceError, Transaction};
    use oxc_par::{parse_source, Block, Literal, Node, PropValue};
    use oxc_util::Value;

    fn compile(source: &str) -> Result<Vec<Node>, PreprocessError> {
        compile_with(source, Transaction::new())
    }

    fn compile_with(source: &str, mut txn: Transaction) -> Result<Vec<Node>, PreprocessError> {
        let doc = parse_source(source, "edge.ox").unwrap();
        let mut registry = TagRegistry::new();
        preprocess(doc, &mut txn, &mut registry, MacroHooks::new(), "edge.ox")
    }

    fn block(node: &Node) -> &Block {
        match node {
            Node::Block(b) => b,
            other => panic!("expected block, got {other:?}"),
        }
    }

    fn number(block: &Block, key: &str) -> f64 {
        match &block.properties[key] {
            PropValue::Literal(Literal::Number(n)) => *n,
            other => panic!("expected number for '{key}', got {other:?}"),
        }
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_document() {
        assert!(compile("").unwrap().is_empty());
    }

    #[test]
    fn test_edge_foreach_over_empty_array() {
        let nodes = compile("<set xs = {}>\n<foreach (x in xs)>[I]</foreach>").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_edge_nested_foreach() {
        let nodes = compile(
            "<set rows = {1, 2}>\n<set cols = {10, 20}>\n<foreach (r in rows)><foreach (c in cols)>[Cell (v: (r * c))]</foreach></foreach>",
        )
        .unwrap();
        assert_eq!(nodes.len(), 4);
        let values: Vec<f64> = nodes.iter().map(|n| number(block(n), "v")).collect();
        assert_eq!(values, [10.0, 20.0, 20.0, 40.0]);
    }

    #[test]
    fn test_edge_shadowed_loop_variable() {
        let nodes = compile(
            "<set x = 100>\n<set xs = {1}>\n<foreach (x in xs)>[In (v: (x))]</foreach>\n[Out (v: (x))]",
        )
        .unwrap();
        assert_eq!(number(block(&nodes[0]), "v"), 1.0);
        assert_eq!(number(block(&nodes[1]), "v"), 100.0);
    }

    #[test]
    fn test_edge_while_zero_iterations() {
        let nodes = compile("<set n = 5>\n<while (n < 5)>[T]</while>").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_edge_free_text_survives_compilation() {
        let nodes = compile("[Doc (title: (\"a\"))\n  ```body text```\n]").unwrap();
        let doc = block(&nodes[0]);
        assert!(matches!(
            &doc.children[0],
            Node::FreeText(ft) if ft.text == "body text"
        ));
    }

    #[test]
    fn test_edge_anonymous_blocks_addressable_by_position() {
        let nodes = compile(
            "[P (pick: ($this.children[1].v))\n  [(v: 1)]\n  [(v: 2)]\n]",
        )
        .unwrap();
        assert_eq!(number(block(&nodes[0]), "pick"), 2.0);
    }

    #[test]
    fn test_edge_sibling_reference_between_expanded_children() {
        // The foreach-produced sibling is addressable by id afterwards.
        let nodes = compile(
            "<set xs = {7}>\n<foreach (x in xs)>[Seed (v: (x))]</foreach>\n[Reader (v: ($Seed.v))]",
        )
        .unwrap();
        let reader = nodes
            .iter()
            .map(block)
            .find(|b| b.id.as_deref() == Some("Reader"))
            .unwrap();
        assert_eq!(number(reader, "v"), 7.0);
    }

    #[test]
    fn test_edge_on_data_inside_foreach() {
        let mut txn = Transaction::new();
        txn.add_data_source("cfg", || Ok(Value::Number(42.0)));
        let nodes = compile_with(
            "<set xs = {1, 2}>\n<foreach (x in xs)><on-data cfg>[C (v: (cfg + x))]</on-data></foreach>",
            txn,
        )
        .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(number(block(&nodes[0]), "v"), 43.0);
        assert_eq!(number(block(&nodes[1]), "v"), 44.0);
    }

    #[test]
    fn test_edge_on_data_timeout_takes_error_path() {
        let mut txn = Transaction::new();
        txn.set_timeout(std::time::Duration::from_millis(20));
        txn.add_data_source("slow", || {
            std::thread::sleep(std::time::Duration::from_millis(500));
            Ok(Value::Null)
        });
        let nodes = compile_with(
            "<on-data slow>[Data]<on-error>[Fallback (code: ($error.code))]</on-data>",
            txn,
        )
        .unwrap();
        let fallback = block(&nodes[0]);
        assert_eq!(fallback.id.as_deref(), Some("Fallback"));
        assert!(matches!(
            &fallback.properties["code"],
            PropValue::Literal(Literal::Str(s)) if s == "TIMEOUT"
        ));
    }

    #[test]
    fn test_edge_nested_on_data_parent_result_in_scope() {
        let mut txn = Transaction::new();
        txn.add_data_source("outer", || Ok(Value::Number(10.0)));
        txn.add_data_source("inner", || Ok(Value::Number(5.0)));
        let nodes = compile_with(
            "<on-data outer><on-data inner>[Sum (v: (outer + inner))]</on-data></on-data>",
            txn,
        )
        .unwrap();
        assert_eq!(number(block(&nodes[0]), "v"), 15.0);
    }

    #[test]
    fn test_edge_failed_parent_skips_nested_source() {
        let mut txn = Transaction::new();
        txn.add_data_source("outer", || {
            Err(DataSourceError::provider("outer", "down", None))
        });
        txn.add_data_source("inner", || Ok(Value::Number(5.0)));
        let nodes = compile_with(
            "<on-data outer><on-data inner>[Sum]</on-data><on-error>[Oops]</on-data>",
            txn,
        )
        .unwrap();
        assert_eq!(block(&nodes[0]).id.as_deref(), Some("Oops"));
    }

    #[test]
    fn test_edge_undefined_data_source_lists_all() {
        let err = compile("<on-data ghost>[A]</on-data>").unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::UndefinedDataSource { names, .. } if names == ["ghost"]
        ));
    }

    #[test]
    fn test_edge_error_variable_unavailable_outside_error_body() {
        let err = compile("[A (m: ($error.message))]").unwrap_err();
        // Outside an on-error scope, $error is an ordinary unresolved
        // reference handed to Pass 2, where 'error' is no block id.
        assert!(matches!(
            err,
            PreprocessError::Eval(oxc_eval::EvalError::BlockNotFound { id, .. }) if id == "error"
        ));
    }

    #[test]
    fn test_edge_property_order_preserved() {
        let nodes = compile("[A (z: 1, a: (1 + 1), m: 3)]").unwrap();
        let keys: Vec<&String> = block(&nodes[0]).properties.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_edge_definition_blocks_stay_without_descriptor_flag() {
        let doc = parse_source("@widget [W (x: 1)]", "edge.ox").unwrap();
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        registry.declare(TagDescriptor::new("widget"));
        let nodes = preprocess(doc, &mut txn, &mut registry, MacroHooks::new(), "edge.ox").unwrap();
        // can_output defaults to true: the definition block is kept.
        assert_eq!(nodes.len(), 1);
        assert!(registry.definition("widget").is_some());
    }

    #[test]
    fn test_edge_instance_of_undefined_tag() {
        let doc = parse_source("#widget [W]", "edge.ox").unwrap();
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        registry.declare(TagDescriptor::new("widget"));
        let err =
            preprocess(doc, &mut txn, &mut registry, MacroHooks::new(), "edge.ox").unwrap_err();
        assert!(matches!(err, PreprocessError::UndefinedTag { .. }));
    }

    #[test]
    fn test_edge_deep_reference_across_levels() {
        let nodes = compile(
            "[App (unit: 4)\n  [Row\n    [Cell (w: ($parent.parent.unit * 3))]\n  ]\n]",
        )
        .unwrap();
        let app = block(&nodes[0]);
        let row = block(&app.children[0]);
        let cell = block(&row.children[0]);
        assert_eq!(number(cell, "w"), 12.0);
    }
}
