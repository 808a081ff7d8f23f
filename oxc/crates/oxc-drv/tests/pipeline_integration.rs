//! End-to-end pipeline integration tests.
//!
//! Each test drives the full pipeline (lexer, parser, preprocessor,
//! project orchestration) through `OxProject` against real files.

use oxc_par::{Literal, Node, PropValue};
use oxc_pre::{MacroHooks, TagDescriptor};
use oxc_proj::OxProject;
use oxc_util::Value;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn project(dir: &TempDir) -> OxProject {
    OxProject::from_directory(dir.path()).unwrap()
}

fn number(block: &oxc_par::Block, key: &str) -> f64 {
    match &block.properties[key] {
        PropValue::Literal(Literal::Number(n)) => *n,
        other => panic!("expected number for '{key}', got {other:?}"),
    }
}

fn string<'a>(block: &'a oxc_par::Block, key: &str) -> &'a str {
    match &block.properties[key] {
        PropValue::Literal(Literal::Str(s)) => s,
        other => panic!("expected string for '{key}', got {other:?}"),
    }
}

#[test]
fn test_arithmetic_literalisation() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.ox", "[Box (w: (10 + 20 * 2))]");
    let blocks = project(&dir).parse().unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id.as_deref(), Some("Box"));
    assert_eq!(number(&blocks[0], "w"), 50.0);
    assert_eq!(
        match &blocks[0].properties["w"] {
            PropValue::Literal(lit) => lit.value_type(),
            other => panic!("expected literal, got {other:?}"),
        },
        "number"
    );
}

#[test]
fn test_foreach_index_and_interpolation() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "<set items = {\"a\", \"b\", \"c\"}>\n<foreach (x, i in items)>[Item (idx: (i), val: (x))]</foreach>",
    );
    let blocks = project(&dir).parse().unwrap();

    assert_eq!(blocks.len(), 3);
    let expected = [(0.0, "a"), (1.0, "b"), (2.0, "c")];
    for (block, (idx, val)) in blocks.iter().zip(expected) {
        assert_eq!(block.id.as_deref(), Some("Item"));
        assert_eq!(number(block, "idx"), idx);
        assert_eq!(string(block, "val"), val);
    }
}

#[test]
fn test_reference_resolution_with_arithmetic() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "[Container (width: 400, padding: 20)\n  [Content (width: ($parent.width - $parent.padding * 2))]\n]",
    );
    let blocks = project(&dir).parse().unwrap();

    let content = match &blocks[0].children[0] {
        Node::Block(b) => b,
        other => panic!("expected block child, got {other:?}"),
    };
    assert_eq!(number(content, "width"), 360.0);
}

#[test]
fn test_forward_sibling_reference() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "[Layout\n  [Content (margin: ($Sidebar.width))]\n  [Sidebar (width: 250)]\n]",
    );
    let blocks = project(&dir).parse().unwrap();

    let content = match &blocks[0].children[0] {
        Node::Block(b) => b,
        other => panic!("expected block child, got {other:?}"),
    };
    assert_eq!(number(content, "margin"), 250.0);
}

#[test]
fn test_tag_composition_with_children_naming() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "@component(Button) [Button (width: 100)]\n@component(Icon) [Icon (size: 24)]\n#component(Button) #component(Icon) [X]",
    );
    let mut project = project(&dir);
    project.declare_tag(TagDescriptor::new("component").can_output(false));
    let blocks = project.parse().unwrap();

    assert_eq!(blocks.len(), 1);
    let x = &blocks[0];
    assert_eq!(x.id.as_deref(), Some("X"));
    assert_eq!(x.children.len(), 2);

    let first = match &x.children[0] {
        Node::Block(b) => b,
        other => panic!("expected block, got {other:?}"),
    };
    let second = match &x.children[1] {
        Node::Block(b) => b,
        other => panic!("expected block, got {other:?}"),
    };
    assert_eq!(first.id.as_deref(), Some("X_Button"));
    assert_eq!(number(first, "width"), 100.0);
    assert_eq!(second.id.as_deref(), Some("X_Icon"));
    assert_eq!(number(second, "size"), 24.0);
}

#[test]
fn test_on_data_happy_path() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "<on-data users>[UserList]<on-error>[ErrorBlock]</on-data>",
    );
    let mut project = project(&dir);
    project.add_data_source("users", || {
        Ok(Value::Array(vec![Value::Str("ada".into())]))
    });
    let blocks = project.parse().unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id.as_deref(), Some("UserList"));
}

#[test]
fn test_on_data_sad_path() {
    use oxc_eval::DataSourceError;

    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "<on-data users>[UserList]<on-error>[ErrorBlock]</on-data>",
    );
    let mut project = project(&dir);
    project.add_data_source("users", || {
        Err(DataSourceError::provider("users", "backend down", None))
    });
    let blocks = project.parse().unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id.as_deref(), Some("ErrorBlock"));
}

#[test]
fn test_full_project_compilation() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "widgets.ox",
        "@component(Card) [Card (pad: 8) [CardBody]]",
    );
    write(&dir, "footer.ox", "[Footer (year: (2000 + 26))]");
    write(
        &dir,
        "main.ox",
        "<import \"./widgets.ox\">\n<set n = 2>\n[App (cols: (n * 6))\n  [Grid (w: ($parent.cols))]\n]\n#component(Card) [Hero]\n<inject \"./footer.ox\">",
    );
    let mut project = project(&dir);
    project.declare_tag(TagDescriptor::new("component").can_output(false));
    let blocks = project.parse().unwrap();

    let ids: Vec<Option<&str>> = blocks.iter().map(|b| b.id.as_deref()).collect();
    assert_eq!(ids, [Some("App"), Some("Hero"), Some("Footer")]);

    assert_eq!(number(&blocks[0], "cols"), 12.0);
    let grid = match &blocks[0].children[0] {
        Node::Block(b) => b,
        other => panic!("expected block, got {other:?}"),
    };
    assert_eq!(number(grid, "w"), 12.0);
    assert_eq!(number(&blocks[1], "pad"), 8.0);
    assert_eq!(number(&blocks[2], "year"), 2026.0);
}

#[test]
fn test_compiled_tree_is_fully_literal() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "<set xs = {1, 2, 3}>\n[Root (total: (1 + 2))\n  <foreach (x in xs)>[Leaf (v: (x * 10), back: ($parent.total))]</foreach>\n]",
    );
    let blocks = project(&dir).parse().unwrap();

    fn assert_literal_tree(node: &Node) {
        if let Node::Block(block) = node {
            for (key, value) in &block.properties {
                assert!(
                    !value.contains_expression(),
                    "property '{key}' is still an expression"
                );
            }
            block.children.iter().for_each(assert_literal_tree);
        }
    }
    for block in &blocks {
        for (key, value) in &block.properties {
            assert!(!value.contains_expression(), "'{key}' unresolved");
        }
        block.children.iter().for_each(assert_literal_tree);
    }
}

#[test]
fn test_determinism_across_runs() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "<set xs = {\"p\", \"q\"}>\n<foreach (x, i in xs)>[R (k: (x), n: (i * 2))]</foreach>\n[Tail (t: (3 ** 2))]",
    );

    let run = || {
        let mut project = OxProject::from_directory(dir.path()).unwrap();
        format!("{:?}", project.parse().unwrap())
    };
    assert_eq!(run(), run());
}

#[test]
fn test_macro_hooks_end_to_end() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let dir = TempDir::new().unwrap();
    write(&dir, "main.ox", "[Page [Header] [Body]]");
    let mut project = project(&dir);

    let visited = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&visited);
    let hooks = MacroHooks::new().on_walk(move |cursor| {
        let (block, parent) = cursor.current();
        record.borrow_mut().push(format!(
            "{}<-{}",
            block.id.clone().unwrap_or_default(),
            parent.unwrap_or("root")
        ));
        Ok(())
    });

    project.parse_with_macros(hooks).unwrap();
    assert_eq!(
        *visited.borrow(),
        vec!["Page<-root", "Header<-Page", "Body<-Page"]
    );
}
