//! Whole-project compilation scenarios: package imports, free text,
//! macro interplay, and source printing.

use oxc_par::{printer, Literal, Node, PropValue};
use oxc_pre::{MacroHooks, TagDescriptor};
use oxc_proj::{OxProject, ProjectConfig};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn block(node: &Node) -> &oxc_par::Block {
    match node {
        Node::Block(b) => b,
        other => panic!("expected block, got {other:?}"),
    }
}

#[test]
fn test_package_import_through_node_modules() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "node_modules/widgets/button.ox",
        "@component(Button) [Button (width: 44)]",
    );
    write(
        &dir,
        "main.ox",
        "<import \"widgets/button.ox\">\n#component(Button) [Go]",
    );

    let mut project = OxProject::from_directory(dir.path()).unwrap();
    project.declare_tag(TagDescriptor::new("component").can_output(false));
    let blocks = project.parse().unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id.as_deref(), Some("Go"));
    assert!(matches!(
        &blocks[0].properties["width"],
        PropValue::Literal(Literal::Number(n)) if *n == 44.0
    ));
}

#[test]
fn test_package_with_source_subdirectory() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "node_modules/themes/ox.config.toml",
        "source = \"lib\"\n",
    );
    write(
        &dir,
        "node_modules/themes/lib/dark.ox",
        "@theme(Dark) [Dark (bg: \"#000\")]",
    );
    write(
        &dir,
        "main.ox",
        "<import \"themes/dark.ox\" as t>\n#t.theme(Dark) [Page]",
    );

    let mut project = OxProject::from_directory(dir.path()).unwrap();
    project.declare_tag(TagDescriptor::new("theme").can_output(false));
    let blocks = project.parse().unwrap();
    assert_eq!(blocks[0].id.as_deref(), Some("Page"));
    assert!(matches!(
        &blocks[0].properties["bg"],
        PropValue::Literal(Literal::Str(s)) if s == "#000"
    ));
}

#[test]
fn test_free_text_with_tags_through_pipeline() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "[Article (title: \"Intro\")\n  #summary ```\n  First paragraph.\n  ```\n  #summary ```\n  Second paragraph.\n  ```\n  ```\n  Untagged body.\n  ```\n]",
    );
    let blocks = OxProject::from_directory(dir.path())
        .unwrap()
        .parse()
        .unwrap();

    let article = &blocks[0];
    // The two #summary texts merge; the untagged one stays separate.
    assert_eq!(article.children.len(), 2);
    match &article.children[0] {
        Node::FreeText(ft) => {
            assert_eq!(ft.text, "First paragraph.\n\nSecond paragraph.");
            assert_eq!(ft.tags.len(), 1);
            assert_eq!(ft.tags[0].name, "summary");
        }
        other => panic!("expected merged free text, got {other:?}"),
    }
    match &article.children[1] {
        Node::FreeText(ft) => assert_eq!(ft.text, "Untagged body."),
        other => panic!("expected free text, got {other:?}"),
    }
}

#[test]
fn test_macro_rewrites_survive_resolution() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.ox",
        "[Panel (unit: 4)\n  [Slot (w: ($parent.unit * 2))]\n]",
    );
    let mut project = OxProject::from_directory(dir.path()).unwrap();

    // The hook doubles `unit` before references resolve against it.
    let hooks = MacroHooks::new().on_walk(|cursor| {
        let block = cursor.block();
        if block.id.as_deref() == Some("Panel") {
            block.properties.insert(
                "unit".to_string(),
                PropValue::Literal(Literal::Number(8.0)),
            );
        }
        Ok(())
    });

    match project.parse_with_macros(hooks).unwrap() {
        oxc_proj::ParseResult::Compiled(blocks) => {
            let slot = block(&blocks[0].children[0]);
            assert!(matches!(
                &slot.properties["w"],
                PropValue::Literal(Literal::Number(n)) if *n == 16.0
            ));
        }
        other => panic!("expected compiled output, got {other:?}"),
    }
}

#[test]
fn test_printer_round_trip_of_project_source() {
    let source = r#"
<import "./widgets.ox" as ui>
<set cols = 12>
@layout [Grid (gap: 8)]
[Page (width: (cols * 80))
  [Nav (span: 3)]
  [Body (span: ($Nav.span * 3))
    ```
    Body copy.
    ```
  ]
]
"#;
    let doc = oxc_par::parse_source(source, "round.ox").unwrap();
    let printed = printer::document_to_source(&doc);
    let reparsed = oxc_par::parse_source(&printed, "round.ox").unwrap();

    assert_eq!(doc.imports.len(), reparsed.imports.len());
    assert_eq!(doc.templates.len(), reparsed.templates.len());
    assert_eq!(doc.blocks.len(), reparsed.blocks.len());

    fn assert_same_shape(a: &Node, b: &Node) {
        match (a, b) {
            (Node::Block(x), Node::Block(y)) => {
                assert_eq!(x.id, y.id);
                let xk: Vec<&String> = x.properties.keys().collect();
                let yk: Vec<&String> = y.properties.keys().collect();
                assert_eq!(xk, yk);
                assert!(oxc_par::tags_match(&x.tags, &y.tags));
                assert_eq!(x.children.len(), y.children.len());
                for (xc, yc) in x.children.iter().zip(&y.children) {
                    assert_same_shape(xc, yc);
                }
            }
            (Node::FreeText(x), Node::FreeText(y)) => {
                assert_eq!(x.text, y.text);
                assert!(oxc_par::tags_match(&x.tags, &y.tags));
            }
            (x, y) => panic!("shape mismatch: {x:?} vs {y:?}"),
        }
    }
    for (a, b) in doc.blocks.iter().zip(&reparsed.blocks) {
        assert_same_shape(a, b);
    }
}

#[test]
fn test_config_limits_apply_end_to_end() {
    let dir = TempDir::new().unwrap();
    write(&dir, "big.ox", &format!("[Big (note: \"{}\")]", "x".repeat(512)));
    write(&dir, "main.ox", "<inject \"./big.ox\">");
    write(
        &dir,
        "ox.config.toml",
        "maxFileSize = 64\n",
    );

    let err = OxProject::from_directory(dir.path())
        .unwrap()
        .parse()
        .unwrap_err();
    assert!(matches!(err, oxc_proj::ProjectError::FileTooLarge { .. }));
}

#[test]
fn test_explicit_config_record() {
    let dir = TempDir::new().unwrap();
    write(&dir, "entry.ox", "[E]");

    let mut config = ProjectConfig::default();
    config.base_dir = dir.path().to_path_buf();
    config.entry_point = "entry.ox".into();
    config.max_depth = 5;
    config.timeout = Some(250);

    let mut project = OxProject::new(config).unwrap();
    let blocks = project.parse().unwrap();
    assert_eq!(blocks[0].id.as_deref(), Some("E"));
}
