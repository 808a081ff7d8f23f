//! Smoke test for the public driver API.

use oxc_drv::{parse_with_macros, DriverConfig, EmitKind, Session};
use oxc_pre::MacroHooks;
use oxc_proj::ParseResult;
use tempfile::TempDir;

#[test]
fn test_compile_smoke() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smoke.ox");
    std::fs::write(
        &input,
        "<set n = 3>\n[Smoke (v: (n * n))\n  [Child (ok: true)]\n]",
    )
    .unwrap();

    let session = Session::new(DriverConfig {
        input,
        emit: EmitKind::Compiled,
        verbose: false,
    });
    match session.compile().unwrap() {
        oxc_drv::Output::Blocks(blocks) => {
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].children.len(), 1);
        }
        other => panic!("expected blocks, got {other:?}"),
    }
}

#[test]
fn test_parse_with_macros_finish_short_circuits() {
    let hooks = MacroHooks::new().on_parse(|ctx| {
        ctx.finish();
        Ok(())
    });
    // The undefined variable would fail preprocessing; finish() skips it.
    let result = parse_with_macros("[A (v: (ghost))]", Some("raw.ox"), hooks).unwrap();
    assert!(matches!(result, ParseResult::Raw(_)));
}
