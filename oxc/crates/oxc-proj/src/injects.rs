//! Inject location validation.
//!
//! `<inject>` is valid at the document top level and as a direct child of
//! a block. An inject inside a template body is rejected before expansion
//! so the error cites the directive, not a post-expansion artifact. The
//! splice itself is driven by [`crate::OxProject`] after reference
//! resolution.

use oxc_par::{Document, Node, Template};

use crate::error::ProjectError;

/// Validate every inject directive's position in a parsed document.
pub fn validate_inject_locations(doc: &Document) -> Result<(), ProjectError> {
    // Top-level injects live inline in `blocks` and are fine; anything
    // inside the sorted-out templates is too deep.
    for template in &doc.templates {
        check_template(template)?;
    }
    for node in &doc.blocks {
        match node {
            Node::Block(block) => check_block_children(&block.children)?,
            Node::Template(Template::Inject(_)) => {}
            _ => {}
        }
    }
    Ok(())
}

fn check_block_children(children: &[Node]) -> Result<(), ProjectError> {
    for child in children {
        match child {
            // Direct block child: allowed.
            Node::Template(Template::Inject(_)) => {}
            Node::Template(template) => check_template(template)?,
            Node::Block(block) => check_block_children(&block.children)?,
            Node::FreeText(_) => {}
        }
    }
    Ok(())
}

/// Reject injects directly inside template bodies. A block inside the
/// body may still carry injects as its own direct children.
fn check_template(template: &Template) -> Result<(), ProjectError> {
    match template {
        Template::Inject(inject) => Err(ProjectError::InvalidInjectLocation {
            location: inject.location.clone(),
        }),
        Template::If(t) => {
            check_body(&t.then_body)?;
            for branch in &t.else_ifs {
                check_body(&branch.body)?;
            }
            check_body(&t.else_body)
        }
        Template::Foreach(t) => check_body(&t.body),
        Template::While(t) => check_body(&t.body),
        Template::OnData(t) => {
            check_body(&t.data_body)?;
            check_body(&t.error_body)
        }
        Template::Set(_) | Template::Import(_) => Ok(()),
    }
}

fn check_body(body: &[Node]) -> Result<(), ProjectError> {
    for node in body {
        match node {
            Node::Template(template) => check_template(template)?,
            Node::Block(block) => check_block_children(&block.children)?,
            Node::FreeText(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_par::parse_source;

    #[test]
    fn test_top_level_inject_allowed() {
        let doc = parse_source("[A] <inject \"p.ox\"> [B]", "inj.ox").unwrap();
        assert!(validate_inject_locations(&doc).is_ok());
    }

    #[test]
    fn test_block_child_inject_allowed() {
        let doc = parse_source("[Host <inject \"p.ox\">]", "inj.ox").unwrap();
        assert!(validate_inject_locations(&doc).is_ok());
    }

    #[test]
    fn test_inject_in_template_body_rejected() {
        let doc = parse_source("[A <if (true)><inject \"p.ox\"></if>]", "inj.ox").unwrap();
        assert!(matches!(
            validate_inject_locations(&doc),
            Err(ProjectError::InvalidInjectLocation { .. })
        ));
    }

    #[test]
    fn test_inject_in_top_level_template_rejected() {
        let doc = parse_source("<if (true)><inject \"p.ox\"></if>", "inj.ox").unwrap();
        assert!(matches!(
            validate_inject_locations(&doc),
            Err(ProjectError::InvalidInjectLocation { .. })
        ));
    }

    #[test]
    fn test_block_inside_template_body_may_inject() {
        let doc =
            parse_source("[A <if (true)>[Wrap <inject \"p.ox\">]</if>]", "inj.ox").unwrap();
        assert!(validate_inject_locations(&doc).is_ok());
    }
}
