//! Source printer for parsed OX trees.
//!
//! Renders a [`Document`] back to OX text. This exists to support the
//! print/re-parse round-trip tests and debugging output; it is not a
//! formatter and makes no attempt to preserve the original layout beyond
//! structure, ordering, and content.

use crate::ast::*;

/// Render a document back to OX source text.
pub fn document_to_source(doc: &Document) -> String {
    let mut out = String::new();
    for import in &doc.imports {
        import_to_source(import, &mut out);
        out.push('\n');
    }
    for template in &doc.templates {
        template_to_source(template, 0, &mut out);
        out.push('\n');
    }
    for node in &doc.blocks {
        node_to_source(node, 0, &mut out);
        out.push('\n');
    }
    out
}

/// Render a single node.
pub fn node_to_source(node: &Node, indent: usize, out: &mut String) {
    match node {
        Node::Block(block) => block_to_source(block, indent, out),
        Node::FreeText(ft) => free_text_to_source(ft, indent, out),
        Node::Template(template) => template_to_source(template, indent, out),
    }
}

/// Render a block.
pub fn block_to_source(block: &Block, indent: usize, out: &mut String) {
    pad(indent, out);
    for tag in &block.tags {
        tag_to_source(tag, out);
        out.push(' ');
    }
    out.push('[');
    if let Some(id) = &block.id {
        out.push_str(id);
    }
    if !block.properties.is_empty() {
        if block.id.is_some() {
            out.push(' ');
        }
        out.push('(');
        for (i, (key, value)) in block.properties.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
            out.push_str(": ");
            value_to_source(value, out);
        }
        out.push(')');
    }
    if !block.children.is_empty() {
        out.push('\n');
        for child in &block.children {
            node_to_source(child, indent + 1, out);
            out.push('\n');
        }
        pad(indent, out);
    }
    out.push(']');
}

fn tag_to_source(tag: &Tag, out: &mut String) {
    out.push(match tag.kind {
        TagKind::Definition => '@',
        TagKind::Instance => '#',
    });
    out.push_str(&tag.name);
    if let Some(arg) = &tag.argument {
        out.push('(');
        out.push_str(arg);
        out.push(')');
    }
}

fn value_to_source(value: &PropValue, out: &mut String) {
    match value {
        PropValue::Literal(lit) => literal_to_source(lit, out),
        PropValue::Array(items) => {
            out.push('{');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                value_to_source(item, out);
            }
            out.push('}');
        }
        PropValue::Expression(expr) => {
            out.push('(');
            expr_to_source(expr, out);
            out.push(')');
        }
    }
}

fn literal_to_source(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Str(s) => out.push_str(&quote(s)),
        Literal::Number(n) => out.push_str(&format_number(*n)),
        Literal::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Literal::Null => out.push_str("null"),
        // Object literals only exist after preprocessing; render as their
        // canonical JSON inside a string.
        Literal::Object(v) => out.push_str(&quote(&v.to_canonical_json())),
    }
}

fn expr_to_source(expr: &Expr, out: &mut String) {
    for (i, token) in expr.tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&token.raw);
    }
}

fn free_text_to_source(ft: &FreeText, indent: usize, out: &mut String) {
    pad(indent, out);
    for tag in &ft.tags {
        tag_to_source(tag, out);
        out.push(' ');
    }
    let fence = fence_for(&ft.text);
    out.push_str(&fence);
    out.push('\n');
    out.push_str(&ft.text);
    out.push('\n');
    pad(indent, out);
    out.push_str(&fence);
}

/// Pick a backtick fence longer than any run inside the text (minimum 3).
fn fence_for(text: &str) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn import_to_source(import: &ImportTemplate, out: &mut String) {
    out.push_str("<import ");
    out.push_str(&quote(&import.path));
    if let Some(alias) = &import.alias {
        out.push_str(" as ");
        out.push_str(alias);
    }
    out.push('>');
}

fn template_to_source(template: &Template, indent: usize, out: &mut String) {
    match template {
        Template::Set(t) => {
            pad(indent, out);
            out.push_str("<set ");
            out.push_str(&t.name);
            out.push_str(" = ");
            value_to_source(&t.value, out);
            out.push('>');
        }
        Template::If(t) => {
            pad(indent, out);
            out.push_str("<if (");
            expr_to_source(&t.condition, out);
            out.push_str(")>\n");
            body_to_source(&t.then_body, indent + 1, out);
            for branch in &t.else_ifs {
                pad(indent, out);
                out.push_str("<elseif (");
                expr_to_source(&branch.condition, out);
                out.push_str(")>\n");
                body_to_source(&branch.body, indent + 1, out);
            }
            if !t.else_body.is_empty() {
                pad(indent, out);
                out.push_str("<else>\n");
                body_to_source(&t.else_body, indent + 1, out);
            }
            pad(indent, out);
            out.push_str("</if>");
        }
        Template::Foreach(t) => {
            pad(indent, out);
            out.push_str("<foreach (");
            out.push_str(&t.item_var);
            if let Some(index) = &t.index_var {
                out.push_str(", ");
                out.push_str(index);
            }
            out.push_str(" in ");
            out.push_str(&t.collection);
            out.push_str(")>\n");
            body_to_source(&t.body, indent + 1, out);
            pad(indent, out);
            out.push_str("</foreach>");
        }
        Template::While(t) => {
            pad(indent, out);
            out.push_str("<while (");
            expr_to_source(&t.condition, out);
            out.push_str(")>\n");
            body_to_source(&t.body, indent + 1, out);
            pad(indent, out);
            out.push_str("</while>");
        }
        Template::OnData(t) => {
            pad(indent, out);
            out.push_str("<on-data ");
            out.push_str(&t.source);
            out.push_str(">\n");
            body_to_source(&t.data_body, indent + 1, out);
            if !t.error_body.is_empty() {
                pad(indent, out);
                out.push_str("<on-error>\n");
                body_to_source(&t.error_body, indent + 1, out);
            }
            pad(indent, out);
            out.push_str("</on-data>");
        }
        Template::Import(t) => {
            pad(indent, out);
            import_to_source(t, out);
        }
        Template::Inject(t) => {
            pad(indent, out);
            out.push_str("<inject ");
            out.push_str(&quote(&t.path));
            out.push('>');
        }
    }
}

fn body_to_source(nodes: &[Node], indent: usize, out: &mut String) {
    for node in nodes {
        node_to_source(node, indent, out);
        out.push('\n');
    }
}

fn pad(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
