//! Block dispatch and the default text renderers.

use folio_content::{Block, Inline, ListKind, MarkDef, Span, TextBlock};

use crate::components::{Components, RenderContext, RenderError};

/// Render a body to HTML, preserving block order.
///
/// Consecutive list items are grouped into `<ul>`/`<ol>` elements, nested by
/// their `level`.
pub fn render(
    blocks: &[Block],
    components: &Components,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    let mut out = String::new();
    let mut index = 0;

    while index < blocks.len() {
        let mut items: Vec<&TextBlock> = Vec::new();
        while let Some(Block::Text(block)) = blocks.get(index) {
            if block.list_kind().is_none() {
                break;
            }
            items.push(block);
            index += 1;
        }

        if !items.is_empty() {
            render_list(&items, components, ctx, &mut out)?;
            continue;
        }

        out.push_str(&render_block(&blocks[index], components, ctx)?);
        index += 1;
    }

    Ok(out)
}

/// Render a single block.
pub fn render_block(
    block: &Block,
    components: &Components,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    match block {
        Block::Text(text) if text.list_kind().is_some() => {
            let mut out = String::new();
            render_list(&[text], components, ctx, &mut out)?;
            Ok(out)
        }
        Block::Text(text) => {
            let tag = style_tag(&text.style);
            let children = render_children(text, components, ctx)?;
            Ok(format!("<{tag}>{children}</{tag}>"))
        }
        Block::Image(image) => (components.image)(image, false, ctx),
        Block::Unknown { type_name, .. } => Ok((components.unknown_type)(type_name, false)),
    }
}

fn style_tag(style: &str) -> &'static str {
    match style {
        "h1" => "h1",
        "h2" => "h2",
        "h3" => "h3",
        "h4" => "h4",
        "h5" => "h5",
        "h6" => "h6",
        "blockquote" => "blockquote",
        _ => "p",
    }
}

fn list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "ul",
        ListKind::Number => "ol",
    }
}

fn render_list(
    items: &[&TextBlock],
    components: &Components,
    ctx: &RenderContext,
    out: &mut String,
) -> Result<(), RenderError> {
    // Open lists, innermost last
    let mut open: Vec<(ListKind, u32)> = Vec::new();

    for item in items {
        let Some(kind) = item.list_kind() else {
            continue;
        };
        let level = item.list_level();

        while let Some(&(top_kind, top_level)) = open.last() {
            if top_level <= level {
                break;
            }
            out.push_str(&format!("</li></{}>", list_tag(top_kind)));
            open.pop();
        }

        match open.last().copied() {
            Some((top_kind, top_level)) if top_level == level && top_kind == kind => {
                out.push_str("</li>");
            }
            Some((top_kind, top_level)) if top_level == level => {
                out.push_str(&format!("</li></{}>", list_tag(top_kind)));
                open.pop();
                out.push_str(&format!("<{}>", list_tag(kind)));
                open.push((kind, level));
            }
            _ => {
                out.push_str(&format!("<{}>", list_tag(kind)));
                open.push((kind, level));
            }
        }

        out.push_str("<li>");
        out.push_str(&render_children(item, components, ctx)?);
    }

    while let Some((kind, _)) = open.pop() {
        out.push_str(&format!("</li></{}>", list_tag(kind)));
    }

    Ok(())
}

fn render_children(
    block: &TextBlock,
    components: &Components,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    let mut out = String::new();

    for child in &block.children {
        match child {
            Inline::Span(span) => out.push_str(&render_span(span, &block.mark_defs)),
            Inline::Image(image) => out.push_str(&(components.image)(image, true, ctx)?),
            Inline::Unknown { type_name, .. } => {
                out.push_str(&(components.unknown_type)(type_name, true))
            }
        }
    }

    Ok(out)
}

fn render_span(span: &Span, mark_defs: &[MarkDef]) -> String {
    let mut html = escape_html(&span.text).replace('\n', "<br/>");

    // First mark ends up outermost
    for mark in span.marks.iter().rev() {
        html = wrap_mark(mark, html, mark_defs);
    }

    html
}

fn wrap_mark(mark: &str, inner: String, mark_defs: &[MarkDef]) -> String {
    match mark {
        "strong" => format!("<strong>{inner}</strong>"),
        "em" => format!("<em>{inner}</em>"),
        "code" => format!("<code>{inner}</code>"),
        "underline" => format!(r#"<span style="text-decoration:underline">{inner}</span>"#),
        "strike-through" => format!("<del>{inner}</del>"),
        key => match mark_defs.iter().find(|def| def.key == key) {
            Some(MarkDef {
                kind,
                href: Some(href),
                ..
            }) if kind == "link" => {
                format!(r#"<a href="{}">{inner}</a>"#, escape_html(href))
            }
            Some(def) => {
                tracing::debug!("No renderer for mark type '{}'", def.kind);
                inner
            }
            None => {
                tracing::debug!("Unknown mark '{}'", key);
                inner
            }
        },
    }
}

/// Escape HTML special characters including single quotes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
