// src/render/template.rs

//! Minimal logic-less template engine.
//!
//! Supports the mustache subset used by page views and layouts:
//! `{{name}}` and dotted paths (HTML-escaped), `{{{name}}}` / `{{& name}}`
//! (raw), `{{#name}}...{{/name}}` sections, `{{^name}}...{{/name}}` inverted
//! sections, `{{! comments}}` and `{{.}}` for the current item.

use std::fmt::Debug;

use anyhow::{anyhow, bail, Result};
use serde_json::Value;

/// Renders a template string against a JSON-like context.
pub trait TemplateEngine: Send + Sync + Debug {
    fn render(&self, template: &str, context: &Value) -> Result<String>;
}

/// Built-in mustache-subset engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mustache;

impl TemplateEngine for Mustache {
    fn render(&self, template: &str, context: &Value) -> Result<String> {
        let nodes = parse(template)?;
        let mut out = String::with_capacity(template.len());
        let mut stack = vec![context];
        render_nodes(&nodes, &mut stack, &mut out);
        Ok(out)
    }
}

#[derive(Debug)]
enum Node {
    Text(String),
    Var { name: String, escape: bool },
    Section { name: String, inverted: bool, children: Vec<Node> },
}

enum Tag<'t> {
    Comment,
    Open { name: &'t str, inverted: bool },
    Close(&'t str),
    Var { name: &'t str, escape: bool },
}

fn classify(raw: &str) -> Tag<'_> {
    let raw = raw.trim();
    if raw.starts_with('!') {
        return Tag::Comment;
    }
    if let Some(name) = raw.strip_prefix('#') {
        return Tag::Open { name: name.trim(), inverted: false };
    }
    if let Some(name) = raw.strip_prefix('^') {
        return Tag::Open { name: name.trim(), inverted: true };
    }
    if let Some(name) = raw.strip_prefix('/') {
        return Tag::Close(name.trim());
    }
    if let Some(name) = raw.strip_prefix('&') {
        return Tag::Var { name: name.trim(), escape: false };
    }
    Tag::Var { name: raw, escape: true }
}

fn parse(template: &str) -> Result<Vec<Node>> {
    // (section name, inverted, nodes collected before the section opened)
    let mut open: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            current.push(Node::Text(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];

        let (tag, consumed) = if let Some(inner) = after.strip_prefix('{') {
            let end = inner
                .find("}}}")
                .ok_or_else(|| anyhow!("unclosed '{{{{{{' tag"))?;
            (Tag::Var { name: inner[..end].trim(), escape: false }, end + 4)
        } else {
            let end = after.find("}}").ok_or_else(|| anyhow!("unclosed '{{{{' tag"))?;
            (classify(&after[..end]), end + 2)
        };
        rest = &after[consumed..];

        match tag {
            Tag::Comment => {}
            Tag::Var { name, escape } => {
                if name.is_empty() {
                    bail!("empty variable tag");
                }
                current.push(Node::Var { name: name.to_string(), escape });
            }
            Tag::Open { name, inverted } => {
                if name.is_empty() {
                    bail!("section without a name");
                }
                open.push((name.to_string(), inverted, std::mem::take(&mut current)));
            }
            Tag::Close(name) => {
                let Some((open_name, inverted, parent)) = open.pop() else {
                    bail!("closing tag '{name}' without an open section");
                };
                if open_name != name {
                    bail!("section '{open_name}' closed by '{name}'");
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Section { name: open_name, inverted, children });
            }
        }
    }

    if !rest.is_empty() {
        current.push(Node::Text(rest.to_string()));
    }

    if let Some((name, _, _)) = open.pop() {
        bail!("section '{name}' is never closed");
    }

    Ok(current)
}

fn render_nodes<'a>(nodes: &[Node], stack: &mut Vec<&'a Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var { name, escape } => {
                let Some(value) = lookup(stack, name) else {
                    continue;
                };
                let text = display(value);
                if *escape {
                    escape_html(&text, out);
                } else {
                    out.push_str(&text);
                }
            }
            Node::Section { name, inverted, children } => {
                let value = lookup(stack, name);
                if *inverted {
                    if !value.is_some_and(is_truthy) {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }

                match value {
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    Some(value) if is_truthy(value) => {
                        stack.push(value);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Resolve `name` against the context stack, innermost first. Only the
/// first segment of a dotted name walks the stack.
fn lookup<'a>(stack: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|frame| frame.as_object().and_then(|map| map.get(first)))?;

    for segment in segments {
        value = match value {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
