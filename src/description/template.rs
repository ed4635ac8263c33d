//! A small named-field template language for commit descriptions.
//!
//! Supported tags:
//!
//! ```text
//! {{baseDirectory}}          the bucket's base directory
//! {{affectedPaths}}          affected paths, one per line
//! {{extraDescription}}       extra text (marker file contents)
//! {{#each affectedPaths}}…{{this}}…{{/each}}
//! {{#if <field>}}…{{/if}}    body rendered only when the field is non-empty
//! ```

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::TemplateError;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{.*?\}\}").expect("Invalid regex"));

/// A field of [`DescriptionContext`] that templates can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BaseDirectory,
    AffectedPaths,
    ExtraDescription,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "baseDirectory" => Some(Field::BaseDirectory),
            "affectedPaths" => Some(Field::AffectedPaths),
            "extraDescription" => Some(Field::ExtraDescription),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::BaseDirectory => "baseDirectory",
            Field::AffectedPaths => "affectedPaths",
            Field::ExtraDescription => "extraDescription",
        }
    }
}

/// The values substituted into a template for one change list.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionContext<'a> {
    pub base_directory: &'a str,
    pub affected_paths: &'a [String],
    pub extra_description: &'a str,
}

impl DescriptionContext<'_> {
    fn is_set(&self, field: Field) -> bool {
        match field {
            Field::BaseDirectory => !self.base_directory.is_empty(),
            Field::AffectedPaths => !self.affected_paths.is_empty(),
            Field::ExtraDescription => !self.extra_description.is_empty(),
        }
    }

    fn write_field(&self, field: Field, out: &mut String) {
        match field {
            Field::BaseDirectory => out.push_str(self.base_directory),
            Field::AffectedPaths => out.push_str(&self.affected_paths.join("\n")),
            Field::ExtraDescription => out.push_str(self.extra_description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Field(Field),
    This,
    Each(Vec<Node>),
    If(Field, Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Each,
    If(Field),
}

impl BlockKind {
    fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Each => "each",
            BlockKind::If(_) => "if",
        }
    }
}

struct OpenBlock {
    kind: BlockKind,
    nodes: Vec<Node>,
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template text.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut cursor = 0;

        for found in TAG_RE.find_iter(text) {
            push_text(current(&mut root, &mut stack), &text[cursor..found.start()], cursor)?;
            cursor = found.end();

            let offset = found.start();
            let tag = text[found.start() + 2..found.end() - 2].trim();

            if let Some(open) = tag.strip_prefix('#') {
                stack.push(OpenBlock {
                    kind: parse_block(open.trim(), offset)?,
                    nodes: Vec::new(),
                });
            } else if let Some(close) = tag.strip_prefix('/') {
                let close = close.trim();
                let block = match stack.pop() {
                    Some(block) if block.kind.keyword() == close => block,
                    _ => {
                        return Err(TemplateError::UnexpectedClose {
                            found: close.to_string(),
                            offset,
                        });
                    }
                };
                let node = match block.kind {
                    BlockKind::Each => Node::Each(block.nodes),
                    BlockKind::If(field) => Node::If(field, block.nodes),
                };
                current(&mut root, &mut stack).push(node);
            } else if tag == "this" {
                if !stack.iter().any(|b| b.kind == BlockKind::Each) {
                    return Err(TemplateError::ThisOutsideEach(offset));
                }
                current(&mut root, &mut stack).push(Node::This);
            } else {
                let field = Field::parse(tag).ok_or_else(|| TemplateError::UnknownField {
                    name: tag.to_string(),
                    offset,
                })?;
                current(&mut root, &mut stack).push(Node::Field(field));
            }
        }

        push_text(current(&mut root, &mut stack), &text[cursor..], cursor)?;

        if let Some(block) = stack.pop() {
            return Err(TemplateError::UnclosedBlock(block.kind.keyword().to_string()));
        }

        Ok(Self { nodes: root })
    }

    /// Render the template against a context.
    pub fn render(&self, ctx: &DescriptionContext<'_>) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, ctx, None, &mut out);
        out
    }
}

fn current<'a>(root: &'a mut Vec<Node>, stack: &'a mut [OpenBlock]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(block) => &mut block.nodes,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str, base_offset: usize) -> Result<(), TemplateError> {
    if let Some(pos) = text.find("{{") {
        return Err(TemplateError::Unterminated(base_offset + pos));
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
    Ok(())
}

fn parse_block(open: &str, offset: usize) -> Result<BlockKind, TemplateError> {
    let malformed = || TemplateError::MalformedTag {
        tag: format!("#{open}"),
        offset,
    };

    let mut parts = open.split_whitespace();
    let keyword = parts.next().ok_or_else(malformed)?;
    let arg = parts.next().ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }

    let field = Field::parse(arg).ok_or_else(|| TemplateError::UnknownField {
        name: arg.to_string(),
        offset,
    })?;

    match keyword {
        "each" if field == Field::AffectedPaths => Ok(BlockKind::Each),
        "if" => Ok(BlockKind::If(field)),
        _ => Err(malformed()),
    }
}

fn render_nodes(
    nodes: &[Node],
    ctx: &DescriptionContext<'_>,
    item: Option<&str>,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(field) => ctx.write_field(*field, out),
            Node::This => out.push_str(item.unwrap_or_default()),
            Node::Each(body) => {
                for path in ctx.affected_paths {
                    render_nodes(body, ctx, Some(path), out);
                }
            }
            Node::If(field, body) => {
                if ctx.is_set(*field) {
                    render_nodes(body, ctx, item, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(base: &'a str, paths: &'a [String], extra: &'a str) -> DescriptionContext<'a> {
        DescriptionContext {
            base_directory: base,
            affected_paths: paths,
            extra_description: extra,
        }
    }

    #[test]
    fn test_plain_text() {
        let tpl = Template::parse("no placeholders here").unwrap();
        assert_eq!(tpl.render(&ctx("a", &[], "")), "no placeholders here");
    }

    #[test]
    fn test_fields_substituted() {
        let paths = vec!["a/x.cc".to_string(), "a/y.cc".to_string()];
        let tpl = Template::parse("{{ baseDirectory }}:\n{{affectedPaths}}").unwrap();
        assert_eq!(tpl.render(&ctx("a", &paths, "")), "a:\na/x.cc\na/y.cc");
    }

    #[test]
    fn test_each_block() {
        let paths = vec!["a/x.cc".to_string(), "a/y.cc".to_string()];
        let tpl = Template::parse("{{#each affectedPaths}}- {{this}}\n{{/each}}").unwrap();
        assert_eq!(tpl.render(&ctx("a", &paths, "")), "- a/x.cc\n- a/y.cc\n");
    }

    #[test]
    fn test_if_block() {
        let tpl = Template::parse("[{{#if extraDescription}}{{extraDescription}}{{/if}}]").unwrap();
        assert_eq!(tpl.render(&ctx("a", &[], "")), "[]");
        assert_eq!(tpl.render(&ctx("a", &[], "x")), "[x]");
    }

    #[test]
    fn test_unknown_field() {
        let err = Template::parse("Hi {{SplitDirectory}}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownField {
                name: "SplitDirectory".to_string(),
                offset: 3,
            }
        );
    }

    #[test]
    fn test_unterminated_tag() {
        let err = Template::parse("ok {{baseDirectory}} then {{oops").unwrap_err();
        assert_eq!(err, TemplateError::Unterminated(26));
    }

    #[test]
    fn test_this_outside_each() {
        let err = Template::parse("{{this}}").unwrap_err();
        assert_eq!(err, TemplateError::ThisOutsideEach(0));
    }

    #[test]
    fn test_unclosed_block() {
        let err = Template::parse("{{#if extraDescription}}x").unwrap_err();
        assert_eq!(err, TemplateError::UnclosedBlock("if".to_string()));
    }

    #[test]
    fn test_mismatched_close() {
        let err = Template::parse("{{#if extraDescription}}x{{/each}}").unwrap_err();
        assert!(matches!(err, TemplateError::UnexpectedClose { found, .. } if found == "each"));
    }

    #[test]
    fn test_each_only_over_paths() {
        let err = Template::parse("{{#each baseDirectory}}{{/each}}").unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTag { .. }));
    }
}
