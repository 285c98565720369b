//! Tree-sitter based Python reader.

use super::operators;
use crate::traits::{ReadError, ReadOptions, Reader};
use meaning_tree::{ByteSpan, IdAllocator, Label, MeaningTree, Node, NodeKind, UnaryOp};
use tracing::debug;
use tree_sitter::{Node as TsNode, Parser, Tree};

/// Static instance of the Python reader for registry.
pub static PYTHON_READER: PythonReader = PythonReader;

/// Python reader using tree-sitter.
pub struct PythonReader;

impl Reader for PythonReader {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn read_with(
        &self,
        source: &str,
        ids: &IdAllocator,
        options: &ReadOptions,
    ) -> Result<MeaningTree, ReadError> {
        read_python_with(source, ids, options)
    }
}

/// Parse Python source into a meaning tree.
pub fn read_python(source: &str, ids: &IdAllocator) -> Result<MeaningTree, ReadError> {
    read_python_with(source, ids, &ReadOptions::default())
}

/// [`read_python`], attaching the value tags in `options` to the nodes
/// spanning exactly their byte ranges.
pub fn read_python_with(
    source: &str,
    ids: &IdAllocator,
    options: &ReadOptions,
) -> Result<MeaningTree, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_python::language().into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))?;

    let ctx = ReadContext {
        source,
        ids,
        options,
    };
    let root = ctx.read_program(&tree)?;
    Ok(MeaningTree::new(root).with_label(Label::origin_language("python")))
}

struct ReadContext<'a> {
    source: &'a str,
    ids: &'a IdAllocator,
    options: &'a ReadOptions,
}

impl<'a> ReadContext<'a> {
    fn node_text(&self, node: TsNode) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Allocate the meaning node for `syntax`, carrying its span and any
    /// value tag supplied for that span.
    fn make(&self, syntax: TsNode, kind: NodeKind) -> Node {
        let span = ByteSpan::from(syntax.byte_range());
        let mut node = self.ids.node(kind).with_span(span);
        if let Some(value) = self.options.value_tags.get(&span) {
            node.set_value_tag(value.clone());
        }
        node
    }

    fn field(&self, node: TsNode<'a>, name: &str) -> Result<TsNode<'a>, ReadError> {
        node.child_by_field_name(name)
            .ok_or_else(|| ReadError::Parse(format!("{} missing {name}", node.kind())))
    }

    fn read_field(&self, node: TsNode<'a>, name: &str) -> Result<Node, ReadError> {
        self.read_expr(self.field(node, name)?)
    }

    /// Named children, comments excluded.
    fn named_children(&self, node: TsNode<'a>) -> Vec<TsNode<'a>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect()
    }

    fn read_program(&self, tree: &'a Tree) -> Result<Node, ReadError> {
        let root = tree.root_node();

        if root.has_error() {
            return Err(ReadError::Parse("syntax error in source".into()));
        }

        let body = self.read_block_stmts(root)?;
        Ok(self.make(root, NodeKind::program(body)))
    }

    fn read_stmt(&self, node: TsNode<'a>) -> Result<Option<Node>, ReadError> {
        let kind = match node.kind() {
            "expression_statement" => {
                let children = self.named_children(node);
                let [expr] = children[..] else {
                    return Err(ReadError::Unsupported(format!(
                        "expression statement with {} expressions",
                        children.len()
                    )));
                };
                NodeKind::expr_stmt(self.read_expr(expr)?)
            }

            "if_statement" => return self.read_if_statement(node).map(Some),
            "while_statement" => {
                if node.child_by_field_name("alternative").is_some() {
                    return Err(ReadError::Unsupported("while ... else".into()));
                }
                NodeKind::while_loop(
                    self.read_field(node, "condition")?,
                    self.read_block(self.field(node, "body")?)?,
                )
            }
            "for_statement" => {
                if node.child_by_field_name("alternative").is_some() {
                    return Err(ReadError::Unsupported("for ... else".into()));
                }
                NodeKind::for_each(
                    self.read_field(node, "left")?,
                    self.read_field(node, "right")?,
                    self.read_block(self.field(node, "body")?)?,
                )
            }

            // Python grammar: return_statement has its value without a field name
            "return_statement" => {
                let value = self.named_children(node).first().copied();
                NodeKind::return_stmt(value.map(|n| self.read_expr(n)).transpose()?)
            }
            "break_statement" => NodeKind::BreakStatement,
            "continue_statement" => NodeKind::ContinueStatement,
            "pass_statement" => NodeKind::EmptyStatement,

            "function_definition" => self.read_function_definition(node)?,
            "decorated_definition" => {
                return self.read_stmt(self.field(node, "definition")?);
            }

            "comment"
            | "import_statement"
            | "import_from_statement"
            | "future_import_statement"
            | "class_definition"
            | "try_statement"
            | "with_statement"
            | "global_statement"
            | "nonlocal_statement" => {
                debug!(kind = node.kind(), "skipping python statement");
                return Ok(None);
            }

            other => return Err(ReadError::Unsupported(format!("statement: {other}"))),
        };
        Ok(Some(self.make(node, kind)))
    }

    fn read_if_statement(&self, node: TsNode<'a>) -> Result<Node, ReadError> {
        let mut cursor = node.walk();
        let alternatives: Vec<_> = node
            .children_by_field_name("alternative", &mut cursor)
            .collect();

        // Fold `elif` chains from the back: each clause becomes the else
        // branch of the one before it.
        let mut else_branch = None;
        for clause in alternatives.into_iter().rev() {
            else_branch = Some(match clause.kind() {
                "else_clause" => self.read_block(self.field(clause, "body")?)?,
                "elif_clause" => {
                    let kind = NodeKind::if_stmt(
                        self.read_field(clause, "condition")?,
                        self.read_block(self.field(clause, "consequence")?)?,
                        else_branch,
                    );
                    self.make(clause, kind)
                }
                other => {
                    return Err(ReadError::UnexpectedNode {
                        expected: "elif_clause or else_clause".into(),
                        got: other.into(),
                    });
                }
            });
        }

        let kind = NodeKind::if_stmt(
            self.read_field(node, "condition")?,
            self.read_block(self.field(node, "consequence")?)?,
            else_branch,
        );
        Ok(self.make(node, kind))
    }

    fn read_function_definition(&self, node: TsNode<'a>) -> Result<NodeKind, ReadError> {
        let name = self.field(node, "name")?;
        let name = self.make(name, NodeKind::ident(self.node_text(name)));
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.read_parameters(p))
            .unwrap_or_default();
        let body = self.read_block(self.field(node, "body")?)?;
        Ok(NodeKind::function(name, parameters, body))
    }

    fn read_parameters(&self, node: TsNode<'a>) -> Vec<Node> {
        let mut params = Vec::new();

        for child in self.named_children(node) {
            let name = match child.kind() {
                "identifier" => Some(child),
                "default_parameter" => child.child_by_field_name("name"),
                // Get just the name, ignore type annotation
                "typed_parameter" | "typed_default_parameter" => child
                    .child(0)
                    .filter(|name| name.kind() == "identifier"),
                _ => None,
            };
            if let Some(name) = name {
                params.push(self.make(name, NodeKind::ident(self.node_text(name))));
            }
        }

        params
    }

    fn read_block(&self, node: TsNode<'a>) -> Result<Node, ReadError> {
        let statements = self.read_block_stmts(node)?;
        Ok(self.make(node, NodeKind::block(statements)))
    }

    fn read_block_stmts(&self, node: TsNode<'a>) -> Result<Vec<Node>, ReadError> {
        let mut stmts = Vec::new();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            if let Some(stmt) = self.read_stmt(child)? {
                stmts.push(stmt);
            }
        }

        Ok(stmts)
    }

    fn read_expr(&self, node: TsNode<'a>) -> Result<Node, ReadError> {
        let kind = match node.kind() {
            // Literals
            "integer" => NodeKind::int(parse_integer(self.node_text(node))?),
            "float" => NodeKind::float(parse_float(self.node_text(node))?),
            "string" => NodeKind::string(self.read_string(node)?),
            "concatenated_string" => {
                let mut value = String::new();
                for part in self.named_children(node) {
                    value.push_str(&self.read_string(part)?);
                }
                NodeKind::string(value)
            }
            "true" => NodeKind::bool(true),
            "false" => NodeKind::bool(false),
            "none" => NodeKind::NullLiteral,

            "identifier" => NodeKind::ident(self.node_text(node)),

            "binary_operator" | "boolean_operator" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = operators::binary_op(op_text).ok_or_else(|| {
                    ReadError::Parse(format!("unknown binary op: {op_text}"))
                })?;
                NodeKind::binary(
                    self.read_field(node, "left")?,
                    op,
                    self.read_field(node, "right")?,
                )
            }
            "comparison_operator" => return self.read_comparison(node),

            "unary_operator" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = operators::unary_op(op_text).ok_or_else(|| {
                    ReadError::Parse(format!("unknown unary op: {op_text}"))
                })?;
                NodeKind::unary(op, self.read_field(node, "argument")?)
            }
            "not_operator" => NodeKind::unary(UnaryOp::Not, self.read_field(node, "argument")?),
            "await" => {
                let operand = self.named_children(node).first().copied().ok_or_else(|| {
                    ReadError::Parse("await missing operand".into())
                })?;
                NodeKind::unary(UnaryOp::Await, self.read_expr(operand)?)
            }

            "call" => {
                let arguments = self.field(node, "arguments")?;
                if arguments.kind() != "argument_list" {
                    return Err(ReadError::Unsupported(format!("call with {}", arguments.kind())));
                }
                let arguments = self
                    .named_children(arguments)
                    .into_iter()
                    .map(|arg| self.read_expr(arg))
                    .collect::<Result<_, _>>()?;
                NodeKind::call(self.read_field(node, "function")?, arguments)
            }
            "attribute" => NodeKind::member(
                self.read_field(node, "object")?,
                self.read_field(node, "attribute")?,
            ),
            "subscript" => {
                let mut cursor = node.walk();
                let indices = node
                    .children_by_field_name("subscript", &mut cursor)
                    .map(|index| self.read_expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                NodeKind::index(self.read_field(node, "value")?, indices)
            }

            "list" | "tuple" => NodeKind::ArrayLiteral {
                elements: self.read_all(node)?,
            },
            "dictionary" => NodeKind::DictLiteral {
                entries: self.read_all(node)?,
            },
            "pair" => NodeKind::KeyValuePair {
                key: Box::new(self.read_field(node, "key")?),
                value: Box::new(self.read_field(node, "value")?),
            },

            "parenthesized_expression" => {
                let children = self.named_children(node);
                let [inner] = children[..] else {
                    return Err(ReadError::Parse(
                        "parenthesized_expression missing inner".into(),
                    ));
                };
                NodeKind::paren(self.read_expr(inner)?)
            }

            // `then if condition else otherwise`; the grammar gives no field names
            "conditional_expression" => {
                let children = self.named_children(node);
                let [then_expr, condition, else_expr] = children[..] else {
                    return Err(ReadError::Parse(
                        "conditional_expression needs 3 operands".into(),
                    ));
                };
                NodeKind::ternary(
                    self.read_expr(condition)?,
                    self.read_expr(then_expr)?,
                    self.read_expr(else_expr)?,
                )
            }

            "lambda" => NodeKind::Lambda {
                parameters: node
                    .child_by_field_name("parameters")
                    .map(|p| self.read_parameters(p))
                    .unwrap_or_default(),
                body: Box::new(self.read_field(node, "body")?),
            },

            // Assignment expression (walrus operator :=)
            "named_expression" => NodeKind::assign(
                self.read_field(node, "name")?,
                self.read_field(node, "value")?,
            ),
            "assignment" => {
                if node.child_by_field_name("right").is_none() {
                    return Err(ReadError::Unsupported("annotation without value".into()));
                }
                NodeKind::assign(
                    self.read_field(node, "left")?,
                    self.read_field(node, "right")?,
                )
            }
            "augmented_assignment" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = operators::augmented_op(op_text).ok_or_else(|| {
                    ReadError::Parse(format!("unknown augmented op: {op_text}"))
                })?;
                NodeKind::augmented_assign(
                    self.read_field(node, "left")?,
                    op,
                    self.read_field(node, "right")?,
                )
            }

            other => return Err(ReadError::Unsupported(format!("expression: {other}"))),
        };
        Ok(self.make(node, kind))
    }

    fn read_all(&self, node: TsNode<'a>) -> Result<Vec<Node>, ReadError> {
        self.named_children(node)
            .into_iter()
            .map(|child| self.read_expr(child))
            .collect()
    }

    /// `a < b` reads as a binary expression; `a < b < c` as one
    /// comparison per link, sharing middle operands by structure.
    fn read_comparison(&self, node: TsNode<'a>) -> Result<Node, ReadError> {
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            if child.kind() == "comment" {
                continue;
            }
            if child.is_named() {
                operands.push(child);
            } else {
                let text = self.node_text(child);
                ops.push(operators::binary_op(text).ok_or_else(|| {
                    ReadError::Parse(format!("unknown comparison op: {text}"))
                })?);
            }
        }

        if ops.is_empty() || operands.len() != ops.len() + 1 {
            return Err(ReadError::Parse(
                "comparison needs alternating operands and operators".into(),
            ));
        }

        if let ([op], [left, right]) = (&ops[..], &operands[..]) {
            let kind = NodeKind::binary(self.read_expr(*left)?, *op, self.read_expr(*right)?);
            return Ok(self.make(node, kind));
        }

        let mut links = Vec::with_capacity(ops.len());
        let mut left = self.read_expr(operands[0])?;
        for (op, right_syntax) in ops.into_iter().zip(&operands[1..]) {
            let right = self.read_expr(*right_syntax)?;
            let next_left = right.clone_with_fresh_ids(self.ids);
            let start = left.byte_span().map_or(0, |s| s.start);
            let end = right.byte_span().map_or(start, |s| s.end());
            let link = self
                .ids
                .node(NodeKind::binary(left, op, right))
                .with_span(ByteSpan::from(start..end));
            links.push(link);
            left = next_left;
        }

        Ok(self.make(node, NodeKind::CompoundComparison { comparisons: links }))
    }

    fn read_string(&self, node: TsNode<'a>) -> Result<String, ReadError> {
        let mut cursor = node.walk();
        if node.children(&mut cursor).any(|c| c.kind() == "interpolation") {
            return Err(ReadError::Unsupported("formatted string".into()));
        }
        unquote(self.node_text(node))
    }
}

fn parse_integer(text: &str) -> Result<i64, ReadError> {
    let digits = text.replace('_', "").to_ascii_lowercase();
    if digits.ends_with('j') {
        return Err(ReadError::Unsupported(format!("complex literal {text}")));
    }
    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        digits.parse()
    };
    parsed.map_err(|err| ReadError::Unsupported(format!("integer {text}: {err}")))
}

fn parse_float(text: &str) -> Result<f64, ReadError> {
    let digits = text.replace('_', "");
    if digits.ends_with(['j', 'J']) {
        return Err(ReadError::Unsupported(format!("complex literal {text}")));
    }
    digits
        .parse()
        .map_err(|err| ReadError::Parse(format!("float {text}: {err}")))
}

/// Strip the prefix and quotes of a Python string literal and resolve the
/// common escapes.
fn unquote(text: &str) -> Result<String, ReadError> {
    let body_start = text
        .find(['"', '\''])
        .ok_or_else(|| ReadError::Parse(format!("not a string literal: {text}")))?;
    let (prefix, quoted) = text.split_at(body_start);
    let raw = prefix.contains(['r', 'R']);

    let quote = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let inner = quoted
        .strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .ok_or_else(|| ReadError::Parse(format!("unterminated string literal: {text}")))?;

    if raw {
        return Ok(inner.to_string());
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}
