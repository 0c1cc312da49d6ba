//! Go parser built on top of `tree-sitter-go`.
//!
//! The concrete syntax tree is lowered into the arena [`Ast`]. Statements and
//! expressions that rewrites inspect get their own node kinds; types,
//! composite literals and anything else stay verbatim as [`Node::Raw`].
//! Comments are attached to the list they appear in, either as a trailing
//! comment of the previous entry or as an entry of their own.

use std::ops::Range;

use eyre::eyre;
use tracing::trace;
use tree_sitter::{Node as TsNode, Parser as TsParser};

use crate::ast::{
    AssignStmt, Ast, BasicLit, BinaryExpr, Block, BranchStmt, CallExpr, CallKeyword, CallStmt,
    CaseClause, Comment, DeclKeyword, ExprStmt, FieldList, File, ForStmt, FuncDecl, FuncLit,
    GenDecl, Ident, IfStmt, ImportSpec, IncDecStmt, IndexExpr, LabeledStmt, Node, NodeId,
    PackageClause, Param, ParenExpr, RangeStmt, Raw, ReturnStmt, SelectStmt, SelectorExpr, Span,
    SwitchStmt, TrailingComment, TypeSpec, TypeSwitchStmt, UnaryExpr, ValueSpec,
};
use crate::error::SyntaxError;
use crate::resolve;

/// High-level parser that owns a tree-sitter instance for Go.
pub struct GoParser {
    parser: TsParser,
}

impl GoParser {
    /// Create a new parser instance with the Go grammar loaded.
    pub fn new() -> eyre::Result<Self> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|err| eyre!("Failed to load tree-sitter Go grammar: {err}"))?;
        Ok(Self { parser })
    }

    /// Parse a Go source file and resolve its identifiers.
    pub fn parse(&mut self, source: &str) -> Result<Ast, SyntaxError> {
        let tree = self.parser.parse(source, None).ok_or_else(|| SyntaxError {
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;
        let root = tree.root_node();
        if let Some(bad) = first_error(root) {
            return Err(syntax_error(bad, source));
        }

        let mut lowering = Lowering {
            source,
            ast: Ast::new(source),
        };
        let file = lowering.file(root);
        let mut ast = lowering.ast;
        ast.set_root(file);
        ast.set_raw_strings(raw_strings(root));
        resolve::resolve(&mut ast);
        Ok(ast)
    }
}

fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn syntax_error(node: TsNode<'_>, source: &str) -> SyntaxError {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("expected {}", node.kind())
    } else {
        let text = source[node.byte_range()].lines().next().unwrap_or("");
        let snippet: String = text.chars().take(24).collect();
        if snippet.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected `{snippet}`")
        }
    };
    SyntaxError {
        line: position.row + 1,
        column: position.column + 1,
        message,
    }
}

/// Byte ranges of every raw string literal below `root`, in source order.
fn raw_strings(root: TsNode<'_>) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut cursor = root.walk();
    'walk: loop {
        let node = cursor.node();
        if node.kind() == "raw_string_literal" {
            ranges.push(node.byte_range());
        } else if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    ranges
}

/// Named children with `statement_list` wrappers flattened away.
fn list_items<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    let mut items = Vec::new();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "statement_list" {
            items.extend(list_items(child));
        } else {
            items.push(child);
        }
    }
    items
}

/// Named children that follow the first `token` child.
fn items_after<'t>(node: TsNode<'t>, token: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    let mut seen = false;
    let mut items = Vec::new();
    for child in node.children(&mut cursor) {
        if !seen {
            seen = !child.is_named() && child.kind() == token;
            continue;
        }
        if child.kind() == "statement_list" {
            items.extend(list_items(child));
        } else if child.is_named() {
            items.push(child);
        }
    }
    items
}

fn has_comment_child(node: TsNode<'_>) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| child.kind() == "comment");
    found
}

fn has_token(node: TsNode<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

fn named_non_comment<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn span_of(node: TsNode<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

struct Lowering<'s> {
    source: &'s str,
    ast: Ast,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn alloc(&mut self, kind: Node, node: TsNode<'_>) -> NodeId {
        self.ast.alloc(kind, Some(span_of(node)))
    }

    fn raw(&mut self, node: TsNode<'_>) -> NodeId {
        trace!(kind = node.kind(), "keeping syntax verbatim");
        let text = self.text(node).to_string();
        self.alloc(Node::Raw(Raw { text }), node)
    }

    /// Verbatim text from `lo` (after leading whitespace) to the end of `node`.
    fn raw_tail(&mut self, node: TsNode<'_>, lo: usize) -> NodeId {
        let hi = node.end_byte();
        let tail = &self.source[lo..hi];
        let lo = lo + (tail.len() - tail.trim_start().len());
        let text = self.source[lo..hi].to_string();
        self.ast.alloc(Node::Raw(Raw { text }), Some(Span::new(lo, hi)))
    }

    fn ident(&mut self, node: TsNode<'_>) -> NodeId {
        let name = self.text(node);
        self.alloc(Node::Ident(Ident::new(name)), node)
    }

    /// Lowers list entries, turning comments into entries or trailing
    /// comments and recording blank lines between entries.
    fn list<F>(&mut self, items: Vec<TsNode<'_>>, mut lower: F) -> Vec<NodeId>
    where
        F: FnMut(&mut Self, TsNode<'_>) -> NodeId,
    {
        let mut out: Vec<NodeId> = Vec::new();
        let mut prev_end: Option<(usize, usize)> = None;
        for item in items {
            let row = item.start_position().row;
            let is_comment = item.kind() == "comment";
            if let (true, Some(&last), Some((end_row, end_byte))) =
                (is_comment, out.last(), prev_end)
            {
                let gap = &self.source[end_byte..item.start_byte()];
                if row == end_row
                    && gap.trim().is_empty()
                    && self.ast.data(last).trailing.is_none()
                {
                    self.ast.data_mut(last).trailing = Some(TrailingComment {
                        gap: gap.to_string(),
                        text: self.text(item).to_string(),
                    });
                    prev_end = Some((item.end_position().row, item.end_byte()));
                    continue;
                }
            }

            let id = if is_comment {
                let text = self.text(item).to_string();
                self.alloc(Node::Comment(Comment { text }), item)
            } else {
                lower(self, item)
            };
            self.ast.data_mut(id).blank_before =
                prev_end.is_some_and(|(end_row, _)| row > end_row + 1);
            out.push(id);
            prev_end = Some((item.end_position().row, item.end_byte()));
        }
        out
    }

    fn file(&mut self, root: TsNode<'_>) -> NodeId {
        let decls = self.list(list_items(root), Self::top_level);
        self.ast.alloc(
            Node::File(File { decls }),
            Some(Span::new(0, self.source.len())),
        )
    }

    fn top_level(&mut self, node: TsNode<'_>) -> NodeId {
        let lowered = match node.kind() {
            "package_clause" => self.package_clause(node),
            "function_declaration" | "method_declaration" => self.func_decl(node),
            _ => return self.stmt(node),
        };
        lowered.unwrap_or_else(|| self.raw(node))
    }

    fn package_clause(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let name = named_non_comment(node).into_iter().next()?;
        let name = self.ident(name);
        Some(self.alloc(Node::PackageClause(PackageClause { name }), node))
    }

    fn gen_decl(&mut self, node: TsNode<'_>, keyword: DeclKeyword) -> NodeId {
        let mut container = node;
        let mut grouped = has_token(node, "(");
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "import_spec_list" | "var_spec_list") {
                container = child;
                grouped = true;
            }
        }
        let mut cursor = container.walk();
        let items: Vec<_> = container
            .named_children(&mut cursor)
            .filter(|child| {
                matches!(
                    child.kind(),
                    "import_spec"
                        | "const_spec"
                        | "var_spec"
                        | "type_spec"
                        | "type_alias"
                        | "comment"
                )
            })
            .collect();
        let specs = self.list(items, |this, spec| {
            this.spec(spec).unwrap_or_else(|| this.raw(spec))
        });
        self.alloc(
            Node::GenDecl(GenDecl {
                keyword,
                grouped,
                specs,
            }),
            node,
        )
    }

    fn spec(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let kind = match node.kind() {
            "import_spec" => {
                let name = node.child_by_field_name("name").map(|name| self.ident(name));
                let path = self.text(node.child_by_field_name("path")?).to_string();
                Node::ImportSpec(ImportSpec { name, path })
            }
            "const_spec" | "var_spec" => {
                let mut cursor = node.walk();
                let names: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
                let names = names.into_iter().map(|name| self.ident(name)).collect();
                let ty = node.child_by_field_name("type").map(|ty| self.raw(ty));
                let values = match node.child_by_field_name("value") {
                    Some(values) => self.exprs(values),
                    None => Vec::new(),
                };
                Node::ValueSpec(ValueSpec { names, ty, values })
            }
            "type_spec" | "type_alias" => {
                let name_node = node.child_by_field_name("name")?;
                let name = self.ident(name_node);
                let ty = self.raw_tail(node, name_node.end_byte());
                Node::TypeSpec(TypeSpec { name, ty })
            }
            _ => return None,
        };
        Some(self.alloc(kind, node))
    }

    fn func_decl(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let recv = match node.child_by_field_name("receiver") {
            Some(recv) => Some(self.field_list(recv)),
            None => None,
        };
        let name = self.ident(node.child_by_field_name("name")?);
        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|params| self.raw(params));
        let params = self.field_list(node.child_by_field_name("parameters")?);
        let results = node
            .child_by_field_name("result")
            .map(|result| self.results(result));
        let body = node.child_by_field_name("body").map(|body| self.block(body));
        Some(self.alloc(
            Node::FuncDecl(FuncDecl {
                recv,
                name,
                type_params,
                params,
                results,
                body,
            }),
            node,
        ))
    }

    /// A parenthesized result list, or a single result type kept verbatim.
    fn results(&mut self, node: TsNode<'_>) -> NodeId {
        if node.kind() == "parameter_list" {
            self.field_list(node)
        } else {
            self.raw(node)
        }
    }

    fn field_list(&mut self, node: TsNode<'_>) -> NodeId {
        if has_comment_child(node) {
            return self.raw(node);
        }
        let list = named_non_comment(node)
            .into_iter()
            .map(|param| self.param(param))
            .collect();
        self.alloc(Node::FieldList(FieldList { list }), node)
    }

    fn param(&mut self, node: TsNode<'_>) -> NodeId {
        if !matches!(
            node.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            return self.raw(node);
        }
        let mut cursor = node.walk();
        let name_nodes: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
        let lo = name_nodes
            .last()
            .map_or(node.start_byte(), |name| name.end_byte());
        let names = name_nodes.into_iter().map(|name| self.ident(name)).collect();
        let ty = self.raw_tail(node, lo);
        self.alloc(Node::Param(Param { names, ty }), node)
    }

    fn block(&mut self, node: TsNode<'_>) -> NodeId {
        let stmts = self.list(list_items(node), Self::stmt);
        self.alloc(Node::Block(Block { stmts }), node)
    }

    fn stmt(&mut self, node: TsNode<'_>) -> NodeId {
        self.try_stmt(node).unwrap_or_else(|| self.raw(node))
    }

    fn try_stmt(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let kind = node.kind();
        match kind {
            "block" => return Some(self.block(node)),
            "expression_switch_statement" => return self.switch(node),
            "type_switch_statement" => return self.type_switch(node),
            "select_statement" => return Some(self.select(node)),
            "import_declaration" => return Some(self.gen_decl(node, DeclKeyword::Import)),
            "const_declaration" => return Some(self.gen_decl(node, DeclKeyword::Const)),
            "var_declaration" => return Some(self.gen_decl(node, DeclKeyword::Var)),
            "type_declaration" => return Some(self.gen_decl(node, DeclKeyword::Type)),
            _ => {}
        }
        if has_comment_child(node) {
            return None;
        }
        let lowered = match kind {
            "expression_statement" => {
                let x = named_non_comment(node).into_iter().next()?;
                Node::ExprStmt(ExprStmt {
                    x: self.expr(x),
                })
            }
            "short_var_declaration" => Node::Assign(AssignStmt {
                lhs: self.exprs(node.child_by_field_name("left")?),
                op: ":=".to_string(),
                rhs: self.exprs(node.child_by_field_name("right")?),
            }),
            "assignment_statement" => Node::Assign(AssignStmt {
                lhs: self.exprs(node.child_by_field_name("left")?),
                op: self.text(node.child_by_field_name("operator")?).to_string(),
                rhs: self.exprs(node.child_by_field_name("right")?),
            }),
            "receive_statement" => {
                let x = self.expr(node.child_by_field_name("right")?);
                let op = if has_token(node, ":=") { ":=" } else { "=" };
                match node.child_by_field_name("left") {
                    Some(left) => Node::Assign(AssignStmt {
                        lhs: self.exprs(left),
                        op: op.to_string(),
                        rhs: vec![x],
                    }),
                    None => Node::ExprStmt(ExprStmt { x }),
                }
            }
            "inc_statement" | "dec_statement" => {
                let x = named_non_comment(node).into_iter().next()?;
                Node::IncDec(IncDecStmt {
                    x: self.expr(x),
                    inc: kind == "inc_statement",
                })
            }
            "return_statement" => {
                let results = match named_non_comment(node).into_iter().next() {
                    Some(list) => self.exprs(list),
                    None => Vec::new(),
                };
                Node::Return(ReturnStmt { results })
            }
            "break_statement" | "continue_statement" | "goto_statement"
            | "fallthrough_statement" => {
                let keyword = kind.trim_end_matches("_statement").to_string();
                let label = named_non_comment(node)
                    .into_iter()
                    .next()
                    .map(|label| self.ident(label));
                Node::Branch(BranchStmt { keyword, label })
            }
            "labeled_statement" => {
                let label_node = node.child_by_field_name("label")?;
                let label = self.ident(label_node);
                let stmt = named_non_comment(node)
                    .into_iter()
                    .find(|child| child.id() != label_node.id())
                    .map(|stmt| self.stmt(stmt));
                Node::Labeled(LabeledStmt { label, stmt })
            }
            "go_statement" | "defer_statement" => {
                let call = named_non_comment(node).into_iter().next()?;
                let keyword = if kind == "go_statement" {
                    CallKeyword::Go
                } else {
                    CallKeyword::Defer
                };
                Node::CallStmt(CallStmt {
                    keyword,
                    call: self.expr(call),
                })
            }
            "if_statement" => {
                let init = node
                    .child_by_field_name("initializer")
                    .map(|init| self.stmt(init));
                let cond = self.expr(node.child_by_field_name("condition")?);
                let body = self.block(node.child_by_field_name("consequence")?);
                let else_branch = node.child_by_field_name("alternative").map(|alt| {
                    if alt.kind() == "block" {
                        self.block(alt)
                    } else {
                        self.stmt(alt)
                    }
                });
                Node::If(IfStmt {
                    init,
                    cond,
                    body,
                    else_branch,
                })
            }
            "for_statement" => return self.for_stmt(node),
            "empty_statement" => Node::Empty,
            _ => return None,
        };
        Some(self.alloc(lowered, node))
    }

    fn for_stmt(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let body_node = node.child_by_field_name("body")?;
        let clause = named_non_comment(node)
            .into_iter()
            .find(|child| child.id() != body_node.id());
        let lowered = match clause {
            None => {
                let body = self.block(body_node);
                Node::For(ForStmt {
                    init: None,
                    cond: None,
                    post: None,
                    body,
                })
            }
            Some(clause) if clause.kind() == "for_clause" => {
                if has_comment_child(clause) {
                    return None;
                }
                let init = clause
                    .child_by_field_name("initializer")
                    .map(|init| self.stmt(init));
                let cond = clause
                    .child_by_field_name("condition")
                    .map(|cond| self.expr(cond));
                let post = clause
                    .child_by_field_name("update")
                    .map(|post| self.stmt(post));
                let body = self.block(body_node);
                Node::For(ForStmt {
                    init,
                    cond,
                    post,
                    body,
                })
            }
            Some(clause) if clause.kind() == "range_clause" => {
                if has_comment_child(clause) {
                    return None;
                }
                let lhs = match clause.child_by_field_name("left") {
                    Some(left) => self.exprs(left),
                    None => Vec::new(),
                };
                let define = has_token(clause, ":=");
                let x = self.expr(clause.child_by_field_name("right")?);
                let body = self.block(body_node);
                Node::Range(RangeStmt {
                    lhs,
                    define,
                    x,
                    body,
                })
            }
            Some(cond) => {
                let cond = self.expr(cond);
                let body = self.block(body_node);
                Node::For(ForStmt {
                    init: None,
                    cond: Some(cond),
                    post: None,
                    body,
                })
            }
        };
        Some(self.alloc(lowered, node))
    }

    fn switch(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let init = node
            .child_by_field_name("initializer")
            .map(|init| self.stmt(init));
        let tag = node.child_by_field_name("value").map(|tag| self.expr(tag));
        let clauses = self.clauses(node);
        Some(self.alloc(Node::Switch(SwitchStmt { init, tag, clauses }), node))
    }

    fn type_switch(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        let alias = match node.child_by_field_name("alias") {
            Some(alias) => match named_non_comment(alias).as_slice() {
                [name] => Some(*name),
                _ => return None,
            },
            None => None,
        };
        let init = node
            .child_by_field_name("initializer")
            .map(|init| self.stmt(init));
        let binding = alias.map(|name| self.ident(name));
        let x = self.expr(node.child_by_field_name("value")?);
        let clauses = self.clauses(node);
        Some(self.alloc(
            Node::TypeSwitch(TypeSwitchStmt {
                init,
                binding,
                x,
                clauses,
            }),
            node,
        ))
    }

    fn select(&mut self, node: TsNode<'_>) -> NodeId {
        let clauses = self.clauses(node);
        self.alloc(Node::Select(SelectStmt { clauses }), node)
    }

    /// Clauses between the braces of a switch, type switch or select.
    fn clauses(&mut self, node: TsNode<'_>) -> Vec<NodeId> {
        let items = items_after(node, "{")
            .into_iter()
            .filter(|child| {
                matches!(
                    child.kind(),
                    "expression_case"
                        | "type_case"
                        | "communication_case"
                        | "default_case"
                        | "comment"
                )
            })
            .collect();
        self.list(items, Self::case_clause)
    }

    fn case_clause(&mut self, node: TsNode<'_>) -> NodeId {
        let is_default = node.kind() == "default_case";
        let list = match node.kind() {
            "type_case" => {
                let mut cursor = node.walk();
                let types: Vec<_> = node.children_by_field_name("type", &mut cursor).collect();
                types.into_iter().map(|ty| self.raw(ty)).collect()
            }
            "communication_case" => match node.child_by_field_name("communication") {
                Some(comm) => vec![self.stmt(comm)],
                None => Vec::new(),
            },
            _ => match node.child_by_field_name("value") {
                Some(values) => self.exprs(values),
                None => Vec::new(),
            },
        };
        let body = self.list(items_after(node, ":"), Self::stmt);
        self.alloc(
            Node::CaseClause(CaseClause {
                list,
                is_default,
                body,
            }),
            node,
        )
    }

    /// Lowers an `expression_list`, or a single expression as a one-element list.
    fn exprs(&mut self, node: TsNode<'_>) -> Vec<NodeId> {
        if node.kind() != "expression_list" {
            return vec![self.expr(node)];
        }
        named_non_comment(node)
            .into_iter()
            .map(|expr| self.expr(expr))
            .collect()
    }

    fn expr(&mut self, node: TsNode<'_>) -> NodeId {
        self.try_expr(node).unwrap_or_else(|| self.raw(node))
    }

    fn try_expr(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        if has_comment_child(node) {
            return None;
        }
        let lowered = match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier"
            | "label_name" | "blank_identifier" | "dot" | "nil" | "true" | "false" | "iota" => {
                Node::Ident(Ident::new(self.text(node)))
            }
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal"
            | "interpreted_string_literal" | "raw_string_literal" => Node::BasicLit(BasicLit {
                text: self.text(node).to_string(),
            }),
            "binary_expression" => {
                let op = self.text(node.child_by_field_name("operator")?).to_string();
                let x = self.expr(node.child_by_field_name("left")?);
                let y = self.expr(node.child_by_field_name("right")?);
                Node::Binary(BinaryExpr { x, op, y })
            }
            "unary_expression" => {
                let op = self.text(node.child_by_field_name("operator")?).to_string();
                let x = self.expr(node.child_by_field_name("operand")?);
                Node::Unary(UnaryExpr { op, x })
            }
            "call_expression" => {
                if node.child_by_field_name("type_arguments").is_some() {
                    return None;
                }
                let args_node = node.child_by_field_name("arguments")?;
                if has_comment_child(args_node) {
                    return None;
                }
                let fun = self.expr(node.child_by_field_name("function")?);
                let mut args = Vec::new();
                let mut ellipsis = false;
                for arg in named_non_comment(args_node) {
                    if arg.kind() == "variadic_argument" {
                        let inner = named_non_comment(arg).into_iter().next()?;
                        args.push(self.expr(inner));
                        ellipsis = true;
                    } else {
                        args.push(self.expr(arg));
                    }
                }
                Node::Call(CallExpr {
                    fun,
                    args,
                    ellipsis,
                })
            }
            "selector_expression" => {
                let x = self.expr(node.child_by_field_name("operand")?);
                let sel = self.ident(node.child_by_field_name("field")?);
                Node::Selector(SelectorExpr { x, sel })
            }
            "index_expression" => {
                let x = self.expr(node.child_by_field_name("operand")?);
                let index = self.expr(node.child_by_field_name("index")?);
                Node::Index(IndexExpr { x, index })
            }
            "func_literal" => {
                let params = self.field_list(node.child_by_field_name("parameters")?);
                let results = node
                    .child_by_field_name("result")
                    .map(|result| self.results(result));
                let body = self.block(node.child_by_field_name("body")?);
                Node::FuncLit(FuncLit {
                    params,
                    results,
                    body,
                })
            }
            "parenthesized_expression" => {
                let inner = named_non_comment(node).into_iter().next()?;
                Node::Paren(ParenExpr {
                    x: self.expr(inner),
                })
            }
            _ => return None,
        };
        Some(self.alloc(lowered, node))
    }
}
