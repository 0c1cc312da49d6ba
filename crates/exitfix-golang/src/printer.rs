//! Go source printer.
//!
//! Nodes that still carry their source span and whose subtree was not edited
//! are copied from the original text, re-indented to their new depth. Edited
//! nodes are laid out the way gofmt lays them out: tab indentation, one
//! statement per line, sorted import groups.

use crate::ast::{Ast, DeclKeyword, GenDecl, LabeledStmt, Node, NodeId, Span};
use crate::error::PrintError;

type Result<T> = std::result::Result<T, PrintError>;

/// Public entry point used by the fix engine.
#[derive(Clone, Debug, Default)]
pub struct GoPrinter;

impl GoPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, ast: &Ast) -> Result<String> {
        let mut emitter = GoEmitter::new(ast);
        emitter.emit_file()?;
        Ok(emitter.finish())
    }
}

/// Top-level entry kinds; a change of kind forces a blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Package,
    Gen(DeclKeyword),
    Func,
    Comment,
    Other,
}

fn decl_kind(node: &Node) -> DeclKind {
    match node {
        Node::PackageClause(_) => DeclKind::Package,
        Node::GenDecl(group) => DeclKind::Gen(group.keyword),
        Node::FuncDecl(_) => DeclKind::Func,
        Node::Comment(_) => DeclKind::Comment,
        _ => DeclKind::Other,
    }
}

fn unexpected(context: &'static str, node: &Node) -> PrintError {
    PrintError::Unexpected {
        context,
        found: node.kind_name(),
    }
}

/// Leading whitespace of the line that contains byte `at`.
fn line_indent(source: &str, at: usize) -> &str {
    let start = source[..at].rfind('\n').map_or(0, |newline| newline + 1);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

struct GoEmitter<'a> {
    ast: &'a Ast,
    code: String,
    indent: usize,
    pristine: Vec<Option<bool>>,
}

impl<'a> GoEmitter<'a> {
    fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            code: String::new(),
            indent: 0,
            pristine: vec![None; ast.len()],
        }
    }

    fn finish(mut self) -> String {
        while self.code.ends_with("\n\n") {
            self.code.pop();
        }
        if !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code
    }

    /// A node is pristine when it and everything below it still match the
    /// source text.
    fn is_pristine(&mut self, id: NodeId) -> bool {
        if let Some(known) = self.pristine[id.index()] {
            return known;
        }
        let ast = self.ast;
        let data = ast.data(id);
        let mut pristine = data.span.is_some();
        'fields: for &field in data.kind.fields() {
            if !pristine {
                break;
            }
            for &child in data.kind.children(field) {
                if !self.is_pristine(child) {
                    pristine = false;
                    break 'fields;
                }
            }
        }
        self.pristine[id.index()] = Some(pristine);
        pristine
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.code.push('\t');
        }
    }

    fn newline(&mut self) {
        self.code.push('\n');
    }

    /// Copies the source text of `id`, moving continuation lines from the
    /// original indentation to the current one. Lines that start inside a
    /// raw string literal are part of its value and stay as they are.
    fn emit_verbatim(&mut self, id: NodeId) {
        let ast = self.ast;
        let source = ast.source();
        let Some(span) = ast.data(id).span else {
            return;
        };
        let text = &source[span.range()];
        let base = self.verbatim_base(id, span);
        let target = "\t".repeat(self.indent);
        if base == target || !text.contains('\n') {
            self.code.push_str(text);
            return;
        }
        let mut at = span.lo as usize;
        for (index, line) in text.split('\n').enumerate() {
            if index == 0 {
                self.code.push_str(line);
            } else {
                self.newline();
                if ast.in_raw_string(at) {
                    self.code.push_str(line);
                } else {
                    match line.strip_prefix(base) {
                        Some(rest) if !rest.is_empty() => {
                            self.code.push_str(&target);
                            self.code.push_str(rest);
                        }
                        Some(_) => {}
                        None => self.code.push_str(line),
                    }
                }
            }
            at += line.len() + 1;
        }
    }

    /// Indentation the lines after the first one of `id` are relative to.
    /// A label sits one level left of its statement, so a labelled statement
    /// is measured from the line the statement starts on.
    fn verbatim_base(&self, id: NodeId, span: Span) -> &'a str {
        let ast = self.ast;
        let source = ast.source();
        let lo = span.lo as usize;
        if let Node::Labeled(LabeledStmt {
            stmt: Some(stmt), ..
        }) = ast.node(id)
        {
            if let Some(inner) = ast.data(*stmt).span {
                let inner = inner.lo as usize;
                if source[lo..inner].contains('\n') {
                    return line_indent(source, inner);
                }
            }
        }
        line_indent(source, lo)
    }

    fn emit_raw(&mut self, id: NodeId, text: &str) {
        if self.ast.data(id).span.is_some() {
            self.emit_verbatim(id);
        } else {
            self.code.push_str(text);
        }
    }

    fn emit_trailing(&mut self, id: NodeId) {
        if let Some(trailing) = &self.ast.data(id).trailing {
            self.code.push_str(&trailing.gap);
            self.code.push_str(&trailing.text);
        }
    }

    fn emit_file(&mut self) -> Result<()> {
        let ast = self.ast;
        let root = ast.root();
        if self.is_pristine(root) {
            self.code.push_str(ast.source());
            return Ok(());
        }
        let Node::File(file) = ast.node(root) else {
            return Err(unexpected("file", ast.node(root)));
        };
        let decls = &file.decls;
        for (index, &id) in decls.iter().enumerate() {
            if index > 0 {
                let prev = decl_kind(ast.node(decls[index - 1]));
                let unit = decls[index..]
                    .iter()
                    .map(|&decl| decl_kind(ast.node(decl)))
                    .find(|kind| *kind != DeclKind::Comment)
                    .unwrap_or(DeclKind::Comment);
                let starts_unit = prev != DeclKind::Comment;
                let is_comment = decl_kind(ast.node(id)) == DeclKind::Comment;
                let blank = ast.data(id).blank_before
                    || (starts_unit && (is_comment || unit != prev || prev == DeclKind::Func));
                if blank {
                    self.newline();
                }
            }
            self.emit_top_level(id)?;
            self.emit_trailing(id);
            self.newline();
        }
        Ok(())
    }

    fn emit_top_level(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::PackageClause(package) => {
                self.code.push_str("package ");
                self.emit_expr(package.name)
            }
            Node::FuncDecl(func) => {
                self.code.push_str("func ");
                if let Some(recv) = func.recv {
                    self.emit_field_list(recv)?;
                    self.code.push(' ');
                }
                self.emit_expr(func.name)?;
                if let Some(type_params) = func.type_params {
                    self.emit_expr(type_params)?;
                }
                self.emit_field_list(func.params)?;
                if let Some(results) = func.results {
                    self.code.push(' ');
                    self.emit_field_list(results)?;
                }
                if let Some(body) = func.body {
                    self.code.push(' ');
                    self.emit_block(body)?;
                }
                Ok(())
            }
            _ => self.emit_stmt(id),
        }
    }

    fn emit_field_list(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::FieldList(fields) => {
                self.code.push('(');
                for (index, &param) in fields.list.iter().enumerate() {
                    if index > 0 {
                        self.code.push_str(", ");
                    }
                    self.emit_param(param)?;
                }
                self.code.push(')');
                Ok(())
            }
            Node::Raw(raw) => {
                self.emit_raw(id, &raw.text);
                Ok(())
            }
            other => Err(unexpected("parameter list", other)),
        }
    }

    fn emit_param(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::Param(param) => {
                self.emit_expr_list(&param.names)?;
                if !param.names.is_empty() {
                    self.code.push(' ');
                }
                self.emit_expr(param.ty)
            }
            Node::Raw(raw) => {
                self.emit_raw(id, &raw.text);
                Ok(())
            }
            other => Err(unexpected("parameter", other)),
        }
    }

    fn emit_gen_decl(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        let Node::GenDecl(group) = ast.node(id) else {
            return Err(unexpected("declaration", ast.node(id)));
        };
        self.code.push_str(group.keyword.as_str());
        let single = group.specs.len() == 1
            && !matches!(ast.node(group.specs[0]), Node::Comment(_))
            && ast.data(group.specs[0]).trailing.is_none();
        if !group.grouped && single {
            self.code.push(' ');
            return self.emit_spec(group.specs[0]);
        }

        self.code.push_str(" (");
        self.newline();
        self.indent += 1;
        for (index, run) in self.spec_runs(group).into_iter().enumerate() {
            if index > 0 && run.blank_before {
                self.newline();
            }
            for spec in run.specs {
                self.write_indent();
                self.emit_spec(spec)?;
                self.emit_trailing(spec);
                self.newline();
            }
        }
        self.indent -= 1;
        self.write_indent();
        self.code.push(')');
        Ok(())
    }

    /// Splits specs at blank lines and comments; import runs are sorted by
    /// path.
    fn spec_runs(&self, group: &GenDecl) -> Vec<SpecRun> {
        let ast = self.ast;
        let mut runs: Vec<SpecRun> = Vec::new();
        for &spec in &group.specs {
            let is_comment = matches!(ast.node(spec), Node::Comment(_));
            let continues = runs.last().is_some_and(|run| {
                !run.closed && !ast.data(spec).blank_before && !is_comment
            });
            match runs.last_mut() {
                Some(run) if continues => run.specs.push(spec),
                _ => runs.push(SpecRun {
                    blank_before: ast.data(spec).blank_before,
                    closed: is_comment,
                    specs: vec![spec],
                }),
            }
        }
        if group.keyword == DeclKeyword::Import {
            for run in &mut runs {
                run.specs.sort_by(|&a, &b| import_key(ast, a).cmp(&import_key(ast, b)));
            }
        }
        runs
    }

    fn emit_spec(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::ImportSpec(import) => {
                if let Some(name) = import.name {
                    self.emit_expr(name)?;
                    self.code.push(' ');
                }
                self.code.push_str(&import.path);
                Ok(())
            }
            Node::ValueSpec(value) => {
                self.emit_expr_list(&value.names)?;
                if let Some(ty) = value.ty {
                    self.code.push(' ');
                    self.emit_expr(ty)?;
                }
                if !value.values.is_empty() {
                    self.code.push_str(" = ");
                    self.emit_expr_list(&value.values)?;
                }
                Ok(())
            }
            Node::TypeSpec(spec) => {
                self.emit_expr(spec.name)?;
                self.code.push(' ');
                self.emit_expr(spec.ty)
            }
            Node::Comment(comment) => {
                self.code.push_str(&comment.text);
                Ok(())
            }
            Node::Raw(raw) => {
                self.emit_raw(id, &raw.text);
                Ok(())
            }
            other => Err(unexpected("spec", other)),
        }
    }

    fn emit_block(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        let Node::Block(block) = ast.node(id) else {
            return Err(unexpected("block", ast.node(id)));
        };
        self.code.push('{');
        self.newline();
        self.indent += 1;
        self.emit_stmt_list(&block.stmts)?;
        self.indent -= 1;
        self.write_indent();
        self.code.push('}');
        Ok(())
    }

    fn emit_stmt_list(&mut self, stmts: &[NodeId]) -> Result<()> {
        let ast = self.ast;
        let mut first = true;
        for &id in stmts {
            if matches!(ast.node(id), Node::Empty) {
                continue;
            }
            if !first && ast.data(id).blank_before {
                self.newline();
            }
            first = false;
            if matches!(ast.node(id), Node::Labeled(_)) && self.indent > 0 {
                self.indent -= 1;
                self.write_indent();
                self.indent += 1;
            } else {
                self.write_indent();
            }
            self.emit_stmt(id)?;
            self.emit_trailing(id);
            self.newline();
        }
        Ok(())
    }

    fn emit_stmt(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::ExprStmt(stmt) => self.emit_expr(stmt.x),
            Node::Assign(assign) => {
                self.emit_expr_list(&assign.lhs)?;
                self.code.push(' ');
                self.code.push_str(&assign.op);
                self.code.push(' ');
                self.emit_expr_list(&assign.rhs)
            }
            Node::IncDec(stmt) => {
                self.emit_expr(stmt.x)?;
                self.code.push_str(if stmt.inc { "++" } else { "--" });
                Ok(())
            }
            Node::Return(stmt) => {
                self.code.push_str("return");
                if !stmt.results.is_empty() {
                    self.code.push(' ');
                    self.emit_expr_list(&stmt.results)?;
                }
                Ok(())
            }
            Node::Branch(branch) => {
                self.code.push_str(&branch.keyword);
                if let Some(label) = branch.label {
                    self.code.push(' ');
                    self.emit_expr(label)?;
                }
                Ok(())
            }
            Node::Labeled(labeled) => {
                self.emit_expr(labeled.label)?;
                self.code.push(':');
                if let Some(stmt) = labeled.stmt {
                    self.newline();
                    self.write_indent();
                    self.emit_stmt(stmt)?;
                }
                Ok(())
            }
            Node::CallStmt(stmt) => {
                self.code.push_str(stmt.keyword.as_str());
                self.code.push(' ');
                self.emit_expr(stmt.call)
            }
            Node::GenDecl(_) => self.emit_gen_decl(id),
            Node::If(stmt) => {
                self.code.push_str("if ");
                if let Some(init) = stmt.init {
                    self.emit_stmt(init)?;
                    self.code.push_str("; ");
                }
                self.emit_expr(stmt.cond)?;
                self.code.push(' ');
                self.emit_block(stmt.body)?;
                if let Some(else_branch) = stmt.else_branch {
                    self.code.push_str(" else ");
                    match ast.node(else_branch) {
                        Node::If(_) => self.emit_stmt(else_branch)?,
                        _ => self.emit_block(else_branch)?,
                    }
                }
                Ok(())
            }
            Node::For(stmt) => {
                self.code.push_str("for ");
                if stmt.init.is_none() && stmt.post.is_none() {
                    if let Some(cond) = stmt.cond {
                        self.emit_expr(cond)?;
                        self.code.push(' ');
                    }
                } else {
                    if let Some(init) = stmt.init {
                        self.emit_stmt(init)?;
                    }
                    self.code.push_str("; ");
                    if let Some(cond) = stmt.cond {
                        self.emit_expr(cond)?;
                    }
                    self.code.push_str("; ");
                    if let Some(post) = stmt.post {
                        self.emit_stmt(post)?;
                    }
                    self.code.push(' ');
                }
                self.emit_block(stmt.body)
            }
            Node::Range(stmt) => {
                self.code.push_str("for ");
                if !stmt.lhs.is_empty() {
                    self.emit_expr_list(&stmt.lhs)?;
                    self.code.push_str(if stmt.define { " := " } else { " = " });
                }
                self.code.push_str("range ");
                self.emit_expr(stmt.x)?;
                self.code.push(' ');
                self.emit_block(stmt.body)
            }
            Node::Switch(stmt) => {
                self.code.push_str("switch ");
                if let Some(init) = stmt.init {
                    self.emit_stmt(init)?;
                    self.code.push_str("; ");
                }
                if let Some(tag) = stmt.tag {
                    self.emit_expr(tag)?;
                    self.code.push(' ');
                }
                self.emit_clauses(&stmt.clauses)
            }
            Node::TypeSwitch(stmt) => {
                self.code.push_str("switch ");
                if let Some(init) = stmt.init {
                    self.emit_stmt(init)?;
                    self.code.push_str("; ");
                }
                if let Some(binding) = stmt.binding {
                    self.emit_expr(binding)?;
                    self.code.push_str(" := ");
                }
                self.emit_expr(stmt.x)?;
                self.code.push_str(".(type) ");
                self.emit_clauses(&stmt.clauses)
            }
            Node::Select(stmt) => {
                self.code.push_str("select ");
                self.emit_clauses(&stmt.clauses)
            }
            Node::Block(_) => self.emit_block(id),
            Node::Empty => Ok(()),
            Node::Comment(comment) => {
                self.code.push_str(&comment.text);
                Ok(())
            }
            Node::Raw(raw) => {
                self.emit_raw(id, &raw.text);
                Ok(())
            }
            Node::Ident(_)
            | Node::BasicLit(_)
            | Node::Binary(_)
            | Node::Unary(_)
            | Node::Call(_)
            | Node::Selector(_)
            | Node::Index(_)
            | Node::Paren(_)
            | Node::FuncLit(_) => self.emit_expr(id),
            other => Err(unexpected("statement", other)),
        }
    }

    /// The braced clause list of a switch or select statement.
    fn emit_clauses(&mut self, clauses: &[NodeId]) -> Result<()> {
        let ast = self.ast;
        self.code.push('{');
        self.newline();
        let mut first = true;
        for &clause in clauses {
            if !first && ast.data(clause).blank_before {
                self.newline();
            }
            first = false;
            self.write_indent();
            self.emit_case_clause(clause)?;
        }
        self.write_indent();
        self.code.push('}');
        Ok(())
    }

    /// Emits a clause header and its statements, each ending in a newline.
    fn emit_case_clause(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        match ast.node(id) {
            Node::CaseClause(clause) => {
                if clause.is_default {
                    self.code.push_str("default:");
                } else {
                    self.code.push_str("case ");
                    for (index, &item) in clause.list.iter().enumerate() {
                        if index > 0 {
                            self.code.push_str(", ");
                        }
                        // select clauses hold a send or receive statement
                        self.emit_stmt(item)?;
                    }
                    self.code.push(':');
                }
                self.newline();
                self.indent += 1;
                self.emit_stmt_list(&clause.body)?;
                self.indent -= 1;
                Ok(())
            }
            Node::Comment(comment) => {
                self.code.push_str(&comment.text);
                self.emit_trailing(id);
                self.newline();
                Ok(())
            }
            other => Err(unexpected("case clause", other)),
        }
    }

    fn emit_expr_list(&mut self, exprs: &[NodeId]) -> Result<()> {
        for (index, &expr) in exprs.iter().enumerate() {
            if index > 0 {
                self.code.push_str(", ");
            }
            self.emit_expr(expr)?;
        }
        Ok(())
    }

    fn emit_expr(&mut self, id: NodeId) -> Result<()> {
        if self.is_pristine(id) {
            self.emit_verbatim(id);
            return Ok(());
        }
        let ast = self.ast;
        match ast.node(id) {
            Node::Ident(ident) => self.code.push_str(&ident.name),
            Node::BasicLit(lit) => self.code.push_str(&lit.text),
            Node::Binary(binary) => {
                self.emit_expr(binary.x)?;
                self.code.push(' ');
                self.code.push_str(&binary.op);
                self.code.push(' ');
                self.emit_expr(binary.y)?;
            }
            Node::Unary(unary) => {
                self.code.push_str(&unary.op);
                self.emit_expr(unary.x)?;
            }
            Node::Call(call) => {
                self.emit_expr(call.fun)?;
                self.code.push('(');
                self.emit_expr_list(&call.args)?;
                if call.ellipsis {
                    self.code.push_str("...");
                }
                self.code.push(')');
            }
            Node::Selector(selector) => {
                self.emit_expr(selector.x)?;
                self.code.push('.');
                self.emit_expr(selector.sel)?;
            }
            Node::Index(index) => {
                self.emit_expr(index.x)?;
                self.code.push('[');
                self.emit_expr(index.index)?;
                self.code.push(']');
            }
            Node::Paren(paren) => {
                self.code.push('(');
                self.emit_expr(paren.x)?;
                self.code.push(')');
            }
            Node::FuncLit(func) => {
                self.code.push_str("func");
                self.emit_field_list(func.params)?;
                if let Some(results) = func.results {
                    self.code.push(' ');
                    self.emit_field_list(results)?;
                }
                self.code.push(' ');
                self.emit_block(func.body)?;
            }
            Node::Raw(raw) => self.emit_raw(id, &raw.text),
            other => return Err(unexpected("expression", other)),
        }
        Ok(())
    }
}

struct SpecRun {
    blank_before: bool,
    /// Comments stand alone.
    closed: bool,
    specs: Vec<NodeId>,
}

fn import_key(ast: &Ast, spec: NodeId) -> (String, String) {
    match ast.node(spec) {
        Node::ImportSpec(import) => {
            let name = import
                .name
                .and_then(|name| ast.ident_name(name))
                .unwrap_or_default();
            (import.path_value().to_string(), name.to_string())
        }
        _ => (String::new(), String::new()),
    }
}
