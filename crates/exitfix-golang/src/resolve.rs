//! Binds identifiers of a freshly parsed tree to the kind of object they
//! refer to, following Go's block scoping.
//!
//! Only names declared in the file are known. Universe names (`nil`, `len`,
//! `string`, ...) and selectors stay unresolved.

use std::collections::HashMap;

use crate::ast::{Ast, DeclKeyword, Field, Node, NodeId, ObjKind};

pub(crate) fn resolve(ast: &mut Ast) {
    let root = ast.root();
    Resolver::default().file(ast, root);
}

/// Name an import is referred to by inside the file.
pub fn import_local_name(ast: &Ast, spec: NodeId) -> Option<String> {
    let Node::ImportSpec(import) = ast.node(spec) else {
        return None;
    };
    if let Some(name) = import.name.and_then(|name| ast.ident_name(name)) {
        return Some(name.to_string());
    }
    let path = import.path_value();
    Some(path.rsplit('/').next().unwrap_or(path).to_string())
}

#[derive(Default)]
struct Resolver {
    scopes: Vec<HashMap<String, ObjKind>>,
}

impl Resolver {
    fn open(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn close(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, name: &str) -> Option<ObjKind> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn declare(&mut self, ast: &mut Ast, id: NodeId, kind: ObjKind) {
        let Some(name) = ast.ident_name(id).map(str::to_string) else {
            return;
        };
        ast.set_obj(id, Some(kind));
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, kind);
        }
    }

    fn file(&mut self, ast: &mut Ast, root: NodeId) {
        let Node::File(file) = ast.node(root) else {
            return;
        };
        let decls = file.decls.clone();
        self.open();
        for &decl in &decls {
            match ast.node(decl).clone() {
                Node::GenDecl(group) => self.declare_specs(ast, group.keyword, &group.specs),
                Node::FuncDecl(func) if func.recv.is_none() => {
                    self.declare(ast, func.name, ObjKind::Func)
                }
                _ => {}
            }
        }
        for &decl in &decls {
            match ast.node(decl).clone() {
                Node::GenDecl(group) => self.spec_values(ast, &group.specs),
                Node::FuncDecl(func) => {
                    self.function(ast, &[func.recv, Some(func.params), func.results], func.body)
                }
                Node::PackageClause(_) | Node::Comment(_) => {}
                _ => self.stmt(ast, decl),
            }
        }
        self.close();
    }

    fn declare_specs(&mut self, ast: &mut Ast, keyword: DeclKeyword, specs: &[NodeId]) {
        for &spec in specs {
            match ast.node(spec).clone() {
                Node::ImportSpec(import) => {
                    let Some(local) = import_local_name(ast, spec) else {
                        continue;
                    };
                    if let Some(name) = import.name {
                        ast.set_obj(name, Some(ObjKind::Package));
                    }
                    if local != "_" && local != "." {
                        if let Some(scope) = self.scopes.last_mut() {
                            scope.insert(local, ObjKind::Package);
                        }
                    }
                }
                Node::ValueSpec(value) => {
                    let kind = if keyword == DeclKeyword::Const {
                        ObjKind::Const
                    } else {
                        ObjKind::Var
                    };
                    for name in value.names {
                        self.declare(ast, name, kind);
                    }
                }
                Node::TypeSpec(ty) => self.declare(ast, ty.name, ObjKind::Type),
                _ => {}
            }
        }
    }

    fn spec_values(&mut self, ast: &mut Ast, specs: &[NodeId]) {
        for &spec in specs {
            if let Node::ValueSpec(value) = ast.node(spec).clone() {
                for expr in value.values {
                    self.expr(ast, expr);
                }
            }
        }
    }

    /// Parameters and results share one scope with the top level of the body.
    fn function(&mut self, ast: &mut Ast, lists: &[Option<NodeId>], body: Option<NodeId>) {
        self.open();
        for &list in lists.iter().flatten() {
            self.params(ast, list);
        }
        if let Some(body) = body {
            let stmts = ast.children(body, Field::List).to_vec();
            self.stmt_list(ast, stmts);
        }
        self.close();
    }

    fn params(&mut self, ast: &mut Ast, list: NodeId) {
        let Node::FieldList(fields) = ast.node(list).clone() else {
            return;
        };
        for param in fields.list {
            if let Node::Param(param) = ast.node(param).clone() {
                for name in param.names {
                    self.declare(ast, name, ObjKind::Var);
                }
            }
        }
    }

    fn stmt_list(&mut self, ast: &mut Ast, stmts: Vec<NodeId>) {
        for stmt in stmts {
            self.stmt(ast, stmt);
        }
    }

    fn stmt(&mut self, ast: &mut Ast, id: NodeId) {
        match ast.node(id).clone() {
            Node::Block(block) => {
                self.open();
                self.stmt_list(ast, block.stmts);
                self.close();
            }
            Node::ExprStmt(stmt) => self.expr(ast, stmt.x),
            Node::Assign(assign) => {
                for rhs in assign.rhs {
                    self.expr(ast, rhs);
                }
                for lhs in assign.lhs {
                    let new_name = assign.op == ":="
                        && ast.ident_name(lhs).is_some_and(|name| {
                            !self
                                .scopes
                                .last()
                                .is_some_and(|scope| scope.contains_key(name))
                        });
                    if new_name {
                        self.declare(ast, lhs, ObjKind::Var);
                    } else {
                        self.expr(ast, lhs);
                    }
                }
            }
            Node::IncDec(stmt) => self.expr(ast, stmt.x),
            Node::Return(stmt) => {
                for result in stmt.results {
                    self.expr(ast, result);
                }
            }
            Node::Branch(branch) => {
                if let Some(label) = branch.label {
                    ast.set_obj(label, Some(ObjKind::Label));
                }
            }
            Node::Labeled(labeled) => {
                ast.set_obj(labeled.label, Some(ObjKind::Label));
                if let Some(stmt) = labeled.stmt {
                    self.stmt(ast, stmt);
                }
            }
            Node::CallStmt(stmt) => self.expr(ast, stmt.call),
            Node::GenDecl(group) => {
                self.spec_values(ast, &group.specs);
                self.declare_specs(ast, group.keyword, &group.specs);
            }
            Node::If(stmt) => {
                self.open();
                if let Some(init) = stmt.init {
                    self.stmt(ast, init);
                }
                self.expr(ast, stmt.cond);
                self.stmt(ast, stmt.body);
                if let Some(else_branch) = stmt.else_branch {
                    self.stmt(ast, else_branch);
                }
                self.close();
            }
            Node::For(stmt) => {
                self.open();
                if let Some(init) = stmt.init {
                    self.stmt(ast, init);
                }
                if let Some(cond) = stmt.cond {
                    self.expr(ast, cond);
                }
                if let Some(post) = stmt.post {
                    self.stmt(ast, post);
                }
                self.stmt(ast, stmt.body);
                self.close();
            }
            Node::Range(stmt) => {
                self.expr(ast, stmt.x);
                self.open();
                for lhs in stmt.lhs {
                    if stmt.define {
                        self.declare(ast, lhs, ObjKind::Var);
                    } else {
                        self.expr(ast, lhs);
                    }
                }
                self.stmt(ast, stmt.body);
                self.close();
            }
            Node::Switch(stmt) => {
                self.open();
                if let Some(init) = stmt.init {
                    self.stmt(ast, init);
                }
                if let Some(tag) = stmt.tag {
                    self.expr(ast, tag);
                }
                for clause in stmt.clauses {
                    self.clause(ast, clause, None);
                }
                self.close();
            }
            Node::TypeSwitch(stmt) => {
                self.open();
                if let Some(init) = stmt.init {
                    self.stmt(ast, init);
                }
                self.expr(ast, stmt.x);
                for clause in stmt.clauses {
                    self.clause(ast, clause, stmt.binding);
                }
                self.close();
            }
            Node::Select(stmt) => {
                for clause in stmt.clauses {
                    self.clause(ast, clause, None);
                }
            }
            _ => self.expr(ast, id),
        }
    }

    /// Each clause is its own scope. `binding` is the variable of a type
    /// switch; a select clause may declare names in its receive statement.
    fn clause(&mut self, ast: &mut Ast, clause: NodeId, binding: Option<NodeId>) {
        let Node::CaseClause(case) = ast.node(clause).clone() else {
            return;
        };
        self.open();
        if let Some(binding) = binding {
            self.declare(ast, binding, ObjKind::Var);
        }
        for item in case.list {
            self.stmt(ast, item);
        }
        self.stmt_list(ast, case.body);
        self.close();
    }

    fn expr(&mut self, ast: &mut Ast, id: NodeId) {
        match ast.node(id).clone() {
            Node::Ident(ident) => {
                let obj = self.lookup(&ident.name);
                ast.set_obj(id, obj);
            }
            Node::Selector(sel) => self.expr(ast, sel.x),
            Node::Binary(binary) => {
                self.expr(ast, binary.x);
                self.expr(ast, binary.y);
            }
            Node::Unary(unary) => self.expr(ast, unary.x),
            Node::Call(call) => {
                self.expr(ast, call.fun);
                for arg in call.args {
                    self.expr(ast, arg);
                }
            }
            Node::Index(index) => {
                self.expr(ast, index.x);
                self.expr(ast, index.index);
            }
            Node::Paren(paren) => self.expr(ast, paren.x),
            Node::FuncLit(func) => {
                self.function(ast, &[Some(func.params), func.results], Some(func.body))
            }
            _ => {}
        }
    }
}
