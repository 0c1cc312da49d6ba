//! Arena-backed syntax tree for Go source files.
//!
//! Every node lives in one `Vec` owned by [`Ast`] and refers to its children
//! by [`NodeId`]. A child is addressed by a [`Location`]: the parent node, the
//! named [`Field`] of the parent and the index inside that field. Replacing a
//! child is an index update in the parent.
//!
//! Nodes parsed from source keep the byte [`Span`] they came from. Mutating a
//! node through [`Ast::node_mut`] or any of the child-editing methods clears
//! the span of the edited node, which tells the printer to lay that node out
//! again instead of copying the original text.

use std::fmt;
use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range of a node in the text the tree was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Span {
        Span {
            lo: lo as u32,
            hi: hi as u32,
        }
    }

    pub fn range(self) -> Range<usize> {
        self.lo as usize..self.hi as usize
    }
}

/// A comment that shares the last line of the node it follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingComment {
    /// Whitespace between the end of the node and the comment.
    pub gap: String,
    pub text: String,
}

/// What an identifier was bound to when the tree was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjKind {
    Var,
    Const,
    Type,
    Func,
    Package,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKeyword {
    Import,
    Const,
    Var,
    Type,
}

impl DeclKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKeyword::Import => "import",
            DeclKeyword::Const => "const",
            DeclKeyword::Var => "var",
            DeclKeyword::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKeyword {
    Go,
    Defer,
}

impl CallKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            CallKeyword::Go => "go",
            CallKeyword::Defer => "defer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Package clause, declarations and free-standing comments in source order.
    pub decls: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    /// Whether the specs are wrapped in parentheses.
    pub grouped: bool,
    pub specs: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<NodeId>,
    /// The path literal, quotes included.
    pub path: String,
}

impl ImportSpec {
    /// The import path without its quotes.
    pub fn path_value(&self) -> &str {
        let path = self.path.as_str();
        path.strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .or_else(|| path.strip_prefix('`').and_then(|rest| rest.strip_suffix('`')))
            .unwrap_or(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<NodeId>,
    pub ty: Option<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: NodeId,
    /// Everything after the name: type parameters, `=` for aliases, the type.
    pub ty: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub recv: Option<NodeId>,
    pub name: NodeId,
    pub type_params: Option<NodeId>,
    pub params: NodeId,
    pub results: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    pub list: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub names: Vec<NodeId>,
    pub ty: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprStmt {
    pub x: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignStmt {
    pub lhs: Vec<NodeId>,
    pub op: String,
    pub rhs: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncDecStmt {
    pub x: NodeId,
    pub inc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub results: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStmt {
    pub keyword: String,
    pub label: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledStmt {
    pub label: NodeId,
    pub stmt: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
    pub keyword: CallKeyword,
    pub call: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub init: Option<NodeId>,
    pub cond: NodeId,
    pub body: NodeId,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub post: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStmt {
    /// Key and value expressions, empty for `for range x`.
    pub lhs: Vec<NodeId>,
    pub define: bool,
    pub x: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStmt {
    pub init: Option<NodeId>,
    pub tag: Option<NodeId>,
    /// Case clauses and comments between them.
    pub clauses: Vec<NodeId>,
}

/// `switch [init;] [binding :=] x.(type) { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSwitchStmt {
    pub init: Option<NodeId>,
    /// Declared anew in every clause.
    pub binding: Option<NodeId>,
    pub x: NodeId,
    pub clauses: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub clauses: Vec<NodeId>,
}

/// Clause of a switch, type switch or select statement.
///
/// `list` holds case expressions, the types of a type switch case, or the
/// single send/receive statement of a select case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub list: Vec<NodeId>,
    pub is_default: bool,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub obj: Option<ObjKind>,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            obj: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub x: NodeId,
    pub op: String,
    pub y: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: String,
    pub x: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub fun: NodeId,
    pub args: Vec<NodeId>,
    /// Trailing `...` on the last argument.
    pub ellipsis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorExpr {
    pub x: NodeId,
    pub sel: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub x: NodeId,
    pub index: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub x: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncLit {
    pub params: NodeId,
    pub results: Option<NodeId>,
    pub body: NodeId,
}

/// Source kept verbatim: types, composite literals and any syntax the
/// rewrite rules never look into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(File),
    PackageClause(PackageClause),
    Comment(Comment),
    GenDecl(GenDecl),
    ImportSpec(ImportSpec),
    ValueSpec(ValueSpec),
    TypeSpec(TypeSpec),
    FuncDecl(FuncDecl),
    FieldList(FieldList),
    Param(Param),
    Block(Block),
    ExprStmt(ExprStmt),
    Assign(AssignStmt),
    IncDec(IncDecStmt),
    Return(ReturnStmt),
    Branch(BranchStmt),
    Labeled(LabeledStmt),
    CallStmt(CallStmt),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(SelectStmt),
    CaseClause(CaseClause),
    Empty,
    Ident(Ident),
    BasicLit(BasicLit),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Paren(ParenExpr),
    FuncLit(FuncLit),
    Raw(Raw),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::File(_) => "file",
            Node::PackageClause(_) => "package clause",
            Node::Comment(_) => "comment",
            Node::GenDecl(_) => "declaration",
            Node::ImportSpec(_) => "import spec",
            Node::ValueSpec(_) => "value spec",
            Node::TypeSpec(_) => "type spec",
            Node::FuncDecl(_) => "function declaration",
            Node::FieldList(_) => "field list",
            Node::Param(_) => "parameter",
            Node::Block(_) => "block",
            Node::ExprStmt(_) => "expression statement",
            Node::Assign(_) => "assignment",
            Node::IncDec(_) => "inc/dec statement",
            Node::Return(_) => "return statement",
            Node::Branch(_) => "branch statement",
            Node::Labeled(_) => "labeled statement",
            Node::CallStmt(_) => "go/defer statement",
            Node::If(_) => "if statement",
            Node::For(_) => "for statement",
            Node::Range(_) => "range statement",
            Node::Switch(_) => "switch statement",
            Node::TypeSwitch(_) => "type switch statement",
            Node::Select(_) => "select statement",
            Node::CaseClause(_) => "case clause",
            Node::Empty => "empty statement",
            Node::Ident(_) => "identifier",
            Node::BasicLit(_) => "literal",
            Node::Binary(_) => "binary expression",
            Node::Unary(_) => "unary expression",
            Node::Call(_) => "call expression",
            Node::Selector(_) => "selector expression",
            Node::Index(_) => "index expression",
            Node::Paren(_) => "parenthesized expression",
            Node::FuncLit(_) => "function literal",
            Node::Raw(_) => "raw syntax",
        }
    }
}

/// Named child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Decls,
    Name,
    Specs,
    Names,
    Type,
    Values,
    Recv,
    TypeParams,
    Params,
    Results,
    Body,
    List,
    X,
    Y,
    Lhs,
    Rhs,
    Label,
    Stmt,
    Call,
    Init,
    Cond,
    Post,
    Else,
    Tag,
    Fun,
    Args,
    Sel,
    Index,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Decls => "Decls",
            Field::Name => "Name",
            Field::Specs => "Specs",
            Field::Names => "Names",
            Field::Type => "Type",
            Field::Values => "Values",
            Field::Recv => "Recv",
            Field::TypeParams => "TypeParams",
            Field::Params => "Params",
            Field::Results => "Results",
            Field::Body => "Body",
            Field::List => "List",
            Field::X => "X",
            Field::Y => "Y",
            Field::Lhs => "Lhs",
            Field::Rhs => "Rhs",
            Field::Label => "Label",
            Field::Stmt => "Stmt",
            Field::Call => "Call",
            Field::Init => "Init",
            Field::Cond => "Cond",
            Field::Post => "Post",
            Field::Else => "Else",
            Field::Tag => "Tag",
            Field::Fun => "Fun",
            Field::Args => "Args",
            Field::Sel => "Sel",
            Field::Index => "Index",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum SlotMut<'a> {
    One(&'a mut NodeId),
    Opt(Option<&'a mut NodeId>),
    Many(&'a mut Vec<NodeId>),
}

/// Declares, once, which member of which node backs each [`Field`] and in
/// what order the fields are visited.
macro_rules! child_slots {
    ($($variant:ident { $($field:ident => $member:ident: $slot:ident),* $(,)? })*) => {
        impl Node {
            /// Child fields in document order.
            pub fn fields(&self) -> &'static [Field] {
                match self {
                    $(Node::$variant(..) => &[$(Field::$field),*],)*
                    _ => &[],
                }
            }

            /// Children stored in `field`, empty when the node has no such slot.
            pub fn children(&self, field: Field) -> &[NodeId] {
                match (self, field) {
                    $($((Node::$variant(node), Field::$field) => child_slots!(@ref $slot node.$member),)*)*
                    _ => &[],
                }
            }

            /// Whether `field` holds a list of children.
            pub fn is_list_field(&self, field: Field) -> bool {
                match (self, field) {
                    $($((Node::$variant(..), Field::$field) => child_slots!(@is_list $slot),)*)*
                    _ => false,
                }
            }

            fn slot_mut(&mut self, field: Field) -> Option<SlotMut<'_>> {
                match (self, field) {
                    $($((Node::$variant(node), Field::$field) => Some(child_slots!(@mut $slot node.$member)),)*)*
                    _ => None,
                }
            }
        }
    };
    (@ref one $e:expr) => { std::slice::from_ref(&$e) };
    (@ref opt $e:expr) => { $e.as_slice() };
    (@ref many $e:expr) => { $e.as_slice() };
    (@is_list many) => { true };
    (@is_list $other:ident) => { false };
    (@mut one $e:expr) => { SlotMut::One(&mut $e) };
    (@mut opt $e:expr) => { SlotMut::Opt($e.as_mut()) };
    (@mut many $e:expr) => { SlotMut::Many(&mut $e) };
}

child_slots! {
    File { Decls => decls: many }
    PackageClause { Name => name: one }
    GenDecl { Specs => specs: many }
    ImportSpec { Name => name: opt }
    ValueSpec { Names => names: many, Type => ty: opt, Values => values: many }
    TypeSpec { Name => name: one, Type => ty: one }
    FuncDecl {
        Recv => recv: opt,
        Name => name: one,
        TypeParams => type_params: opt,
        Params => params: one,
        Results => results: opt,
        Body => body: opt,
    }
    FieldList { List => list: many }
    Param { Names => names: many, Type => ty: one }
    Block { List => stmts: many }
    ExprStmt { X => x: one }
    Assign { Lhs => lhs: many, Rhs => rhs: many }
    IncDec { X => x: one }
    Return { Results => results: many }
    Branch { Label => label: opt }
    Labeled { Label => label: one, Stmt => stmt: opt }
    CallStmt { Call => call: one }
    If { Init => init: opt, Cond => cond: one, Body => body: one, Else => else_branch: opt }
    For { Init => init: opt, Cond => cond: opt, Post => post: opt, Body => body: one }
    Range { Lhs => lhs: many, X => x: one, Body => body: one }
    Switch { Init => init: opt, Tag => tag: opt, Body => clauses: many }
    TypeSwitch { Init => init: opt, Name => binding: opt, X => x: one, Body => clauses: many }
    Select { Body => clauses: many }
    CaseClause { List => list: many, Body => body: many }
    Binary { X => x: one, Y => y: one }
    Unary { X => x: one }
    Call { Fun => fun: one, Args => args: many }
    Selector { X => x: one, Sel => sel: one }
    Index { X => x: one, Index => index: one }
    Paren { X => x: one }
    FuncLit { Params => params: one, Results => results: opt, Body => body: one }
}

/// Where a node hangs in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub parent: NodeId,
    pub field: Field,
    pub index: usize,
}

impl Location {
    pub fn new(parent: NodeId, field: Field, index: usize) -> Self {
        Self {
            parent,
            field,
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("{kind} {parent} has no {field} field")]
    NoSuchField {
        parent: NodeId,
        kind: &'static str,
        field: Field,
    },
    #[error("index {index} is out of bounds for {field} of {parent}")]
    OutOfBounds {
        parent: NodeId,
        field: Field,
        index: usize,
    },
    #[error("{field} of {parent} holds a single node, not a list")]
    NotAList { parent: NodeId, field: Field },
    #[error("{node} is the root and has no location")]
    Detached { node: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: Node,
    /// Source range; `None` once the node was created or edited by a rewrite.
    pub span: Option<Span>,
    /// A blank line separates this node from the previous list entry.
    pub blank_before: bool,
    pub trailing: Option<TrailingComment>,
}

/// Syntax tree of one Go source file.
#[derive(Debug, Clone)]
pub struct Ast {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
    /// Byte ranges of raw string literals in `source`, in order.
    raw_strings: Vec<Range<usize>>,
}

impl Ast {
    pub(crate) fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            root: NodeId(0),
            raw_strings: Vec::new(),
        }
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_raw_strings(&mut self, ranges: Vec<Range<usize>>) {
        self.raw_strings = ranges;
    }

    /// Whether byte `at` of the source lies inside a raw string literal,
    /// past its opening backquote.
    pub fn in_raw_string(&self, at: usize) -> bool {
        let next = self.raw_strings.partition_point(|range| range.end <= at);
        self.raw_strings
            .get(next)
            .is_some_and(|range| range.start < at)
    }

    /// Text the tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()].kind
    }

    /// Mutable access to a node; the node is no longer printed from source.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let data = &mut self.nodes[id.index()];
        data.span = None;
        &mut data.kind
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Mutable access to layout information. Callers that change
    /// `blank_before` of a list entry must also edit the list's owner.
    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Original source text of a node that was not edited.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.data(id)
            .span
            .and_then(|span| self.source.get(span.range()))
    }

    pub(crate) fn alloc(&mut self, kind: Node, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            span,
            blank_before: false,
            trailing: None,
        });
        id
    }

    /// Adds a detached node; it becomes part of the tree once linked in.
    pub fn add(&mut self, kind: Node) -> NodeId {
        self.alloc(kind, None)
    }

    pub(crate) fn set_obj(&mut self, id: NodeId, obj: Option<ObjKind>) {
        if let Node::Ident(ident) = &mut self.nodes[id.index()].kind {
            ident.obj = obj;
        }
    }

    pub fn children(&self, parent: NodeId, field: Field) -> &[NodeId] {
        self.node(parent).children(field)
    }

    pub fn child(&self, parent: NodeId, field: Field, index: usize) -> Option<NodeId> {
        self.children(parent, field).get(index).copied()
    }

    fn slot_mut(&mut self, parent: NodeId, field: Field) -> Result<SlotMut<'_>, AstError> {
        let kind = self.node(parent).kind_name();
        self.nodes[parent.index()]
            .kind
            .slot_mut(field)
            .ok_or(AstError::NoSuchField {
                parent,
                kind,
                field,
            })
    }

    /// Replaces the child at `location` and returns the node that was there.
    /// The new node takes over the layout of the old one.
    pub fn set_child(&mut self, location: Location, new: NodeId) -> Result<NodeId, AstError> {
        let Location {
            parent,
            field,
            index,
        } = location;
        let out_of_bounds = AstError::OutOfBounds {
            parent,
            field,
            index,
        };
        let old = match self.slot_mut(parent, field)? {
            SlotMut::One(slot) if index == 0 => std::mem::replace(slot, new),
            SlotMut::Opt(Some(slot)) if index == 0 => std::mem::replace(slot, new),
            SlotMut::Many(list) => match list.get_mut(index) {
                Some(slot) => std::mem::replace(slot, new),
                None => return Err(out_of_bounds),
            },
            _ => return Err(out_of_bounds),
        };
        self.nodes[parent.index()].span = None;
        let blank_before = self.data(old).blank_before;
        let trailing = self.data(old).trailing.clone();
        let data = self.data_mut(new);
        data.blank_before = blank_before;
        data.trailing = trailing;
        Ok(old)
    }

    /// Inserts `new` into a list field so that it ends up at `location.index`.
    pub fn insert_child(&mut self, location: Location, new: NodeId) -> Result<(), AstError> {
        let Location {
            parent,
            field,
            index,
        } = location;
        match self.slot_mut(parent, field)? {
            SlotMut::Many(list) if index <= list.len() => list.insert(index, new),
            SlotMut::Many(_) => {
                return Err(AstError::OutOfBounds {
                    parent,
                    field,
                    index,
                })
            }
            _ => return Err(AstError::NotAList { parent, field }),
        }
        self.nodes[parent.index()].span = None;
        Ok(())
    }

    /// Removes an entry from a list field and returns it.
    pub fn remove_child(&mut self, location: Location) -> Result<NodeId, AstError> {
        let Location {
            parent,
            field,
            index,
        } = location;
        let removed = match self.slot_mut(parent, field)? {
            SlotMut::Many(list) if index < list.len() => list.remove(index),
            SlotMut::Many(_) => {
                return Err(AstError::OutOfBounds {
                    parent,
                    field,
                    index,
                })
            }
            _ => return Err(AstError::NotAList { parent, field }),
        };
        self.nodes[parent.index()].span = None;
        Ok(removed)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            ast: self,
            stack: vec![id],
        }
    }

    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::Ident(ident) => Some(ident.name.as_str()),
            _ => None,
        }
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.add(Node::Ident(Ident::new(name)))
    }

    /// `x.sel`
    pub fn selector(&mut self, x: NodeId, sel: &str) -> NodeId {
        let sel = self.ident(sel);
        self.add(Node::Selector(SelectorExpr { x, sel }))
    }

    pub fn call(&mut self, fun: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add(Node::Call(CallExpr {
            fun,
            args,
            ellipsis: false,
        }))
    }

    pub fn expr_stmt(&mut self, x: NodeId) -> NodeId {
        self.add(Node::ExprStmt(ExprStmt { x }))
    }

    /// An unnamed import of `path` (given without quotes).
    pub fn import_spec(&mut self, path: &str) -> NodeId {
        self.add(Node::ImportSpec(ImportSpec {
            name: None,
            path: format!("\"{path}\""),
        }))
    }
}

pub struct Descendants<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.ast.node(id);
        for &field in node.fields().iter().rev() {
            self.stack.extend(node.children(field).iter().rev());
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Ast, NodeId, NodeId, NodeId) {
        let mut ast = Ast::new("");
        let a = ast.ident("a");
        let b = ast.ident("b");
        let block_stmt_a = ast.expr_stmt(a);
        let block_stmt_b = ast.expr_stmt(b);
        let block = ast.add(Node::Block(Block {
            stmts: vec![block_stmt_a, block_stmt_b],
        }));
        ast.set_root(block);
        (ast, block, block_stmt_a, block_stmt_b)
    }

    #[test]
    fn fields_are_listed_in_document_order() {
        let node = Node::If(IfStmt {
            init: None,
            cond: NodeId(0),
            body: NodeId(1),
            else_branch: None,
        });
        assert_eq!(
            node.fields(),
            &[Field::Init, Field::Cond, Field::Body, Field::Else]
        );
        assert!(node.children(Field::Init).is_empty());
        assert_eq!(node.children(Field::Body), &[NodeId(1)]);
        assert!(Node::Empty.fields().is_empty());
    }

    #[test]
    fn set_child_replaces_in_place_and_keeps_layout() {
        let (mut ast, block, first, second) = sample();
        ast.data_mut(second).blank_before = true;
        let c = ast.ident("c");
        let replacement = ast.expr_stmt(c);

        let old = ast
            .set_child(Location::new(block, Field::List, 1), replacement)
            .unwrap();

        assert_eq!(old, second);
        assert_eq!(ast.children(block, Field::List), &[first, replacement]);
        assert!(ast.data(replacement).blank_before);
    }

    #[test]
    fn set_child_rejects_missing_slots() {
        let (mut ast, block, _, _) = sample();
        let c = ast.ident("c");
        assert_eq!(
            ast.set_child(Location::new(block, Field::List, 5), c),
            Err(AstError::OutOfBounds {
                parent: block,
                field: Field::List,
                index: 5
            })
        );
        assert!(matches!(
            ast.set_child(Location::new(block, Field::Cond, 0), c),
            Err(AstError::NoSuchField { .. })
        ));
    }

    #[test]
    fn insert_and_remove_only_work_on_lists() {
        let (mut ast, block, first, second) = sample();
        let c = ast.ident("c");
        let stmt = ast.expr_stmt(c);
        ast.insert_child(Location::new(block, Field::List, 1), stmt)
            .unwrap();
        assert_eq!(ast.children(block, Field::List), &[first, stmt, second]);

        let removed = ast
            .remove_child(Location::new(block, Field::List, 0))
            .unwrap();
        assert_eq!(removed, first);

        assert_eq!(
            ast.insert_child(Location::new(stmt, Field::X, 0), c),
            Err(AstError::NotAList {
                parent: stmt,
                field: Field::X
            })
        );
    }

    #[test]
    fn descendants_visit_in_pre_order() {
        let (ast, block, first, second) = sample();
        let order: Vec<_> = ast.descendants(block).collect();
        let a = ast.children(first, Field::X)[0];
        let b = ast.children(second, Field::X)[0];
        assert_eq!(order, vec![block, first, a, second, b]);
    }

    #[test]
    fn import_path_value_strips_quotes() {
        let spec = ImportSpec {
            name: None,
            path: "\"github.com/Originate/exit\"".to_string(),
        };
        assert_eq!(spec.path_value(), "github.com/Originate/exit");
        let raw = ImportSpec {
            name: None,
            path: "`log`".to_string(),
        };
        assert_eq!(raw.path_value(), "log");
    }
}
