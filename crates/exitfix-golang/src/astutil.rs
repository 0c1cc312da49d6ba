//! Import list maintenance.

use crate::ast::{Ast, AstError, DeclKeyword, Field, GenDecl, Location, Node, NodeId, ObjKind};
pub use crate::resolve::import_local_name;

/// A top-level import spec and the declaration holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRef {
    pub decl: NodeId,
    pub index: usize,
    pub spec: NodeId,
}

fn import_decls(ast: &Ast) -> impl Iterator<Item = NodeId> + '_ {
    ast.children(ast.root(), Field::Decls)
        .iter()
        .copied()
        .filter(|&decl| {
            matches!(ast.node(decl), Node::GenDecl(group) if group.keyword == DeclKeyword::Import)
        })
}

/// Every import of the file in source order.
pub fn imports(ast: &Ast) -> Vec<ImportRef> {
    let mut found = Vec::new();
    for decl in import_decls(ast) {
        for (index, &spec) in ast.children(decl, Field::Specs).iter().enumerate() {
            if matches!(ast.node(spec), Node::ImportSpec(_)) {
                found.push(ImportRef { decl, index, spec });
            }
        }
    }
    found
}

fn import_path(ast: &Ast, spec: NodeId) -> &str {
    match ast.node(spec) {
        Node::ImportSpec(import) => import.path_value(),
        _ => "",
    }
}

pub fn find_import(ast: &Ast, path: &str) -> Option<ImportRef> {
    imports(ast)
        .into_iter()
        .find(|import| import_path(ast, import.spec) == path)
}

/// Whether the file refers to the package imported as `path`.
///
/// Blank and dot imports always count as used.
pub fn uses_import(ast: &Ast, path: &str) -> bool {
    let Some(import) = find_import(ast, path) else {
        return false;
    };
    let Some(name) = import_local_name(ast, import.spec) else {
        return false;
    };
    if name == "_" || name == "." {
        return true;
    }
    ast.descendants(ast.root()).any(|id| match ast.node(id) {
        Node::Selector(selector) => match ast.node(selector.x) {
            Node::Ident(ident) => {
                ident.name == name && ident.obj.map_or(true, |obj| obj == ObjKind::Package)
            }
            _ => false,
        },
        Node::Raw(raw) => mentions_package(&raw.text, &name),
        _ => false,
    })
}

/// Looks for `name.` at an identifier boundary in verbatim source.
fn mentions_package(text: &str, name: &str) -> bool {
    let needle = format!("{name}.");
    text.match_indices(&needle).any(|(at, _)| {
        text[..at]
            .chars()
            .next_back()
            .map_or(true, |prev| !(prev.is_alphanumeric() || prev == '_' || prev == '.'))
    })
}

fn is_third_party(path: &str) -> bool {
    path.split('/').next().is_some_and(|first| first.contains('.'))
}

/// Number of path segments `a` and `b` share as a prefix.
fn match_len(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .filter(|(x, _)| *x == b'/')
        .count()
}

/// Adds an unnamed import of `path` unless the file already imports it.
/// Returns whether the tree changed.
///
/// The new import joins the group of the closest matching import of the same
/// kind (standard library or third party). A third-party import added to a
/// file that only imports the standard library starts a new group.
pub fn add_import(ast: &mut Ast, path: &str) -> Result<bool, AstError> {
    if find_import(ast, path).is_some() {
        return Ok(false);
    }
    let third_party = is_third_party(path);
    let spec = ast.import_spec(path);
    let existing = imports(ast);

    let best = existing
        .iter()
        .filter(|import| is_third_party(import_path(ast, import.spec)) == third_party)
        .max_by_key(|import| match_len(import_path(ast, import.spec), path));
    let first_decl = import_decls(ast).next();
    let (decl, index, new_group) = match (best, existing.last()) {
        (Some(best), _) => (best.decl, best.index + 1, false),
        (None, Some(_)) => {
            let decl = existing[0].decl;
            let len = ast.children(decl, Field::Specs).len();
            (decl, len, true)
        }
        (None, None) => match first_decl {
            Some(decl) => (decl, ast.children(decl, Field::Specs).len(), false),
            None => {
                insert_import_decl(ast, spec)?;
                return Ok(true);
            }
        },
    };

    ast.data_mut(spec).blank_before = new_group;
    ast.insert_child(Location::new(decl, Field::Specs, index), spec)?;
    if let Node::GenDecl(group) = ast.node_mut(decl) {
        group.grouped = group.grouped || group.specs.len() > 1;
    }
    Ok(true)
}

/// `import "path"` right after the package clause.
fn insert_import_decl(ast: &mut Ast, spec: NodeId) -> Result<(), AstError> {
    let root = ast.root();
    let position = ast
        .children(root, Field::Decls)
        .iter()
        .position(|&decl| matches!(ast.node(decl), Node::PackageClause(_)))
        .map_or(0, |index| index + 1);
    let decl = ast.add(Node::GenDecl(GenDecl {
        keyword: DeclKeyword::Import,
        grouped: false,
        specs: vec![spec],
    }));
    ast.data_mut(decl).blank_before = true;
    ast.insert_child(Location::new(root, Field::Decls, position), decl)
}

/// Removes the import of `path` together with the comment lines directly
/// above it. Returns whether the tree changed.
///
/// A declaration left without imports is removed; one left with a single
/// import loses its parentheses.
pub fn delete_import(ast: &mut Ast, path: &str) -> Result<bool, AstError> {
    let Some(import) = find_import(ast, path) else {
        return Ok(false);
    };
    let mut first = import.index;
    while first > 0 {
        let specs = ast.children(import.decl, Field::Specs);
        let attached = !ast.data(specs[first]).blank_before;
        if !(attached && matches!(ast.node(specs[first - 1]), Node::Comment(_))) {
            break;
        }
        first -= 1;
    }
    let mut lead_blank = false;
    for _ in first..=import.index {
        let removed = ast.remove_child(Location::new(import.decl, Field::Specs, first))?;
        lead_blank = lead_blank || ast.data(removed).blank_before;
    }
    let specs = ast.children(import.decl, Field::Specs).to_vec();
    if first > 0 && lead_blank {
        if let Some(&next) = specs.get(first) {
            ast.data_mut(next).blank_before = true;
        }
    }

    let remaining = specs
        .iter()
        .filter(|&&spec| matches!(ast.node(spec), Node::ImportSpec(_)))
        .count();
    if remaining == 0 {
        let root = ast.root();
        let position = ast
            .children(root, Field::Decls)
            .iter()
            .position(|&decl| decl == import.decl);
        if let Some(position) = position {
            ast.remove_child(Location::new(root, Field::Decls, position))?;
        }
    } else if remaining == 1 && specs.len() == 1 {
        if let Node::GenDecl(group) = ast.node_mut(import.decl) {
            group.grouped = false;
        }
        ast.data_mut(specs[0]).blank_before = false;
    }
    Ok(true)
}
