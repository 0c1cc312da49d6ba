//! Pre-order traversal that lets a callback edit the tree as it goes.

use crate::ast::{Ast, AstError, Location, NodeId};

/// The node currently visited by [`apply`] together with where it hangs.
pub struct Cursor<'a> {
    ast: &'a mut Ast,
    node: NodeId,
    location: Option<Location>,
    replaced: bool,
    inserted: usize,
}

impl<'a> Cursor<'a> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// `None` for the root.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.location.map(|location| location.parent)
    }

    pub fn ast(&self) -> &Ast {
        &*self.ast
    }

    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut *self.ast
    }

    /// Whether the current node is an entry of a list such as a block's
    /// statements.
    pub fn in_list(&self) -> bool {
        self.location.is_some_and(|location| {
            self.ast
                .node(location.parent)
                .is_list_field(location.field)
        })
    }

    /// Puts `new` where the current node is. The walk does not descend into
    /// `new`.
    pub fn replace(&mut self, new: NodeId) -> Result<NodeId, AstError> {
        let location = self
            .location
            .ok_or(AstError::Detached { node: self.node })?;
        let old = self.ast.set_child(location, new)?;
        self.node = new;
        self.replaced = true;
        Ok(old)
    }

    /// Inserts `new` into the enclosing list right before the current node.
    /// Inserted nodes are not visited.
    pub fn insert_before(&mut self, new: NodeId) -> Result<(), AstError> {
        let location = self
            .location
            .ok_or(AstError::Detached { node: self.node })?;
        self.ast.insert_child(location, new)?;
        if let Some(location) = self.location.as_mut() {
            location.index += 1;
        }
        self.inserted += 1;
        Ok(())
    }
}

/// Visits every node reachable from the root in document order.
///
/// `pre` is called before the children of a node are visited; returning
/// `false` skips them. Edits made through the cursor apply immediately.
pub fn apply<F>(ast: &mut Ast, mut pre: F) -> Result<(), AstError>
where
    F: FnMut(&mut Cursor<'_>) -> Result<bool, AstError>,
{
    let root = ast.root();
    walk(ast, root, None, &mut pre)?;
    Ok(())
}

/// Visits `node` and its subtree; returns how many nodes were inserted in
/// front of it.
fn walk<F>(
    ast: &mut Ast,
    node: NodeId,
    location: Option<Location>,
    pre: &mut F,
) -> Result<usize, AstError>
where
    F: FnMut(&mut Cursor<'_>) -> Result<bool, AstError>,
{
    let mut cursor = Cursor {
        ast: &mut *ast,
        node,
        location,
        replaced: false,
        inserted: 0,
    };
    let descend = pre(&mut cursor)?;
    let Cursor {
        node,
        replaced,
        inserted,
        ..
    } = cursor;
    if !descend || replaced {
        return Ok(inserted);
    }

    for &field in ast.node(node).fields() {
        let mut index = 0;
        while let Some(child) = ast.child(node, field, index) {
            let shift = walk(
                ast,
                child,
                Some(Location::new(node, field, index)),
                pre,
            )?;
            index += 1 + shift;
        }
    }
    Ok(inserted)
}
