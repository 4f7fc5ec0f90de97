use crate::{object_id, ObjectRef};
use std::collections::HashSet;

/// Tells a traversal how to proceed after visiting an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Descend into the object's children
    Continue,

    /// Skip the object's children and carry on with its siblings
    Prune,

    /// Halt the entire traversal
    Stop,
}

/// A callback invoked on each object of a traversal.
///
/// Closures taking an `&ObjectRef` and returning a [`Traversal`] are visitors.
/// No borrow of the visited object is held while the visitor runs, so it may
/// mutate the object.
pub trait Visitor {
    fn visit(&mut self, object: &ObjectRef) -> Traversal;
}

impl<F> Visitor for F
where
    F: FnMut(&ObjectRef) -> Traversal,
{
    fn visit(&mut self, object: &ObjectRef) -> Traversal {
        self(object)
    }
}

/// Depth first, pre-order traversal of an object graph.
///
/// An object's children are the objects held in its fields, in declaration
/// order and then list order. By default every reference is followed, so an
/// object shared by two fields is visited twice. References back to an object
/// currently being visited are never followed.
///
/// ```
/// use objlit::{new_object, object_fields, Field, Object, ObjectRef, Traversal, Walker};
///
/// #[derive(Debug, Default)]
/// struct Node {
///     name: String,
///     children: Field<Vec<ObjectRef>>,
/// }
///
/// impl Object for Node {
///     object_fields!("Node", name: name, fields: [children]);
/// }
///
/// let leaf = new_object(Node::default());
/// let mut root = Node::default();
/// root.children.set(vec![leaf.clone(), leaf]);
/// let root = new_object(root);
///
/// let mut count = 0;
/// Walker::new().walk(&root, &mut |_: &ObjectRef| {
///     count += 1;
///     Traversal::Continue
/// });
/// assert_eq!(count, 3);
///
/// let mut count = 0;
/// Walker::new().unique(true).walk(&root, &mut |_: &ObjectRef| {
///     count += 1;
///     Traversal::Continue
/// });
/// assert_eq!(count, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Walker {
    unique: bool,
}

impl Walker {
    pub fn new() -> Self {
        Walker::default()
    }

    /// Visit each object at most once, no matter how many references lead to
    /// it
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Walk the graph reachable from `root`. Returns the code given by the
    /// last visited object.
    pub fn walk<V>(&self, root: &ObjectRef, visitor: &mut V) -> Traversal
    where
        V: Visitor + ?Sized,
    {
        let mut state = WalkState {
            unique: self.unique,
            seen: HashSet::new(),
            ancestors: Vec::new(),
        };

        state.walk(root, visitor).unwrap_or(Traversal::Continue)
    }
}

/// Visit every reference reachable from `root`. See [`Walker`].
pub fn visit<V>(root: &ObjectRef, visitor: &mut V) -> Traversal
where
    V: Visitor + ?Sized,
{
    Walker::new().walk(root, visitor)
}

struct WalkState {
    unique: bool,
    seen: HashSet<usize>,
    ancestors: Vec<usize>,
}

impl WalkState {
    /// Returns `None` when the object was skipped
    fn walk<V>(&mut self, node: &ObjectRef, visitor: &mut V) -> Option<Traversal>
    where
        V: Visitor + ?Sized,
    {
        let id = object_id(node);
        if self.ancestors.contains(&id) || (self.unique && !self.seen.insert(id)) {
            return None;
        }

        let mut last = visitor.visit(node);
        if last != Traversal::Continue {
            return Some(last);
        }

        let children = node.borrow().children();
        self.ancestors.push(id);
        for child in &children {
            if let Some(code) = self.walk(child, visitor) {
                last = code;
                if code == Traversal::Stop {
                    break;
                }
            }
        }
        self.ancestors.pop();

        Some(last)
    }
}
