//! Path navigation over node trees: query, visit, guarded update, and
//! guarded removal.
//!
//! All four operations share the same descent rules:
//!
//! - at an object, `*` fans out over every key in insertion order and a key
//!   segment follows that key;
//! - at an array, `*` fans out over every index in ascending order, `#` is
//!   the append position (mutation) or the length (query), and a key segment
//!   must be a base-10 index;
//! - an atom has no children.
//!
//! `find` and `for_each` never fail: a structural mismatch simply matches
//! nothing. `update` and `remove` are strict and report a structural mismatch
//! as [`Error::Path`]. Inside a `*` branch, `remove` skips mismatches instead,
//! since the fan-out is exploratory.
//!
//! # Key design decisions
//!
//! - **Two-phase mutation**: `update` and `remove` first resolve the path
//!   against the immutable tree, evaluating the guard predicate with the root
//!   and the concrete path of each candidate location, and only then commit
//!   the accepted edits. A path error therefore leaves the tree untouched.
//! - **Concrete path by value**: each recursive frame receives its own
//!   concrete-path prefix and extends it with [`Path::child`], so no
//!   accumulator is shared between branches.
//! - **Reverse-order removal**: removal targets are collected in pre-order and
//!   deleted in reverse, so deleting an array element never shifts the index
//!   of a target still waiting to be deleted.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::object::Object;
use crate::path::{Path, Segment};
use tracing::trace;

/// Guard evaluated with the document root and a concrete path.
type Predicate<'a> = &'a dyn Fn(&Node, &Path) -> bool;

fn always(_: &Node, _: &Path) -> bool {
    true
}

impl Node {
    /// Look up `path`, returning an owned copy of the first match or
    /// `Undefined`.
    ///
    /// ```
    /// use jsontree::node;
    ///
    /// let doc = node!({"a": 1, "b": {"c": 2}, "l": [1, 2, 3]});
    /// assert_eq!(doc.find("b/c"), node!(2));
    /// assert_eq!(doc.find("l/#"), node!(3));
    /// assert!(doc.find("b/x").is_undefined());
    /// ```
    pub fn find(&self, path: impl Into<Path>) -> Node {
        self.find_if(path, always)
    }

    /// Like [`Node::find`], but a location only matches if `predicate`
    /// accepts its concrete path. With `*`, the first accepted match wins.
    pub fn find_if(
        &self,
        path: impl Into<Path>,
        predicate: impl Fn(&Node, &Path) -> bool,
    ) -> Node {
        let path = path.into();
        let accepts = |_: &Node, at: &Path| predicate(self, at);
        let query = Query { accepts: &accepts };
        query.find(self, path.segments(), Path::root())
    }

    /// Like [`Node::find`], but a location only matches if `predicate`
    /// accepts the value found there. With `*`, the first accepted match wins.
    ///
    /// ```
    /// use jsontree::{node, Node};
    ///
    /// let doc = node!({"items": [{"id": 1}, {"id": 7}, {"id": 9}]});
    /// let big = doc.find_where("items/*/id", |n| matches!(n, Node::Integer(v) if *v > 5));
    /// assert_eq!(big, node!(7));
    /// ```
    pub fn find_where(&self, path: impl Into<Path>, predicate: impl Fn(&Node) -> bool) -> Node {
        let path = path.into();
        let accepts = |candidate: &Node, _: &Path| predicate(candidate);
        let query = Query { accepts: &accepts };
        query.find(self, path.segments(), Path::root())
    }

    /// Call `visit(root, concrete_path)` for every location matching `path`.
    pub fn for_each(&self, path: impl Into<Path>, mut visit: impl FnMut(&Node, &Path)) {
        let path = path.into();
        visit_matches(self, self, path.segments(), Path::root(), &mut visit);
    }

    /// Set the node at `path` to `value`, materializing missing structure
    /// when `insert` is true. Returns whether anything changed.
    ///
    /// A missing object key (or `#` on an array) is materialized together
    /// with the rest of the path: `#` creates an array, any other segment an
    /// object. Below a `*`, insertion is always enabled.
    ///
    /// ```
    /// use jsontree::node;
    ///
    /// let mut doc = node!({"a": 1});
    /// assert!(doc.update("e/#", 5, true).unwrap());
    /// assert_eq!(doc, node!({"a": 1, "e": [5]}));
    /// ```
    pub fn update(
        &mut self,
        path: impl Into<Path>,
        value: impl Into<Node>,
        insert: bool,
    ) -> Result<bool> {
        self.update_if(path, value, insert, always)
    }

    /// Like [`Node::update`], committing only the locations whose concrete
    /// path `predicate` accepts. For a materialized insertion the predicate
    /// sees the full path down to the new leaf.
    pub fn update_if(
        &mut self,
        path: impl Into<Path>,
        value: impl Into<Node>,
        insert: bool,
        predicate: impl Fn(&Node, &Path) -> bool,
    ) -> Result<bool> {
        let path = path.into();
        let value = value.into();
        let edits = {
            let mut planner = UpdatePlanner {
                root: &*self,
                path: &path,
                value: &value,
                predicate: &predicate,
                edits: Vec::new(),
            };
            planner.plan(&*self, path.segments(), Path::root(), insert)?;
            planner.edits
        };
        let changed = !edits.is_empty();
        let count = edits.len();
        for edit in edits {
            edit.apply(self, &value, &path)?;
        }
        if changed {
            trace!(path = %path, locations = count, "update committed");
        }
        Ok(changed)
    }

    /// Remove the array element or object pair at `path`. Returns whether
    /// anything was removed; a missing object key is not an error.
    pub fn remove(&mut self, path: impl Into<Path>) -> Result<bool> {
        self.remove_if(path, always)
    }

    /// Like [`Node::remove`], removing only the locations whose concrete path
    /// `predicate` accepts.
    pub fn remove_if(
        &mut self,
        path: impl Into<Path>,
        predicate: impl Fn(&Node, &Path) -> bool,
    ) -> Result<bool> {
        let path = path.into();
        let targets = {
            let mut planner = RemovePlanner {
                root: &*self,
                path: &path,
                predicate: &predicate,
                targets: Vec::new(),
            };
            planner.plan(&*self, path.segments(), Path::root(), false)?;
            planner.targets
        };
        let count = targets.len();
        for at in targets.into_iter().rev() {
            detach(self, &at, &path)?;
        }
        if count > 0 {
            trace!(path = %path, locations = count, "remove committed");
        }
        Ok(count > 0)
    }
}

fn describe(at: &Path) -> String {
    if at.is_empty() {
        "the root".to_string()
    } else {
        format!("`{}`", at)
    }
}

fn array_len(len: usize) -> Node {
    Node::Integer(i64::try_from(len).unwrap_or(i64::MAX))
}

// ============================================================================
// Query
// ============================================================================

/// `accepts` sees the candidate value and its concrete path.
struct Query<'a> {
    accepts: &'a dyn Fn(&Node, &Path) -> bool,
}

impl Query<'_> {
    fn find(&self, node: &Node, rest: &[Segment], concrete: Path) -> Node {
        let Some((seg, tail)) = rest.split_first() else {
            return self.accept(node.clone(), &concrete);
        };
        match (node, seg) {
            (Node::Object(obj), Segment::Wildcard) => obj
                .iter()
                .map(|(k, child)| self.find(child, tail, concrete.child(Segment::key(k))))
                .find(|n| !n.is_undefined())
                .unwrap_or(Node::Undefined),
            (Node::Object(obj), Segment::Key(k)) => match obj.get(k) {
                Some(child) => self.find(child, tail, concrete.child(seg.clone())),
                None => Node::Undefined,
            },
            (Node::Array(arr), Segment::Wildcard) => arr
                .iter()
                .enumerate()
                .map(|(i, child)| self.find(child, tail, concrete.child(Segment::index(i))))
                .find(|n| !n.is_undefined())
                .unwrap_or(Node::Undefined),
            // `#` is terminal: the length cannot be descended into.
            (Node::Array(arr), Segment::Append) if tail.is_empty() => {
                self.accept(array_len(arr.len()), &concrete.child(Segment::Append))
            }
            (Node::Array(arr), Segment::Key(_)) => {
                match seg.as_index().and_then(|i| arr.get(i).map(|child| (i, child))) {
                    Some((i, child)) => self.find(child, tail, concrete.child(Segment::index(i))),
                    None => Node::Undefined,
                }
            }
            _ => Node::Undefined,
        }
    }

    fn accept(&self, node: Node, concrete: &Path) -> Node {
        if (self.accepts)(&node, concrete) {
            node
        } else {
            Node::Undefined
        }
    }
}

fn visit_matches(
    root: &Node,
    node: &Node,
    rest: &[Segment],
    concrete: Path,
    visit: &mut dyn FnMut(&Node, &Path),
) {
    let Some((seg, tail)) = rest.split_first() else {
        visit(root, &concrete);
        return;
    };
    match (node, seg) {
        (Node::Object(obj), Segment::Wildcard) => {
            for (k, child) in obj {
                visit_matches(root, child, tail, concrete.child(Segment::key(k)), visit);
            }
        }
        (Node::Object(obj), Segment::Key(k)) => {
            if let Some(child) = obj.get(k) {
                visit_matches(root, child, tail, concrete.child(seg.clone()), visit);
            }
        }
        (Node::Array(arr), Segment::Wildcard) => {
            for (i, child) in arr.iter().enumerate() {
                visit_matches(root, child, tail, concrete.child(Segment::index(i)), visit);
            }
        }
        (Node::Array(_), Segment::Append) if tail.is_empty() => {
            visit(root, &concrete.child(Segment::Append));
        }
        (Node::Array(arr), Segment::Key(_)) => {
            if let Some((i, child)) = seg.as_index().and_then(|i| arr.get(i).map(|c| (i, c))) {
                visit_matches(root, child, tail, concrete.child(Segment::index(i)), visit);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Update
// ============================================================================

/// A resolved, predicate-approved change.
#[derive(Debug)]
enum Edit {
    /// Overwrite the existing node at `at` with the update value.
    Replace { at: Path },
    /// Add `key` to the object at `parent`.
    Insert { parent: Path, key: String, node: Node },
    /// Push onto the array at `parent`.
    Append { parent: Path, node: Node },
}

impl Edit {
    fn apply(self, root: &mut Node, value: &Node, path: &Path) -> Result<()> {
        match self {
            Edit::Replace { at } => {
                *locate(root, &at, path)? = value.clone();
            }
            Edit::Insert { parent, key, node } => {
                locate(root, &parent, path)?.as_object_mut()?.set(key, node);
            }
            Edit::Append { parent, node } => {
                locate(root, &parent, path)?.as_array_mut()?.push(node);
            }
        }
        Ok(())
    }
}

struct UpdatePlanner<'a> {
    root: &'a Node,
    path: &'a Path,
    value: &'a Node,
    predicate: Predicate<'a>,
    edits: Vec<Edit>,
}

impl UpdatePlanner<'_> {
    fn plan(&mut self, node: &Node, rest: &[Segment], concrete: Path, insert: bool) -> Result<()> {
        let Some((seg, tail)) = rest.split_first() else {
            // An equal value is not a change.
            if (self.predicate)(self.root, &concrete) && node != self.value {
                self.edits.push(Edit::Replace { at: concrete });
            }
            return Ok(());
        };
        match node {
            Node::Object(obj) => match seg {
                Segment::Wildcard => {
                    for (k, child) in obj {
                        self.plan(child, tail, concrete.child(Segment::key(k)), true)?;
                    }
                    Ok(())
                }
                Segment::Append => Err(Error::path(
                    self.path,
                    format!("`#` needs an array, found Object at {}", describe(&concrete)),
                )),
                Segment::Key(k) => match obj.get(k) {
                    Some(child) => self.plan(child, tail, concrete.child(seg.clone()), insert),
                    None if insert => {
                        let at = concrete.child(seg.clone());
                        if let Some((subtree, full)) = self.materialize(at, tail) {
                            if (self.predicate)(self.root, &full) {
                                self.edits.push(Edit::Insert {
                                    parent: concrete,
                                    key: k.clone(),
                                    node: subtree,
                                });
                            }
                        }
                        Ok(())
                    }
                    None => Ok(()),
                },
            },
            Node::Array(arr) => match seg {
                Segment::Wildcard => {
                    for (i, child) in arr.iter().enumerate() {
                        self.plan(child, tail, concrete.child(Segment::index(i)), true)?;
                    }
                    Ok(())
                }
                Segment::Append if insert => {
                    let at = concrete.child(Segment::index(arr.len()));
                    if let Some((subtree, full)) = self.materialize(at, tail) {
                        if (self.predicate)(self.root, &full) {
                            self.edits.push(Edit::Append {
                                parent: concrete,
                                node: subtree,
                            });
                        }
                    }
                    Ok(())
                }
                Segment::Append => Ok(()),
                Segment::Key(_) => {
                    let (i, child) = index_child(arr.as_slice(), seg, self.path, &concrete)?;
                    self.plan(child, tail, concrete.child(Segment::index(i)), insert)
                }
            },
            other => Err(Error::path(
                self.path,
                format!(
                    "cannot descend into {} at {}",
                    other.type_name(),
                    describe(&concrete)
                ),
            )),
        }
    }

    /// Build the subtree implied by the remaining segments, with the update
    /// value at its leaf, plus the concrete path of that leaf. A `*` below a
    /// missing location has nothing to fan out over and yields `None`.
    fn materialize(&self, at: Path, tail: &[Segment]) -> Option<(Node, Path)> {
        let mut full = at;
        for seg in tail {
            full = match seg {
                Segment::Wildcard => return None,
                Segment::Append => full.child(Segment::index(0)),
                Segment::Key(_) => full.child(seg.clone()),
            };
        }
        let node = tail.iter().rev().fold(self.value.clone(), |inner, seg| match seg {
            Segment::Append => Node::from(vec![inner]),
            _ => {
                let mut object = Object::new();
                object.set(seg.to_string(), inner);
                Node::Object(object)
            }
        });
        Some((node, full))
    }
}

fn index_child<'n>(
    items: &'n [Node],
    seg: &Segment,
    path: &Path,
    concrete: &Path,
) -> Result<(usize, &'n Node)> {
    let i = seg.as_index().ok_or_else(|| {
        Error::path(
            path,
            format!("`{}` is not an array index at {}", seg, describe(concrete)),
        )
    })?;
    let child = items.get(i).ok_or_else(|| {
        Error::path(
            path,
            format!(
                "index `{}` out of range for array of length {} at {}",
                seg,
                items.len(),
                describe(concrete)
            ),
        )
    })?;
    Ok((i, child))
}

/// Follow a concrete path mutably.
fn locate<'n>(root: &'n mut Node, at: &Path, path: &Path) -> Result<&'n mut Node> {
    let mut node = root;
    for seg in at {
        let next = match node {
            Node::Object(obj) => match seg.as_key() {
                Some(k) => obj.get_mut(k),
                None => None,
            },
            Node::Array(arr) => match seg.as_index() {
                Some(i) => arr.get_mut(i),
                None => None,
            },
            _ => None,
        };
        node = next.ok_or_else(|| Error::path(path, format!("{} no longer resolves", describe(at))))?;
    }
    Ok(node)
}

// ============================================================================
// Remove
// ============================================================================

struct RemovePlanner<'a> {
    root: &'a Node,
    path: &'a Path,
    predicate: Predicate<'a>,
    targets: Vec<Path>,
}

impl RemovePlanner<'_> {
    /// `fanout` is true below a `*`, where mismatches are skipped.
    fn plan(&mut self, node: &Node, rest: &[Segment], concrete: Path, fanout: bool) -> Result<()> {
        let Some((seg, tail)) = rest.split_first() else {
            return Err(Error::path(self.path, "cannot remove the root"));
        };
        match node {
            Node::Object(obj) => match seg {
                Segment::Wildcard => {
                    for (k, child) in obj {
                        self.descend(child, tail, concrete.child(Segment::key(k)), true)?;
                    }
                    Ok(())
                }
                Segment::Append => self.mismatch(
                    fanout,
                    format!("`#` needs an array, found Object at {}", describe(&concrete)),
                ),
                Segment::Key(k) => match obj.get(k) {
                    Some(child) => self.descend(child, tail, concrete.child(seg.clone()), fanout),
                    None => Ok(()),
                },
            },
            Node::Array(arr) => match seg {
                Segment::Wildcard => {
                    for (i, child) in arr.iter().enumerate() {
                        self.descend(child, tail, concrete.child(Segment::index(i)), true)?;
                    }
                    Ok(())
                }
                Segment::Append => self.mismatch(
                    fanout,
                    format!("cannot remove at the append position of {}", describe(&concrete)),
                ),
                // A missing element counts as not found, like a missing key,
                // so removing the same path twice is a no-op the second time.
                Segment::Key(_) => match seg.as_index() {
                    Some(i) => match arr.get(i) {
                        Some(child) => self.descend(child, tail, concrete.child(Segment::index(i)), fanout),
                        None => Ok(()),
                    },
                    None => self.mismatch(
                        fanout,
                        format!("`{}` is not an array index at {}", seg, describe(&concrete)),
                    ),
                },
            },
            other => self.mismatch(
                fanout,
                format!(
                    "cannot descend into {} at {}",
                    other.type_name(),
                    describe(&concrete)
                ),
            ),
        }
    }

    /// `at` names an existing child; either it is the target or we go deeper.
    fn descend(&mut self, child: &Node, tail: &[Segment], at: Path, fanout: bool) -> Result<()> {
        if !tail.is_empty() {
            return self.plan(child, tail, at, fanout);
        }
        if (self.predicate)(self.root, &at) {
            self.targets.push(at);
        }
        Ok(())
    }

    fn mismatch(&self, fanout: bool, reason: String) -> Result<()> {
        if fanout {
            Ok(())
        } else {
            Err(Error::path(self.path, reason))
        }
    }
}

/// Delete the pair or element named by the concrete path `at`.
fn detach(root: &mut Node, at: &Path, path: &Path) -> Result<()> {
    let segments = at.segments();
    let Some((last, parent)) = segments.split_last() else {
        return Err(Error::path(path, "cannot remove the root"));
    };
    let parent_path = Path::from_segments(parent.to_vec());
    let removed = match locate(root, &parent_path, path)? {
        Node::Object(obj) => last.as_key().is_some_and(|k| obj.remove(k)),
        Node::Array(arr) => last
            .as_index()
            .is_some_and(|i| arr.remove(i).is_ok()),
        _ => false,
    };
    if removed {
        Ok(())
    } else {
        Err(Error::path(path, format!("{} no longer resolves", describe(at))))
    }
}
