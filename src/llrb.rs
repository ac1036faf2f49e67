use std::fmt::Display;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;

use crate::error::LlrbError;
use crate::node::{self, Node};

/// Llrb manages a single instance of an in-memory sorted map using a
/// [left-leaning-red-black][llrb] tree, ordered by a caller supplied
/// `less` comparator and safe for shared access across threads.
///
/// Ordering is fully described by the comparator: `less(a, b)` must
/// implement a strict total order over keys, and two keys are equal
/// when neither compares less than the other.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
pub struct Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    name: String,
    less: C,
    inner: RwLock<Inner<K, V>>,
}

// Everything a mutation touches, {root, n_count}, lives under the one
// reader-writer lock. The comparator is immutable after construction
// and stays outside.
struct Inner<K, V>
where
    K: Clone,
    V: Clone,
{
    root: Option<Box<Node<K, V>>>,
    n_count: usize, // number of entries in the tree.
}

/// Different ways to construct a new Llrb instance.
impl<K, V, C> Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    /// Create an empty instance of Llrb, identified by `name`, ordered
    /// by `less`. Applications can choose unique names.
    pub fn new<S>(name: S, less: C) -> Llrb<K, V, C>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            less,
            inner: RwLock::new(Inner {
                root: Default::default(),
                n_count: Default::default(),
            }),
        }
    }
}

impl<K, V> Llrb<K, V, fn(&K, &K) -> bool>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Create an empty instance ordered by the key type's natural
    /// ordering.
    pub fn with_ord<S>(name: S) -> Llrb<K, V, fn(&K, &K) -> bool>
    where
        S: AsRef<str>,
    {
        Llrb::new(name, K::lt as fn(&K, &K) -> bool)
    }
}

/// Maintenance API.
impl<K, V, C> Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    /// Identify this instance. Applications can choose unique names
    /// while creating Llrb instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.rd().n_count
    }

    /// Check whether this instance is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rd().n_count == 0
    }

    fn rd(&self) -> RwLockReadGuard<Inner<K, V>> {
        self.inner.read().expect("llrb: poisoned lock")
    }

    fn wr(&self) -> RwLockWriteGuard<Inner<K, V>> {
        self.inner.write().expect("llrb: poisoned lock")
    }
}

type Upsert<K, V> = (Box<Node<K, V>>, Option<V>);

type Delete<K, V> = (Option<Box<Node<K, V>>>, Option<V>);

/// Write operations on Llrb instance.
impl<K, V, C> Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.wr();
        let (mut root, old_value) = self.upsert(inner.root.take(), key, value);
        root.set_black();
        inner.root = Some(root);
        match old_value {
            old_value @ Some(_) => old_value,
            None => {
                inner.n_count += 1;
                None
            }
        }
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, delete is a no-op, the tree keeps its exact shape.
    pub fn delete(&self, key: &K) -> Option<V> {
        let mut inner = self.wr();
        // the recursive descent rebalances eagerly, so an absent key
        // must be ruled out before any transformation is applied.
        if self.find(inner.root.as_deref(), key).is_none() {
            return None;
        }
        let (root, old_value) = match self.do_delete(inner.root.take(), key) {
            (None, old_value) => (None, old_value),
            (Some(mut root), old_value) => {
                root.set_black();
                (Some(root), old_value)
            }
        };
        inner.root = root;
        if old_value.is_some() {
            inner.n_count -= 1;
        }
        old_value
    }

    /// Remove and return the entry with the least key.
    pub fn delete_min(&self) -> Option<(K, V)> {
        let mut inner = self.wr();
        let (root, old_node) = node::delete_min(inner.root.take());
        inner.root = root.map(|mut root| {
            root.set_black();
            root
        });
        old_node.map(|old_node| {
            inner.n_count -= 1;
            (old_node.key, old_node.value)
        })
    }

    /// Remove and return the entry with the greatest key.
    pub fn delete_max(&self) -> Option<(K, V)> {
        let mut inner = self.wr();
        let (root, old_node) = node::delete_max(inner.root.take());
        inner.root = root.map(|mut root| {
            root.set_black();
            root
        });
        old_node.map(|old_node| {
            inner.n_count -= 1;
            (old_node.key, old_node.value)
        })
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Root node must be black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * No red link leaning right.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure keys are in comparator order.
    ///
    /// On success return the number of black nodes from root to leaf.
    pub fn validate(&self) -> Result<usize, LlrbError<K>> {
        let inner = self.rd();
        let root = inner.root.as_deref();
        if node::is_red(root) {
            return Err(LlrbError::RedRoot);
        }
        self.validate_tree(root, false, 0)
    }
}

/// Read operations on Llrb instance.
impl<K, V, C> Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    /// Get the value for key.
    pub fn get(&self, key: &K) -> Option<V> {
        let inner = self.rd();
        self.find(inner.root.as_deref(), key)
            .map(|nref| nref.value.clone())
    }

    /// Return every key in this instance, in comparator order.
    pub fn keys(&self) -> Vec<K> {
        let inner = self.rd();
        let mut acc = Vec::with_capacity(inner.n_count);
        node::collect_keys(inner.root.as_deref(), &mut acc);
        acc
    }

    /// Return a random entry from this instance.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(K, V)> {
        let inner = self.rd();
        let mut nref = inner.root.as_deref()?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => nref.left_deref(),
                1 => nref.right_deref(),
                _ => unreachable!(),
            };
            if at_depth == 0 || next.is_none() {
                break Some((nref.key.clone(), nref.value.clone()));
            }
            at_depth -= 1;
            nref = next.unwrap();
        }
    }
}

impl<K, V, C> Llrb<K, V, C>
where
    K: Clone + Display,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    /// Describe the tree shape in graphviz dot format, one edge per
    /// parent to child link, labelled with the branch side and colored
    /// by the child's color. Meant for external rendering tools.
    pub fn to_dot(&self) -> String {
        let inner = self.rd();
        let mut body = String::new();
        if let Some(root) = inner.root.as_deref() {
            node::dot_edges(root, &mut body);
        }
        format!("digraph llrb {{\n{}}}", body)
    }
}

impl<K, V, C> Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool,
{
    fn find<'a>(&self, mut node: Option<&'a Node<K, V>>, key: &K) -> Option<&'a Node<K, V>> {
        while let Some(nref) = node {
            node = if (self.less)(&nref.key, key) {
                nref.right_deref()
            } else if (self.less)(key, &nref.key) {
                nref.left_deref()
            } else {
                return Some(nref);
            };
        }
        None
    }

    fn upsert(&self, node: Option<Box<Node<K, V>>>, key: K, value: V) -> Upsert<K, V> {
        let mut node = match node {
            None => return (Node::new(key, value, false /*black*/), None),
            Some(node) => node,
        };

        if (self.less)(&key, &node.key) {
            let (left, o) = self.upsert(node.left.take(), key, value);
            node.left = Some(left);
            (node::fixup(node), o)
        } else if (self.less)(&node.key, &key) {
            let (right, o) = self.upsert(node.right.take(), key, value);
            node.right = Some(right);
            (node::fixup(node), o)
        } else {
            let old_value = node.set_value(value);
            (node, Some(old_value))
        }
    }

    fn do_delete(&self, node: Option<Box<Node<K, V>>>, key: &K) -> Delete<K, V> {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };

        if (self.less)(key, &node.key) {
            if node.left.is_none() {
                (Some(node), None)
            } else {
                let ok = !node::is_red(node.left_deref());
                if ok && !node::is_red(node.left.as_ref().unwrap().left_deref()) {
                    node = node::move_red_left(node);
                }
                let (left, old_value) = self.do_delete(node.left.take(), key);
                node.left = left;
                (Some(node::fixup(node)), old_value)
            }
        } else {
            if node::is_red(node.left_deref()) {
                node = node::rotate_right(node);
            }

            if !(self.less)(&node.key, key) && node.right.is_none() {
                // true 2-node leaf, splice in the left child.
                let Node { value, left, .. } = *node;
                return (left, Some(value));
            }

            let ok = node.right.is_some() && !node::is_red(node.right_deref());
            if ok && !node::is_red(node.right.as_ref().unwrap().left_deref()) {
                node = node::move_red_right(node);
            }

            if !(self.less)(&node.key, key) {
                // matching node, replace its entry with the successor
                // detached from the right subtree.
                let (right, sub_node) = node::delete_min(node.right.take());
                node.right = right;
                let sub_node = match sub_node {
                    Some(sub_node) => sub_node,
                    None => panic!("do_delete(): fatal logic, call the programmer"),
                };
                node.key = sub_node.key;
                let old_value = node.set_value(sub_node.value);
                (Some(node::fixup(node)), Some(old_value))
            } else {
                let (right, old_value) = self.do_delete(node.right.take(), key);
                node.right = right;
                (Some(node::fixup(node)), old_value)
            }
        }
    }

    fn validate_tree(
        &self,
        node: Option<&Node<K, V>>,
        fromred: bool,
        mut nb: usize,
    ) -> Result<usize, LlrbError<K>> {
        let node = match node {
            None => return Ok(nb),
            Some(node) => node,
        };

        let red = node::is_red(Some(node));
        if fromred && red {
            return Err(LlrbError::ConsecutiveReds);
        }
        if node::is_red(node.right_deref()) {
            return Err(LlrbError::RedRightLink);
        }
        if !red {
            nb += 1;
        }
        let lblacks = self.validate_tree(node.left_deref(), red, nb)?;
        let rblacks = self.validate_tree(node.right_deref(), red, nb)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(LlrbError::UnbalancedBlacks(err));
        }
        if let Some(left) = node.left_deref() {
            if !(self.less)(&left.key, &node.key) {
                let (lkey, parent) = (left.key.clone(), node.key.clone());
                return Err(LlrbError::SortError(lkey, parent));
            }
        }
        if let Some(right) = node.right_deref() {
            if !(self.less)(&node.key, &right.key) {
                let (rkey, parent) = (right.key.clone(), node.key.clone());
                return Err(LlrbError::SortError(rkey, parent));
            }
        }
        Ok(lblacks)
    }
}

impl<K, V, C> Clone for Llrb<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> bool + Clone,
{
    fn clone(&self) -> Llrb<K, V, C> {
        let inner = self.rd();
        Llrb {
            name: self.name.clone(),
            less: self.less.clone(),
            inner: RwLock::new(Inner {
                root: inner.root.clone(),
                n_count: inner.n_count,
            }),
        }
    }
}
