use std::fmt::Display;
use std::ops::DerefMut;

/// Node corresponds to a single entry in an [`Llrb`] instance.
///
/// [`Llrb`]: crate::Llrb
#[derive(Clone)]
pub struct Node<K, V>
where
    K: Clone,
    V: Clone,
{
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) black: bool,                    // store: black or red
    pub(crate) left: Option<Box<Node<K, V>>>,  // store: left child
    pub(crate) right: Option<Box<Node<K, V>>>, // store: right child
}

// Primary operations on a single node.
impl<K, V> Node<K, V>
where
    K: Clone,
    V: Clone,
{
    // CREATE operation
    pub(crate) fn new(key: K, value: V, black: bool) -> Box<Node<K, V>> {
        Box::new(Node {
            key,
            value,
            black,
            left: None,
            right: None,
        })
    }

    #[inline]
    pub(crate) fn left_deref(&self) -> Option<&Node<K, V>> {
        self.left.as_deref()
    }

    #[inline]
    pub(crate) fn right_deref(&self) -> Option<&Node<K, V>> {
        self.right.as_deref()
    }

    #[inline]
    pub(crate) fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    #[inline]
    pub(crate) fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub(crate) fn set_black(&mut self) {
        self.black = true
    }

    #[inline]
    pub(crate) fn toggle_link(&mut self) {
        self.black = !self.black
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.black
    }
}

pub(crate) fn is_red<K, V>(node: Option<&Node<K, V>>) -> bool
where
    K: Clone,
    V: Clone,
{
    node.map_or(false, |node| !node.is_black())
}

pub(crate) fn is_black<K, V>(node: Option<&Node<K, V>>) -> bool
where
    K: Clone,
    V: Clone,
{
    node.map_or(true, |node| node.is_black())
}

//--------- rotation routines for 2-3 algorithm ----------------

// Each routine takes ownership of a subtree root and hands back the
// new root; the caller re-links it into the parent slot.

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left       x             node      xr
//                    / \            /  \
//                  xl   xr       left   xl
//
pub(crate) fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    if is_black(node.right_deref()) {
        panic!("rotate_left(): rotating a black link ? call the programmer");
    }
    let mut x = node.right.take().unwrap();
    node.right = x.left.take();
    x.black = node.black;
    node.set_red();
    x.left = Some(node);
    x
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//          x       right             xl      node
//         / \                                / \
//       xl   xr                             xr  right
//
pub(crate) fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    if is_black(node.left_deref()) {
        panic!("rotate_right(): rotating a black link ? call the programmer")
    }
    let mut x = node.left.take().unwrap();
    node.left = x.right.take();
    x.black = node.black;
    node.set_red();
    x.right = Some(node);
    x
}

//        (x)                   (!x)
//         |                     |
//        node                  node
//        / \                   / \
//      (y) (z)              (!y) (!z)
//     /      \              /      \
//   left    right         left    right
//
// Absent children stay implicitly black.
pub(crate) fn flip<K, V>(node: &mut Node<K, V>)
where
    K: Clone,
    V: Clone,
{
    node.toggle_link();
    if let Some(left) = node.left.as_mut() {
        left.toggle_link();
    }
    if let Some(right) = node.right.as_mut() {
        right.toggle_link();
    }
}

// Bottom-up repair after a mutation strictly below `node`. The three
// steps run in this order, each on the outcome of the previous one;
// flipping before the rotations is not an equivalent formulation.
pub(crate) fn fixup<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    node = if is_red(node.right_deref()) {
        rotate_left(node)
    } else {
        node
    };
    node = {
        let left = node.left_deref();
        if is_red(left) && is_red(left.unwrap().left_deref()) {
            rotate_right(node)
        } else {
            node
        }
    };
    if is_red(node.left_deref()) && is_red(node.right_deref()) {
        flip(node.deref_mut());
    }
    node
}

// Push a red link onto the left spine before descending left. The
// caller has already checked that node.left and node.left.left are
// both black.
pub(crate) fn move_red_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    flip(node.deref_mut());
    if is_red(node.right.as_ref().unwrap().left_deref()) {
        node.right = Some(rotate_right(node.right.take().unwrap()));
        node = rotate_left(node);
        flip(node.deref_mut());
    }
    node
}

// Mirror of move_red_left for rightward descent. node.right.right is
// not consulted, the left-leaning invariant keeps it black.
pub(crate) fn move_red_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone,
    V: Clone,
{
    flip(node.deref_mut());
    if is_red(node.left.as_ref().unwrap().left_deref()) {
        node = rotate_right(node);
        flip(node.deref_mut());
    }
    node
}

pub(crate) type Delext<K, V> = (Option<Box<Node<K, V>>>, Option<Node<K, V>>);

// Detach the minimum node of the subtree, returning the new subtree
// root along with the detached node. When node.left is absent the
// right child is spliced in, rather than assumed absent as well.
pub(crate) fn delete_min<K, V>(node: Option<Box<Node<K, V>>>) -> Delext<K, V>
where
    K: Clone,
    V: Clone,
{
    let mut node = match node {
        None => return (None, None),
        Some(node) => node,
    };
    if node.left.is_none() {
        let right = node.right.take();
        return (right, Some(*node));
    }
    let left = node.left_deref();
    if !is_red(left) && !is_red(left.unwrap().left_deref()) {
        node = move_red_left(node);
    }
    let (left, old_node) = delete_min(node.left.take());
    node.left = left;
    (Some(fixup(node)), old_node)
}

// Mirror of delete_min. A red left link is rotated away before the
// right-hand descent.
pub(crate) fn delete_max<K, V>(node: Option<Box<Node<K, V>>>) -> Delext<K, V>
where
    K: Clone,
    V: Clone,
{
    let mut node = match node {
        None => return (None, None),
        Some(node) => node,
    };
    if is_red(node.left_deref()) {
        node = rotate_right(node);
    }
    if node.right.is_none() {
        let left = node.left.take();
        return (left, Some(*node));
    }
    let right = node.right_deref();
    if !is_red(right) && !is_red(right.unwrap().left_deref()) {
        node = move_red_right(node);
    }
    let (right, old_node) = delete_max(node.right.take());
    node.right = right;
    (Some(fixup(node)), old_node)
}

// In-order walk collecting every key in the subtree.
pub(crate) fn collect_keys<K, V>(node: Option<&Node<K, V>>, acc: &mut Vec<K>)
where
    K: Clone,
    V: Clone,
{
    if let Some(node) = node {
        collect_keys(node.left_deref(), acc);
        acc.push(node.key.clone());
        collect_keys(node.right_deref(), acc);
    }
}

fn color<K, V>(node: &Node<K, V>) -> &'static str
where
    K: Clone,
    V: Clone,
{
    if node.is_black() {
        "black"
    } else {
        "red"
    }
}

// Pre-order walk emitting one graphviz edge per parent->child link,
// labelled by branch side and colored by the child's color.
pub(crate) fn dot_edges<K, V>(node: &Node<K, V>, out: &mut String)
where
    K: Clone + Display,
    V: Clone,
{
    if let Some(left) = node.left_deref() {
        out.push_str(&format!(
            "{} -> {} [color = \"{}\", label = \"L\"]\n",
            node.key,
            left.key,
            color(left)
        ));
    }
    if let Some(right) = node.right_deref() {
        out.push_str(&format!(
            "{} -> {} [color = \"{}\", label = \"R\"]\n",
            node.key,
            right.key,
            color(right)
        ));
    }
    if let Some(left) = node.left_deref() {
        dot_edges(left, out);
    }
    if let Some(right) = node.right_deref() {
        dot_edges(right, out);
    }
}
