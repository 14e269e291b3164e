//! Left-leaning red-black set.
//!
//! Nodes own their children and carry no parent link; the recursive insert
//! rebalances every ancestor of the new node as the recursion unwinds.

use std::{
    cmp::Ordering,
    fmt::{self, Debug},
    iter::FusedIterator,
};

use log::{debug, trace};
use smallvec::SmallVec;

use crate::{
    alloc::try_box,
    error::Error,
    set::{Color, OrderedSet},
    verify::{self, Report, TreeNode, Violation},
};

type Link<K> = Option<Box<Node<K>>>;

pub(crate) struct Node<K> {
    key: K,
    color: Color,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Self {
            key,
            color: Color::Red,
            left: None,
            right: None,
        }
    }

    fn flip(&mut self) {
        self.color = self.color.toggled();
        if let Some(l) = self.left.as_mut() {
            l.color = l.color.toggled();
        }
        if let Some(r) = self.right.as_mut() {
            r.color = r.color.toggled();
        }
    }
}

impl<K: PartialOrd> TreeNode for Node<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }

    fn color(&self) -> Color {
        self.color
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

fn is_red<K>(link: &Link<K>) -> bool {
    link.as_ref().map(|n| n.color == Color::Red).unwrap_or(false)
}

//      node              x
//      /  \             / \
//     a   (x)  =>   (node) c
//         / \        / \
//        b   c      a   b
fn rotate_left<K>(mut node: Box<Node<K>>, rotations: &mut usize) -> Box<Node<K>> {
    let Some(mut x) = node.right.take() else {
        return node;
    };
    node.right = x.left.take();
    x.color = node.color;
    node.color = Color::Red;
    x.left = Some(node);
    *rotations += 1;
    trace!("rotate left");
    x
}

//        node          x
//        /  \         / \
//      (x)   c  =>   a  (node)
//      / \              / \
//     a   b            b   c
fn rotate_right<K>(mut node: Box<Node<K>>, rotations: &mut usize) -> Box<Node<K>> {
    let Some(mut x) = node.left.take() else {
        return node;
    };
    node.left = x.right.take();
    x.color = node.color;
    node.color = Color::Red;
    x.right = Some(node);
    *rotations += 1;
    trace!("rotate right");
    x
}

fn balance<K>(mut node: Box<Node<K>>, rotations: &mut usize) -> Box<Node<K>> {
    if is_red(&node.right) && !is_red(&node.left) {
        node = rotate_left(node, rotations);
    }
    if is_red(&node.left) && node.left.as_ref().map(|l| is_red(&l.left)).unwrap_or(false) {
        node = rotate_right(node, rotations);
    }
    if is_red(&node.left) && is_red(&node.right) {
        trace!("color flip");
        node.flip();
    }
    node
}

fn insert<K: PartialOrd>(
    link: &mut Link<K>,
    key: K,
    rotations: &mut usize,
) -> Result<bool, Error> {
    let Some(node) = link.as_mut() else {
        *link = Some(try_box(Node::new(key))?);
        return Ok(true);
    };
    let added = match key.partial_cmp(&node.key).ok_or(Error::Incomparable)? {
        Ordering::Less => insert(&mut node.left, key, rotations)?,
        Ordering::Greater => insert(&mut node.right, key, rotations)?,
        Ordering::Equal => return Ok(false),
    };
    // Nothing below changed, so nothing here can be out of balance.
    if added {
        if let Some(node) = link.take() {
            *link = Some(balance(node, rotations));
        }
    }
    Ok(added)
}

pub struct LlrbSet<K> {
    root: Link<K>,
    len: usize,
    rotations: usize,
}

impl<K> LlrbSet<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            rotations: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn rotations(&self) -> usize {
        self.rotations
    }

    pub fn root_color(&self) -> Option<Color> {
        self.root.as_ref().map(|r| r.color)
    }

    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            stack: SmallVec::new(),
            remaining: self.len,
        };
        iter.push_left(self.root.as_deref());
        iter
    }
}

impl<K: PartialOrd> LlrbSet<K> {
    pub fn insert(&mut self, key: K) -> Result<bool, Error> {
        if key.partial_cmp(&key) != Some(Ordering::Equal) {
            debug!("rejecting key that cannot be ordered");
            return Err(Error::Incomparable);
        }
        let added = insert(&mut self.root, key, &mut self.rotations)?;
        if let Some(root) = self.root.as_mut() {
            root.color = Color::Black;
        }
        if added {
            self.len += 1;
            debug!("inserted key, {} keys in set", self.len);
        }
        Ok(added)
    }

    pub fn contains(&self, needle: &K) -> bool {
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            cur = match needle.partial_cmp(&n.key) {
                Some(Ordering::Less) => n.left.as_deref(),
                Some(Ordering::Greater) => n.right.as_deref(),
                Some(Ordering::Equal) => return true,
                None => return false,
            };
        }
        false
    }

    /// Checks the red-black rules and that no red link leans right.
    pub fn verify(&self) -> Result<Report, Violation> {
        verify::check(self.root.as_deref(), self.len, |node: &Node<K>| {
            if is_red(&node.right) {
                Err(Violation::RightLeaningRed)
            } else {
                Ok(())
            }
        })
    }
}

impl<K> Default for LlrbSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug> Debug for LlrbSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialOrd> OrderedSet<K> for LlrbSet<K> {
    type Iter<'a> = Iter<'a, K> where K: 'a;

    fn insert(&mut self, key: K) -> Result<bool, Error> {
        LlrbSet::insert(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LlrbSet::contains(self, key)
    }

    fn iter(&self) -> Iter<'_, K> {
        LlrbSet::iter(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K> IntoIterator for &'a LlrbSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// In-order iterator over the keys of an [`LlrbSet`].
pub struct Iter<'a, K> {
    stack: SmallVec<[&'a Node<K>; 32]>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn push_left(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
