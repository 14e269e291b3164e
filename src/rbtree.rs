use std::{
    cmp::Ordering,
    fmt::{self, Debug},
    iter::FusedIterator,
    marker::PhantomData,
    ptr::NonNull,
};

use log::{debug, trace};
use smallvec::SmallVec;

use crate::{
    alloc::try_box,
    error::Error,
    set::{Color, OrderedSet},
    verify::{self, Report, TreeNode, Violation},
};

/// Classic red-black set.
///
/// Nodes keep a back-reference to their parent so that the post insert fixup
/// can walk up from the new leaf without recursion.
pub struct RbSet<K> {
    root: Link<K>,
    len: usize,
    rotations: usize,
    _owns: PhantomData<Box<Node<K>>>,
}

// The set exclusively owns every node reachable from `root`.
unsafe impl<K: Send> Send for RbSet<K> {}
unsafe impl<K: Sync> Sync for RbSet<K> {}

type Link<K> = Option<NonNull<Node<K>>>;
type Parent<K> = Option<NonNull<Node<K>>>;

pub(crate) struct Node<K> {
    parent: Parent<K>,
    key: K,
    color: Color,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    fn new_with_parent(key: K, parent: Parent<K>) -> Self {
        Self {
            parent,
            key,
            color: Color::Red,
            left: None,
            right: None,
        }
    }

    fn drop_children(mut self) {
        if let Some(left) = self.left.take() {
            let left = unsafe { Box::from_raw(left.as_ptr()) };
            left.drop_children()
        }
        if let Some(right) = self.right.take() {
            let right = unsafe { Box::from_raw(right.as_ptr()) };
            right.drop_children()
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
        self.left.map(|l| unsafe { &*l.as_ptr() })
    }

    fn right(&self) -> Option<&Self> {
        self.right.map(|r| unsafe { &*r.as_ptr() })
    }
}

fn compare<K: PartialOrd>(a: &K, b: &K) -> Result<Ordering, Error> {
    a.partial_cmp(b).ok_or(Error::Incomparable)
}

unsafe fn is_red<K>(link: Link<K>) -> bool {
    link.map(|n| (*n.as_ptr()).color == Color::Red).unwrap_or(false)
}

impl<K> RbSet<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            rotations: 0,
            _owns: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rotations performed by every insert so far.
    pub fn rotations(&self) -> usize {
        self.rotations
    }

    pub fn root_color(&self) -> Option<Color> {
        self.root.map(|r| unsafe { (*r.as_ptr()).color })
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root, self.len)
    }

    /// Points `parent`'s link to `old` (or the root, if there is no parent) at `new`.
    unsafe fn replace_child(
        &mut self,
        parent: Parent<K>,
        old: NonNull<Node<K>>,
        new: NonNull<Node<K>>,
    ) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let p = p.as_ptr();
                if (*p).left == Some(old) {
                    (*p).left = Some(new);
                } else {
                    (*p).right = Some(new);
                }
            }
        }
    }

    unsafe fn rotate_left(&mut self, node: NonNull<Node<K>>) {
        let n = node.as_ptr();
        let Some(new_parent) = (*n).right else {
            return;
        };
        let c = new_parent.as_ptr();
        (*n).right = (*c).left.take();
        if let Some(inner) = (*n).right {
            (*inner.as_ptr()).parent = Some(node);
        }
        (*c).parent = (*n).parent;
        self.replace_child((*n).parent, node, new_parent);
        (*c).left = Some(node);
        (*n).parent = Some(new_parent);
        self.rotations += 1;
        trace!("rotate left");
    }

    unsafe fn rotate_right(&mut self, node: NonNull<Node<K>>) {
        let n = node.as_ptr();
        let Some(new_parent) = (*n).left else {
            return;
        };
        let c = new_parent.as_ptr();
        (*n).left = (*c).right.take();
        if let Some(inner) = (*n).left {
            (*inner.as_ptr()).parent = Some(node);
        }
        (*c).parent = (*n).parent;
        self.replace_child((*n).parent, node, new_parent);
        (*c).right = Some(node);
        (*n).parent = Some(new_parent);
        self.rotations += 1;
        trace!("rotate right");
    }

    /// Restores the red-black rules after `node` was attached as a red leaf.
    ///
    /// The only rule a red leaf can break is "no red node has a red child",
    /// so we walk up while `node` and its parent are both red.
    unsafe fn fix(&mut self, mut node: NonNull<Node<K>>) {
        loop {
            let Some(mut parent) = (*node.as_ptr()).parent else {
                break;
            };
            if (*parent.as_ptr()).color != Color::Red {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(grand) = (*parent.as_ptr()).parent else {
                break;
            };
            let g = grand.as_ptr();
            let parent_is_left = (*g).left == Some(parent);
            let uncle = if parent_is_left { (*g).right } else { (*g).left };

            if is_red(uncle) {
                trace!("fixup: red uncle, recolor");
                (*g).color = Color::Red;
                (*parent.as_ptr()).color = Color::Black;
                if let Some(u) = uncle {
                    (*u.as_ptr()).color = Color::Black;
                }
                node = grand;
                continue;
            }

            let node_is_left = (*parent.as_ptr()).left == Some(node);
            if parent_is_left && !node_is_left {
                trace!("fixup: inner grandchild");
                self.rotate_left(parent);
                node = parent;
                parent = (*node.as_ptr()).parent.unwrap_or(parent);
            } else if !parent_is_left && node_is_left {
                trace!("fixup: inner grandchild");
                self.rotate_right(parent);
                node = parent;
                parent = (*node.as_ptr()).parent.unwrap_or(parent);
            }

            trace!("fixup: outer grandchild");
            if parent_is_left {
                self.rotate_right(grand);
            } else {
                self.rotate_left(grand);
            }
            let p = parent.as_ptr();
            std::mem::swap(&mut (*p).color, &mut (*g).color);
            break;
        }
    }
}

impl<K: PartialOrd> RbSet<K> {
    pub fn insert(&mut self, key: K) -> Result<bool, Error> {
        if key.partial_cmp(&key) != Some(Ordering::Equal) {
            debug!("rejecting key that cannot be ordered");
            return Err(Error::Incomparable);
        }

        let mut parent: Parent<K> = None;
        let mut ordering = Ordering::Equal;
        let mut cur = self.root;
        while let Some(n) = cur {
            let n = unsafe { &*n.as_ptr() };
            ordering = compare(&key, &n.key)?;
            match ordering {
                Ordering::Less => {
                    parent = cur;
                    cur = n.left;
                }
                Ordering::Greater => {
                    parent = cur;
                    cur = n.right;
                }
                Ordering::Equal => return Ok(false),
            }
        }

        let new_element = try_box(Node::new_with_parent(key, parent))?;
        let new_element = NonNull::from(Box::leak(new_element));
        unsafe {
            match parent {
                None => self.root = Some(new_element),
                Some(p) if ordering == Ordering::Less => (*p.as_ptr()).left = Some(new_element),
                Some(p) => (*p.as_ptr()).right = Some(new_element),
            }
            self.fix(new_element);
            if let Some(root) = self.root {
                (*root.as_ptr()).color = Color::Black;
            }
        }
        self.len += 1;
        debug!("inserted key, {} keys in set", self.len);
        Ok(true)
    }

    pub fn contains(&self, needle: &K) -> bool {
        let mut cur = self.root;
        while let Some(n) = cur {
            let n = unsafe { &*n.as_ptr() };
            cur = match needle.partial_cmp(&n.key) {
                Some(Ordering::Less) => n.left,
                Some(Ordering::Greater) => n.right,
                Some(Ordering::Equal) => return true,
                None => return false,
            };
        }
        false
    }

    /// Walks the whole tree and checks every red-black rule and every parent link.
    pub fn verify(&self) -> Result<Report, Violation> {
        if let Some(root) = self.root {
            if unsafe { (*root.as_ptr()).parent.is_some() } {
                return Err(Violation::BrokenParentLink);
            }
        }
        let root = self.root.map(|r| unsafe { &*r.as_ptr() });
        verify::check(root, self.len, |node: &Node<K>| {
            let me = NonNull::from(node);
            let owned_by_me = |child: Link<K>| {
                child
                    .map(|c| unsafe { (*c.as_ptr()).parent == Some(me) })
                    .unwrap_or(true)
            };
            if owned_by_me(node.left) && owned_by_me(node.right) {
                Ok(())
            } else {
                Err(Violation::BrokenParentLink)
            }
        })
    }
}

impl<K> Default for RbSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug> Debug for RbSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Drop for RbSet<K> {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            let root = unsafe { Box::from_raw(root.as_ptr()) };
            root.drop_children();
        }
    }
}

impl<K: PartialOrd> OrderedSet<K> for RbSet<K> {
    type Iter<'a> = Iter<'a, K> where K: 'a;

    fn insert(&mut self, key: K) -> Result<bool, Error> {
        RbSet::insert(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        RbSet::contains(self, key)
    }

    fn iter(&self) -> Iter<'_, K> {
        RbSet::iter(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K> IntoIterator for &'a RbSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// In-order iterator over the keys of an [`RbSet`].
pub struct Iter<'a, K> {
    // Nodes whose left subtree has been pushed but which are not yet yielded.
    stack: SmallVec<[NonNull<Node<K>>; 32]>,
    remaining: usize,
    _set: PhantomData<&'a Node<K>>,
}

// Only hands out shared references into the set it borrows.
unsafe impl<K: Sync> Send for Iter<'_, K> {}
unsafe impl<K: Sync> Sync for Iter<'_, K> {}

impl<'a, K> Iter<'a, K> {
    fn new(root: Link<K>, len: usize) -> Self {
        let mut iter = Self {
            stack: SmallVec::new(),
            remaining: len,
            _set: PhantomData,
        };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut link: Link<K>) {
        while let Some(n) = link {
            self.stack.push(n);
            link = unsafe { (*n.as_ptr()).left };
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let node = self.stack.pop()?;
        let node: &'a Node<K> = unsafe { &*node.as_ptr() };
        self.push_left(node.right);
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
            _set: PhantomData,
        }
    }
}
