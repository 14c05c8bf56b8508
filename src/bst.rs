//! Unbalanced binary search tree stored in an arena.
//!
//! Nodes live in a `Vec` of slots and refer to their children by index. Removed
//! nodes leave a vacant slot whose index goes on a free list, and later inserts
//! fill those slots before growing the vector. Every operation walks the tree
//! iteratively, so a degenerate (list-shaped) tree cannot overflow the stack.
//!
//! Keys are unique: inserting an existing key replaces its value.
//!
//! Removing a node with two children moves its in-order successor's entry into
//! it and unlinks the successor instead, which has at most one child.

use std::cmp::Ordering;
use std::mem;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<usize>,
    right: Option<usize>,
}

/// Where a node hangs: the root pointer or a side of its parent.
#[derive(Clone, Copy, Debug)]
enum Link {
    Root,
    Left(usize),
    Right(usize),
}

#[derive(Clone, Debug)]
pub struct BinarySearchTree<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl<K, V> Default for BinarySearchTree<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key`, returning the previous value if it was present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut link = Link::Root;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.node_mut(idx);
            match key.cmp(&node.key) {
                Ordering::Less => {
                    link = Link::Left(idx);
                    cur = node.left;
                }
                Ordering::Greater => {
                    link = Link::Right(idx);
                    cur = node.right;
                }
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            }
        }

        let idx = self.alloc(Node {
            key,
            value,
            left: None,
            right: None,
        });
        self.set_link(link, Some(idx));
        self.len += 1;
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(idx, _)| &self.node(idx).value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (idx, _) = self.find(key)?;
        Some(&mut self.node_mut(idx).value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Removes `key` and returns its value. Missing keys leave the tree as is.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (mut target, mut link) = self.find(key)?;

        let node = self.node(target);
        if let (Some(_), Some(right)) = (node.left, node.right) {
            let mut succ_link = Link::Right(target);
            let mut succ = right;
            while let Some(left) = self.node(succ).left {
                succ_link = Link::Left(succ);
                succ = left;
            }
            self.swap_entries(target, succ);
            target = succ;
            link = succ_link;
        }

        let node = self.node(target);
        let child = node.left.or(node.right);
        self.set_link(link, child);
        self.free.push(target);
        self.len -= 1;
        self.slots[target].take().map(|node| node.value)
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        let mut idx = self.root?;
        while let Some(left) = self.node(idx).left {
            idx = left;
        }
        let node = self.node(idx);
        Some((&node.key, &node.value))
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        let mut idx = self.root?;
        while let Some(right) = self.node(idx).right {
            idx = right;
        }
        let node = self.node(idx);
        Some((&node.key, &node.value))
    }

    /// Nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, depth)) = stack.pop() {
            best = best.max(depth);
            let node = self.node(idx);
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        best
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// In-order iterator over `(key, value)`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            stack: Vec::new(),
            next: self.root,
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    fn find(&self, key: &K) -> Option<(usize, Link)> {
        let mut link = Link::Root;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.node(idx);
            match key.cmp(&node.key) {
                Ordering::Less => {
                    link = Link::Left(idx);
                    cur = node.left;
                }
                Ordering::Greater => {
                    link = Link::Right(idx);
                    cur = node.right;
                }
                Ordering::Equal => return Some((idx, link)),
            }
        }
        None
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn set_link(&mut self, link: Link, child: Option<usize>) {
        match link {
            Link::Root => self.root = child,
            Link::Left(parent) => self.node_mut(parent).left = child,
            Link::Right(parent) => self.node_mut(parent).right = child,
        }
    }

    /// Swaps key and value of two distinct nodes, leaving their links alone.
    fn swap_entries(&mut self, a: usize, b: usize) {
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.slots.split_at_mut(hi);
        if let (Some(x), Some(y)) = (head[lo].as_mut(), tail[0].as_mut()) {
            mem::swap(&mut x.key, &mut y.key);
            mem::swap(&mut x.value, &mut y.value);
        }
    }
}

impl<K, V> BinarySearchTree<K, V> {
    fn node(&self, idx: usize) -> &Node<K, V> {
        match &self.slots[idx] {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match &mut self.slots[idx] {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }
}

pub struct Iter<'a, K, V> {
    tree: &'a BinarySearchTree<K, V>,
    stack: Vec<usize>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.next {
            self.stack.push(idx);
            self.next = self.tree.node(idx).left;
        }
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx);
        self.next = node.right;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K: Ord, V> IntoIterator for &'a BinarySearchTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BinarySearchTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for BinarySearchTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
