//! Static quad-tree partition of a square grid.
//!
//! A tree of depth `d` splits an `n x n` grid into `4^d` equal square leaves of
//! side `n / 2^d`; each leaf owns a contiguous row-major copy of its block.
//! The split is fixed at construction, independent of the data.
//!
//! Nodes are stored in an arena in pre-order, children in the order
//! NW, NE, SW, SE (rows grow southward, columns eastward), so iterating the
//! arena visits leaves in Z-order.

use log::debug;

use crate::error::{AlgoError, Result};
use crate::matrix::Matrix;

/// Child position within its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// `(row, col)` offset of this quadrant in a parent of side `2 * half`.
    pub fn offset(self, half: usize) -> (usize, usize) {
        match self {
            Quadrant::NorthWest => (0, 0),
            Quadrant::NorthEast => (0, half),
            Quadrant::SouthWest => (half, 0),
            Quadrant::SouthEast => (half, half),
        }
    }

    fn containing(row: usize, col: usize, half: usize) -> Self {
        match (row >= half, col >= half) {
            (false, false) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }
}

#[derive(Clone, Debug)]
enum Content {
    Branch([usize; 4]),
    Leaf(Vec<f64>),
}

#[derive(Clone, Debug)]
struct Node {
    origin: (usize, usize),
    size: usize,
    content: Content,
}

/// A leaf block and where it sits in the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leaf<'a> {
    /// `(row, col)` of the block's top-left cell.
    pub origin: (usize, usize),
    pub size: usize,
    /// `size * size` values, row-major.
    pub values: &'a [f64],
}

#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<Node>,
    size: usize,
    depth: u32,
}

impl QuadTree {
    /// Partitions a zeroed `size x size` grid into `4^depth` leaves.
    pub fn new(size: usize, depth: u32) -> Result<Self> {
        let divisor = match 1usize.checked_shl(depth) {
            Some(divisor) if size != 0 && size % divisor == 0 => divisor,
            _ => return Err(AlgoError::UnevenPartition { size, depth }),
        };

        let mut nodes = Vec::new();
        build(&mut nodes, (0, 0), size, depth);
        debug!(
            "quad-tree: size={size} depth={depth} nodes={} leaf_side={}",
            nodes.len(),
            size / divisor
        );
        Ok(Self { nodes, size, depth })
    }

    /// Copies a square `grid` into a new tree of the given depth.
    pub fn distribute(grid: &Matrix<f64>, depth: u32) -> Result<Self> {
        let (rows, cols) = grid.shape();
        if rows != cols {
            return Err(AlgoError::NonSquareGrid { rows, cols });
        }
        let mut tree = Self::new(rows, depth)?;
        for node in &mut tree.nodes {
            if let Content::Leaf(values) = &mut node.content {
                let (r0, c0) = node.origin;
                for (r, dst) in values.chunks_exact_mut(node.size).enumerate() {
                    dst.copy_from_slice(&grid.row(r0 + r)[c0..c0 + node.size]);
                }
            }
        }
        Ok(tree)
    }

    /// Side length of the whole grid.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn leaf_count(&self) -> usize {
        1 << (2 * self.depth)
    }

    /// Leaves in Z-order.
    pub fn leaves(&self) -> impl Iterator<Item = Leaf<'_>> + '_ {
        self.nodes.iter().filter_map(|node| match &node.content {
            Content::Leaf(values) => Some(Leaf {
                origin: node.origin,
                size: node.size,
                values,
            }),
            Content::Branch(_) => None,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let (idx, offset) = self.locate(row, col)?;
        match &self.nodes[idx].content {
            Content::Leaf(values) => values.get(offset).copied(),
            Content::Branch(_) => None,
        }
    }

    /// Stores `value` at `(row, col)` and returns the previous value, or `None`
    /// if the cell is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Option<f64> {
        let (idx, offset) = self.locate(row, col)?;
        match &mut self.nodes[idx].content {
            Content::Leaf(values) => values
                .get_mut(offset)
                .map(|slot| std::mem::replace(slot, value)),
            Content::Branch(_) => None,
        }
    }

    /// Copies every leaf back into one grid.
    pub fn reassemble(&self) -> Matrix<f64> {
        let mut grid = Matrix::zeros(self.size, self.size);
        for leaf in self.leaves() {
            let (r0, c0) = leaf.origin;
            for (r, src) in leaf.values.chunks_exact(leaf.size).enumerate() {
                grid.row_mut(r0 + r)[c0..c0 + leaf.size].copy_from_slice(src);
            }
        }
        grid
    }

    /// Walks from the root to the leaf holding `(row, col)`; returns the leaf's
    /// arena index and the cell's offset within it.
    fn locate(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            let (r, c) = (row - node.origin.0, col - node.origin.1);
            match &node.content {
                Content::Leaf(_) => return Some((idx, r * node.size + c)),
                Content::Branch(children) => {
                    let quadrant = Quadrant::containing(r, c, node.size / 2);
                    idx = children[quadrant as usize];
                }
            }
        }
    }
}

/// Appends the subtree rooted at `origin` in pre-order; returns its index.
fn build(nodes: &mut Vec<Node>, origin: (usize, usize), size: usize, depth: u32) -> usize {
    let idx = nodes.len();
    if depth == 0 {
        nodes.push(Node {
            origin,
            size,
            content: Content::Leaf(vec![0.0; size * size]),
        });
        return idx;
    }

    nodes.push(Node {
        origin,
        size,
        content: Content::Branch([0; 4]),
    });
    let half = size / 2;
    let mut children = [0; 4];
    for (slot, quadrant) in children.iter_mut().zip(Quadrant::ALL) {
        let (dr, dc) = quadrant.offset(half);
        *slot = build(nodes, (origin.0 + dr, origin.1 + dc), half, depth - 1);
    }
    nodes[idx].content = Content::Branch(children);
    idx
}
