//! Structural checks for the red-black sets.
//!
//! Both sets expose a `verify` method that walks the whole tree once and
//! reports the first broken rule it finds. It is meant for tests and debug
//! assertions, it is `O(n)`.

use std::fmt;

use crate::set::Color;

/// Shape of a tree that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub len: usize,
    /// Nodes on the longest root to leaf path, `0` for an empty tree.
    pub height: usize,
    /// Black nodes on every root to leaf path, the root included.
    pub black_height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    RedRoot,
    RedRedEdge,
    BlackHeightMismatch,
    OutOfOrder,
    LenMismatch { recorded: usize, counted: usize },
    BrokenParentLink,
    RightLeaningRed,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RedRoot => f.write_str("root is red"),
            Violation::RedRedEdge => f.write_str("red node has a red child"),
            Violation::BlackHeightMismatch => {
                f.write_str("paths to the leaves differ in black height")
            }
            Violation::OutOfOrder => f.write_str("keys are not in search order"),
            Violation::LenMismatch { recorded, counted } => {
                write!(f, "set records {recorded} keys but holds {counted}")
            }
            Violation::BrokenParentLink => f.write_str("parent link does not match owner"),
            Violation::RightLeaningRed => f.write_str("red link leans right"),
        }
    }
}

impl std::error::Error for Violation {}

/// Read-only view of a tree node used by the checker.
pub(crate) trait TreeNode {
    type Key: PartialOrd;

    fn key(&self) -> &Self::Key;
    fn color(&self) -> Color;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;

    fn is_red(&self) -> bool {
        self.color() == Color::Red
    }
}

pub(crate) fn is_red<N: TreeNode>(node: Option<&N>) -> bool {
    node.map(N::is_red).unwrap_or(false)
}

/// Checks the red-black rules plus whatever per node rule `extra` adds.
pub(crate) fn check<N, F>(root: Option<&N>, len: usize, extra: F) -> Result<Report, Violation>
where
    N: TreeNode,
    F: Fn(&N) -> Result<(), Violation>,
{
    if is_red(root) {
        return Err(Violation::RedRoot);
    }
    let shape = walk(root, None, None, &extra)?;
    if shape.len != len {
        return Err(Violation::LenMismatch {
            recorded: len,
            counted: shape.len,
        });
    }
    Ok(shape)
}

fn walk<N, F>(
    node: Option<&N>,
    lower: Option<&N::Key>,
    upper: Option<&N::Key>,
    extra: &F,
) -> Result<Report, Violation>
where
    N: TreeNode,
    F: Fn(&N) -> Result<(), Violation>,
{
    let Some(node) = node else {
        return Ok(Report {
            len: 0,
            height: 0,
            black_height: 0,
        });
    };
    let key = node.key();
    let above_lower = lower.map(|l| l < key).unwrap_or(true);
    let below_upper = upper.map(|u| key < u).unwrap_or(true);
    if !(above_lower && below_upper) {
        return Err(Violation::OutOfOrder);
    }
    if node.is_red() && (is_red(node.left()) || is_red(node.right())) {
        return Err(Violation::RedRedEdge);
    }
    extra(node)?;

    let left = walk(node.left(), lower, Some(key), extra)?;
    let right = walk(node.right(), Some(key), upper, extra)?;
    if left.black_height != right.black_height {
        return Err(Violation::BlackHeightMismatch);
    }
    Ok(Report {
        len: left.len + right.len + 1,
        height: left.height.max(right.height) + 1,
        black_height: left.black_height + usize::from(!node.is_red()),
    })
}
