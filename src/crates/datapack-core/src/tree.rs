//! Binary dispatch tree over the scheduled ticks
//!
//! Each node covers an inclusive tick range and becomes one routing
//! function named `<start>_<end>`. A node holding exactly one scheduled
//! tick is a leaf that calls `note/<tick>` directly; any other node splits
//! at `mid = (start + end) / 2` and routes to the halves that still hold a
//! scheduled tick. Locating the function for the current play-head position
//! therefore costs one function call per tree level.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchNode {
    pub start: u32,
    pub end: u32,
    pub body: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    /// The single scheduled tick inside the range
    Leaf(u32),
    /// One or two children, lower half first
    Branch(Vec<DispatchNode>),
}

impl DispatchNode {
    fn build(ticks: &BTreeSet<u32>, start: u32, end: u32) -> Self {
        let mut covered = ticks.range(start..=end);
        let first = covered.next().copied();
        if let (Some(tick), None) = (first, covered.next()) {
            return DispatchNode {
                start,
                end,
                body: NodeBody::Leaf(tick),
            };
        }

        let mid = start + (end - start) / 2;
        let mut children = Vec::with_capacity(2);
        if ticks.range(start..=mid).next().is_some() {
            children.push(DispatchNode::build(ticks, start, mid));
        }
        if mid < end && ticks.range(mid + 1..=end).next().is_some() {
            children.push(DispatchNode::build(ticks, mid + 1, end));
        }

        DispatchNode {
            start,
            end,
            body: NodeBody::Branch(children),
        }
    }

    /// Function name under `tree/`
    pub fn name(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Body of the routing function for this node.
    pub fn render(&self, namespace: &str, score: &str) -> String {
        match &self.body {
            NodeBody::Leaf(tick) => format!(
                "execute as @s[scores={{{score}={tick}}}] run function {namespace}:note/{tick}\n"
            ),
            NodeBody::Branch(children) => {
                let mut body = String::new();
                for child in children {
                    body.push_str(&format!(
                        "execute as @s[scores={{{score}={}..{}}}] run function {namespace}:tree/{}\n",
                        child.start,
                        child.end,
                        child.name()
                    ));
                }
                body
            }
        }
    }

    fn depth(&self) -> usize {
        match &self.body {
            NodeBody::Leaf(_) => 1,
            NodeBody::Branch(children) => 1 + children.iter().map(DispatchNode::depth).max().unwrap_or(0),
        }
    }
}

/// Routing tree for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTree {
    root: DispatchNode,
}

impl DispatchTree {
    /// Build the tree over `ticks`, spanning `min..=max` of the set.
    ///
    /// Returns `None` for an empty set.
    pub fn build(ticks: &BTreeSet<u32>) -> Option<Self> {
        let start = *ticks.first()?;
        let end = *ticks.last()?;
        Some(DispatchTree {
            root: DispatchNode::build(ticks, start, end),
        })
    }

    pub fn root(&self) -> &DispatchNode {
        &self.root
    }

    /// Every node, parents before children
    pub fn nodes(&self) -> Vec<&DispatchNode> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let NodeBody::Branch(children) = &node.body {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Scheduled ticks reached by the leaves, in tick order
    pub fn leaves(&self) -> Vec<u32> {
        self.nodes()
            .into_iter()
            .filter_map(|node| match node.body {
                NodeBody::Leaf(tick) => Some(tick),
                NodeBody::Branch(_) => None,
            })
            .collect()
    }

    /// Number of routing functions on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
