//! Comment thread assembly [MB-CMT]
//!
//! Comments are stored flat with an optional parent pointer and the schema
//! puts no limit on reply depth. A post's thread is rebuilt in memory:
//! roots are comments without a parent, and every reply hangs under its
//! parent in creation order.
//!
//! The rendered tree is at most [`MAX_THREAD_DEPTH`] levels deep. A reply
//! to a comment already at that depth is listed beside its parent, under
//! the deepest rendered ancestor. Assembly is iterative, so a long reply
//! chain costs heap, not stack.

use crate::db::Comment;
use serde::Serialize;
use std::collections::HashMap;

/// Deepest nesting level of a rendered thread (roots are level 0)
pub const MAX_THREAD_DEPTH: usize = 10;

/// A comment together with its replies
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Where a comment lands in the rendered tree
#[derive(Debug, Clone, Copy)]
struct Placement {
    depth: usize,
    /// Index of the node this comment is rendered under
    parent: Option<usize>,
}

/// Build the reply tree for one post
///
/// `comments` must be ordered by creation (oldest first); sibling order
/// follows that order. A reply whose parent is not in the list (which the
/// foreign keys prevent) is promoted to a root instead of being lost.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let index_of: HashMap<i64, usize> = comments.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    let placements = place_all(&comments, &index_of);

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); MAX_THREAD_DEPTH + 1];
    for (i, placement) in placements.iter().enumerate() {
        buckets[placement.depth].push(i);
    }

    let mut slots: Vec<Option<CommentNode>> = comments
        .into_iter()
        .map(|comment| {
            Some(CommentNode {
                comment,
                replies: Vec::new(),
            })
        })
        .collect();

    // Deepest level first: a node is complete before it moves into its parent
    for depth in (1..=MAX_THREAD_DEPTH).rev() {
        for &i in &buckets[depth] {
            let Some(parent) = placements[i].parent else {
                continue;
            };
            if let Some(node) = slots[i].take() {
                if let Some(parent_node) = slots[parent].as_mut() {
                    parent_node.replies.push(node);
                }
            }
        }
    }

    buckets[0].iter().filter_map(|&i| slots[i].take()).collect()
}

/// Resolve every comment's rendered depth and parent without recursion
fn place_all(comments: &[Comment], index_of: &HashMap<i64, usize>) -> Vec<Placement> {
    let mut placed: Vec<Option<Placement>> = vec![None; comments.len()];
    let mut on_path = vec![false; comments.len()];

    for start in 0..comments.len() {
        // Walk up until a placed ancestor or a root, then place on the way back
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if placed[i].is_some() || on_path[i] {
                break;
            }
            on_path[i] = true;
            path.push(i);
            current = comments[i].parent_id.and_then(|p| index_of.get(&p).copied());
        }

        while let Some(i) = path.pop() {
            on_path[i] = false;
            let parent = comments[i].parent_id.and_then(|p| index_of.get(&p).copied());
            placed[i] = Some(match parent.and_then(|p| placed[p].map(|pl| (p, pl))) {
                None => Placement { depth: 0, parent: None },
                Some((p, pl)) if pl.depth < MAX_THREAD_DEPTH => Placement {
                    depth: pl.depth + 1,
                    parent: Some(p),
                },
                // Parent sits at the floor: share its parent
                Some((_, pl)) => pl,
            });
        }
    }

    placed
        .into_iter()
        .map(|p| p.unwrap_or(Placement { depth: 0, parent: None }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: i64, parent_id: Option<i64>) -> Comment {
        Comment {
            id,
            post_id: 1,
            parent_id,
            user_id: None,
            nick_name: None,
            comment: format!("comment {}", id),
            created_at: Utc::now(),
        }
    }

    /// (total comments, deepest level) without recursing
    fn measure(tree: &[CommentNode]) -> (usize, usize) {
        let mut stack: Vec<(&CommentNode, usize)> = tree.iter().map(|n| (n, 0)).collect();
        let (mut total, mut deepest) = (0, 0);
        while let Some((node, depth)) = stack.pop() {
            total += 1;
            deepest = deepest.max(depth);
            stack.extend(node.replies.iter().map(|r| (r, depth + 1)));
        }
        (total, deepest)
    }

    fn chain(len: i64) -> Vec<Comment> {
        (1..=len)
            .map(|id| comment(id, if id == 1 { None } else { Some(id - 1) }))
            .collect()
    }

    #[test]
    fn test_roots_and_replies() {
        let tree = build_comment_tree(vec![
            comment(1, None),
            comment(2, None),
            comment(3, Some(1)),
            comment(4, Some(1)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, 1);
        let reply_ids: Vec<i64> = tree[0].replies.iter().map(|r| r.comment.id).collect();
        assert_eq!(reply_ids, vec![3, 4]);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn test_nested_replies() {
        let tree = build_comment_tree(chain(4));

        assert_eq!(tree.len(), 1);
        assert_eq!(measure(&tree), (4, 3));
        assert_eq!(tree[0].replies[0].replies[0].replies[0].comment.id, 4);
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let tree = build_comment_tree(vec![comment(5, Some(99)), comment(6, None)]);
        let ids: Vec<i64> = tree.iter().map(|n| n.comment.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[test]
    fn test_empty() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_replies_below_max_depth_flatten_in_order() {
        let len = MAX_THREAD_DEPTH as i64 + 4;
        let tree = build_comment_tree(chain(len));

        let mut node = &tree[0];
        for _ in 0..MAX_THREAD_DEPTH - 1 {
            node = &node.replies[0];
        }
        // Everything from the floor down is listed under one ancestor
        let ids: Vec<i64> = node.replies.iter().map(|r| r.comment.id).collect();
        let expected: Vec<i64> = (MAX_THREAD_DEPTH as i64 + 1..=len).collect();
        assert_eq!(ids, expected);
        assert!(node.replies.iter().all(|r| r.replies.is_empty()));
    }

    #[test]
    fn test_long_reply_chain_stays_bounded() {
        let tree = build_comment_tree(chain(20_000));

        assert_eq!(tree.len(), 1);
        assert_eq!(measure(&tree), (20_000, MAX_THREAD_DEPTH));

        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("\"comment\":\"comment 20000\""));
    }

    #[test]
    fn test_reply_listed_before_parent_still_nests() {
        let tree = build_comment_tree(vec![comment(3, Some(2)), comment(2, Some(1)), comment(1, None)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, 3);
    }

    #[test]
    fn test_parent_cycle_does_not_hang() {
        let tree = build_comment_tree(vec![comment(1, Some(2)), comment(2, Some(1))]);
        assert_eq!(measure(&tree).0, 2);
    }
}
