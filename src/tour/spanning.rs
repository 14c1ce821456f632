//! Minimum spanning tree seed tour.

use crate::matrix::CostMatrix;

/// Tree edges `(child, parent)` of a minimum spanning tree rooted at 0,
/// in the order Prim's algorithm attaches them.
///
/// Dense O(N²) construction straight over the matrix. Ties go to the
/// lowest index.
pub(crate) fn spanning_tree(matrix: &CostMatrix) -> Vec<(usize, usize)> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }
    let mut in_tree = vec![false; n];
    let mut key: Vec<f64> = (0..n).map(|j| matrix[(j, 0)]).collect();
    let mut parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);
    in_tree[0] = true;

    for _ in 1..n {
        let mut next: Option<usize> = None;
        for j in 0..n {
            if !in_tree[j] && next.is_none_or(|k| key[j] < key[k]) {
                next = Some(j);
            }
        }
        let Some(joined) = next else {
            break;
        };
        in_tree[joined] = true;
        edges.push((joined, parent[joined]));

        for k in 0..n {
            if !in_tree[k] && matrix[(k, joined)] < key[k] {
                key[k] = matrix[(k, joined)];
                parent[k] = joined;
            }
        }
    }
    edges
}

/// Preorder walk of the tree from node 0 with an explicit stack.
///
/// Children are pushed in attachment order, so the most recently attached
/// child is visited first.
pub(crate) fn preorder(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut children = vec![Vec::new(); n];
    for &(child, parent) in edges {
        children[parent].push(child);
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![0usize];
    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        order.push(node);
        stack.extend_from_slice(&children[node]);
    }
    order
}

/// Initial visiting order for `matrix`.
pub(crate) fn seed_tour(matrix: &CostMatrix) -> Vec<usize> {
    preorder(matrix.len(), &spanning_tree(matrix))
}
