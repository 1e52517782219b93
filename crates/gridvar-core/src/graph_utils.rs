//! Connected-component analysis over plain adjacency lists.

use std::cmp::Reverse;
use std::collections::VecDeque;

/// Outcome of [`compute_connected_components`]: per-vertex component number
/// and per-component size, with component 0 the largest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponentsResult {
    /// Component number for each vertex of the adjacency list. Slots with no
    /// neighbors form singleton components.
    pub component_number: Vec<usize>,
    /// Vertex count of each component, indexed by component number.
    pub component_size: Vec<usize>,
}

impl ConnectedComponentsResult {
    pub fn component_count(&self) -> usize {
        self.component_size.len()
    }
}

/// Labels every vertex of `adjacency` with a connected-component number.
///
/// Components are renumbered by decreasing size, so component 0 is always
/// the largest (the main component, in grid terms). Ties keep the order of
/// first discovery. BFS, O(V+E).
pub fn compute_connected_components(adjacency: &[Vec<usize>]) -> ConnectedComponentsResult {
    let vertex_count = adjacency.len();
    let mut component_number: Vec<Option<usize>> = vec![None; vertex_count];
    let mut component_size: Vec<usize> = Vec::new();

    let mut queue = VecDeque::new();
    for start in 0..vertex_count {
        if component_number[start].is_some() {
            continue;
        }
        let component = component_size.len();
        let mut size = 0;
        component_number[start] = Some(component);
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            size += 1;
            for &n in &adjacency[v] {
                if component_number[n].is_none() {
                    component_number[n] = Some(component);
                    queue.push_back(n);
                }
            }
        }
        component_size.push(size);
    }

    let component_number: Vec<usize> = component_number.into_iter().flatten().collect();
    renumber_by_size(component_number, component_size)
}

fn renumber_by_size(
    component_number: Vec<usize>,
    component_size: Vec<usize>,
) -> ConnectedComponentsResult {
    let mut order: Vec<usize> = (0..component_size.len()).collect();
    order.sort_by_key(|&c| Reverse(component_size[c]));

    // old component number -> new component number
    let mut remap = vec![0; component_size.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new;
    }

    ConnectedComponentsResult {
        component_number: component_number.into_iter().map(|c| remap[c]).collect(),
        component_size: order.iter().map(|&c| component_size[c]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_component() {
        let adjacency = vec![vec![1], vec![0, 2], vec![1]];
        let result = compute_connected_components(&adjacency);
        assert_eq!(result.component_count(), 1);
        assert_eq!(result.component_size, vec![3]);
        assert_eq!(result.component_number, vec![0, 0, 0]);
    }

    #[test]
    fn largest_component_is_numbered_zero() {
        // {0} alone, {1, 2, 3} together: the triple must become component 0
        // even though vertex 0 is discovered first.
        let adjacency = vec![vec![], vec![2], vec![1, 3], vec![2]];
        let result = compute_connected_components(&adjacency);
        assert_eq!(result.component_count(), 2);
        assert_eq!(result.component_size, vec![3, 1]);
        assert_eq!(result.component_number, vec![1, 0, 0, 0]);
    }

    #[test]
    fn equal_sizes_keep_discovery_order() {
        let adjacency = vec![vec![1], vec![0], vec![3], vec![2]];
        let result = compute_connected_components(&adjacency);
        assert_eq!(result.component_size, vec![2, 2]);
        assert_eq!(result.component_number, vec![0, 0, 1, 1]);
    }

    #[test]
    fn empty_graph() {
        let result = compute_connected_components(&[]);
        assert_eq!(result.component_count(), 0);
        assert!(result.component_number.is_empty());
    }
}
