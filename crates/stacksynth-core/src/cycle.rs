//! Cycle detection over index adjacency lists
//!
//! Shared by the resolver (eager check) and the orderer (deferred check).
//! The walk keeps its own stack, so depth is bounded by memory rather than by
//! the thread's call stack.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Post-order over `adjacency`, visiting start nodes in index order
///
/// With edges running consumer -> producer, the returned order lists every
/// producer before its consumers. On a cycle, returns the nodes along it with
/// the first node repeated at the end, e.g. `[0, 1, 0]`; a self-loop is
/// `[n, n]`.
pub(crate) fn post_order(adjacency: &[Vec<usize>]) -> Result<Vec<usize>, Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; adjacency.len()];
    let mut order = Vec::with_capacity(adjacency.len());
    // (node, index of the next child to visit); the nodes form the current path
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..adjacency.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::OnPath;
        stack.push((start, 0));

        while let Some(&(node, child)) = stack.last() {
            let Some(&next) = adjacency[node].get(child) else {
                stack.pop();
                marks[node] = Mark::Done;
                order.push(node);
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks[next] {
                Mark::OnPath => {
                    let from = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                    let mut cycle: Vec<usize> = stack[from..].iter().map(|&(n, _)| n).collect();
                    cycle.push(next);
                    return Err(cycle);
                }
                Mark::Unvisited => {
                    marks[next] = Mark::OnPath;
                    stack.push((next, 0));
                }
                Mark::Done => {}
            }
        }
    }

    Ok(order)
}

/// Find a cycle in `adjacency`, in the form described on [`post_order`]
pub(crate) fn find_cycle(adjacency: &[Vec<usize>]) -> Option<Vec<usize>> {
    post_order(adjacency).err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acyclic_chain_has_no_cycle() {
        let adjacency = vec![vec![1], vec![2], vec![]];
        assert_eq!(find_cycle(&adjacency), None);
    }

    #[test]
    fn self_loop_reported() {
        let adjacency = vec![vec![], vec![1]];
        assert_eq!(find_cycle(&adjacency), Some(vec![1, 1]));
    }

    #[test]
    fn mutual_reference_reported_from_first_node() {
        let adjacency = vec![vec![1], vec![0]];
        assert_eq!(find_cycle(&adjacency), Some(vec![0, 1, 0]));
    }

    #[test]
    fn cycle_path_excludes_lead_in() {
        // 0 -> 1 -> 2 -> 3 -> 1
        let adjacency = vec![vec![1], vec![2], vec![3], vec![1]];
        assert_eq!(find_cycle(&adjacency), Some(vec![1, 2, 3, 1]));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let adjacency = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert_eq!(find_cycle(&adjacency), None);
    }

    #[test]
    fn post_order_puts_producers_first() {
        // 0 needs 1 and 2, 1 needs 2
        let adjacency = vec![vec![1, 2], vec![2], vec![]];
        assert_eq!(post_order(&adjacency), Ok(vec![2, 1, 0]));
    }

    #[test]
    fn deep_chain_does_not_exhaust_the_stack() {
        let depth = 200_000;
        let adjacency: Vec<Vec<usize>> = (0..depth)
            .map(|i| if i + 1 < depth { vec![i + 1] } else { Vec::new() })
            .collect();

        let order = post_order(&adjacency).unwrap();
        assert_eq!(order.first(), Some(&(depth - 1)));
        assert_eq!(order.last(), Some(&0));

        let mut looped = adjacency;
        looped[depth - 1].push(0);
        assert_eq!(find_cycle(&looped).map(|c| c.len()), Some(depth + 1));
    }
}
