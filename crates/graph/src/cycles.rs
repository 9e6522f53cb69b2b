//! Runtime cycle detection over an adjacency list.

use std::collections::{BTreeSet, HashMap, HashSet};

/// Find every distinct cycle reachable in `adjacency`.
///
/// Each cycle lists the path and repeats its first id at the end
/// (`["a", "b", "a"]`; a self-loop is `["a", "a"]`). Cycles over the same
/// id set are reported once, keeping the first one found.
pub fn find_cycles(adjacency: &[(&str, Vec<&str>)]) -> Vec<Vec<String>> {
    let neighbors: HashMap<&str, &[&str]> = adjacency
        .iter()
        .map(|(id, targets)| (*id, targets.as_slice()))
        .collect();

    let mut search = CycleSearch {
        neighbors,
        visited: HashSet::new(),
        on_stack: HashSet::new(),
        stack: Vec::new(),
        seen: HashSet::new(),
        cycles: Vec::new(),
    };

    for (id, _) in adjacency {
        if !search.visited.contains(id) {
            search.visit(id);
        }
    }

    search.cycles
}

/// True when `id` is a member of any detected cycle
pub fn is_in_cycle(adjacency: &[(&str, Vec<&str>)], id: &str) -> bool {
    find_cycles(adjacency)
        .iter()
        .any(|cycle| cycle.iter().any(|member| member == id))
}

struct CycleSearch<'a> {
    neighbors: HashMap<&'a str, &'a [&'a str]>,
    visited: HashSet<&'a str>,
    on_stack: HashSet<&'a str>,
    stack: Vec<&'a str>,
    seen: HashSet<BTreeSet<&'a str>>,
    cycles: Vec<Vec<String>>,
}

impl<'a> CycleSearch<'a> {
    /// Depth-first from `root` with an explicit frame stack, so long chains
    /// do not grow the call stack
    fn visit(&mut self, root: &'a str) {
        let mut frames: Vec<(&'a str, usize)> = Vec::new();
        self.enter(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (id, next) = *frame;
            let targets = self.neighbors.get(id).copied().unwrap_or_default();
            let Some(&target) = targets.get(next) else {
                frames.pop();
                self.stack.pop();
                self.on_stack.remove(id);
                continue;
            };
            frame.1 += 1;

            if self.on_stack.contains(target) {
                self.record(target);
            } else if !self.visited.contains(target) {
                self.enter(target);
                frames.push((target, 0));
            }
        }
    }

    fn enter(&mut self, id: &'a str) {
        self.visited.insert(id);
        self.on_stack.insert(id);
        self.stack.push(id);
    }

    fn record(&mut self, start: &'a str) {
        let Some(pos) = self.stack.iter().position(|&member| member == start) else {
            return;
        };
        let path = &self.stack[pos..];
        let key: BTreeSet<&str> = path.iter().copied().collect();
        if !self.seen.insert(key) {
            return;
        }

        let mut cycle: Vec<String> = path.iter().map(|id| (*id).to_string()).collect();
        cycle.push(start.to_string());
        log::debug!("cycle detected: {}", cycle.join(" -> "));
        self.cycles.push(cycle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mutual_dependency() {
        let adjacency = vec![("a", vec!["b"]), ("b", vec!["a"])];
        assert_eq!(find_cycles(&adjacency), vec![vec!["a", "b", "a"]]);
        assert!(is_in_cycle(&adjacency, "b"));
    }

    #[test]
    fn test_chain_is_acyclic() {
        let adjacency = vec![("a", vec!["b"]), ("b", vec!["c"]), ("c", vec![])];
        assert!(find_cycles(&adjacency).is_empty());
        assert!(!is_in_cycle(&adjacency, "a"));
    }

    #[test]
    fn test_self_loop() {
        let adjacency = vec![("a", vec!["a"])];
        assert_eq!(find_cycles(&adjacency), vec![vec!["a", "a"]]);
    }

    #[test]
    fn test_same_id_set_reported_once() {
        // a -> b -> c -> a and a -> c -> b -> a share one id set
        let adjacency = vec![
            ("a", vec!["b", "c"]),
            ("b", vec!["c", "a"]),
            ("c", vec!["a", "b"]),
        ];
        let cycles = find_cycles(&adjacency);
        let three: Vec<_> = cycles.iter().filter(|c| c.len() == 4).collect();
        assert_eq!(three.len(), 1);
    }

    #[test]
    fn test_targets_outside_adjacency_are_leaves() {
        let adjacency = vec![("a", vec!["external"])];
        assert!(find_cycles(&adjacency).is_empty());
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let names: Vec<String> = (0..100_000).map(|i| format!("n{i}")).collect();
        let mut adjacency: Vec<(&str, Vec<&str>)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), vec![pair[1].as_str()]))
            .collect();
        adjacency.push((names[names.len() - 1].as_str(), vec!["n99998"]));

        let cycles = find_cycles(&adjacency);
        assert_eq!(cycles, vec![vec!["n99998", "n99999", "n99998"]]);
    }
}
