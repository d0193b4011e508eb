use swarmtrail_data::Position;

/// Weighted union-find with path compression and union by size.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression: point every node on the walk at the root.
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

/// Connected components of a point set.
///
/// Labels are dense (`0..component_count()`) and assigned in order of first
/// appearance by point index, so point 0 is always in component 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Components {
    pub labels: Vec<usize>,
    pub sizes: Vec<usize>,
}

impl Components {
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.sizes.len()
    }

    /// The largest component.
    ///
    /// Ties go to the component seen first in a linear scan, i.e. the one
    /// containing the lowest point index. `None` for an empty point set.
    #[must_use]
    pub fn largest(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (label, &size) in self.sizes.iter().enumerate() {
            match best {
                Some((_, best_size)) if size <= best_size => {}
                _ => best = Some((label, size)),
            }
        }
        best.map(|(label, _)| label)
    }

    #[must_use]
    pub fn largest_size(&self) -> usize {
        self.largest().map_or(0, |l| self.sizes[l])
    }

    /// Indices of the points belonging to `label`.
    #[must_use]
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == label).then_some(i))
            .collect()
    }
}

/// Groups points whose pairwise distance is at most `threshold`, transitively.
///
/// Every unordered pair is tested, so cost is O(n²). That is fine for swarms of
/// tens to a few hundred agents and is the scaling limit of this routine.
/// With `horizontal_only` the height axis is ignored. Points with non-finite
/// coordinates stay singletons.
#[must_use]
pub fn find_components(points: &[Position], threshold: f32, horizontal_only: bool) -> Components {
    let n = points.len();
    let mut uf = UnionFind::new(n);
    let limit = threshold * threshold;

    for i in 0..n {
        if !points[i].is_finite() {
            continue;
        }
        for j in (i + 1)..n {
            if !points[j].is_finite() {
                continue;
            }
            let d2 = if horizontal_only {
                points[i].horizontal_distance_sq(&points[j])
            } else {
                points[i].distance_sq(&points[j])
            };
            if d2 <= limit {
                uf.union(i, j);
            }
        }
    }

    let mut root_label: Vec<Option<usize>> = vec![None; n];
    let mut labels = Vec::with_capacity(n);
    let mut sizes = Vec::new();
    for i in 0..n {
        let root = uf.find(i);
        let label = match root_label[root] {
            Some(label) => label,
            None => {
                let label = sizes.len();
                root_label[root] = Some(label);
                sizes.push(0);
                label
            }
        };
        sizes[label] += 1;
        labels.push(label);
    }

    Components { labels, sizes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f32, y: f32, z: f32) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn test_two_components() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(10.0, 0.0, 0.0)];
        let c = find_components(&points, 1.5, false);
        assert_eq!(c.labels, vec![0, 0, 1]);
        assert_eq!(c.sizes, vec![2, 1]);
        assert_eq!(c.largest(), Some(0));
        assert_eq!(c.largest_size(), 2);
        assert_eq!(c.members(1), vec![2]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let points = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let c = find_components(&points, 2.0, false);
        assert_eq!(c.component_count(), 1);
    }

    #[test]
    fn test_chain_links_transitively() {
        let points: Vec<Position> = (0..5).map(|i| p(i as f32, 0.0, 0.0)).collect();
        let c = find_components(&points, 1.0, false);
        assert_eq!(c.sizes, vec![5]);
    }

    #[test]
    fn test_horizontal_only_ignores_altitude() {
        let points = [p(0.0, 0.0, 0.0), p(0.5, 50.0, 0.0)];
        assert_eq!(find_components(&points, 1.0, true).component_count(), 1);
        assert_eq!(find_components(&points, 1.0, false).component_count(), 2);
    }

    #[test]
    fn test_tie_goes_to_lowest_point_index() {
        let points = [
            p(100.0, 0.0, 0.0),
            p(0.0, 0.0, 0.0),
            p(0.5, 0.0, 0.0),
            p(101.0, 0.0, 0.0),
        ];
        let c = find_components(&points, 1.0, false);
        assert_eq!(c.sizes, vec![2, 2]);
        let largest = c.largest().unwrap();
        assert_eq!(c.members(largest), vec![0, 3]);
    }

    #[test]
    fn test_empty_input() {
        let c = find_components(&[], 1.0, false);
        assert_eq!(c.component_count(), 0);
        assert_eq!(c.largest(), None);
        assert_eq!(c.largest_size(), 0);
    }

    #[test]
    fn test_non_finite_points_stay_alone() {
        let points = [p(f32::NAN, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.1, 0.0, 0.0)];
        let c = find_components(&points, 1.0, false);
        assert_eq!(c.sizes, vec![1, 2]);
    }

    #[test]
    fn test_union_by_size_tracks_set_size() {
        let mut uf = UnionFind::new(4);
        assert!(uf.union(0, 1));
        assert!(uf.union(2, 3));
        assert!(uf.union(1, 3));
        assert!(!uf.union(0, 2));
        assert_eq!(uf.set_size(3), 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_sizes_partition_points(
            coords in prop::collection::vec((-20.0f32..20.0, -5.0f32..5.0, -20.0f32..20.0), 0..40),
            threshold in 0.1f32..8.0,
        ) {
            let points: Vec<Position> = coords.iter().map(|&(x, y, z)| p(x, y, z)).collect();
            let c = find_components(&points, threshold, false);
            prop_assert_eq!(c.labels.len(), points.len());
            prop_assert_eq!(c.sizes.iter().sum::<usize>(), points.len());
            for (i, a) in points.iter().enumerate() {
                for (j, b) in points.iter().enumerate() {
                    if a.distance_sq(b) <= threshold * threshold {
                        prop_assert_eq!(c.labels[i], c.labels[j]);
                    }
                }
            }
        }
    }
}
