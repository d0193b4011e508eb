use crate::cluster::find_components;
use crate::config::GroupingConfig;
use crate::provider::ConnectivitySource;
use std::collections::HashSet;
use swarmtrail_data::{AgentId, Position};

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSource {
    /// The host's connectivity graph reported a largest group.
    Connectivity,
    /// No connectivity yet; every agent assumed grouped.
    AssumedAll,
    /// Geometric clustering over the sampled positions.
    Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub flags: Vec<bool>,
    pub source: GroupSource,
}

impl Classification {
    #[must_use]
    pub fn grouped_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Decides, per sample, which agents form the main group.
///
/// Rules, first match wins:
/// 1. a connectivity source with a non-empty largest group: members of that
///    group, or agents the source separately places in its main network;
/// 2. `assume_grouped_until_ready`: everyone;
/// 3. the largest geometric cluster of the current positions.
///
/// Rules 1 and 3 clear every flag when fewer than `min_group_size` agents
/// are marked.
#[derive(Debug, Clone)]
pub struct MainGroupClassifier {
    config: GroupingConfig,
}

impl MainGroupClassifier {
    #[must_use]
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// `ids` and `positions` are parallel slices describing one sample.
    pub fn classify(
        &self,
        ids: &[AgentId],
        positions: &[Position],
        connectivity: Option<&dyn ConnectivitySource>,
    ) -> Classification {
        debug_assert_eq!(ids.len(), positions.len());

        if let Some(source) = connectivity {
            let largest: HashSet<AgentId> = source.largest_group().into_iter().collect();
            if !largest.is_empty() {
                // Membership and the main-network query are ORed; they may disagree.
                let flags = ids
                    .iter()
                    .map(|id| largest.contains(id) || source.is_in_main_network(*id))
                    .collect();
                return Classification {
                    flags: self.apply_floor(flags),
                    source: GroupSource::Connectivity,
                };
            }
        }

        if self.config.assume_grouped_until_ready {
            return Classification {
                flags: vec![true; ids.len()],
                source: GroupSource::AssumedAll,
            };
        }

        let components = find_components(
            positions,
            self.config.cluster_threshold,
            self.config.horizontal_only,
        );
        let flags = match components.largest() {
            Some(largest) => components.labels.iter().map(|&l| l == largest).collect(),
            None => Vec::new(),
        };
        Classification {
            flags: self.apply_floor(flags),
            source: GroupSource::Cluster,
        }
    }

    fn apply_floor(&self, mut flags: Vec<bool>) -> Vec<bool> {
        if self.config.min_group_size > 1 {
            let marked = flags.iter().filter(|&&f| f).count();
            if marked < self.config.min_group_size {
                flags.iter_mut().for_each(|f| *f = false);
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGraph {
        largest: Vec<AgentId>,
        main: Vec<AgentId>,
    }

    impl ConnectivitySource for FixedGraph {
        fn largest_group(&self) -> Vec<AgentId> {
            self.largest.clone()
        }

        fn is_in_main_network(&self, id: AgentId) -> bool {
            self.main.contains(&id)
        }
    }

    fn classifier(min_group_size: usize, assume: bool) -> MainGroupClassifier {
        MainGroupClassifier::new(GroupingConfig {
            cluster_threshold: 1.5,
            horizontal_only: false,
            min_group_size,
            assume_grouped_until_ready: assume,
        })
    }

    const A: AgentId = AgentId(1);
    const B: AgentId = AgentId(2);
    const C: AgentId = AgentId(3);

    fn line() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(1.0, 0.0, 0.0),
            Position::new(10.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_connectivity_marks_largest_group() {
        let graph = FixedGraph {
            largest: vec![A, B],
            main: vec![],
        };
        let c = classifier(1, false).classify(&[A, B, C], &line(), Some(&graph));
        assert_eq!(c.source, GroupSource::Connectivity);
        assert_eq!(c.flags, vec![true, true, false]);
    }

    #[test]
    fn test_connectivity_floor_clears_all() {
        let graph = FixedGraph {
            largest: vec![A, B],
            main: vec![],
        };
        let c = classifier(3, false).classify(&[A, B, C], &line(), Some(&graph));
        assert_eq!(c.flags, vec![false, false, false]);
    }

    #[test]
    fn test_main_network_query_is_ored() {
        let graph = FixedGraph {
            largest: vec![A],
            main: vec![C],
        };
        let c = classifier(1, false).classify(&[A, B, C], &line(), Some(&graph));
        assert_eq!(c.flags, vec![true, false, true]);
    }

    #[test]
    fn test_empty_connectivity_assumes_all_when_configured() {
        let graph = FixedGraph {
            largest: vec![],
            main: vec![A],
        };
        let c = classifier(5, true).classify(&[A, B, C], &line(), Some(&graph));
        assert_eq!(c.source, GroupSource::AssumedAll);
        assert_eq!(c.flags, vec![true, true, true]);
    }

    #[test]
    fn test_cluster_fallback() {
        let c = classifier(1, false).classify(&[A, B, C], &line(), None);
        assert_eq!(c.source, GroupSource::Cluster);
        assert_eq!(c.flags, vec![true, true, false]);
        assert_eq!(c.grouped_count(), 2);
    }

    #[test]
    fn test_cluster_fallback_floor() {
        let c = classifier(3, false).classify(&[A, B, C], &line(), None);
        assert_eq!(c.flags, vec![false, false, false]);
    }

    #[test]
    fn test_empty_sample() {
        let c = classifier(1, false).classify(&[], &[], None);
        assert!(c.flags.is_empty());
    }
}
