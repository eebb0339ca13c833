//! Cross-module invariants checked on randomly generated taxonomies.
//!
//! The central one is the AncSPL contract: the estimate never undercuts
//! the exact shortest path, and matches it exactly on trees.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{AncSplEngine, CancelToken, ExactPathEngine, Taxonomy};

    /// Random single-rooted DAG with ids 0..n. Each vertex picks 1..=k
    /// distinct parents among its predecessors, so multiple inheritance is
    /// common.
    fn random_dag(seed: u64, n: u64, max_parents: usize) -> Taxonomy {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tax = Taxonomy::with_capacity(n as usize);
        tax.add_vertex(0, &[]).unwrap();
        for id in 1..n {
            let k = rng.gen_range(1..=max_parents.min(id as usize));
            let mut parents = Vec::with_capacity(k);
            while parents.len() < k {
                let p = rng.gen_range(0..id);
                if !parents.contains(&p) {
                    parents.push(p);
                }
            }
            tax.add_vertex(id, &parents).unwrap();
        }
        tax.compute_cached_attributes();
        tax.compute_cached_ancestor_set(false);
        tax
    }

    /// Random tree: exactly one parent per non-root vertex.
    fn random_tree(seed: u64, n: u64) -> Taxonomy {
        random_dag(seed, n, 1)
    }

    #[test]
    fn test_ancspl_upper_bounds_exact_on_random_dags() {
        let token = CancelToken::new();
        for seed in 0..4 {
            let tax = random_dag(seed, 60, 3);
            let ancspl = AncSplEngine::new(&tax).unwrap();
            let exact = ExactPathEngine::new(&tax);

            for u in 0..60 {
                for v in u..60 {
                    let approx = ancspl.distance(u, v).unwrap();
                    let truth = exact.distance(u, v, &token).unwrap();
                    assert!(
                        approx >= truth,
                        "seed {seed}: AncSPL({u},{v}) = {approx} < exact {truth}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_ancspl_is_exact_on_trees() {
        let token = CancelToken::new();
        for seed in 10..13 {
            let tax = random_tree(seed, 80);
            let ancspl = AncSplEngine::new(&tax).unwrap();
            let exact = ExactPathEngine::new(&tax);

            for u in 0..80 {
                for v in u..80 {
                    assert_eq!(
                        ancspl.distance(u, v).unwrap(),
                        exact.distance(u, v, &token).unwrap(),
                        "tree distances must agree for ({u},{v})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_self_and_root_distances() {
        let tax = random_dag(7, 100, 3);
        let ancspl = AncSplEngine::new(&tax).unwrap();
        let exact = ExactPathEngine::new(&tax);
        let token = CancelToken::new();

        for v in tax.iter() {
            // Self-distance.
            assert_eq!(ancspl.distance(v.id(), v.id()).unwrap(), 0.0);
            assert_eq!(exact.distance(v.id(), v.id(), &token).unwrap(), 0.0);

            // Distance to the root of a single-rooted DAG is the depth,
            // and both engines agree on it.
            let d = v.depth().unwrap() as f64;
            assert_eq!(ancspl.distance(v.id(), 0).unwrap(), d);
            assert!(exact.distance(v.id(), 0, &token).unwrap() <= d);
        }
    }

    #[test]
    fn test_topological_and_ancestor_invariants_hold() {
        let tax = random_dag(42, 120, 4);

        for v in tax.iter() {
            let d = v.depth().unwrap();
            let anc = v.ancestor_ids().unwrap();

            // Every parent is strictly shallower and its ancestors are
            // contained in ours.
            for p in v.parent_ids() {
                let parent = tax.get(p).unwrap();
                assert!(parent.depth().unwrap() < d);
                for a in parent.ancestor_ids().unwrap() {
                    assert!(anc.contains(&a));
                }
            }

            // Reflexive membership and count agreement.
            assert!(anc.contains(&v.id()));
            assert_eq!(v.subsumer_count().unwrap(), anc.len());
        }

        let report = tax.health_check();
        assert!(report.is_healthy(), "{report}");
    }

    #[test]
    fn test_attribute_recomputation_is_stable() {
        // Evaluating the same measure twice on one taxonomy must see
        // identical cached values.
        let mut tax = random_dag(5, 70, 3);
        let before: Vec<_> = tax
            .iter()
            .map(|v| {
                (
                    v.depth().unwrap(),
                    v.leaf_count().unwrap(),
                    v.subsumer_count().unwrap(),
                    v.hyponym_count().unwrap(),
                )
            })
            .collect();

        tax.compute_cached_attributes();
        tax.compute_cached_ancestor_set(false);
        tax.compute_cached_attributes();

        let after: Vec<_> = tax
            .iter()
            .map(|v| {
                (
                    v.depth().unwrap(),
                    v.leaf_count().unwrap(),
                    v.subsumer_count().unwrap(),
                    v.hyponym_count().unwrap(),
                )
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_batch_matches_single_queries() {
        let tax = random_dag(9, 50, 3);
        let ancspl = AncSplEngine::new(&tax).unwrap();
        let token = CancelToken::new();

        let mut rng = StdRng::seed_from_u64(99);
        let pairs: Vec<(u64, u64)> = (0..200)
            .map(|_| (rng.gen_range(0..50), rng.gen_range(0..50)))
            .collect();

        let batch = ancspl.distances(&pairs, &token).unwrap();
        for (i, &(u, v)) in pairs.iter().enumerate() {
            assert_eq!(batch[i], ancspl.distance(u, v).unwrap());
        }

        #[cfg(feature = "parallel")]
        {
            let par = ancspl.par_distances(&pairs, &token).unwrap();
            assert_eq!(par, batch);
        }
    }
}
