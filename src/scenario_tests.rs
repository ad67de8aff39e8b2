#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::needless_range_loop)]
mod tests {
    use crate::hierarchy::{is_ultrametric, subdominant_ultrametric};
    use crate::{Clusterer, Dendrogram, DistanceMatrix, LabeledDistances, Linkage, Result};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // d(A,B)=2, d(A,C)=6, d(A,D)=10, d(B,C)=5, d(B,D)=9, d(C,D)=4
    const ABCD: [f64; 6] = [2.0, 6.0, 10.0, 5.0, 9.0, 4.0];

    fn cluster(n: usize, condensed: Vec<f64>, linkage: Linkage) -> Result<Dendrogram> {
        Clusterer::new(DistanceMatrix::from_condensed(n, condensed)?, linkage)?.run()
    }

    /// Relabel so groups are numbered by first appearance.
    fn canonical(labels: &[usize]) -> Vec<usize> {
        let mut seen: Vec<usize> = Vec::new();
        labels
            .iter()
            .map(|l| match seen.iter().position(|s| s == l) {
                Some(p) => p,
                None => {
                    seen.push(*l);
                    seen.len() - 1
                }
            })
            .collect()
    }

    fn assert_well_formed(d: &Dendrogram) {
        let n = d.n_items();
        assert_eq!(d.n_merges(), n - 1);

        let mut absorbed = vec![0usize; 2 * n - 1];
        for (i, m) in d.merges().enumerate() {
            assert_eq!(m.cluster, n + i);
            assert!(m.cluster_a < m.cluster_b);
            absorbed[m.cluster_a] += 1;
            absorbed[m.cluster_b] += 1;
        }
        // Everything but the root is absorbed exactly once.
        assert!(absorbed[..2 * n - 2].iter().all(|&c| c == 1));
        assert_eq!(absorbed[2 * n - 2], 0);
        assert_eq!(d.members(d.root()).unwrap(), (0..n).collect::<Vec<_>>().as_slice());

        for w in d.heights().windows(2) {
            assert!(w[0] <= w[1], "inversion: {} then {}", w[0], w[1]);
        }
        assert!(d.health_check().is_clean(), "{}", d.health_check());
    }

    #[test]
    fn scenario_merges_per_linkage() -> Result<()> {
        for (linkage, root_height) in [
            (Linkage::Single, 5.0),
            (Linkage::Complete, 10.0),
            (Linkage::Average, 7.5),
        ] {
            let d = cluster(4, ABCD.to_vec(), linkage)?;
            let rows: Vec<(usize, usize, f64, usize)> = d
                .merges()
                .map(|m| (m.cluster_a, m.cluster_b, m.distance, m.size))
                .collect();
            assert_eq!(
                rows,
                vec![(0, 1, 2.0, 2), (2, 3, 4.0, 2), (4, 5, root_height, 4)],
                "{linkage}"
            );
            assert_eq!(d.members(4).unwrap(), &[0, 1]);
            assert_eq!(d.members(5).unwrap(), &[2, 3]);
            assert_eq!(d.cut_by_count(2)?, vec![0, 0, 1, 1]);
            assert_eq!(d.cut_by_count(4)?, vec![0, 1, 2, 3]);
            assert_eq!(d.cut_by_count(1)?, vec![0, 0, 0, 0]);
            assert_well_formed(&d);
        }
        Ok(())
    }

    #[test]
    fn scenario_linkage_table_export() -> Result<()> {
        let d = cluster(4, ABCD.to_vec(), Linkage::Average)?;
        let z: Vec<[f64; 4]> = d.linkage_table().into_iter().map(|r| r.to_array()).collect();
        assert_eq!(
            z,
            vec![
                [0.0, 1.0, 2.0, 2.0],
                [2.0, 3.0, 4.0, 2.0],
                [4.0, 5.0, 7.5, 4.0]
            ]
        );
        assert_eq!(d.leaves(), vec![0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn ties_resolve_to_lowest_pair() -> Result<()> {
        // All six pairs at the same distance: always merge the two lowest ids.
        let d = cluster(4, vec![1.0; 6], Linkage::Single)?;
        let pairs: Vec<(usize, usize)> = d.merges().map(|m| (m.cluster_a, m.cluster_b)).collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3), (4, 5)]);
        Ok(())
    }

    #[test]
    fn labeled_text_clusters_like_numbers() -> Result<()> {
        let text = "\tA\tB\tC\nB\t2\nC\t6\t5\nD\t10\t9\t4\n";
        let labeled = LabeledDistances::parse_lower_triangle(text)?;
        let from_text = Clusterer::new(labeled.matrix().clone(), Linkage::Complete)?.run()?;
        let from_numbers = cluster(4, ABCD.to_vec(), Linkage::Complete)?;
        assert_eq!(from_text, from_numbers);

        let groups = labeled.group_names(&from_text.cut_by_count(2)?);
        assert_eq!(groups, vec![vec!["A", "B"], vec!["C", "D"]]);
        Ok(())
    }

    #[test]
    fn seeded_runs_are_bit_identical() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 60;
        // Few distinct values, so ties are everywhere.
        let condensed: Vec<f64> = (0..n * (n - 1) / 2)
            .map(|_| f64::from(rng.random_range(0u8..5)) * 0.25)
            .collect();

        for linkage in Linkage::ALL {
            let first = cluster(n, condensed.clone(), linkage).unwrap();
            let second = cluster(n, condensed.clone(), linkage).unwrap();
            let bits = |d: &Dendrogram| -> Vec<(usize, usize, u64)> {
                d.merges()
                    .map(|m| (m.cluster_a, m.cluster_b, m.distance.to_bits()))
                    .collect()
            };
            assert_eq!(bits(&first), bits(&second));
            assert_well_formed(&first);
        }
    }

    #[test]
    fn original_tool_cut_semantics() -> Result<()> {
        // Two tight pairs, one loner far away.
        let text = "title\tw\tx\ty\tz\tq\n\
                    w\t0\t1\t8\t9\t30\n\
                    x\t1\t0\t9\t8\t30\n\
                    y\t8\t9\t0\t2\t30\n\
                    z\t9\t8\t2\t0\t30\n\
                    q\t30\t30\t30\t30\t0\n";
        let labeled = LabeledDistances::parse_full(text)?;
        let d = Clusterer::new(labeled.matrix().clone(), Linkage::Average)?.run()?;

        let at = |t: f64| -> Result<Vec<Vec<String>>> {
            Ok(labeled
                .group_names(&d.cut_by_threshold(t)?)
                .into_iter()
                .map(|g| g.into_iter().map(str::to_string).collect())
                .collect())
        };
        assert_eq!(at(0.5)?.len(), 5);
        assert_eq!(at(2.0)?, vec![vec!["w", "x"], vec!["y", "z"], vec!["q"]]);
        assert_eq!(at(20.0)?.len(), 2);
        assert_eq!(at(100.0)?.len(), 1);
        Ok(())
    }

    fn condensed_strategy() -> impl Strategy<Value = (usize, Vec<f64>)> {
        (2usize..14).prop_flat_map(|n| {
            let value = prop_oneof![(0u8..6).prop_map(f64::from), 0.0f64..100.0];
            (Just(n), proptest::collection::vec(value, n * (n - 1) / 2))
        })
    }

    /// Distinct distances: a shuffled `1..=m`, so no ties ever arise under
    /// single or complete linkage.
    fn distinct_strategy() -> impl Strategy<Value = (usize, Vec<f64>)> {
        (2usize..14).prop_flat_map(|n| {
            let m = n * (n - 1) / 2;
            (
                Just(n),
                Just((1..=m).map(|v| v as f64).collect::<Vec<f64>>()).prop_shuffle(),
            )
        })
    }

    proptest! {
        #[test]
        fn every_run_is_a_valid_monotone_tree((n, condensed) in condensed_strategy()) {
            for linkage in Linkage::ALL {
                let d = cluster(n, condensed.clone(), linkage).unwrap();
                assert_well_formed(&d);

                let all = d.cut_by_count(n).unwrap();
                prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
                prop_assert_eq!(d.cut_by_count(1).unwrap(), vec![0; n]);
                for k in 1..=n {
                    let labels = d.cut_by_count(k).unwrap();
                    prop_assert_eq!(labels.iter().max().copied(), Some(k - 1));
                    prop_assert_eq!(canonical(&labels), labels);
                }

                prop_assert!(is_ultrametric(&d.cophenetic(), 0.0));
            }
        }

        #[test]
        fn single_linkage_matches_mst_components((n, condensed) in condensed_strategy()) {
            use petgraph::algo::min_spanning_tree;
            use petgraph::data::Element;
            use petgraph::graph::UnGraph;
            use petgraph::unionfind::UnionFind;

            let m = DistanceMatrix::from_condensed(n, condensed.clone()).unwrap();
            let mut g = UnGraph::<(), f64>::new_undirected();
            let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
            for i in 0..n {
                for j in (i + 1)..n {
                    let _ = g.add_edge(nodes[i], nodes[j], m.get(i, j));
                }
            }
            let mst: Vec<(usize, usize, f64)> = min_spanning_tree(&g)
                .filter_map(|e| match e {
                    Element::Edge { source, target, weight } => Some((source, target, weight)),
                    Element::Node { .. } => None,
                })
                .collect();
            prop_assert_eq!(mst.len(), n - 1);

            let d = Clusterer::new(m, Linkage::Single).unwrap().run().unwrap();
            let mut thresholds = condensed.clone();
            thresholds.push(0.0);
            for t in thresholds {
                let mut uf = UnionFind::<usize>::new(n);
                for &(a, b, w) in &mst {
                    if w <= t {
                        let _ = uf.union(a, b);
                    }
                }
                let expected = canonical(&uf.into_labeling());
                prop_assert_eq!(d.cut_by_threshold(t).unwrap(), expected, "threshold {}", t);
            }
        }

        #[test]
        fn single_linkage_cophenetic_is_subdominant((n, condensed) in condensed_strategy()) {
            let m = DistanceMatrix::from_condensed(n, condensed).unwrap();
            let u = subdominant_ultrametric(&m.to_square());
            let d = Clusterer::new(m, Linkage::Single).unwrap().run().unwrap();
            prop_assert_eq!(d.cophenetic(), u);
        }

        #[test]
        fn agrees_with_kodama_without_ties((n, condensed) in distinct_strategy()) {
            for (linkage, method) in [
                (Linkage::Single, kodama::Method::Single),
                (Linkage::Complete, kodama::Method::Complete),
            ] {
                let ours = cluster(n, condensed.clone(), linkage).unwrap();
                let mut scratch = condensed.clone();
                let theirs = kodama::linkage(&mut scratch, n, method);

                prop_assert_eq!(ours.n_merges(), theirs.steps().len());
                for (m, s) in ours.merges().zip(theirs.steps()) {
                    let pair = (s.cluster1.min(s.cluster2), s.cluster1.max(s.cluster2));
                    prop_assert_eq!((m.cluster_a, m.cluster_b), pair);
                    prop_assert_eq!(m.distance, s.dissimilarity);
                    prop_assert_eq!(m.size, s.size);
                }
            }
        }

        #[test]
        fn average_heights_agree_with_kodama(
            (n, condensed) in (2usize..12).prop_flat_map(|n| {
                (Just(n), proptest::collection::vec(0.0f64..1.0, n * (n - 1) / 2))
            })
        ) {
            let ours = cluster(n, condensed.clone(), Linkage::Average).unwrap();
            let mut scratch = condensed;
            let theirs = kodama::linkage(&mut scratch, n, kodama::Method::Average);
            for (m, s) in ours.merges().zip(theirs.steps()) {
                prop_assert!((m.distance - s.dissimilarity).abs() < 1e-9);
            }
        }
    }
}
