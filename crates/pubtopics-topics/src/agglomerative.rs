//! Hierarchical agglomerative clustering with average linkage.
//!
//! Works on a precomputed distance matrix and stops once the requested number
//! of clusters remains. Cluster distances are maintained with the
//! Lance-Williams update for UPGMA:
//!
//! d(k, i ∪ j) = (|i| d(k, i) + |j| d(k, j)) / (|i| + |j|)
//!
//! ## Tie-breaking
//!
//! Each cluster is represented by its lowest point index. When several pairs
//! share the minimum distance, the pair with the lexicographically smallest
//! (lower representative, higher representative) merges first, and the merged
//! cluster keeps the lower representative. Labels are numbered by ascending
//! representative, so label 0 always contains point 0.

use crate::error::TopicsError;

/// Partition points into `n_clusters` groups.
///
/// Returns one label in `0..n_clusters` per point.
///
/// # Errors
///
/// Returns an error if the matrix is empty or not square, or if
/// `n_clusters` is 0 or larger than the number of points.
pub fn average_linkage(distances: &[Vec<f64>], n_clusters: usize) -> Result<Vec<usize>, TopicsError> {
    let n = distances.len();
    if n == 0 {
        return Err(TopicsError::Clustering("empty distance matrix".to_string()));
    }
    if distances.iter().any(|row| row.len() != n) {
        return Err(TopicsError::Clustering(format!(
            "distance matrix must be square ({n} x {n})"
        )));
    }
    if n_clusters == 0 || n_clusters > n {
        return Err(TopicsError::Clustering(format!(
            "cannot form {n_clusters} clusters from {n} points"
        )));
    }

    let mut dist: Vec<Vec<f64>> = distances.to_vec();
    let mut sizes = vec![1usize; n];
    let mut active = vec![true; n];
    // Union target for each absorbed representative
    let mut parent: Vec<usize> = (0..n).collect();
    let mut remaining = n;

    while remaining > n_clusters {
        let (i, j) = closest_pair(&dist, &active).ok_or_else(|| {
            TopicsError::Clustering("no pair of active clusters left to merge".to_string())
        })?;

        let (si, sj) = (sizes[i] as f64, sizes[j] as f64);
        for k in 0..n {
            if !active[k] || k == i || k == j {
                continue;
            }
            let merged = (si * dist[k][i] + sj * dist[k][j]) / (si + sj);
            dist[k][i] = merged;
            dist[i][k] = merged;
        }

        sizes[i] += sizes[j];
        active[j] = false;
        parent[j] = i;
        remaining -= 1;
    }

    let mut label_of_rep = vec![usize::MAX; n];
    for (label, rep) in (0..n).filter(|&r| active[r]).enumerate() {
        label_of_rep[rep] = label;
    }

    let labels = (0..n)
        .map(|point| label_of_rep[find_root(&parent, point)])
        .collect();

    Ok(labels)
}

/// Find the active pair with the smallest distance, earliest pair on ties.
fn closest_pair(dist: &[Vec<f64>], active: &[bool]) -> Option<(usize, usize)> {
    let n = dist.len();
    let mut best: Option<(usize, usize, f64)> = None;

    for i in 0..n {
        if !active[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !active[j] {
                continue;
            }
            let d = dist[i][j];
            match best {
                Some((_, _, best_d)) if d >= best_d => {}
                _ => best = Some((i, j, d)),
            }
        }
    }

    best.map(|(i, j, _)| (i, j))
}

fn find_root(parent: &[usize], mut point: usize) -> usize {
    while parent[point] != point {
        point = parent[point];
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::pairwise_distances;

    #[test]
    fn test_closest_pair_needs_two_active_clusters() {
        let dist = two_groups();
        assert_eq!(closest_pair(&dist, &[true, false, false, false]), None);
        assert_eq!(closest_pair(&dist, &[false; 4]), None);
        assert_eq!(closest_pair(&dist, &[false, true, false, true]), Some((1, 3)));
    }

    fn two_groups() -> Vec<Vec<f64>> {
        pairwise_distances(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 0.1, 0.9],
        ])
    }

    #[test]
    fn test_separates_obvious_groups() {
        let labels = average_linkage(&two_groups(), 2).unwrap();
        assert_eq!(labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_one_cluster_per_point() {
        let labels = average_linkage(&two_groups(), 4).unwrap();
        assert_eq!(labels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_single_cluster() {
        let labels = average_linkage(&two_groups(), 1).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_ties_merge_lowest_pair_first() {
        // All points equidistant: (0, 1) merges first, then the average
        // distance to the pair equals the rest, so (0, 2) merges next.
        let d = vec![
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0, 1.0],
            vec![1.0, 1.0, 1.0, 0.0],
        ];
        assert_eq!(average_linkage(&d, 3).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(average_linkage(&d, 2).unwrap(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_average_linkage_differs_from_single_linkage() {
        // Point 2 is close to point 1 only; average linkage keeps the
        // {0, 1} cluster from absorbing it before 2 and 3 pair up.
        let d = vec![
            vec![0.0, 0.1, 0.9, 1.0],
            vec![0.1, 0.0, 0.3, 1.0],
            vec![0.9, 0.3, 0.0, 0.4],
            vec![1.0, 1.0, 0.4, 0.0],
        ];
        // After (0,1) merge: d({0,1},2) = 0.6, d({0,1},3) = 1.0, d(2,3) = 0.4
        assert_eq!(average_linkage(&d, 2).unwrap(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_labels_in_range() {
        let labels = average_linkage(&two_groups(), 3).unwrap();
        assert!(labels.iter().all(|&l| l < 3));
        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn test_rejects_bad_requests() {
        assert!(average_linkage(&[], 1).is_err());
        assert!(average_linkage(&two_groups(), 0).is_err());
        assert!(average_linkage(&two_groups(), 5).is_err());
        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(average_linkage(&ragged, 1).is_err());
    }
}
