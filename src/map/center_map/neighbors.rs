use anyhow::{ensure, Error, Result};
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind, KdTree};
use log::*;
use ndarray::ArrayView2;
use std::cmp::Ordering;

/// Nearest-segment lookup over segment centroids.
///
/// Both variants return the same neighbors in the same order: ascending distance, ties go to
/// the lower segment index.
pub enum SegmentIndex {
    BruteForce(Vec<[f32; 2]>),
    KdTree(KdTree<f32, usize, [f32; 2]>),
}

fn kdtree_error(err: ErrorKind) -> Error {
    Error::msg(format!("KD-tree over segment centroids failed: {:?}", err))
}

fn is_finite(point: &[f32; 2]) -> bool {
    point.iter().all(|x| x.is_finite())
}

impl SegmentIndex {
    /// Ranks exhaustively up to `brute_force_max_segments` centroids and builds a KD-tree above.
    pub fn new(centroids: ArrayView2<f32>, brute_force_max_segments: usize) -> Result<Self> {
        let points: Vec<[f32; 2]> = centroids.rows().into_iter().map(|c| [c[0], c[1]]).collect();
        ensure!(points.iter().all(is_finite), "Segment centroids must be finite");

        if points.len() <= brute_force_max_segments {
            return Ok(Self::BruteForce(points));
        }

        debug!("Building KD-tree over {} segment centroids", points.len());
        let mut tree = KdTree::new(2);
        for (i, point) in points.into_iter().enumerate() {
            tree.add(point, i).map_err(kdtree_error)?;
        }
        Ok(Self::KdTree(tree))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::BruteForce(points) => points.len(),
            Self::KdTree(tree) => tree.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of the `k` centroids closest to `query`, nearest first.
    pub fn k_nearest(&self, query: [f32; 2], k: usize) -> Result<Vec<usize>> {
        ensure!(is_finite(&query), "Query point {:?} is not finite", query);

        let mut candidates: Vec<(f32, usize)> = match self {
            Self::BruteForce(points) => points
                .iter()
                .enumerate()
                .map(|(i, point)| (squared_euclidean(&query[..], &point[..]), i))
                .collect(),
            Self::KdTree(tree) => {
                let nearest = tree.nearest(&query[..], k, &squared_euclidean).map_err(kdtree_error)?;
                match nearest.last() {
                    None => vec![],
                    Some((kth_distance, _)) => {
                        // widen the radius so every tie with the k-th neighbor is a candidate
                        let radius = *kth_distance * (1. + 1e-5) + f32::EPSILON;
                        tree.within(&query[..], radius, &squared_euclidean)
                            .map_err(kdtree_error)?
                            .into_iter()
                            .map(|(distance, i)| (distance, *i))
                            .collect()
                    }
                }
            }
        };

        candidates.sort_by(|(a_distance, a), (b_distance, b)| {
            a_distance
                .partial_cmp(b_distance)
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(b))
        });
        Ok(candidates.into_iter().take(k).map(|(_, i)| i).collect())
    }
}
