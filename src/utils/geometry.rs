use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis, Zip};
use num_traits::{Float, FloatConst};

use crate::utils::ndarray_extensions::boolean::BooleanCollectives;
use crate::utils::ndarray_extensions::norm;
use crate::utils::ndarray_extensions::shift::Shift;

const MIN_HEADING_NORM: f32 = 1e-6;

/// Unit heading of every point of a `(N, 3)` polyline.
///
/// Point `i` points along `p[i] - p[i - 1]`; the first point has no predecessor and reuses the
/// heading of the second one. Near-zero steps are divided by `1e-6` instead of their norm.
pub fn polyline_heading(polyline: ArrayView2<f32>) -> Array2<f32> {
    let diff = &polyline - &polyline.shift(1, Axis(0));
    let norms = norm(diff.view(), Axis(1)).mapv(|x| x.max(MIN_HEADING_NORM));
    let mut heading = diff / &norms.insert_axis(Axis(1));

    if heading.nrows() > 1 {
        let second = heading.row(1).to_owned();
        heading.row_mut(0).assign(&second);
    }
    heading
}

/// Wraps an angle into `[-π, π]` by whole turns. Angles already in range are returned as is.
pub fn normalize_angle<A: Float + FloatConst>(theta: A) -> A {
    if !theta.is_finite() || (theta >= -A::PI() && theta <= A::PI()) {
        return theta;
    }

    let two_pi = A::PI() + A::PI();
    // the remainder is exact, so far out angles need no loop
    let theta = theta % two_pi;
    if theta > A::PI() {
        theta - two_pi
    } else if theta < -A::PI() {
        theta + two_pi
    } else {
        theta
    }
}

pub fn normalize_angles<A: Float + FloatConst>(thetas: Array1<A>) -> Array1<A> {
    thetas.mapv_into(normalize_angle)
}

/// Rotates every `(x, y)` row of `points` counter-clockwise by its own angle from `angles`.
pub fn rotate_points_along_z_2d<A: Float>(points: ArrayView2<A>, angles: ArrayView1<A>) -> Array2<A> {
    let mut rotated = Array2::zeros(points.raw_dim());
    Zip::from(rotated.rows_mut())
        .and(points.rows())
        .and(&angles)
        .for_each(|mut out, point, &angle| {
            let (sin, cos) = angle.sin_cos();
            out[0] = point[0] * cos - point[1] * sin;
            out[1] = point[0] * sin + point[1] * cos;
        });
    rotated
}

/// Mean `(x, y)` of the valid points of every segment.
///
/// `segments` is `(S, P, F)` with `x, y` in the first two features and `mask` is `(S, P)`.
/// Segments without valid points end up at the origin.
pub fn masked_centroids(segments: ArrayView3<f32>, mask: ArrayView2<bool>) -> Array2<f32> {
    let mut centroids = Array2::zeros((segments.len_of(Axis(0)), 2));

    for ((mut centroid, segment), valid) in centroids
        .rows_mut()
        .into_iter()
        .zip(segments.outer_iter())
        .zip(mask.outer_iter())
    {
        let n_valid = valid.count_true().max(1) as f32;
        for (point, _) in segment.outer_iter().zip(valid.iter()).filter(|(_, v)| **v) {
            centroid[0] += point[0];
            centroid[1] += point[1];
        }
        centroid /= n_valid;
    }
    centroids
}
