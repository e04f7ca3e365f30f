mod neighbors;

pub use neighbors::SegmentIndex;

use anyhow::{bail, ensure, Error, Result};
use log::*;
use ndarray::{s, Array1, Array2, Array3, Array4, ArrayView1, ArrayView2, ArrayView3, ArrayView4, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::iter::repeat;

use crate::map::decoder::{MapInfos, POLYLINE_FEATURES};
use crate::parameters::MapParameters;
use crate::utils::geometry::{masked_centroids, normalize_angles, rotate_points_along_z_2d};
use crate::utils::ndarray_extensions::shift::Shift;

/// Number of features per projected point: `[x, y, dir_x, dir_y, global_type, pre_x, pre_y]`.
pub const CENTER_MAP_FEATURES: usize = 7;

/// Local pose of every object, given in the frame of its local center.
#[derive(Clone, Copy, Debug)]
pub enum ObjectLocalPoses<'a> {
    /// (N, 7) `[x, y, z, l, w, h, yaw (radian)]`
    Boxes(ArrayView2<'a, f32>),
    /// (N, 3) `[x, y, z]`, heading is inherited from the center
    Offsets(ArrayView2<'a, f32>),
}

impl<'a> ObjectLocalPoses<'a> {
    pub fn view(&self) -> ArrayView2<'a, f32> {
        match self {
            Self::Boxes(poses) | Self::Offsets(poses) => *poses,
        }
    }

    fn expected_columns(&self) -> usize {
        match self {
            Self::Boxes(_) => 7,
            Self::Offsets(_) => 3,
        }
    }
}

impl<'a> TryFrom<ArrayView2<'a, f32>> for ObjectLocalPoses<'a> {
    type Error = Error;

    fn try_from(poses: ArrayView2<'a, f32>) -> Result<Self> {
        match poses.ncols() {
            7 => Ok(Self::Boxes(poses)),
            3 => Ok(Self::Offsets(poses)),
            n => bail!("Object local poses need 7 [x, y, z, l, w, h, yaw] or 3 [x, y, z] columns, got {}", n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterMap {
    /// (N, selected, points_per_segment, 7)
    pub map_polylines: Array4<f32>,
    /// (N, selected, points_per_segment)
    pub map_polylines_mask: Array3<bool>,
    /// (N, selected, 2)
    pub map_polylines_center: Array3<f32>,
}

impl CenterMap {
    pub fn n_objects(&self) -> usize {
        self.map_polylines.len_of(Axis(0))
    }

    pub fn n_selected(&self) -> usize {
        self.map_polylines.len_of(Axis(1))
    }
}

/// Heading of every object in the shared local frame, in radians.
///
/// Box poses add their own yaw to the center yaw, offsets and missing poses keep the center yaw.
pub fn object_headings(local_centers: ArrayView2<f32>, object_local_poses: Option<ObjectLocalPoses>) -> Array1<f32> {
    let local_heading = local_centers.column(4).mapv(f32::to_radians);
    match object_local_poses {
        Some(ObjectLocalPoses::Boxes(poses)) => normalize_angles(local_heading + &poses.column(6)),
        _ => local_heading,
    }
}

/// Position of every object in the shared local frame: its center moved by the pose offset,
/// which is rotated by the center yaw only.
pub fn query_points(local_centers: ArrayView2<f32>, object_local_poses: Option<ObjectLocalPoses>) -> Array2<f32> {
    let mut points = local_centers.slice(s![.., 0..2]).to_owned();
    if let Some(poses) = object_local_poses {
        let local_heading = local_centers.column(4).mapv(f32::to_radians);
        let offsets = poses.view().slice_move(s![.., 0..2]);
        points += &rotate_points_along_z_2d(offsets, local_heading.view());
    }
    points
}

/// Segment indices picked for every object, shape (N, selected).
///
/// With more segments than `src_polylines_num`, each object gets its nearest segments by centroid
/// distance, nearest first. Otherwise every object gets all segments in decoding order.
pub(crate) fn select_segments(
    map_infos: &MapInfos,
    query_points: ArrayView2<f32>,
    parameters: &MapParameters,
) -> Result<Array2<usize>> {
    let n_objects = query_points.nrows();
    let n_segments = map_infos.len();
    let k = parameters.src_polylines_num;

    if n_segments <= k {
        return Ok(Array2::from_shape_fn((n_objects, n_segments), |(_, j)| j));
    }

    let centroids = masked_centroids(map_infos.polylines.view(), map_infos.polylines_mask.view());
    let index = SegmentIndex::new(centroids.view(), parameters.brute_force_max_segments)?;

    let mut selection = Array2::zeros((n_objects, k));
    for (mut selected, query) in selection.rows_mut().into_iter().zip(query_points.rows()) {
        let nearest = index.k_nearest([query[0], query[1]], k)?;
        selected.assign(&Array1::from(nearest));
    }
    Ok(selection)
}

/// Moves the selected segments of every object into the object's frame: translated by its query
/// point, rotated by minus its heading. Points outside the mask are zeroed afterwards.
fn transform_to_center_coordinates(
    polylines: ArrayView4<f32>,
    mask: ArrayView3<bool>,
    query_points: ArrayView2<f32>,
    headings: ArrayView1<f32>,
) -> Result<Array4<f32>> {
    let (n_objects, n_selected, points_per_segment, _) = polylines.dim();
    let n_points = n_objects * n_selected * points_per_segment;
    let angles: Array1<f32> = headings
        .iter()
        .flat_map(|heading| repeat(-*heading).take(n_selected * points_per_segment))
        .collect();

    let mut positions = polylines.slice(s![.., .., .., 0..2]).to_owned();
    positions -= &query_points.insert_axis(Axis(1)).insert_axis(Axis(1));
    let positions = rotate_points_along_z_2d(positions.into_shape((n_points, 2))?.view(), angles.view())
        .into_shape((n_objects, n_selected, points_per_segment, 2))?;

    let directions = polylines.slice(s![.., .., .., 3..5]).to_owned();
    let directions = rotate_points_along_z_2d(directions.into_shape((n_points, 2))?.view(), angles.view())
        .into_shape((n_objects, n_selected, points_per_segment, 2))?;

    let previous = positions.lag(Axis(2));

    let mut transformed = Array4::zeros((n_objects, n_selected, points_per_segment, CENTER_MAP_FEATURES));
    transformed.slice_mut(s![.., .., .., 0..2]).assign(&positions);
    transformed.slice_mut(s![.., .., .., 2..4]).assign(&directions);
    transformed.slice_mut(s![.., .., .., 4]).assign(&polylines.slice(s![.., .., .., 6]));
    transformed.slice_mut(s![.., .., .., 5..7]).assign(&previous);

    Zip::from(transformed.lanes_mut(Axis(3)))
        .and(&mask)
        .for_each(|mut point, &valid| {
            if !valid {
                point.fill(0.);
            }
        });

    Ok(transformed)
}

/// Selects the map segments closest to every object and expresses them in the object's frame.
///
/// `local_centers` is (N, 6) `[x, y, z, roll, yaw (degree), pitch]`. Fails fast on mismatching
/// batch sizes or column counts.
pub fn generate_center_map(
    map_infos: &MapInfos,
    local_centers: ArrayView2<f32>,
    object_local_poses: Option<ObjectLocalPoses>,
    parameters: &MapParameters,
) -> Result<CenterMap> {
    parameters.validate()?;
    let n_objects = local_centers.nrows();
    let points_per_segment = map_infos.points_per_segment();

    ensure!(
        local_centers.ncols() == 6,
        "local_centers need 6 columns [x, y, z, roll, yaw, pitch], got {}",
        local_centers.ncols()
    );
    ensure!(
        map_infos.polylines.len_of(Axis(2)) == POLYLINE_FEATURES,
        "Decoded polylines need {} features per point, got {}",
        POLYLINE_FEATURES,
        map_infos.polylines.len_of(Axis(2))
    );
    ensure!(
        map_infos.polylines_mask.dim() == (map_infos.len(), points_per_segment),
        "polylines_mask {:?} does not match polylines {:?}",
        map_infos.polylines_mask.shape(),
        map_infos.polylines.shape()
    );
    if let Some(poses) = object_local_poses {
        let poses_view = poses.view();
        ensure!(
            poses_view.ncols() == poses.expected_columns(),
            "Object local poses have {} columns, expected {}",
            poses_view.ncols(),
            poses.expected_columns()
        );
        ensure!(
            poses_view.nrows() == n_objects,
            "Got {} object local poses for {} local centers",
            poses_view.nrows(),
            n_objects
        );
    }

    let headings = object_headings(local_centers, object_local_poses);
    let query_points = query_points(local_centers, object_local_poses);

    let selection = select_segments(map_infos, query_points.view(), parameters)?;
    let n_selected = selection.ncols();
    debug!("Selected {} of {} segments for {} objects", n_selected, map_infos.len(), n_objects);

    let flat_selection: Vec<usize> = selection.iter().cloned().collect();
    let polylines = map_infos
        .polylines
        .select(Axis(0), &flat_selection)
        .into_shape((n_objects, n_selected, points_per_segment, POLYLINE_FEATURES))?;
    let map_polylines_mask = map_infos
        .polylines_mask
        .select(Axis(0), &flat_selection)
        .into_shape((n_objects, n_selected, points_per_segment))?;

    let map_polylines = transform_to_center_coordinates(
        polylines.view(),
        map_polylines_mask.view(),
        query_points.view(),
        headings.view(),
    )?;

    let n_flat = n_objects * n_selected;
    let map_polylines_center = masked_centroids(
        map_polylines.view().into_shape((n_flat, points_per_segment, CENTER_MAP_FEATURES))?,
        map_polylines_mask.view().into_shape((n_flat, points_per_segment))?,
    )
    .into_shape((n_objects, n_selected, 2))?;

    Ok(CenterMap {
        map_polylines,
        map_polylines_mask,
        map_polylines_center,
    })
}
