
use log::*;
use ndarray::{concatenate, s, Array, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::map::types::{LaneType, MapFeature, MapPoint};
use crate::parameters::MapParameters;
use crate::utils::geometry::polyline_heading;

/// Number of features per decoded point: `[x, y, z, dir_x, dir_y, dir_z, global_type]`.
pub const POLYLINE_FEATURES: usize = 7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapInfos {
    /// (num_polylines, points_per_segment, 7)
    pub polylines: Array3<f32>,
    /// (num_polylines, points_per_segment)
    pub polylines_mask: Array2<bool>,
}

impl MapInfos {
    pub fn empty(points_per_segment: usize) -> Self {
        Self {
            polylines: Array3::zeros((0, points_per_segment, POLYLINE_FEATURES)),
            polylines_mask: Array2::from_elem((0, points_per_segment), false),
        }
    }

    pub fn len(&self) -> usize {
        self.polylines.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points_per_segment(&self) -> usize {
        self.polylines.len_of(Axis(1))
    }
}

/// Real (unpadded) points of one retained segment.
type Chunk = Array2<f32>;

/// Turns the lanes of `map_features` into fixed-size polyline segments.
///
/// Centerlines are tagged with the lane type code, boundaries of driving lanes with
/// `parameters.boundary_type`. Every other feature is skipped. Segments keep the order of the
/// features they were cut from. A `points_per_segment` of zero yields no segments.
pub fn decode_map_features(map_features: &[MapFeature], parameters: &MapParameters) -> MapInfos {
    if parameters.points_per_segment == 0 {
        warn!("Cannot cut map features into segments of zero points");
        return MapInfos::empty(0);
    }

    let mut chunks: Vec<Chunk> = vec![];

    for feature in map_features.iter() {
        let lane = match feature {
            MapFeature::Lane(lane) => lane,
            _ => continue,
        };

        if parameters.is_long_enough(lane.polyline.len()) {
            segment_polyline(&lane.polyline, lane.lane_type.code(), parameters, &mut chunks);
        }

        if lane.lane_type == LaneType::Driving {
            match &lane.boundary {
                Some(boundary) if parameters.is_long_enough(boundary.len()) => {
                    segment_polyline(boundary, parameters.boundary_type, parameters, &mut chunks)
                }
                Some(_) => (),
                None => warn!("Driving lane {} has no boundary", lane.lane_id),
            }
        }
    }

    if chunks.is_empty() {
        warn!("No lane segments could be decoded from {} map features", map_features.len());
        return MapInfos::empty(parameters.points_per_segment);
    }

    let mut map_infos = MapInfos {
        polylines: Array3::zeros((chunks.len(), parameters.points_per_segment, POLYLINE_FEATURES)),
        polylines_mask: Array2::from_elem((chunks.len(), parameters.points_per_segment), false),
    };
    for (i, chunk) in chunks.iter().enumerate() {
        let n_points = chunk.nrows();
        map_infos.polylines.slice_mut(s![i, ..n_points, ..]).assign(chunk);
        map_infos.polylines_mask.slice_mut(s![i, ..n_points]).fill(true);
    }

    debug!("Decoded {} polyline segments from {} map features", map_infos.len(), map_features.len());
    map_infos
}

/// Appends `[x, y, z, heading, global_type]` to every point and cuts the result into chunks of
/// `points_per_segment` points. Chunks shorter than half a segment are dropped.
fn segment_polyline(points: &[MapPoint], global_type: i32, parameters: &MapParameters, chunks: &mut Vec<Chunk>) {
    let positions = Array::from_shape_fn((points.len(), 3), |(i, j)| match j {
        0 => points[i].x,
        1 => points[i].y,
        _ => points[i].z,
    });
    let heading = polyline_heading(positions.view());
    let global_type = Array2::from_elem((points.len(), 1), global_type as f32);

    let polyline = concatenate![Axis(1), positions, heading, global_type];

    for chunk in polyline.axis_chunks_iter(Axis(0), parameters.points_per_segment) {
        if parameters.is_long_enough(chunk.nrows()) {
            chunks.push(chunk.to_owned());
        }
    }
}
