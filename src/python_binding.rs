use crate::map::generate_center_map as orig_generate_center_map;
use crate::map::types::{Lane, LaneType, MapFeature, MapPoint};
use crate::map::{decode_map_features, MapInfos, ObjectLocalPoses};
use crate::parameters::MapParameters;
use ndarray::ArrayView2;
use numpy::{IntoPyArray, PyArray2, PyArray3, PyArray4, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::exceptions;
use pyo3::prelude::*;
use std::convert::TryFrom;

fn to_py_err(err: anyhow::Error) -> PyErr {
    exceptions::PyValueError::new_err(format!("{:?}", err))
}

fn to_points(points: ArrayView2<f32>) -> PyResult<Vec<MapPoint>> {
    if points.ncols() < 3 {
        return Err(exceptions::PyValueError::new_err(format!(
            "Polylines need 3 columns [x, y, z], got {}",
            points.ncols()
        )));
    }
    Ok(points.rows().into_iter().map(|p| MapPoint::new(p[0], p[1], p[2])).collect())
}

fn map_parameters(src_polylines_num: usize, points_per_segment: usize, boundary_type: i32) -> MapParameters {
    MapParameters {
        src_polylines_num,
        points_per_segment,
        boundary_type,
        ..Default::default()
    }
}

#[pyfunction]
#[pyo3(text_signature = "(centerlines, lane_types, boundaries, points_per_segment, boundary_type)")]
fn decode_lanes<'py>(
    py: Python<'py>,
    centerlines: Vec<PyReadonlyArray2<'py, f32>>,
    lane_types: Vec<i32>,
    boundaries: Vec<Option<PyReadonlyArray2<'py, f32>>>,
    points_per_segment: usize,
    boundary_type: i32,
) -> PyResult<(&'py PyArray3<f32>, &'py PyArray2<bool>)> {
    if centerlines.len() != lane_types.len() || centerlines.len() != boundaries.len() {
        return Err(exceptions::PyValueError::new_err(
            "centerlines, lane_types and boundaries need the same length",
        ));
    }

    let mut features = vec![];
    for (i, ((centerline, lane_type), boundary)) in
        centerlines.iter().zip(lane_types).zip(boundaries.iter()).enumerate()
    {
        let lane_type = LaneType::try_from(lane_type).map_err(to_py_err)?;
        let mut lane = Lane::new(i as i64, lane_type, to_points(centerline.as_array())?);
        if let Some(boundary) = boundary {
            lane = lane.with_boundary(to_points(boundary.as_array())?);
        }
        features.push(MapFeature::Lane(lane));
    }

    let parameters = map_parameters(1, points_per_segment, boundary_type);
    parameters.validate().map_err(to_py_err)?;
    let map_infos = decode_map_features(&features, &parameters);
    Ok((
        map_infos.polylines.into_pyarray(py),
        map_infos.polylines_mask.into_pyarray(py),
    ))
}

#[pyfunction]
#[pyo3(text_signature = "(polylines, polylines_mask, local_centers, object_local_poses, src_polylines_num)")]
fn generate_center_map<'py>(
    py: Python<'py>,
    polylines: PyReadonlyArray3<'py, f32>,
    polylines_mask: PyReadonlyArray2<'py, bool>,
    local_centers: PyReadonlyArray2<'py, f32>,
    object_local_poses: Option<PyReadonlyArray2<'py, f32>>,
    src_polylines_num: usize,
) -> PyResult<(&'py PyArray4<f32>, &'py PyArray3<bool>, &'py PyArray3<f32>)> {
    let map_infos = MapInfos {
        polylines: polylines.as_array().to_owned(),
        polylines_mask: polylines_mask.as_array().to_owned(),
    };
    let parameters = map_parameters(src_polylines_num, map_infos.points_per_segment(), 5);

    let poses = match &object_local_poses {
        Some(poses) => Some(ObjectLocalPoses::try_from(poses.as_array()).map_err(to_py_err)?),
        None => None,
    };
    let center_map = orig_generate_center_map(&map_infos, local_centers.as_array(), poses, &parameters)
        .map_err(to_py_err)?;

    Ok((
        center_map.map_polylines.into_pyarray(py),
        center_map.map_polylines_mask.into_pyarray(py),
        center_map.map_polylines_center.into_pyarray(py),
    ))
}

#[pymodule]
fn v2xmap(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decode_lanes, m)?)?;
    m.add_function(wrap_pyfunction!(generate_center_map, m)?)?;

    Ok(())
}
