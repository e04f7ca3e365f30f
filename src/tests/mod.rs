use crate::map::types::*;
use crate::parameters::{Command, MapParameters, Parameters};
use crate::{center_map, decode_map_features, v2xmap, ObjectLocalPoses};
use ndarray::{arr2, s, Array2, Axis};
use ndarray_linalg::close_l1;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::env::temp_dir;
use std::fs;

fn straight_lane(lane_id: i64, n_points: usize, y: f32) -> Lane {
    let polyline = (0..n_points).map(|i| MapPoint::new(i as f32, y, 0.)).collect();
    Lane::new(lane_id, LaneType::Sidewalk, polyline)
}

fn stacked_lanes(n_lanes: usize) -> Vec<MapFeature> {
    (0..n_lanes)
        .map(|i| MapFeature::Lane(straight_lane(i as i64, 10, i as f32 * 10.)))
        .collect()
}

fn centers_at(points: &[[f32; 2]], yaw: f32) -> Array2<f32> {
    Array2::from_shape_fn((points.len(), 6), |(i, j)| match j {
        0 => points[i][0],
        1 => points[i][1],
        4 => yaw,
        _ => 0.,
    })
}

fn temp_path(name: &str) -> String {
    let mut dir = temp_dir();
    dir.push(format!("v2xmap_{}_{}.csv", name, std::process::id()));
    dir.to_str().unwrap().to_string()
}

#[test]
fn driving_lane_scenario_is_broadcast() {
    let polyline = (0..25).map(|i| MapPoint::new(i as f32, 0., 0.)).collect();
    let boundary = (0..12).map(|i| MapPoint::new(i as f32, 3., 0.)).collect();
    let features = vec![MapFeature::Lane(
        Lane::new(1, LaneType::Driving, polyline).with_boundary(boundary),
    )];
    let local_centers = centers_at(&[[0., 0.], [50., -20.]], 0.);

    let result = center_map(&features, local_centers.view(), None, &MapParameters::default()).unwrap();

    assert_eq!(result.map_polylines.shape(), &[2, 4, 10, 7]);
    assert_eq!(result.map_polylines_mask.index_axis(Axis(0), 0), result.map_polylines_mask.index_axis(Axis(0), 1));
    let counts: Vec<usize> = result
        .map_polylines_mask
        .index_axis(Axis(0), 0)
        .outer_iter()
        .map(|mask| mask.iter().filter(|valid| **valid).count())
        .collect();
    assert_eq!(counts, vec![10, 10, 5, 10]);

    // second object sees the same points shifted by its position
    let first = result.map_polylines.slice(s![0, 1, .., 0..2]).to_owned();
    let second = result.map_polylines.slice(s![1, 1, .., 0..2]).to_owned();
    close_l1(&(second - arr2(&[[-50., 20.]])), &first, 1e-4);
}

#[test]
fn nearest_lanes_are_selected_and_centered() {
    let features = stacked_lanes(8);
    let local_centers = centers_at(&[[4.5, 0.], [4.5, 70.]], 0.);

    let result = center_map(&features, local_centers.view(), None, &MapParameters::default()).unwrap();

    assert_eq!(result.map_polylines.shape(), &[2, 5, 10, 7]);
    let expected_first = arr2(&[[0., 0.], [0., 10.], [0., 20.], [0., 30.], [0., 40.]]);
    let expected_second = arr2(&[[0., 0.], [0., -10.], [0., -20.], [0., -30.], [0., -40.]]);
    let first = result.map_polylines_center.index_axis(Axis(0), 0).to_owned();
    let second = result.map_polylines_center.index_axis(Axis(0), 1).to_owned();
    assert!((first - expected_first).iter().all(|d| d.abs() < 1e-4));
    assert!((second - expected_second).iter().all(|d| d.abs() < 1e-4));
}

#[test]
fn offset_poses_move_the_query_point() {
    let features = stacked_lanes(8);
    let local_centers = centers_at(&[[4.5, 0.]], 0.);
    let offsets = arr2(&[[0., 30., 0.]]);

    let result = center_map(
        &features,
        local_centers.view(),
        Some(ObjectLocalPoses::Offsets(offsets.view())),
        &MapParameters::default(),
    )
    .unwrap();

    // the object now sits on lane 3
    assert!(result.map_polylines_center.slice(s![0, 0, ..]).iter().all(|d| d.abs() < 1e-4));
    assert!(result.map_polylines[[0, 0, 0, 1]].abs() < 1e-4);
    assert!((result.map_polylines_center[[0, 1, 1]].abs() - 10.).abs() < 1e-4);
}

#[test]
fn concurrent_calls_are_independent() {
    let features = stacked_lanes(12);
    let parameters = MapParameters {
        brute_force_max_segments: 4,
        ..Default::default()
    };
    let centers: Vec<Array2<f32>> = (0..16)
        .map(|i| centers_at(&[[i as f32, i as f32 * 7.], [-(i as f32), 3.]], i as f32 * 20.))
        .collect();

    let sequential: Vec<_> = centers
        .iter()
        .map(|c| center_map(&features, c.view(), None, &parameters).unwrap())
        .collect();
    let parallel: Vec<_> = (0..centers.len())
        .into_par_iter()
        .map(|i| center_map(&features, centers[i].view(), None, &parameters).unwrap())
        .collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn rejects_invalid_parameters() {
    let features = stacked_lanes(2);
    let local_centers = centers_at(&[[0., 0.]], 0.);
    let parameters = MapParameters {
        points_per_segment: 0,
        ..Default::default()
    };
    assert!(center_map(&features, local_centers.view(), None, &parameters).is_err());
}

fn write_map_csv(path: &str) {
    let mut content = String::from("feature_id,feature,type,part,x,y,z\n");
    for lane in 0..7 {
        for point in 0..10 {
            content.push_str(&format!("{},lane,2,polyline,{},{},0\n", lane, point, lane * 10));
        }
    }
    content.push_str("100,crosswalk,,polygon,0,0,0\n");
    fs::write(path, content).unwrap();
}

#[test]
fn cli_decode_writes_all_points() {
    let map_path = temp_path("cli_decode_map");
    let output_path = temp_path("cli_decode_output");
    write_map_csv(&map_path);

    let params = Parameters {
        command: Command::Decode {
            map_path: map_path.clone(),
            output_path: output_path.clone(),
        },
        map: MapParameters::default(),
    };
    v2xmap(params).unwrap();

    let written = fs::read_to_string(&output_path).unwrap();
    fs::remove_file(&map_path).unwrap();
    fs::remove_file(&output_path).unwrap();
    assert_eq!(written.lines().count(), 7 * 10);
    assert!(written.lines().all(|line| line.split(',').count() == 10));
}

#[test]
fn cli_project_writes_polylines_and_centroids() {
    let map_path = temp_path("cli_project_map");
    let centers_path = temp_path("cli_project_centers");
    let poses_path = temp_path("cli_project_poses");
    let output_path = temp_path("cli_project_output");
    let center_output_path = temp_path("cli_project_centroids");
    write_map_csv(&map_path);
    fs::write(&centers_path, "x,y,z,roll,yaw,pitch\n4.5,0,0,0,0,0\n4.5,60,0,0,180,0\n").unwrap();
    fs::write(&poses_path, "x,y,z\n0,0,0\n0,0,0\n").unwrap();

    let params = Parameters {
        command: Command::Project {
            map_path: map_path.clone(),
            centers_path: centers_path.clone(),
            poses_path: Some(poses_path.clone()),
            output_path: output_path.clone(),
            center_output_path: Some(center_output_path.clone()),
        },
        map: MapParameters::default(),
    };
    v2xmap(params).unwrap();

    let polylines = fs::read_to_string(&output_path).unwrap();
    let centroids = fs::read_to_string(&center_output_path).unwrap();
    for path in [&map_path, &centers_path, &poses_path, &output_path, &center_output_path].iter() {
        fs::remove_file(path).unwrap();
    }

    assert_eq!(polylines.lines().count(), 2 * 5 * 10);
    assert!(polylines.lines().all(|line| line.split(',').count() == 11));
    assert_eq!(centroids.lines().count(), 2 * 5);
    assert!(centroids.lines().next().unwrap().starts_with("0,0,"));
}

#[test]
fn cli_reports_missing_files() {
    let params = Parameters {
        command: Command::Decode {
            map_path: "/nonexistent/v2xmap/map.csv".to_string(),
            output_path: temp_path("cli_missing_output"),
        },
        map: MapParameters::default(),
    };
    assert!(v2xmap(params).is_err());
}

#[test]
fn decoding_is_shared_between_entry_points() {
    let features = stacked_lanes(3);
    let map_infos = decode_map_features(&features, &MapParameters::default());
    let local_centers = centers_at(&[[0., 0.]], 0.);
    let result = center_map(&features, local_centers.view(), None, &MapParameters::default()).unwrap();

    // with fewer segments than requested, the decoded order is kept
    assert_eq!(result.n_selected(), map_infos.len());
    close_l1(
        &result.map_polylines.slice(s![0, 2, .., 1]).to_owned(),
        &map_infos.polylines.slice(s![2, .., 1]).to_owned(),
        1e-6,
    );
}
