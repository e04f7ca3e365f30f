use ndarray::arr2;
use ndarray_linalg::close_l1;
use std::fs;
use std::path::PathBuf;

use crate::data_manager::data_reader::{read_array, read_map_features};
use crate::map::types::*;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("v2xmap_reader_{}_{}.csv", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_read_map_features() {
    let path = write_temp(
        "map",
        "feature_id,feature,type,part,x,y,z,road_id
7,lane,1,polyline,0,0,0,3
2,crosswalk,,polygon,5,5,0,
7,lane,1,polyline,1,0,0,3
7,lane,1,boundary,0,2,0,3
9,road_line,solid,polyline,0,-1,0,
9,road_line,solid,polyline,1,-1,0,
4,walk_button,,position,2,3,0,
",
    );
    let features = read_map_features(path.to_str().unwrap()).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(features.len(), 4);
    let expected_lane = Lane {
        road_id: 3,
        lane_id: 7,
        lane_type: LaneType::Driving,
        polyline: vec![MapPoint::new(0., 0., 0.), MapPoint::new(1., 0., 0.)],
        entry_lanes: vec![],
        exit_lanes: vec![],
        boundary: Some(vec![MapPoint::new(0., 2., 0.)]),
    };
    assert_eq!(features[0], MapFeature::Lane(expected_lane));
    assert_eq!(
        features[1],
        MapFeature::Crosswalk(Crosswalk { id: 2, polygon: vec![MapPoint::new(5., 5., 0.)] })
    );
    match &features[2] {
        MapFeature::RoadLine(line) => {
            assert_eq!(line.line_type, "solid");
            assert_eq!(line.polyline.len(), 2);
        }
        other => panic!("Expected a road line, got {:?}", other),
    }
    assert_eq!(
        features[3],
        MapFeature::WalkButton(WalkButton { id: 4, position: MapPoint::new(2., 3., 0.) })
    );
}

#[test]
fn test_road_id_column_is_optional() {
    let path = write_temp(
        "no_road_id",
        "feature_id,feature,type,part,x,y,z
1,lane,2,polyline,0,0,0
1,lane,2,polyline,0,1,0
",
    );
    let features = read_map_features(path.to_str().unwrap()).unwrap();
    fs::remove_file(&path).unwrap();

    match &features[0] {
        MapFeature::Lane(lane) => {
            assert_eq!(lane.road_id, 0);
            assert_eq!(lane.lane_type, LaneType::Sidewalk);
            assert!(lane.boundary.is_none());
        }
        other => panic!("Expected a lane, got {:?}", other),
    }
}

#[test]
fn test_rejects_malformed_map() {
    let unknown_part = write_temp("unknown_part", "feature_id,feature,type,part,x,y,z\n1,lane,1,outline,0,0,0\n");
    let unknown_lane_type = write_temp("unknown_type", "feature_id,feature,type,part,x,y,z\n1,lane,8,polyline,0,0,0\n");
    let mixed = write_temp(
        "mixed",
        "feature_id,feature,type,part,x,y,z\n1,lane,1,polyline,0,0,0\n1,crosswalk,,polygon,0,0,0\n",
    );

    for path in [unknown_part, unknown_lane_type, mixed].iter() {
        let result = read_map_features(path.to_str().unwrap());
        fs::remove_file(path).unwrap();
        let message = format!("{:?}", result.unwrap_err());
        assert!(message.contains(path.to_str().unwrap()), "{}", message);
    }

    assert!(read_map_features("/nonexistent/v2xmap/map.csv").is_err());
}

#[test]
fn test_read_array() {
    let path = write_temp("array", "x,y,z,roll,yaw,pitch\n1,2,0,0,90,0\n-3.5,4,1,0,0,0\n");
    let array = read_array(path.to_str().unwrap()).unwrap();
    fs::remove_file(&path).unwrap();

    let expected = arr2(&[[1., 2., 0., 0., 90., 0.], [-3.5, 4., 1., 0., 0., 0.]]);
    close_l1(&array, &expected, 1e-6);
}

#[test]
fn test_read_array_rejects_text() {
    let path = write_temp("text_array", "x,y,z\n1,two,3\n");
    let result = read_array(path.to_str().unwrap());
    fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
