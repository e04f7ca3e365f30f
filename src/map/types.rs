use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MapPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficSignalLaneState {
    pub lane: i64,
    pub state: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicState {
    pub timestamp_seconds: f64,
    pub lane_states: Vec<TrafficSignalLaneState>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum LaneType {
    Unknown = 0,
    Driving = 1,
    Sidewalk = 2,
    Shoulder = 3,
    ParkingLane = 4,
}

impl LaneType {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for LaneType {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Driving),
            2 => Ok(Self::Sidewalk),
            3 => Ok(Self::Shoulder),
            4 => Ok(Self::ParkingLane),
            _ => Err(Error::msg(format!("Unknown lane type code {}", code))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalkButton {
    pub id: i64,
    pub position: MapPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub road_id: i64,
    pub lane_id: i64,
    pub lane_type: LaneType,
    /// centerline
    pub polyline: Vec<MapPoint>,
    pub entry_lanes: Vec<String>,
    pub exit_lanes: Vec<String>,
    /// only set for driving lanes
    pub boundary: Option<Vec<MapPoint>>,
}

impl Lane {
    pub fn new(lane_id: i64, lane_type: LaneType, polyline: Vec<MapPoint>) -> Self {
        Self {
            road_id: 0,
            lane_id,
            lane_type,
            polyline,
            entry_lanes: vec![],
            exit_lanes: vec![],
            boundary: None,
        }
    }

    pub fn with_boundary(mut self, boundary: Vec<MapPoint>) -> Self {
        self.boundary = Some(boundary);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crosswalk {
    pub id: i64,
    pub polygon: Vec<MapPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadLine {
    pub id: i64,
    pub line_type: String,
    pub polyline: Vec<MapPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum MapFeature {
    Lane(Lane),
    Crosswalk(Crosswalk),
    RoadLine(RoadLine),
    WalkButton(WalkButton),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub map_features: Vec<MapFeature>,
    pub dynamic_states: Option<Vec<DynamicState>>,
}

impl Map {
    pub fn new(map_features: Vec<MapFeature>) -> Self {
        Self {
            map_features,
            dynamic_states: None,
        }
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.map_features.iter().filter_map(|feature| match feature {
            MapFeature::Lane(lane) => Some(lane),
            _ => None,
        })
    }
}
