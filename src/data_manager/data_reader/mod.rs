#[cfg(test)]
mod tests;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use indexmap::IndexMap;
use log::*;
use ndarray::prelude::*;
use serde::Deserialize;
use std::convert::TryFrom;
use std::fs::File;
use std::str::FromStr;

use crate::map::types::{Crosswalk, Lane, LaneType, MapFeature, MapPoint, RoadLine, WalkButton};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FeatureKind {
    Lane,
    Crosswalk,
    RoadLine,
    WalkButton,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FeaturePart {
    Polyline,
    Boundary,
    Polygon,
    Position,
}

/// One row of a map file, i.e. one point of one feature.
#[derive(Debug, Deserialize)]
struct MapRecord {
    feature_id: i64,
    feature: FeatureKind,
    /// lane type code for lanes, line type for road lines
    #[serde(rename = "type")]
    feature_type: String,
    part: FeaturePart,
    x: f32,
    y: f32,
    z: f32,
    #[serde(default)]
    road_id: Option<i64>,
}

impl MapRecord {
    fn point(&self) -> MapPoint {
        MapPoint::new(self.x, self.y, self.z)
    }
}

fn points_of(records: &[MapRecord], part: FeaturePart) -> Vec<MapPoint> {
    records.iter().filter(|r| r.part == part).map(MapRecord::point).collect()
}

fn build_feature(feature_id: i64, records: Vec<MapRecord>) -> Result<MapFeature> {
    let kind = records[0].feature;
    if let Some(other) = records.iter().find(|r| r.feature != kind) {
        bail!("Feature {} mixes {:?} and {:?} rows", feature_id, kind, other.feature);
    }

    let feature = match kind {
        FeatureKind::Lane => {
            let code = i32::from_str(&records[0].feature_type)
                .with_context(|| format!("Lane {} has no integer lane type", feature_id))?;
            let boundary = points_of(&records, FeaturePart::Boundary);
            MapFeature::Lane(Lane {
                road_id: records[0].road_id.unwrap_or_default(),
                lane_id: feature_id,
                lane_type: LaneType::try_from(code)?,
                polyline: points_of(&records, FeaturePart::Polyline),
                entry_lanes: vec![],
                exit_lanes: vec![],
                boundary: if boundary.is_empty() { None } else { Some(boundary) },
            })
        }
        FeatureKind::Crosswalk => MapFeature::Crosswalk(Crosswalk {
            id: feature_id,
            polygon: points_of(&records, FeaturePart::Polygon),
        }),
        FeatureKind::RoadLine => MapFeature::RoadLine(RoadLine {
            id: feature_id,
            line_type: records[0].feature_type.clone(),
            polyline: points_of(&records, FeaturePart::Polyline),
        }),
        FeatureKind::WalkButton => {
            let position = records
                .iter()
                .find(|r| r.part == FeaturePart::Position)
                .unwrap_or(&records[0])
                .point();
            MapFeature::WalkButton(WalkButton { id: feature_id, position })
        }
    };
    Ok(feature)
}

/// Reads map features from a CSV file with one point per row.
///
/// Rows sharing a `feature_id` form one feature; features keep the order of their first row.
pub fn read_map_features(file_path: &str) -> Result<Vec<MapFeature>> {
    let file = File::open(file_path).with_context(|| format!("Could not open map file {}", file_path))?;
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(file);

    let mut grouped: IndexMap<i64, Vec<MapRecord>> = IndexMap::new();
    for (line, record) in reader.deserialize::<MapRecord>().enumerate() {
        let record = record.with_context(|| format!("Malformed row {} in map file {}", line + 1, file_path))?;
        grouped.entry(record.feature_id).or_insert_with(Vec::new).push(record);
    }

    let features = grouped
        .into_iter()
        .map(|(feature_id, records)| build_feature(feature_id, records))
        .collect::<Result<Vec<MapFeature>>>()
        .with_context(|| format!("Invalid feature in map file {}", file_path))?;

    debug!("Read {} map features from {}", features.len(), file_path);
    Ok(features)
}

/// Reads a CSV file with a header row and float values into an (rows, columns) array.
pub fn read_array(file_path: &str) -> Result<Array2<f32>> {
    let file = File::open(file_path).with_context(|| format!("Could not open {}", file_path))?;
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(file);
    let n_columns = reader.headers()?.len();

    let mut flat_data: Vec<f32> = vec![];
    let mut n_rows = 0;
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed row {} in {}", n_rows + 1, file_path))?;
        for value in record.iter() {
            flat_data.push(
                f32::from_str(value)
                    .with_context(|| format!("'{}' in row {} of {} is not a number", value, n_rows + 1, file_path))?,
            );
        }
        n_rows += 1;
    }

    let array = Array2::from_shape_vec((n_rows, n_columns), flat_data)?;
    debug!("Read array of shape {:?} from {}", array.shape(), file_path);
    Ok(array)
}
