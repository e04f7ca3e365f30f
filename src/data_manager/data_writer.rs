use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::*;
use ndarray::{Axis, Zip};
use serde::Serialize;
use std::fs::File;

use crate::map::{CenterMap, MapInfos};
use crate::utils::logging::MapProgressBar;

#[derive(Serialize)]
struct DecodedPointRow {
    segment: usize,
    point: usize,
    valid: u8,
    x: f32,
    y: f32,
    z: f32,
    dir_x: f32,
    dir_y: f32,
    dir_z: f32,
    global_type: f32,
}

#[derive(Serialize)]
struct ProjectedPointRow {
    object: usize,
    segment: usize,
    point: usize,
    valid: u8,
    x: f32,
    y: f32,
    dir_x: f32,
    dir_y: f32,
    global_type: f32,
    pre_x: f32,
    pre_y: f32,
}

#[derive(Serialize)]
struct CentroidRow {
    object: usize,
    segment: usize,
    x: f32,
    y: f32,
}

fn open_writer(file_path: &str) -> Result<csv::Writer<File>> {
    let file = File::create(file_path).with_context(|| format!("Could not create {}", file_path))?;
    Ok(WriterBuilder::new().has_headers(false).from_writer(file))
}

/// Writes one row per point: `segment,point,valid,x,y,z,dir_x,dir_y,dir_z,type`.
pub fn write_map_infos(map_infos: &MapInfos, file_path: &str) -> Result<()> {
    let mut writer = open_writer(file_path)?;
    let progress_bar = MapProgressBar::new_from_len("debug", map_infos.len());

    for (segment, (polyline, mask)) in map_infos
        .polylines
        .outer_iter()
        .zip(map_infos.polylines_mask.outer_iter())
        .enumerate()
    {
        for (point, (p, valid)) in polyline.outer_iter().zip(mask.iter()).enumerate() {
            writer.serialize(DecodedPointRow {
                segment,
                point,
                valid: *valid as u8,
                x: p[0],
                y: p[1],
                z: p[2],
                dir_x: p[3],
                dir_y: p[4],
                dir_z: p[5],
                global_type: p[6],
            })?;
        }
        progress_bar.inc();
    }
    writer.flush()?;
    progress_bar.finish_and_clear();

    debug!("Wrote {} decoded segments to {}", map_infos.len(), file_path);
    Ok(())
}

/// Writes one row per point and object:
/// `object,segment,point,valid,x,y,dir_x,dir_y,type,pre_x,pre_y`.
pub fn write_center_map(center_map: &CenterMap, file_path: &str) -> Result<()> {
    let mut writer = open_writer(file_path)?;
    let progress_bar = MapProgressBar::new_from_len("debug", center_map.n_objects());

    for (object, (polylines, masks)) in center_map
        .map_polylines
        .outer_iter()
        .zip(center_map.map_polylines_mask.outer_iter())
        .enumerate()
    {
        for (segment, (polyline, mask)) in polylines.outer_iter().zip(masks.outer_iter()).enumerate() {
            for (point, (p, valid)) in polyline.outer_iter().zip(mask.iter()).enumerate() {
                writer.serialize(ProjectedPointRow {
                    object,
                    segment,
                    point,
                    valid: *valid as u8,
                    x: p[0],
                    y: p[1],
                    dir_x: p[2],
                    dir_y: p[3],
                    global_type: p[4],
                    pre_x: p[5],
                    pre_y: p[6],
                })?;
            }
        }
        progress_bar.inc();
    }
    writer.flush()?;
    progress_bar.finish_and_clear();

    debug!(
        "Wrote {} segments for {} objects to {}",
        center_map.n_selected(),
        center_map.n_objects(),
        file_path
    );
    Ok(())
}

/// Writes the segment centroids of every object: `object,segment,x,y`.
pub fn write_centroids(center_map: &CenterMap, file_path: &str) -> Result<()> {
    let mut writer = open_writer(file_path)?;
    let mut rows = vec![];
    Zip::indexed(center_map.map_polylines_center.lanes(Axis(2))).for_each(|(object, segment), centroid| {
        rows.push(CentroidRow {
            object,
            segment,
            x: centroid[0],
            y: centroid[1],
        })
    });
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
