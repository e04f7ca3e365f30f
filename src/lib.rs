use anyhow::Result;
use log::*;
use ndarray::ArrayView2;
use std::convert::TryFrom;

pub use crate::map::{
    decode_map_features, generate_center_map, CenterMap, MapFeature, MapInfos, ObjectLocalPoses,
};
pub use crate::parameters::{Command, MapParameters, Parameters};

use crate::data_manager::{read_array, read_map_features, write_center_map, write_centroids, write_map_infos};
use crate::utils::logging::ConsoleLogger;

pub mod data_manager;
pub mod map;
mod parameters;
#[cfg(test)]
mod tests;
pub mod utils;

#[cfg(feature = "python")]
mod python_binding;

/// Decodes `features` and projects the nearest segments into the frame of every object.
pub fn center_map(
    features: &[MapFeature],
    local_centers: ArrayView2<f32>,
    object_local_poses: Option<ObjectLocalPoses>,
    parameters: &MapParameters,
) -> Result<CenterMap> {
    parameters.validate()?;
    let map_infos = decode_map_features(features, parameters);
    generate_center_map(&map_infos, local_centers, object_local_poses, parameters)
}

/// Runs one CLI command from reading the input files to writing the outputs.
pub fn v2xmap(params: Parameters) -> Result<()> {
    params.map.validate()?;

    match &params.command {
        Command::Decode { map_path, output_path } => {
            let mut steps = ConsoleLogger::new(2);
            steps.step("Reading map features");
            let features = read_map_features(map_path)?;

            steps.step("Decoding map features");
            let map_infos = decode_map_features(&features, &params.map);
            write_map_infos(&map_infos, output_path)?;
            info!("Wrote {} segments to {}", map_infos.len(), output_path);
        }
        Command::Project {
            map_path,
            centers_path,
            poses_path,
            output_path,
            center_output_path,
        } => {
            let mut steps = ConsoleLogger::new(3);
            steps.step("Reading map features");
            let features = read_map_features(map_path)?;
            let local_centers = read_array(centers_path)?;
            let poses = match poses_path {
                Some(path) => Some(read_array(path)?),
                None => None,
            };

            steps.step("Decoding map features");
            let map_infos = decode_map_features(&features, &params.map);

            steps.step("Projecting map segments");
            let object_local_poses = match &poses {
                Some(poses) => Some(ObjectLocalPoses::try_from(poses.view())?),
                None => None,
            };
            let center_map = generate_center_map(&map_infos, local_centers.view(), object_local_poses, &params.map)?;

            write_center_map(&center_map, output_path)?;
            if let Some(path) = center_output_path {
                write_centroids(&center_map, path)?;
            }
            info!(
                "Wrote {} segments for each of {} objects to {}",
                center_map.n_selected(),
                center_map.n_objects(),
                output_path
            );
        }
    }

    Ok(())
}
