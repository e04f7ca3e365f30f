pub mod center_map;
pub mod decoder;
pub mod types;

pub use center_map::{generate_center_map, CenterMap, ObjectLocalPoses};
pub use decoder::{decode_map_features, MapInfos};
pub use types::*;
