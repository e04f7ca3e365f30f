pub mod data_reader;
mod data_writer;

pub use data_reader::{read_array, read_map_features};
pub use data_writer::{write_center_map, write_centroids, write_map_infos};
