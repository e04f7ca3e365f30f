use anyhow::{ensure, Result};
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "Command")]
pub enum Command {
    /// Segments the map features into fixed-size polyline tokens
    #[structopt(name = "decode")]
    Decode {
        #[structopt(short = "m", long = "map-path")]
        map_path: String,

        #[structopt(short = "o", long = "output-path")]
        output_path: String,
    },

    /// Projects the nearest map segments into every object's local frame
    #[structopt(name = "project")]
    Project {
        #[structopt(short = "m", long = "map-path")]
        map_path: String,

        #[structopt(short = "c", long = "centers-path")]
        centers_path: String,

        #[structopt(short = "p", long = "poses-path")]
        poses_path: Option<String>,

        #[structopt(short = "o", long = "output-path")]
        output_path: String,

        #[structopt(long = "center-output-path")]
        center_output_path: Option<String>,
    },
}

#[derive(StructOpt, Debug, Clone, PartialEq)]
pub struct MapParameters {
    /// Number of map segments kept per object
    #[structopt(long = "src-polylines-num", default_value = "5")]
    pub src_polylines_num: usize,

    #[structopt(long = "points-per-segment", default_value = "10")]
    pub points_per_segment: usize,

    /// Global type code written into the segments of driving-lane boundaries
    #[structopt(long = "boundary-type", default_value = "5")]
    pub boundary_type: i32,

    /// Up to this many segments the nearest segments are ranked exhaustively instead of via a KD-tree
    #[structopt(long = "brute-force-max-segments", default_value = "128")]
    pub brute_force_max_segments: usize,
}

impl Default for MapParameters {
    fn default() -> Self {
        Self {
            src_polylines_num: 5,
            points_per_segment: 10,
            boundary_type: 5,
            brute_force_max_segments: 128,
        }
    }
}

impl MapParameters {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.points_per_segment > 0, "points_per_segment must be positive");
        ensure!(self.src_polylines_num > 0, "src_polylines_num must be positive");
        Ok(())
    }

    /// Minimum number of real points a polyline chunk needs to be kept.
    pub(crate) fn is_long_enough(&self, n_points: usize) -> bool {
        2 * n_points >= self.points_per_segment
    }
}

#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "v2xmap")]
pub struct Parameters {
    #[structopt(subcommand)]
    pub command: Command,

    #[structopt(flatten)]
    pub map: MapParameters,
}
