use log::*;
use structopt::StructOpt;

use env_logger::Env;
use std::io::Write;
use v2xmap::{v2xmap, Parameters};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{} [V2XMap]: {}", record.level(), record.args()))
        .init();

    let params: Parameters = Parameters::from_args();
    debug!("Parameters: {:?}", params);

    if let Err(e) = v2xmap(params) {
        error!("{:?}", e);
        std::process::exit(1);
    }
}
