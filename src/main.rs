//! Directory is a microservice responsible for business profiles and their taxonomy.
//! This create is for running the service from `directory_lib`. See `directory_lib` for details.

extern crate directory_lib;
extern crate env_logger;

fn main() {
    let config = directory_lib::config::Config::new().expect("Can't load app config!");

    // Prepare logger
    env_logger::init();

    directory_lib::start_server(config, &None, || ());
}
