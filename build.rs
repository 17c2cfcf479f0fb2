// build.rs

use std::env;

fn main() {
    // Compile-time defaults, overridable from the build environment.
    let host = env::var("SENSOR_HOST").unwrap_or_else(|_| "192.168.1.100".into());
    let port = env::var("SENSOR_PORT").unwrap_or_else(|_| "80".into());
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| ".tempmon".into());

    println!("cargo:rustc-env=SENSOR_HOST={host}");
    println!("cargo:rustc-env=SENSOR_PORT={port}");
    println!("cargo:rustc-env=DATA_DIR={data_dir}");

    println!("cargo:rerun-if-env-changed=SENSOR_HOST");
    println!("cargo:rerun-if-env-changed=SENSOR_PORT");
    println!("cargo:rerun-if-env-changed=DATA_DIR");
}

// EOF
