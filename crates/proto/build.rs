//! Build script for roster-proto.
//!
//! Compiles protobuf definitions into Rust code using tonic-prost-build.
//! When the proto files or `protoc` aren't available (e.g. crates.io builds
//! or minimal CI images), pre-generated code from src/generated/ is used
//! instead.

use std::path::Path;
use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Declare custom cfg for conditional compilation
    println!("cargo::rustc-check-cfg=cfg(use_pregenerated_proto)");

    let proto_path = Path::new("../../proto/roster/v1/roster.proto");

    if proto_path.exists() && protoc_available() {
        println!("cargo::rerun-if-changed=../../proto/roster/v1/roster.proto");

        tonic_prost_build::configure()
            .build_server(true)
            .build_client(true)
            .emit_rerun_if_changed(true)
            .compile_protos(&["../../proto/roster/v1/roster.proto"], &["../../proto"])?;
    } else {
        // Signal that we're using pre-generated code
        println!("cargo::rustc-cfg=use_pregenerated_proto");
    }

    Ok(())
}

/// Checks whether a protobuf compiler can be invoked.
///
/// Honors the `PROTOC` override that prost-build itself respects.
fn protoc_available() -> bool {
    let protoc = std::env::var_os("PROTOC").unwrap_or_else(|| "protoc".into());
    Command::new(protoc).arg("--version").output().is_ok()
}
