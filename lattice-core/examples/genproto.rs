//! Generate updated proto code for the management plane.
//!
//! This is setup as an example instead of as part of the build.rs because the
//! protocode ships along with the crate and must not require protoc at build
//! time.

use anyhow::{Context, Result};

fn main() -> Result<()> {
    // Build the lattice.proto code.
    tonic_build::configure()
        .out_dir("src/idl")
        .build_client(true)
        .build_server(true)
        .compile(&["../proto/lattice.proto"], &["../proto"])
        .context("error compiling lattice proto")?;

    Ok(())
}
