/// Generates the gRPC client and server bindings for `ecommerce.proto` and
/// `helloworld.proto` using `tonic-prost-build`.
///
/// # Serde on `Order`
///
/// `ecommerce.Order` derives `serde::Serialize`/`serde::Deserialize` with
/// `#[serde(default)]`, so seed files only need the fields they care about.
/// Nothing else in the schema is serde-enabled.
///
/// # Files and Paths
///
/// - Proto files: `proto/ecommerce.proto`, `proto/helloworld.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/ordermgt_descriptor.bin` (served by reflection)
///
/// # Panics
///
/// Panics if code generation fails, which fails the build.
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("ordermgt_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .type_attribute(
            ".ecommerce.Order",
            "#[derive(serde::Serialize, serde::Deserialize)]",
        )
        .type_attribute(".ecommerce.Order", "#[serde(default)]")
        .compile_with_config(
            config,
            &["proto/ecommerce.proto", "proto/helloworld.proto"],
            &["proto"],
        )
        .unwrap();
}
