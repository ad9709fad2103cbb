// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource Schema Generator
//!
//! Generates JSON schema files from the managed models defined in src/models/.
//! This ensures the files in docs/schemas/ are always in sync with the Rust code.
//!
//! Usage:
//!   cargo run --bin schemagen [OUTPUT_DIR]
//!
//! One file per resource type is written, named `<resource_type>.schema.json`.

use nios_dns::resources::resource_schemas;
use serde_json::Value;
use std::fs;
use std::path::Path;

const DEFAULT_OUTPUT_DIR: &str = "docs/schemas";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let output_dir = Path::new(&output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    println!("Generating resource schemas from src/models/...");

    for (resource_type, schema) in resource_schemas() {
        write_schema(resource_type, &schema, output_dir)?;
    }

    println!("✓ Successfully generated schemas in {}", output_dir.display());

    Ok(())
}

fn write_schema(
    resource_type: &str,
    schema: &Value,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut schema = schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.insert(
            "$comment".to_string(),
            Value::String(
                "AUTO-GENERATED from src/models/. Run `cargo run --bin schemagen` to regenerate."
                    .to_string(),
            ),
        );
    }

    let filename = format!("{resource_type}.schema.json");
    let output_path = output_dir.join(&filename);
    fs::write(&output_path, serde_json::to_string_pretty(&schema)? + "\n")?;

    println!("  ✓ Generated {filename}");

    Ok(())
}
