use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use flowbox::FlowboxError;
use flowbox_cli::{Args, run};

fn demos_dir() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .toml files from a directory
fn collect_toml_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args(input: &Path, events: Option<&Path>, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        events: events.map(|path| path.to_string_lossy().to_string()),
        output: output.to_string_lossy().to_string(),
        config: Some(demos_dir().join("config.toml").to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_dir();
    let models = collect_toml_files(&demos.join("models"));

    assert!(!models.is_empty(), "No demo models found in demos/models");

    let mut failed = Vec::new();
    for model in &models {
        let name = model.file_name().unwrap();
        let events = demos.join("events").join(name);
        let events = events.exists().then_some(events);
        let output = temp_dir
            .path()
            .join(format!("{}.svg", model.file_stem().unwrap().to_string_lossy()));

        match run(&args(model, events.as_deref(), &output)) {
            Ok(()) => {
                let svg = fs::read_to_string(&output).expect("snapshot written");
                if !svg.starts_with("<svg") {
                    failed.push((model.clone(), "output is not an SVG document".to_string()));
                }
            }
            Err(err) => failed.push((model.clone(), err.to_string())),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_order_script_edits_the_diagram() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_dir();
    let output = temp_dir.path().join("order.svg");

    run(&args(
        &demos.join("models/order.toml"),
        Some(&demos.join("events/order.toml")),
        &output,
    ))
    .expect("order demo runs");

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("Start"));
    assert!(!svg.contains("Order"));
    assert!(svg.contains("Done"));
    assert!(!svg.contains("Reject"));
}

#[test]
fn e2e_palette_script_inserts_template() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_dir();
    let output = temp_dir.path().join("palette.svg");

    run(&args(
        &demos.join("models/palette.toml"),
        Some(&demos.join("events/palette.toml")),
        &output,
    ))
    .expect("palette demo runs");

    let svg = fs::read_to_string(&output).unwrap();
    // One label on the palette, one in the diagram.
    assert_eq!(svg.matches("Invoke").count(), 2);
}

#[test]
fn e2e_unknown_node_type_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let model = temp_dir.path().join("bad.toml");
    fs::write(&model, "[[nodes]]\ntype = \"loop\"\n").unwrap();

    let err = run(&args(&model, None, &temp_dir.path().join("bad.svg"))).unwrap_err();

    assert!(matches!(err, FlowboxError::Config(_)));
}

#[test]
fn e2e_leaf_with_children_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let model = temp_dir.path().join("leaf.toml");
    fs::write(
        &model,
        "[[nodes]]\ntype = \"reply\"\n\n[[nodes.children]]\ntype = \"invoke\"\n",
    )
    .unwrap();

    let err = run(&args(&model, None, &temp_dir.path().join("leaf.svg"))).unwrap_err();

    assert!(matches!(err, FlowboxError::Model(_)));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let err = run(&args(
        &temp_dir.path().join("missing.toml"),
        None,
        &temp_dir.path().join("out.svg"),
    ))
    .unwrap_err();

    assert!(matches!(err, FlowboxError::Io(_)));
}
