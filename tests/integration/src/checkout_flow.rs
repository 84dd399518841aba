//! End-to-end checkout scenarios against a real temp-dir workspace
//!
//! Each test lays out a manifest, a project directory and a common tree,
//! then drives the library the same way the CLI does.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use mpm_core::checkout::{self, CheckoutOptions, CheckoutOutcome};
use mpm_core::{Manifest, PathResolver, ProjectValues, RunContext};
use mpm_fs::io::read_text;

const MANIFEST: &str = r#"
secure_base_path = "."
project_root = "projects"
common_root = "common"
destination_root = "app"
project_config_file = "[project_path]/config[env].json"
project_config_destination = "[destination_root]/src/environments/config.json"
common_config_file = "[common_root]/common.config.json"
delete = ["[destination_root]/stale"]

[[simple]]
src = "[project_path]/custom.scss"
dest = "[destination_root]/src/custom.scss"

[[simple]]
src = "[project_path]/google-services[env].json"
dest = "[destination_root]/google-services.json"
kind = "copy"

[[modfile]]
src = "[common_root]/AndroidManifest.xml"
dest = "[destination_root]/AndroidManifest.xml"

[[modfile.rules]]
pattern = '(package=")[^"]*"'
generate = '${1}[_config:APP_ID]"'
placeholder = '${1}[app_id]"'

[[modfile]]
src = "[common_root]/verbatim.txt"
dest = "[destination_root]/verbatim.txt"
"#;

const TEMPLATE: &str = "package=\"[app_id]\"\n<body/>\n";

/// Workspace builder shared by the scenario tests.
struct TestWorkspace {
    temp: TempDir,
    manifest: Manifest,
    ctx: RunContext,
}

impl TestWorkspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();

        fs::create_dir_all(root.join("projects/demo")).unwrap();
        fs::create_dir_all(root.join("common")).unwrap();
        fs::create_dir_all(root.join("app")).unwrap();

        fs::write(
            root.join("projects/demo/config.json"),
            r#"{"APP_ID": "com.demo.app"}"#,
        )
        .unwrap();
        fs::write(root.join("projects/demo/custom.scss"), "body {}\n").unwrap();
        fs::write(root.join("projects/demo/google-services.json"), "{}\n").unwrap();
        fs::write(root.join("common/AndroidManifest.xml"), TEMPLATE).unwrap();
        fs::write(root.join("common/verbatim.txt"), "as-is\n").unwrap();
        fs::write(
            root.join("common/common.config.json"),
            r#"{"SHARED": "common-value"}"#,
        )
        .unwrap();

        let manifest = Manifest::parse(MANIFEST).unwrap();
        let ctx = RunContext::new(&root, "");
        Self { temp, manifest, ctx }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn checkout(&self, opts: CheckoutOptions) -> CheckoutOutcome {
        checkout::checkout(&self.manifest, &self.ctx, "demo", opts).unwrap()
    }

    fn read(&self, rel: &str) -> String {
        read_text(&self.path(rel)).unwrap()
    }

    /// Parse a JSON config file the same way the config store does.
    fn read_values(&self, rel: &str) -> ProjectValues {
        serde_json::from_str(&self.read(rel)).unwrap()
    }
}

#[test]
fn full_checkout_materializes_everything() {
    let ws = TestWorkspace::new();
    fs::create_dir_all(ws.path("app/stale")).unwrap();
    fs::write(ws.path("app/stale/junk.txt"), "junk").unwrap();

    let outcome = ws.checkout(CheckoutOptions::default());
    assert!(matches!(outcome, CheckoutOutcome::Completed));

    // delete list ran
    assert!(!ws.path("app/stale").exists());

    // mod file patched with the project value
    assert_eq!(
        ws.read("app/AndroidManifest.xml"),
        "package=\"com.demo.app\"\n<body/>\n"
    );

    // rule-less mod file copied verbatim
    assert_eq!(ws.read("app/verbatim.txt"), "as-is\n");

    // simple rules: linked and copied
    assert_eq!(ws.read("app/src/custom.scss"), "body {}\n");
    assert_eq!(ws.read("app/google-services.json"), "{}\n");
    #[cfg(unix)]
    assert!(
        ws.path("app/src/custom.scss")
            .symlink_metadata()
            .unwrap()
            .is_symlink()
    );

    // project config placed at its destination, still valid JSON
    let values = ws.read_values("app/src/environments/config.json");
    assert_eq!(values["APP_ID"], "com.demo.app");
}

#[test]
fn qcheckout_is_idempotent() {
    let ws = TestWorkspace::new();

    ws.checkout(CheckoutOptions::quick(false));
    let first = ws.read("app/AndroidManifest.xml");

    ws.checkout(CheckoutOptions::quick(false));
    assert_eq!(ws.read("app/AndroidManifest.xml"), first);
    assert_eq!(ws.read("app/src/custom.scss"), "body {}\n");
}

#[test]
fn hand_edit_halts_checkout_and_leaves_the_tree_alone() {
    let ws = TestWorkspace::new();
    ws.checkout(CheckoutOptions::quick(false));

    let edited = "package=\"com.demo.app\"\n<body/>\n<!-- local tweak -->\n";
    fs::write(ws.path("app/AndroidManifest.xml"), edited).unwrap();
    fs::write(ws.path("app/marker.txt"), "untouched").unwrap();

    let outcome = ws.checkout(CheckoutOptions::default());
    let report = match outcome {
        CheckoutOutcome::HaltedOnDiff(report) => report,
        CheckoutOutcome::Completed => panic!("expected the diff gate to halt"),
    };
    assert!(!report.is_empty());

    // Nothing was regenerated or deleted.
    assert_eq!(ws.read("app/AndroidManifest.xml"), edited);
    assert_eq!(ws.read("app/marker.txt"), "untouched");
}

#[test]
fn force_overwrites_hand_edits() {
    let ws = TestWorkspace::new();
    ws.checkout(CheckoutOptions::quick(false));

    fs::write(
        ws.path("app/AndroidManifest.xml"),
        "package=\"com.demo.app\"\n<hacked/>\n",
    )
    .unwrap();

    let outcome = ws.checkout(CheckoutOptions {
        force: true,
        ..Default::default()
    });
    assert!(matches!(outcome, CheckoutOutcome::Completed));
    assert_eq!(
        ws.read("app/AndroidManifest.xml"),
        "package=\"com.demo.app\"\n<body/>\n"
    );
}

#[test]
fn update_restores_the_placeholder_template() {
    let ws = TestWorkspace::new();
    ws.checkout(CheckoutOptions::quick(false));

    // A change made in the live tree flows back with the value swapped
    // out for its placeholder.
    fs::write(
        ws.path("app/AndroidManifest.xml"),
        "package=\"com.demo.app\"\n<body/>\n<uses-permission/>\n",
    )
    .unwrap();

    checkout::update(&ws.manifest, &ws.ctx, "demo").unwrap();

    assert_eq!(
        ws.read("common/AndroidManifest.xml"),
        "package=\"[app_id]\"\n<body/>\n<uses-permission/>\n"
    );

    // And the next diff is clean again.
    let resolver = PathResolver::new(&ws.manifest, &ws.ctx);
    let report = mpm_core::diff::diff_project(&ws.manifest, &resolver, "demo").unwrap();
    assert!(report.is_empty());
}

#[test]
fn new_project_seeds_from_the_live_tree() {
    let ws = TestWorkspace::new();
    ws.checkout(CheckoutOptions::quick(false));

    checkout::new_project(&ws.manifest, &ws.ctx, "second").unwrap();

    assert!(ws.path("projects/second").is_dir());
    assert_eq!(ws.read("projects/second/custom.scss"), "body {}\n");
    assert_eq!(ws.read("projects/second/google-services.json"), "{}\n");
    let seeded = ws.read_values("projects/second/config.json");
    assert_eq!(seeded["APP_ID"], "com.demo.app");

    // The seeded project checks out cleanly.
    let outcome = checkout::checkout(
        &ws.manifest,
        &ws.ctx,
        "second",
        CheckoutOptions::quick(false),
    )
    .unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed));
}

#[test]
fn existing_project_cannot_be_created_again() {
    let ws = TestWorkspace::new();
    let err = checkout::new_project(&ws.manifest, &ws.ctx, "demo").unwrap_err();
    assert!(matches!(err, mpm_core::Error::ProjectExists { .. }));
}

#[test]
fn unknown_project_fails_fast() {
    let ws = TestWorkspace::new();
    let err = checkout::checkout(&ws.manifest, &ws.ctx, "ghost", CheckoutOptions::default())
        .unwrap_err();
    assert!(matches!(err, mpm_core::Error::ProjectMissing { .. }));
}

#[test]
fn copy_only_never_links() {
    let ws = TestWorkspace::new();
    ws.checkout(CheckoutOptions {
        force: true,
        copy_only: true,
        ..Default::default()
    });

    assert!(
        !ws.path("app/src/custom.scss")
            .symlink_metadata()
            .unwrap()
            .is_symlink()
    );
    assert!(
        !ws.path("app/src/environments/config.json")
            .symlink_metadata()
            .unwrap()
            .is_symlink()
    );
}

#[test]
fn env_modifier_picks_the_config_variant() {
    let ws = TestWorkspace::new();
    fs::write(
        ws.path("projects/demo/config.staging.json"),
        r#"{"APP_ID": "com.demo.staging"}"#,
    )
    .unwrap();
    fs::write(
        ws.path("projects/demo/google-services.staging.json"),
        "{\"staging\": true}\n",
    )
    .unwrap();

    let ctx = RunContext::new(ws.root(), ".staging");
    checkout::checkout(&ws.manifest, &ctx, "demo", CheckoutOptions::quick(false)).unwrap();

    assert!(ws.read("app/AndroidManifest.xml").contains("com.demo.staging"));
}

#[cfg(unix)]
#[test]
fn hooks_run_unless_skipped() {
    let ws = TestWorkspace::new();
    let mut manifest = ws.manifest.clone();
    manifest.execute_before = vec!["touch [destination_root]/before-ran".to_string()];

    checkout::checkout(
        &manifest,
        &ws.ctx,
        "demo",
        CheckoutOptions {
            force: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(ws.path("app/before-ran").exists());

    fs::remove_file(ws.path("app/before-ran")).unwrap();
    checkout::checkout(&manifest, &ws.ctx, "demo", CheckoutOptions::quick(false)).unwrap();
    assert!(!ws.path("app/before-ran").exists());
}
