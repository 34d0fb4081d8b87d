//! End to end tests
//!
//! Writes a template directory to a temporary location, runs the rewriters on it and compares the files on disk.

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::Path;
use tf_overwrite::{ErrorKind, OverwriteConfig};

const MAIN_TF: &str = r#"
resource "google_compute_instance_template" "template" {
  name = "template"
}

variable "value_to_replace" {
  type    = string
  default = "original-value"
}

variable "other_value_to_replace" {
  type    = string
  default = "old-value"
}
"#;

const OTHER_TF: &str = r#"
variable "another_variable" {
  type = string
  default = "oldest-value"
}
"#;

const MAIN_TF_NO_LABEL: &str = r#"
provider "google" {
  project = var.project_id
}

resource "google_compute_instance_template" "template" {
  name = "template"
}

variable "value_to_replace" {
  type    = string
  default = "original-value"
}
"#;

const METADATA: &str = r#"
spec:
  interfaces:
    variables:
    - name: source_image
      description: The image name for the disk for the VM instance.
      varType: string
      defaultValue: old-image
"#;

const METADATA_DISPLAY: &str = r#"
spec:
  ui:
    input:
      variables:
        source_image:
          name: source_image
          title: Source Image
          enumValueLabels:
            - label: old-image
              value: old-image
"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TF_OVERWRITE_LOG"))
        .with_test_writer()
        .try_init();
}

fn template_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

fn dir_contents(dir: &Path) -> BTreeMap<String, String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().to_string(),
                std::fs::read_to_string(entry.path()).unwrap(),
            )
        })
        .collect()
}

fn read(dir: &tempfile::TempDir, name: &str) -> String {
    std::fs::read_to_string(dir.path().join(name)).unwrap()
}

fn config(payload: serde_json::Value) -> OverwriteConfig {
    tf_overwrite::get_overwrite_config(&serde_json::to_vec_pretty(&payload).unwrap()).unwrap()
}

fn yaml(contents: &str) -> serde_yaml::Value {
    serde_yaml::from_str(contents).unwrap()
}

#[test]
fn overwrite_multiple_variables_and_files() {
    let dir = template_dir(&[("main.tf", MAIN_TF), ("anyfilename.tf", OTHER_TF)]);

    let config = config(serde_json::json!({
        "variables": ["value_to_replace", "other_value_to_replace", "another_variable"],
        "replacements": {
            "original-value": "new-value",
            "old-value": "newer-value",
            "oldest-value": "newest-value"
        }
    }));
    tf_overwrite::overwrite_tf(&config, dir.path()).unwrap();

    insta::assert_snapshot!(read(&dir, "main.tf").trim(), @r#"
    resource "google_compute_instance_template" "template" {
      name = "template"
    }

    variable "value_to_replace" {
      type    = string
      default = "new-value"
    }

    variable "other_value_to_replace" {
      type    = string
      default = "newer-value"
    }
    "#);

    assert_eq!(read(&dir, "anyfilename.tf"), OTHER_TF.replace("oldest-value", "newest-value"));
}

#[test]
fn direct_and_legacy_mode_agree() {
    let legacy = template_dir(&[("main.tf", MAIN_TF), ("anyfilename.tf", OTHER_TF)]);
    let direct = template_dir(&[("main.tf", MAIN_TF), ("anyfilename.tf", OTHER_TF)]);

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({
            "variables": ["value_to_replace", "another_variable"],
            "replacements": {"original-value": "new-value", "oldest-value": "newest-value"}
        })),
        legacy.path(),
    )
    .unwrap();

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({
            "newValues": {"value_to_replace": "new-value", "another_variable": "newest-value"},
            "variables": ["other_value_to_replace"],
            "replacements": {"old-value": "unused"}
        })),
        direct.path(),
    )
    .unwrap();

    assert_eq!(dir_contents(legacy.path()), dir_contents(direct.path()));
    assert!(read(&direct, "main.tf").contains("default = \"old-value\""));
}

#[test]
fn untouched_files_stay_byte_identical() {
    let odd = "# formatting   is kept\nlocals {\n    a   =   1 // here\n}\n";
    let dir = template_dir(&[("main.tf", MAIN_TF), ("odd.tf", odd), ("README.md", "# readme")]);

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({"newValues": {"value_to_replace": "x"}})),
        dir.path(),
    )
    .unwrap();

    let contents = dir_contents(dir.path());
    assert_eq!(contents["odd.tf"], odd);
    assert_eq!(contents["README.md"], "# readme");
    assert_eq!(
        contents["main.tf"],
        MAIN_TF.replace("\"original-value\"", "\"x\"")
    );
}

#[test]
fn invalid_hcl() {
    let dir = template_dir(&[("main.tf", MAIN_TF), ("broken.tf", "this is broken")]);

    let err = tf_overwrite::overwrite_tf(
        &config(serde_json::json!({"newValues": {"value_to_replace": "new-value"}})),
        dir.path(),
    )
    .expect_err("must fail");

    assert!(err.to_string().contains("failure parsing terraform module"));
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(read(&dir, "main.tf"), MAIN_TF);
}

#[test]
fn failure_leaves_all_files_untouched() {
    let dir = template_dir(&[("main.tf", MAIN_TF), ("anyfilename.tf", OTHER_TF)]);
    let before = dir_contents(dir.path());

    // the first two variables are valid, the last one is not
    let err = tf_overwrite::overwrite_tf(
        &config(serde_json::json!({
            "variables": ["value_to_replace", "another_variable", "other_value_to_replace"],
            "replacements": {"original-value": "new-value", "oldest-value": "newest-value"}
        })),
        dir.path(),
    )
    .expect_err("must fail");

    assert_eq!(
        err.to_string(),
        "default value: old-value of variable: other_value_to_replace not found in replacements"
    );
    assert_eq!(dir_contents(dir.path()), before);
}

#[test]
fn consumer_label_is_upserted() {
    let dir = template_dir(&[("main.tf", MAIN_TF_NO_LABEL)]);

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({
            "consumerLabel": "new-consumer-label",
            "newValues": {"value_to_replace": "new-value"}
        })),
        dir.path(),
    )
    .unwrap();

    let inserted = read(&dir, "main.tf");
    let value: serde_json::Value = hcl::from_str(&inserted).unwrap();
    assert_eq!(
        value["provider"]["google"]["default_labels"]["goog-partner-solution"],
        "new-consumer-label"
    );
    assert_eq!(value["variable"]["value_to_replace"]["default"], "new-value");
    assert!(inserted.starts_with("\nprovider \"google\" {\n  project = var.project_id\n"));

    // a second run with another label replaces only the value
    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({"consumerLabel": "even-newer-consumer-label"})),
        dir.path(),
    )
    .unwrap();

    assert_eq!(
        read(&dir, "main.tf"),
        inserted.replace("\"new-consumer-label\"", "\"even-newer-consumer-label\"")
    );
}

#[test]
fn consumer_label_without_provider() {
    let dir = template_dir(&[("main.tf", MAIN_TF)]);

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({"consumerLabel": "new-consumer-label"})),
        dir.path(),
    )
    .unwrap();

    assert_eq!(read(&dir, "main.tf"), MAIN_TF);
}

#[test]
fn missing_metadata_files_are_fine() {
    let dir = template_dir(&[]);
    let config = config(serde_json::json!({"newValues": {"source_image": "new-image"}}));

    tf_overwrite::overwrite_metadata(&config, dir.path()).unwrap();
    tf_overwrite::overwrite_display(&config, dir.path()).unwrap();
    assert!(dir_contents(dir.path()).is_empty());
}

#[test]
fn metadata_on_disk() {
    let dir = template_dir(&[("metadata.yaml", METADATA)]);

    tf_overwrite::overwrite_metadata(
        &config(serde_json::json!({
            "variables": ["source_image"],
            "replacements": {"old-image": "new-image"}
        })),
        dir.path(),
    )
    .unwrap();
    assert_eq!(
        yaml(&read(&dir, "metadata.yaml")),
        yaml(&METADATA.replace("old-image", "new-image"))
    );

    let err = tf_overwrite::overwrite_metadata(
        &config(serde_json::json!({
            "variables": ["source_image"],
            "replacements": {"other-image": "newer-image"}
        })),
        dir.path(),
    )
    .expect_err("must fail");
    assert_eq!(
        err.to_string(),
        "default value: new-image of variable: source_image in metadata.yaml not found in replacements"
    );
}

#[test]
fn crlf_module_keeps_line_endings() {
    let source = MAIN_TF.replace('\n', "\r\n");
    let dir = template_dir(&[("main.tf", source.as_str())]);

    tf_overwrite::overwrite_tf(
        &config(serde_json::json!({"newValues": {"value_to_replace": "new-value"}})),
        dir.path(),
    )
    .unwrap();

    assert_eq!(read(&dir, "main.tf"), source.replace("original-value", "new-value"));
}

#[test]
#[cfg(unix)]
fn unreadable_metadata_is_an_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = template_dir(&[("metadata.yaml", METADATA)]);
    let path = dir.path().join("metadata.yaml");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o111)).unwrap();
    if std::fs::read(&path).is_ok() {
        // running with privileges that ignore file modes
        return;
    }

    let err = tf_overwrite::overwrite_metadata(
        &config(serde_json::json!({"newValues": {"source_image": "new-image"}})),
        dir.path(),
    )
    .expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(
        err.io_error().map(std::io::Error::kind),
        Some(std::io::ErrorKind::PermissionDenied)
    );
}

#[test]
fn invalid_metadata_is_not_touched() {
    let broken = "- not validyaml\ninvalid-";
    let dir = template_dir(&[("metadata.yaml", broken), ("metadata.display.yaml", broken)]);

    let err = tf_overwrite::overwrite_metadata(&OverwriteConfig::default(), dir.path())
        .expect_err("must fail");
    assert!(err.to_string().contains("failure parsing metadata.yaml"));

    let err = tf_overwrite::overwrite_display(&OverwriteConfig::default(), dir.path())
        .expect_err("must fail");
    assert!(err.to_string().contains("failure parsing metadata.display.yaml"));

    assert_eq!(read(&dir, "metadata.yaml"), broken);
    assert_eq!(read(&dir, "metadata.display.yaml"), broken);
}

#[test]
fn overwrite_all_documents() {
    let dir = template_dir(&[
        (
            "main.tf",
            "variable \"source_image\" {\n  type    = string\n  default = \"old-image\"\n}\n",
        ),
        ("metadata.yaml", METADATA),
        ("metadata.display.yaml", METADATA_DISPLAY),
    ]);

    tf_overwrite::overwrite_all(
        &config(serde_json::json!({
            "variables": ["source_image"],
            "replacements": {"old-image": "new-image"}
        })),
        dir.path(),
    )
    .unwrap();

    assert_eq!(
        read(&dir, "main.tf"),
        "variable \"source_image\" {\n  type    = string\n  default = \"new-image\"\n}\n"
    );
    assert_eq!(
        yaml(&read(&dir, "metadata.yaml")),
        yaml(&METADATA.replace("old-image", "new-image"))
    );
    assert_eq!(
        yaml(&read(&dir, "metadata.display.yaml")),
        yaml(&METADATA_DISPLAY.replace("value: old-image", "value: new-image"))
    );
}
