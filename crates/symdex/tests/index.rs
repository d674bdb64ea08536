use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;

const DEVICE: &str = r#"(kicad_symbol_lib
  (version 20231120)
  (symbol "R"
    (property "Reference" "R" (at 2.032 0 90))
    (symbol "R_0_1"
      (rectangle (start -1.016 -2.54) (end 1.016 2.54)
        (stroke (width 0.254) (type default))
        (fill (type none))))
    (symbol "R_1_1"
      (pin passive line (at 0 3.81 270) (length 1.27)
        (name "~" (effects (font (size 1.27 1.27))))
        (number "1" (effects (font (size 1.27 1.27)))))
      (pin passive line (at 0 -3.81 90) (length 1.27)
        (name "~" (effects (font (size 1.27 1.27))))
        (number "2" (effects (font (size 1.27 1.27)))))))
  (symbol "R_Small" (extends "R"))
  (symbol "Broken" (pin
"#;

const POWER: &str = r#"(kicad_symbol_lib
  (symbol "GND"
    (symbol "GND_0_1"
      (polyline (pts (xy 0 0) (xy 0 -1.27) (xy 1.27 -1.27) (xy 0 -2.54))))
    (symbol "GND_1_1"
      (pin power_in line (at 0 0 270) (length 0) hide
        (name "GND" (effects (font (size 1.27 1.27))))
        (number "1" (effects (font (size 1.27 1.27)))))))
  (symbol "R" (extends "Nowhere")))
"#;

fn symdex(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("symdex").unwrap();
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_libraries(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("Device.kicad_sym"), DEVICE).unwrap();
    fs::write(dir.join("Power.kicad_sym"), POWER).unwrap();
    fs::write(
        dir.join("Audio.kicad_sym"),
        r#"(kicad_symbol_lib (symbol "Buzzer"))"#,
    )
    .unwrap();
}

#[test]
fn index_writes_resolved_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let symbols = tmp.path().join("symbols");
    write_libraries(&symbols);
    let out = tmp.path().join("out/index.json");

    symdex(tmp.path())
        .arg("index")
        .arg(&symbols)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let index = read_json(&out);
    let ids: Vec<_> = index.as_object().unwrap().keys().cloned().collect();
    // Audio is not in the default allow-list; Broken never closes.
    assert_eq!(ids, vec!["GND", "R", "R_Small"]);

    // Power.kicad_sym sorts after Device.kicad_sym, so its "R" wins.
    assert_eq!(index["R"]["extends"], "Nowhere");
    assert_eq!(index["R"]["pins"], serde_json::json!([]));
    assert!(index["R"]["bbox"].is_null());

    // R_Small resolves against the final "R", which has nothing to give.
    assert_eq!(index["R_Small"]["pins"], serde_json::json!([]));
    assert!(index["R_Small"]["bbox"].is_null());

    let gnd = &index["GND"];
    assert_eq!(gnd["pins"][0]["electrical_type"], "power_in");
    assert_eq!(gnd["pins"][0]["orientation"], 270.0);
    assert_eq!(
        gnd["bbox"],
        serde_json::json!({"minX": 0.0, "maxX": 1.27, "minY": -2.54, "maxY": 0.0})
    );
    assert!(gnd["kicad_sym_raw"].as_str().unwrap().starts_with("(symbol \"GND\""));
}

#[test]
fn category_flag_overrides_allow_list() {
    let tmp = tempfile::tempdir().unwrap();
    let symbols = tmp.path().join("symbols");
    write_libraries(&symbols);
    let out = tmp.path().join("index.json");

    symdex(tmp.path())
        .args(["index", "--category", "Device"])
        .arg(&symbols)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let index = read_json(&out);
    let r = &index["R"];
    assert_eq!(r["pins"][0]["y"], -3.81);
    assert_eq!(r["pins"][1]["y"], 3.81);
    assert_eq!(
        r["bbox"],
        serde_json::json!({"minX": -1.016, "maxX": 1.016, "minY": -2.54, "maxY": 2.54})
    );
    assert_eq!(index["R_Small"]["pins"], r["pins"]);
    assert_eq!(index["R_Small"]["bbox"], r["bbox"]);
    assert!(index.get("GND").is_none());
}

#[test]
fn all_categories_includes_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let symbols = tmp.path().join("symbols");
    write_libraries(&symbols);
    let out = tmp.path().join("index.json");

    symdex(tmp.path())
        .args(["index", "--all-categories"])
        .arg(&symbols)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(read_json(&out).get("Buzzer").is_some());
}

#[test]
fn missing_directory_is_an_empty_index() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("index.json");

    symdex(tmp.path())
        .arg("index")
        .arg(tmp.path().join("does-not-exist"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(read_json(&out), serde_json::json!({}));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let tmp = tempfile::tempdir().unwrap();
    write_libraries(&tmp.path().join("libs"));
    fs::write(
        tmp.path().join("symdex.toml"),
        r#"
[index]
symbols_dir = "libs"
output = "generated/symbols.json"
categories = ["Power"]
"#,
    )
    .unwrap();

    symdex(tmp.path()).arg("index").assert().success();

    let index = read_json(&tmp.path().join("generated/symbols.json"));
    let ids: Vec<_> = index.as_object().unwrap().keys().cloned().collect();
    assert_eq!(ids, vec!["GND", "R"]);
}

#[test]
fn invalid_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "[index]\nunknown = 1\n").unwrap();

    symdex(tmp.path())
        .arg("index")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn inspect_prints_single_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let lib = tmp.path().join("Device.kicad_sym");
    fs::write(&lib, DEVICE).unwrap();

    let output = symdex(tmp.path())
        .args(["inspect", "--id", "R_Small"])
        .arg(&lib)
        .output()
        .unwrap();
    assert!(output.status.success());

    let entry: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entry["id"], "R_Small");
    assert_eq!(entry["extends"], "R");
    assert_eq!(entry["pins"].as_array().unwrap().len(), 2);

    symdex(tmp.path())
        .args(["inspect", "--id", "Missing"])
        .arg(&lib)
        .assert()
        .failure();
}
