//! Integration tests: run the `nino` binary on small NetCDF datasets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use approx::assert_relative_eq;
use nino_io::{OpenOptions, open_dataset};

const MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Two noleap years of mid-month `sst` on a 2 x 2 grid, equal to the month
/// index, and an index `idx = 2 * month + 1`.
fn write_field(dir: &Path) -> PathBuf {
    let path = dir.join("field.nc");
    let offsets: Vec<f64> = (0..24)
        .map(|i| (365 * (i / 12) + MONTH_DAYS[..i % 12].iter().sum::<usize>() + 14) as f64)
        .collect();
    let sst: Vec<f64> = (0..24).flat_map(|i| std::iter::repeat_n((i % 12) as f64, 4)).collect();
    let idx: Vec<f64> = (0..24).map(|i| (2 * (i % 12) + 1) as f64).collect();

    let mut file = netcdf::create(&path).expect("failed to create NetCDF file");
    file.add_dimension("time", 24).expect("add dim time");
    file.add_dimension("lat", 2).expect("add dim lat");
    file.add_dimension("lon", 2).expect("add dim lon");
    {
        let mut var = file.add_variable::<f64>("time", &["time"]).expect("add var time");
        var.put_attribute("units", "days since 2000-01-01").expect("add time units");
        var.put_attribute("calendar", "noleap").expect("add time calendar");
        var.put_values(&offsets, ..).expect("put time values");
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"]).expect("add var lat");
        var.put_values(&[-5.0, 5.0], ..).expect("put lat values");
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"]).expect("add var lon");
        var.put_values(&[190.0, 200.0], ..).expect("put lon values");
    }
    {
        let mut var = file
            .add_variable::<f64>("sst", &["time", "lat", "lon"])
            .expect("add var sst");
        var.put_attribute("units", "K").expect("add sst units");
        var.put_values(&sst, ..).expect("put sst values");
    }
    {
        let mut var = file.add_variable::<f64>("idx", &["time"]).expect("add var idx");
        var.put_values(&idx, ..).expect("put idx values");
    }
    path
}

fn nino(subcommand: &str, config: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_nino"))
        .arg(subcommand)
        .arg("--config")
        .arg(config)
        .output()
        .expect("run nino")
}

#[test]
fn process_writes_pipeline_result() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let field = write_field(dir.path());
    let out = dir.path().join("cycle.nc");
    let config = dir.path().join("nino.toml");
    fs::write(
        &config,
        format!(
            r#"
[input]
path = "{input}"
variables = ["sst"]

[pipeline]
"1--average" = {{ dim = ["X", "Y"] }}
"2--seasonal_cycle" = {{}}

[output]
path = "{out}"
"#,
            input = field.display(),
            out = out.display(),
        ),
    )
    .unwrap();

    let run = nino("process", &config);
    assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

    let ds = open_dataset(&out, &OpenOptions::default()).expect("output readable");
    let sst = ds.require("sst").unwrap();
    assert_eq!(sst.dims(), ["month"]);
    assert_eq!(sst.shape(), [12]);
    for (m, v) in sst.values().iter().enumerate() {
        assert_relative_eq!(*v, m as f64);
    }
    assert_eq!(sst.attrs()["units"].as_str(), Some("K"));
}

#[test]
fn regress_writes_five_variables() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let field = write_field(dir.path());
    let out = dir.path().join("reg.nc");
    let config = dir.path().join("regress.toml");
    fs::write(
        &config,
        format!(
            r#"
[x]
variable = "idx"
input = {{ path = "{field}", variables = ["idx"] }}

[y]
variable = "sst"
input = {{ path = "{field}", variables = ["sst"] }}

[output]
path = "{out}"
"#,
            field = field.display(),
            out = out.display(),
        ),
    )
    .unwrap();

    let run = nino("regress", &config);
    assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

    let ds = open_dataset(&out, &OpenOptions::default()).unwrap();
    assert_eq!(ds.names().collect::<Vec<_>>(), ["slope", "intercept", "rvalue", "pvalue", "stderr"]);
    let slope = ds.require("slope").unwrap();
    assert_eq!(slope.dims(), ["latitude", "longitude"]);
    // sst = (idx - 1) / 2
    for v in slope.values() {
        assert_relative_eq!(*v, 0.5, epsilon = 1e-12);
    }
    for v in ds.require("intercept").unwrap().values() {
        assert_relative_eq!(*v, -0.5, epsilon = 1e-12);
    }
}

#[test]
fn required_axis_turns_a_halt_into_a_failure() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let field = write_field(dir.path());
    let config = dir.path().join("nino.toml");
    let write_config = |on_missing: &str| {
        fs::write(
            &config,
            format!(
                r#"
on_missing = "{on_missing}"

[input]
path = "{input}"

[pipeline]
"1--average" = {{ dim = "lev" }}

[output]
path = "{out}"
"#,
                input = field.display(),
                out = dir.path().join("out.nc").display(),
            ),
        )
        .unwrap();
    };

    write_config("fail");
    let run = nino("process", &config);
    assert_eq!(run.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(stderr.contains("axis 'lev' not found"), "{stderr}");

    write_config("warn");
    let run = nino("process", &config);
    assert_eq!(run.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(stderr.contains("pipeline halted at '1--average'"), "{stderr}");
}

#[test]
fn missing_config_exits_with_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let run = nino("process", &dir.path().join("absent.toml"));
    assert_eq!(run.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(stderr.contains("Error: failed to read config file"), "{stderr}");
}
