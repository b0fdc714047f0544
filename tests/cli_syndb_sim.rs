use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "syndb-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn line_run_writes_dump_files_and_summary() {
    let dir = unique_temp_dir("cli-line");
    let config = write_file(
        &dir,
        "config.json",
        r#"
{
    "total_time_ns": 100000,
    "topology": { "kind": "line", "num_switches": 5 },
    "hop_delay": { "kind": "fixed", "ns": 1000 }
}
        "#,
    );
    let out_dir = dir.join("data");
    let summary_path = dir.join("summary.json");

    let output = Command::new(env!("CARGO_BIN_EXE_syndb_sim"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
            "--prefix",
            "line_",
            "--summary-json",
            summary_path.to_str().unwrap(),
        ])
        .output()
        .expect("run syndb_sim");
    assert!(
        output.status.success(),
        "syndb_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("done @"), "stdout={stdout}");

    for i in 0..5 {
        let path = out_dir.join(format!("line_switch_{i}.txt"));
        let raw = fs::read_to_string(&path).expect("read switch file");
        assert!(!raw.is_empty(), "{} should have ingress records", path.display());
    }
    assert!(!out_dir.join("line_switch_5.txt").exists());

    let src_dst = fs::read_to_string(out_dir.join("line_sourceDestination.txt"))
        .expect("read sourceDestination.txt");
    for line in src_dst.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3, "bad line {line:?}");
        assert!(matches!((fields[1], fields[2]), ("0", "1") | ("1", "0")));
    }

    let raw = fs::read_to_string(&summary_path).expect("read summary");
    let v: Value = serde_json::from_str(&raw).expect("parse summary");
    let stats = &v["stats"];
    let injected = stats["injected_pkts"].as_u64().unwrap();
    let delivered = stats["delivered_pkts"].as_u64().unwrap();
    let flushed = stats["flushed_pkts"].as_u64().unwrap();
    assert!(injected > 0);
    assert_eq!(injected, delivered + flushed);
    assert_eq!(src_dst.lines().count() as u64, injected);
    assert_eq!(v["num_switches"].as_u64(), Some(5));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn trigger_run_writes_one_block_per_completed_trigger() {
    let dir = unique_temp_dir("cli-trigger");
    let config = write_file(
        &dir,
        "config.json",
        r#"
{
    "total_time_ns": 200000,
    "topology": { "kind": "fat_tree", "k": 4 },
    "traffic": { "pattern": "idle" },
    "triggers": { "initial_delay_ns": 1000, "interval_ns": 50000, "count": 3 }
}
        "#,
    );
    let out_dir = dir.join("data");

    let output = Command::new(env!("CARGO_BIN_EXE_syndb_sim"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("run syndb_sim");
    assert!(
        output.status.success(),
        "syndb_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("triggers_completed=3"), "stdout={stdout}");

    let raw = fs::read_to_string(out_dir.join("trigger.txt")).expect("read trigger.txt");
    // 每次触发一行头部 + 19 个到达记录
    assert_eq!(raw.lines().count(), 3 * 20);
    let headers: Vec<&str> = raw.lines().step_by(20).collect();
    assert!(headers[0].starts_with("0\t1000\t0"), "{headers:?}");
    assert!(headers[2].starts_with("2\t101000\t2"), "{headers:?}");

    let src_dst = fs::read_to_string(out_dir.join("sourceDestination.txt"))
        .expect("read sourceDestination.txt");
    assert!(src_dst.is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_topology_kind_fails() {
    let dir = unique_temp_dir("cli-bad-topo");
    let config = write_file(&dir, "config.json", r#"{ "topology": { "kind": "torus" } }"#);

    let output = Command::new(env!("CARGO_BIN_EXE_syndb_sim"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            dir.join("data").to_str().unwrap(),
        ])
        .output()
        .expect("run syndb_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown variant"), "stderr={stderr}");
    assert!(!dir.join("data").exists());

    let _ = fs::remove_dir_all(&dir);
}
