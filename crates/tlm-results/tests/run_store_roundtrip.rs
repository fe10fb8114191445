use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tlm_components::ComponentRegistry;
use tlm_model::{ComponentDef, ConnectionDef, ModelDef, build_system};
use tlm_results::{RunManifest, RunStore, RunTraces, collect_traces, compute_run_id, write_csv};
use tlm_system::SimOutcome;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{nanos}"))
}

fn summing_model() -> ModelDef {
    let mut model = ModelDef::new("summing");
    model.settings.timestep = 0.125;
    model.settings.stop_time = 1.0;
    model.components = vec![
        ComponentDef::new("a", "SignalConstant").with_parameter("y", 2.0),
        ComponentDef::new("ramp", "SignalRamp")
            .with_parameter("t_start", 0.0)
            .with_parameter("t_end", 1.0),
        ComponentDef::new("sum", "SignalSum"),
    ];
    model.connections = vec![
        ConnectionDef::new("a.out", "sum.in"),
        ConnectionDef::new("ramp.out", "sum.in"),
    ];
    model
}

#[test]
fn traces_cover_every_sub_port() {
    let model = summing_model();
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin()).unwrap();
    system.run(&options).unwrap();

    let traces = RunTraces::from_system(&system);
    assert_eq!(traces.time.len(), 9);
    let sub0 = traces.find("sum.in[0].Value").unwrap();
    let sub1 = traces.find("sum.in[1].Value").unwrap();
    assert!(sub0.values.iter().all(|&v| v == 2.0));
    assert_eq!(sub1.values.last(), Some(&1.0));
    let out = traces.find("sum.out.Value").unwrap();
    assert_eq!(out.values.last(), Some(&3.0));
    assert!(traces.series.iter().all(|s| s.values.len() == 9));
    assert_eq!(collect_traces(&system).len(), traces.series.len());
}

#[test]
fn save_list_load_roundtrip() {
    let model = summing_model();
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin()).unwrap();
    let report = system.run(&options).unwrap();

    let run_id = compute_run_id(&model, &options, "test");
    let manifest = RunManifest::new(
        run_id.clone(),
        &model.name,
        &options,
        &report,
        system.take_messages(),
    );
    let traces = RunTraces::from_system(&system);

    let store = RunStore::new(unique_temp_dir("tlm_results_store")).unwrap();
    assert!(!store.has_run(&run_id));
    store.save_run(&manifest, &traces).unwrap();
    assert!(store.has_run(&run_id));

    let loaded = store.load_manifest(&run_id).unwrap();
    assert_eq!(loaded, manifest);
    assert_eq!(loaded.outcome, SimOutcome::Finished);
    assert_eq!(loaded.steps_taken, 8);
    assert_eq!(store.load_traces(&run_id).unwrap(), traces);

    let runs = store.list_runs("summing").unwrap();
    assert_eq!(runs.len(), 1);
    assert!(store.list_runs("other").unwrap().is_empty());

    store.delete_run(&run_id).unwrap();
    assert!(store.load_manifest(&run_id).is_err());
}

#[test]
fn csv_has_a_header_and_one_row_per_sample() {
    let model = summing_model();
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin()).unwrap();
    system.run(&options).unwrap();
    let traces = RunTraces::from_system(&system);

    let dir = unique_temp_dir("tlm_results_csv");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("traces.csv");
    write_csv(&path, &traces.time, &traces.series).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines[0].starts_with("time,"));
    assert!(lines[0].contains("sum.out.Value"));
    assert_eq!(
        lines[1].split(',').count(),
        traces.series.len() + 1
    );
}
