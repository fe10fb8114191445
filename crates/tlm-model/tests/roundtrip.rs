use tlm_components::ComponentRegistry;
use tlm_model::*;

fn orifice_model() -> ModelDef {
    let mut model = ModelDef::new("orifice rig");
    model.settings.timestep = 1.0e-3;
    model.settings.stop_time = 0.1;
    model.settings.log_samples = 11;
    model.components = vec![
        ComponentDef::new("src", "HydraulicPressureSourceC").with_parameter("p", 2.0e6),
        ComponentDef::new("ori", "HydraulicLaminarOrifice").with_parameter("Kc", 1.0e-10),
        ComponentDef::new("tank", "HydraulicTankC"),
        ComponentDef::new("flow", "HydraulicFlowSensor"),
        ComponentDef::new("z", "SignalUnitDelay").with_start_value("out", "Value", 0.5),
    ];
    model.connections = vec![
        ConnectionDef::new("src.P1", "ori.P1"),
        ConnectionDef::new("ori.P2", "tank.P1"),
        ConnectionDef::new("flow.P1", "tank.P1"),
        ConnectionDef::new("flow.out", "z.in"),
    ];
    model
}

#[test]
fn roundtrip_yaml() {
    let model = orifice_model();
    let path = std::env::temp_dir().join("tlm_model_roundtrip.yaml");
    save_yaml(&path, &model).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(model, loaded);
    assert_eq!(load_model(&path).unwrap(), model);
}

#[test]
fn roundtrip_json() {
    let model = orifice_model();
    let path = std::env::temp_dir().join("tlm_model_roundtrip.json");
    save_json(&path, &model).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(model, loaded);
    assert_eq!(load_model(&path).unwrap(), model);
}

#[test]
fn invalid_models_are_not_saved() {
    let mut model = orifice_model();
    model.connections.push(ConnectionDef::new("ghost.P1", "tank.P1"));
    let path = std::env::temp_dir().join("tlm_model_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &model),
        Err(ModelError::Validation(ValidationError::MissingReference { .. }))
    ));
}

#[test]
fn built_model_runs() {
    let model = orifice_model();
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin()).unwrap();
    let report = system.run(&options).unwrap();
    assert!(report.is_finished());
    assert_eq!(report.steps_taken, 100);
    assert_eq!(system.log().len(), 11);

    // q = Kc (p1 - p2) with both sides ideal
    let q = system.port_value("flow", "out", "Value").unwrap();
    let expected = 1.0e-10 * (2.0e6 - 1.0e5);
    assert!((q - expected).abs() <= 1e-9 * expected, "{q}");
    let z = system.port_trace("z", "out", "Value", None).unwrap();
    assert_eq!(z[0], 0.5);
}

#[test]
fn yaml_text_with_typed_parameters() {
    let yaml = r#"
version: 1
name: chain
settings:
  timestep: 0.5
  stop_time: 2.0
components:
  - name: step
    type: SignalStep
    parameters:
      y_0: 1
      y_A: 2.5
      t_step: 1.0
  - name: delay
    type: SignalUnitDelay
connections:
  - from: step.out
    to: delay.in
"#;
    let model = from_yaml_str(yaml).unwrap();
    assert_eq!(model.component("step").unwrap().parameters.len(), 3);
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin()).unwrap();
    system.run(&options).unwrap();
    assert_eq!(
        system.port_trace("step", "out", "Value", None).unwrap(),
        [1.0, 1.0, 3.5, 3.5, 3.5]
    );
}
