use serde_json::json;
use test_log::test;

use molybdenum_core::{
    config::EngineConfig, patch::form_from_json, simulation::SimulationConfig, MolybdenumError,
};

mod common;
use common::{enzyme_model, fixture};

#[test]
fn test_form_fixture_applies() {
    let mut model = enzyme_model();
    let edits = form_from_json(&fixture("enzyme_form.json")).unwrap();
    model.apply_patch(&edits, &EngineConfig::default()).unwrap();

    let mapping = model.as_mapping();
    assert_eq!(
        mapping["species"]["spec1"],
        json!({"name": "E", "amt": 12.0, "fixed": true})
    );
    assert_eq!(
        mapping["params"],
        json!({
            "param1": {"name": "koff", "val": 0.2},
            "param3": {"name": "kinh", "val": 500.0}
        })
    );
    assert_eq!(mapping["reactions"]["reac2"]["expression"], json!("kinh*ES"));
    assert!(model.check_invariants().is_empty());
}

#[test]
fn test_bad_form_is_rejected_whole() {
    let mut model = enzyme_model();
    let before = model.as_json();
    let edits = form_from_json(r#"[["spec1_amt", ["3"]], ["spec1_amt", ["25", "13"]]]"#).unwrap();
    let err = model
        .apply_patch(&edits, &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, MolybdenumError::Validation(_)));
    assert!(err.to_string().contains("exactly one value expected"));
    assert_eq!(model.as_json(), before);
}

#[test]
fn test_simulation_settings_from_form() {
    let mut model = enzyme_model();
    let edits =
        form_from_json(r#"[["sim_start", ["12."]], ["sim_end", ["24."]], ["sim_points", ["500"]]]"#)
            .unwrap();
    model.set_sim_config(&edits).unwrap();
    assert_eq!(model.sim_config(), &SimulationConfig::new(12.0, 24.0, 500));
    assert_eq!(
        model.as_mapping()["sim_params"],
        json!({"sim_start": 12.0, "sim_end": 24.0, "sim_points": 500})
    );
    assert_eq!(model.sim_config().require().unwrap(), (12.0, 24.0, 500));

    let bad = form_from_json(r#"[["sim_start", ["12."]], ["sim_steps", ["300"]]]"#).unwrap();
    assert!(model.set_sim_config(&bad).is_err());
    assert_eq!(model.sim_config(), &SimulationConfig::new(12.0, 24.0, 500));
}
