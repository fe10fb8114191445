//! Content-based hashing for run ids.

use sha2::{Digest, Sha256};
use tlm_model::ModelDef;
use tlm_system::SimOptions;

/// Same model, options and version give the same id.
pub fn compute_run_id(model: &ModelDef, options: &SimOptions, version: &str) -> String {
    let mut hasher = Sha256::new();

    let model_json = serde_json::to_string(model).unwrap_or_default();
    hasher.update(model_json.as_bytes());

    let options_json = serde_json::to_string(options).unwrap_or_default();
    hasher.update(options_json.as_bytes());

    hasher.update(version.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlm_model::ComponentDef;

    fn model(gain: f64) -> ModelDef {
        let mut model = ModelDef::new("m");
        model
            .components
            .push(ComponentDef::new("g", "SignalGain").with_parameter("k", gain));
        model
    }

    #[test]
    fn hash_stability() {
        let options = SimOptions::default();
        let a = compute_run_id(&model(2.0), &options, "v1");
        let b = compute_run_id(&model(2.0), &options, "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let options = SimOptions::default();
        let base = compute_run_id(&model(2.0), &options, "v1");
        assert_ne!(base, compute_run_id(&model(3.0), &options, "v1"));
        let shorter = SimOptions {
            stop_time: 1.0,
            ..SimOptions::default()
        };
        assert_ne!(base, compute_run_id(&model(2.0), &shorter, "v1"));
        assert_ne!(base, compute_run_id(&model(2.0), &options, "v2"));
    }
}
