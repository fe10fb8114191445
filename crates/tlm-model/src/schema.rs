//! Model description schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tlm_components::ParamValue;
use tlm_system::{PortRef, SimOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub settings: SettingsDef,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: name.into(),
            settings: SettingsDef::default(),
            components: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Run settings stored with the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsDef {
    pub timestep: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub log_samples: usize,
    pub log_start_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<usize>,
}

impl Default for SettingsDef {
    fn default() -> Self {
        SimOptions::default().into()
    }
}

impl From<SimOptions> for SettingsDef {
    fn from(o: SimOptions) -> Self {
        Self {
            timestep: o.timestep,
            start_time: o.start_time,
            stop_time: o.stop_time,
            log_samples: o.log_samples,
            log_start_time: o.log_start_time,
            parallel: o.parallel,
        }
    }
}

impl From<&SettingsDef> for SimOptions {
    fn from(s: &SettingsDef) -> Self {
        Self {
            timestep: s.timestep,
            start_time: s.start_time,
            stop_time: s.stop_time,
            log_samples: s.log_samples,
            log_start_time: s.log_start_time,
            parallel: s.parallel,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    /// Registry key, e.g. `HydraulicLaminarOrifice`
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParamValue>,
    /// `Port#Variable` to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub start_values: BTreeMap<String, f64>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            parameters: BTreeMap::new(),
            start_values: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn with_start_value(mut self, port: &str, variable: &str, value: f64) -> Self {
        self.start_values.insert(format!("{port}#{variable}"), value);
        self
    }
}

/// Both ends are written `Component.Port`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub from: String,
    pub to: String,
}

impl ConnectionDef {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn endpoints(&self) -> Option<(PortRef, PortRef)> {
        Some((parse_endpoint(&self.from)?, parse_endpoint(&self.to)?))
    }
}

/// Split `Component.Port` at the last dot. Both parts must be non-empty.
pub fn parse_endpoint(text: &str) -> Option<PortRef> {
    let (component, port) = text.trim().rsplit_once('.')?;
    if component.is_empty() || port.is_empty() {
        return None;
    }
    Some(PortRef::new(component, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_split_at_the_last_dot() {
        let p = parse_endpoint("stage.1.P2").unwrap();
        assert_eq!(p.component, "stage.1");
        assert_eq!(p.port, "P2");
        assert!(parse_endpoint("nodot").is_none());
        assert!(parse_endpoint(".P1").is_none());
        assert!(parse_endpoint("c.").is_none());
    }

    #[test]
    fn parameters_keep_their_yaml_types() {
        let yaml = "name: t\ntype: SignalLookupTable\nparameters:\n  auto_sort: true\n  skip_lines: 2\n  separator: \";\"\n  y: 1.5\n";
        let def: ComponentDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.parameters["auto_sort"], ParamValue::Bool(true));
        assert_eq!(def.parameters["skip_lines"], ParamValue::Integer(2));
        assert_eq!(def.parameters["separator"], ParamValue::Text(";".into()));
        assert_eq!(def.parameters["y"], ParamValue::Real(1.5));
    }

    #[test]
    fn missing_settings_take_defaults() {
        let model: ModelDef = serde_yaml::from_str("version: 1\nname: empty\n").unwrap();
        assert_eq!(model.settings, SettingsDef::default());
        assert_eq!(SimOptions::from(&model.settings), SimOptions::default());
    }
}
