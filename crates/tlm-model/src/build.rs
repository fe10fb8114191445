//! Turning a model description into a runnable system.

use tlm_components::ComponentRegistry;
use tlm_system::{ComponentSystem, SimOptions};
use tracing::info;

use crate::error::{ModelError, ModelResult};
use crate::schema::ModelDef;
use crate::validate::validate_model;

/// Validate `model`, create its components from `registry`, apply
/// parameters and start values, and connect them. The system is left
/// assembling with the model's settings applied.
pub fn build_system(
    model: &ModelDef,
    registry: &ComponentRegistry,
) -> ModelResult<(ComponentSystem, SimOptions)> {
    validate_model(model)?;
    let options = SimOptions::from(&model.settings);
    let mut system = ComponentSystem::new(&model.name);
    system.apply_options(&options)?;

    for def in &model.components {
        let mut instance = match registry.try_create(&def.type_name, &def.name) {
            Some(Ok(instance)) => instance,
            Some(Err(source)) => {
                return Err(ModelError::Component {
                    component: def.name.clone(),
                    source,
                });
            }
            None => {
                return Err(ModelError::UnknownComponentType {
                    type_name: def.type_name.clone(),
                    component: def.name.clone(),
                });
            }
        };
        let assignments = def
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(def.start_values.iter().map(|(k, v)| (k.clone(), (*v).into())));
        for (name, value) in assignments {
            instance
                .set_parameter(&name, value)
                .map_err(|source| ModelError::Component {
                    component: def.name.clone(),
                    source,
                })?;
        }
        system.add_component(instance)?;
    }

    for connection in &model.connections {
        // validated above
        if let Some((from, to)) = connection.endpoints() {
            system.connect(&from.component, &from.port, &to.component, &to.port)?;
        }
    }

    info!(
        model = %model.name,
        components = model.components.len(),
        connections = model.connections.len(),
        "built system"
    );
    Ok((system, options))
}
