use tlm_node::{NODE_HYDRAULIC, hydraulic};

use crate::library::probe::node_sensor;

node_sensor!(
    /// Node pressure as a signal.
    HydraulicPressureSensor,
    NODE_HYDRAULIC,
    hydraulic::PRESSURE,
    "Pressure",
    "Pa"
);

node_sensor!(
    /// Node flow as a signal.
    HydraulicFlowSensor,
    NODE_HYDRAULIC,
    hydraulic::FLOW,
    "Flow",
    "m^3/s"
);
