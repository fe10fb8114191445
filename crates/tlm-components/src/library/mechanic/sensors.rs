use tlm_node::{NODE_MECHANIC, mechanic};

use crate::library::probe::node_sensor;

node_sensor!(
    /// Node position as a signal.
    MechanicPositionSensor,
    NODE_MECHANIC,
    mechanic::POSITION,
    "Position",
    "m"
);

node_sensor!(
    /// Node velocity as a signal.
    MechanicVelocitySensor,
    NODE_MECHANIC,
    mechanic::VELOCITY,
    "Velocity",
    "m/s"
);

#[cfg(test)]
mod tests {
    use tlm_node::signal;

    use crate::testing::Rig;

    #[test]
    fn sensors_track_a_moving_mass() {
        let mut rig = Rig::new(1e-3);
        let src = rig.add("MechanicForceSourceC");
        let mass = rig.add("MechanicMultiPortTranslationalMass");
        let xs = rig.add("MechanicPositionSensor");
        let vs = rig.add("MechanicVelocitySensor");
        rig.set(src, "F", 100.0);
        rig.set(mass, "x_min", -1.0);
        rig.connect(&[(src, "P1"), (mass, "P2"), (xs, "P1"), (vs, "P1")]);
        rig.initialize().unwrap();
        let mut last = 0.0;
        for _ in 0..100 {
            assert_eq!(rig.step(), None);
            let x = rig.read(xs, "out", signal::VALUE);
            assert!(x <= last);
            last = x;
        }
        assert!(last < 0.0);
        assert!(rig.read(vs, "out", signal::VALUE) < 0.0);
    }
}
