use persistent_thrust::common::vector;
use persistent_thrust::orbits::{
    AutopilotCommand, CelestialBody, HeadingError, KeplerOrbit, ManeuverPlan, SolarSystem,
    TargetRef, Universe, VesselKinematics, heading_vector, heading_vector_or_zero,
};
use persistent_thrust::snapshot::AutopilotMode;

const KERBIN_MU: f64 = 3.5316e12;
const MUN_MU: f64 = 6.5138398e10;

fn universe() -> Universe {
    let mut universe = Universe::new(SolarSystem::new([
        CelestialBody {
            name: "Kerbin".into(),
            mu: KERBIN_MU,
            radius: 600_000.0,
            orbit: None,
        },
        CelestialBody {
            name: "Mun".into(),
            mu: MUN_MU,
            radius: 200_000.0,
            orbit: Some(KeplerOrbit::circular("Kerbin", KERBIN_MU, 12_000_000.0, 0.0)),
        },
    ]));
    let mut relay = KeplerOrbit::circular("Kerbin", KERBIN_MU, 2_000_000.0, 0.0);
    relay.mean_anomaly_at_epoch = std::f64::consts::FRAC_PI_2;
    universe.add_vessel("relay", relay);
    universe
}

fn inclined_vessel() -> VesselKinematics {
    let mut orbit = KeplerOrbit::circular("Kerbin", KERBIN_MU, 700_000.0, 0.0);
    orbit.inclination = 0.3;
    orbit.eccentricity = 0.05;
    VesselKinematics {
        orbit,
        facing: [0.0, 0.0, 0.0],
    }
}

fn heading(command: AutopilotCommand, vessel: &VesselKinematics, ut: f64) -> [f64; 3] {
    heading_vector(&command, vessel, &universe(), ut).unwrap()
}

#[test]
fn orbital_modes_are_never_zero_in_flight() {
    let vessel = inclined_vessel();
    for ut in [0.0, 120.0, 1_500.0] {
        for command in [
            AutopilotCommand::StabilityAssist,
            AutopilotCommand::Prograde,
            AutopilotCommand::Retrograde,
            AutopilotCommand::Normal,
            AutopilotCommand::RadialOut,
        ] {
            assert!(!vector::is_zero(&heading(command.clone(), &vessel, ut)), "{command:?}");
        }
    }
}

#[test]
fn opposite_modes_are_negations() {
    let vessel = inclined_vessel();
    let ut = 300.0;
    let pairs = [
        (AutopilotCommand::Prograde, AutopilotCommand::Retrograde),
        (AutopilotCommand::Normal, AutopilotCommand::Antinormal),
        (AutopilotCommand::RadialOut, AutopilotCommand::RadialIn),
    ];
    for (a, b) in pairs {
        let sum = vector::add(&heading(a, &vessel, ut), &heading(b, &vessel, ut));
        assert!(vector::norm(&sum) < 1e-6);
    }
}

#[test]
fn normal_is_perpendicular_to_the_orbit_plane() {
    let vessel = inclined_vessel();
    let ut = 600.0;
    let (position, velocity) = vessel.orbit.state_at(ut);
    let normal = vector::normalize(&heading(AutopilotCommand::Normal, &vessel, ut));
    assert!(vector::dot(&normal, &vector::normalize(&position)).abs() < 1e-9);
    assert!(vector::dot(&normal, &vector::normalize(&velocity)).abs() < 1e-9);
}

#[test]
fn stability_assist_prefers_facing() {
    let mut vessel = inclined_vessel();
    vessel.facing = [0.0, 0.0, 5.0];
    let facing = heading(AutopilotCommand::StabilityAssist, &vessel, 0.0);
    assert!(vector::norm(&vector::sub(&facing, &[0.0, 0.0, 1.0])) < 1e-12);
}

#[test]
fn target_vessel_points_from_vessel_to_target() {
    let vessel = VesselKinematics {
        orbit: KeplerOrbit::circular("Kerbin", KERBIN_MU, 700_000.0, 0.0),
        facing: [0.0, 1.0, 0.0],
    };
    let to_relay = heading(
        AutopilotCommand::Target(TargetRef::Vessel("relay".into())),
        &vessel,
        0.0,
    );
    // Relay sits on +y at 2000 km, the vessel on +x at 700 km.
    assert!((to_relay[0] + 700_000.0).abs() < 1e-3);
    assert!((to_relay[1] - 2_000_000.0).abs() < 1e-3);

    let away = heading(
        AutopilotCommand::AntiTarget(TargetRef::Vessel("relay".into())),
        &vessel,
        0.0,
    );
    assert_eq!(away, vector::neg(&to_relay));
}

#[test]
fn target_body_uses_world_positions() {
    let vessel = VesselKinematics {
        orbit: KeplerOrbit::circular("Kerbin", KERBIN_MU, 700_000.0, 0.0),
        facing: [0.0, 1.0, 0.0],
    };
    let to_mun = heading(
        AutopilotCommand::Target(TargetRef::Body("Mun".into())),
        &vessel,
        0.0,
    );
    assert!((to_mun[0] - 11_300_000.0).abs() < 1e-3);
}

#[test]
fn unresolvable_target_is_zero() {
    let vessel = inclined_vessel();
    let command = AutopilotCommand::Target(TargetRef::Vessel("missing".into()));
    assert_eq!(
        heading_vector(&command, &vessel, &universe(), 0.0),
        Err(HeadingError::TargetNotFound(TargetRef::Vessel("missing".into())))
    );
    assert_eq!(
        heading_vector_or_zero(&command, &vessel, &universe(), 0.0),
        [0.0; 3]
    );
    assert_eq!(
        AutopilotCommand::from_mode(AutopilotMode::AntiTarget, None, None),
        Err(HeadingError::NoTarget)
    );
}

#[test]
fn maneuver_heads_along_remaining_velocity_change() {
    let vessel = VesselKinematics {
        orbit: KeplerOrbit::circular("Kerbin", KERBIN_MU, 700_000.0, 0.0),
        facing: [0.0, 1.0, 0.0],
    };
    let mut patch = vessel.orbit.clone();
    patch.semi_major_axis = 900_000.0;
    patch.eccentricity = (900_000.0 - 700_000.0) / 900_000.0;

    let plan = ManeuverPlan {
        patch,
        ut: 0.0,
        tolerance_deg: 0.5,
    };
    let burn = heading(AutopilotCommand::Maneuver(plan), &vessel, 0.0);
    // A prograde raise at periapsis: the remaining change points along +y.
    assert!(burn[1] > 0.0);
    assert!(burn[0].abs() < 1e-6);
}

#[test]
fn maneuver_within_tolerance_is_complete() {
    let vessel = inclined_vessel();
    let plan = ManeuverPlan {
        patch: vessel.orbit.clone(),
        ut: 10.0,
        tolerance_deg: 1.0,
    };
    assert_eq!(
        heading_vector(&AutopilotCommand::Maneuver(plan), &vessel, &universe(), 10.0),
        Err(HeadingError::ManeuverComplete)
    );
}

#[test]
fn maneuver_patch_around_another_body_is_rejected() {
    let vessel = inclined_vessel();
    let plan = ManeuverPlan {
        patch: KeplerOrbit::circular("Mun", MUN_MU, 300_000.0, 0.0),
        ut: 0.0,
        tolerance_deg: 1.0,
    };
    assert!(matches!(
        heading_vector(&AutopilotCommand::Maneuver(plan), &vessel, &universe(), 0.0),
        Err(HeadingError::ManeuverFrameMismatch { .. })
    ));
}
