use std::collections::BTreeMap;

use persistent_thrust::background::{
    BackgroundSettings, BackgroundUpdate, EngineDefinition, PartCatalog, PartDefinition,
    TickContext, VesselBackgroundState, load_persistent_engine, process_unloaded_engines,
    rebuild_engines,
};
use persistent_thrust::orbits::{
    CelestialBody, KeplerOrbit, SolarSystem, Universe, VesselKinematics,
};
use persistent_thrust::propulsion::{CheatOptions, RawPropellant, ResourceDefinition, ResourceLibrary};
use persistent_thrust::snapshot::{
    AutopilotMode, FieldStore, ModuleSnapshot, PERSISTENT_ENGINE_MODULE, PartSnapshot,
    VesselSnapshot, keys,
};

const KERBIN_MU: f64 = 3.5316e12;

fn library() -> ResourceLibrary {
    ResourceLibrary::new(
        [
            ResourceDefinition {
                name: "XenonGas".into(),
                density: 0.0001,
            },
            ResourceDefinition {
                name: "ElectricCharge".into(),
                density: 0.0,
            },
        ],
        CheatOptions::default(),
    )
}

fn propellant(name: &str, ratio: f64) -> RawPropellant {
    RawPropellant {
        name: name.into(),
        ratio,
    }
}

fn catalog() -> PartCatalog {
    PartCatalog::new([
        PartDefinition {
            name: "ionEngine".into(),
            title: "Dawn".into(),
            persistent: true,
            engines: vec![
                EngineDefinition {
                    max_thrust: 2.0,
                    propellants: vec![propellant("XenonGas", 0.1), propellant("ElectricCharge", 1.8)],
                },
                EngineDefinition {
                    max_thrust: 0.5,
                    propellants: vec![propellant("XenonGas", 1.0)],
                },
            ],
        },
        PartDefinition {
            name: "stockEngine".into(),
            title: "Stock".into(),
            persistent: false,
            engines: vec![EngineDefinition {
                max_thrust: 50.0,
                propellants: vec![propellant("XenonGas", 1.0)],
            }],
        },
        PartDefinition {
            name: "dryEngine".into(),
            title: "Dry".into(),
            persistent: true,
            engines: vec![EngineDefinition {
                max_thrust: 1.0,
                propellants: Vec::new(),
            }],
        },
        PartDefinition {
            name: "brokenEngine".into(),
            title: "Broken".into(),
            persistent: true,
            engines: vec![EngineDefinition {
                max_thrust: 1.0,
                propellants: vec![propellant("XenonGas", -1.0)],
            }],
        },
    ])
}

fn part(persistent_id: u32, part_name: &str, thrust: Option<&str>) -> PartSnapshot {
    let mut modules = vec![ModuleSnapshot {
        module_name: "ModuleEnginesFX".into(),
        fields: FieldStore::new(),
    }];
    if let Some(thrust) = thrust {
        let fields: FieldStore = [
            (keys::FIELD_VERSION, "1"),
            (keys::PERSISTENT_THRUST, thrust),
        ]
        .into_iter()
        .collect();
        modules.push(ModuleSnapshot {
            module_name: PERSISTENT_ENGINE_MODULE.into(),
            fields,
        });
    }
    PartSnapshot {
        persistent_id,
        part_name: part_name.into(),
        modules,
    }
}

fn vessel(parts: Vec<PartSnapshot>) -> VesselSnapshot {
    VesselSnapshot {
        id: "relay".into(),
        name: "Relay".into(),
        landed: false,
        splashed: false,
        autopilot_mode: AutopilotMode::Prograde,
        dry_mass: 1.0,
        resources: BTreeMap::from([
            ("XenonGas".to_string(), 500.0),
            ("ElectricCharge".to_string(), 1000.0),
        ]),
        parts,
    }
}

fn state() -> VesselBackgroundState {
    VesselBackgroundState::new(
        "relay",
        VesselKinematics {
            orbit: KeplerOrbit::circular("Kerbin", KERBIN_MU, 700_000.0, 0.0),
            facing: [0.0, 1.0, 0.0],
        },
    )
}

#[test]
fn active_engine_sums_module_thrust_and_mixtures() {
    let part = part(7, "ionEngine", Some("2"));
    let catalog = catalog();
    let mut state = state();

    let engine = load_persistent_engine(0, &part, &mut state, catalog.get("ionEngine"), &library())
        .expect("active engine");
    assert_eq!(engine.persistent_part_id, 7);
    assert_eq!(engine.module_index, 1);
    assert_eq!(engine.title, "Dawn");
    assert!((engine.max_thrust - 2.5).abs() < 1e-12);
    assert_eq!(engine.mixtures.len(), 2);
    let expected_density = (0.1 * 0.0001 + 1.8 * 0.0) / 1.9;
    assert!((engine.mixtures[0].average_density - expected_density).abs() < 1e-15);
    assert!(state.has_any_active_persistent_engine);
}

#[test]
fn inactive_engine_is_registered_but_not_returned() {
    let part = part(7, "ionEngine", Some("0"));
    let catalog = catalog();
    let mut state = state();

    assert!(
        load_persistent_engine(0, &part, &mut state, catalog.get("ionEngine"), &library())
            .is_none()
    );
    assert_eq!(state.engine_count(), 1);
    assert!(!state.has_any_active_persistent_engine);
}

#[test]
fn parts_without_persistent_engines_are_ignored() {
    let catalog = catalog();
    let library = library();
    let mut state = state();

    let stock = part(1, "stockEngine", Some("5"));
    assert!(load_persistent_engine(0, &stock, &mut state, catalog.get("stockEngine"), &library).is_none());
    let unknown = part(2, "mystery", Some("5"));
    assert!(load_persistent_engine(1, &unknown, &mut state, catalog.get("mystery"), &library).is_none());
    let no_module = part(3, "ionEngine", None);
    assert!(load_persistent_engine(2, &no_module, &mut state, catalog.get("ionEngine"), &library).is_none());
    assert_eq!(state.engine_count(), 0);
}

#[test]
fn incomplete_engine_data_keeps_registration_only() {
    let catalog = catalog();
    let library = library();
    let mut state = state();

    let dry = part(4, "dryEngine", Some("1"));
    assert!(load_persistent_engine(0, &dry, &mut state, catalog.get("dryEngine"), &library).is_none());
    let broken = part(5, "brokenEngine", Some("1"));
    assert!(load_persistent_engine(1, &broken, &mut state, catalog.get("brokenEngine"), &library).is_none());

    assert_eq!(state.engine_count(), 2);
    assert!(state.engine(4).unwrap().mixtures.is_empty());
    assert_eq!(state.engine(5).unwrap().max_thrust, 0.0);
    assert!(!state.has_any_active_persistent_engine);
}

#[test]
fn duplicate_part_ids_keep_the_first_engine() {
    let vessel = vessel(vec![part(9, "ionEngine", Some("2")), part(9, "ionEngine", Some("0"))]);
    let mut state = state();

    let active = rebuild_engines(&mut state, &vessel, &catalog(), &library());
    assert_eq!(active, 1);
    assert_eq!(state.engine_count(), 1);
    assert_eq!(state.engine(9).unwrap().part_index, 0);
}

#[test]
fn rebuild_replaces_previous_registry() {
    let catalog = catalog();
    let library = library();
    let mut state = state();

    let first = vessel(vec![part(1, "ionEngine", Some("2")), part(2, "ionEngine", Some("2"))]);
    assert_eq!(rebuild_engines(&mut state, &first, &catalog, &library), 2);

    let second = vessel(vec![part(3, "ionEngine", Some("0"))]);
    assert_eq!(rebuild_engines(&mut state, &second, &catalog, &library), 0);
    assert_eq!(state.engine_ids(), vec![3]);
    assert!(!state.has_any_active_persistent_engine);
}

#[test]
fn legacy_fields_without_thrust_flag_still_fire() {
    let fields: FieldStore = [
        (keys::PERSISTENT_THRUST, "2"),
        (keys::PERSISTENT_THROTTLE, "1"),
        (keys::VESSEL_ALIGNMENT, "1"),
        (keys::RESOURCE_CHANGE, "XenonGas=-0.1"),
        (keys::AVERAGE_DENSITY, "0.0001"),
        (keys::ISP, "4200"),
    ]
    .into_iter()
    .collect();
    let vessel = vessel(vec![PartSnapshot {
        persistent_id: 11,
        part_name: "ionEngine".into(),
        modules: vec![ModuleSnapshot {
            module_name: PERSISTENT_ENGINE_MODULE.into(),
            fields,
        }],
    }]);
    let library = library();
    let mut state = state();
    assert_eq!(rebuild_engines(&mut state, &vessel, &catalog(), &library), 1);

    let universe = Universe::new(SolarSystem::new([CelestialBody {
        name: "Kerbin".into(),
        mu: KERBIN_MU,
        radius: 600_000.0,
        orbit: None,
    }]));
    let settings = BackgroundSettings::default();
    let ctx = TickContext {
        ut: 0.0,
        elapsed: 60.0,
        library: &library,
        flight: &universe,
        settings: &settings,
    };
    let mut ledger = vessel.resources.clone();
    let report = process_unloaded_engines(&mut state, &vessel, &mut ledger, &ctx);

    assert!(matches!(report.outcomes[0].update, BackgroundUpdate::Applied { .. }));
    assert!((ledger["XenonGas"] - 494.0).abs() < 1e-9);
}
