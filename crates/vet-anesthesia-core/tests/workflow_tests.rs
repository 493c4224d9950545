//! End-to-end tests through the FFI object: records, sessions, protocols
//! and prescriptions.

use vet_anesthesia_core::{open_database, open_database_in_memory, AnesthesiaError};

#[test]
fn test_bolus_session_to_prescription() {
    let core = open_database_in_memory().unwrap();

    let rex = core
        .create_animal("Rex".into(), "Canine".into(), 10.0, Some("Beagle".into()), Some(4))
        .unwrap();
    let propofol = core
        .create_drug(
            "Propofol".into(),
            4.0,
            "mg/kg".into(),
            10.0,
            "mg/ml".into(),
            "bolus".into(),
        )
        .unwrap();
    assert_eq!(propofol.concentration_unit, "mg/mL");

    let plan = core
        .plan_dose(rex.local_id.clone(), propofol.local_id.clone())
        .unwrap();
    assert_eq!(plan.mode, "bolus");
    assert_eq!(plan.bolus_volume_ml, Some(4.0));
    assert!(plan.infusion.is_none());

    let session = core
        .register_session(rex.local_id.clone(), propofol.local_id.clone(), None, None)
        .unwrap();
    assert_eq!(session.kind, "registered");
    assert!((session.dose_used_ml - 4.0).abs() < 1e-9);

    let text = core.prescription_text(session.session_id.clone()).unwrap();
    assert!(text.contains("Name: Rex"));
    assert!(text.contains("Species: Canine"));
    assert!(text.contains("Weight: 10 kg"));
    assert!(text.contains("Medication: Propofol"));
    assert!(text.contains("Volume administered: 4.00 mL"));

    let json = core.prescription_json(session.session_id).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["kind"], "registered");
    assert_eq!(value["patient"]["name"], "Rex");
}

#[test]
fn test_infusion_session_uses_configured_defaults() {
    let core = open_database_in_memory().unwrap();
    core.set_infusion_defaults(1.0, "micro".into(), 250.0).unwrap();

    let bella = core
        .create_animal("Bella".into(), "canine".into(), 15.5, None, None)
        .unwrap();
    let dexmed = core
        .create_drug(
            "Dexmedetomidine".into(),
            1.0,
            "mcg/kg/h".into(),
            0.5,
            "mg/mL".into(),
            "continuous infusion".into(),
        )
        .unwrap();
    assert_eq!(dexmed.dose_unit, "µg/kg/h");
    assert_eq!(dexmed.mode, "continuous_infusion");

    let plan = core
        .plan_dose(bella.local_id.clone(), dexmed.local_id.clone())
        .unwrap();
    let infusion = plan.infusion.unwrap();
    // 1 µg/kg/h * 15.5 kg / 500 µg/mL
    assert_eq!(infusion.flow_ml_per_hour, 0.03);
    assert_eq!(infusion.delivery_set, "micro");
    assert_eq!(infusion.bag_volume_ml, 250.0);

    // The administered volume is mandatory for an infusion drug
    let err = core
        .register_session(bella.local_id.clone(), dexmed.local_id.clone(), None, None)
        .unwrap_err();
    assert!(matches!(err, AnesthesiaError::InvalidInput(_)));

    let session = core
        .register_session(
            bella.local_id.clone(),
            dexmed.local_id.clone(),
            Some(3.0),
            Some("Maintenance CRI".into()),
        )
        .unwrap();
    assert!(session.infusion_config_id.is_some());

    // Fluid config: 15.5 mL/h on a micro set from 250 mL
    let text = core.prescription_text(session.session_id).unwrap();
    assert!(text.contains("Bag volume: 250 mL"));
    assert!(text.contains("Delivery set: micro"));
    assert!(text.contains("Rate: 15.50 mL/h"));
    assert!(text.contains("Drops/min: 15.50"));
    assert!(text.contains("Estimated duration: 16.13 hours (16 h 08 min)"));
    assert!(text.contains("Maintenance CRI"));
}

#[test]
fn test_walk_in_and_session_list() {
    let core = open_database_in_memory().unwrap();
    let rex = core
        .create_animal("Rex".into(), "canine".into(), 10.0, None, None)
        .unwrap();
    let propofol = core
        .create_drug(
            "Propofol".into(),
            4.0,
            "mg/kg".into(),
            10.0,
            "mg/mL".into(),
            "bolus".into(),
        )
        .unwrap();

    core.register_session(rex.local_id.clone(), propofol.local_id.clone(), None, None)
        .unwrap();
    let walk_in = core
        .register_walk_in(
            "feline".into(),
            "Mia".into(),
            4.0,
            propofol.local_id.clone(),
            None,
            None,
        )
        .unwrap();
    assert_eq!(walk_in.kind, "walk_in");
    assert_eq!(walk_in.animal_name.as_deref(), Some("Mia"));

    let sessions = core.list_sessions().unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions
        .iter()
        .any(|s| s.kind == "walk_in" && s.animal_label == "Mia (walk-in)"));

    // Removing the animal keeps its session, without a patient
    assert!(core.delete_animal(rex.local_id).unwrap());
    let sessions = core.list_sessions().unwrap();
    assert!(sessions
        .iter()
        .any(|s| s.kind == "registered" && s.animal_label == "N/A"));
}

#[test]
fn test_protocol_lifecycle() {
    let core = open_database_in_memory().unwrap();
    let mut ids = Vec::new();
    for name in ["Acepromazine", "Propofol", "Isoflurane"] {
        let drug = core
            .create_drug(
                name.into(),
                0.05,
                "mg/kg".into(),
                10.0,
                "mg/mL".into(),
                "bolus".into(),
            )
            .unwrap();
        ids.push(drug.local_id);
    }

    let protocol = core
        .create_protocol(
            "Canine premedication".into(),
            Some("ASA I-II".into()),
            vec![ids[1].clone(), "ghost".into(), ids[0].clone()],
        )
        .unwrap();

    let steps = core.protocol_steps(protocol.protocol_id.clone()).unwrap();
    let names: Vec<_> = steps.iter().map(|s| s.drug.name.as_str()).collect();
    assert_eq!(names, ["Propofol", "Acepromazine"]);
    assert_eq!(steps[1].position, 2);

    let position = core
        .add_drug_to_protocol(protocol.protocol_id.clone(), ids[2].clone(), None)
        .unwrap();
    assert_eq!(position, 3);

    assert!(matches!(
        core.add_drug_to_protocol(protocol.protocol_id.clone(), "ghost".into(), None),
        Err(AnesthesiaError::NotFound(_))
    ));

    assert!(core
        .remove_drug_from_protocol(protocol.protocol_id.clone(), ids[1].clone())
        .unwrap());
    assert_eq!(core.protocol_steps(protocol.protocol_id.clone()).unwrap().len(), 2);

    assert!(core.delete_protocol(protocol.protocol_id.clone()).unwrap());
    assert!(core.list_protocols().unwrap().is_empty());
    assert!(core.protocol_steps(protocol.protocol_id).unwrap().is_empty());
}

#[test]
fn test_record_updates_and_search() {
    let core = open_database_in_memory().unwrap();
    let mut rex = core
        .create_animal("Rex".into(), "canine".into(), 10.0, None, None)
        .unwrap();
    rex.weight_kg = 12.5;
    assert!(core.update_animal(rex.clone()).unwrap());
    assert_eq!(core.get_animal(rex.local_id.clone()).unwrap().unwrap().weight_kg, 12.5);

    rex.weight_kg = 0.0;
    assert!(matches!(
        core.update_animal(rex),
        Err(AnesthesiaError::InvalidInput(_))
    ));

    let mut ketamine = core
        .create_drug(
            "Ketamine".into(),
            5.0,
            "mg/kg".into(),
            100.0,
            "mg/mL".into(),
            "bolus".into(),
        )
        .unwrap();
    ketamine.route = Some("IM".into());
    ketamine.comment = Some("Controlled substance".into());
    assert!(core.update_drug(ketamine.clone()).unwrap());

    let found = core.search_drugs("ketamin".into(), 5).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].route.as_deref(), Some("IM"));

    assert!(core.get_drug("ghost".into()).unwrap().is_none());
    assert!(core.delete_drug(ketamine.local_id).unwrap());
    assert!(core.list_drugs().unwrap().is_empty());
}

#[test]
fn test_invalid_records_rejected() {
    let core = open_database_in_memory().unwrap();

    assert!(matches!(
        core.create_animal("Ghost".into(), "canine".into(), 0.0, None, None),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    assert!(matches!(
        core.create_drug(
            "Bad".into(),
            1.0,
            "mg/kg".into(),
            0.0,
            "mg/mL".into(),
            "bolus".into(),
        ),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    assert!(matches!(
        core.create_drug(
            "Bad".into(),
            1.0,
            "grains/kg".into(),
            1.0,
            "mg/mL".into(),
            "bolus".into(),
        ),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    // A rate unit on a bolus drug, and a per-weight unit on an infusion drug
    assert!(matches!(
        core.create_drug(
            "Bad".into(),
            1.0,
            "mg/kg/min".into(),
            1.0,
            "mg/mL".into(),
            "bolus".into(),
        ),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    assert!(matches!(
        core.create_drug(
            "Bad".into(),
            1.0,
            "mg/kg".into(),
            1.0,
            "mg/mL".into(),
            "cri".into(),
        ),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    assert!(core.list_drugs().unwrap().is_empty());
    assert!(matches!(
        core.set_infusion_defaults(1.0, "nano".into(), 20.0),
        Err(AnesthesiaError::InvalidInput(_))
    ));
    assert!(matches!(
        core.prescription_text("ghost".into()),
        Err(AnesthesiaError::NotFound(_))
    ));
}

#[test]
fn test_free_functions() {
    use vet_anesthesia_core::{
        compute_bolus_volume, compute_continuous_infusion_rate, compute_drip_rate,
        compute_drug_volume_for_reservoir, compute_infusion_duration, format_infusion_duration,
        plan_infusion,
    };

    // 0.2 mg/kg over 500 µg/mL for 10 kg: 2000 µg / 500 µg/mL
    let volume =
        compute_bolus_volume(10.0, 0.2, "mg/kg".into(), 500.0, "µg/mL".into()).unwrap();
    assert!((volume - 4.0).abs() < 1e-9);

    let flow = compute_continuous_infusion_rate(10.0, 5.0, "ug/kg/h".into(), 0.5, "mg/ml".into())
        .unwrap();
    assert!((flow - 0.1).abs() < 1e-9);

    assert!(matches!(
        compute_continuous_infusion_rate(10.0, 5.0, "mg/kg".into(), 0.5, "mg/ml".into()),
        Err(AnesthesiaError::InvalidInput(_))
    ));

    assert!((compute_drip_rate(30.0, "macro".into()).unwrap() - 10.0).abs() < 1e-9);
    assert!((compute_drip_rate(30.0, "microgotas".into()).unwrap() - 30.0).abs() < 1e-9);

    assert!(matches!(
        compute_infusion_duration(20.0, 0.0),
        Err(AnesthesiaError::DivisionGuard(_))
    ));
    assert_eq!(format_infusion_duration(1.29), "1 h 17 min");

    assert!(matches!(
        compute_drug_volume_for_reservoir(0.25, 10.0, 20.0, 2.0),
        Err(AnesthesiaError::CapacityExceeded(_))
    ));
    let prep = compute_drug_volume_for_reservoir(0.1, 10.0, 20.0, 2.0).unwrap();
    assert!((prep.drug_volume_ml - 10.0).abs() < 1e-9);
    assert!((prep.diluent_volume_ml - 10.0).abs() < 1e-9);

    let plan = plan_infusion(250.0, 15.5, "macro".into()).unwrap();
    assert_eq!(plan.drip_rate_per_minute, 5.17);
    assert_eq!(plan.duration_display, "16 h 08 min");
}

#[test]
fn test_database_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db").to_string_lossy().to_string();

    let animal_id = {
        let core = open_database(path.clone()).unwrap();
        core.create_animal("Rex".into(), "canine".into(), 10.0, None, None)
            .unwrap()
            .local_id
    };

    let core = open_database(path).unwrap();
    let rex = core.get_animal(animal_id).unwrap().unwrap();
    assert_eq!(rex.name, "Rex");
}
