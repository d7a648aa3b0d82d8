use omnimv::prelude::*;

const SETUP: &str = r#"{
    "projection": { "type": "equisolid", "focal_length": 320.0,
                    "center_x": 639.5, "center_y": 639.5 },
    "width": 1280,
    "height": 1280,
    "reprojection": {
        "active": { "mpa_front_back": true, "rotational": true, "geodesic_camera_pose": true },
        "geodesic_flavor": "vishwanath_original",
        "subblock_offset": 4
    },
    "epipoles": [
        { "epipole": [1.0, 0.0, 0.0], "available": true },
        { "cur_poc": 8, "ref_poc": 0, "epipole": [0.0, 0.6, 0.8] }
    ]
}"#;

#[test]
fn setup_builds_an_engine_with_the_configured_models() {
    let setup = load_config(SETUP).unwrap();
    assert_eq!(setup.reprojection.geodesic_flavor, GeodesicFlavor::VishwanathOriginal);
    let engine = setup.build().unwrap();
    assert!(engine.is_active(MotionModelId::MpaFrontBack));
    assert!(engine.is_active(MotionModelId::GeodesicCameraPose));
    assert!(!engine.is_active(MotionModelId::Tangential));
    // Offset 4 places motion samples 1.5 samples into each sub-block.
    assert_eq!(engine.subblock_grid().x[(0, 1)], 5.5);

    // The pair entry was not made available, so the global epipole applies.
    assert_eq!(engine.epipoles().find_epipole(8, 0).unwrap(), Vec3::x());
    assert!((engine.projection().focal_length() - 320.0).abs() < 1e-12);
}

#[test]
fn setup_builds_a_legacy_engine() {
    let setup = load_config(SETUP).unwrap();
    let legacy = setup.build_legacy().unwrap();
    let mv = MotionVector::new(24, 8);
    let position = Pt2::new(660.0, 650.0);
    let out = legacy.motion_vector_in_desired_viewport(
        mv,
        4,
        Viewport::Classic,
        Viewport::FrontBack,
        &position,
    );
    // Near the optical axis the front viewport sees almost the same motion.
    assert!((out.hor - mv.hor).abs() <= 1 && (out.ver - mv.ver).abs() <= 1, "{out:?}");
}

#[test]
fn invalid_picture_size_fails_to_build() {
    let mut setup = load_config(SETUP).unwrap();
    setup.width = 1282;
    let err = setup.build().unwrap_err();
    assert!(format!("{err:#}").contains("multiple of 4"));
    let err = setup.build_legacy().unwrap_err();
    assert!(format!("{err:#}").contains("multiple of 4"));
}
