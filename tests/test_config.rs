use std::path::PathBuf;

use clap::Parser;
use detectview::{Config, LabelRemap};

#[test]
fn test_defaults() {
    let config = Config::try_parse_from(["detectview"]).unwrap();

    assert_eq!(config.model, PathBuf::from("best.rten"));
    assert_eq!(config.labels_path(), PathBuf::from("best.names"));
    assert_eq!(config.rename, LabelRemap::new("doll", "oyuncak"));
    assert_eq!(config.input_size, 640);
    assert_eq!(config.max_detections, 300);
    assert!(config.input.is_none());
    assert!(!config.verbose);
}

#[test]
fn test_detector_config_follows_flags() {
    let config = Config::try_parse_from([
        "detectview",
        "--model",
        "models/pets.rten",
        "--confidence",
        "0.4",
        "--iou",
        "0.5",
        "--input-size",
        "320",
    ])
    .unwrap();

    let yolo = config.detector_config();
    assert_eq!(yolo.model_path, PathBuf::from("models/pets.rten"));
    assert_eq!(yolo.labels_path, PathBuf::from("models/pets.names"));
    assert_eq!(yolo.input_size, 320);
    assert!((yolo.confidence_threshold - 0.4).abs() < 1e-6);
    assert!((yolo.iou_threshold - 0.5).abs() < 1e-6);
}

#[test]
fn test_explicit_labels_and_rename() {
    let config = Config::try_parse_from([
        "detectview",
        "--labels",
        "classes.txt",
        "--rename",
        "teddy bear=oyuncak",
    ])
    .unwrap();

    assert_eq!(config.labels_path(), PathBuf::from("classes.txt"));
    assert_eq!(config.rename, LabelRemap::new("teddy bear", "oyuncak"));
}

#[test]
fn test_invalid_rename_is_rejected() {
    assert!(Config::try_parse_from(["detectview", "--rename", "doll"]).is_err());
}

#[test]
fn test_output_requires_input() {
    assert!(Config::try_parse_from(["detectview", "--output", "out.png"]).is_err());
    assert!(
        Config::try_parse_from(["detectview", "--input", "in.png", "--output", "out.png"]).is_ok()
    );
}

#[test]
fn test_input_size_below_minimum_is_rejected() {
    assert!(Config::try_parse_from(["detectview", "--input-size", "0"]).is_err());
    assert!(Config::try_parse_from(["detectview", "--input-size", "16"]).is_err());

    let config = Config::try_parse_from(["detectview", "--input-size", "32"]).unwrap();
    assert_eq!(config.input_size, 32);
}
