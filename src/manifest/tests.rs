use super::*;

const LOCALIZATION_MANIFEST: &str = r#"{
    "format_version": "0.2",
    "name": "localization_table",
    "formats": {
        "smlm-table(binary)": {
            "type": "table",
            "mode": "binary",
            "columns": 3,
            "headers": ["frame", "x", "y"],
            "dtype": ["uint32", "float32", "float32"],
            "shape": [1, 1, 1],
            "units": ["frame", "nm", "nm"]
        }
    },
    "files": [
        {"name": "table-0.bin", "type": "table", "format": "smlm-table(binary)", "rows": 4},
        {"name": "preview.png", "type": "image"},
        {"name": "notes.txt", "type": "text", "format": "plain"}
    ]
}"#;

#[test]
fn test_parse_preserves_file_order_and_kinds() {
    let manifest = parse_manifest(LOCALIZATION_MANIFEST.as_bytes()).unwrap();

    let names: Vec<&str> = manifest.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["table-0.bin", "preview.png", "notes.txt"]);

    assert_eq!(manifest.files[0].kind, EntryKind::Table);
    assert_eq!(manifest.files[0].rows, Some(4));
    assert_eq!(manifest.files[1].kind, EntryKind::Image);
    assert_eq!(manifest.files[2].kind, EntryKind::Other("text".to_string()));
}

#[test]
fn test_parse_keeps_unknown_keys() {
    let manifest = parse_manifest(LOCALIZATION_MANIFEST.as_bytes()).unwrap();
    assert_eq!(manifest.extra.get("name").and_then(|v| v.as_str()), Some("localization_table"));

    let spec = &manifest.formats["smlm-table(binary)"];
    assert_eq!(spec.extra.get("columns").and_then(|v| v.as_u64()), Some(3));
    assert!(spec.extra.contains_key("units"));
}

#[test]
fn test_format_for_table_entry() {
    let manifest = parse_manifest(LOCALIZATION_MANIFEST.as_bytes()).unwrap();
    let spec = manifest.format_for(&manifest.files[0]).unwrap();
    assert_eq!(spec.headers, vec!["frame", "x", "y"]);

    // The image entry names no format.
    assert!(matches!(
        manifest.format_for(&manifest.files[1]),
        Err(SmlmError::UnknownFormat(_))
    ));
    // The text entry names one that doesn't exist.
    assert!(matches!(
        manifest.format_for(&manifest.files[2]),
        Err(SmlmError::UnknownFormat(ref k)) if k == "plain"
    ));
}

#[test]
fn test_unsupported_version_is_rejected() {
    let json = LOCALIZATION_MANIFEST.replace("\"0.2\"", "\"0.1\"");
    match parse_manifest(json.as_bytes()) {
        Err(SmlmError::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, "0.1");
            assert_eq!(expected, SUPPORTED_FORMAT_VERSION);
        }
        other => panic!("Expected UnsupportedVersion, got {:?}", other),
    }
}

#[test]
fn test_missing_top_level_fields_are_invalid() {
    let cases = [
        r#"{"formats": {}, "files": []}"#,
        r#"{"format_version": "0.2", "files": []}"#,
        r#"{"format_version": "0.2", "formats": {}}"#,
        r#"{"format_version": 2, "formats": {}, "files": []}"#,
        r#"[1, 2, 3]"#,
        r#"not json at all"#,
    ];
    for case in cases {
        let result = parse_manifest(case.as_bytes());
        assert!(
            matches!(result, Err(SmlmError::InvalidManifest(_))),
            "case {} gave {:?}",
            case,
            result
        );
    }
}

#[test]
fn test_wrongly_shaped_files_are_invalid() {
    let json = r#"{"format_version": "0.2", "formats": {}, "files": {"name": "a"}}"#;
    assert!(matches!(parse_manifest(json.as_bytes()), Err(SmlmError::InvalidManifest(_))));
}

#[test]
fn test_table_entry_without_rows_is_invalid() {
    let json = r#"{
        "format_version": "0.2",
        "formats": {},
        "files": [{"name": "t.bin", "type": "table", "format": "f"}]
    }"#;
    match parse_manifest(json.as_bytes()) {
        Err(SmlmError::InvalidManifest(msg)) => assert!(msg.contains("rows")),
        other => panic!("Expected InvalidManifest, got {:?}", other),
    }
}

#[test]
fn test_entry_kind_serializes_back_to_type_string() {
    let entry = FileEntry {
        name: "a.bin".to_string(),
        kind: EntryKind::Other("text".to_string()),
        format: None,
        rows: None,
        extra: Map::new(),
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["type"], "text");
    assert!(json.get("rows").is_none());
}
