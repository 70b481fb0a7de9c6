use indoc::indoc;
use mapforge_core::TagClass;

use super::*;

#[test]
fn parse_json_tag() {
    let json = indoc! {r#"
        {
          "class": "scenery",
          "root": [
            { "name": "flags", "type": "uint16", "value": 3 },
            { "name": "", "type": "pad", "size": 2 },
            { "name": "model", "type": "reference", "class": "gbxmodel", "path": "scenery\\rock\\rock" },
            { "name": "collision", "type": "reference", "class": "model_collision_geometry" },
            { "name": "attachments", "type": "block", "elements": [
              [ { "name": "marker", "type": "string", "value": "smoke" } ]
            ] }
          ]
        }
    "#};

    let file = JsonTagParser.parse(TagClass::Scenery, json.as_bytes()).unwrap();

    assert_eq!(file.root.fields.len(), 5);
    assert_eq!(file.root.size(), 2 + 2 + 16 + 16 + 12);
    assert_eq!(file.root.offset_of("model"), Some(4));
    assert_eq!(file.root.first_reference_offset(), Some(4));
    assert_eq!(
        file.root.field("collision"),
        Some(&FieldValue::Reference {
            class: TagClass::ModelCollisionGeometry,
            path: None,
            id_only: false,
        })
    );
}

#[test]
fn class_mismatch_is_rejected() {
    let json = r#"{ "class": "bitmap", "root": [] }"#;
    let err = JsonTagParser
        .parse(TagClass::Sound, json.as_bytes())
        .unwrap_err();

    assert!(matches!(
        err,
        TagParseError::ClassMismatch {
            expected: TagClass::Sound,
            found: TagClass::Bitmap
        }
    ));
    assert_eq!(err.to_string(), "expected a sound tag, found bitmap");
}

#[test]
fn invalid_json_is_rejected() {
    let err = JsonTagParser
        .parse(TagClass::Sound, b"{ not json")
        .unwrap_err();
    assert!(matches!(err, TagParseError::Json(_)));
}

#[test]
fn field_sizes() {
    let id_only = FieldValue::Reference {
        class: TagClass::Scenario,
        path: None,
        id_only: true,
    };
    assert_eq!(id_only.size(), 4);
    assert_eq!(FieldValue::Pad { size: 7 }.size(), 7);
    assert_eq!(FieldValue::Asset { data: vec![1; 100] }.size(), 20);
    assert_eq!(FieldValue::Vertices { data: vec![] }.size(), 12);
}

#[test]
fn serialize_roundtrip_preserves_tree() {
    let file = TagFile {
        class: TagClass::Shader,
        root: FieldStruct::new(vec![
            Field::new("radiosity", FieldValue::Float { value: 0.5 }),
            Field::new(
                "maps",
                FieldValue::Data {
                    data: vec![1, 2, 3],
                    unsafe_to_dedupe: false,
                },
            ),
        ]),
    };
    let json = serde_json::to_vec(&file).unwrap();
    let back = JsonTagParser.parse(TagClass::Shader, &json).unwrap();
    assert_eq!(back, file);
}
