//! Test utilities: tag trees on disk, field constructors and a map decoder.

use std::path::PathBuf;

use mapforge_core::{NULL_TAG_ID, TagClass, TagPath};
use mapforge_format::{
    CacheFile, Engine, ResourceMapType, read_u16_le, read_u32_le, tag_index_from_id,
    write_resource_map,
};
use tempfile::TempDir;

use crate::tag::{VERTEX_SIZE, INDEX_SIZE};
use crate::{BuildParameters, BuiltMap, Diagnostics, Field, FieldStruct, FieldValue, TagFile};

/// A temporary directory with `tags/` and `maps/`.
pub struct TagTree {
    dir: TempDir,
}

impl TagTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tags")).unwrap();
        std::fs::create_dir_all(dir.path().join("maps")).unwrap();
        Self { dir }
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.dir.path().join("tags")
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.dir.path().join("maps")
    }

    /// Write a JSON tag file at a Halo-style path (no extension).
    pub fn write(&self, path: &str, class: TagClass, fields: Vec<Field>) {
        let file = TagFile {
            class,
            root: FieldStruct::new(fields),
        };
        self.write_raw(path, class, &serde_json::to_vec_pretty(&file).unwrap());
    }

    pub fn write_raw(&self, path: &str, class: TagClass, bytes: &[u8]) {
        let (path, _) = TagPath::normalize(path).unwrap();
        let file = path.to_file_path(&self.tags_dir(), class.extension());
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, bytes).unwrap();
    }

    pub fn write_resource_map(&self, name: &str, kind: ResourceMapType, resources: &[(&str, &[u8])]) {
        std::fs::write(self.maps_dir().join(name), write_resource_map(kind, resources)).unwrap();
    }

    /// Parameters pointing at this tree, uncompressed.
    pub fn parameters(&self, engine: Engine) -> BuildParameters {
        BuildParameters::new(engine)
            .tags_directories([self.tags_dir()])
            .maps_directory(self.maps_dir())
            .compress(false)
    }

    pub fn build(&self, scenario: &str, parameters: &BuildParameters) -> (BuiltMap, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let map = crate::compile_map(scenario, parameters, &mut diagnostics)
            .unwrap_or_else(|e| panic!("{e}\n{}", diagnostics.render()));
        (map, diagnostics)
    }
}

pub fn int32(name: &str, value: i32) -> Field {
    Field::new(name, FieldValue::Int32 { value })
}

pub fn uint32(name: &str, value: u32) -> Field {
    Field::new(name, FieldValue::Uint32 { value })
}

pub fn uint16(name: &str, value: u16) -> Field {
    Field::new(name, FieldValue::Uint16 { value })
}

pub fn float(name: &str, value: f32) -> Field {
    Field::new(name, FieldValue::Float { value })
}

pub fn string(name: &str, value: &str) -> Field {
    Field::new(
        name,
        FieldValue::String {
            value: value.to_owned(),
        },
    )
}

pub fn reference(name: &str, class: TagClass, path: &str) -> Field {
    Field::new(
        name,
        FieldValue::Reference {
            class,
            path: Some(path.to_owned()),
            id_only: false,
        },
    )
}

pub fn null_reference(name: &str, class: TagClass) -> Field {
    Field::new(
        name,
        FieldValue::Reference {
            class,
            path: None,
            id_only: false,
        },
    )
}

pub fn block(name: &str, elements: Vec<Vec<Field>>) -> Field {
    Field::new(
        name,
        FieldValue::Block {
            elements: elements.into_iter().map(FieldStruct::new).collect(),
            unsafe_to_dedupe: false,
        },
    )
}

pub fn data(name: &str, data: &[u8]) -> Field {
    Field::new(
        name,
        FieldValue::Data {
            data: data.to_vec(),
            unsafe_to_dedupe: false,
        },
    )
}

pub fn asset(name: &str, data: &[u8]) -> Field {
    Field::new(
        name,
        FieldValue::Asset {
            data: data.to_vec(),
        },
    )
}

/// One `structure_bsps` element referencing `path`.
pub fn bsp_element(path: &str) -> Vec<Field> {
    vec![
        uint32("file_offset", 0),
        uint32("size", 0),
        uint32("address", 0),
        uint32("unused", 0),
        reference("structure_bsp", TagClass::ScenarioStructureBsp, path),
    ]
}

/// Base address of tag `path` in a built map.
pub fn tag_address(map: &CacheFile, path: &str) -> u32 {
    map.tags()
        .iter()
        .find(|t| t.path == path)
        .unwrap_or_else(|| panic!("{path} not in map"))
        .entry
        .data
}

/// Read a struct back from a built map, using `schema` for its layout.
///
/// References come back as normalized paths, pointers as nested values.
pub fn decode_struct(map: &CacheFile, address: u32, schema: &FieldStruct) -> FieldStruct {
    let mut fields = Vec::new();
    let mut offset = 0u32;

    for field in &schema.fields {
        let at = address + offset;
        let bytes = map.read(at, field.value.size()).unwrap();
        let value = match &field.value {
            FieldValue::Int8 { .. } => FieldValue::Int8 {
                value: bytes[0] as i8,
            },
            FieldValue::Uint8 { .. } => FieldValue::Uint8 { value: bytes[0] },
            FieldValue::Int16 { .. } => FieldValue::Int16 {
                value: read_u16_le(bytes, 0) as i16,
            },
            FieldValue::Uint16 { .. } => FieldValue::Uint16 {
                value: read_u16_le(bytes, 0),
            },
            FieldValue::Int32 { .. } => FieldValue::Int32 {
                value: read_u32_le(bytes, 0) as i32,
            },
            FieldValue::Uint32 { .. } => FieldValue::Uint32 {
                value: read_u32_le(bytes, 0),
            },
            FieldValue::Float { .. } => FieldValue::Float {
                value: f32::from_bits(read_u32_le(bytes, 0)),
            },
            FieldValue::String { .. } => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                FieldValue::String {
                    value: String::from_utf8(bytes[..end].to_vec()).unwrap(),
                }
            }
            FieldValue::Pad { size } => FieldValue::Pad { size: *size },
            FieldValue::Bytes { .. } => FieldValue::Bytes {
                data: bytes.to_vec(),
            },
            FieldValue::Reference { class, id_only, .. } => {
                let id = if *id_only {
                    read_u32_le(bytes, 0)
                } else {
                    read_u32_le(bytes, 12)
                };
                let path = (id != NULL_TAG_ID)
                    .then(|| map.tags()[tag_index_from_id(id)].path.clone());
                FieldValue::Reference {
                    class: *class,
                    path,
                    id_only: *id_only,
                }
            }
            FieldValue::Block {
                elements,
                unsafe_to_dedupe,
            } => {
                let count = read_u32_le(bytes, 0) as usize;
                let pointer = read_u32_le(bytes, 4);
                let size = elements.first().map_or(0, |e| e.size()) as u32;
                let decoded = (0..count)
                    .map(|i| decode_struct(map, pointer + i as u32 * size, &elements[i]))
                    .collect();
                FieldValue::Block {
                    elements: decoded,
                    unsafe_to_dedupe: *unsafe_to_dedupe,
                }
            }
            FieldValue::Data {
                unsafe_to_dedupe, ..
            } => {
                let size = read_u32_le(bytes, 0) as usize;
                let pointer = read_u32_le(bytes, 12);
                let data = if size == 0 {
                    Vec::new()
                } else {
                    map.read(pointer, size).unwrap().to_vec()
                };
                FieldValue::Data {
                    data,
                    unsafe_to_dedupe: *unsafe_to_dedupe,
                }
            }
            FieldValue::Asset { .. } => {
                let size = read_u32_le(bytes, 0) as usize;
                let flags = read_u32_le(bytes, 4);
                let file_offset = read_u32_le(bytes, 8) as usize;
                let data = if size == 0 || flags & 1 != 0 {
                    Vec::new()
                } else {
                    map.bytes()[file_offset..file_offset + size].to_vec()
                };
                FieldValue::Asset { data }
            }
            FieldValue::Vertices { .. } | FieldValue::Indices { .. } => {
                let count = read_u32_le(bytes, 0) as usize;
                let pool_offset = read_u32_le(bytes, 4) as usize;
                let header = map.tag_data_header();
                let mut start = header.model_data_file_offset as usize + pool_offset;
                let len;
                if let FieldValue::Vertices { .. } = field.value {
                    len = count * VERTEX_SIZE;
                } else {
                    start += header.vertex_size as usize;
                    len = count * INDEX_SIZE;
                }
                let data = map.bytes()[start..start + len].to_vec();
                if let FieldValue::Vertices { .. } = field.value {
                    FieldValue::Vertices { data }
                } else {
                    FieldValue::Indices { data }
                }
            }
        };
        fields.push(Field::new(field.name.clone(), value));
        offset += field.value.size() as u32;
    }

    FieldStruct::new(fields)
}
