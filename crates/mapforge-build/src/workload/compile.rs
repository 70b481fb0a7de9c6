//! Field trees to structs.
//!
//! A struct's slot is pushed before its children so a tag's base struct is
//! the first struct it owns. Pointers and dependencies are written as zeros
//! here and patched by the assembler.

use mapforge_core::{NULL_TAG_ID, TagClass};
use mapforge_format::write_u32_le;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tag::{
    ASSET_SIZE, BLOCK_POINTER_OFFSET, BLOCK_SIZE, DATA_POINTER_OFFSET, DATA_SIZE,
    ID_ONLY_REFERENCE_SIZE, INDEX_SIZE, MODEL_DATA_SIZE, REFERENCE_SIZE, STRING_SIZE, VERTEX_SIZE,
    FieldStruct, FieldValue,
};
use crate::{Error, Result};

use super::BuildWorkload;
use super::structs::{
    AssetLocation, AssetRef, Dependency, ModelDataKind, ModelDataRef, StructPointer,
    WorkloadStruct,
};

#[derive(Default)]
struct StructBuilder {
    data: Vec<u8>,
    pointers: Vec<StructPointer>,
    dependencies: Vec<Dependency>,
    unsafe_to_dedupe: bool,
}

impl StructBuilder {
    /// Append `size` zero bytes, returning their offset.
    fn reserve(&mut self, size: usize) -> usize {
        let offset = self.data.len();
        self.data.resize(offset + size, 0);
        offset
    }
}

impl BuildWorkload<'_> {
    /// Compile `elements` back to back into one struct owned by `owner`.
    pub(crate) fn compile_struct(
        &mut self,
        owner: usize,
        elements: &[FieldStruct],
        unsafe_to_dedupe: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize> {
        let index = self.structs.len();
        self.structs.push(WorkloadStruct {
            owner,
            ..Default::default()
        });

        let mut builder = StructBuilder {
            data: Vec::with_capacity(elements.iter().map(FieldStruct::size).sum()),
            unsafe_to_dedupe,
            ..Default::default()
        };
        for element in elements {
            self.compile_fields(owner, index, element, &mut builder, diagnostics)?;
        }

        let s = &mut self.structs[index];
        s.data = builder.data;
        s.pointers = builder.pointers;
        s.dependencies = builder.dependencies;
        s.unsafe_to_dedupe = builder.unsafe_to_dedupe;
        Ok(index)
    }

    fn compile_fields(
        &mut self,
        owner: usize,
        index: usize,
        fields: &FieldStruct,
        builder: &mut StructBuilder,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        for field in &fields.fields {
            match &field.value {
                FieldValue::Int8 { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::Uint8 { value } => builder.data.push(*value),
                FieldValue::Int16 { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::Uint16 { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::Int32 { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::Uint32 { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::Float { value } => builder.data.extend_from_slice(&value.to_le_bytes()),
                FieldValue::String { value } => {
                    if value.len() >= STRING_SIZE {
                        return Err(self.malformed(
                            owner,
                            format!(
                                "string `{}` is {} bytes, at most {} allowed",
                                field.name,
                                value.len(),
                                STRING_SIZE - 1
                            ),
                            diagnostics,
                        ));
                    }
                    let offset = builder.reserve(STRING_SIZE);
                    builder.data[offset..offset + value.len()].copy_from_slice(value.as_bytes());
                }
                FieldValue::Pad { size } => {
                    builder.reserve(*size);
                }
                FieldValue::Bytes { data } => builder.data.extend_from_slice(data),
                FieldValue::Reference {
                    class,
                    path,
                    id_only,
                } => {
                    self.compile_reference(
                        owner,
                        builder,
                        *class,
                        path.as_deref(),
                        *id_only,
                        diagnostics,
                    )?;
                }
                FieldValue::Block {
                    elements,
                    unsafe_to_dedupe,
                } => {
                    let offset = builder.reserve(BLOCK_SIZE);
                    write_u32_le(&mut builder.data, offset, elements.len() as u32);

                    let Some(first) = elements.first() else {
                        continue;
                    };
                    let size = first.size();
                    if let Some(bad) = elements.iter().position(|e| e.size() != size) {
                        return Err(self.malformed(
                            owner,
                            format!(
                                "block `{}` element {bad} is {} bytes, expected {size}",
                                field.name,
                                elements[bad].size()
                            ),
                            diagnostics,
                        ));
                    }
                    if size == 0 {
                        continue;
                    }

                    let child = self.compile_struct(owner, elements, *unsafe_to_dedupe, diagnostics)?;
                    builder.pointers.push(StructPointer {
                        struct_index: child,
                        offset: offset + BLOCK_POINTER_OFFSET,
                        limit_to_32_bits: true,
                    });
                }
                FieldValue::Data {
                    data,
                    unsafe_to_dedupe,
                } => {
                    let offset = builder.reserve(DATA_SIZE);
                    write_u32_le(&mut builder.data, offset, data.len() as u32);
                    if data.is_empty() {
                        continue;
                    }

                    let child = self.structs.len();
                    self.structs.push(WorkloadStruct {
                        data: data.clone(),
                        unsafe_to_dedupe: *unsafe_to_dedupe,
                        owner,
                        ..Default::default()
                    });
                    builder.pointers.push(StructPointer {
                        struct_index: child,
                        offset: offset + DATA_POINTER_OFFSET,
                        limit_to_32_bits: true,
                    });
                }
                FieldValue::Asset { data } => {
                    let offset = builder.reserve(ASSET_SIZE);
                    if data.is_empty() {
                        continue;
                    }
                    write_u32_le(&mut builder.data, offset, data.len() as u32);

                    let raw_index = self.raw_data.len();
                    self.raw_data.push(Some(data.clone()));
                    self.raw_sizes.push(data.len());
                    self.asset_locations.push(AssetLocation::Inline);
                    self.assets.push(AssetRef {
                        struct_index: index,
                        offset,
                        raw_index,
                    });
                    self.tags[owner].asset_data.push(raw_index);
                    builder.unsafe_to_dedupe = true;
                }
                FieldValue::Vertices { data } => {
                    self.compile_model_data(
                        owner,
                        index,
                        builder,
                        ModelDataKind::Vertices,
                        data,
                        diagnostics,
                    )?;
                }
                FieldValue::Indices { data } => {
                    self.compile_model_data(
                        owner,
                        index,
                        builder,
                        ModelDataKind::Indices,
                        data,
                        diagnostics,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn compile_reference(
        &mut self,
        owner: usize,
        builder: &mut StructBuilder,
        class: TagClass,
        path: Option<&str>,
        id_only: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let width = if id_only {
            ID_ONLY_REFERENCE_SIZE
        } else {
            REFERENCE_SIZE
        };
        let offset = builder.reserve(width);

        let Some(raw) = path.filter(|p| !p.is_empty()) else {
            if id_only {
                write_u32_le(&mut builder.data, offset, NULL_TAG_ID);
            } else {
                write_u32_le(&mut builder.data, offset, class.fourcc());
                write_u32_le(&mut builder.data, offset + 12, NULL_TAG_ID);
            }
            return Ok(());
        };

        let path = self.normalize_path(raw, Some(owner), diagnostics)?;
        let tag_index = self.load_tag(&path, class, Some(owner), diagnostics)?;
        if self.recursion && !self.compiled[tag_index] {
            self.compile_tag(tag_index, diagnostics)?;
        }

        if !id_only {
            write_u32_le(&mut builder.data, offset, self.tags[tag_index].class.fourcc());
        }
        builder.dependencies.push(Dependency {
            tag_index,
            offset,
            tag_id_only: id_only,
        });
        Ok(())
    }

    fn compile_model_data(
        &mut self,
        owner: usize,
        index: usize,
        builder: &mut StructBuilder,
        kind: ModelDataKind,
        data: &[u8],
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let unit = match kind {
            ModelDataKind::Vertices => VERTEX_SIZE,
            ModelDataKind::Indices => INDEX_SIZE,
        };
        if data.len() % unit != 0 {
            return Err(self.malformed(
                owner,
                format!(
                    "{} bytes of {} is not a multiple of {unit}",
                    data.len(),
                    match kind {
                        ModelDataKind::Vertices => "vertex data",
                        ModelDataKind::Indices => "index data",
                    }
                ),
                diagnostics,
            ));
        }

        let pool = match kind {
            ModelDataKind::Vertices => &mut self.model_vertices,
            ModelDataKind::Indices => &mut self.model_indices,
        };
        let pool_offset = pool.len();
        pool.extend_from_slice(data);

        let count = (data.len() / unit) as u32;
        let offset = builder.reserve(MODEL_DATA_SIZE);
        write_u32_le(&mut builder.data, offset, count);
        write_u32_le(&mut builder.data, offset + 4, pool_offset as u32);

        self.model_refs.push(ModelDataRef {
            struct_index: index,
            offset,
            kind,
            count,
        });
        builder.unsafe_to_dedupe = true;
        Ok(())
    }

    fn malformed(&self, owner: usize, detail: String, diagnostics: &mut Diagnostics) -> Error {
        diagnostics
            .report(DiagnosticKind::MalformedTag)
            .message(detail)
            .tag(self.tag_name(owner))
            .fail()
    }
}
