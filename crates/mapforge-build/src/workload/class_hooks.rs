//! Per-class fixups run after a tag body is compiled.

use mapforge_core::TagClass;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tag::{BLOCK_POINTER_OFFSET, DATA_POINTER_OFFSET, FieldStruct, FieldValue};
use crate::Result;

use super::BuildWorkload;
use super::structs::BspSlot;

impl BuildWorkload<'_> {
    pub(crate) fn run_class_hooks(
        &mut self,
        index: usize,
        root: &FieldStruct,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let class = self.tags[index].class;
        match class {
            TagClass::Scenario => self.scenario_hook(index, root, diagnostics)?,
            TagClass::Gbxmodel | TagClass::Model => self.model_hook(index, root, diagnostics),
            _ => {}
        }

        let has_assets = !self.tags[index].asset_data.is_empty();
        match class {
            TagClass::Bitmap | TagClass::Sound if !has_assets => {
                diagnostics
                    .report(DiagnosticKind::MissingAssetData)
                    .tag(self.tag_name(index))
                    .emit();
            }
            TagClass::Bitmap | TagClass::Sound => {}
            _ if has_assets => {
                diagnostics
                    .report(DiagnosticKind::UnindexableAssetData)
                    .tag(self.tag_name(index))
                    .emit();
            }
            _ => {}
        }
        Ok(())
    }

    /// Child struct behind the block or data field `name` of the base struct.
    fn child_of(&self, index: usize, root: &FieldStruct, name: &str) -> Option<usize> {
        let base = self.tags[index].base_struct?;
        let offset = root.offset_of(name)?;
        let pointer_offset = match root.field(name)? {
            FieldValue::Block { .. } => BLOCK_POINTER_OFFSET,
            FieldValue::Data { .. } => DATA_POINTER_OFFSET,
            _ => return None,
        };
        self.structs[base].resolve_pointer(offset + pointer_offset)
    }

    fn scenario_hook(
        &mut self,
        index: usize,
        root: &FieldStruct,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        if let Some(script) = self.child_of(index, root, "script_syntax_data") {
            self.structs[script].unsafe_to_dedupe = true;
        }

        if self.scenario_index != Some(index) {
            return Ok(());
        }

        match root.field("type") {
            Some(FieldValue::Uint16 { value }) => self.map_type = *value,
            Some(FieldValue::Int16 { value }) => self.map_type = *value as u16,
            _ => {}
        }

        let Some(FieldValue::Block { elements, .. }) = root.field("structure_bsps") else {
            return Ok(());
        };
        let Some(table) = self.child_of(index, root, "structure_bsps") else {
            return Ok(());
        };
        self.structs[table].unsafe_to_dedupe = true;

        for (i, element) in elements.iter().enumerate() {
            let base = i * element.size();
            let mut field = |name: &str| match element.offset_of(name) {
                Some(offset) => Ok(base + offset),
                None => Err(diagnostics
                    .report(DiagnosticKind::MalformedTag)
                    .message(format!("structure_bsps element {i} has no `{name}` field"))
                    .tag(self.tag_name(index))
                    .fail()),
            };
            let file_offset_at = field("file_offset")?;
            let size_at = field("size")?;
            let address_at = field("address")?;

            let bsp_tag = element
                .first_reference_offset()
                .and_then(|offset| self.structs[table].resolve_dependency(base + offset));

            self.bsp_slots.push(BspSlot {
                struct_index: table,
                file_offset_at,
                size_at,
                address_at,
                bsp_tag,
            });
        }
        Ok(())
    }

    fn model_hook(&mut self, index: usize, root: &FieldStruct, diagnostics: &mut Diagnostics) {
        let Some(FieldValue::Block { elements, .. }) = root.field("shaders") else {
            return;
        };
        let Some(table) = self.child_of(index, root, "shaders") else {
            return;
        };

        for (i, element) in elements.iter().enumerate() {
            let Some(offset) = element.first_reference_offset() else {
                continue;
            };
            let base = i * element.size();
            if self.structs[table].resolve_dependency(base + offset).is_none() {
                diagnostics
                    .report(DiagnosticKind::NullModelShader)
                    .message(format!("shader {i}"))
                    .tag(self.tag_name(index))
                    .emit();
            }
        }
    }
}
