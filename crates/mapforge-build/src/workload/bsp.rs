//! BSP partitioning.
//!
//! Each BSP listed by the scenario is loaded on its own, so its structs go
//! into a separate section. Everything else is global.

use mapforge_core::TagClass;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::Result;

use super::BuildWorkload;

impl BuildWorkload<'_> {
    /// Assign BSP indices in slot order and tag every struct reachable from
    /// a BSP tag with its index.
    pub(crate) fn partition_bsps(&mut self, diagnostics: &mut Diagnostics) -> Result<()> {
        for slot in &self.bsp_slots {
            if let Some(tag) = slot.bsp_tag
                && !self.bsp_tags.contains(&tag)
            {
                self.bsp_tags.push(tag);
            }
        }

        for bsp in 0..self.bsp_tags.len() {
            let tag = self.bsp_tags[bsp];
            let Some(base) = self.tags[tag].base_struct else {
                continue;
            };

            let mut stack = vec![base];
            while let Some(index) = stack.pop() {
                match self.structs[index].bsp {
                    Some(existing) if existing == bsp => continue,
                    Some(existing) => {
                        let other = self.tag_name(self.bsp_tags[existing]);
                        return Err(diagnostics
                            .report(DiagnosticKind::BspConflict)
                            .message(format!("struct #{index} is also reachable from {other}"))
                            .tag(self.tag_name(tag))
                            .fail());
                    }
                    None => {}
                }
                self.structs[index].bsp = Some(bsp);
                stack.extend(self.structs[index].pointers.iter().map(|p| p.struct_index));
            }
        }

        for (index, tag) in self.tags.iter().enumerate() {
            if tag.class == TagClass::ScenarioStructureBsp && !self.bsp_tags.contains(&index) {
                diagnostics
                    .report(DiagnosticKind::UnlistedBsp)
                    .tag(tag.display_name())
                    .emit();
            }
        }

        self.report.bsp_count = self.bsp_tags.len();
        debug!(bsps = self.bsp_tags.len(), "partitioned BSPs");
        Ok(())
    }

    /// BSP index of a tag, if it is one of the scenario's BSPs.
    pub(crate) fn bsp_of_tag(&self, tag: usize) -> Option<usize> {
        self.bsp_tags.iter().position(|&t| t == tag)
    }
}
