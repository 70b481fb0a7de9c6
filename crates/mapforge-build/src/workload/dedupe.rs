//! Struct deduplication.
//!
//! Runs in rounds. Each round groups eligible structs by their bytes, BSP,
//! outgoing pointers and dependencies; every group collapses into its lowest
//! index. Pointers are then rewritten, which can make parents identical for
//! the next round. Stops when a round merges nothing.

use std::collections::HashMap;

use super::BuildWorkload;
use super::structs::{Dependency, StructPointer};

/// Identity of a struct for merging purposes.
#[derive(PartialEq, Eq, Hash)]
struct StructKey<'s> {
    data: &'s [u8],
    bsp: Option<usize>,
    pointers: Vec<StructPointer>,
    dependencies: Vec<Dependency>,
}

impl BuildWorkload<'_> {
    pub(crate) fn deduplicate(&mut self) {
        let mut eligible = vec![true; self.structs.len()];
        for (index, s) in self.structs.iter().enumerate() {
            if s.unsafe_to_dedupe {
                eligible[index] = false;
            }
        }
        for tag in &self.tags {
            if let Some(base) = tag.base_struct {
                eligible[base] = false;
            }
        }

        let mut merged = 0;
        let mut bytes_saved = 0;

        loop {
            let mut redirect: Vec<usize> = (0..self.structs.len()).collect();
            let mut round = 0;

            let mut seen: HashMap<StructKey<'_>, usize> = HashMap::new();
            for (index, s) in self.structs.iter().enumerate() {
                if !eligible[index] {
                    continue;
                }
                let mut pointers = s.pointers.clone();
                pointers.sort_by_key(|p| p.offset);
                let mut dependencies = s.dependencies.clone();
                dependencies.sort_by_key(|d| d.offset);

                let key = StructKey {
                    data: &s.data,
                    bsp: s.bsp,
                    pointers,
                    dependencies,
                };
                match seen.get(&key) {
                    Some(&representative) => {
                        redirect[index] = representative;
                        round += 1;
                        bytes_saved += s.data.len();
                    }
                    None => {
                        seen.insert(key, index);
                    }
                }
            }
            drop(seen);

            if round == 0 {
                break;
            }
            merged += round;

            for (index, &target) in redirect.iter().enumerate() {
                if target != index {
                    eligible[index] = false;
                }
            }
            for s in &mut self.structs {
                for p in &mut s.pointers {
                    p.struct_index = redirect[p.struct_index];
                }
            }
        }

        self.report.dedupe_merged = merged;
        self.report.dedupe_bytes_saved = bytes_saved;
    }
}
