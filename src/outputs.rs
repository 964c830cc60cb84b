//! Output window assembler
//!
//! An output is a named, bounded window of the timeline ending at its
//! target entry, partitioned into `members` (exported) and `ignored`
//! (excluded). The assembler keeps those partitions valid after every
//! timeline mutation; it never decides export formatting.

use crate::domain::entities::Output;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{EntryId, OutputId};
use crate::timeline::Timeline;
use std::collections::HashMap;

/// Reconcile all output windows against the current timeline.
///
/// Outputs are sorted by the timeline index of their target; consecutive
/// targets partition the timeline into disjoint windows. Entries new to a
/// window default to `ignored`; entries that left the window are purged
/// from both lists; `ignored` stays sorted by timeline index.
///
/// Returns the derived entry-to-output ownership map.
pub fn reconcile(
    outputs: &mut Vec<Output>,
    timeline: &Timeline,
) -> Result<HashMap<EntryId, OutputId>, DomainError> {
    let mut targets = Vec::with_capacity(outputs.len());
    for output in outputs.iter() {
        let index = timeline
            .index_of(&output.target_entry)
            .ok_or_else(|| DomainError::entry_not_found(output.target_entry.clone()))?;
        if targets.iter().any(|(_, i)| *i == index) {
            return Err(DomainError::invalid_operation(format!(
                "outputs overlap at timeline index {index}"
            )));
        }
        targets.push((output.id.clone(), index));
    }

    outputs.sort_by_key(|output| {
        timeline
            .index_of(&output.target_entry)
            .expect("validated above")
    });

    let mut owners = HashMap::new();
    let mut window_start = 0usize;
    for output in outputs.iter_mut() {
        let target_index = timeline
            .index_of(&output.target_entry)
            .expect("validated above");
        let window: Vec<EntryId> = timeline.order()[window_start..=target_index].to_vec();

        output.members.retain(|id| window.contains(id));
        output.ignored.retain(|id| window.contains(id));
        for id in &window {
            if !output.contains(id) {
                output.ignored.push(id.clone());
            }
            owners.insert(id.clone(), output.id.clone());
        }
        let position = |id: &EntryId| timeline.index_of(id).unwrap_or(usize::MAX);
        output.ignored.sort_by_key(position);

        window_start = target_index + 1;
    }

    Ok(owners)
}
