use crate::CoreError;
use std::collections::HashSet;
use suitestore_schema::{ComponentType, IdSpace, SuiteRecord};

/// Pick a fresh id for `kind` given the current registry entries.
///
/// The next id after the largest one in use is taken. Only when that would
/// reach the namespace sentinel are ids searched from 1 upward, skipping
/// occupied and reserved values.
pub fn allocate_id<'a>(
    records: impl IntoIterator<Item = &'a SuiteRecord>,
    kind: ComponentType,
) -> Result<i32, CoreError> {
    allocate_in(records, kind, kind.id_space())
}

/// [`allocate_id`] over an explicit id space.
pub fn allocate_in<'a>(
    records: impl IntoIterator<Item = &'a SuiteRecord>,
    kind: ComponentType,
    space: IdSpace,
) -> Result<i32, CoreError> {
    let used = records
        .into_iter()
        .filter(|r| r.kind == kind)
        .map(SuiteRecord::namespace_id);
    next_free_id(used, space).ok_or_else(|| CoreError::OutOfStorage(format!("no free {kind} id")))
}

/// Core of the allocator over the raw ids already in use. `None` when the
/// space is exhausted.
pub fn next_free_id(used: impl IntoIterator<Item = i32>, space: IdSpace) -> Option<i32> {
    let mut max_id = 1;
    let mut occupied = HashSet::new();
    for id in used {
        max_id = max_id.max(id);
        occupied.insert(id);
    }

    if let Some(candidate) = max_id.checked_add(1).filter(|&c| c < space.max) {
        return Some(candidate);
    }

    (1..space.max).find(|id| !space.is_reserved(*id) && !occupied.contains(id))
}
