//! Descendant discovery over `parent_id` links.

use std::collections::{HashSet, VecDeque};

use stash_core::result::AppResult;
use stash_core::types::FolderId;
use stash_database::FolderStore;
use stash_entity::folder::FolderQuery;

use crate::deadline::StoreDeadline;

/// Collect every folder reachable from `root` by following child links,
/// trashed or not, in breadth-first order. `root` itself is not included.
///
/// Uses an explicit work queue so arbitrarily deep trees do not grow the
/// stack. The visited set keeps the walk finite even if the stored links
/// were ever corrupted into a cycle.
pub async fn collect_descendants(
    folders: &dyn FolderStore,
    deadline: &StoreDeadline,
    root: FolderId,
) -> AppResult<Vec<FolderId>> {
    let mut queue = VecDeque::from([root]);
    let mut seen = HashSet::from([root]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        let children = deadline
            .run(folders.find(&FolderQuery::children_of(current)))
            .await?;
        for child in children {
            if seen.insert(child.id) {
                found.push(child.id);
                queue.push_back(child.id);
            }
        }
    }

    Ok(found)
}
