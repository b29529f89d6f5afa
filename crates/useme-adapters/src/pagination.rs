use std::future::Future;

use tracing::debug;

/// Fetches pages `start, start + 1, ...` up to `budget` pages, concatenating
/// their items and stopping at the first empty page. Page numbers never pass
/// `u32::MAX`.
pub async fn collect_pages<T, F, Fut>(start: u32, budget: u32, mut fetch: F) -> Vec<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Vec<T>>,
{
    if budget == 1 {
        return fetch(start).await;
    }

    let mut items = Vec::new();
    for page in (0..budget).map_while(|offset| start.checked_add(offset)) {
        let batch = fetch(page).await;
        if batch.is_empty() {
            debug!(target: "useme::pagination", page, "empty page, stopping pagination");
            break;
        }
        debug!(target: "useme::pagination", page, found = batch.len(), "page collected");
        items.extend(batch);
    }
    items
}
