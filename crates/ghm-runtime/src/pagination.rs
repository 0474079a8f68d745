//! Page-walking over remote listings.
//!
//! Each listing carries its own transient cursor; it starts at page 1 and
//! follows `next_page` until the remote stops advertising one.

use crate::platform::Page;

const FIRST_PAGE: u32 = 1;

/// Walks pages until `predicate` matches an item or the listing is exhausted.
pub fn find_in_pages<T, E, F, P>(mut fetch_page: F, mut predicate: P) -> Result<Option<T>, E>
where
    F: FnMut(u32) -> Result<Page<T>, E>,
    P: FnMut(&T) -> bool,
{
    let mut page = FIRST_PAGE;
    loop {
        let chunk = fetch_page(page)?;
        if let Some(found) = chunk.items.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
        match advance(page, chunk.next_page) {
            Some(next) => page = next,
            None => return Ok(None),
        }
    }
}

pub fn collect_pages<T, E, F>(mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Result<Page<T>, E>,
{
    let mut page = FIRST_PAGE;
    let mut rows = Vec::new();
    loop {
        let chunk = fetch_page(page)?;
        rows.extend(chunk.items);
        match advance(page, chunk.next_page) {
            Some(next) => page = next,
            None => return Ok(rows),
        }
    }
}

// A cursor that does not move forward would never terminate.
fn advance(current: u32, next: Option<u32>) -> Option<u32> {
    next.filter(|next| *next > current)
}
