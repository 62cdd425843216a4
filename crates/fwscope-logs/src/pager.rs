use fwscope_types::{LogEntry, LogPage, PageState};

use crate::cache::LocalFilterCache;

/// The visible slice together with its position in the authoritative set.
///
/// Built in one piece so total, has_more and the slice always agree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageView {
    pub logs: Vec<LogEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl PageView {
    /// Zero-based index range shown, for "11-20 of 45" style labels
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.logs.is_empty() {
            None
        } else {
            Some((self.offset, self.offset + self.logs.len()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

/// Slicing and navigation over the authoritative set
pub struct Pager;

impl Pager {
    /// Remote mode: the service already sliced; take its answer verbatim
    pub fn remote(response: LogPage, page: PageState) -> PageView {
        PageView {
            logs: response.logs,
            total: response.total,
            limit: page.limit,
            offset: page.offset,
            has_more: response.has_more,
        }
    }

    /// Local mode: `cache[offset .. offset + limit]`
    pub fn local(cache: &LocalFilterCache, page: PageState) -> PageView {
        Self::slice(cache.entries(), page)
    }

    /// Slice any in-memory set; offsets past the end give an empty page
    pub fn slice(entries: &[LogEntry], page: PageState) -> PageView {
        let total = entries.len();
        let start = page.offset.min(total);
        let end = page.offset.saturating_add(page.limit).min(total);

        PageView {
            logs: entries[start..end].to_vec(),
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.offset.saturating_add(page.limit) < total,
        }
    }

    /// Step back one page, floored at zero
    pub fn previous(page: PageState) -> PageState {
        page.with_offset(page.offset.saturating_sub(page.limit))
    }

    /// Step forward one page, only while more records exist
    pub fn next(page: PageState, has_more: bool) -> Option<PageState> {
        has_more.then(|| page.with_offset(page.offset + page.limit))
    }

    pub fn can_previous(page: PageState) -> bool {
        page.offset > 0
    }
}
