//! Record extraction paths
//!
//! Both paths return lazy record streams; nothing is fetched until the
//! engine pulls the first record.

use crate::client::ResourceAccessor;
use crate::pagination::{paginate, AfterRecordPaginator, RecordStream, AFTER_PARAM};
use crate::types::{scalar_to_string, JsonObject, QueryParams};
use tracing::debug;

/// Query parameters for an incremental pass: the bookmarks, stringified,
/// plus the page size
pub fn incremental_params(bookmarks: &JsonObject, page_size: u32) -> QueryParams {
    let mut params: QueryParams = bookmarks
        .iter()
        .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
        .collect();
    params.insert("limit".to_string(), page_size.to_string());
    params
}

/// Records newer than the bookmarks
///
/// Pages until an empty page comes back; after each page the `after` cursor
/// is set to `key_field` of the page's last record.
pub fn incremental_records<'a>(
    accessor: &'a dyn ResourceAccessor,
    bookmarks: &JsonObject,
    page_size: u32,
    key_field: &str,
) -> RecordStream<'a> {
    let params = incremental_params(bookmarks, page_size);
    debug!(stream = accessor.stream_id(), params = ?params, "Incremental extraction");
    paginate(
        accessor,
        params,
        AfterRecordPaginator::new(AFTER_PARAM, key_field),
    )
}

/// Every record, following the API's own cursor
pub fn full_records(accessor: &dyn ResourceAccessor) -> RecordStream<'_> {
    debug!(stream = accessor.stream_id(), "Full table extraction");
    accessor.all()
}
