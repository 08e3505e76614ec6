//! Lazy record streams over paginated list endpoints

use super::types::{NextPage, PaginationState, Paginator};
use crate::client::ResourceAccessor;
use crate::error::{Error, Result};
use crate::types::{QueryParams, Record};
use futures::stream::{self, Stream, TryStreamExt};
use std::pin::Pin;
use tracing::debug;

/// A lazy, finite stream of records
///
/// Each page's records are yielded before the next page is requested.
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<Record>> + Send + 'a>>;

struct Cursor<P> {
    params: Option<QueryParams>,
    state: PaginationState,
    paginator: P,
}

/// Page through `accessor` starting from `base_params`
///
/// The paginator decides after every page whether to continue and which
/// parameters to overlay on the previous request. Nothing is requested until
/// the stream is polled.
pub fn paginate<'a, A, P>(
    accessor: &'a A,
    base_params: QueryParams,
    paginator: P,
) -> RecordStream<'a>
where
    A: ResourceAccessor + ?Sized,
    P: Paginator + 'a,
{
    let state = PaginationState::new();
    let mut params = base_params;
    params.extend(paginator.initial_params(&state));

    let cursor = Cursor {
        params: Some(params),
        state,
        paginator,
    };

    let pages = stream::try_unfold(cursor, move |mut cursor| async move {
        let Some(params) = cursor.params.take() else {
            return Ok::<_, Error>(None);
        };

        debug!(stream = accessor.stream_id(), params = ?params, "Requesting page");
        let page = accessor.list(&params).await?;
        cursor.state.next_page();

        let next = cursor.paginator.process_page(&page, &mut cursor.state)?;
        debug!(
            stream = accessor.stream_id(),
            page = cursor.state.pages,
            records = page.records.len(),
            "Fetched page"
        );

        cursor.params = match next {
            NextPage::Continue { query_params } => {
                let mut params = params;
                params.extend(query_params);
                Some(params)
            }
            NextPage::Done => None,
        };

        Ok::<_, Error>(Some((page.records, cursor)))
    });

    Box::pin(
        pages
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<Record, Error>)))
            .try_flatten(),
    )
}
