use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{rejection::FormRejection, State},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
    Form,
};
use chainsight_ai::AnalysisEvent;
use futures::stream::{self, BoxStream, StreamExt};

use crate::{error::ApiResult, main_lib::AppState, models::AnalysisRequest};

type EventStream = BoxStream<'static, Result<Event, Infallible>>;

/// Stream a model analysis of the (symbol, expiry) option chain.
///
/// Every outcome is a 200 event stream: text fragments then `[END]`, or a
/// single error event.
#[utoipa::path(
    post,
    path = "/stream_analysis",
    request_body(content = AnalysisRequest, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, description = "Analysis event stream"))
)]
pub async fn stream_analysis(
    State(state): State<Arc<AppState>>,
    form: Result<Form<AnalysisRequest>, FormRejection>,
) -> ApiResult<Sse<KeepAliveStream<EventStream>>> {
    let Form(request) = form?;

    let events = match state
        .option_chain_cache
        .get_options_data(&request.symbol, &request.expiry_date)
        .await
    {
        Some(snapshot) => state.analysis_service.stream_analysis(
            &request.symbol,
            &request.expiry_date,
            &snapshot,
        ),
        None => stream::once(async { AnalysisEvent::fetch_failed() }).boxed(),
    };

    let stream = events.map(|event| Ok(to_sse_event(&event))).boxed();

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// A line break inside a payload continues the same event on a new `data:` line.
fn to_sse_event(event: &AnalysisEvent) -> Event {
    Event::default().data(normalize_line_breaks(event.data()))
}

// The event encoder rejects carriage returns.
fn normalize_line_breaks(data: &str) -> String {
    data.replace("\r\n", "\n").replace('\r', "\n")
}
