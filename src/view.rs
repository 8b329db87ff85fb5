//! Pure derivation of what the page shows from an orchestrator snapshot.

use crate::orchestrator::Snapshot;
use crate::slot::AsyncSlot;
use crate::{CarSetup, PrimaryData, QueryKind, RaceStrategy};

/// Main content area below the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultBody<'a> {
    Setup(&'a CarSetup),
    Strategy(&'a RaceStrategy),
    /// Guide loaded, no primary result yet.
    GuideOnly(&'a str),
    /// Nothing loaded, nothing loading, nothing failed.
    Empty,
    /// Something is loading or failed; banners carry the message.
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<'a> {
    pub loading: bool,
    pub guide_error: Option<&'a str>,
    pub primary_error: Option<&'a str>,
    pub body: ResultBody<'a>,
    /// Guide text shown alongside a result card.
    pub guide_text: Option<&'a str>,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
    pub show_race_length: bool,
}

/// Label for the submit button given which slots are loading.
pub fn submit_label(guide_loading: bool, primary_loading: bool) -> &'static str {
    match (guide_loading, primary_loading) {
        (true, false) => "Loading Guide...",
        (false, true) => "Loading Data...",
        (true, true) => "Loading All...",
        (false, false) => "Generate Data",
    }
}

pub fn derive(snapshot: &Snapshot) -> ViewModel<'_> {
    let guide_loading = snapshot.guide.is_loading();
    let primary_loading = snapshot.primary.is_loading();
    let guide_error = snapshot.guide.error_message();
    let primary_error = snapshot.primary.error_message();
    let guide_text = snapshot.guide.value().map(String::as_str);

    let card = match (snapshot.selection.query_kind, &snapshot.primary) {
        (QueryKind::Setup, AsyncSlot::Ready(PrimaryData::Setup(setup))) => Some(ResultBody::Setup(setup)),
        (QueryKind::Strategy, AsyncSlot::Ready(PrimaryData::Strategy(strategy))) => {
            Some(ResultBody::Strategy(strategy))
        }
        _ => None,
    };

    let primary_settled_empty = matches!(snapshot.primary, AsyncSlot::Idle)
        || matches!(&snapshot.primary, AsyncSlot::Ready(data) if data.kind() != snapshot.selection.query_kind);

    let body = if let Some(card) = card {
        card
    } else if let (Some(text), true) = (guide_text, primary_settled_empty) {
        ResultBody::GuideOnly(text)
    } else if !guide_loading && !primary_loading && guide_error.is_none() && primary_error.is_none() {
        ResultBody::Empty
    } else {
        ResultBody::Nothing
    };

    ViewModel {
        loading: guide_loading || primary_loading,
        guide_error,
        primary_error,
        body,
        guide_text,
        submit_label: submit_label(guide_loading, primary_loading),
        submit_disabled: guide_loading || primary_loading,
        show_race_length: snapshot.selection.query_kind == QueryKind::Strategy,
    }
}
