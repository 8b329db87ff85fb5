//! Main module for the race engineer application using Yew.
//! Wires the orchestrator hook, the configuration form and the result view.

use race_engineer::catalog::{self, CatalogKind};
use race_engineer::selection::SelectionEdit;
use race_engineer::view::{derive, ResultBody};
use race_engineer::{logging, QueryKind};
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

mod components;
mod hooks;

use components::{
    EmptyState, ErrorDisplay, Footer, GuidePanel, Header, LoadingSpinner, SelectInput, SetupCard,
    StrategyCard,
};
use hooks::use_orchestrator;

/// Primary application component: configuration form plus results.
#[function_component(App)]
fn app() -> Html {
    let handle = use_orchestrator();
    let snapshot = &handle.snapshot;
    let selection = &snapshot.selection;
    let view = derive(snapshot);

    let track = catalog::lookup_track(&selection.track_id);
    let track_label = AttrValue::from(
        track
            .map(|t| t.label.clone())
            .unwrap_or_else(|| selection.track_id.clone()),
    );
    let image_url = track.and_then(|t| t.image_url.clone()).map(AttrValue::from);
    let guide_text = view.guide_text.map(|text| AttrValue::from(text.to_string()));

    let on_query_kind = {
        let on_edit = handle.on_edit.clone();
        Callback::from(move |id: String| {
            if let Some(kind) = QueryKind::from_id(&id) {
                on_edit.emit(SelectionEdit::QueryKind(kind));
            }
        })
    };
    let on_track = handle.on_edit.reform(SelectionEdit::Track);
    let on_weather = handle.on_edit.reform(SelectionEdit::Weather);
    let on_race_length = handle.on_edit.reform(SelectionEdit::RaceLength);
    let on_free_text = handle.on_edit.reform(|e: InputEvent| {
        let input: HtmlTextAreaElement = e.target_unchecked_into();
        SelectionEdit::FreeText(input.value())
    });
    let onsubmit = {
        let on_submit = handle.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    let body = match view.body {
        ResultBody::Setup(setup) => html! {
            <SetupCard
                setup={setup.clone()}
                track_label={track_label.clone()}
                image_url={image_url.clone()}
                guide_text={guide_text.clone()}
            />
        },
        ResultBody::Strategy(strategy) => html! {
            <StrategyCard
                strategy={strategy.clone()}
                track_label={track_label.clone()}
                image_url={image_url.clone()}
                guide_text={guide_text.clone()}
            />
        },
        ResultBody::GuideOnly(text) => html! {
            <GuidePanel
                guide_text={AttrValue::from(text.to_string())}
                track_label={track_label.clone()}
                image_url={image_url.clone()}
            />
        },
        ResultBody::Empty => html! { <EmptyState /> },
        ResultBody::Nothing => html! {},
    };

    html! {
        <div class="app">
            <Header />
            <main class="container">
                <form class="config-form" {onsubmit}>
                    <h2>{ "Configuration" }</h2>
                    <div class="form-grid">
                        <SelectInput
                            label="Query Type"
                            id="queryType"
                            value={selection.query_kind.id()}
                            options={catalog::options(CatalogKind::QueryKind)}
                            onchange={on_query_kind}
                        />
                        <SelectInput
                            label="Track"
                            id="track"
                            value={selection.track_id.clone()}
                            options={catalog::options(CatalogKind::Track)}
                            onchange={on_track}
                        />
                        <SelectInput
                            label="Weather Condition"
                            id="weather"
                            value={selection.weather.clone()}
                            options={catalog::options(CatalogKind::Weather)}
                            onchange={on_weather}
                        />
                        if view.show_race_length {
                            <SelectInput
                                label="Race Length"
                                id="raceLength"
                                value={selection.race_length.clone()}
                                options={catalog::options(CatalogKind::RaceLength)}
                                onchange={on_race_length}
                            />
                        }
                    </div>
                    <div class="form-group">
                        <label for="customRequests">{ "Custom Requests (Optional)" }</label>
                        <textarea
                            id="customRequests"
                            rows="3"
                            value={selection.free_text.clone()}
                            oninput={on_free_text}
                            placeholder="e.g., 'focus on tyre saving', 'aggressive setup for qualifying', 'consider early safety car'"
                        />
                    </div>
                    <div class="form-actions">
                        <button type="submit" class="btn-primary" disabled={view.submit_disabled}>
                            { view.submit_label }
                        </button>
                    </div>
                </form>

                if view.loading {
                    <LoadingSpinner />
                }
                if let Some(err) = view.guide_error {
                    <ErrorDisplay message={format!("Track Guide Error: {}", err)} />
                }
                if let Some(err) = view.primary_error {
                    <ErrorDisplay message={format!("Data Error: {}", err)} />
                }
                { body }
            </main>
            <Footer />
        </div>
    }
}

/// Entry point: installs panic and log hooks, then renders the app.
fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    yew::Renderer::<App>::new().render();
}
