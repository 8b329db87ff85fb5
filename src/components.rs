//! Pure Yew view components for the race engineer UI.
//!
//! Everything here renders from props alone; state lives in the
//! orchestrator.

use log::debug;
use race_engineer::{CarSetup, RaceStrategy, SetupValue};
use std::fmt::Debug;
use web_sys::{HtmlElement, HtmlSelectElement};
use yew::prelude::*;

#[function_component(Header)]
pub fn header() -> Html {
    html! {
        <header class="app-header">
            <h1>{ "F1 24 Race Engineer" }</h1>
            <p class="tagline">{ "AI-crafted car setups, race strategies and track guides" }</p>
        </header>
    }
}

#[function_component(Footer)]
pub fn footer() -> Html {
    html! {
        <footer class="app-footer">
            <p>{ "Generated content may be inaccurate. Always sanity-check setups in practice." }</p>
        </footer>
    }
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner() -> Html {
    html! {
        <div class="loading-spinner" role="status">
            <div class="spinner"></div>
            <span>{ "Talking to the pit wall..." }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorDisplayProps {
    pub message: AttrValue,
}

#[function_component(ErrorDisplay)]
pub fn error_display(props: &ErrorDisplayProps) -> Html {
    html! {
        <div class="error-banner" role="alert">{ &props.message }</div>
    }
}

/// Labelled `<select>` emitting the chosen option id.
#[derive(Properties, PartialEq)]
pub struct SelectInputProps {
    pub label: AttrValue,
    pub id: AttrValue,
    pub value: AttrValue,
    pub options: Vec<(&'static str, &'static str)>,
    pub onchange: Callback<String>,
}

#[function_component(SelectInput)]
pub fn select_input(props: &SelectInputProps) -> Html {
    let onchange = {
        let emit = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            emit.emit(select.value());
        })
    };

    html! {
        <div class="form-group">
            <label for={props.id.clone()}>{ &props.label }</label>
            <select id={props.id.clone()} {onchange}>
                { for props.options.iter().map(|&(id, label)| html! {
                    <option value={id} selected={id == props.value.as_str()}>{ label }</option>
                }) }
            </select>
        </div>
    }
}

/// Track layout image that hides itself if the URL fails to load.
fn render_track_image(image_url: Option<&AttrValue>, track_label: &str) -> Html {
    let Some(src) = image_url else {
        return html! {};
    };
    let onerror = Callback::from(|e: Event| {
        let img: HtmlElement = e.target_unchecked_into();
        style_applied(img.style().set_property("display", "none"), "display");
    });
    html! {
        <img class="track-image" src={src.clone()} alt={format!("{} Layout", track_label)} {onerror} />
    }
}

/// Logs a rejected inline-style write. Returns whether the style took.
fn style_applied<E: Debug>(result: Result<(), E>, property: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!("Could not set style {}: {:?}", property, err);
            false
        }
    }
}

fn render_guide_block(track_label: &str, guide_text: Option<&AttrValue>) -> Html {
    match guide_text {
        Some(text) => html! {
            <div class="track-guide">
                <h4>{ format!("Track Guide: {}", track_label) }</h4>
                <p class="guide-text">{ text }</p>
            </div>
        },
        None => html! {},
    }
}

fn render_notes(notes: Option<&String>) -> Html {
    match notes {
        Some(notes) if !notes.trim().is_empty() => html! {
            <div class="notes">
                <h4>{ "Engineer's Notes" }</h4>
                <p>{ notes }</p>
            </div>
        },
        _ => html! {},
    }
}

/// One titled group of setup values.
fn render_setting_group(title: &str, rows: &[(&str, &SetupValue)]) -> Html {
    html! {
        <div class="setting-group">
            <h4>{ title }</h4>
            <dl>
                { for rows.iter().map(|(name, value)| html! {
                    <>
                        <dt>{ *name }</dt>
                        <dd>{ value.to_string() }</dd>
                    </>
                }) }
            </dl>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SetupCardProps {
    pub setup: CarSetup,
    pub track_label: AttrValue,
    #[prop_or_default]
    pub image_url: Option<AttrValue>,
    #[prop_or_default]
    pub guide_text: Option<AttrValue>,
}

#[function_component(SetupCard)]
pub fn setup_card(props: &SetupCardProps) -> Html {
    let s = &props.setup;
    html! {
        <div class="result-card setup-card">
            { render_track_image(props.image_url.as_ref(), &props.track_label) }
            <div class="card-body">
                <h3>{ &s.setup_name }</h3>
                <p class="card-subtitle">{ format!("{} · {}", props.track_label, s.condition) }</p>
                <div class="setting-grid">
                    { render_setting_group("Aerodynamics", &[
                        ("Front Wing", &s.aerodynamics.front_wing),
                        ("Rear Wing", &s.aerodynamics.rear_wing),
                    ]) }
                    { render_setting_group("Transmission", &[
                        ("On Throttle", &s.transmission.differential_adjustment_on_throttle),
                        ("Off Throttle", &s.transmission.differential_adjustment_off_throttle),
                    ]) }
                    { render_setting_group("Suspension Geometry", &[
                        ("Front Camber", &s.suspension_geometry.front_camber),
                        ("Rear Camber", &s.suspension_geometry.rear_camber),
                        ("Front Toe", &s.suspension_geometry.front_toe),
                        ("Rear Toe", &s.suspension_geometry.rear_toe),
                    ]) }
                    { render_setting_group("Suspension", &[
                        ("Front Suspension", &s.suspension.front_suspension),
                        ("Rear Suspension", &s.suspension.rear_suspension),
                        ("Front Anti-Roll Bar", &s.suspension.front_anti_roll_bar),
                        ("Rear Anti-Roll Bar", &s.suspension.rear_anti_roll_bar),
                        ("Front Ride Height", &s.suspension.front_ride_height),
                        ("Rear Ride Height", &s.suspension.rear_ride_height),
                    ]) }
                    { render_setting_group("Brakes", &[
                        ("Brake Pressure", &s.brakes.brake_pressure),
                        ("Front Brake Bias", &s.brakes.front_brake_bias),
                    ]) }
                    { render_setting_group("Tyres", &[
                        ("Front Right", &s.tyres.front_right_tyre_pressure),
                        ("Front Left", &s.tyres.front_left_tyre_pressure),
                        ("Rear Right", &s.tyres.rear_right_tyre_pressure),
                        ("Rear Left", &s.tyres.rear_left_tyre_pressure),
                    ]) }
                </div>
                { render_notes(s.notes.as_ref()) }
                { render_guide_block(&props.track_label, props.guide_text.as_ref()) }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StrategyCardProps {
    pub strategy: RaceStrategy,
    pub track_label: AttrValue,
    #[prop_or_default]
    pub image_url: Option<AttrValue>,
    #[prop_or_default]
    pub guide_text: Option<AttrValue>,
}

#[function_component(StrategyCard)]
pub fn strategy_card(props: &StrategyCardProps) -> Html {
    let s = &props.strategy;
    html! {
        <div class="result-card strategy-card">
            { render_track_image(props.image_url.as_ref(), &props.track_label) }
            <div class="card-body">
                <h3>{ &s.strategy_name }</h3>
                <p class="card-subtitle">
                    { format!("{} · {} · {}", props.track_label, s.race_length, s.weather) }
                </p>
                <table class="stint-table">
                    <thead>
                        <tr>
                            <th>{ "Stint" }</th>
                            <th>{ "Tyre" }</th>
                            <th>{ "Laps" }</th>
                            <th>{ "Pit Window" }</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for s.stints.iter().enumerate().map(|(idx, stint)| html! {
                            <tr>
                                <td>{ idx + 1 }</td>
                                <td>{ &stint.tyre }</td>
                                <td>{ &stint.laps }</td>
                                <td>{ stint.pit_window.as_deref().unwrap_or("-") }</td>
                            </tr>
                        }) }
                    </tbody>
                </table>
                { render_notes(s.notes.as_ref()) }
                { render_guide_block(&props.track_label, props.guide_text.as_ref()) }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GuidePanelProps {
    pub guide_text: AttrValue,
    pub track_label: AttrValue,
    #[prop_or_default]
    pub image_url: Option<AttrValue>,
}

/// Guide shown on its own before any setup or strategy has loaded.
#[function_component(GuidePanel)]
pub fn guide_panel(props: &GuidePanelProps) -> Html {
    html! {
        <div class="result-card guide-panel">
            { render_track_image(props.image_url.as_ref(), &props.track_label) }
            <div class="card-body">
                { render_guide_block(&props.track_label, Some(&props.guide_text)) }
                <p class="hint">
                    { "Select other parameters or click \"Generate Data\" for setup or strategy details." }
                </p>
            </div>
        </div>
    }
}

#[function_component(EmptyState)]
pub fn empty_state() -> Html {
    html! {
        <div class="empty-state">
            <p class="headline">{ "Select your parameters and click \"Generate Data\" to get started." }</p>
            <p class="subline">
                { "AI will craft a custom F1 24 setup or strategy and a detailed track guide for you." }
            </p>
        </div>
    }
}
