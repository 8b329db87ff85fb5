use gloo_timers::callback::Timeout;
use race_engineer::config::DEBOUNCE_MS;
use race_engineer::gemini::GeminiGateway;
use race_engineer::orchestrator::{Orchestrator, Snapshot, Trigger};
use race_engineer::selection::{Selection, SelectionEdit};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Current orchestrator state plus the callbacks that drive it.
#[derive(Clone)]
pub struct OrchestratorHandle {
    /// State as of this render.
    pub snapshot: Snapshot,
    /// Apply a selection edit and, if it changed anything, re-run the fetch
    /// flow. Free-text edits re-run only after typing pauses.
    pub on_edit: Callback<SelectionEdit>,
    /// Explicit submission.
    pub on_submit: Callback<()>,
}

/// Owns one orchestrator for the lifetime of the component.
///
/// The orchestrator's change listener forces a re-render, and the startup
/// guide fetch is kicked off once on mount.
#[hook]
pub fn use_orchestrator() -> OrchestratorHandle {
    let orchestrator = use_memo((), |_| {
        Orchestrator::new(GeminiGateway::from_config(), Selection::default())
    });
    let force_update = use_force_update();
    // Pending debounced run; dropping the handle cancels it.
    let debounce = use_mut_ref(|| None::<Timeout>);

    {
        let orchestrator = orchestrator.clone();
        use_effect_with((), move |_| {
            orchestrator.subscribe(move || force_update.force_update());
            let runner = (*orchestrator).clone();
            spawn_local(async move { runner.run(Trigger::Startup).await });
            || ()
        });
    }

    let on_edit = {
        let orchestrator = orchestrator.clone();
        let debounce = debounce.clone();
        Callback::from(move |edit: SelectionEdit| {
            let debounced = matches!(edit, SelectionEdit::FreeText(_));
            if !orchestrator.edit(edit) {
                return;
            }
            let runner = (*orchestrator).clone();
            let start = move || spawn_local(async move { runner.run(Trigger::SelectionChanged).await });
            if debounced {
                *debounce.borrow_mut() = Some(Timeout::new(DEBOUNCE_MS, start));
            } else {
                // This run already sees the latest text.
                *debounce.borrow_mut() = None;
                start();
            }
        })
    };

    let on_submit = {
        let orchestrator = orchestrator.clone();
        Callback::from(move |_: ()| {
            *debounce.borrow_mut() = None;
            let runner = (*orchestrator).clone();
            spawn_local(async move { runner.submit().await });
        })
    };

    OrchestratorHandle {
        snapshot: orchestrator.snapshot(),
        on_edit,
        on_submit,
    }
}
