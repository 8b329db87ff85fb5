//! Decides when to fetch the track guide and the primary (setup/strategy)
//! payload, and folds both results into one snapshot for the view.
//!
//! Everything runs on one thread with suspension only at network awaits, so
//! state lives in an `Rc<RefCell<_>>` and no borrow is ever held across an
//! `.await`. Each slot carries a generation counter: a completion is applied
//! only if no newer fetch for that slot started in the meantime.

use crate::catalog;
use crate::config::{DEFAULT_GUIDE_ERROR, DEFAULT_PRIMARY_ERROR, MISSING_TRACK_MESSAGE};
use crate::gateway::{Gateway, GatewayResult, PrimaryRequest};
use crate::selection::{Selection, SelectionEdit};
use crate::slot::AsyncSlot;
use crate::{PrimaryData, Reply};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Configuration problem detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    UnknownTrack(String),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::UnknownTrack(_) => f.write_str(MISSING_TRACK_MESSAGE),
        }
    }
}

impl std::error::Error for OrchestratorError {}

/// What started a run of the fetch flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The app has a valid track selected for the first time.
    Startup,
    /// A field of the selection changed.
    SelectionChanged,
    /// The user pressed the submit button.
    Submit,
}

/// Which sub-flows a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPlan {
    GuideOnly,
    GuideThenPrimary,
}

/// Where the guide sub-flow left things for the calling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideStatus {
    Ready,
    Failed,
    /// A newer guide fetch started while this one was in flight; the run
    /// that started it owns the rest of the flow.
    Superseded,
}

/// Cold start versus steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Running,
}

impl Phase {
    /// The only place the phase changes. The first run ever fetches the guide
    /// alone, unless it is an explicit submit; every later run does both.
    pub fn plan(&mut self, trigger: Trigger) -> FlowPlan {
        let plan = match (*self, trigger) {
            (Phase::NotStarted, Trigger::Submit) => FlowPlan::GuideThenPrimary,
            (Phase::NotStarted, _) => FlowPlan::GuideOnly,
            (Phase::Running, _) => FlowPlan::GuideThenPrimary,
        };
        *self = Phase::Running;
        plan
    }
}

/// Read-only view of the orchestrator state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub selection: Selection,
    pub primary: AsyncSlot<PrimaryData>,
    pub guide: AsyncSlot<String>,
}

type GuideOutcome = Result<String, String>;
type PendingGuide = Shared<LocalBoxFuture<'static, GuideOutcome>>;

struct State {
    phase: Phase,
    selection: Selection,
    primary: AsyncSlot<PrimaryData>,
    guide: AsyncSlot<String>,
    /// Track the guide was last fetched or attempted for, set before the
    /// request is awaited.
    guide_track: Option<String>,
    guide_generation: u64,
    primary_generation: u64,
    pending_guide: Option<PendingGuide>,
}

enum GuideStep {
    Settled(GuideStatus),
    Await { generation: u64, fetch: PendingGuide },
}

/// Owns the two result slots and runs the guide and primary sub-flows.
///
/// Cloning is cheap and every clone shares the same state, which is how the
/// UI hands the orchestrator to spawned tasks.
pub struct Orchestrator<G> {
    gateway: Rc<G>,
    state: Rc<RefCell<State>>,
    listener: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl<G> Clone for Orchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Rc::clone(&self.gateway),
            state: Rc::clone(&self.state),
            listener: Rc::clone(&self.listener),
        }
    }
}

impl<G: Gateway + 'static> Orchestrator<G> {
    pub fn new(gateway: G, selection: Selection) -> Self {
        Self {
            gateway: Rc::new(gateway),
            state: Rc::new(RefCell::new(State {
                phase: Phase::default(),
                selection,
                primary: AsyncSlot::Idle,
                guide: AsyncSlot::Idle,
                guide_track: None,
                guide_generation: 0,
                primary_generation: 0,
                pending_guide: None,
            })),
            listener: Rc::new(RefCell::new(None)),
        }
    }

    /// Register the callback fired after every state change.
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.borrow();
        Snapshot {
            selection: state.selection.clone(),
            primary: state.primary.clone(),
            guide: state.guide.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    fn notify(&self) {
        // Clone out first so the listener may read the state freely.
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Replace the selection with `edit` applied. Returns whether anything
    /// changed; callers re-run the flow only in that case.
    ///
    /// Track and query-kind edits drop the primary result at once and orphan
    /// any in-flight primary fetch.
    pub fn edit(&self, edit: SelectionEdit) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(next) = state.selection.apply(&edit) else {
                return false;
            };
            state.selection = next;
            if edit.invalidates_primary() {
                state.primary_generation += 1;
                state.primary = AsyncSlot::Idle;
            }
        }
        debug!("Selection edited: {:?}", edit);
        self.notify();
        true
    }

    /// Run the fetch flow for the current selection.
    ///
    /// A track missing from the catalog only reports the configuration error;
    /// it leaves the cold-start phase untouched unless the user submitted.
    pub async fn run(&self, trigger: Trigger) {
        let track_id = self.state.borrow().selection.track_id.clone();
        if catalog::lookup_track(&track_id).is_none() {
            if trigger == Trigger::Submit {
                self.state.borrow_mut().phase.plan(trigger);
            }
            self.fetch_primary().await;
            return;
        }

        let plan = self.state.borrow_mut().phase.plan(trigger);
        info!("Fetch flow ({:?}): {:?} for {}", trigger, plan, track_id);

        // Ready or failed, the primary fetch still runs.
        let guide = self.ensure_guide(&track_id).await;
        debug!("Guide for {}: {:?}", track_id, guide);
        if guide == GuideStatus::Superseded {
            debug!("Run for {} superseded by a newer guide fetch", track_id);
            return;
        }

        if plan == FlowPlan::GuideThenPrimary {
            self.fetch_primary().await;
        }
    }

    /// Explicit submission: always runs both sub-flows. An identical-track
    /// guide that already succeeded or failed is not fetched again.
    pub async fn submit(&self) {
        self.run(Trigger::Submit).await;
    }

    /// Make sure a guide for `track_id` is loaded or has been attempted.
    ///
    /// Reports whether a usable guide is now available, or that a newer guide
    /// fetch replaced this one while it was awaited. A track that already
    /// succeeded or failed is not fetched again; a trigger arriving while the
    /// same track is in flight waits for that request instead of issuing a
    /// second one.
    pub async fn ensure_guide(&self, track_id: &str) -> GuideStatus {
        let step = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let same_track = state.guide_track.as_deref() == Some(track_id);
            let in_flight = state
                .pending_guide
                .clone()
                .filter(|_| same_track && state.guide.is_loading());

            if same_track && state.guide.is_ready() {
                GuideStep::Settled(GuideStatus::Ready)
            } else if same_track && state.guide.error_message().is_some() {
                GuideStep::Settled(GuideStatus::Failed)
            } else if let Some(fetch) = in_flight {
                GuideStep::Await {
                    generation: state.guide_generation,
                    fetch,
                }
            } else {
                state.guide_generation += 1;
                state.guide = AsyncSlot::Loading;
                state.guide_track = Some(track_id.to_string());

                let gateway = Rc::clone(&self.gateway);
                let track = track_id.to_string();
                let fetch = async move { guide_outcome(gateway.fetch_track_guide(track).await) }
                    .boxed_local()
                    .shared();
                state.pending_guide = Some(fetch.clone());
                GuideStep::Await {
                    generation: state.guide_generation,
                    fetch,
                }
            }
        };

        match step {
            GuideStep::Settled(status) => status,
            GuideStep::Await { generation, fetch } => {
                self.notify();
                let outcome = fetch.await;
                self.settle_guide(generation, outcome)
            }
        }
    }

    fn settle_guide(&self, generation: u64, outcome: GuideOutcome) -> GuideStatus {
        let applied = {
            let mut state = self.state.borrow_mut();
            if state.guide_generation != generation {
                false
            } else {
                if state.guide.is_loading() {
                    if let Err(message) = &outcome {
                        warn!("Track guide failed: {}", message);
                    }
                    state.guide = AsyncSlot::settle(outcome);
                    state.pending_guide = None;
                }
                true
            }
        };

        if !applied {
            debug!("Discarding guide result from superseded generation {}", generation);
            return GuideStatus::Superseded;
        }
        self.notify();
        if self.state.borrow().guide.is_ready() {
            GuideStatus::Ready
        } else {
            GuideStatus::Failed
        }
    }

    /// Fetch the setup or strategy for the current selection.
    ///
    /// An unknown track is a configuration error reported in the primary slot
    /// without touching the network.
    pub async fn fetch_primary(&self) {
        let started = {
            let mut state = self.state.borrow_mut();
            state.primary_generation += 1;
            let generation = state.primary_generation;
            if catalog::lookup_track(&state.selection.track_id).is_none() {
                let err = OrchestratorError::UnknownTrack(state.selection.track_id.clone());
                warn!("{} (track id {:?})", err, state.selection.track_id);
                state.primary = AsyncSlot::Failed(err.to_string());
                None
            } else {
                state.primary = AsyncSlot::Loading;
                Some((generation, PrimaryRequest::from(&state.selection)))
            }
        };
        self.notify();

        let Some((generation, request)) = started else {
            return;
        };

        let outcome = primary_outcome(self.gateway.fetch_primary_data(request).await);

        {
            let mut state = self.state.borrow_mut();
            if state.primary_generation != generation {
                debug!("Discarding primary result from superseded generation {}", generation);
                return;
            }
            if let Err(message) = &outcome {
                warn!("Primary fetch failed: {}", message);
            }
            state.primary = AsyncSlot::settle(outcome);
        }
        self.notify();
    }
}

fn guide_outcome(result: GatewayResult<crate::TrackGuide>) -> GuideOutcome {
    match result {
        Ok(Reply::Data(guide)) => Ok(guide.track_guide),
        Ok(Reply::Rejected(err)) => Err(err.error),
        Err(err) => Err(err.user_message(DEFAULT_GUIDE_ERROR)),
    }
}

fn primary_outcome(result: GatewayResult<PrimaryData>) -> Result<PrimaryData, String> {
    match result {
        Ok(Reply::Data(data)) => Ok(data),
        Ok(Reply::Rejected(err)) => Err(err.error),
        Err(err) => Err(err.user_message(DEFAULT_PRIMARY_ERROR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::{
        Aerodynamics, Brakes, CarSetup, QueryKind, RaceStrategy, SetupValue, Suspension,
        SuspensionGeometry, TrackGuide, Transmission, Tyres,
    };
    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;
    use std::collections::HashSet;

    const BAHRAIN: &str = "Bahrain International Circuit";
    const MONACO: &str = "Circuit de Monaco";
    const SILVERSTONE: &str = "Silverstone Circuit";

    /// Gateway double: records every call, answers from a script, and can
    /// hold answers until a test releases them.
    #[derive(Default)]
    struct FakeGateway {
        calls: RefCell<Vec<String>>,
        rejected_guides: RefCell<HashSet<String>>,
        primary_rejection: RefCell<Option<String>>,
        primary_transport_error: RefCell<Option<String>>,
        hold: Cell<bool>,
        held: RefCell<Vec<oneshot::Sender<()>>>,
    }

    impl FakeGateway {
        fn gate(&self) -> Option<oneshot::Receiver<()>> {
            if !self.hold.get() {
                return None;
            }
            let (tx, rx) = oneshot::channel();
            self.held.borrow_mut().push(tx);
            Some(rx)
        }

        fn release(&self, index: usize) {
            let tx = self.held.borrow_mut().remove(index);
            let _ = tx.send(());
        }
    }

    impl Gateway for Rc<FakeGateway> {
        fn fetch_primary_data(&self, request: PrimaryRequest) -> LocalBoxFuture<'static, GatewayResult<PrimaryData>> {
            self.calls.borrow_mut().push(format!(
                "primary:{}:{}:{}:{}:{}",
                request.track_id,
                request.query_kind.id(),
                request.weather,
                request.race_length,
                request.free_text
            ));
            let result = if let Some(msg) = self.primary_transport_error.borrow().clone() {
                Err(GatewayError::Transport(msg))
            } else if let Some(msg) = self.primary_rejection.borrow().clone() {
                Ok(Reply::rejected(msg))
            } else {
                Ok(Reply::Data(payload_for(&request)))
            };
            let gate = self.gate();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            .boxed_local()
        }

        fn fetch_track_guide(&self, track_id: String) -> LocalBoxFuture<'static, GatewayResult<TrackGuide>> {
            self.calls.borrow_mut().push(format!("guide:{}", track_id));
            let result = if self.rejected_guides.borrow().contains(&track_id) {
                Ok(Reply::rejected("model refused"))
            } else {
                Ok(Reply::Data(TrackGuide {
                    track_guide: format!("Guide for {}", track_id),
                    track: track_id,
                }))
            };
            let gate = self.gate();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            .boxed_local()
        }
    }

    fn payload_for(request: &PrimaryRequest) -> PrimaryData {
        let n = || SetupValue::Number(1.0);
        match request.query_kind {
            QueryKind::Setup => PrimaryData::Setup(CarSetup {
                track: request.track_id.clone(),
                condition: request.weather.clone(),
                setup_name: "Baseline".into(),
                aerodynamics: Aerodynamics { front_wing: n(), rear_wing: n() },
                transmission: Transmission {
                    differential_adjustment_on_throttle: n(),
                    differential_adjustment_off_throttle: n(),
                },
                suspension_geometry: SuspensionGeometry {
                    front_camber: n(),
                    rear_camber: n(),
                    front_toe: n(),
                    rear_toe: n(),
                },
                suspension: Suspension {
                    front_suspension: n(),
                    rear_suspension: n(),
                    front_anti_roll_bar: n(),
                    rear_anti_roll_bar: n(),
                    front_ride_height: n(),
                    rear_ride_height: n(),
                },
                brakes: Brakes { brake_pressure: n(), front_brake_bias: n() },
                tyres: Tyres {
                    front_right_tyre_pressure: n(),
                    front_left_tyre_pressure: n(),
                    rear_right_tyre_pressure: n(),
                    rear_left_tyre_pressure: n(),
                },
                notes: None,
            }),
            QueryKind::Strategy => PrimaryData::Strategy(RaceStrategy {
                track: request.track_id.clone(),
                race_length: request.race_length.clone(),
                weather: request.weather.clone(),
                strategy_name: "One stop".into(),
                stints: Vec::new(),
                notes: None,
            }),
        }
    }

    fn scenario_selection() -> Selection {
        Selection {
            query_kind: QueryKind::Setup,
            track_id: BAHRAIN.into(),
            weather: "Dry".into(),
            race_length: "50%".into(),
            free_text: String::new(),
        }
    }

    fn setup() -> (Rc<FakeGateway>, Orchestrator<Rc<FakeGateway>>) {
        let fake = Rc::new(FakeGateway::default());
        let orchestrator = Orchestrator::new(Rc::clone(&fake), scenario_selection());
        (fake, orchestrator)
    }

    fn calls(fake: &FakeGateway) -> Vec<String> {
        fake.calls.borrow().clone()
    }

    #[test]
    fn phase_latch_only_moves_forward() {
        let mut phase = Phase::default();
        assert_eq!(phase.plan(Trigger::Startup), FlowPlan::GuideOnly);
        assert_eq!(phase, Phase::Running);
        assert_eq!(phase.plan(Trigger::Startup), FlowPlan::GuideThenPrimary);

        let mut phase = Phase::default();
        assert_eq!(phase.plan(Trigger::Submit), FlowPlan::GuideThenPrimary);
        assert_eq!(phase.plan(Trigger::SelectionChanged), FlowPlan::GuideThenPrimary);
    }

    #[test]
    fn first_run_fetches_only_the_guide() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));

        assert_eq!(calls(&fake), vec![format!("guide:{}", BAHRAIN)]);
        assert_eq!(orch.phase(), Phase::Running);
        let snap = orch.snapshot();
        assert_eq!(snap.guide, AsyncSlot::Ready(format!("Guide for {}", BAHRAIN)));
        assert_eq!(snap.primary, AsyncSlot::Idle);
    }

    #[test]
    fn second_run_fetches_primary_after_guide() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));
        orch.edit(SelectionEdit::Weather("Heavy Rain".into()));
        block_on(orch.run(Trigger::SelectionChanged));

        // Guide for the unchanged track is not fetched again.
        assert_eq!(
            calls(&fake),
            vec![
                format!("guide:{}", BAHRAIN),
                format!("primary:{}:Car Setup:Heavy Rain:50%:", BAHRAIN),
            ]
        );
        assert!(orch.snapshot().primary.is_ready());
    }

    #[test]
    fn failed_guide_is_not_retried_for_the_same_track() {
        let (fake, orch) = setup();
        fake.rejected_guides.borrow_mut().insert(BAHRAIN.into());

        block_on(orch.run(Trigger::Startup));
        block_on(orch.run(Trigger::SelectionChanged));
        block_on(orch.submit());

        let guide_calls = calls(&fake).iter().filter(|c| c.starts_with("guide:")).count();
        assert_eq!(guide_calls, 1);
        let snap = orch.snapshot();
        assert_eq!(snap.guide, AsyncSlot::Failed("model refused".into()));
        // Guide failure does not block the primary fetch.
        assert!(snap.primary.is_ready());
    }

    #[test]
    fn track_change_fetches_new_guide_then_primary() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));
        assert!(orch.edit(SelectionEdit::Track(MONACO.into())));
        block_on(orch.run(Trigger::SelectionChanged));

        assert_eq!(
            calls(&fake),
            vec![
                format!("guide:{}", BAHRAIN),
                format!("guide:{}", MONACO),
                format!("primary:{}:Car Setup:Dry:50%:", MONACO),
            ]
        );
        let snap = orch.snapshot();
        assert_eq!(snap.guide, AsyncSlot::Ready(format!("Guide for {}", MONACO)));
        match snap.primary {
            AsyncSlot::Ready(PrimaryData::Setup(ref setup)) => assert_eq!(setup.track, MONACO),
            ref other => panic!("expected setup, got {:?}", other),
        }
    }

    #[test]
    fn track_change_clears_old_guide_while_loading() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));

        fake.hold.set(true);
        orch.edit(SelectionEdit::Track(MONACO.into()));
        let mut pool = LocalPool::new();
        let runner = orch.clone();
        pool.spawner()
            .spawn_local(async move { runner.run(Trigger::SelectionChanged).await })
            .unwrap();
        pool.run_until_stalled();

        assert_eq!(orch.snapshot().guide, AsyncSlot::Loading);
        fake.release(0);
        pool.run_until_stalled();
        assert_eq!(orch.snapshot().primary, AsyncSlot::Loading);
        fake.release(0);
        pool.run();
        assert!(orch.snapshot().primary.is_ready());
    }

    #[test]
    fn primary_transport_error_becomes_slot_error() {
        let (fake, orch) = setup();
        *fake.primary_transport_error.borrow_mut() = Some("Failed to fetch".into());
        block_on(orch.run(Trigger::Startup));
        block_on(orch.submit());

        let snap = orch.snapshot();
        assert_eq!(snap.primary, AsyncSlot::Failed("Failed to fetch".into()));
        assert!(snap.guide.is_ready());
        assert!(!snap.primary.is_loading() && !snap.guide.is_loading());
    }

    #[test]
    fn empty_transport_message_uses_default() {
        let (fake, orch) = setup();
        *fake.primary_transport_error.borrow_mut() = Some(String::new());
        block_on(orch.submit());
        assert_eq!(
            orch.snapshot().primary,
            AsyncSlot::Failed(DEFAULT_PRIMARY_ERROR.into())
        );
    }

    #[test]
    fn both_rejections_are_kept_independently() {
        let (fake, orch) = setup();
        fake.rejected_guides.borrow_mut().insert(BAHRAIN.into());
        *fake.primary_rejection.borrow_mut() = Some("quota exceeded".into());
        block_on(orch.submit());

        let snap = orch.snapshot();
        assert_eq!(snap.guide.error_message(), Some("model refused"));
        assert_eq!(snap.primary.error_message(), Some("quota exceeded"));
    }

    #[test]
    fn unknown_track_is_a_configuration_error() {
        let fake = Rc::new(FakeGateway::default());
        let mut selection = scenario_selection();
        selection.track_id = "Nürburgring".into();
        let orch = Orchestrator::new(Rc::clone(&fake), selection);
        block_on(orch.submit());

        assert!(calls(&fake).is_empty());
        assert_eq!(
            orch.snapshot().primary,
            AsyncSlot::Failed(MISSING_TRACK_MESSAGE.into())
        );
    }

    #[test]
    fn concurrent_triggers_share_one_guide_request() {
        let (fake, orch) = setup();
        fake.hold.set(true);
        let mut pool = LocalPool::new();
        for trigger in [Trigger::Startup, Trigger::SelectionChanged] {
            let runner = orch.clone();
            pool.spawner()
                .spawn_local(async move { runner.run(trigger).await })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(calls(&fake), vec![format!("guide:{}", BAHRAIN)]);

        // The second run's primary fetch waits for the shared guide.
        fake.release(0);
        pool.run_until_stalled();
        assert!(orch.snapshot().guide.is_ready());
        assert_eq!(calls(&fake).len(), 2);
        assert!(calls(&fake)[1].starts_with("primary:"));

        fake.release(0);
        pool.run();
        assert!(orch.snapshot().primary.is_ready());
    }

    #[test]
    fn slow_stale_primary_does_not_overwrite_newer_result() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));

        fake.hold.set(true);
        let mut pool = LocalPool::new();

        orch.edit(SelectionEdit::Weather("Heavy Rain".into()));
        let first = orch.clone();
        pool.spawner()
            .spawn_local(async move { first.run(Trigger::SelectionChanged).await })
            .unwrap();
        pool.run_until_stalled();

        orch.edit(SelectionEdit::Weather("Dynamic".into()));
        let second = orch.clone();
        pool.spawner()
            .spawn_local(async move { second.run(Trigger::SelectionChanged).await })
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(fake.held.borrow().len(), 2);

        // Newer request finishes first, then the older one straggles in.
        fake.release(1);
        pool.run_until_stalled();
        fake.release(0);
        pool.run();

        match orch.snapshot().primary {
            AsyncSlot::Ready(PrimaryData::Setup(ref setup)) => assert_eq!(setup.condition, "Dynamic"),
            ref other => panic!("expected setup, got {:?}", other),
        }
    }

    #[test]
    fn stale_guide_for_previous_track_is_discarded() {
        let (fake, orch) = setup();
        fake.hold.set(true);
        let mut pool = LocalPool::new();

        let first = orch.clone();
        pool.spawner()
            .spawn_local(async move { first.run(Trigger::Startup).await })
            .unwrap();
        pool.run_until_stalled();

        orch.edit(SelectionEdit::Track(MONACO.into()));
        let second = orch.clone();
        pool.spawner()
            .spawn_local(async move { second.run(Trigger::SelectionChanged).await })
            .unwrap();
        pool.run_until_stalled();

        // Monaco guide lands, then the Bahrain one.
        fake.release(1);
        pool.run_until_stalled();
        fake.release(0);
        pool.run_until_stalled();

        assert_eq!(orch.snapshot().guide, AsyncSlot::Ready(format!("Guide for {}", MONACO)));
        fake.hold.set(false);
        while !fake.held.borrow().is_empty() {
            fake.release(0);
        }
        pool.run();
    }

    #[test]
    fn superseded_run_leaves_primary_to_the_newer_run() {
        let (fake, orch) = setup();
        block_on(orch.run(Trigger::Startup));
        fake.hold.set(true);
        let mut pool = LocalPool::new();

        for track in [MONACO, SILVERSTONE] {
            orch.edit(SelectionEdit::Track(track.into()));
            let runner = orch.clone();
            pool.spawner()
                .spawn_local(async move { runner.run(Trigger::SelectionChanged).await })
                .unwrap();
            pool.run_until_stalled();
        }

        // The Monaco guide lands after Silverstone's fetch started.
        fake.release(0);
        pool.run_until_stalled();
        assert_eq!(orch.snapshot().guide, AsyncSlot::Loading);
        assert!(calls(&fake).iter().all(|call| !call.starts_with("primary:")));

        fake.hold.set(false);
        fake.release(0);
        pool.run();

        let primaries: Vec<String> = calls(&fake)
            .into_iter()
            .filter(|call| call.starts_with("primary:"))
            .collect();
        assert_eq!(
            primaries,
            vec![format!("primary:{}:Car Setup:Dry:50%:", SILVERSTONE)]
        );
        let snap = orch.snapshot();
        assert_eq!(snap.guide, AsyncSlot::Ready(format!("Guide for {}", SILVERSTONE)));
        assert_eq!(snap.primary.value().map(PrimaryData::kind), Some(QueryKind::Setup));
    }

    #[test]
    fn unknown_track_keeps_the_cold_start_phase() {
        let fake = Rc::new(FakeGateway::default());
        let mut selection = scenario_selection();
        selection.track_id = "Nürburgring".into();
        let orch = Orchestrator::new(Rc::clone(&fake), selection);

        block_on(orch.run(Trigger::Startup));
        assert_eq!(orch.phase(), Phase::NotStarted);
        assert!(calls(&fake).is_empty());
        assert_eq!(
            orch.snapshot().primary,
            AsyncSlot::Failed(MISSING_TRACK_MESSAGE.into())
        );

        orch.edit(SelectionEdit::Track(BAHRAIN.into()));
        block_on(orch.run(Trigger::SelectionChanged));
        assert_eq!(calls(&fake), vec![format!("guide:{}", BAHRAIN)]);
        assert_eq!(orch.phase(), Phase::Running);
    }

    #[test]
    fn kind_change_drops_primary_result_immediately() {
        let (_fake, orch) = setup();
        block_on(orch.submit());
        assert!(orch.snapshot().primary.is_ready());

        assert!(orch.edit(SelectionEdit::QueryKind(QueryKind::Strategy)));
        assert_eq!(orch.snapshot().primary, AsyncSlot::Idle);

        // Weather edits leave the old result until the next fetch starts.
        block_on(orch.submit());
        orch.edit(SelectionEdit::Weather("Dynamic".into()));
        assert!(orch.snapshot().primary.is_ready());
    }

    #[test]
    fn listener_sees_loading_then_result() {
        let (_fake, orch) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let observed = orch.clone();
        orch.subscribe(move || sink.borrow_mut().push(observed.snapshot().guide.is_loading()));

        block_on(orch.run(Trigger::Startup));
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn unchanged_edit_reports_no_change() {
        let (_fake, orch) = setup();
        assert!(!orch.edit(SelectionEdit::Track(BAHRAIN.into())));
    }
}
