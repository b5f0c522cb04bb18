//! Gesture state machine.
//!
//! ```text
//!   IDLE ──armed──▶ ARMED ──commit held──▶ ENGAGED ──drag held──▶ DRAGGING
//!    ▲                │                      │                       │
//!    │             disarm             release│disarm/low conf  release│disarm
//!    │                │                      ▼                       ▼
//!    └────────────────┴────────────── RELEASED (UP) / CANCELLED (CANCEL)
//! ```
//!
//! RELEASED and CANCELLED are transient: the machine passes through them on
//! the tick that emits UP or CANCEL and rests in IDLE.
//!
//! [`transition`] is a pure function of the current state, one input and
//! the configuration. [`GestureMachine`] holds the state between ticks.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use palmcursor_common::error::{PalmError, PalmResult};
use palmcursor_frame_model::action::PointerActionKind;
use palmcursor_frame_model::frame::{GestureReading, TimestampMs};

/// Interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Idle,
    Armed,
    Engaged,
    Dragging,
    Released,
    Cancelled,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Idle,
        Phase::Armed,
        Phase::Engaged,
        Phase::Dragging,
        Phase::Released,
        Phase::Cancelled,
    ];

    /// Phases the machine passes through without resting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Released | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Armed => "ARMED",
            Self::Engaged => "ENGAGED",
            Self::Dragging => "DRAGGING",
            Self::Released => "RELEASED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a classifier label in the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelClass {
    Commit,
    Drag,
    Release,
    /// A label outside every configured set.
    Other,
    /// No gesture, or a configured label below `min_confidence`.
    None,
}

impl LabelClass {
    pub const ALL: [LabelClass; 5] = [
        LabelClass::Commit,
        LabelClass::Drag,
        LabelClass::Release,
        LabelClass::Other,
        LabelClass::None,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Labels that, held for `commit_window_ms`, press the pointer.
    pub commit_labels: Vec<String>,

    /// Labels that turn a press into a drag.
    pub drag_labels: Vec<String>,

    /// Labels that lift the pointer.
    pub release_labels: Vec<String>,

    /// Minimum classifier confidence in (0, 1].
    pub min_confidence: f64,

    /// How long a commit label must be held while armed (ms).
    pub commit_window_ms: u64,

    /// Nominal camera frame interval (ms). Lower bound for the commit window.
    pub frame_interval_ms: u64,

    /// Consecutive drag-label frames needed to start dragging.
    pub drag_sustain_frames: u32,

    /// Time after an UP before the machine can arm again (ms). 0 re-arms
    /// on the first armed tick.
    pub release_cooldown_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            commit_labels: vec!["Pointing_Up".to_string()],
            drag_labels: vec!["Closed_Fist".to_string()],
            release_labels: vec!["Open_Palm".to_string()],
            min_confidence: 0.7,
            commit_window_ms: 150,
            frame_interval_ms: 16,
            drag_sustain_frames: 1,
            release_cooldown_ms: 0,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> PalmResult<()> {
        if !(self.min_confidence > 0.0 && self.min_confidence <= 1.0) {
            return Err(PalmError::config(format!(
                "gesture.min_confidence must be in (0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(PalmError::config("gesture.frame_interval_ms must be positive"));
        }
        if self.commit_window_ms < self.frame_interval_ms {
            return Err(PalmError::config(format!(
                "gesture.commit_window_ms ({}) must cover at least one frame ({} ms)",
                self.commit_window_ms, self.frame_interval_ms
            )));
        }
        if self.drag_sustain_frames == 0 {
            return Err(PalmError::config("gesture.drag_sustain_frames must be at least 1"));
        }

        let mut seen = HashSet::new();
        for (name, labels) in [
            ("commit_labels", &self.commit_labels),
            ("drag_labels", &self.drag_labels),
            ("release_labels", &self.release_labels),
        ] {
            if labels.is_empty() {
                return Err(PalmError::config(format!("gesture.{name} must not be empty")));
            }
            for label in labels {
                if !seen.insert(label.as_str()) {
                    return Err(PalmError::config(format!(
                        "gesture label '{label}' is assigned to more than one role"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Class and effective confidence of a reading.
    pub fn classify(&self, reading: &GestureReading) -> (LabelClass, f64) {
        let label = reading.label.as_str();
        let class = if self.commit_labels.iter().any(|l| l == label) {
            LabelClass::Commit
        } else if self.drag_labels.iter().any(|l| l == label) {
            LabelClass::Drag
        } else if self.release_labels.iter().any(|l| l == label) {
            LabelClass::Release
        } else if label.is_empty() || label == "None" {
            return (LabelClass::None, 0.0);
        } else {
            return (LabelClass::Other, 0.0);
        };

        let confidence = reading.sanitized_confidence();
        if confidence < self.min_confidence {
            (LabelClass::None, confidence)
        } else {
            (class, confidence)
        }
    }
}

/// One tick of input to the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsmInput {
    pub timestamp_ms: TimestampMs,
    pub gate_armed: bool,
    pub class: LabelClass,
    pub confidence: f64,
}

impl FsmInput {
    pub fn from_reading(
        reading: &GestureReading,
        gate_armed: bool,
        timestamp_ms: TimestampMs,
        config: &GestureConfig,
    ) -> Self {
        let (class, confidence) = config.classify(reading);
        Self {
            timestamp_ms,
            gate_armed,
            class,
            confidence,
        }
    }
}

/// Consecutive ticks sharing one label class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRun {
    pub class: LabelClass,
    pub since_ms: TimestampMs,
    pub frames: u32,
}

impl LabelRun {
    fn start(class: LabelClass, timestamp_ms: TimestampMs) -> Self {
        Self {
            class,
            since_ms: timestamp_ms,
            frames: 1,
        }
    }

    fn extend(&self, class: LabelClass, timestamp_ms: TimestampMs) -> Self {
        if class == self.class {
            Self {
                frames: self.frames.saturating_add(1),
                ..*self
            }
        } else {
            Self::start(class, timestamp_ms)
        }
    }

    fn held_ms(&self, now_ms: TimestampMs) -> u64 {
        now_ms.saturating_sub(self.since_ms)
    }
}

/// Machine memory between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsmState {
    pub phase: Phase,
    /// When the current phase was entered.
    pub entered_ms: Option<TimestampMs>,
    pub run: Option<LabelRun>,
    /// Time of the last UP, for the re-arm cooldown.
    pub last_release_ms: Option<TimestampMs>,
}

impl Default for FsmState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            entered_ms: None,
            run: None,
            last_release_ms: None,
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: FsmState,
    pub action: PointerActionKind,
    /// RELEASED or CANCELLED, if the machine passed through one this tick.
    pub passed_through: Option<Phase>,
}

impl Transition {
    /// The phase reported for this tick (the transient one if any).
    pub fn reported_phase(&self) -> Phase {
        self.passed_through.unwrap_or(self.next.phase)
    }
}

/// Advance the machine by one tick.
pub fn transition(state: &FsmState, input: &FsmInput, config: &GestureConfig) -> Transition {
    use PointerActionKind as A;

    let now = input.timestamp_ms;
    let phase = if state.phase.is_transient() {
        Phase::Idle
    } else {
        state.phase
    };
    let run = match state.run {
        Some(run) if phase == state.phase => run.extend(input.class, now),
        _ => LabelRun::start(input.class, now),
    };

    let stay = |action| Transition {
        next: FsmState {
            phase,
            entered_ms: state.entered_ms.or(Some(now)),
            run: Some(run),
            last_release_ms: state.last_release_ms,
        },
        action,
        passed_through: None,
    };
    let enter = |to: Phase, action, passed_through: Option<Phase>, released: bool| Transition {
        next: FsmState {
            phase: to,
            entered_ms: Some(now),
            run: Some(LabelRun::start(input.class, now)),
            last_release_ms: if released {
                Some(now)
            } else {
                state.last_release_ms
            },
        },
        action,
        passed_through,
    };
    let cancel = || enter(Phase::Idle, A::Cancel, Some(Phase::Cancelled), false);
    let release = || enter(Phase::Idle, A::Up, Some(Phase::Released), true);
    let idle_tick = if input.gate_armed { A::Move } else { A::None };

    match phase {
        Phase::Idle | Phase::Released | Phase::Cancelled => {
            if !input.gate_armed {
                return stay(A::None);
            }
            let cooled = state
                .last_release_ms
                .map_or(true, |t| now.saturating_sub(t) >= config.release_cooldown_ms);
            if cooled {
                enter(Phase::Armed, A::None, None, false)
            } else {
                stay(A::Move)
            }
        }
        Phase::Armed => {
            if !input.gate_armed {
                enter(Phase::Idle, A::None, None, false)
            } else if run.class == LabelClass::Commit && run.held_ms(now) >= config.commit_window_ms
            {
                enter(Phase::Engaged, A::Down, None, false)
            } else {
                stay(idle_tick)
            }
        }
        Phase::Engaged => {
            if !input.gate_armed || input.confidence < config.min_confidence {
                cancel()
            } else if input.class == LabelClass::Release {
                release()
            } else if run.class == LabelClass::Drag && run.frames >= config.drag_sustain_frames {
                enter(Phase::Dragging, A::MoveDrag, None, false)
            } else {
                stay(A::Move)
            }
        }
        Phase::Dragging => {
            if !input.gate_armed {
                cancel()
            } else if input.class == LabelClass::Release {
                release()
            } else {
                stay(A::MoveDrag)
            }
        }
    }
}

/// Owns a gesture configuration and the machine state.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    config: GestureConfig,
    state: FsmState,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> PalmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: FsmState::default(),
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> &FsmState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Classify `reading` and advance one tick.
    pub fn step(
        &mut self,
        reading: &GestureReading,
        gate_armed: bool,
        timestamp_ms: TimestampMs,
    ) -> Transition {
        let input = FsmInput::from_reading(reading, gate_armed, timestamp_ms, &self.config);
        self.apply(&input)
    }

    /// Advance one tick with an already classified input.
    pub fn apply(&mut self, input: &FsmInput) -> Transition {
        let t = transition(&self.state, input, &self.config);
        if t.reported_phase() != self.state.phase {
            tracing::debug!(
                from = %self.state.phase,
                to = %t.reported_phase(),
                action = t.action.as_str(),
                t = input.timestamp_ms,
                "gesture phase changed"
            );
        }
        self.state = t.next;
        t
    }

    pub fn reset(&mut self) {
        self.state = FsmState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PointerActionKind as A;

    fn machine() -> GestureMachine {
        GestureMachine::new(GestureConfig::default()).unwrap()
    }

    fn input(t: TimestampMs, armed: bool, class: LabelClass) -> FsmInput {
        let confidence = match class {
            LabelClass::Other | LabelClass::None => 0.0,
            _ => 0.9,
        };
        FsmInput {
            timestamp_ms: t,
            gate_armed: armed,
            class,
            confidence,
        }
    }

    /// Machine in ENGAGED after a commit held from t=0.
    fn engaged() -> (GestureMachine, TimestampMs) {
        engaged_with(GestureConfig::default())
    }

    fn engaged_with(config: GestureConfig) -> (GestureMachine, TimestampMs) {
        let mut m = GestureMachine::new(config).unwrap();
        m.apply(&input(0, true, LabelClass::Commit));
        m.apply(&input(100, true, LabelClass::Commit));
        let t = m.apply(&input(150, true, LabelClass::Commit));
        assert_eq!(t.action, A::Down);
        assert_eq!(m.phase(), Phase::Engaged);
        (m, 150)
    }

    #[test]
    fn test_classify() {
        let c = GestureConfig::default();
        assert_eq!(
            c.classify(&GestureReading::new("Pointing_Up", 0.9)),
            (LabelClass::Commit, 0.9)
        );
        assert_eq!(
            c.classify(&GestureReading::new("Pointing_Up", 0.5)),
            (LabelClass::None, 0.5)
        );
        assert_eq!(
            c.classify(&GestureReading::new("Victory", 0.99)),
            (LabelClass::Other, 0.0)
        );
        assert_eq!(c.classify(&GestureReading::none()), (LabelClass::None, 0.0));
        assert_eq!(
            c.classify(&GestureReading::new("Open_Palm", f64::NAN)),
            (LabelClass::None, 0.0)
        );
    }

    #[test]
    fn test_idle_arms_silently() {
        let mut m = machine();
        assert_eq!(m.apply(&input(0, false, LabelClass::None)).action, A::None);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.apply(&input(33, true, LabelClass::None)).action, A::None);
        assert_eq!(m.phase(), Phase::Armed);
        assert_eq!(m.apply(&input(66, true, LabelClass::None)).action, A::Move);
    }

    #[test]
    fn test_commit_window_measured_within_armed() {
        let mut m = machine();
        // Commit held while disarmed does not count.
        m.apply(&input(0, false, LabelClass::Commit));
        m.apply(&input(200, false, LabelClass::Commit));
        m.apply(&input(300, true, LabelClass::Commit));
        assert_eq!(m.phase(), Phase::Armed);
        assert_eq!(m.apply(&input(400, true, LabelClass::Commit)).action, A::Move);
        assert_eq!(m.apply(&input(449, true, LabelClass::Commit)).action, A::Move);
        assert_eq!(m.apply(&input(450, true, LabelClass::Commit)).action, A::Down);
    }

    #[test]
    fn test_interrupted_commit_restarts_window() {
        let mut m = machine();
        m.apply(&input(0, true, LabelClass::Commit));
        m.apply(&input(100, true, LabelClass::Commit));
        m.apply(&input(120, true, LabelClass::None));
        assert_eq!(m.apply(&input(200, true, LabelClass::Commit)).action, A::Move);
        assert_eq!(m.apply(&input(349, true, LabelClass::Commit)).action, A::Move);
        assert_eq!(m.apply(&input(350, true, LabelClass::Commit)).action, A::Down);
    }

    #[test]
    fn test_release_emits_up_and_rests_idle() {
        let (mut m, t) = engaged();
        let tr = m.apply(&input(t + 33, true, LabelClass::Release));
        assert_eq!(tr.action, A::Up);
        assert_eq!(tr.passed_through, Some(Phase::Released));
        assert_eq!(tr.reported_phase(), Phase::Released);
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_low_confidence_cancels_engaged() {
        let (mut m, t) = engaged();
        let tr = m.apply(&input(t + 33, true, LabelClass::None));
        assert_eq!(tr.action, A::Cancel);
        assert_eq!(tr.passed_through, Some(Phase::Cancelled));
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_disarm_cancels_engaged() {
        let (mut m, t) = engaged();
        assert_eq!(m.apply(&input(t + 33, false, LabelClass::Commit)).action, A::Cancel);
    }

    #[test]
    fn test_drag_then_release() {
        let (mut m, t) = engaged();
        assert_eq!(m.apply(&input(t + 33, true, LabelClass::Drag)).action, A::MoveDrag);
        assert_eq!(m.phase(), Phase::Dragging);
        // Dragging tolerates classifier dropouts.
        assert_eq!(m.apply(&input(t + 66, true, LabelClass::None)).action, A::MoveDrag);
        assert_eq!(m.apply(&input(t + 99, true, LabelClass::Release)).action, A::Up);
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_drag_sustain_frames() {
        let config = GestureConfig {
            drag_sustain_frames: 3,
            ..GestureConfig::default()
        };
        let mut m = GestureMachine::new(config).unwrap();
        m.apply(&input(0, true, LabelClass::Commit));
        m.apply(&input(150, true, LabelClass::Commit));
        assert_eq!(m.apply(&input(183, true, LabelClass::Drag)).action, A::Move);
        assert_eq!(m.apply(&input(216, true, LabelClass::Drag)).action, A::Move);
        assert_eq!(m.apply(&input(249, true, LabelClass::Drag)).action, A::MoveDrag);
    }

    #[test]
    fn test_rearms_on_first_armed_tick_after_up() {
        let (mut m, t) = engaged();
        let up_at = t + 33;
        assert_eq!(m.apply(&input(up_at, true, LabelClass::Release)).action, A::Up);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.apply(&input(up_at + 33, true, LabelClass::None)).action, A::None);
        assert_eq!(m.phase(), Phase::Armed);
    }

    #[test]
    fn test_cooldown_blocks_rearm() {
        let (mut m, t) = engaged_with(GestureConfig {
            release_cooldown_ms: 200,
            ..GestureConfig::default()
        });
        let up_at = t + 33;
        m.apply(&input(up_at, true, LabelClass::Release));
        assert_eq!(m.apply(&input(up_at + 33, true, LabelClass::Commit)).action, A::Move);
        assert_eq!(m.phase(), Phase::Idle);
        m.apply(&input(up_at + 199, true, LabelClass::Commit));
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.apply(&input(up_at + 200, true, LabelClass::Commit)).action, A::None);
        assert_eq!(m.phase(), Phase::Armed);
    }

    #[test]
    fn test_transient_start_is_idle() {
        let config = GestureConfig::default();
        for transient in [Phase::Released, Phase::Cancelled] {
            let state = FsmState {
                phase: transient,
                ..FsmState::default()
            };
            let from_transient = transition(&state, &input(10, true, LabelClass::None), &config);
            let from_idle = transition(&FsmState::default(), &input(10, true, LabelClass::None), &config);
            assert_eq!(from_transient.action, from_idle.action);
            assert_eq!(from_transient.next.phase, from_idle.next.phase);
        }
    }

    #[test]
    fn test_invalid_config() {
        let cases = [
            GestureConfig {
                min_confidence: 0.0,
                ..GestureConfig::default()
            },
            GestureConfig {
                commit_window_ms: 10,
                ..GestureConfig::default()
            },
            GestureConfig {
                drag_sustain_frames: 0,
                ..GestureConfig::default()
            },
            GestureConfig {
                drag_labels: vec![],
                ..GestureConfig::default()
            },
            GestureConfig {
                drag_labels: vec!["Pointing_Up".to_string()],
                ..GestureConfig::default()
            },
        ];
        for config in cases {
            assert!(GestureMachine::new(config).unwrap_err().is_config());
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut m, _) = engaged();
        m.reset();
        m.reset();
        assert_eq!(*m.state(), FsmState::default());
    }

    /// Every phase × gate × class × confidence × elapsed combination yields
    /// a resting phase and an action consistent with it.
    #[test]
    fn test_transition_is_total() {
        let config = GestureConfig::default();
        let confidences = [0.0, 0.5, 0.7, 1.0];
        let elapsed = [0u64, 16, 149, 150, 199, 200, 1_000];
        let now = 10_000;

        for phase in Phase::ALL {
            for armed in [false, true] {
                for class in LabelClass::ALL {
                    for confidence in confidences {
                        for held in elapsed {
                            for prior in [None, Some(class), Some(LabelClass::None)] {
                                let state = FsmState {
                                    phase,
                                    entered_ms: Some(now - held),
                                    run: prior.map(|c| LabelRun {
                                        class: c,
                                        since_ms: now - held,
                                        frames: 2,
                                    }),
                                    last_release_ms: Some(now - held),
                                };
                                let inp = FsmInput {
                                    timestamp_ms: now,
                                    gate_armed: armed,
                                    class,
                                    confidence,
                                };
                                let t = transition(&state, &inp, &config);
                                assert_eq!(t, transition(&state, &inp, &config));

                                assert!(!t.next.phase.is_transient());
                                match t.passed_through {
                                    Some(Phase::Released) => assert_eq!(t.action, A::Up),
                                    Some(Phase::Cancelled) => assert_eq!(t.action, A::Cancel),
                                    Some(other) => panic!("rested in {other}"),
                                    None => {}
                                }
                                if !armed {
                                    assert!(matches!(t.action, A::None | A::Cancel));
                                    assert_eq!(t.next.phase, Phase::Idle);
                                }
                                if t.action == A::Down {
                                    assert_eq!(phase, Phase::Armed);
                                    assert_eq!(t.next.phase, Phase::Engaged);
                                }
                                if matches!(t.next.phase, Phase::Engaged | Phase::Dragging) {
                                    assert!(matches!(t.action, A::Down | A::Move | A::MoveDrag));
                                }
                                if matches!(t.action, A::Up | A::Cancel) {
                                    assert!(matches!(phase, Phase::Engaged | Phase::Dragging));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
