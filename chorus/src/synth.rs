//! Per-star synth state machine.

use crate::audio::{Tone, VoiceId};
use crate::timer::TaskId;

/// Lifecycle of one star's transit tone.
///
/// Idle → Queued → Playing → Idle on the natural path; Queued or Playing
/// drop straight back to Idle on cancellation. The scheduler guarantees at
/// most one pending or playing tone per star.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SynthState {
    Idle,
    /// A begin task is scheduled; once the voice exists it waits for its
    /// start time.
    Queued {
        task: TaskId,
        tone: Tone,
        voice: Option<VoiceId>,
    },
    /// The voice is sounding; the task marks its scheduled end.
    Playing { task: TaskId, voice: VoiceId },
}

/// One star's synthesis state.
#[derive(Debug, Default)]
pub struct StarSynth {
    pub(crate) state: SynthState,
}

impl Default for SynthState {
    fn default() -> Self {
        SynthState::Idle
    }
}

impl StarSynth {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tone is scheduled but has not finished starting.
    pub fn is_queued(&self) -> bool {
        matches!(self.state, SynthState::Queued { .. })
    }

    /// The voice is currently sounding.
    pub fn is_playing(&self) -> bool {
        matches!(self.state, SynthState::Playing { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SynthState::Idle)
    }
}
