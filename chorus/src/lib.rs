//! Meridian-transit audio scheduling.
//!
//! Every star that crosses the observer's meridian gets a tone: pitch from
//! how close its transit altitude comes to the zenith, loudness from its
//! catalog brightness, fired at the moment of crossing. This crate computes
//! those parameters, schedules the events on a cancellable timer queue, and
//! drives them through an [`AudioOut`] endpoint owned by the embedder.
//!
//! [`Session`] ties the whole system together: simulated clock, observer
//! frame, visibility scheduling and the transit chorus, with the strict
//! update-before-read ordering the position caches rely on.

mod audio;
mod envelope;
mod session;
mod synth;
mod timer;
mod transit;

pub use audio::{AudioOut, SilentAudio, Tone, VoiceId};
pub use envelope::{amp_from_magnitude, note_from_altitude, Envelope};
pub use session::Session;
pub use synth::StarSynth;
pub use timer::{TaskId, TimerQueue};
pub use transit::{ChorusConfig, TransitChorus};
