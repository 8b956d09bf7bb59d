//! Narration read aloud.
//!
//! `profile` maps setting and emotion to pitch/rate, `voice` picks a
//! voice for the target language, and `SpeechService` keeps at most one
//! utterance alive on a [`SpeechEngine`].

pub mod espeak;
pub mod profile;
pub mod service;
pub mod voice;

pub use service::SpeechService;
pub use voice::Voice;

/// A single thing to say, fully parameterised.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
    pub pitch: f32,
    pub rate: f32,
}

/// Text-to-speech backend.
pub trait SpeechEngine {
    fn voices(&self) -> &[Voice];

    /// Start speaking. Must not block until the utterance finishes.
    fn speak(&mut self, utterance: &Utterance);

    fn cancel(&mut self);

    fn is_speaking(&mut self) -> bool;
}
