use crate::model::game_state::{Emotion, GameSetting};

use super::profile::voice_params;
use super::voice::select_voice;
use super::{SpeechEngine, Utterance, Voice};

/// Reads narration aloud. Starting a new utterance cancels the current
/// one: last write wins, nothing is queued.
pub struct SpeechService<E> {
    engine: E,
    language: String,
}

impl<E: SpeechEngine> SpeechService<E> {
    pub fn new(engine: E, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
        }
    }

    pub fn voices(&self) -> &[Voice] {
        self.engine.voices()
    }

    pub fn speak(
        &mut self,
        text: &str,
        setting: GameSetting,
        emotion: Emotion,
        preferred_voice: Option<&str>,
    ) {
        self.cancel();

        let params = voice_params(setting, emotion, &mut rand::thread_rng());
        let voice = select_voice(self.engine.voices(), preferred_voice, &self.language).cloned();

        let utterance = Utterance {
            text: text.to_string(),
            lang: self.language.clone(),
            voice,
            pitch: params.pitch,
            rate: params.rate,
        };
        log::debug!(
            "Speaking {} chars, pitch {:.2}, rate {:.2}",
            text.len(),
            utterance.pitch,
            utterance.rate
        );
        self.engine.speak(&utterance);
    }

    pub fn cancel(&mut self) {
        if self.engine.is_speaking() {
            self.engine.cancel();
        }
    }

    pub fn is_speaking(&mut self) -> bool {
        self.engine.is_speaking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::profile::{MAX_LEVEL, MIN_LEVEL};

    /// Engine that records calls and "speaks" until cancelled.
    #[derive(Default)]
    struct RecordingEngine {
        voices: Vec<Voice>,
        speaking: bool,
        spoken: Vec<Utterance>,
        cancels: usize,
        max_concurrent: usize,
    }

    impl SpeechEngine for RecordingEngine {
        fn voices(&self) -> &[Voice] {
            &self.voices
        }

        fn speak(&mut self, utterance: &Utterance) {
            let concurrent = if self.speaking { 2 } else { 1 };
            self.max_concurrent = self.max_concurrent.max(concurrent);
            self.speaking = true;
            self.spoken.push(utterance.clone());
        }

        fn cancel(&mut self) {
            self.cancels += 1;
            self.speaking = false;
        }

        fn is_speaking(&mut self) -> bool {
            self.speaking
        }
    }

    fn voice(id: &str, lang: &str) -> Voice {
        Voice {
            id: id.into(),
            name: id.into(),
            lang: lang.into(),
        }
    }

    #[test]
    fn new_speech_cancels_the_previous_one() {
        let mut service = SpeechService::new(RecordingEngine::default(), "en-US");

        service.speak("one", GameSetting::Fantasy, Emotion::Calm, None);
        service.speak("two", GameSetting::Fantasy, Emotion::Action, None);
        service.speak("three", GameSetting::Fantasy, Emotion::Sad, None);

        assert_eq!(service.engine.spoken.len(), 3);
        assert_eq!(service.engine.cancels, 2);
        assert_eq!(service.engine.max_concurrent, 1);
    }

    #[test]
    fn utterance_uses_selected_voice_and_valid_params() {
        let mut engine = RecordingEngine::default();
        engine.voices = vec![voice("en1", "en-US"), voice("en2", "en")];
        let mut service = SpeechService::new(engine, "en-US");

        service.speak("hi", GameSetting::Cyberpunk, Emotion::Action, Some("en2"));

        let utterance = &service.engine.spoken[0];
        assert_eq!(utterance.voice.as_ref().unwrap().id, "en2");
        assert_eq!(utterance.lang, "en-US");
        assert!((MIN_LEVEL..=MAX_LEVEL).contains(&utterance.pitch));
        assert!((MIN_LEVEL..=MAX_LEVEL).contains(&utterance.rate));
    }

    #[test]
    fn cancel_when_idle_is_a_noop() {
        let mut service = SpeechService::new(RecordingEngine::default(), "en-US");
        service.cancel();
        assert_eq!(service.engine.cancels, 0);
        assert!(!service.is_speaking());
    }
}
