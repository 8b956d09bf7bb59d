use rand::Rng;

use crate::model::game_state::{Emotion, GameSetting};

/// Valid range for both pitch and rate.
pub const MIN_LEVEL: f32 = 0.1;
pub const MAX_LEVEL: f32 = 2.0;

/// Half-widths of the random variation added to each utterance.
pub const PITCH_JITTER: f32 = 0.05;
pub const RATE_JITTER: f32 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    pub pitch: f32,
    pub rate: f32,
}

impl VoiceProfile {
    const fn new(pitch: f32, rate: f32) -> Self {
        Self { pitch, rate }
    }
}

/// Base voice per setting.
pub fn setting_profile(setting: GameSetting) -> VoiceProfile {
    match setting {
        // velvety, unhurried baritone
        GameSetting::Fantasy => VoiceProfile::new(0.9, 0.9),
        // deep bass
        GameSetting::NoirDetective => VoiceProfile::new(0.6, 0.85),
        // higher and faster, more synthetic
        GameSetting::Cyberpunk => VoiceProfile::new(1.1, 1.1),
    }
}

/// Multiplier applied on top of the setting's base voice.
pub fn emotion_modifier(emotion: Emotion) -> VoiceProfile {
    match emotion {
        Emotion::Neutral => VoiceProfile::new(1.0, 1.0),
        Emotion::Calm => VoiceProfile::new(0.95, 0.9),
        Emotion::Sad => VoiceProfile::new(0.8, 0.75),
        Emotion::Tense => VoiceProfile::new(1.1, 1.15),
        Emotion::Action => VoiceProfile::new(1.25, 1.35),
    }
}

/// Pitch and rate before jitter.
pub fn base_params(setting: GameSetting, emotion: Emotion) -> VoiceProfile {
    let base = setting_profile(setting);
    let modifier = emotion_modifier(emotion);
    VoiceProfile::new(base.pitch * modifier.pitch, base.rate * modifier.rate)
}

/// Final pitch and rate: base × modifier, plus jitter, clamped to
/// [`MIN_LEVEL`, `MAX_LEVEL`].
pub fn voice_params<R: Rng + ?Sized>(
    setting: GameSetting,
    emotion: Emotion,
    rng: &mut R,
) -> VoiceProfile {
    let base = base_params(setting, emotion);
    let pitch = base.pitch + rng.gen_range(-PITCH_JITTER..=PITCH_JITTER);
    let rate = base.rate + rng.gen_range(-RATE_JITTER..=RATE_JITTER);

    VoiceProfile::new(
        pitch.clamp(MIN_LEVEL, MAX_LEVEL),
        rate.clamp(MIN_LEVEL, MAX_LEVEL),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn params_stay_in_range_for_every_combination() {
        let mut rng = StdRng::seed_from_u64(7);

        for setting in GameSetting::ALL {
            for emotion in Emotion::ALL {
                for _ in 0..200 {
                    let p = voice_params(setting, emotion, &mut rng);
                    assert!((MIN_LEVEL..=MAX_LEVEL).contains(&p.pitch));
                    assert!((MIN_LEVEL..=MAX_LEVEL).contains(&p.rate));
                }
            }
        }
    }

    #[test]
    fn jitter_is_bounded_around_base() {
        let mut rng = StdRng::seed_from_u64(42);

        for setting in GameSetting::ALL {
            for emotion in Emotion::ALL {
                let base = base_params(setting, emotion);
                for _ in 0..100 {
                    let p = voice_params(setting, emotion, &mut rng);
                    assert!((p.pitch - base.pitch).abs() <= PITCH_JITTER + 1e-6);
                    assert!((p.rate - base.rate).abs() <= RATE_JITTER + 1e-6);
                }
            }
        }
    }

    #[test]
    fn base_is_profile_times_modifier() {
        let p = base_params(GameSetting::Cyberpunk, Emotion::Action);
        assert!((p.pitch - 1.375).abs() < 1e-6);
        assert!((p.rate - 1.485).abs() < 1e-6);

        let p = base_params(GameSetting::NoirDetective, Emotion::Sad);
        assert!((p.pitch - 0.48).abs() < 1e-6);
        assert!((p.rate - 0.6375).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_params() {
        let a = voice_params(GameSetting::Fantasy, Emotion::Tense, &mut StdRng::seed_from_u64(3));
        let b = voice_params(GameSetting::Fantasy, Emotion::Tense, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
