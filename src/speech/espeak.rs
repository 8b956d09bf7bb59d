use std::process::{Child, Command, Stdio};

use super::{SpeechEngine, Utterance, Voice};

/// Speech through an `espeak-ng` compatible command-line program.
/// Each utterance is one child process; cancelling kills it.
pub struct EspeakEngine {
    program: String,
    voices: Vec<Voice>,
    child: Option<Child>,
}

impl EspeakEngine {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let voices = list_voices(&program);
        log::info!("Speech via {program}: {} voices", voices.len());

        Self {
            program,
            voices,
            child: None,
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn speak(&mut self, utterance: &Utterance) {
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.id.clone())
            .unwrap_or_else(|| utterance.lang.to_ascii_lowercase());

        let spawned = Command::new(&self.program)
            .arg("-v")
            .arg(voice)
            .arg("-p")
            .arg(espeak_pitch(utterance.pitch).to_string())
            .arg("-s")
            .arg(espeak_rate(utterance.rate).to_string())
            .arg("--")
            .arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e) => log::warn!("Could not run {}: {e}", self.program),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn is_speaking(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// espeak pitch is 0-99 with 50 as normal.
fn espeak_pitch(pitch: f32) -> u32 {
    (pitch * 50.0).round().clamp(0.0, 99.0) as u32
}

/// espeak rate is words per minute, 175 by default.
fn espeak_rate(rate: f32) -> u32 {
    (rate * 175.0).round().clamp(80.0, 450.0) as u32
}

fn list_voices(program: &str) -> Vec<Voice> {
    match Command::new(program).arg("--voices").output() {
        Ok(out) if out.status.success() => parse_voice_list(&String::from_utf8_lossy(&out.stdout)),
        Ok(out) => {
            log::warn!("{program} --voices exited with {}", out.status);
            Vec::new()
        }
        Err(e) => {
            log::warn!("Speech unavailable, could not run {program}: {e}");
            Vec::new()
        }
    }
}

/// Parses the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US           (en 10)
/// ```
fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let (lang, name) = (cols.get(1)?, cols.get(3)?);
            Some(Voice {
                id: lang.to_string(),
                name: name.replace('_', " "),
                lang: lang.to_string(),
            })
        })
        .collect()
}
