use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};

/// Programs tried in order when no program is configured.
const CANDIDATE_PROGRAMS: &[&str] = &["spd-say", "espeak-ng", "espeak"];

/// Speech settings persisted in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// 1.0 is the program's normal speed.
    pub rate: f32,
    /// 1.0 is the program's normal pitch.
    pub pitch: f32,
    /// Explicit speech program (name on PATH or absolute path).
    #[serde(default)]
    pub program: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 0.8,
            pitch: 1.0,
            program: None,
        }
    }
}

/// A single utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

impl SpeechRequest {
    /// Utterance announcing a classified letter, e.g. "Letter A".
    pub fn for_letter(letter: char, config: &SpeechConfig) -> Self {
        Self {
            text: format!("Letter {letter}"),
            rate: config.rate,
            pitch: config.pitch,
        }
    }
}

/// One-way speech sink. Never reports failure to the caller.
pub trait Speaker {
    fn speak(&self, request: SpeechRequest);
}

/// Used when speech is disabled or no speech program is installed.
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, request: SpeechRequest) {
        log::debug!("Speech unavailable, dropping {:?}", request.text);
    }
}

/// Argument dialect of the speech program. Only these two are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramKind {
    SpdSay,
    Espeak,
}

impl ProgramKind {
    fn detect(path: &Path) -> Option<Self> {
        let name = path.file_stem()?.to_string_lossy();
        match &*name {
            "spd-say" => Some(ProgramKind::SpdSay),
            "espeak" | "espeak-ng" => Some(ProgramKind::Espeak),
            _ => None,
        }
    }

    fn args(self, request: &SpeechRequest) -> Vec<String> {
        match self {
            // spd-say: rate and pitch in -100..=100, 0 is normal
            ProgramKind::SpdSay => {
                let scale = |v: f32| ((v - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32;
                vec![
                    "-r".into(),
                    scale(request.rate).to_string(),
                    "-p".into(),
                    scale(request.pitch).to_string(),
                    request.text.clone(),
                ]
            }
            // espeak: words per minute (175 normal), pitch 0..=99 (50 normal)
            ProgramKind::Espeak => {
                let wpm = (175.0 * request.rate).round().clamp(80.0, 450.0) as i32;
                let pitch = (50.0 * request.pitch).round().clamp(0.0, 99.0) as i32;
                vec![
                    "-s".into(),
                    wpm.to_string(),
                    "-p".into(),
                    pitch.to_string(),
                    request.text.clone(),
                ]
            }
        }
    }
}

/// Speaks by running an external speech program on the tokio runtime.
pub struct CommandSpeaker {
    path: PathBuf,
    kind: ProgramKind,
    runtime: tokio::runtime::Handle,
}

impl CommandSpeaker {
    fn new(path: PathBuf, kind: ProgramKind, runtime: tokio::runtime::Handle) -> Self {
        Self {
            path,
            kind,
            runtime,
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, request: SpeechRequest) {
        let mut cmd = tokio::process::Command::new(&self.path);
        cmd.args(self.kind.args(&request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let program = self.path.display().to_string();

        self.runtime.spawn(async move {
            match cmd.status().await {
                Ok(status) if status.success() => {}
                Ok(status) => log::warn!("Speech program {program} exited with {status}"),
                Err(e) => log::warn!("Failed to run speech program {program}: {e}"),
            }
        });
    }
}

/// Pick a speaker for `config`, falling back to silence when unavailable.
pub fn build_speaker(config: &SpeechConfig, runtime: tokio::runtime::Handle) -> Box<dyn Speaker> {
    if !config.enabled {
        log::info!("Speech disabled in config");
        return Box::new(SilentSpeaker);
    }

    match resolve_program(config) {
        Some((path, kind)) => {
            log::info!("Speech via {}", path.display());
            Box::new(CommandSpeaker::new(path, kind, runtime))
        }
        None => Box::new(SilentSpeaker),
    }
}

/// Locate the speech program and its argument dialect.
fn resolve_program(config: &SpeechConfig) -> Option<(PathBuf, ProgramKind)> {
    let Some(program) = &config.program else {
        let found = CANDIDATE_PROGRAMS.iter().find_map(|p| {
            let path = find_program(p)?;
            ProgramKind::detect(&path).map(|kind| (path, kind))
        });
        if found.is_none() {
            log::debug!("No speech program found, speech disabled");
        }
        return found;
    };

    let Some(path) = find_program(program) else {
        log::warn!("Speech program {program} not found, speech disabled");
        return None;
    };
    match ProgramKind::detect(&path) {
        Some(kind) => Some((path, kind)),
        None => {
            log::warn!(
                "Unsupported speech program {}, expected spd-say, espeak or espeak-ng",
                path.display()
            );
            None
        }
    }
}

/// Resolve `program` against PATH, or check it directly if it contains a separator.
fn find_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
