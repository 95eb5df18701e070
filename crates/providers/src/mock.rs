//! Scripted generation backend for tests and offline runs.
//!
//! Deterministic by construction: no network, no clock, no randomness.
//! The parroting mode echoes the whole prompt back as the answer, which
//! lets end-to-end tests assert what the composed context did — and did
//! not — contain.

use confidant_core::error::GenerationError;
use confidant_core::generation::{GenerationRequest, GenerationResponse, Generator};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum Script {
    /// Always answer with this text.
    Answer(String),
    /// Echo the composed system text and question back as the answer.
    Parrot,
    /// Fail with each error in order, then answer with the final text.
    Sequence {
        errors: Mutex<Vec<GenerationError>>,
        then: String,
    },
    /// Fail every call with a clone of this error.
    AlwaysFail(GenerationError),
    /// Never return (timeout testing).
    Hang,
}

pub struct ScriptedGenerator {
    script: Script,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl ScriptedGenerator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn answering(text: impl Into<String>) -> Self {
        Self::with_script(Script::Answer(text.into()))
    }

    pub fn parroting() -> Self {
        Self::with_script(Script::Parrot)
    }

    pub fn failing_then_answering(
        errors: Vec<GenerationError>,
        then: impl Into<String>,
    ) -> Self {
        Self::with_script(Script::Sequence {
            errors: Mutex::new(errors),
            then: then.into(),
        })
    }

    pub fn always_failing(error: GenerationError) -> Self {
        Self::with_script(Script::AlwaysFail(error))
    }

    pub fn hanging() -> Self {
        Self::with_script(Script::Hang)
    }

    /// Shared call counter, usable after the generator is moved into an Arc.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Handle on the most recent request, for prompt-content assertions.
    pub fn request_probe(&self) -> Arc<Mutex<Option<GenerationRequest>>> {
        self.last_request.clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let text = match &self.script {
            Script::Answer(text) => text.clone(),
            Script::Parrot => format!("{}\n\n{}", request.system, request.question),
            Script::Sequence { errors, then } => {
                let mut errors = errors.lock().unwrap();
                if errors.is_empty() {
                    then.clone()
                } else {
                    return Err(errors.remove(0));
                }
            }
            Script::AlwaysFail(error) => return Err(error.clone()),
            Script::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                unreachable!()
            }
        };

        Ok(GenerationResponse { text, model: "scripted".into(), usage: None })
    }
}
