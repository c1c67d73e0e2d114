use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speech recognition engine owned by the shell.
///
/// `start` opens one signal stream per session; the shell forwards the
/// engine's start/partial/result/end/error callbacks into it. `stop` and
/// `destroy` are notifications. `destroy` must release the engine and
/// deregister every listener on the platform side.
pub struct Voice<E> {
    context: CapabilityContext<SpeechOperation, E>,
}

impl<Ev> Capability<Ev> for Voice<Ev> {
    type Operation = SpeechOperation;
    type MappedSelf<MappedEv> = Voice<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Voice::new(self.context.map_event(f))
    }
}

impl<E> Voice<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<SpeechOperation, E>) -> Self {
        Self { context }
    }

    pub fn start<F>(&self, locale: impl Into<String>, make_event: F)
    where
        F: Fn(SpeechSignal) -> E + Send + Sync + 'static,
    {
        let ctx = self.context.clone();
        let operation = SpeechOperation::Start {
            locale: locale.into(),
        };
        self.context.spawn(async move {
            let mut signals = ctx.stream_from_shell(operation);
            while let Some(signal) = signals.next().await {
                ctx.update_app(make_event(signal));
            }
        });
    }

    pub fn stop(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(SpeechOperation::Stop).await;
        });
    }

    pub fn destroy(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(SpeechOperation::Destroy).await;
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeechOperation {
    Start { locale: String },
    Stop,
    Destroy,
}

impl Operation for SpeechOperation {
    type Output = SpeechSignal;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeechSignal {
    Started,
    /// The engine could not begin listening (permissions, no recognizer).
    StartFailed(VoiceError),
    PartialResults(Vec<String>),
    Results(Vec<String>),
    Ended,
    Error(VoiceError),
}

impl SpeechSignal {
    /// Best alternative of a result list, if it carries any text.
    pub fn best_alternative(alternatives: &[String]) -> Option<&str> {
        alternatives
            .first()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct VoiceError {
    pub code: Option<String>,
    pub message: String,
}

impl VoiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
