//! Intent routing for free-text input.

use crate::config::ClassifierMode;
use crate::ports::interpreter::Interpreter;
use dbchat_domain::{HeuristicIntentClassifier, Intent, SessionContext};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides what a free-text line asks for.
///
/// A URI in the text always means connect. In [`ClassifierMode::Model`] the
/// interpreter labels the rest, with the keyword rules as fallback when the
/// call fails or the label is not understood.
pub struct IntentRouter {
    mode: ClassifierMode,
    heuristic: HeuristicIntentClassifier,
    interpreter: Arc<dyn Interpreter>,
}

impl IntentRouter {
    pub fn new(mode: ClassifierMode, interpreter: Arc<dyn Interpreter>) -> Self {
        Self {
            mode,
            heuristic: HeuristicIntentClassifier::new(),
            interpreter,
        }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    pub async fn classify(&self, text: &str, context: &SessionContext) -> Intent {
        let fallback = self.heuristic.classify(text, context);
        if self.mode == ClassifierMode::Heuristic
            || matches!(fallback, Intent::Connect(_))
            || !context.connected
        {
            return fallback;
        }

        match self.interpreter.classify(text, context).await {
            Ok(label) => match Intent::from_label(&label) {
                Some(intent) => {
                    debug!("Model classified input as {}", intent.label());
                    intent
                }
                None => {
                    debug!("Unrecognized intent label '{}', using keyword rules", label);
                    fallback
                }
            },
            Err(e) => {
                warn!("Intent classification failed: {}", e);
                fallback
            }
        }
    }
}
