use crate::domain::intent::{self, GlobalCommand, YesNo};
use crate::domain::ports::{IntentClassifier, SharedLanguageModel};
use crate::domain::session::DEFAULT_LANGUAGE;
use async_trait::async_trait;
use tracing::warn;

const LABEL_TOKENS: u32 = 10;
const TRANSLATION_TOKENS: u32 = 500;

const LANGUAGE_PROMPT: &str = "Detect the language of the following text. Return the ISO 639-1 language code (e.g., 'en' for English, 'fr' for French, 'es' for Spanish, 'hi' for Hindi, 'ja' for Japanese, 'de' for German, etc.). If you cannot detect the language or are unsure, return 'en' as default.";

const YES_NO_PROMPT: &str = "Analyze the user's message in ANY language to detect their yes/no intent. Return ONLY 'yes' if they want to proceed/confirm (words like yes, oui, sí, ja, はい, हाँ, okay, d'accord, vale, confirm, confirmer, proceed, continue, etc.), 'no' if they want to make changes/edit (words like no, non, nein, いいえ, नहीं, edit, modifier, editar, change, changer, cambiar, modify, etc.), or 'unclear' if their intent is ambiguous. Work with all languages including English, French, Spanish, German, Italian, Hindi, Japanese, etc.";

const GLOBAL_COMMAND_PROMPT: &str = "Analyze the user's message in ANY language to detect if they want to restart the bot or change language. Return ONLY 'restart' if they want to restart/reset the bot (words like restart, reset, recommencer, reiniciar, neustart, riavviare, etc.), 'language' if they want to change language (words like language, langue, idioma, sprache, lingua, etc.), or 'none' if neither. Work with all languages including English, French, Spanish, German, Italian, Hindi, Japanese, etc.";

const ANOTHER_POSTCARD_PROMPT: &str = "Analyze the user's message in ANY language to determine if they want to send another postcard. Return ONLY 'yes' if they want to send another postcard (words like yes, oui, sí, ja, はい, हाँ, sure, bien sûr, claro, klar, certo, okay, d'accord, vale, etc.), 'no' if they don't want to send another postcard (words like no, non, nein, いいえ, नहीं, not now, pas maintenant, ahora no, nicht jetzt, non ora, maybe later, peut-être plus tard, etc.), or 'unclear' if their intent is ambiguous. Work with all languages including English, French, Spanish, German, Italian, Hindi, Japanese, etc.";

fn translation_prompt(target: &str) -> String {
    format!(
        "Translate the following text to the language with code \"{target}\". Keep emojis and formatting intact. Keep any placeholder in curly braces, such as {{name}}, exactly as written. Maintain the same tone and style. IMPORTANT: Always use formal language - use \"vous\" in French, \"usted\" in Spanish, and equivalent formal forms in all other languages. This is for professional customer service communication. Return only the translated text."
    )
}

/// [`IntentClassifier`] backed by prompt templates over a [`LanguageModel`](crate::domain::ports::LanguageModel).
pub struct ModelClassifier {
    model: SharedLanguageModel,
}

impl ModelClassifier {
    pub fn new(model: SharedLanguageModel) -> Self {
        Self { model }
    }

    async fn label(&self, task: &str, prompt: &str, text: &str) -> Option<String> {
        match self.model.complete(prompt, text, LABEL_TOKENS).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(task, error = %e, "classification failed, using fallback");
                None
            }
        }
    }
}

#[async_trait]
impl IntentClassifier for ModelClassifier {
    async fn detect_language(&self, text: &str) -> String {
        if let Some(code) = intent::language_from_shortcut(text) {
            return code.to_string();
        }
        self.label("detect_language", LANGUAGE_PROMPT, text)
            .await
            .and_then(|output| intent::parse_language_code(&output))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    async fn translate(&self, text: &str, target: &str) -> String {
        if target == DEFAULT_LANGUAGE {
            return text.to_string();
        }
        match self
            .model
            .complete(&translation_prompt(target), text, TRANSLATION_TOKENS)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!(target, error = %e, "translation failed, sending original text");
                text.to_string()
            }
        }
    }

    async fn detect_yes_no(&self, text: &str) -> YesNo {
        self.label("detect_yes_no", YES_NO_PROMPT, text)
            .await
            .map_or(YesNo::Unclear, |output| YesNo::from_model_output(&output))
    }

    async fn detect_global_command(&self, text: &str) -> GlobalCommand {
        self.label("detect_global_command", GLOBAL_COMMAND_PROMPT, text)
            .await
            .map_or(GlobalCommand::None, |output| {
                GlobalCommand::from_model_output(&output)
            })
    }

    async fn detect_free_intent(&self, text: &str) -> YesNo {
        self.label("detect_free_intent", ANOTHER_POSTCARD_PROMPT, text)
            .await
            .map_or(YesNo::Unclear, |output| YesNo::from_model_output(&output))
    }
}
