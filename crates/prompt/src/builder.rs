//! Prompt builder for rendering templates and injecting trend context.

use crate::loader::{
    builtin_prompts, list_prompt_files, load_prompt_file, ASKAI_FALLBACK, ASKAI_REWRITE,
    ASKAI_TRENDS, CONTENT_GENERATE, HASHTAGS_GENERATE,
};
use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use std::collections::HashMap;
use std::path::Path;
use trendcast_core::{AppError, AppResult, TrendRecord};

/// All prompt definitions, registered and ready to render.
///
/// Loaded once at startup so that a broken override fails before the
/// service accepts requests.
pub struct PromptLibrary {
    handlebars: Handlebars<'static>,
    definitions: HashMap<String, PromptDefinition>,
}

impl std::fmt::Debug for PromptLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptLibrary")
            .field("prompts", &self.ids())
            .finish()
    }
}

impl PromptLibrary {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Self::load(None)
    }

    /// Built-in prompts, with any `<id>.yml` in `prompts_dir` replacing the
    /// built-in of the same id.
    pub fn load(prompts_dir: Option<&Path>) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Disable HTML escaping for plain text
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        let mut definitions = HashMap::new();
        for definition in builtin_prompts()? {
            definitions.insert(definition.id.clone(), definition);
        }

        if let Some(dir) = prompts_dir {
            for path in list_prompt_files(dir)? {
                let definition = load_prompt_file(&path)?;
                tracing::info!("Prompt override: {} ({:?})", definition.id, path);
                definitions.insert(definition.id.clone(), definition);
            }
        }

        for definition in definitions.values() {
            handlebars
                .register_template_string(&definition.id, &definition.template)
                .map_err(|e| {
                    AppError::Prompt(format!(
                        "Failed to register template '{}': {}",
                        definition.id, e
                    ))
                })?;
        }

        tracing::debug!(prompts = definitions.len(), "Loaded prompt library");
        Ok(Self {
            handlebars,
            definitions,
        })
    }

    pub fn get(&self, id: &str) -> Option<&PromptDefinition> {
        self.definitions.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Render prompt `id` with `variables`. Every declared variable must be
    /// present.
    pub fn render(&self, id: &str, variables: HashMap<String, String>) -> AppResult<BuiltPrompt> {
        self.render_with_trends(id, variables, 0)
    }

    fn render_with_trends(
        &self,
        id: &str,
        variables: HashMap<String, String>,
        trends_included: usize,
    ) -> AppResult<BuiltPrompt> {
        let definition = self
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))?;

        if let Some(missing) = definition
            .variables
            .iter()
            .find(|var| !variables.contains_key(*var))
        {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' requires variable '{}'",
                id, missing
            )));
        }

        let text = self
            .handlebars
            .render(id, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", id, e)))?;

        tracing::debug!(prompt = id, chars = text.len(), "Built prompt");
        Ok(BuiltPrompt::new(text, id, trends_included, variables))
    }

    /// Ask for five hashtags about `topic`.
    pub fn hashtags(&self, topic: &str) -> AppResult<BuiltPrompt> {
        self.render(HASHTAGS_GENERATE, vars(&[("topic", topic)]))
    }

    /// Ask for a content script about `topic`.
    pub fn content(&self, topic: &str) -> AppResult<BuiltPrompt> {
        self.render(CONTENT_GENERATE, vars(&[("topic", topic)]))
    }

    /// Apply a style rewrite instruction to `content`.
    pub fn rewrite(&self, instruction: &str, content: &str) -> AppResult<BuiltPrompt> {
        self.render(
            ASKAI_REWRITE,
            vars(&[("instruction", instruction), ("content", content)]),
        )
    }

    /// Answer `question` using retrieved trends as context; falls back to
    /// the context-free prompt when `trends` is empty.
    pub fn answer(
        &self,
        question: &str,
        content: &str,
        trends: &[TrendRecord],
    ) -> AppResult<BuiltPrompt> {
        if trends.is_empty() {
            return self.render(
                ASKAI_FALLBACK,
                vars(&[("question", question), ("content", content)]),
            );
        }

        let context = trend_context(trends);
        self.render_with_trends(
            ASKAI_TRENDS,
            vars(&[
                ("trends", context.as_str()),
                ("question", question),
                ("content", content),
            ]),
            trends.len(),
        )
    }
}

/// One `- <trend> (Tweet Count: <count>)` line per record.
pub fn trend_context(trends: &[TrendRecord]) -> String {
    trends
        .iter()
        .map(|t| format!("- {} (Tweet Count: {})", t.text, t.count))
        .collect::<Vec<_>>()
        .join("\n")
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
