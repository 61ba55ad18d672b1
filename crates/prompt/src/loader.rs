//! Prompt loader for built-in and override YAML definitions.

use crate::types::PromptDefinition;
use std::path::Path;
use trendcast_core::{AppError, AppResult};

/// Prompt ids the service renders.
pub const HASHTAGS_GENERATE: &str = "hashtags.generate";
pub const CONTENT_GENERATE: &str = "content.generate";
pub const ASKAI_TRENDS: &str = "askai.trends";
pub const ASKAI_FALLBACK: &str = "askai.fallback";
pub const ASKAI_REWRITE: &str = "askai.rewrite";

/// Built-in definitions compiled into the binary, keyed by file name.
const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        "hashtags.generate.yml",
        include_str!("../prompts/hashtags.generate.yml"),
    ),
    (
        "content.generate.yml",
        include_str!("../prompts/content.generate.yml"),
    ),
    (
        "askai.trends.yml",
        include_str!("../prompts/askai.trends.yml"),
    ),
    (
        "askai.fallback.yml",
        include_str!("../prompts/askai.fallback.yml"),
    ),
    (
        "askai.rewrite.yml",
        include_str!("../prompts/askai.rewrite.yml"),
    ),
];

/// Parse and validate every built-in definition.
pub fn builtin_prompts() -> AppResult<Vec<PromptDefinition>> {
    BUILTIN_PROMPTS
        .iter()
        .map(|(name, contents)| parse_prompt(name, contents))
        .collect()
}

/// Load a prompt definition from a `<id>.yml` file.
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let definition = parse_prompt(&path.display().to_string(), &contents)?;

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if stem != definition.id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}'; the file must be named '{}.yml'",
            path, definition.id, definition.id
        )));
    }

    Ok(definition)
}

/// List all `.yml` prompt files directly inside `prompts_dir`.
pub fn list_prompt_files(prompts_dir: &Path) -> AppResult<Vec<std::path::PathBuf>> {
    if !prompts_dir.exists() {
        return Err(AppError::Config(format!(
            "Prompts directory does not exist: {:?}",
            prompts_dir
        )));
    }

    let mut files: Vec<_> = walkdir::WalkDir::new(prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml"))
        .collect();
    files.sort();

    Ok(files)
}

fn parse_prompt(source: &str, contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", source, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' has an empty template",
            def.id
        )));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if let Some(missing) = def
        .variables
        .iter()
        .find(|var| !def.template.contains(&format!("{{{{{}}}}}", var)))
    {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' declares variable '{}' but its template never uses it",
            def.id, missing
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file_stem: &str, id: &str, valid: bool) -> PathBuf {
        let content = if valid {
            format!(
                r#"
id: {}
title: "Test Prompt"
apiVersion: "1.0"
variables: [topic]
template: "Test template: {{{{topic}}}}"
"#,
                id
            )
        } else {
            "invalid: yaml: content:".to_string()
        };

        let file_path = dir.join(format!("{}.yml", file_stem));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_builtins_parse() {
        let prompts = builtin_prompts().unwrap();
        let ids: Vec<&str> = prompts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                HASHTAGS_GENERATE,
                CONTENT_GENERATE,
                ASKAI_TRENDS,
                ASKAI_FALLBACK,
                ASKAI_REWRITE
            ]
        );
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(temp_dir.path(), "test.prompt", "test.prompt", true);

        let prompt = load_prompt_file(&path).unwrap();
        assert_eq!(prompt.id, "test.prompt");
        assert_eq!(prompt.title, "Test Prompt");
    }

    #[test]
    fn test_file_name_must_match_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(temp_dir.path(), "other", "test.prompt", true);
        assert!(load_prompt_file(&path).is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(temp_dir.path(), "invalid", "invalid", false);

        let result = load_prompt_file(&path);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_unused_variable_rejected() {
        let yaml = r#"
id: x.y
title: X
apiVersion: "1.0"
variables: [topic, question]
template: "{{topic}}"
"#;
        assert!(parse_prompt("inline", yaml).is_err());
    }

    #[test]
    fn test_list_prompt_files() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "prompt1", "prompt1", true);
        write_prompt(temp_dir.path(), "prompt2", "prompt2", true);
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let files = list_prompt_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("prompt1.yml"));
    }

    #[test]
    fn test_missing_prompts_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_prompt_files(&temp_dir.path().join("nope")).is_err());
    }
}
