//! Prompt templates for document summarization

/// System prompt fixing the summary length, concept count and JSON shape.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You are an expert summarizer and knowledge extractor. Your task is to:
1. Create a concise summary (3-5 sentences) of the key points in the document
2. Extract 3-7 key concepts/ideas from the document
3. Format your response in JSON with two fields: 'summary' and 'key_concepts' (an array)

Focus on the most important and unique ideas in the text. Ignore routine or boilerplate content."#;

/// Generate the user prompt asking for a summary of `content`
///
/// # Example
/// ```
/// use mtexts::llm::prompts::summary_prompt;
///
/// let prompt = summary_prompt("Quarterly revenue grew 12%.");
/// assert!(prompt.ends_with("Quarterly revenue grew 12%."));
/// ```
pub fn summary_prompt(content: &str) -> String {
    format!("Please summarize this document and extract its key concepts:\n\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_both_fields() {
        assert!(SUMMARY_SYSTEM_PROMPT.contains("'summary'"));
        assert!(SUMMARY_SYSTEM_PROMPT.contains("'key_concepts'"));
    }

    #[test]
    fn test_summary_prompt_embeds_content() {
        let prompt = summary_prompt("body text");
        assert!(prompt.starts_with("Please summarize this document"));
        assert!(prompt.contains("\n\nbody text"));
    }
}
