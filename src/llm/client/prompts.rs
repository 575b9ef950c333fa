//! Prompts for patent review.

/// System instruction sent with every review request.
pub const SYSTEM_PROMPT: &str =
    "你是一个专业的专利审查员，请仔细分析提供的专利文本，识别其中可能存在的问题并提供修改建议。";

/// Review requirements used when the caller does not supply any.
///
/// Asks for each issue to quote the passage verbatim and follow it with
/// labelled lines, which is the shape the structured extractor reads.
pub const DEFAULT_REVIEW_PROMPT: &str = r#"请逐条指出文本中存在的问题。每个问题按以下格式输出，问题之间空一行：
"原文中存在问题的片段（逐字引用）"
问题：问题描述
建议：修改建议"#;

/// Build the user message embedding the document and the review requirements.
pub fn user_message(text: &str, review_prompt: &str) -> String {
    format!(
        "请分析以下专利文本：\n\n{}\n\n分析要求：{}",
        text, review_prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_layout() {
        assert_eq!(
            user_message("一种装置。", "检查术语"),
            "请分析以下专利文本：\n\n一种装置。\n\n分析要求：检查术语"
        );
    }
}
