use super::{ModerationResult, Severity};

/// Terms that flag content as high severity
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    // violence
    "殺す", "死ね", "暴力", "殴る", "蹴る",
    // discrimination and insults
    "差別", "バカ", "アホ", "クズ", "ゴミ",
    // personal information
    "住所", "電話番号", "メールアドレス", "パスワード",
    // spam
    "儲かる", "簡単に稼げる", "今すぐ", "クリック",
    // sexual content
    "エロ", "セックス", "ポルノ",
];

/// Terms that flag content as medium severity
pub const WARNING_KEYWORDS: &[&str] = &["うざい", "きもい", "ブス", "デブ", "最悪"];

pub const MIN_CONTENT_CHARS: usize = 5;
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Keyword and length heuristics. First matching rule wins.
pub fn check_with_keywords(content: &str) -> ModerationResult {
    let normalized = content.to_lowercase();

    if HIGH_RISK_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return ModerationResult::flagged("may contain inappropriate expressions", Severity::High, 0.8);
    }

    if WARNING_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return ModerationResult::flagged("may contain offensive expressions", Severity::Medium, 0.6);
    }

    let length = content.chars().count();
    if length < MIN_CONTENT_CHARS {
        return ModerationResult::flagged("content is too short", Severity::Low, 0.9);
    }
    if length > MAX_CONTENT_CHARS {
        return ModerationResult::flagged("content is too long", Severity::Low, 0.7);
    }

    ModerationResult::appropriate(0.9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_risk_keyword_wins_over_length() {
        let result = check_with_keywords("死ね");
        assert!(!result.is_appropriate);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.reason, "may contain inappropriate expressions");
    }

    #[test]
    fn warning_keyword_is_medium() {
        let result = check_with_keywords("この質問は最悪だと思います");
        assert!(!result.is_appropriate);
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn short_content_is_flagged_low() {
        let result = check_with_keywords("はい");
        assert!(!result.is_appropriate);
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.reason, "content is too short");
    }

    #[test]
    fn long_content_is_flagged_low() {
        let content = "あ".repeat(MAX_CONTENT_CHARS + 1);
        let result = check_with_keywords(&content);
        assert_eq!(result.reason, "content is too long");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn boundary_lengths_pass() {
        assert!(check_with_keywords("あいうえお").is_appropriate);
        assert!(check_with_keywords(&"a".repeat(MAX_CONTENT_CHARS)).is_appropriate);
    }

    #[test]
    fn clean_content_is_appropriate() {
        let result = check_with_keywords("おすすめの本を教えてください");
        assert!(result.is_appropriate);
        assert_eq!(result.severity, Severity::Low);
        assert_eq!(result.confidence, 0.9);
        assert!(result.reason.is_empty());
    }
}
