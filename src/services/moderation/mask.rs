/// Words masked on public share cards
pub const SENSITIVE_WORDS: &[&str] = &[
    "エロ", "セックス", "ポルノ", "死ね", "殺す", "バカ", "アホ", "クズ", "ゴミ",
    "うざい", "きもい", "ブス", "デブ", "最悪",
];

const MASK: char = '●';

fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 2 {
        return MASK.to_string().repeat(chars.len());
    }
    let mut masked = String::with_capacity(word.len());
    masked.push(chars[0]);
    masked.extend(std::iter::repeat(MASK).take(chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked
}

/// Replace every occurrence of a sensitive word with its masked form
pub fn mask_sensitive(content: &str) -> String {
    SENSITIVE_WORDS.iter().fold(content.to_string(), |acc, word| {
        if acc.contains(word) {
            acc.replace(word, &mask_word(word))
        } else {
            acc
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_char_words_are_fully_masked() {
        assert_eq!(mask_sensitive("お前はバカだ"), "お前は●●だ");
    }

    #[test]
    fn longer_words_keep_first_and_last() {
        assert_eq!(mask_sensitive("セックス"), "セ●●ス");
        assert_eq!(mask_sensitive("うざいうざい"), "う●いう●い");
    }

    #[test]
    fn clean_text_is_untouched() {
        assert_eq!(mask_sensitive("好きな食べ物は？"), "好きな食べ物は？");
    }
}
