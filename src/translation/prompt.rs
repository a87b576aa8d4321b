/// Literal the model returns when a message needs no translation.
pub const SKIP_TOKEN: &str = "INPUT_SKIP";

/// System instruction sent with every request.
///
/// `{skip_token}` is substituted by [`build_system_instruction`], so the
/// worked examples always show the same literal the response parser checks for.
pub const SYSTEM_INSTRUCTION_TEMPLATE: &str = "You translate messages from a multiplayer game chat into English.\n\
\n\
Rules:\n\
1. If the message is already in English, reply with exactly {skip_token} and nothing else.\n\
2. Otherwise reply with the English translation followed by a space and the lowercase \
ISO 639-1 code of the source language in square brackets: <translation> [<code>]. \
Do not add notes, quotes, explanations or alternatives.\n\
3. Typos, slang, abbreviations or broken grammar in an English message still count as English. \
Reply with {skip_token}; never correct the message.\n\
\n\
Examples:\n\
Input: Bonjour tout le monde\n\
Output: Hello everyone [fr]\n\
Input: wie geht es dir\n\
Output: how are you [de]\n\
Input: Hello there\n\
Output: {skip_token}\n\
Input: u guys want to atack now?\n\
Output: {skip_token}";

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_instruction(skip_token: &str) -> String {
    // {skip_token} is a placeholder for string replacement, not a format argument
    SYSTEM_INSTRUCTION_TEMPLATE.replace("{skip_token}", skip_token)
}

/// The instruction for the default [`SKIP_TOKEN`].
pub fn system_instruction() -> String {
    build_system_instruction(SKIP_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_uses_active_skip_token() {
        let instruction = system_instruction();
        assert!(instruction.contains(SKIP_TOKEN));
        assert!(!instruction.contains("{skip_token}"));
    }

    #[test]
    fn test_every_english_example_outputs_the_token() {
        let instruction = build_system_instruction("NO_TRANSLATION");
        let lines: Vec<&str> = instruction.lines().collect();

        for pair in lines.windows(2) {
            if pair[0] == "Input: Hello there" || pair[0].starts_with("Input: u guys") {
                assert_eq!(pair[1], "Output: NO_TRANSLATION");
            }
        }
        assert!(!instruction.contains(SKIP_TOKEN));
    }

    #[test]
    fn test_no_stray_sentinel_literals() {
        let instruction = system_instruction();
        let stray = instruction
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|word| word.ends_with("_SKIP"))
            .any(|word| word != SKIP_TOKEN);
        assert!(!stray);
    }

    #[test]
    fn test_instruction_has_positive_and_negative_examples() {
        let instruction = system_instruction();
        assert!(instruction.contains("Output: Hello everyone [fr]"));
        assert!(instruction.contains(&format!("Output: {SKIP_TOKEN}")));
        assert!(instruction.contains("ISO 639-1"));
    }
}
