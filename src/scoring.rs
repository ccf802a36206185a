use std::fmt;

/// Characters per "word" in the standard typing convention
pub const CHARS_PER_WORD: f64 = 5.0;

/// The paragraph a test is typed against. Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetText {
    chars: Vec<char>,
}

impl TargetText {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            chars: text.as_ref().chars().collect(),
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl fmt::Display for TargetText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterStatus {
    Untouched,
    Correct,
    Incorrect,
}

/// Result of comparing typed input against the target text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub statuses: Vec<CharacterStatus>,
    pub errors: usize,
    pub wpm: u32,
    pub accuracy: u32,
}

/// Status of every target position. Input past the end of the target is ignored.
pub fn character_statuses(target: &[char], input: &[char]) -> Vec<CharacterStatus> {
    target
        .iter()
        .enumerate()
        .map(|(idx, expected)| match input.get(idx) {
            None => CharacterStatus::Untouched,
            Some(typed) if typed == expected => CharacterStatus::Correct,
            Some(_) => CharacterStatus::Incorrect,
        })
        .collect()
}

/// Raw-character WPM: typed length / 5 per elapsed minute, rounded.
pub fn wpm(typed_len: usize, elapsed_secs: f64) -> u32 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    ((typed_len as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Share of typed characters that match the target, as a whole percentage
pub fn accuracy(typed_len: usize, errors: usize) -> u32 {
    if typed_len == 0 {
        return 100;
    }
    let correct = typed_len.saturating_sub(errors) as f64;
    (100.0 * correct / typed_len as f64).round().clamp(0.0, 100.0) as u32
}

pub fn evaluate(target: &TargetText, input: &[char], elapsed_secs: f64) -> Evaluation {
    let statuses = character_statuses(target.chars(), input);
    let errors = statuses
        .iter()
        .filter(|s| **s == CharacterStatus::Incorrect)
        .count();

    Evaluation {
        statuses,
        errors,
        wpm: wpm(input.len(), elapsed_secs),
        accuracy: accuracy(input.len(), errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_evaluate_one_substitution_over_a_minute() {
        let eval = evaluate(&TargetText::new("abcde"), &chars("abXde"), 60.0);

        assert_eq!(
            eval.statuses,
            vec![
                CharacterStatus::Correct,
                CharacterStatus::Correct,
                CharacterStatus::Incorrect,
                CharacterStatus::Correct,
                CharacterStatus::Correct,
            ]
        );
        assert_eq!(eval.errors, 1);
        assert_eq!(eval.accuracy, 80);
        assert_eq!(eval.wpm, 1);
    }

    #[test]
    fn test_evaluate_empty_input() {
        let eval = evaluate(&TargetText::new("hello"), &[], 42.0);

        assert_eq!(eval.errors, 0);
        assert_eq!(eval.accuracy, 100);
        assert_eq!(eval.wpm, 0);
        assert!(eval
            .statuses
            .iter()
            .all(|s| *s == CharacterStatus::Untouched));
    }

    #[test]
    fn test_evaluate_zero_elapsed_has_no_wpm() {
        let eval = evaluate(&TargetText::new("hello"), &chars("hello"), 0.0);

        assert_eq!(eval.wpm, 0);
        assert_eq!(eval.accuracy, 100);
    }

    #[test]
    fn test_partial_input_leaves_tail_untouched() {
        let statuses = character_statuses(&chars("test"), &chars("tx"));

        assert_eq!(
            statuses,
            vec![
                CharacterStatus::Correct,
                CharacterStatus::Incorrect,
                CharacterStatus::Untouched,
                CharacterStatus::Untouched,
            ]
        );
    }

    #[test]
    fn test_input_past_target_is_ignored_for_errors() {
        let eval = evaluate(&TargetText::new("hi"), &chars("hixyz"), 60.0);

        assert_eq!(eval.statuses.len(), 2);
        assert_eq!(eval.errors, 0);
        // the overflow still counts as typed
        assert_eq!(eval.wpm, 1);
        assert_eq!(eval.accuracy, 100);
    }

    #[test]
    fn test_empty_target_is_valid() {
        let eval = evaluate(&TargetText::default(), &[], 10.0);

        assert!(eval.statuses.is_empty());
        assert_eq!(eval.errors, 0);
        assert_eq!(eval.accuracy, 100);
        assert_eq!(eval.wpm, 0);
    }

    #[test]
    fn test_wpm_rounds_to_nearest() {
        // 23 chars in 30s = 4.6 words / 0.5 min = 9.2
        assert_eq!(wpm(23, 30.0), 9);
        // 27 chars in 30s = 10.8
        assert_eq!(wpm(27, 30.0), 11);
        assert_eq!(wpm(10, -1.0), 0);
        assert_eq!(wpm(10, f64::NAN), 0);
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(3, 1), 67);
        assert_eq!(accuracy(3, 3), 0);
        assert_eq!(accuracy(0, 0), 100);
    }

    #[test]
    fn test_target_text_display_roundtrips_unicode() {
        let text = TargetText::new("naïve café");
        assert_eq!(text.len(), 10);
        assert_eq!(text.to_string(), "naïve café");
    }

    proptest! {
        #[test]
        fn prop_errors_count_mismatches(target in "[a-c ]{0,40}", input in "[a-c ]{0,40}", secs in 0.0f64..600.0) {
            let target_chars = chars(&target);
            let input_chars: Vec<char> = chars(&input).into_iter().take(target_chars.len()).collect();
            let expected = target_chars
                .iter()
                .zip(input_chars.iter())
                .filter(|(t, i)| t != i)
                .count();

            let eval = evaluate(&TargetText::new(&target), &input_chars, secs);
            prop_assert_eq!(eval.errors, expected);
        }

        #[test]
        fn prop_metrics_stay_in_range(target in ".{0,30}", input in ".{0,60}", secs in -10.0f64..600.0) {
            let eval = evaluate(&TargetText::new(&target), &chars(&input), secs);
            prop_assert!(eval.accuracy <= 100);
            prop_assert!(eval.errors <= eval.statuses.len());
        }

        #[test]
        fn prop_zero_elapsed_means_zero_wpm(target in ".{0,30}", input in ".{0,30}") {
            prop_assert_eq!(evaluate(&TargetText::new(&target), &chars(&input), 0.0).wpm, 0);
        }
    }
}
