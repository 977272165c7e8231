//! Centralized prompt definitions for solving strategies
//!
//! This module contains every fixed message the solvers send to the model.
//! Centralizing prompts makes them easier to maintain, test, and version.

/// Priming continuation for zero-shot chain-of-thought.
pub const ZERO_SHOT_PRIMING: &str = "Let's think step by step.";

/// Priming continuation for plan-and-solve prompting.
pub const PLAN_AND_SOLVE_PRIMING: &str = "Let's first understand the problem, extract relevant variables and their corresponding numerals, \
and **devise a plan**. Then, let's **carry out the plan**, calculate intermediate results \
(pay attention to calculation and common sense), solve the problem step by step, and show the answer.";

/// System instruction installed once for the give-a-list strategy.
pub const GIVE_A_LIST_SYSTEM_PROMPT: &str = "You should give a list of steps to solve the problem, from 1 to N steps. \
Each step should start with a number and a dot, like '1. '. \
The steps should be as detailed as possible, and each step should be a complete sentence. \
The last step should be the answer.";

/// Priming continuation for the give-a-list strategy.
pub const GIVE_A_LIST_PRIMING: &str = "1. ";

/// Follow-up asking for a single real number.
pub const NUMERICAL_FOLLOW_UP: &str = "Therefore the answer is? \
Output only a real number (e.g., 3.14). Do not use fractional form (like 1/2 or 3/4). \
Do not show an equation like 1 + 1 = 2. In this case, output 2 only. \
If your answer is a repeating decimal, round it to six decimal places.";

/// Follow-up asking for one option letter, given the rendered option lines.
pub fn multichoice_follow_up<'a>(options: impl ExactSizeIterator<Item = (&'a str, &'a str)>) -> String {
    let count = options.len();
    let lines: Vec<String> = options
        .map(|(letter, text)| format!("{}: {}", letter, text))
        .collect();

    format!(
        "Here are {} options for the answer:\n{}\n\
Please choose and output one of the upper letter of the options, e.g. A. \
If you think none of them is correct, just output the most likely letter. \
Do not output anything beside the letter like A. \
Please do not use bold formatting in your output.",
        count,
        lines.join("\n")
    )
}

/// Follow-up asking for exactly one of two labels.
pub fn boolean_follow_up(true_text: &str, false_text: &str) -> String {
    format!(
        "Therefore the answer is? Output only \"{}\" or \"{}\". \
Do not output anything else, and do not use bold formatting in your output.",
        true_text, false_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_shot_priming_is_exact() {
        assert_eq!(ZERO_SHOT_PRIMING, "Let's think step by step.");
    }

    #[test]
    fn test_plan_and_solve_mentions_plan_phases() {
        assert!(PLAN_AND_SOLVE_PRIMING.contains("extract relevant variables"));
        assert!(PLAN_AND_SOLVE_PRIMING.contains("devise a plan"));
        assert!(PLAN_AND_SOLVE_PRIMING.contains("carry out the plan"));
    }

    #[test]
    fn test_give_a_list_prompts() {
        assert_eq!(GIVE_A_LIST_PRIMING, "1. ");
        assert!(GIVE_A_LIST_SYSTEM_PROMPT.contains("The last step should be the answer."));
    }

    #[test]
    fn test_numerical_follow_up_constraints() {
        assert!(NUMERICAL_FOLLOW_UP.contains("real number"));
        assert!(NUMERICAL_FOLLOW_UP.contains("fractional form"));
        assert!(NUMERICAL_FOLLOW_UP.contains("six decimal places"));
    }

    #[test]
    fn test_multichoice_follow_up_lists_options_in_order() {
        let options = [("A", "Paris"), ("B", "London"), ("C", "Rome")];
        let prompt = multichoice_follow_up(options.iter().copied());

        assert!(prompt.starts_with("Here are 3 options for the answer:\nA: Paris\nB: London\nC: Rome\n"));
        assert!(prompt.contains("most likely letter"));
        assert!(prompt.contains("bold formatting"));
    }

    #[test]
    fn test_boolean_follow_up_names_both_labels() {
        let prompt = boolean_follow_up("Yes", "No");
        assert!(prompt.contains("\"Yes\" or \"No\""));
    }
}
