use serde::{Deserialize, Serialize};

/// Expected output format of a problem's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerShape {
    Numeric,
    MultipleChoice,
    Boolean,
}

/// Letter-keyed answer options, kept in original option order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChoiceOptions(Vec<(String, String)>);

impl ChoiceOptions {
    /// Label raw option texts `A`, `B`, `C`, ... in order.
    ///
    /// A leading `X)` or `X(` that repeats the option's own letter is removed
    /// (with any whitespace after it). Other prefixes are left intact.
    /// Returns `None` when there are more options than letters.
    pub fn from_raw<I, S>(raw: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .enumerate()
            .map(|(index, option)| {
                let offset = u8::try_from(index).ok().filter(|i| *i < 26)?;
                let letter = char::from(b'A' + offset);
                Some((letter.to_string(), strip_own_letter(option.as_ref(), letter)))
            })
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Iterate `(letter, text)` pairs in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(letter, text)| (letter.as_str(), text.as_str()))
    }

    /// Text of the option labelled `letter`.
    pub fn get(&self, letter: &str) -> Option<&str> {
        self.iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(letter))
            .map(|(_, text)| text)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn strip_own_letter(option: &str, letter: char) -> String {
    let close = format!("{})", letter);
    let open = format!("{}(", letter);

    let mut rest = option;
    while let Some(stripped) = strip_either(rest, &close, &open) {
        rest = stripped;
    }
    if rest.len() != option.len() {
        rest = rest.trim_start();
    }
    rest.to_string()
}

fn strip_either<'a>(text: &'a str, first: &str, second: &str) -> Option<&'a str> {
    text.strip_prefix(first)
        .or_else(|| text.strip_prefix(second))
}

/// Variant-specific data of a problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProblemKind {
    Numeric,
    MultipleChoice(ChoiceOptions),
    Boolean { true_text: String, false_text: String },
}

impl ProblemKind {
    pub fn shape(&self) -> AnswerShape {
        match self {
            ProblemKind::Numeric => AnswerShape::Numeric,
            ProblemKind::MultipleChoice(_) => AnswerShape::MultipleChoice,
            ProblemKind::Boolean { .. } => AnswerShape::Boolean,
        }
    }
}

/// A labeled question.
///
/// The statement never includes the answer options; those travel in
/// [`ProblemKind::MultipleChoice`] and are shown to the model separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub statement: String,
    pub answer: String,
    pub kind: ProblemKind,
}

impl Problem {
    pub fn numeric(statement: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            answer: answer.into(),
            kind: ProblemKind::Numeric,
        }
    }

    pub fn multiple_choice(
        statement: impl Into<String>,
        answer: impl Into<String>,
        options: ChoiceOptions,
    ) -> Self {
        Self {
            statement: statement.into(),
            answer: answer.into(),
            kind: ProblemKind::MultipleChoice(options),
        }
    }

    /// Boolean problem whose ground truth is rendered as one of the two labels.
    pub fn boolean(
        statement: impl Into<String>,
        answer: bool,
        true_text: impl Into<String>,
        false_text: impl Into<String>,
    ) -> Self {
        let true_text = true_text.into();
        let false_text = false_text.into();
        Self {
            statement: statement.into(),
            answer: if answer {
                true_text.clone()
            } else {
                false_text.clone()
            },
            kind: ProblemKind::Boolean {
                true_text,
                false_text,
            },
        }
    }

    pub fn shape(&self) -> AnswerShape {
        self.kind.shape()
    }
}
