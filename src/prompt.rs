//! Generation options and prompt rendering

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Task counts offered to the user
pub const TASK_COUNT_CHOICES: [u32; 3] = [5, 10, 15];

/// Number of tasks to request, restricted to [`TASK_COUNT_CHOICES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCount(u32);

impl TaskCount {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for TaskCount {
    fn default() -> Self {
        Self(TASK_COUNT_CHOICES[0])
    }
}

impl TryFrom<u32> for TaskCount {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        if TASK_COUNT_CHOICES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Validation {
                reason: format!(
                    "task_count must be one of {:?}, got {}",
                    TASK_COUNT_CHOICES, value
                ),
            })
        }
    }
}

/// Kind of question or activity the model may produce.
///
/// Declaration order is the order types are listed in the prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    Theoretical,
    Practical,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Theoretical => "theoretical",
            QuestionType::Practical => "practical",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options for one generation request.
///
/// Always holds at least one question type; see [`GenerationOptions::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    task_count: TaskCount,
    question_types: BTreeSet<QuestionType>,
    include_answers: bool,
}

impl GenerationOptions {
    /// Build options, rejecting an empty question type selection
    pub fn new<I>(task_count: TaskCount, question_types: I, include_answers: bool) -> Result<Self>
    where
        I: IntoIterator<Item = QuestionType>,
    {
        let question_types: BTreeSet<_> = question_types.into_iter().collect();
        if question_types.is_empty() {
            return Err(Error::Validation {
                reason: "Select at least one question type".to_string(),
            });
        }

        Ok(Self {
            task_count,
            question_types,
            include_answers,
        })
    }

    pub fn task_count(&self) -> TaskCount {
        self.task_count
    }

    pub fn question_types(&self) -> impl Iterator<Item = QuestionType> + '_ {
        self.question_types.iter().copied()
    }

    pub fn include_answers(&self) -> bool {
        self.include_answers
    }
}

pub(crate) const INCLUDE_ANSWERS_CLAUSE: &str =
    "After each question or activity, include its correct answer or a model solution.";
pub(crate) const EXCLUDE_ANSWERS_CLAUSE: &str =
    "Do not include answers or solutions; list only the questions and activities.";

/// Join labels as "a", "a and b", "a, b and c"
fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Render the instruction sent to the model.
///
/// The document text is appended verbatim after the instructions.
pub fn build_prompt(text: &str, options: &GenerationOptions) -> String {
    let labels: Vec<&str> = options.question_types().map(QuestionType::label).collect();
    let answers_clause = if options.include_answers() {
        INCLUDE_ANSWERS_CLAUSE
    } else {
        EXCLUDE_ANSWERS_CLAUSE
    };

    format!(
        "You are an expert in secondary education. Below is the content of a didactic unit on a specific topic.\n\
         Using this content, create a set of {count} comprehension questions, activities and tasks for students.\n\
         Only create questions of the following types: {types}.\n\
         The tasks must suit secondary school students, be based on the information in the text, and help students learn effectively.\n\
         {answers}\n\
         \n\
         Didactic unit text:\n\
         {text}\n\
         \n\
         Tasks and questions:\n",
        count = options.task_count().get(),
        types = join_labels(&labels),
        answers = answers_clause,
        text = text,
    )
}
