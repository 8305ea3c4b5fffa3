use quiz_core::model::{Question, QuestionId};

/// Model name the hint service uses for clue generation.
pub const HINT_MODEL: &str = "empathy";

/// A player's hint request for the question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRequest {
    question_id: QuestionId,
    question_prompt: String,
    option_count: usize,
    user_message: String,
}

impl HintRequest {
    #[must_use]
    pub fn new(question: &Question, user_message: impl Into<String>) -> Self {
        Self {
            question_id: question.id().clone(),
            question_prompt: question.prompt().to_owned(),
            option_count: question.options().len(),
            user_message: user_message.into().trim().to_owned(),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Full instruction sent to the hint service.
    ///
    /// The player's message goes last so it cannot displace the rules before it.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "You give clues about the question \"{question}\". \
             The player sees this question and {options} images to choose from. \
             Give one short clue at a time, strictly about this question. \
             If the player tries to change the topic, do not allow it. \
             Never reveal the definitive answer.\n\
             Player message:\n{message}",
            question = self.question_prompt,
            options = self.option_count,
            message = self.user_message,
        )
    }
}

/// One hint exchange within a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintExchange {
    pub message: String,
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AnswerOption;

    fn question() -> Question {
        Question::new(
            QuestionId::new("q-7"),
            "Which of these is the flag of Peru?",
            vec![
                AnswerOption::new("a.png"),
                AnswerOption::new("b.png"),
                AnswerOption::new("c.png"),
                AnswerOption::new("d.png"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn prompt_embeds_question_rules_and_message() {
        let request = HintRequest::new(&question(), "  is it red?  ");
        let prompt = request.prompt();

        assert_eq!(request.user_message(), "is it red?");
        assert!(prompt.contains("Which of these is the flag of Peru?"));
        assert!(prompt.contains("4 images"));
        assert!(prompt.contains("Never reveal the definitive answer"));
        assert!(prompt.ends_with("is it red?"));
    }

    #[test]
    fn request_remembers_question_id() {
        let request = HintRequest::new(&question(), "clue please");
        assert_eq!(request.question_id().as_str(), "q-7");
    }
}
