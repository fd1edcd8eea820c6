use crate::application_port::*;
use crate::domain_port::CompletionClient;
use serde_json::Value;
use std::sync::Arc;

/// How many items each generated collection is asked to hold.
#[derive(Debug, Clone)]
pub struct AssistantLimits {
    pub industries: u8,
    pub roles: u8,
    pub skills: u8,
    pub quiz_questions: u8,
    pub platforms: u8,
}

impl Default for AssistantLimits {
    fn default() -> Self {
        Self {
            industries: 10,
            roles: 5,
            skills: 10,
            quiz_questions: 10,
            platforms: 5,
        }
    }
}

pub struct RealAssistantService {
    completion: Arc<dyn CompletionClient>,
    limits: AssistantLimits,
}

impl RealAssistantService {
    pub fn new(completion: Arc<dyn CompletionClient>, limits: AssistantLimits) -> Self {
        Self { completion, limits }
    }

    async fn complete_json(&self, prompt: &str, max_tokens: u32) -> Result<Value, AssistantError> {
        let raw = self.completion.complete(prompt, max_tokens).await?;
        parse_model_json(&raw)
    }
}

/// Models wrap JSON answers in markdown fences more often than not.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_model_json(content: &str) -> Result<Value, AssistantError> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(cleaned)
        .map_err(|e| AssistantError::MalformedResponse(format!("{}: {:.120}", e, cleaned)))
}

#[async_trait::async_trait]
impl AssistantService for RealAssistantService {
    async fn industries(&self) -> Result<Value, AssistantError> {
        let prompt = format!(
            "Generate a JSON array of {} industries relevant for skill assessment and upskilling. \
             Ensure the industries span diverse sectors like technology, healthcare, finance, \
             education, and retail. Respond with the JSON array only, no greetings or commentary.",
            self.limits.industries
        );
        self.complete_json(&prompt, 300).await
    }

    async fn job_roles(&self, industry: &str) -> Result<Value, AssistantError> {
        let prompt = format!(
            "Generate a JSON array of {} high-demand job roles in the {} sector, each with its \
             career levels, as objects of the form \
             {{\"role\": \"<role>\", \"levels\": [\"<level>\", ...]}}. \
             Include only roles relevant to modern career opportunities in this field. \
             Respond with the JSON array only.",
            self.limits.roles, industry
        );
        self.complete_json(&prompt, 300).await
    }

    async fn skillset(&self, input: &SkillsetInput) -> Result<Value, AssistantError> {
        let prompt = format!(
            "Generate a JSON object with a list of {} essential skills for the role \"{}\" at the \
             \"{}\" level in the \"{}\" industry, of the form \
             {{\"skillsNeeded\": [\"<skill>\", ...]}}. \
             Include both technical and soft skills reflecting today's industry demands. \
             Respond with the JSON object only.",
            self.limits.skills, input.role, input.level, input.industry
        );
        self.complete_json(&prompt, 500).await
    }

    async fn quiz(&self, input: &QuizInput, advanced: bool) -> Result<Value, AssistantError> {
        let focus = match (&input.learning_path, advanced) {
            (Some(path), true) => format!(
                "- Learning Path: {}\n\
                 Focus the quiz on the areas highlighted in the learning path, addressing \
                 knowledge gaps and challenging understanding of real-world scenarios.\n",
                path
            ),
            _ => "Challenge understanding of real-world scenarios for this skillset.\n".to_string(),
        };
        let prompt = format!(
            "Generate a {}-question advanced-level multiple-choice quiz based on the following \
             inputs:\n\
             - Industry: {}\n- Role: {}\n- Level: {}\n- Skillset: {}\n{}\
             Return a JSON array of objects of the form \
             {{\"question\": \"...\", \"options\": [\"A. ...\", \"B. ...\", \"C. ...\", \"D. ...\"], \
             \"correctAnswer\": \"<letter>\"}} with no extra words.",
            self.limits.quiz_questions, input.industry, input.role, input.level, input.skillset,
            focus
        );
        self.complete_json(&prompt, 1500).await
    }

    async fn evaluate_quiz(
        &self,
        input: EvaluationInput,
        advanced: bool,
    ) -> Result<QuizEvaluation, AssistantError> {
        // Scoring is deterministic and happens here; only the SWOT analysis
        // is delegated to the model.
        let mut score = 0usize;
        let feedback: Vec<QuestionFeedback> = input
            .quiz
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let user_answer = input.user_answers.get(i).cloned().flatten();
                let is_correct = user_answer.as_deref() == Some(item.correct_answer.as_str());
                if is_correct {
                    score += 1;
                }
                QuestionFeedback {
                    question: item.question.clone(),
                    options: item.options.clone(),
                    correct_answer: item.correct_answer.clone(),
                    user_answer,
                    is_correct,
                    feedback: if is_correct {
                        "Correct!".to_string()
                    } else {
                        format!("Incorrect. The correct answer is '{}'.", item.correct_answer)
                    },
                }
            })
            .collect();

        let correct: Vec<&str> = feedback
            .iter()
            .filter(|f| f.is_correct)
            .map(|f| f.question.as_str())
            .collect();
        let incorrect: Vec<&str> = feedback
            .iter()
            .filter(|f| !f.is_correct)
            .map(|f| f.question.as_str())
            .collect();

        let context = match (&input.learning_path, advanced) {
            (Some(path), true) => format!(
                "The user has been focused on the following learning path: {}. Analyze their \
                 performance in light of these learning areas.",
                path
            ),
            _ => format!(
                "User's performance:\n- Correctly answered: {}\n- Incorrectly answered: {}",
                serde_json::to_string(&correct).unwrap_or_default(),
                serde_json::to_string(&incorrect).unwrap_or_default()
            ),
        };
        let prompt = format!(
            "You are a professional quiz evaluator tasked with performing a SWOT analysis of the \
             user's quiz performance. {}\n\
             Identify strengths, weaknesses, opportunities, and threats, with actionable insights \
             to guide the user's continued learning. Respond only with a JSON object of the form \
             {{\"swotAnalysis\": {{\"strengths\": [...], \"weaknesses\": [...], \
             \"opportunities\": [...], \"threats\": [...]}}}}.",
            context
        );

        let analysis = self.complete_json(&prompt, 2000).await?;
        let swot_analysis = analysis
            .get("swotAnalysis")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({
                "strengths": [], "weaknesses": [], "opportunities": [], "threats": []
            }));

        Ok(QuizEvaluation {
            total_questions: input.quiz.len(),
            score: format!("{}/{}", score, input.quiz.len()),
            feedback,
            swot_analysis,
        })
    }

    async fn platforms(&self, input: &PlatformsInput) -> Result<Value, AssistantError> {
        let prompt = format!(
            "Recommend online learning platforms tailored to this profile:\n\
             - Industry: {}\n- Role: {}\n- Level: {}\n- Subscription preference: {}\n\
             Prioritize platforms whose courses, certifications, and hands-on practice match the \
             skills the role requires, across experience levels. Limit the list to {} platforms. \
             Respond only with a JSON array of platform names.",
            input.industry, input.role, input.level, input.subscription, self.limits.platforms
        );
        self.complete_json(&prompt, 500).await
    }

    async fn learning_path(&self, input: &LearningPathInput) -> Result<Value, AssistantError> {
        let prompt = format!(
            "Create a personalized learning path for a user with these details:\n\
             - Industry: {}\n- Role: {}\n- Quiz score: {}\n- SWOT analysis: {}\n\
             - Skill level: {}\n- Time available per week: {} hours\n- Duration: {} weeks\n\
             - Preferred platforms: {}\n\
             Provide course recommendations aligned with the SWOT's areas of improvement, each \
             with platform, duration in weeks, a completion milestone, and a weekly plan that \
             fits the available hours. Respond only with a JSON object of the form \
             {{\"learningPath\": {{\"recommendations\": [{{\"course\": \"...\", \
             \"platform\": \"...\", \"duration\": \"...\", \"milestone\": \"...\", \
             \"weeklyPlan\": [{{\"week\": 1, \"tasks\": [\"...\"]}}]}}]}}}}.",
            input.industry,
            input.role,
            input.score,
            input.swot_analysis,
            input.skill_level,
            input.time_available_per_week,
            input.duration_in_weeks,
            input.platforms
        );
        self.complete_json(&prompt, 2000).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_llm::FakeCompletionClient;

    fn service_with(responses: &[&str]) -> RealAssistantService {
        let fake = FakeCompletionClient::new();
        for r in responses {
            fake.push_response(*r);
        }
        RealAssistantService::new(Arc::new(fake), AssistantLimits::default())
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  [1,2]  "), "[1,2]");
    }

    #[test]
    fn malformed_payload_is_reported() {
        let err = parse_model_json("here you go: [1, 2]").unwrap_err();
        assert!(matches!(err, AssistantError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn industries_parses_fenced_array() {
        let service = service_with(&["```json\n[\"Technology\", \"Healthcare\"]\n```"]);
        let value = service.industries().await.unwrap();
        assert_eq!(value[0], "Technology");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn quiz_evaluation_scores_locally() {
        let service = service_with(&[r#"{"swotAnalysis": {"strengths": ["basics"],
            "weaknesses": [], "opportunities": [], "threats": []}}"#]);

        let quiz = vec![
            QuizItem {
                question: "Q1".to_string(),
                options: vec!["A. x".to_string(), "B. y".to_string()],
                correct_answer: "A".to_string(),
            },
            QuizItem {
                question: "Q2".to_string(),
                options: vec!["A. x".to_string(), "B. y".to_string()],
                correct_answer: "B".to_string(),
            },
        ];
        let evaluation = service
            .evaluate_quiz(
                EvaluationInput {
                    user_answers: vec![Some("A".to_string()), Some("A".to_string())],
                    quiz,
                    learning_path: None,
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(evaluation.score, "1/2");
        assert_eq!(evaluation.total_questions, 2);
        assert!(evaluation.feedback[0].is_correct);
        assert!(!evaluation.feedback[1].is_correct);
        assert_eq!(evaluation.swot_analysis["strengths"][0], "basics");
    }

    #[tokio::test]
    async fn missing_swot_falls_back_to_empty_shape() {
        let service = service_with(&[r#"{"unexpected": true}"#]);
        let evaluation = service
            .evaluate_quiz(
                EvaluationInput {
                    user_answers: vec![],
                    quiz: vec![],
                    learning_path: None,
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(evaluation.swot_analysis["strengths"], serde_json::json!([]));
    }
}
