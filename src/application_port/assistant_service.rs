use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillsetInput {
    pub industry: String,
    pub role: String,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizInput {
    pub industry: String,
    pub role: String,
    pub level: String,
    pub skillset: Value,
    pub learning_path: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    // Alias matches the key the quiz generator asks the model for, so a
    // client can echo the generated quiz back unchanged.
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationInput {
    #[serde(alias = "userAnswers")]
    pub user_answers: Vec<Option<String>>,
    pub quiz: Vec<QuizItem>,
    #[serde(alias = "learningPath")]
    pub learning_path: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionFeedback {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizEvaluation {
    pub total_questions: usize,
    pub score: String,
    pub feedback: Vec<QuestionFeedback>,
    pub swot_analysis: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsInput {
    pub industry: String,
    pub role: String,
    pub level: String,
    pub subscription: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningPathInput {
    pub score: String,
    pub industry: String,
    pub role: String,
    pub swot_analysis: Value,
    pub platforms: Value,
    pub skill_level: String,
    pub time_available_per_week: u32,
    pub duration_in_weeks: u32,
}

/// Prompt-engineered pass-through to the completion endpoint. Stateless:
/// every operation builds a prompt, sends it, and parses the JSON the model
/// returns. Quiz evaluation additionally scores answers locally.
#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    async fn industries(&self) -> Result<Value, AssistantError>;

    async fn job_roles(&self, industry: &str) -> Result<Value, AssistantError>;

    async fn skillset(&self, input: &SkillsetInput) -> Result<Value, AssistantError>;

    async fn quiz(&self, input: &QuizInput, advanced: bool) -> Result<Value, AssistantError>;

    async fn evaluate_quiz(
        &self,
        input: EvaluationInput,
        advanced: bool,
    ) -> Result<QuizEvaluation, AssistantError>;

    async fn platforms(&self, input: &PlatformsInput) -> Result<Value, AssistantError>;

    async fn learning_path(&self, input: &LearningPathInput) -> Result<Value, AssistantError>;
}
