//! Forum commands.

use campus_market::services::forum::Inquiry;
use campus_market_core::{QuestionId, QuestionStatus};

use super::{CliError, Context};

/// Submit a question. No login needed.
///
/// # Errors
///
/// Returns `MarketError::InvalidInput` for missing fields or a bad email.
pub async fn ask(
    ctx: &Context,
    name: String,
    email: String,
    question: String,
    category: String,
) -> Result<(), CliError> {
    let question = ctx
        .state
        .forum()
        .ask(Inquiry {
            name,
            email,
            question,
            category,
        })
        .await?;
    tracing::info!("Question {} submitted. An admin will answer soon", question.id);
    Ok(())
}

/// List questions.
///
/// # Errors
///
/// Returns a storage error.
pub async fn list(ctx: &Context, status: Option<QuestionStatus>) -> Result<(), CliError> {
    let questions = ctx.state.forum().list(status).await?;
    if questions.is_empty() {
        tracing::info!("No questions");
    }
    for question in &questions {
        tracing::info!(
            "[{}] ({}) {} asked: {}",
            question.id,
            question.category,
            question.name,
            question.question
        );
        if let Some(answer) = &question.answer {
            tracing::info!("    Answer: {answer}");
        }
    }
    Ok(())
}

/// Answer a question.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins or
/// `MarketError::InvalidTransition` if it was already answered.
pub async fn answer(ctx: &Context, id: &str, text: &str) -> Result<(), CliError> {
    let question = ctx
        .state
        .forum()
        .answer(ctx.user()?, &QuestionId::new(id), text)
        .await?;
    tracing::info!("Answered question {}", question.id);
    Ok(())
}
