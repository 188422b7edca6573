use thiserror::Error;

/// Top-level error type for the morejpeg bot.
///
/// Each variant is an outcome a degrade request can end in; the handler turns
/// them into chat replies via [`BotError::user_message`].
#[derive(Debug, Error)]
pub enum BotError {
    #[error("no cached image could be degraded any further")]
    QualityExhausted,

    #[error("nothing cached for this chat")]
    EmptyCache,

    #[error("unsupported content: {0}")]
    UnsupportedContent(String),

    #[error("image pipeline failed: {0}")]
    PipelineFailure(String),
}

pub const EXHAUSTED_REPLY: &str = "There are no images that need more JPEG.";
pub const EMPTY_CACHE_REPLY: &str = "Nothing to degrade. Share an image or an image link first.";
pub const PIPELINE_FAILURE_REPLY: &str = "Something went wrong while processing the image.";

impl BotError {
    /// Text to send back to the chat, if this outcome is user-visible.
    ///
    /// Unsupported content is silent.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            BotError::QualityExhausted => Some(EXHAUSTED_REPLY),
            BotError::EmptyCache => Some(EMPTY_CACHE_REPLY),
            BotError::PipelineFailure(_) => Some(PIPELINE_FAILURE_REPLY),
            BotError::UnsupportedContent(_) => None,
        }
    }

    /// Whether this outcome wipes the chat's cache.
    pub fn clears_cache(&self) -> bool {
        matches!(self, BotError::QualityExhausted | BotError::EmptyCache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_errors_clear_cache() {
        assert!(BotError::QualityExhausted.clears_cache());
        assert!(BotError::EmptyCache.clears_cache());
        assert!(!BotError::PipelineFailure("decode".into()).clears_cache());
        assert!(!BotError::UnsupportedContent("text/html".into()).clears_cache());
    }

    #[test]
    fn unsupported_content_is_silent() {
        assert!(BotError::UnsupportedContent("gif".into()).user_message().is_none());
        assert_eq!(BotError::EmptyCache.user_message(), Some(EMPTY_CACHE_REPLY));
    }
}
