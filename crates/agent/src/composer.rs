//! Response composition: context + optional LLM, with a templated fallback.

use std::sync::Arc;

use priceowl_core::message::{ChatMessage, ChatResponse, Role};
use priceowl_core::provider::CompletionProvider;
use tracing::warn;

use crate::context::ContextAssembler;

const EMPTY_MESSAGE_REPLY: &str =
    "Напиши что-нибудь — могу помочь со скидками, поиском игр и сравнением цен! 🎮";

const OFFLINE_GREETING: &str = "👋 Привет! Я игровой AI-агент. Спроси про скидки, поиск игр или \
     сравнение цен. (AI временно недоступен — показываю сырые данные.) 🎮";

const SYSTEM_PROMPT: &str = "Ты — дружелюбный игровой AI-помощник Gaming AI Assistant. \
     Отвечай кратко, по-русски, с эмодзи там, где уместно. \
     Используй ТОЛЬКО данные из контекста ниже. Если данных нет — честно скажи. \
     ВАЖНО: Показывай игры из ВСЕХ магазинов (Steam, Gamesplanet, GameBillet, Fanatical и др.). \
     Обязательно указывай названия магазинов и цены для не-Steam игр. \
     Структурируй ответ по магазинам для удобства чтения. \
     При запросе бесплатных игр показывай 'почти бесплатные' игры (до $1) как хорошие предложения. \
     Не выдумывай данные, которых нет в контексте. \
     Не выдумывай цены и названия игр.\n\n\
     КОНТЕКСТ (актуальные данные):\n";

/// How many recent turns the provider sees.
const HISTORY_WINDOW: usize = 8;

/// Turns a conversation into a reply, stateless per call.
pub struct ResponseComposer {
    assembler: ContextAssembler,
    provider: Option<Arc<dyn CompletionProvider>>,
    max_reply_tokens: u32,
}

impl ResponseComposer {
    pub fn new(
        assembler: ContextAssembler,
        provider: Option<Arc<dyn CompletionProvider>>,
        max_reply_tokens: u32,
    ) -> Self {
        Self {
            assembler,
            provider,
            max_reply_tokens,
        }
    }

    pub fn provider_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Compose a reply to the conversation.
    ///
    /// The latest user turn drives context assembly; the provider (when
    /// configured) gets the context embedded in its system prompt. Any
    /// provider failure falls back to a templated reply built from the
    /// same context.
    pub async fn chat(&self, messages: &[ChatMessage]) -> ChatResponse {
        let user_message = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if user_message.trim().is_empty() {
            return ChatResponse {
                reply: EMPTY_MESSAGE_REPLY.to_string(),
                events: Vec::new(),
            };
        }

        let (context, returned_events) = self.assembler.assemble(user_message).await;

        if let Some(provider) = &self.provider {
            let system_prompt = format!("{SYSTEM_PROMPT}{context}");
            let start = messages.len().saturating_sub(HISTORY_WINDOW);
            match provider
                .complete(&messages[start..], &system_prompt, self.max_reply_tokens)
                .await
            {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    return ChatResponse {
                        reply: text.trim().to_string(),
                        events: returned_events,
                    };
                }
                Ok(_) => warn!(provider = provider.name(), "provider returned no text"),
                Err(e) => warn!(provider = provider.name(), error = %e, "provider failed"),
            }
        }

        let reply = if context.contains("Нет данных") {
            OFFLINE_GREETING.to_string()
        } else {
            format!("Вот актуальные данные:\n\n{context}")
        };
        ChatResponse {
            reply,
            events: returned_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beliefs::BeliefStore;
    use crate::test_helpers::*;
    use std::sync::atomic::Ordering;

    fn composer_with(
        primary: MockPrimary,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> ResponseComposer {
        let assembler = ContextAssembler::new(
            Arc::new(primary),
            Arc::new(MockComparison::default()),
            Arc::new(MockCurated::default()),
            Arc::new(MockBundles::default()),
            Arc::new(BeliefStore::new()),
        );
        ResponseComposer::new(assembler, provider, 800)
    }

    #[tokio::test]
    async fn blank_user_message_prompts_for_input() {
        let composer = composer_with(MockPrimary::default(), None);
        let response = composer
            .chat(&[ChatMessage::user("   "), ChatMessage::assistant("?")])
            .await;
        assert_eq!(response.reply, EMPTY_MESSAGE_REPLY);
        assert!(response.events.is_empty());
    }

    #[tokio::test]
    async fn no_provider_and_no_data_yields_greeting() {
        let composer = composer_with(MockPrimary::default(), None);
        let response = composer.chat(&[ChatMessage::user("любые скидки?")]).await;
        assert_eq!(response.reply, OFFLINE_GREETING);
    }

    #[tokio::test]
    async fn no_provider_with_data_yields_raw_context() {
        let primary = MockPrimary {
            specials: vec![special("10", "Portal", Some(4999), Some(14900), 66.0)],
            ..Default::default()
        };
        let composer = composer_with(primary, None);
        let response = composer.chat(&[ChatMessage::user("любые скидки?")]).await;
        assert!(response.reply.starts_with("Вот актуальные данные:\n\n"));
        assert!(response.reply.contains("Portal"));
    }

    #[tokio::test]
    async fn provider_reply_is_trimmed_and_used() {
        let provider = Arc::new(MockProvider::replying("  Вот скидки! 🎮  "));
        let composer = composer_with(MockPrimary::default(), Some(provider.clone()));
        let response = composer.chat(&[ChatMessage::user("скидки?")]).await;
        assert_eq!(response.reply, "Вот скидки! 🎮");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_template() {
        let provider = Arc::new(MockProvider::failing());
        let primary = MockPrimary {
            specials: vec![special("10", "Portal", Some(4999), Some(14900), 66.0)],
            ..Default::default()
        };
        let composer = composer_with(primary, Some(provider));
        let response = composer.chat(&[ChatMessage::user("скидки?")]).await;
        assert!(response.reply.starts_with("Вот актуальные данные:"));
    }

    #[tokio::test]
    async fn silent_provider_falls_back_to_greeting() {
        let provider = Arc::new(MockProvider::silent());
        let composer = composer_with(MockPrimary::default(), Some(provider));
        let response = composer.chat(&[ChatMessage::user("скидки?")]).await;
        assert_eq!(response.reply, OFFLINE_GREETING);
    }

    #[tokio::test]
    async fn history_is_capped_to_recent_turns() {
        struct CountingProvider {
            seen: std::sync::Mutex<usize>,
        }
        #[async_trait::async_trait]
        impl CompletionProvider for CountingProvider {
            fn name(&self) -> &str {
                "counting"
            }
            async fn complete(
                &self,
                history: &[ChatMessage],
                _system_prompt: &str,
                _max_tokens: u32,
            ) -> Result<Option<String>, priceowl_core::error::ProviderError> {
                *self.seen.lock().unwrap() = history.len();
                Ok(Some("ok".into()))
            }
        }

        let provider = Arc::new(CountingProvider {
            seen: std::sync::Mutex::new(0),
        });
        let composer = composer_with(MockPrimary::default(), Some(provider.clone()));

        let mut messages = Vec::new();
        for i in 0..12 {
            messages.push(ChatMessage::user(format!("сообщение {i}")));
        }
        composer.chat(&messages).await;
        assert_eq!(*provider.seen.lock().unwrap(), 8);
    }
}
