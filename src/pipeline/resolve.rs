//! Placement resolution: ask a vision model where the stamp goes.
//!
//! [`PlacementResolver`] is the seam between the pipeline and whatever
//! decides the placement. The production implementation, [`VisionResolver`],
//! sends page 1 to a multimodal LLM together with the instruction from
//! [`crate::prompts`] and validates the reply with
//! [`crate::placement::parse_placement`]. [`StaticResolver`] returns a fixed
//! answer, for tests and for callers that already know the placement.
//!
//! ## No retries
//!
//! One request per run. A failed or malformed reply aborts the run; the
//! caller decides whether to start over.

use crate::error::StampError;
use crate::pipeline::encode::RasterImage;
use crate::placement::{parse_placement, PlacementSuggestion};
use crate::prompts::placement_instruction;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Decides where the stamp goes on page 1.
pub trait PlacementResolver: Send + Sync {
    /// Resolve a placement from the page raster. One attempt; no retry.
    fn resolve<'a>(
        &'a self,
        image: &'a RasterImage,
    ) -> BoxFuture<'a, Result<PlacementSuggestion, StampError>>;
}

/// Resolver backed by a multimodal LLM.
pub struct VisionResolver {
    provider: Arc<dyn LLMProvider>,
    instruction: String,
    options: CompletionOptions,
    timeout: Option<Duration>,
}

impl VisionResolver {
    pub fn new(provider: Arc<dyn LLMProvider>, label: &str) -> Self {
        Self {
            provider,
            instruction: placement_instruction(None, label),
            options: build_options(0.1, 1024),
            timeout: None,
        }
    }

    /// Replace the built-in instruction. The response shape is kept.
    pub fn with_instruction(mut self, custom: &str, label: &str) -> Self {
        self.instruction = placement_instruction(Some(custom), label);
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.options = build_options(temperature, max_tokens);
        self
    }

    /// Abort the call after `secs`; 0 means no limit.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Message layout: the instruction as system turn, then the page image
    /// as the only user turn.
    fn messages(&self, image: &RasterImage) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instruction.as_str()),
            ChatMessage::user_with_images("", vec![image.to_image_data()]),
        ]
    }

    async fn resolve_once(&self, image: &RasterImage) -> Result<PlacementSuggestion, StampError> {
        let start = Instant::now();
        let messages = self.messages(image);

        let call = self.provider.chat(&messages, Some(&self.options));
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                StampError::ExternalService {
                    detail: format!("no reply within {}s", limit.as_secs()),
                }
            })?,
            None => call.await,
        }
        .map_err(|e| StampError::ExternalService {
            detail: e.to_string(),
        })?;

        debug!(
            "Resolver: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            warn!("Resolver returned an empty reply");
            return Err(StampError::ExternalService {
                detail: "empty reply from model".to_string(),
            });
        }

        let placement = parse_placement(&response.content)?;
        info!(
            "Placement: x={:.1} y={:.1} size={:.1} rot={:.1}",
            placement.x, placement.y, placement.font_size, placement.rotation
        );
        Ok(placement)
    }
}

impl PlacementResolver for VisionResolver {
    fn resolve<'a>(
        &'a self,
        image: &'a RasterImage,
    ) -> BoxFuture<'a, Result<PlacementSuggestion, StampError>> {
        self.resolve_once(image).boxed()
    }
}

/// Resolver that always returns the same placement.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    placement: PlacementSuggestion,
}

impl StaticResolver {
    pub fn new(placement: PlacementSuggestion) -> Self {
        Self { placement }
    }

    /// Parse a JSON placement with the same rules as a model reply.
    pub fn from_json(text: &str) -> Result<Self, StampError> {
        parse_placement(text).map(Self::new)
    }
}

impl PlacementResolver for StaticResolver {
    fn resolve<'a>(
        &'a self,
        _image: &'a RasterImage,
    ) -> BoxFuture<'a, Result<PlacementSuggestion, StampError>> {
        let placement = self.placement.clone();
        async move { Ok(placement) }.boxed()
    }
}

/// Build `CompletionOptions` for the placement call.
fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edgequake_llm::{LLMResponse, LlmError, MockProvider};

    /// Provider that never produces a usable reply.
    enum Broken {
        Refuses,
        Stalls,
    }

    #[async_trait]
    impl LLMProvider for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn model(&self) -> &str {
            "broken-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            match self {
                Broken::Refuses => Err(LlmError::ApiError("quota exhausted".to_string())),
                Broken::Stalls => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(LLMResponse::new("{}", "broken-model"))
                }
            }
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    async fn mock_replying(reply: &str) -> VisionResolver {
        let provider = MockProvider::new();
        provider.add_response(reply).await;
        VisionResolver::new(Arc::new(provider), "FAST")
    }

    fn tiny_raster() -> RasterImage {
        RasterImage {
            png: vec![0x89, b'P', b'N', b'G'],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn build_options_defaults() {
        let opts = build_options(0.1, 1024);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(1024));
    }

    #[tokio::test]
    async fn static_resolver_returns_its_placement() {
        let resolver = StaticResolver::new(PlacementSuggestion::new(50.0, 12.0, 90.0, 0.0));
        let p = resolver.resolve(&tiny_raster()).await.unwrap();
        assert_eq!(p.x, 50.0);
        assert_eq!(p.font_size, 90.0);
    }

    #[tokio::test]
    async fn static_resolver_as_trait_object() {
        let resolver: Arc<dyn PlacementResolver> = Arc::new(
            StaticResolver::from_json(
                r#"{"x": 40, "y": 20, "fontSize": 80, "rotation": 5, "reasoning": "fixed"}"#,
            )
            .unwrap(),
        );
        let p = resolver.resolve(&tiny_raster()).await.unwrap();
        assert_eq!(p.rotation, 5.0);
        assert_eq!(p.reasoning, "fixed");
    }

    #[tokio::test]
    async fn model_reply_is_parsed() {
        let resolver = mock_replying(
            "```json\n{\"x\": 62, \"y\": 18, \"fontSize\": 95, \"rotation\": -1.5, \"reasoning\": \"QR top right\"}\n```",
        )
        .await;
        let p = resolver.resolve(&tiny_raster()).await.unwrap();
        assert_eq!(p.x, 62.0);
        assert_eq!(p.rotation, -1.5);
        assert_eq!(p.reasoning, "QR top right");
    }

    #[tokio::test]
    async fn model_reply_without_rotation_is_malformed() {
        let resolver = mock_replying(r#"{"x": 50, "y": 10, "fontSize": 90, "reasoning": "r"}"#).await;
        let err = resolver.resolve(&tiny_raster()).await.unwrap_err();
        assert!(matches!(err, StampError::MalformedResponse { .. }), "got: {err}");
        assert!(err.to_string().contains("rotation"));
    }

    #[tokio::test]
    async fn blank_reply_is_an_external_failure() {
        let resolver = mock_replying("   \n").await;
        let err = resolver.resolve(&tiny_raster()).await.unwrap_err();
        assert!(matches!(err, StampError::ExternalService { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn provider_error_is_an_external_failure() {
        let resolver = VisionResolver::new(Arc::new(Broken::Refuses), "FAST");
        let err = resolver.resolve(&tiny_raster()).await.unwrap_err();
        match err {
            StampError::ExternalService { detail } => assert!(detail.contains("quota exhausted")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let resolver = VisionResolver::new(Arc::new(Broken::Stalls), "FAST").with_timeout_secs(1);
        let start = Instant::now();
        let err = resolver.resolve(&tiny_raster()).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(10));
        match err {
            StampError::ExternalService { detail } => assert!(detail.contains("1s"), "got: {detail}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn static_resolver_rejects_incomplete_json() {
        let err = StaticResolver::from_json(r#"{"x": 40, "y": 20}"#).unwrap_err();
        assert!(matches!(err, StampError::MalformedResponse { .. }));
    }
}
