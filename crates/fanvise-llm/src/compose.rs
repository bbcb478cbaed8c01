// Recommendation composition: narrate ranked moves with the LLM, falling back
// to the deterministic template on any failure.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use fanvise_core::config::LlmConfig;
use fanvise_core::moves::RankedMove;
use fanvise_core::snapshot::MatchupScore;

use crate::client::LlmClient;
use crate::prompt::{build_recommendation_prompt, system_prompt};
use crate::template::{failure_message, hold_message, moves_message, FailureKind, Language};

/// Everything the narrator may see. Numbers are final.
#[derive(Debug, Clone, Serialize)]
pub struct CompositionInput {
    pub team_name: String,
    pub window_label: String,
    pub matchup: MatchupScore,
    pub games_remaining: u32,
    pub moves: Vec<RankedMove>,
    pub query: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionSource {
    Narrated,
    Template,
}

/// Why the template was used instead of the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoMoves,
    Failure,
    Disabled,
    Api(String),
    EmptyCompletion,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub text: String,
    pub source: CompositionSource,
    pub fallback_reason: Option<FallbackReason>,
}

impl Composition {
    fn template(text: String, reason: FallbackReason) -> Self {
        Self {
            text,
            source: CompositionSource::Template,
            fallback_reason: Some(reason),
        }
    }
}

pub struct Composer {
    client: LlmClient,
    max_tokens: u32,
    timeout: Duration,
}

impl Composer {
    pub fn new(client: LlmClient, config: &LlmConfig) -> Self {
        Self::with_timeout(client, config.max_tokens, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(client: LlmClient, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            client,
            max_tokens,
            timeout,
        }
    }

    /// A composer that always uses the template.
    pub fn template_only() -> Self {
        Self::with_timeout(LlmClient::Disabled, 0, Duration::ZERO)
    }

    pub async fn compose(&self, input: &CompositionInput) -> Composition {
        if input.moves.is_empty() {
            debug!("no ranked moves, composing hold message");
            return Composition::template(
                hold_message(&input.window_label, &input.matchup, input.language),
                FallbackReason::NoMoves,
            );
        }

        let fallback = || {
            moves_message(
                &input.team_name,
                &input.window_label,
                &input.matchup,
                &input.moves,
                input.language,
            )
        };

        if !self.client.is_enabled() {
            return Composition::template(fallback(), FallbackReason::Disabled);
        }

        let system = system_prompt(input.language);
        let prompt = build_recommendation_prompt(input);
        let started = Instant::now();
        let completion = tokio::time::timeout(
            self.timeout,
            self.client.complete(&system, &prompt, self.max_tokens),
        )
        .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match completion {
            Ok(Ok(done)) if !done.text.trim().is_empty() => {
                info!(
                    elapsed_ms,
                    input_tokens = done.input_tokens,
                    output_tokens = done.output_tokens,
                    "narration complete"
                );
                Composition {
                    text: done.text.trim().to_string(),
                    source: CompositionSource::Narrated,
                    fallback_reason: None,
                }
            }
            Ok(Ok(_)) => {
                warn!(elapsed_ms, "LLM returned an empty completion, using template");
                Composition::template(fallback(), FallbackReason::EmptyCompletion)
            }
            Ok(Err(message)) => {
                warn!(elapsed_ms, "LLM call failed, using template: {message}");
                Composition::template(fallback(), FallbackReason::Api(message))
            }
            Err(_) => {
                warn!(elapsed_ms, "LLM call timed out, using template");
                Composition::template(fallback(), FallbackReason::Timeout)
            }
        }
    }

    /// Deterministic error response.
    pub fn compose_error(&self, kind: FailureKind, language: Language) -> Composition {
        Composition::template(failure_message(kind, language), FallbackReason::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClaudeClient;
    use fanvise_core::moves::{Confidence, DropScore, SimulatedMove, StreamScore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn ranked() -> RankedMove {
        RankedMove {
            rank: 1,
            simulated: SimulatedMove {
                drop_player_id: 1,
                add_player_id: 10,
                is_legal: true,
                baseline_window_fpts: 330.0,
                projected_window_fpts: 440.0,
                net_gain: 110.0,
                confidence: Confidence::High,
                warnings: vec![],
            },
            drop: DropScore {
                player_id: 1,
                player_name: "Smith".to_string(),
                score: 62.5,
            },
            add: StreamScore {
                player_id: 10,
                player_name: "Jones".to_string(),
                score: 80.0,
                games_remaining: 4,
            },
        }
    }

    fn input(moves: Vec<RankedMove>, language: Language) -> CompositionInput {
        CompositionInput {
            team_name: "Dunkers".to_string(),
            window_label: "Oct 21 – Oct 25".to_string(),
            matchup: MatchupScore::default(),
            games_remaining: 30,
            moves,
            query: "best pickup?".to_string(),
            language,
        }
    }

    /// Serve a single canned HTTP response, or hang for `hang_ms` before it.
    async fn mock_api(response: &'static str, hang_ms: u64) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16384];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(Duration::from_millis(hang_ms)).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        });
        format!("http://{addr}/v1/messages")
    }

    fn composer_for(url: String, timeout: Duration) -> Composer {
        let client = LlmClient::Active(ClaudeClient::with_api_url(
            "sk-test".into(),
            "test-model".into(),
            url,
        ));
        Composer::with_timeout(client, 300, timeout)
    }

    const NARRATION: &str = concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: text/event-stream\r\n",
        "\r\n",
        "event: content_block_delta\r\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Drop Smith for Jones (+110.0).\"}}\r\n",
        "\r\n",
        "event: message_stop\r\n",
        "data: {\"type\":\"message_stop\"}\r\n",
        "\r\n",
    );

    const EMPTY_NARRATION: &str = concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: text/event-stream\r\n",
        "\r\n",
        "event: message_stop\r\n",
        "data: {\"type\":\"message_stop\"}\r\n",
        "\r\n",
    );

    #[tokio::test]
    async fn empty_moves_skip_the_llm() {
        // The endpoint is never contacted: nothing listens there.
        let composer = composer_for("http://127.0.0.1:9/v1/messages".into(), Duration::from_secs(5));
        let composition = composer.compose(&input(vec![], Language::Greek)).await;
        assert_eq!(composition.source, CompositionSource::Template);
        assert_eq!(composition.fallback_reason, Some(FallbackReason::NoMoves));
        assert!(composition.text.contains("Κράτα το ρόστερ"));
    }

    #[tokio::test]
    async fn disabled_client_uses_template() {
        let composer = Composer::template_only();
        let composition = composer.compose(&input(vec![ranked()], Language::English)).await;
        assert_eq!(composition.fallback_reason, Some(FallbackReason::Disabled));
        assert!(composition.text.contains("Drop Smith, add Jones: +110.0"));
    }

    #[tokio::test]
    async fn narrated_text_is_used_when_available() {
        let url = mock_api(NARRATION, 0).await;
        let composer = composer_for(url, Duration::from_secs(5));
        let composition = composer.compose(&input(vec![ranked()], Language::English)).await;
        assert_eq!(composition.source, CompositionSource::Narrated);
        assert_eq!(composition.text, "Drop Smith for Jones (+110.0).");
        assert_eq!(composition.fallback_reason, None);
    }

    #[tokio::test]
    async fn empty_completion_falls_back() {
        let url = mock_api(EMPTY_NARRATION, 0).await;
        let composer = composer_for(url, Duration::from_secs(5));
        let composition = composer.compose(&input(vec![ranked()], Language::English)).await;
        assert_eq!(composition.source, CompositionSource::Template);
        assert!(matches!(
            composition.fallback_reason,
            Some(FallbackReason::EmptyCompletion) | Some(FallbackReason::Api(_))
        ));
        assert!(composition.text.contains("+110.0"));
    }

    #[tokio::test]
    async fn slow_llm_times_out_to_template() {
        let url = mock_api(NARRATION, 2_000).await;
        let composer = composer_for(url, Duration::from_millis(200));
        let composition = composer.compose(&input(vec![ranked()], Language::English)).await;
        assert_eq!(composition.fallback_reason, Some(FallbackReason::Timeout));
        assert!(composition.text.contains("Recommended moves for Dunkers"));
    }

    #[test]
    fn error_composition_is_deterministic() {
        let composer = Composer::template_only();
        let a = composer.compose_error(FailureKind::MissingIdentifiers, Language::English);
        let b = composer.compose_error(FailureKind::MissingIdentifiers, Language::English);
        assert_eq!(a, b);
        assert!(!a.text.is_empty());
        assert_eq!(a.fallback_reason, Some(FallbackReason::Failure));
    }
}
