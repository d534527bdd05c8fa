//! Generative-AI collaborator boundary.
//!
//! # Responsibility
//! - Define the opaque request/response contract for the remote assistant.
//! - Personalize prompts with caller profile context.
//! - Convert every remote failure into fixed, user-readable fallback text.
//!
//! # Invariants
//! - `AssistantService::ask_assistant` never returns an error.
//! - Prompt and reply text are never logged.

use crate::assistant::markers::{tokenize_reply, ReplyToken};
use crate::assistant::video::VideoCatalog;
use crate::config::AssistantConfig;
use crate::model::profile::UserProfile;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Shown when the remote call fails.
pub const TECHNICAL_FALLBACK_MESSAGE: &str =
    "Ops, tive um pequeno problema técnico. Pode repetir a pergunta?";
/// Shown when the remote call succeeds with no usable text.
pub const EMPTY_REPLY_FALLBACK_MESSAGE: &str =
    "Desculpe, não consegui processar sua resposta agora. Tente novamente.";

const PERSONA_INSTRUCTION: &str = "\
Você é o \"Mamãe Feliz\", um assistente virtual especializado, acolhedor, empático e experiente, focado em ajudar mães e pais com cuidados de bebês e crianças pequenas.
Seu tom de voz deve ser: Calmo, encorajador, carinhoso e informativo. Use emojis ocasionais para tornar a conversa leve.

Tópicos principais que você domina:
1. Alimentação (Amamentação, Fórmulas, Introdução Alimentar).
2. Sono (Rotinas, Sonecas, Regressão de sono).
3. Saúde (Cólicas, Gases, Vacinas, Dentição).
4. Desenvolvimento e Brincadeiras.
";

const VIDEO_INSTRUCTION: &str = "\
INSTRUÇÃO DE VÍDEO:
Se a dúvida da mãe puder ser ajudada por um desses vídeos específicos, você DEVE recomendar o vídeo.
Para mostrar o vídeo na tela, escreva EXATAMENTE este código no final da frase: [[VIDEO:ID_DO_VIDEO]]
Exemplo: \"Para ajudar com a pega, veja este vídeo: [[VIDEO:v1]]\"
";

const SAFETY_INSTRUCTION: &str = "\
REGRAS CRÍTICAS DE SEGURANÇA:
1. Você NÃO é um médico. Para qualquer questão médica séria (febre alta, quedas, reações alérgicas graves, etc.), você DEVE recomendar imediatamente que a mãe procure um pediatra ou hospital.
2. Nunca sugira medicamentos específicos (nomes de remédios) sem recomendar consulta médica. Pode sugerir remédios caseiros seguros e comprovados (ex: massagem para cólica), mas com cautela.
3. Se a pergunta for ambígua sobre a saúde do bebê, opte pela segurança.

Estruture suas respostas de forma legível, usando parágrafos curtos ou listas (markdown) quando apropriado.
";

/// Remote assistant failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    Transport(String),
    Timeout,
    Rejected(String),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "assistant transport failed: {message}"),
            Self::Timeout => write!(f, "assistant call timed out"),
            Self::Rejected(message) => write!(f, "assistant rejected request: {message}"),
        }
    }
}

impl Error for AssistantError {}

/// One chat turn sent to the remote model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRequest {
    pub model: String,
    pub temperature: f32,
    pub system_instruction: String,
    pub prompt: String,
}

/// Opaque, possibly-failing remote call.
pub trait AssistantClient {
    fn ask(&self, request: &AssistantRequest) -> Result<String, AssistantError>;
}

/// Reply handed to the chat UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub tokens: Vec<ReplyToken>,
    /// `true` when `text` is one of the fixed fallback messages.
    pub is_fallback: bool,
}

impl AssistantReply {
    fn from_text(text: String, is_fallback: bool) -> Self {
        let tokens = tokenize_reply(&text);
        Self {
            text,
            tokens,
            is_fallback,
        }
    }
}

/// Builds the system instruction, listing the videos the model may cite.
pub fn build_system_instruction(catalog: &VideoCatalog) -> String {
    let video_context = catalog
        .iter()
        .map(|video| {
            format!(
                "- Título: \"{}\" (ID: {}) - Assunto: {}",
                video.title, video.id, video.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{PERSONA_INSTRUCTION}\nVOCÊ TEM ACESSO A UMA BIBLIOTECA DE VÍDEOS:\nAqui está a lista de vídeos que temos no aplicativo:\n{video_context}\n\n{VIDEO_INSTRUCTION}\n{SAFETY_INSTRUCTION}"
    )
}

/// Prepends profile context when available.
pub fn build_prompt(text: &str, profile: Option<&UserProfile>) -> String {
    match profile {
        Some(profile) => format!("{}{text}", profile.context_prefix()),
        None => text.to_string(),
    }
}

/// Chat use-case service over an assistant client.
pub struct AssistantService<C: AssistantClient> {
    client: C,
    config: AssistantConfig,
    system_instruction: String,
}

impl<C: AssistantClient> AssistantService<C> {
    /// Creates a service with default model settings and the built-in
    /// video library.
    pub fn new(client: C) -> Self {
        Self::with_config(client, AssistantConfig::default(), &VideoCatalog::builtin())
    }

    pub fn with_config(client: C, config: AssistantConfig, catalog: &VideoCatalog) -> Self {
        Self {
            client,
            config,
            system_instruction: build_system_instruction(catalog),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Sends one user message and returns displayable reply text.
    ///
    /// Remote failures and empty replies become fixed fallback messages.
    pub fn ask_assistant(&self, text: &str, profile: Option<&UserProfile>) -> AssistantReply {
        let request = AssistantRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            system_instruction: self.system_instruction.clone(),
            prompt: build_prompt(text, profile),
        };

        let started_at = Instant::now();
        match self.client.ask(&request) {
            Ok(reply) if !reply.trim().is_empty() => {
                info!(
                    "event=assistant_call module=assistant status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                AssistantReply::from_text(reply, false)
            }
            Ok(_) => {
                warn!(
                    "event=assistant_call module=assistant status=empty duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                AssistantReply::from_text(EMPTY_REPLY_FALLBACK_MESSAGE.to_string(), true)
            }
            Err(err) => {
                warn!(
                    "event=assistant_call module=assistant status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                AssistantReply::from_text(TECHNICAL_FALLBACK_MESSAGE.to_string(), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_prompt, build_system_instruction, AssistantClient, AssistantError,
        AssistantRequest, AssistantService, EMPTY_REPLY_FALLBACK_MESSAGE,
        TECHNICAL_FALLBACK_MESSAGE,
    };
    use crate::assistant::markers::ReplyToken;
    use crate::assistant::video::VideoCatalog;
    use crate::model::profile::UserProfile;
    use std::cell::RefCell;

    struct ScriptedClient {
        reply: Result<String, AssistantError>,
        seen: RefCell<Vec<AssistantRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: Result<String, AssistantError>) -> Self {
            Self {
                reply,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl AssistantClient for ScriptedClient {
        fn ask(&self, request: &AssistantRequest) -> Result<String, AssistantError> {
            self.seen.borrow_mut().push(request.clone());
            self.reply.clone()
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            mom_name: "Joana".to_string(),
            baby_name: "Lia".to_string(),
            baby_birth_date: "2024-03-01".to_string(),
        }
    }

    #[test]
    fn prompt_carries_profile_context_prefix() {
        let prompt = build_prompt("Meu bebê tem cólica", Some(&profile()));
        assert_eq!(
            prompt,
            "(Contexto: Sou a mãe Joana, meu bebê se chama Lia e nasceu em 2024-03-01). Meu bebê tem cólica"
        );
        assert_eq!(build_prompt("oi", None), "oi");
    }

    #[test]
    fn system_instruction_lists_every_video() {
        let catalog = VideoCatalog::builtin();
        let instruction = build_system_instruction(&catalog);
        for video in catalog.iter() {
            assert!(instruction.contains(&format!("(ID: {})", video.id)));
        }
        assert!(instruction.contains("[[VIDEO:ID_DO_VIDEO]]"));
    }

    #[test]
    fn successful_reply_is_tokenized() {
        let service = AssistantService::new(ScriptedClient::new(Ok(
            "Veja: [[VIDEO:v2]]".to_string()
        )));
        let reply = service.ask_assistant("cólica", Some(&profile()));

        assert!(!reply.is_fallback);
        assert_eq!(reply.tokens[1], ReplyToken::Video("v2".to_string()));

        let seen = service.client.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt.starts_with("(Contexto: Sou a mãe Joana"));
        assert_eq!(seen[0].model, "gemini-2.5-flash");
    }

    #[test]
    fn failures_become_fallback_text() {
        let failing = AssistantService::new(ScriptedClient::new(Err(AssistantError::Timeout)));
        let reply = failing.ask_assistant("oi", None);
        assert!(reply.is_fallback);
        assert_eq!(reply.text, TECHNICAL_FALLBACK_MESSAGE);

        let empty = AssistantService::new(ScriptedClient::new(Ok("  ".to_string())));
        let reply = empty.ask_assistant("oi", None);
        assert!(reply.is_fallback);
        assert_eq!(reply.text, EMPTY_REPLY_FALLBACK_MESSAGE);
    }
}
