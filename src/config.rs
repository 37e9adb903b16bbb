use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    /// Case-sensitive trigger token; messages without it are ignored.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Body substituted when the command arrives with no text after the prefix.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            greeting: default_greeting(),
        }
    }
}

fn default_prefix() -> String {
    "/devops".to_string()
}
fn default_greeting() -> String {
    "Hello, what can we do today?".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Fixed reference phrase whose embedding defines the "CI-log-related"
    /// concept for stage-1 similarity scoring.
    #[serde(default = "default_anchor")]
    pub anchor: String,
    /// Hypothesis checked by the stage-2 zero-shot model for ambiguous input.
    #[serde(default = "default_hypothesis")]
    pub hypothesis: String,
    /// Similarity at or above this decides GithubRelated without stage 2.
    #[serde(default = "default_github_threshold")]
    pub github_threshold: f32,
    /// Similarity at or below this decides NotGithubRelated without stage 2.
    #[serde(default = "default_unrelated_threshold")]
    pub unrelated_threshold: f32,
    /// Entailment score at or above this decides GithubRelated in the band.
    #[serde(default = "default_entailment_threshold")]
    pub entailment_threshold: f32,
    /// Zero-shot classification endpoint (Hugging Face inference API shape).
    #[serde(default = "default_zero_shot_url")]
    pub zero_shot_url: String,
    /// Optional bearer token for the zero-shot endpoint; supports `env:VAR`.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            hypothesis: default_hypothesis(),
            github_threshold: default_github_threshold(),
            unrelated_threshold: default_unrelated_threshold(),
            entailment_threshold: default_entailment_threshold(),
            zero_shot_url: default_zero_shot_url(),
            api_key: String::new(),
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

fn default_anchor() -> String {
    "I want to retrieve the CI logs for my failed deployment".to_string()
}
fn default_hypothesis() -> String {
    "The query relates to retrieving CI logs or diagnosing a failed deployment".to_string()
}
fn default_github_threshold() -> f32 {
    0.80
}
fn default_unrelated_threshold() -> f32 {
    0.55
}
fn default_entailment_threshold() -> f32 {
    0.6
}
fn default_zero_shot_url() -> String {
    "https://api-inference.huggingface.co/models/MoritzLaurer/DeBERTa-v3-base-mnli".to_string()
}
fn default_classifier_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Generation API key; supports `env:VAR` indirection.
    pub api_key: String,
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
    /// Persona applied identically to every generation call.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_top_p() -> f32 {
    0.9
}
fn default_top_k() -> u32 {
    50
}
fn default_generation_timeout_secs() -> u64 {
    120
}
fn default_system_instruction() -> String {
    "You are a highly specialized assistant for DevOps and CI/CD inquiries: \
     pipelines, build and deployment failures, infrastructure as code, \
     containers, orchestration, monitoring, and GitHub log retrieval. Answer \
     DevOps questions accurately, clearly, and practically. For questions \
     slightly outside the domain, answer briefly and steer the user back \
     toward DevOps. For completely unrelated questions, reply with a short, \
     witty redirection toward CI/CD topics instead of an answer."
        .to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
    /// How many trailing log lines are returned as the success payload.
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_base_url(),
            tail_lines: default_tail_lines(),
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}
fn default_tail_lines() -> usize {
    30
}
fn default_github_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    /// Sender name stamped on every outbound event.
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            timeout_secs: default_notifier_timeout_secs(),
        }
    }
}

fn default_sender() -> String {
    "devbot".to_string()
}
fn default_notifier_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatcherConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue")]
    pub queue: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue: default_queue(),
        }
    }
}

fn default_workers() -> usize {
    4
}
fn default_queue() -> usize {
    64
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.generation.api_key = resolve_secret(&config.generation.api_key, "generation.api_key")?;
        config.classifier.api_key = resolve_secret(&config.classifier.api_key, "classifier.api_key")?;
        Ok(config)
    }
}

/// Resolve `env:VAR_NAME` indirection so secrets can stay out of config.toml.
fn resolve_secret(value: &str, field: &str) -> anyhow::Result<String> {
    if let Some(var) = value.strip_prefix("env:") {
        return std::env::var(var)
            .map_err(|_| anyhow::anyhow!("{} references ${}, which is not set", field, var));
    }
    Ok(value.to_string())
}
