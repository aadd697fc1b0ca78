pub mod command;

use std::fmt;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::config::{Config, Locale};
use crate::dataset::{self, UploadError};
use crate::factors::{FieldKey, ManualFactors};
use crate::instrumentation::{self, InteractionKind, InteractionLog, Outcome};
use crate::llm::{QueryProxy, FAILURE_MESSAGE};
use crate::summary::{self, templates, Aggregates};

pub use command::{parse_command, Command, Mode, HELP};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Why a question was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskRejected {
    MissingApiKey,
    EmptyQuestion,
}

impl fmt::Display for AskRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "enter an API key (key <api-key>) before asking questions"),
            Self::EmptyQuestion => write!(f, "the question is empty"),
        }
    }
}

impl std::error::Error for AskRejected {}

/// Per-user state: mode, factors, language and the API key.
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    api_key: Option<String>,
    mode: Mode,
    factors: ManualFactors,
    locale: Locale,
    preview_rows: usize,
    proxy: QueryProxy,
    history: Vec<InteractionLog>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_proxy(QueryProxy::from_config(config), config.locale, config.api_key.clone())
    }

    pub fn with_proxy(proxy: QueryProxy, locale: Locale, api_key: Option<String>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            api_key: None,
            mode: Mode::default(),
            factors: ManualFactors::default(),
            locale,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            proxy,
            history: Vec::new(),
        };
        tracing::debug!(session = %session.id, "session started");
        session.with_api_key(api_key)
    }

    fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.set_api_key(&key);
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn history(&self) -> &[InteractionLog] {
        &self.history
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn set_preview_rows(&mut self, rows: usize) {
        self.preview_rows = rows;
    }

    /// Blank keys clear the stored key.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        self.api_key = (!key.is_empty()).then(|| key.to_string());
    }

    pub fn set_factor(&mut self, key: FieldKey, value: &str) -> Result<(), String> {
        self.factors.set(key, value)
    }

    pub fn set_factors(&mut self, factors: ManualFactors) {
        self.factors = factors;
    }

    fn record(&mut self, kind: InteractionKind, outcome: Outcome, started: Instant) {
        let log = InteractionLog::new(
            &self.id.to_string(),
            kind,
            outcome,
            started.elapsed().as_millis() as u64,
        );
        log.emit();
        self.history.push(log);
    }

    /// Factor listing and explanation for the current manual values.
    pub fn render_manual(&mut self) -> String {
        let started = Instant::now();
        let text = summary::render_manual(&self.factors, self.locale);
        self.record(InteractionKind::Manual, Outcome::Ok, started);
        text
    }

    /// Load a file and render its preview and aggregates.
    pub fn upload(&mut self, path: &Path) -> Result<String, UploadError> {
        let started = Instant::now();
        let result = dataset::load_file(path).and_then(|ds| {
            let aggregates = Aggregates::compute(&ds)?;
            tracing::debug!(rows = aggregates.rows, "computed aggregates");
            let t = templates::for_locale(self.locale);
            Ok(format!(
                "{}\n{}\n\n{}",
                t.preview_heading,
                ds.preview(self.preview_rows),
                summary::render_upload(&aggregates, self.locale)
            ))
        });

        let outcome = match &result {
            Ok(_) => Outcome::Ok,
            Err(UploadError::UnsupportedExtension(_) | UploadError::Io(_)) => Outcome::FileError,
            Err(e) if e.is_schema() => Outcome::SchemaError,
            Err(_) => Outcome::ParseError,
        };
        if let Err(e) = &result {
            tracing::warn!(path = %path.display(), error = %e, "upload rejected");
        }
        self.record(InteractionKind::Upload, outcome, started);
        result
    }

    /// Send a question with the session key. Nothing is sent unless both are non-empty.
    pub async fn ask(&mut self, question: &str) -> Result<String, AskRejected> {
        let started = Instant::now();
        let question = question.trim();

        let api_key = match self.api_key.clone() {
            Some(key) => key,
            None => {
                self.record(InteractionKind::Ask, Outcome::Rejected, started);
                return Err(AskRejected::MissingApiKey);
            }
        };
        if question.is_empty() {
            self.record(InteractionKind::Ask, Outcome::Rejected, started);
            return Err(AskRejected::EmptyQuestion);
        }

        let (reply, outcome) = match self.proxy.ask(question, &api_key).await {
            Ok(text) => (text, Outcome::Ok),
            Err(e) => {
                tracing::warn!(error = %e, "remote query failed");
                (FAILURE_MESSAGE.to_string(), Outcome::RemoteError)
            }
        };
        self.record(InteractionKind::Ask, outcome, started);
        Ok(reply)
    }

    /// Run one command and return the text to display. Errors become messages.
    pub async fn handle(&mut self, command: Command) -> String {
        match command {
            Command::Mode(mode) => {
                self.mode = mode;
                match mode {
                    Mode::Manual => self.render_manual(),
                    Mode::Upload => "Upload mode: load <path> with a .csv or .txt file.".into(),
                }
            }
            Command::Set(key, value) => {
                if self.mode != Mode::Manual {
                    return "set is only available in manual mode (mode manual)".into();
                }
                match self.set_factor(key, &value) {
                    Ok(()) => self.render_manual(),
                    Err(e) => format!("Error: {e}"),
                }
            }
            Command::Show => match self.mode {
                Mode::Manual => self.render_manual(),
                Mode::Upload => "Upload mode: load <path> to analyse a file.".into(),
            },
            Command::Load(path) => {
                if self.mode != Mode::Upload {
                    return "load is only available in upload mode (mode upload)".into();
                }
                match self.upload(&path) {
                    Ok(text) => text,
                    Err(e) => format!("Error: {e}"),
                }
            }
            Command::Key(key) => {
                self.set_api_key(&key);
                if self.has_api_key() {
                    "API key set.".into()
                } else {
                    "API key cleared.".into()
                }
            }
            Command::Ask(question) => match self.ask(&question).await {
                Ok(reply) => {
                    let t = templates::for_locale(self.locale);
                    format!("{}:\n{}", t.reply_heading, reply)
                }
                Err(e) => format!("Error: {e}"),
            },
            Command::Lang(locale) => {
                self.set_locale(locale);
                format!("Language set to {locale}.")
            }
            Command::History => self.summary(),
            Command::Help => HELP.into(),
            Command::Quit => String::new(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Session {} started {} | API key: {} | {}",
            self.id,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            if self.has_api_key() { "set" } else { "unset" },
            instrumentation::summary(&self.history),
        )
    }
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run_interactive(session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let banner = format!(
        "Landslide factor console. Type 'help' for commands.\n\n{}\n",
        session.render_manual()
    );
    stdout.write_all(banner.as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => session.handle(command).await,
            Err(e) => format!("Error: {e}"),
        };
        stdout.write_all(format!("{output}\n\n").as_bytes()).await?;
    }

    stdout.write_all(format!("{}\n", session.summary()).as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use std::time::Duration;
    use std::path::PathBuf;

    fn session(server: &MockServer, key: Option<&str>) -> Session {
        let proxy = QueryProxy::new(&server.url("/claude"), 200_000, Duration::from_secs(5));
        Session::with_proxy(proxy, Locale::En, key.map(str::to_string))
    }

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_ask_without_key_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/claude");
                then.status(200).json_body(serde_json::json!({ "response": "ok" }));
            })
            .await;

        let mut s = session(&server, None);
        assert_eq!(s.ask("why?").await.unwrap_err(), AskRejected::MissingApiKey);

        s.set_api_key("   ");
        assert_eq!(s.ask("why?").await.unwrap_err(), AskRejected::MissingApiKey);

        mock.assert_calls_async(0).await;
        assert_eq!(s.history().len(), 2);
        assert!(s.history().iter().all(|l| l.outcome == Outcome::Rejected));
    }

    #[tokio::test]
    async fn test_ask_empty_question_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/claude");
                then.status(200).json_body(serde_json::json!({ "response": "ok" }));
            })
            .await;

        let mut s = session(&server, Some("k"));
        assert_eq!(s.ask("  ").await.unwrap_err(), AskRejected::EmptyQuestion);
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_ask_uses_session_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/claude")
                    .header("authorization", "Bearer sk-session")
                    .json_body(serde_json::json!({ "prompt": "q", "max_tokens": 200000 }));
                then.status(200).json_body(serde_json::json!({ "response": "ok" }));
            })
            .await;

        let mut s = session(&server, None);
        let reply = s.handle(Command::Key(" sk-session ".into())).await;
        assert_eq!(reply, "API key set.");
        assert_eq!(s.ask("q").await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_session_usable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/claude");
                then.status(500);
            })
            .await;

        let mut s = session(&server, Some("k"));
        assert_eq!(s.ask("q").await.unwrap(), FAILURE_MESSAGE);
        assert_eq!(s.history()[0].outcome, Outcome::RemoteError);

        let text = s.handle(Command::Show).await;
        assert!(text.contains("Precipitation: 100 mm"));
    }

    #[tokio::test]
    async fn test_set_renders_manual_sentence() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);

        let text = s.handle(Command::Set(FieldKey::Precipitation, "250".into())).await;
        assert!(text.contains("With 250 mm of precipitation"), "{text}");

        let text = s.handle(Command::Set(FieldKey::SlopeAngle, "120".into())).await;
        assert!(text.contains("a 90 degree slope"), "{text}");

        let text = s.handle(Command::Set(FieldKey::SoilType, "peat".into())).await;
        assert!(text.starts_with("Error: unknown soil type"), "{text}");
    }

    #[tokio::test]
    async fn test_commands_respect_mode() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);

        let text = s.handle(Command::Load("x.csv".into())).await;
        assert!(text.contains("only available in upload mode"));

        s.handle(Command::Mode(Mode::Upload)).await;
        let text = s.handle(Command::Set(FieldKey::SlopeAngle, "10".into())).await;
        assert!(text.contains("only available in manual mode"));

        let text = s.handle(Command::Mode(Mode::Manual)).await;
        assert!(text.contains("Slope angle: 30 degrees"), "{text}");
    }

    #[tokio::test]
    async fn test_upload_renders_aggregates() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);
        let file = csv_file(
            "precipitation,soilType,slopeAngle,vegetationCover\n100,clay,20,60\n200,sand,40,40\n",
        );

        s.handle(Command::Mode(Mode::Upload)).await;
        let text = s.handle(Command::Load(file.path().to_path_buf())).await;
        assert!(text.starts_with("File contents\nprecipitation | soilType"), "{text}");
        assert!(text.contains("Average precipitation: 150 mm"), "{text}");
        assert!(text.contains("Maximum slope angle: 40 degrees"), "{text}");
        assert!(text.contains("Average vegetation cover: 50 %"), "{text}");
    }

    #[tokio::test]
    async fn test_upload_errors_are_messages() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);
        s.handle(Command::Mode(Mode::Upload)).await;

        let missing = csv_file("precipitation,slopeAngle\n1,2\n");
        let text = s.handle(Command::Load(missing.path().to_path_buf())).await;
        assert_eq!(text, "Error: file is missing required columns: soilType, vegetationCover");

        let garbage = csv_file("");
        std::fs::write(garbage.path(), [0xc3, 0x28, 0xa0, 0xa1]).unwrap();
        let text = s.handle(Command::Load(garbage.path().to_path_buf())).await;
        assert!(text.starts_with("Error: could not parse file"), "{text}");

        let outcomes: Vec<Outcome> = s.history().iter().map(|l| l.outcome).collect();
        assert_eq!(outcomes, vec![Outcome::SchemaError, Outcome::ParseError]);
    }

    #[tokio::test]
    async fn test_unreadable_uploads_are_file_errors() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);
        s.handle(Command::Mode(Mode::Upload)).await;

        let text = s.handle(Command::Load(PathBuf::from("factors.xlsx"))).await;
        assert!(text.starts_with("Error: unsupported file type 'xlsx'"), "{text}");
        let text = s.handle(Command::Load(PathBuf::from("/nonexistent/factors.csv"))).await;
        assert!(text.starts_with("Error: could not read file"), "{text}");

        let outcomes: Vec<Outcome> = s.history().iter().map(|l| l.outcome).collect();
        assert_eq!(outcomes, vec![Outcome::FileError, Outcome::FileError]);
    }

    #[tokio::test]
    async fn test_chinese_locale() {
        let server = MockServer::start_async().await;
        let mut s = session(&server, None);
        s.handle(Command::Lang(Locale::Zh)).await;
        let text = s.handle(Command::Show).await;
        assert!(text.contains("降雨量: 100 mm"), "{text}");
        assert!(text.contains("粘土 土壤"), "{text}");
    }

    #[test]
    fn test_summary_hides_key() {
        let proxy = QueryProxy::new("http://127.0.0.1:1/", 1, Duration::from_secs(1));
        let s = Session::with_proxy(proxy, Locale::En, Some("sk-secret".into()));
        let text = s.summary();
        assert!(text.contains("API key: set"));
        assert!(!text.contains("sk-secret"));
    }
}
