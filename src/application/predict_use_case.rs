// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// One request per invocation, terminal on the first error:
//
//   LOAD_ARTIFACT → PARSE_ARGS → PARSE_JSON → VALIDATE_TEXT
//     → RUN_MODEL → EMIT_RESULT
//
// The artifact directory is checked before anything is loaded.
// The result goes to the primary channel as one JSON line; any
// error goes to the diagnostic channel as one `{"error": ...}`
// line. Progress is narrated through tracing (stderr).

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

use crate::domain::traits::{ClassifierLoader, QuestionClassifier};

/// Every way a prediction request can fail.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model artifact directory not found: {0}")]
    ArtifactNotFound(String),

    #[error("no request received; pass a JSON object such as {{\"text\": \"...\"}}")]
    MissingInput,

    #[error("failed to parse request JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PredictError {
    fn unexpected(e: anyhow::Error) -> Self {
        PredictError::Unexpected(format!("{e:#}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictResponse {
    /// The trimmed request text
    pub text:       String,
    pub prediction: i64,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

/// `{"text": <non-blank string>}` → trimmed text.
pub fn validate_request(value: Value) -> Result<String, PredictError> {
    let Value::Object(map) = value else {
        return Err(PredictError::InvalidRequest("request must be a JSON object with a 'text' key".into()));
    };
    let text = match map.get("text") {
        Some(Value::String(text)) => text.trim(),
        Some(_) => return Err(PredictError::InvalidRequest("'text' must be a string".into())),
        None    => return Err(PredictError::InvalidRequest("request must contain the 'text' key".into())),
    };
    if text.is_empty() {
        return Err(PredictError::InvalidRequest("please provide non-empty text to classify".into()));
    }
    Ok(text.to_string())
}

// ─── OutputChannels ──────────────────────────────────────────────────────────
/// Where results (primary) and errors (diagnostic) are written.
pub struct OutputChannels<O: Write, D: Write> {
    pub primary:    O,
    pub diagnostic: D,
}

impl OutputChannels<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, D: Write> OutputChannels<O, D> {
    pub fn new(primary: O, diagnostic: D) -> Self {
        Self { primary, diagnostic }
    }

    /// One JSON line on the primary channel. serde_json leaves
    /// non-ASCII text unescaped.
    pub fn emit_result(&mut self, response: &PredictResponse) -> io::Result<()> {
        write_line(&mut self.primary, response)
    }

    /// One `{"error": ...}` line on the diagnostic channel.
    pub fn emit_error(&mut self, error: &PredictError) -> io::Result<()> {
        write_line(&mut self.diagnostic, &ErrorResponse { error: &error.to_string() })
    }
}

fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    out.flush()
}

// ─── PredictUseCase ──────────────────────────────────────────────────────────
pub struct PredictUseCase<L: ClassifierLoader> {
    loader: L,
}

impl<L: ClassifierLoader> PredictUseCase<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn run(&self, artifact_dir: Option<&Path>, request: Option<&str>) -> Result<PredictResponse, PredictError> {
        // ── LOAD_ARTIFACT ─────────────────────────────────────────────────────
        let dir = match artifact_dir {
            Some(dir) if dir.is_dir() => dir,
            Some(dir) => return Err(PredictError::ArtifactNotFound(dir.display().to_string())),
            None      => return Err(PredictError::ArtifactNotFound("no artifact directory configured".into())),
        };
        tracing::info!("Loading model from '{}'", dir.display());
        let classifier = self.loader.load(dir).map_err(PredictError::unexpected)?;
        tracing::info!("Model loaded");

        // ── PARSE_ARGS ────────────────────────────────────────────────────────
        let raw = request.ok_or(PredictError::MissingInput)?;
        tracing::info!("Received request: {}", raw);

        // ── PARSE_JSON ────────────────────────────────────────────────────────
        let value: Value = serde_json::from_str(raw)?;
        tracing::debug!("Request JSON parsed");

        // ── VALIDATE_TEXT ─────────────────────────────────────────────────────
        let text = validate_request(value)?;

        // ── RUN_MODEL ─────────────────────────────────────────────────────────
        tracing::info!("Classifying text");
        let label = classifier.classify(&text).map_err(PredictError::unexpected)?;
        tracing::info!("Prediction: {}", label);

        Ok(PredictResponse { text, prediction: label.index() })
    }

    /// Run and emit to `channels`; true when a result was emitted.
    pub fn respond<O: Write, D: Write>(
        &self,
        artifact_dir: Option<&Path>,
        request:      Option<&str>,
        channels:     &mut OutputChannels<O, D>,
    ) -> io::Result<bool> {
        match self.run(artifact_dir, request) {
            Ok(response) => {
                channels.emit_result(&response)?;
                Ok(true)
            }
            Err(error) => {
                tracing::debug!("Request failed: {error:?}");
                channels.emit_error(&error)?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Label;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Labels any text containing a digit as arithmetic.
    struct DigitClassifier;

    impl QuestionClassifier for DigitClassifier {
        fn classify(&self, text: &str) -> anyhow::Result<Label> {
            Ok(if text.chars().any(|c| c.is_numeric()) { Label::Arithmetic } else { Label::Textual })
        }
    }

    #[derive(Default)]
    struct FakeLoader {
        calls: Cell<usize>,
        fail:  bool,
    }

    impl ClassifierLoader for &FakeLoader {
        type Classifier = DigitClassifier;

        fn load(&self, _dir: &Path) -> anyhow::Result<DigitClassifier> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                anyhow::bail!("weights are corrupt");
            }
            Ok(DigitClassifier)
        }
    }

    fn run(request: Option<&str>) -> Result<PredictResponse, PredictError> {
        let temp   = TempDir::new().unwrap();
        let loader = FakeLoader::default();
        PredictUseCase::new(&loader).run(Some(temp.path()), request)
    }

    #[test]
    fn test_arithmetic_question() {
        let response = run(Some(r#"{"text": "  ما هو ناتج ضرب 5 × 4؟ "}"#)).unwrap();
        assert_eq!(response.text, "ما هو ناتج ضرب 5 × 4؟");
        assert_eq!(response.prediction, 1);
    }

    #[test]
    fn test_textual_question() {
        let response = run(Some(r#"{"text": "اذكر عاصمة فرنسا."}"#)).unwrap();
        assert_eq!(response.prediction, 0);
    }

    #[test]
    fn test_rejects_invalid_requests() {
        for request in [r#"{}"#, r#"{"text": ""}"#, r#"{"text": "   "}"#, r#""hello""#, "42", "[1,2]", r#"{"text": 7}"#] {
            assert!(
                matches!(run(Some(request)), Err(PredictError::InvalidRequest(_))),
                "expected InvalidRequest for {request}"
            );
        }
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(run(Some("not-json")), Err(PredictError::InvalidJson(_))));
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(run(None), Err(PredictError::MissingInput)));
    }

    #[test]
    fn test_missing_artifact_checked_before_load() {
        let temp   = TempDir::new().unwrap();
        let loader = FakeLoader::default();
        let uc     = PredictUseCase::new(&loader);

        let missing = temp.path().join("trained_model");
        assert!(matches!(uc.run(Some(&missing), Some(r#"{"text": "x"}"#)), Err(PredictError::ArtifactNotFound(_))));
        assert!(matches!(uc.run(None, None), Err(PredictError::ArtifactNotFound(_))));
        assert_eq!(loader.calls.get(), 0);
    }

    #[test]
    fn test_load_failure_is_unexpected() {
        let temp   = TempDir::new().unwrap();
        let loader = FakeLoader { fail: true, ..FakeLoader::default() };
        let err    = PredictUseCase::new(&loader).run(Some(temp.path()), Some(r#"{"text": "x"}"#)).unwrap_err();
        assert!(matches!(err, PredictError::Unexpected(_)));
        assert!(err.to_string().contains("weights are corrupt"));
    }

    #[test]
    fn test_respond_routes_channels() {
        let temp   = TempDir::new().unwrap();
        let loader = FakeLoader::default();
        let uc     = PredictUseCase::new(&loader);

        let mut ok = OutputChannels::new(Vec::<u8>::new(), Vec::<u8>::new());
        assert!(uc.respond(Some(temp.path()), Some(r#"{"text": "عرف عملية التمثيل الضوئي."}"#), &mut ok).unwrap());
        let line = String::from_utf8(ok.primary).unwrap();
        assert_eq!(line, "{\"text\":\"عرف عملية التمثيل الضوئي.\",\"prediction\":0}\n");
        assert!(ok.diagnostic.is_empty());

        let mut bad = OutputChannels::new(Vec::<u8>::new(), Vec::<u8>::new());
        assert!(!uc.respond(Some(temp.path()), Some(r#"{"text": ""}"#), &mut bad).unwrap());
        assert!(bad.primary.is_empty());
        let err: Value = serde_json::from_slice(&bad.diagnostic).unwrap();
        assert!(err["error"].as_str().unwrap().contains("non-empty"));
    }
}
