// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits so the
// inference state machine can be exercised without a model and
// the training pipeline without a particular example source.
//
// Implementations:
//   ExampleSource       → BuiltinExamples, JsonlExampleLoader (Layer 4)
//   QuestionClassifier  → Inferencer (Layer 5)
//   ClassifierLoader    → ArtifactLoader (Layer 5)

use anyhow::Result;
use std::path::Path;

use crate::domain::example::{Example, Label};

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can provide labelled examples.
pub trait ExampleSource {
    fn load_all(&self) -> Result<Vec<Example>>;
}

// ─── QuestionClassifier ───────────────────────────────────────────────────────
/// Any component that can label a single question.
pub trait QuestionClassifier {
    fn classify(&self, text: &str) -> Result<Label>;
}

// ─── ClassifierLoader ─────────────────────────────────────────────────────────
/// Builds a classifier from a trained artifact directory.
pub trait ClassifierLoader {
    type Classifier: QuestionClassifier;

    fn load(&self, artifact_dir: &Path) -> Result<Self::Classifier>;
}
