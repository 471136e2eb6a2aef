// ============================================================
// Layer 4 — Example Loaders
// ============================================================
// Two sources of labelled questions:
//   BuiltinExamples     — the fixed five-question table the
//                         classifier ships with
//   JsonlExampleLoader  — one {"text": ..., "label": 0|1} object
//                         per line, blank lines ignored
//
// Both implement the ExampleSource trait from Layer 3, and both
// run the same validation so bad labels never reach the trainer.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::example::{Example, Label};
use crate::domain::traits::ExampleSource;

/// The fixed in-memory training table.
pub struct BuiltinExamples;

impl ExampleSource for BuiltinExamples {
    fn load_all(&self) -> Result<Vec<Example>> {
        Ok(vec![
            Example::new("اشرح مفهوم الطاقة الحركية.", Label::Textual),
            Example::new("ما هو ناتج ضرب 5 × 4؟",      Label::Arithmetic),
            Example::new("اذكر عاصمة فرنسا.",          Label::Textual),
            Example::new("ما هي قوانين نيوتن للحركة؟", Label::Textual),
            Example::new("عرف عملية التمثيل الضوئي.",  Label::Textual),
        ])
    }
}

/// Reads examples from a JSON-lines file.
pub struct JsonlExampleLoader {
    path: PathBuf,
}

impl JsonlExampleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ExampleSource for JsonlExampleLoader {
    fn load_all(&self) -> Result<Vec<Example>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read dataset '{}'", self.path.display()))?;

        let mut examples = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let ex: Example = serde_json::from_str(line).with_context(|| {
                format!("Failed to parse line {} of '{}'", idx + 1, self.path.display())
            })?;
            validate_example(&ex).with_context(|| format!("Line {}", idx + 1))?;
            examples.push(ex);
        }

        tracing::info!("Loaded {} examples from '{}'", examples.len(), self.path.display());
        Ok(examples)
    }
}

/// Reject examples the classifier cannot learn from.
pub fn validate_example(ex: &Example) -> Result<()> {
    if ex.text.trim().is_empty() {
        bail!("example text is empty");
    }
    if ex.label().is_none() {
        bail!("label {} is not 0 (textual) or 1 (arithmetic)", ex.label);
    }
    Ok(())
}
