//! Predict stage: `processed/clean.parquet` -> `processed/predictions.parquet`
//!
//! A [`SentimentModel`] produces a free-form completion per review; the
//! completion is normalized with [`parse_label`], so a model never has to
//! emit canonical labels itself.

use std::path::PathBuf;

use tracing::{debug, info};

use rsm_common::config::DataPaths;
use rsm_common::review::LabeledReview;
use rsm_common::snapshot::{read_labeled_reviews, write_labeled_reviews};
use rsm_common::{parse_label, Label};

use crate::error::{PipelineError, Result};

/// Text classifier producing raw, unnormalized output
pub trait SentimentModel {
    fn name(&self) -> &str;

    /// Raw completion for one cleaned review text
    fn complete(&self, text: &str) -> String;

    /// Canonical label for one cleaned review text
    fn predict(&self, text: &str) -> Label {
        parse_label(Some(&self.complete(text)))
    }
}

/// Keyword-lexicon model for Spanish restaurant reviews
///
/// Counts positive and negative cues; phrases are matched as whole-token
/// sequences so "no lo recomiendo" never counts as praise.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    positive: Vec<Vec<String>>,
    negative: Vec<Vec<String>>,
}

const POSITIVE_CUES: &[&str] = &[
    "excelente",
    "deliciosa",
    "delicioso",
    "increíble",
    "encantó",
    "encanta",
    "amable",
    "perfectas",
    "perfecto",
    "muy buena",
    "muy bueno",
    "limpio",
    "volveré",
    "rico",
    "sabroso",
];

const NEGATIVE_CUES: &[&str] = &[
    "fría",
    "frío",
    "lento",
    "mala",
    "malo",
    "grosero",
    "caro",
    "no tenía sabor",
    "no lo recomiendo",
    "horrible",
    "sucio",
    "pésimo",
];

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new(POSITIVE_CUES, NEGATIVE_CUES)
    }
}

impl LexiconModel {
    pub fn new(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|c| tokenize(c)).collect(),
            negative: negative.iter().map(|c| tokenize(c)).collect(),
        }
    }

    /// (positive hits, negative hits)
    pub fn score(&self, text: &str) -> (usize, usize) {
        let tokens = tokenize(text);
        (
            count_cues(&tokens, &self.positive),
            count_cues(&tokens, &self.negative),
        )
    }
}

impl SentimentModel for LexiconModel {
    fn name(&self) -> &str {
        "lexicon-es"
    }

    fn complete(&self, text: &str) -> String {
        let (positive, negative) = self.score(text);
        let verdict = match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => "positivo",
            std::cmp::Ordering::Less => "negativo",
            std::cmp::Ordering::Equal => "neutro",
        };
        format!("Etiqueta: {}", verdict)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn count_cues(tokens: &[String], cues: &[Vec<String>]) -> usize {
    cues.iter()
        .filter(|cue| !cue.is_empty())
        .map(|cue| tokens.windows(cue.len()).filter(|w| *w == cue.as_slice()).count())
        .sum()
}

/// Attach a model label to every review
pub fn predict_reviews(model: &dyn SentimentModel, reviews: Vec<LabeledReview>) -> Vec<LabeledReview> {
    reviews
        .into_iter()
        .map(|review| {
            let label = model.predict(&review.review.text_clean);
            review.with_prediction(label)
        })
        .collect()
}

/// Label `processed/clean.parquet` into `processed/predictions.parquet`
pub fn run_predict(paths: &DataPaths, model: &dyn SentimentModel) -> Result<PathBuf> {
    let source = paths.clean_snapshot();
    if !source.is_file() {
        return Err(PipelineError::MissingInput(format!(
            "{} does not exist",
            source.display()
        )));
    }

    let reviews = read_labeled_reviews(&source)?;
    debug!("Predicting {} reviews with {}", reviews.len(), model.name());
    let predicted = predict_reviews(model, reviews);

    let target = paths.predictions_snapshot();
    write_labeled_reviews(&target, &predicted)?;
    info!("Saved {} | rows={}", target.display(), predicted.len());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOLS: [(&str, Label); 9] = [
        ("Excelente servicio y la comida estuvo deliciosa, volveré pronto.", Label::Positive),
        ("Muy buena atención, el sabor fue increíble y las porciones perfectas.", Label::Positive),
        ("Me encantó el lugar, todo limpio y el staff muy amable.", Label::Positive),
        ("La comida llegó fría y el servicio fue muy lento.", Label::Negative),
        ("Mala experiencia, el personal fue grosero y la comida no tenía sabor.", Label::Negative),
        ("Demasiado caro para lo que ofrecen, no lo recomiendo.", Label::Negative),
        ("El lugar está bien, nada extraordinario pero cumple.", Label::Neutral),
        ("La comida estuvo normal, el servicio aceptable.", Label::Neutral),
        ("Una experiencia promedio, podría mejorar.", Label::Neutral),
    ];

    #[test]
    fn test_lexicon_matches_review_pools() {
        let model = LexiconModel::default();
        for (text, expected) in POOLS {
            assert_eq!(model.predict(text), expected, "{}", text);
        }
    }

    #[test]
    fn test_phrases_match_whole_tokens() {
        let model = LexiconModel::default();
        assert_eq!(model.score("no lo recomiendo"), (0, 1));
        assert_eq!(model.score("carolina"), (0, 0));
        assert_eq!(model.score("MUY BUENA, muy buena"), (2, 0));
    }

    #[test]
    fn test_completion_is_free_form() {
        let model = LexiconModel::default();
        assert_eq!(model.complete("excelente"), "Etiqueta: positivo");
        assert_eq!(model.complete(""), "Etiqueta: neutro");
    }

    struct Echo;

    impl SentimentModel for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete(&self, text: &str) -> String {
            text.to_string()
        }
    }

    #[test]
    fn test_unrecognized_completion_is_neutral() {
        assert_eq!(Echo.predict("¯\\_(ツ)_/¯"), Label::Neutral);
        assert_eq!(Echo.predict("NEGATIVE!!"), Label::Negative);
    }

    #[test]
    fn test_run_predict_without_clean_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_predict(&DataPaths::new(dir.path()), &LexiconModel::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
