use tracing::{debug, instrument};

use super::{
    models::{ScoreField, ScoreIssue, ScoreSide, ScoreValidation, ScoreWarning, Severity},
    rules, ScoreRules,
};

/// Score differences above this are flagged as lopsided
const LOPSIDED_DIFFERENCE: i32 = 15;
/// Round scores are only suspicious beyond regulation length
const ROUND_NUMBER_FLOOR: i32 = 25;

/// Validates final score pairs against the rules of the game.
///
/// Validation is referentially transparent: the same pair always yields the
/// same result and nothing outside the returned value is touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreValidator {
    rules: ScoreRules,
}

impl ScoreValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ScoreRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    #[instrument(skip(self))]
    pub fn validate(&self, score_a: i32, score_b: i32) -> ScoreValidation {
        let errors = self.rule_violations(score_a, score_b);

        if !errors.is_empty() {
            debug!(error_count = errors.len(), "Score pair rejected");
            return ScoreValidation {
                is_valid: false,
                errors,
                warnings: Vec::new(),
                winner: None,
                confidence: 0,
            };
        }

        let warnings = suspicious_patterns(score_a, score_b);
        let penalty: u32 = warnings.iter().map(|w| w.severity.penalty() as u32).sum();
        let confidence = (rules::BASE_CONFIDENCE as u32).saturating_sub(penalty) as u8;

        let winner = if score_a > score_b {
            ScoreSide::First
        } else {
            ScoreSide::Second
        };

        debug!(
            warning_count = warnings.len(),
            confidence, "Score pair accepted"
        );

        ScoreValidation {
            is_valid: true,
            errors,
            warnings,
            winner: Some(winner),
            confidence,
        }
    }

    fn rule_violations(&self, score_a: i32, score_b: i32) -> Vec<ScoreIssue> {
        let mut errors = Vec::new();

        if score_a < 0 {
            errors.push(ScoreIssue::new(
                ScoreField::First,
                "score must be a non-negative integer",
            ));
        }
        if score_b < 0 {
            errors.push(ScoreIssue::new(
                ScoreField::Second,
                "score must be a non-negative integer",
            ));
        }

        let ceiling = self.rules.max_reasonable_score;
        if score_a > ceiling {
            errors.push(ScoreIssue::new(
                ScoreField::First,
                format!("score above {} is unreasonable", ceiling),
            ));
        }
        if score_b > ceiling {
            errors.push(ScoreIssue::new(
                ScoreField::Second,
                format!("score above {} is unreasonable", ceiling),
            ));
        }

        if score_a < 0 || score_b < 0 {
            return errors;
        }

        if score_a == score_b {
            errors.push(ScoreIssue::new(
                ScoreField::Both,
                "tied scores are not allowed",
            ));
            return errors;
        }

        let high = score_a.max(score_b);
        let low = score_a.min(score_b);

        if high < self.rules.min_winning_score {
            errors.push(ScoreIssue::new(
                ScoreField::Both,
                format!(
                    "winning score must be at least {}",
                    self.rules.min_winning_score
                ),
            ));
        }
        if high - low < self.rules.min_win_margin {
            errors.push(ScoreIssue::new(
                ScoreField::Both,
                format!("winner must lead by at least {}", self.rules.min_win_margin),
            ));
        }

        errors
    }
}

fn suspicious_patterns(score_a: i32, score_b: i32) -> Vec<ScoreWarning> {
    let high = score_a.max(score_b);
    let low = score_a.min(score_b);
    let mut warnings = Vec::new();

    if is_repdigit(score_a) && is_repdigit(score_b) {
        warnings.push(ScoreWarning {
            severity: Severity::Low,
            message: format!("both scores repeat a single digit ({}-{})", score_a, score_b),
        });
    }

    if [score_a, score_b]
        .iter()
        .any(|&s| s > ROUND_NUMBER_FLOOR && s % 5 == 0)
    {
        warnings.push(ScoreWarning {
            severity: Severity::Low,
            message: format!(
                "round score above {} ({}-{})",
                ROUND_NUMBER_FLOOR, score_a, score_b
            ),
        });
    }

    if high - low > LOPSIDED_DIFFERENCE {
        warnings.push(ScoreWarning {
            severity: Severity::Medium,
            message: format!("score difference of {} is unusually large", high - low),
        });
    }

    if low == 0 && high >= rules::MIN_WINNING_SCORE {
        warnings.push(ScoreWarning {
            severity: Severity::High,
            message: "shutout result".to_string(),
        });
    }

    warnings
}

/// Two or more digits, all identical (11, 22, 33, 44)
fn is_repdigit(score: i32) -> bool {
    if score < 10 {
        return false;
    }
    let digits = score.to_string();
    let first = digits.as_bytes()[0];
    digits.bytes().all(|b| b == first)
}
