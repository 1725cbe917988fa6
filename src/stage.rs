use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Production stages an order moves through, in fixed total order.
///
/// Orders start in `PatternCutting` and finish in `Completed`. The transition
/// surface deliberately accepts any target stage, including regressions; the
/// pipeline order only drives progress rendering and the derived completion
/// flag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    PatternCutting,
    Assembly,
    SewingSeams,
    Finishing,
    Completed,
}

/// Rendering state of a candidate stage relative to the order's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageProgress {
    Done,
    Current,
    Pending,
}

impl Stage {
    /// Initial stage assigned at order creation.
    pub const INITIAL: Stage = Stage::PatternCutting;

    /// The full pipeline in production order.
    pub fn pipeline() -> impl Iterator<Item = Stage> {
        Stage::iter()
    }

    /// Zero-based position in the pipeline.
    pub fn index(self) -> usize {
        Stage::iter().position(|s| s == self).unwrap_or(0)
    }

    /// Whether this stage is the terminal one; drives `is_completed`.
    pub fn is_terminal(self) -> bool {
        self == Stage::Completed
    }

    /// Display label, e.g. "Pattern Cutting".
    pub fn label(self) -> &'static str {
        match self {
            Stage::PatternCutting => "Pattern Cutting",
            Stage::Assembly => "Assembly",
            Stage::SewingSeams => "Sewing Seams",
            Stage::Finishing => "Finishing",
            Stage::Completed => "Completed",
        }
    }

    /// Pure progress predicate: given the current stage, classify a candidate
    /// stage as done (before current), current, or pending (after current).
    pub fn progress(current: Stage, candidate: Stage) -> StageProgress {
        match candidate.index().cmp(&current.index()) {
            std::cmp::Ordering::Less => StageProgress::Done,
            std::cmp::Ordering::Equal => StageProgress::Current,
            std::cmp::Ordering::Greater => StageProgress::Pending,
        }
    }

    /// Parses a stage identifier, surfacing a caller-friendly error message
    /// listing valid values.
    pub fn parse(value: &str) -> Result<Stage, crate::errors::ServiceError> {
        value.parse::<Stage>().map_err(|_| {
            crate::errors::ServiceError::InvalidStatus(format!(
                "Unknown stage: {value}. Valid stages are: {}",
                Stage::iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let stages: Vec<Stage> = Stage::pipeline().collect();
        assert_eq!(
            stages,
            vec![
                Stage::PatternCutting,
                Stage::Assembly,
                Stage::SewingSeams,
                Stage::Finishing,
                Stage::Completed,
            ]
        );
        assert_eq!(Stage::INITIAL, stages[0]);
        assert!(stages.last().unwrap().is_terminal());
    }

    #[test]
    fn snake_case_round_trip() {
        assert_eq!(Stage::SewingSeams.to_string(), "sewing_seams");
        assert_eq!("pattern_cutting".parse::<Stage>().unwrap(), Stage::PatternCutting);
        assert!(Stage::parse("ironing").is_err());
    }

    #[test]
    fn progress_yields_exactly_one_current() {
        for current in Stage::pipeline() {
            let c = current.index();
            let mut currents = 0;
            for candidate in Stage::pipeline() {
                let p = Stage::progress(current, candidate);
                match p {
                    StageProgress::Done => assert!(candidate.index() < c),
                    StageProgress::Current => {
                        currents += 1;
                        assert_eq!(candidate, current);
                    }
                    StageProgress::Pending => assert!(candidate.index() > c),
                }
            }
            assert_eq!(currents, 1);
        }
    }

    #[test]
    fn only_completed_is_terminal() {
        for stage in Stage::pipeline() {
            assert_eq!(stage.is_terminal(), stage == Stage::Completed);
        }
    }
}
