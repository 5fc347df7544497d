//! Step counters embedded in deployment tool output.
//!
//! The tool prints lines such as
//! `app-stack |  3/12 | 10:41:07 AM | CREATE_COMPLETE | AWS::IAM::Role | Role`
//! while it works through a stack. Only the `<n>/<m>` column is interpreted.

use once_cell::sync::Lazy;
use regex::Regex;

static STEP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^|]*\|\s*(\d+)/(\d+)\s*\|").expect("Valid regex pattern"));

/// Step counters parsed from one progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    pub current: u32,
    pub total: u32,
}

/// Parse the step counters out of a progress line, if it is one
pub fn parse_line(line: &str) -> Option<StepProgress> {
    let captures = STEP_PATTERN.captures(line)?;
    let current = captures.get(1)?.as_str().parse().ok()?;
    let total = captures.get(2)?.as_str().parse().ok()?;
    Some(StepProgress { current, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_resource_progress_line() {
        let line = "app-stack |  3/12 | 10:41:07 AM | CREATE_COMPLETE      | AWS::IAM::Role | Role";
        assert_eq!(
            parse_line(line),
            Some(StepProgress {
                current: 3,
                total: 12
            })
        );
    }

    #[test]
    fn test_parses_without_padding() {
        assert_eq!(
            parse_line("net|1/4|UPDATE_IN_PROGRESS"),
            Some(StepProgress {
                current: 1,
                total: 4
            })
        );
    }

    #[test]
    fn test_ignores_free_form_output() {
        assert_eq!(parse_line("app-stack: deploying..."), None);
        assert_eq!(parse_line(" ✅  app-stack"), None);
        assert_eq!(parse_line("Outputs:"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_counter_must_be_first_column() {
        assert_eq!(parse_line("a | b | 3/4 |"), None);
    }

    #[test]
    fn test_overflowing_counter_is_not_progress() {
        assert_eq!(parse_line("app | 99999999999/1 |"), None);
    }
}
