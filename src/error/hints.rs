//! Remediation hints for well-known failure messages.
//!
//! Monitors never add user-facing advice to their errors. The binary looks the
//! rendered error chain up here and prints the suggestion underneath.

/// Known failure substrings and the action that usually fixes them.
const HINTS: &[(&str, &str)] = &[
    (
        "ExpiredToken",
        "Your cloud credentials have expired. Refresh them (e.g. `aws sso login`) and retry.",
    ),
    (
        "security token included in the request is invalid",
        "The configured profile has invalid credentials. Check `--profile` and your credentials file.",
    ),
    (
        "has not been bootstrapped",
        "The target environment is not bootstrapped. Run `cdk bootstrap` for the account and region.",
    ),
    (
        "Rate exceeded",
        "The provider is throttling requests. Wait a moment, then retry.",
    ),
    (
        "Throttling",
        "The provider is throttling requests. Wait a moment, then retry.",
    ),
    (
        "Command not found",
        "The deployment tool is not installed or not on PATH. Install it or set `[deploy] program`.",
    ),
    (
        "does not exist",
        "The named resource could not be found. Check the identifier and the selected region.",
    ),
];

/// Return a remediation hint for an error message, if one is known.
pub fn suggestion_for(message: &str) -> Option<&'static str> {
    HINTS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, hint)| *hint)
}
