//! Step title normalisation.
//!
//! Runners escape braces in step text to private-use placeholders so the text
//! cannot clash with report templating. Titles are rendered back with literal
//! braces before they reach the report.

/// Placeholder standing in for `{`.
pub const OPEN_PARAM_CHAR: char = '\u{FF5F}';
/// Placeholder standing in for `}`.
pub const CLOSE_PARAM_CHAR: char = '\u{FF60}';

/// Replace parameter placeholders with literal braces.
///
/// # Examples
/// ```
/// use rstest_bdd_story::title::normalized;
///
/// assert_eq!(normalized("Given a \u{FF5F}name\u{FF60}"), "Given a {name}");
/// ```
#[must_use]
pub fn normalized(title: &str) -> String {
    title
        .chars()
        .map(|character| match character {
            OPEN_PARAM_CHAR => '{',
            CLOSE_PARAM_CHAR => '}',
            other => other,
        })
        .collect()
}
