//! Tag conventions understood by the translator.

use crate::model::Tag;
use crate::story::{DriverSelection, TestTag};

/// Prefix of the tag selecting a test driver for a feature.
pub const DRIVER_TAG_PREFIX: &str = "@driver:";

/// Determine the driver requested through `@driver:<name>` tags.
///
/// Every tag is inspected and the last match wins, even when its name is
/// empty.
///
/// # Examples
/// ```
/// use rstest_bdd_story::model::Tag;
/// use rstest_bdd_story::story::DriverSelection;
/// use rstest_bdd_story::tags::requested_driver;
///
/// let tags = [Tag::new("@driver:chrome"), Tag::new("@wip"), Tag::new("@driver:firefox")];
/// assert_eq!(requested_driver(&tags), DriverSelection::Named("firefox".into()));
/// ```
#[must_use]
pub fn requested_driver(tags: &[Tag]) -> DriverSelection {
    let mut requested = None;
    for tag in tags {
        if let Some(name) = tag.name().strip_prefix(DRIVER_TAG_PREFIX) {
            requested = Some(name);
        }
    }
    requested.map_or(DriverSelection::Default, DriverSelection::from_name)
}

/// Convert runner tags to report tags, dropping exactly one leading marker
/// character from each.
///
/// # Examples
/// ```
/// use rstest_bdd_story::model::Tag;
/// use rstest_bdd_story::tags::convert_tags;
///
/// let converted = convert_tags(&[Tag::new("@regression")]);
/// assert_eq!(converted[0].name(), "regression");
/// ```
#[must_use]
pub fn convert_tags(tags: &[Tag]) -> Vec<TestTag> {
    tags.iter()
        .map(|tag| {
            let mut chars = tag.name().chars();
            chars.next();
            TestTag::with_value(chars.as_str())
        })
        .collect()
}
