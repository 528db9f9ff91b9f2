//! Report-side identities: stories, test tags and driver selections.

use std::fmt;

use serde::Serialize;

/// A story groups the tests of one feature in the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Story {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative: Option<String>,
}

impl Story {
    /// Create a story for a feature.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::story::Story;
    ///
    /// let story = Story::new("basket", "Basket").with_narrative("As a shopper");
    /// assert_eq!(story.name(), "Basket");
    /// assert_eq!(story.narrative(), Some("As a shopper"));
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            narrative: None,
        }
    }

    /// Attach narrative text.
    #[must_use]
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    /// Story identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Story title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Narrative text, when the feature carried a description.
    #[must_use]
    pub fn narrative(&self) -> Option<&str> {
        self.narrative.as_deref()
    }
}

const DEFAULT_TAG_TYPE: &str = "tag";

/// A tag attached to a test in the report.
///
/// Values of the form `type:name` carry an explicit type; any other value is
/// a plain `tag`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TestTag {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

impl TestTag {
    /// Build a tag from its textual value.
    ///
    /// # Examples
    /// ```
    /// use rstest_bdd_story::story::TestTag;
    ///
    /// let plain = TestTag::with_value("smoke");
    /// assert_eq!((plain.kind(), plain.name()), ("tag", "smoke"));
    ///
    /// let typed = TestTag::with_value("component:checkout");
    /// assert_eq!((typed.kind(), typed.name()), ("component", "checkout"));
    /// ```
    #[must_use]
    pub fn with_value(value: &str) -> Self {
        match value.split_once(':') {
            Some((kind, name)) if !kind.is_empty() && !name.is_empty() => Self {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            _ => Self {
                kind: DEFAULT_TAG_TYPE.to_string(),
                name: value.to_string(),
            },
        }
    }

    /// Tag type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == DEFAULT_TAG_TYPE {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.kind, self.name)
        }
    }
}

/// Test driver requested for a feature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "driver", content = "name")]
pub enum DriverSelection {
    /// No driver tag, or an empty driver name: use the configured default.
    #[default]
    Default,
    /// A driver requested by name through a `@driver:<name>` tag.
    Named(String),
}

impl DriverSelection {
    /// Select a driver by name; an empty name selects the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() {
            Self::Default
        } else {
            Self::Named(name.to_string())
        }
    }

    /// Requested driver name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for DriverSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("default"))
    }
}
