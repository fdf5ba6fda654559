use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub name: String,
}

impl Archive {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Metadata row for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub archive: String,
    pub filename: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub license: Option<String>,
    /// `Some(true)` hides the source from the manifest. `Some(false)` and
    /// `None` are both visible.
    pub hidden: Option<bool>,
}

impl Source {
    pub fn new(id: i64, archive: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id,
            archive: archive.into(),
            filename: filename.into(),
            description: None,
            tags: None,
            license: None,
            hidden: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.hidden != Some(true)
    }

    /// Description as published: falls back to the filename.
    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.filename,
        }
    }

    /// Path relative to the uploads root, as served to consumers.
    pub fn url(&self) -> String {
        format!("{}/{}", self.archive, self.filename)
    }
}

/// Requested change to the visibility flag.
///
/// `Indeterminate` leaves the column untouched; the other two always write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Indeterminate,
    Hidden,
    Visible,
}

impl Visibility {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Visibility::Indeterminate => None,
            Visibility::Hidden => Some(true),
            Visibility::Visible => Some(false),
        }
    }
}

/// Sparse metadata edit for a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUpdate {
    pub description: Option<String>,
    pub tags: Option<String>,
    pub license: Option<String>,
    pub visibility: Visibility,
}

impl SourceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn tags(mut self, value: impl Into<String>) -> Self {
        self.tags = Some(value.into());
        self
    }

    pub fn license(mut self, value: impl Into<String>) -> Self {
        self.license = Some(value.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_falls_back_to_filename() {
        let mut source = Source::new(1, "demo", "a.txt");
        assert_eq!(source.display_description(), "a.txt");

        source.description = Some(String::new());
        assert_eq!(source.display_description(), "a.txt");

        source.description = Some("First file".into());
        assert_eq!(source.display_description(), "First file");
    }

    #[test]
    fn visibility_is_tri_state() {
        let mut source = Source::new(1, "demo", "a.txt");
        assert!(source.is_visible());
        source.hidden = Some(false);
        assert!(source.is_visible());
        source.hidden = Some(true);
        assert!(!source.is_visible());
    }

    #[test]
    fn url_joins_archive_and_filename() {
        let source = Source::new(1, "demo", "a.txt");
        assert_eq!(source.url(), "demo/a.txt");
    }

    #[test]
    fn visibility_maps_to_flag() {
        assert_eq!(Visibility::Indeterminate.as_flag(), None);
        assert_eq!(Visibility::Hidden.as_flag(), Some(true));
        assert_eq!(Visibility::Visible.as_flag(), Some(false));
    }
}
