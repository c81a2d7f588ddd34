//! Rendering options and configuration.

/// Default token rendered in place of a missing required value.
pub const DEFAULT_PLACEHOLDER: &str = "----------";

/// Options for rendering records into the IR.
///
/// Both fields are hashed into cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Token rendered for missing required scalars
    pub placeholder: String,

    /// Upper-case section headings
    pub uppercase_headings: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder token.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Enable or disable upper-cased headings.
    pub fn with_uppercase_headings(mut self, uppercase: bool) -> Self {
        self.uppercase_headings = uppercase;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            uppercase_headings: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_placeholder("N/A")
            .with_uppercase_headings(false);
        assert_eq!(options.placeholder, "N/A");
        assert!(!options.uppercase_headings);
        assert_eq!(RenderOptions::default().placeholder, DEFAULT_PLACEHOLDER);
    }
}
