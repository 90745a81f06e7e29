//! Prompt text for the greeting and illustration requests.
//!
//! Speech is not prompted: the poem is sent to the speech model verbatim.

use crate::content::{Theme, UserInput};

/// Name used in prompts when none is available.
const ANONYMOUS_NAME: &str = "a friend";

/// Builds prompts for a given greeting year.
///
/// # Example
/// ```rust
/// use greeting_box::content::{find_theme, UserInput};
/// use greeting_box::provider::PromptBuilder;
///
/// let builder = PromptBuilder::new(2025);
/// let theme = find_theme("Cozy Cabin").unwrap();
/// let input = UserInput::new("Ada", None).unwrap();
///
/// let prompt = builder.text_prompt(&input, theme);
/// assert!(prompt.contains("Ada"));
/// assert!(prompt.contains("Cozy Cabin"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    year: u16,
}

impl PromptBuilder {
    pub fn new(year: u16) -> Self {
        Self { year }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// Prompt for the JSON `{greeting, poem}` response.
    pub fn text_prompt(&self, input: &UserInput, theme: &Theme) -> String {
        let name = if input.name().is_empty() {
            ANONYMOUS_NAME
        } else {
            input.name()
        };
        format!(
            "Create a personalized Christmas greeting card text for {name}.\n\
             Theme: {theme}.\n\
             \n\
             Requirements:\n\
             1. A short, warm 1-sentence greeting title.\n\
             2. A creative 4-line rhyming poem matching the {theme} theme.\n\
             3. Mention \"{year}\" in the poem or greeting.\n\
             \n\
             Output JSON format only.",
            theme = theme.name,
            year = self.year,
        )
    }

    /// Prompt for the illustration.  With a photo, the model is asked to
    /// include a character resembling the person in it.
    pub fn image_prompt(&self, theme: &Theme, has_photo: bool) -> String {
        let mut prompt = format!(
            "A high quality, detailed, festive Christmas scene. Theme: {}. \
             The year {} is subtly visible somewhere.",
            theme.prompt, self.year
        );
        if has_photo {
            prompt.push_str(&format!(
                " Include a character in the center that loosely resembles the person \
                 in the provided image, styled to fit the {} theme (e.g. wearing \
                 theme-appropriate festive attire). Make it look magical and artistic.",
                theme.name
            ));
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::find_theme;

    fn cabin() -> &'static Theme {
        find_theme("Cozy Cabin").unwrap()
    }

    #[test]
    fn text_prompt_has_all_requirements() {
        let input = UserInput::new("Ada", None).unwrap();
        let prompt = PromptBuilder::new(2025).text_prompt(&input, cabin());
        assert!(prompt.contains("for Ada."));
        assert!(prompt.contains("Theme: Cozy Cabin."));
        assert!(prompt.contains("4-line rhyming poem"));
        assert!(prompt.contains("\"2025\""));
        assert!(prompt.ends_with("Output JSON format only."));
    }

    #[test]
    fn image_prompt_uses_theme_scene_text() {
        let prompt = PromptBuilder::new(2025).image_prompt(cabin(), false);
        assert!(prompt.contains(cabin().prompt));
        assert!(prompt.contains("The year 2025"));
        assert!(!prompt.contains("resembles the person"));
    }

    #[test]
    fn image_prompt_with_photo_asks_for_likeness() {
        let prompt = PromptBuilder::new(2025).image_prompt(cabin(), true);
        assert!(prompt.contains("resembles the person"));
        assert!(prompt.contains("fit the Cozy Cabin theme"));
    }
}
