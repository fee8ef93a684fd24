use serde::{Deserialize, Deserializer, Serialize};

/// Note-taking preset that controls prompt phrasing.
///
/// Deserialises from any JSON value; anything other than the strings
/// `concise`, `detailed` and `visual` falls back to [`Style::Concise`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Concise,
    Detailed,
    Visual,
}

impl Style {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "detailed" => Self::Detailed,
            "visual" => Self::Visual,
            _ => Self::Concise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
            Self::Visual => "visual",
        }
    }
}

impl From<String> for Style {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::parse).unwrap_or_default())
    }
}

impl From<&str> for Style {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Which prompt family a piece of content belongs to.
///
/// Video notes are built from metadata only, so their prompts ask what the
/// video *likely* teaches instead of summarising text the model can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFamily {
    DirectContent,
    VideoMetadata,
}

pub type PromptTemplate = fn(&str) -> String;

pub fn template_for(style: Style, family: TemplateFamily) -> PromptTemplate {
    match (family, style) {
        (TemplateFamily::DirectContent, Style::Concise) => direct_concise,
        (TemplateFamily::DirectContent, Style::Detailed) => direct_detailed,
        (TemplateFamily::DirectContent, Style::Visual) => direct_visual,
        (TemplateFamily::VideoMetadata, Style::Concise) => video_concise,
        (TemplateFamily::VideoMetadata, Style::Detailed) => video_detailed,
        (TemplateFamily::VideoMetadata, Style::Visual) => video_visual,
    }
}

pub fn build_prompt(style: Style, family: TemplateFamily, content: &str) -> String {
    template_for(style, family)(content)
}

fn direct_concise(text: &str) -> String {
    format!(
        "Generate concise and well-structured learning notes for the following text. \
         Use bullet points where appropriate and highlight key concepts: {}",
        text
    )
}

fn direct_detailed(text: &str) -> String {
    format!(
        "Generate detailed learning notes with examples for the following text. \
         Include explanations of key concepts: {}",
        text
    )
}

fn direct_visual(text: &str) -> String {
    format!(
        "Generate learning notes for the following text with a focus on visual organization. \
         Use bullet points, numbering, and clear section headings: {}",
        text
    )
}

fn video_concise(metadata: &str) -> String {
    format!(
        "Based on this YouTube video information, generate concise learning notes about \
         what this video likely teaches. Use bullet points for key concepts:\n{}",
        metadata
    )
}

fn video_detailed(metadata: &str) -> String {
    format!(
        "Based on this YouTube video information, generate detailed learning notes about \
         what this video covers. Include explanations of probable key concepts:\n{}",
        metadata
    )
}

fn video_visual(metadata: &str) -> String {
    format!(
        "Based on this YouTube video information, create structured learning notes with \
         clear headings and organized points about what this video likely teaches:\n{}",
        metadata
    )
}
