use crate::models::GeneratedPrompt;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DIVIDER: &str = "-----------------------------------";

const SEO_TITLE: &str = "SEO Title: ";
const OVERLAY_TEXT: &str = "Overlay Text: ";
const DESCRIPTION: &str = "Description: ";
const TAGS: &str = "Tags: ";
const VISUAL_PROMPT: &str = "Visual Prompt: ";

// A download the UI saves as-is.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("pingenie-seo-tags-{}.txt", at.timestamp_millis())
}

/// Plain-text listing of every pin, one block per pin, closed by [`DIVIDER`].
pub fn export_text(results: &[GeneratedPrompt]) -> String {
    let mut out = String::new();
    for (index, prompt) in results.iter().enumerate() {
        out.push_str(&format!("PIN {}\n", index + 1));
        out.push_str(&format!("{}{}\n", SEO_TITLE, prompt.seo_title));
        out.push_str(&format!("{}{}\n", OVERLAY_TEXT, prompt.overlay_text));
        if let Some(description) = prompt.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("{}{}\n", DESCRIPTION, description));
        }
        out.push_str(&format!("{}{}\n", TAGS, prompt.tags.join(", ")));
        out.push_str(&format!("{}{}\n", VISUAL_PROMPT, prompt.visual_style));
        out.push_str(&format!("\n{}\n\n", DIVIDER));
    }
    out
}

pub fn export_file(results: &[GeneratedPrompt], at: DateTime<Utc>) -> Option<ExportFile> {
    if results.is_empty() {
        return None;
    }
    Some(ExportFile {
        file_name: export_file_name(at),
        contents: export_text(results),
    })
}

// One block read back from an export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportedPin {
    pub seo_title: String,
    pub overlay_text: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub visual_style: String,
}

impl From<&GeneratedPrompt> for ExportedPin {
    fn from(p: &GeneratedPrompt) -> Self {
        Self {
            seo_title: p.seo_title.clone(),
            overlay_text: p.overlay_text.clone(),
            description: p.description.clone().filter(|d| !d.is_empty()),
            tags: p.tags.clone(),
            visual_style: p.visual_style.clone(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    SeoTitle,
    OverlayText,
    Description,
    Tags,
    VisualPrompt,
}

const LABELS: [(&str, Field); 5] = [
    (SEO_TITLE, Field::SeoTitle),
    (OVERLAY_TEXT, Field::OverlayText),
    (DESCRIPTION, Field::Description),
    (TAGS, Field::Tags),
    (VISUAL_PROMPT, Field::VisualPrompt),
];

#[derive(Default)]
struct Block {
    fields: Vec<(Field, String)>,
}

impl Block {
    fn value(&self, field: Field) -> Option<String> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.trim_end_matches('\n').to_string())
    }

    fn into_pin(self) -> ExportedPin {
        let tags = self
            .value(Field::Tags)
            .filter(|t| !t.is_empty())
            .map(|t| t.split(", ").map(str::to_string).collect())
            .unwrap_or_default();
        ExportedPin {
            seo_title: self.value(Field::SeoTitle).unwrap_or_default(),
            overlay_text: self.value(Field::OverlayText).unwrap_or_default(),
            description: self.value(Field::Description),
            tags,
            visual_style: self.value(Field::VisualPrompt).unwrap_or_default(),
        }
    }
}

/// Reads [`export_text`] output back. Lines without a label continue the previous field.
pub fn parse_export(text: &str) -> Vec<ExportedPin> {
    let mut pins = Vec::new();
    let mut current: Option<Block> = None;

    for line in text.lines() {
        if line == DIVIDER {
            if let Some(block) = current.take() {
                pins.push(block.into_pin());
            }
            continue;
        }
        if current.is_none() {
            if line.starts_with("PIN ") {
                current = Some(Block::default());
            }
            continue;
        }
        let Some(block) = current.as_mut() else { continue };

        match LABELS.iter().find(|(label, _)| line.starts_with(label)) {
            Some((label, field)) => block.fields.push((*field, line[label.len()..].to_string())),
            None => {
                if let Some((_, value)) = block.fields.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }
    pins
}

/// What the copy button on a card puts on the clipboard.
pub fn clipboard_text(prompt: &GeneratedPrompt) -> String {
    format!(
        "IMAGE OVERLAY TEXT: {}\n\nFONT STYLE: {}\nTEXT COLOR: {}\n\nVISUAL PROMPT:\n{}",
        prompt.overlay_text, prompt.font_style, prompt.text_color, prompt.visual_style
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<GeneratedPrompt> {
        vec![
            GeneratedPrompt {
                id: 1,
                overlay_text: "23 Moody Living Room Ideas".into(),
                seo_title: "Moody Living Room Decor Ideas | Dark Aesthetic".into(),
                tags: vec!["#interiordesign".into(), "#moodydecor".into()],
                visual_style: "A dim living room, velvet sofa.\nNegative space top third.".into(),
                text_color: "#F5F5F5".into(),
                font_style: "Playfair Display".into(),
                description: Some("Turn your living room into a cozy retreat.".into()),
                is_description_loading: false,
            },
            GeneratedPrompt {
                id: 2,
                overlay_text: "15 Blue Bedroom Ideas".into(),
                seo_title: "Blue Bedroom Ideas | Coastal Calm".into(),
                tags: vec![],
                visual_style: "Soft morning light on navy linen.".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn export_matches_download_layout() {
        let text = export_text(&sample()[..1]);
        let expected = "PIN 1\n\
            SEO Title: Moody Living Room Decor Ideas | Dark Aesthetic\n\
            Overlay Text: 23 Moody Living Room Ideas\n\
            Description: Turn your living room into a cozy retreat.\n\
            Tags: #interiordesign, #moodydecor\n\
            Visual Prompt: A dim living room, velvet sofa.\nNegative space top third.\n\
            \n-----------------------------------\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn description_line_only_when_present() {
        let text = export_text(&sample()[1..]);
        assert!(!text.contains("Description:"));
    }

    #[test]
    fn parse_reads_back_every_block() {
        let results = sample();
        let parsed = parse_export(&export_text(&results));
        let expected: Vec<ExportedPin> = results.iter().map(ExportedPin::from).collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn empty_results_have_no_file() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert!(export_file(&[], at).is_none());
        let file = export_file(&sample(), at).unwrap();
        assert_eq!(file.file_name, "pingenie-seo-tags-1700000000123.txt");
    }

    #[test]
    fn clipboard_layout() {
        let text = clipboard_text(&sample()[0]);
        assert!(text.starts_with("IMAGE OVERLAY TEXT: 23 Moody Living Room Ideas\n\nFONT STYLE: Playfair Display\nTEXT COLOR: #F5F5F5"));
        assert!(text.ends_with("VISUAL PROMPT:\nA dim living room, velvet sofa.\nNegative space top third."));
    }
}
