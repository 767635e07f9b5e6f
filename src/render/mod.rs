//! Turns extracted data into the visual report.
//!
//! Every section is evaluated on its own: a missing or empty section becomes
//! an error card and never affects its siblings.

pub mod cards;
pub mod html;
pub mod text;

use serde::Serialize;

use crate::ocr::{OcrData, SectionMap};
use cards::{build_card, build_error_card, build_key_value_table_card, Card, CardBody};

pub const ANNOTATED_IMAGE_ALT: &str = "OCR Annotated Image";

/// The four logical groupings of extracted data, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ElectionType,
    RegistrationInfo,
    VotingResults,
    PollingUnitData,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ElectionType,
        Section::RegistrationInfo,
        Section::VotingResults,
        Section::PollingUnitData,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::ElectionType => "Election Type",
            Section::RegistrationInfo => "Polling Unit Registration Info",
            Section::VotingResults => "Voting Results",
            Section::PollingUnitData => "Polling Unit Data",
        }
    }

    /// Column headers after `S/N`; the election type is free text.
    pub fn column_headers(self) -> &'static [&'static str] {
        match self {
            Section::ElectionType => &[],
            Section::RegistrationInfo => &["Name", "Value"],
            Section::VotingResults => &["Party", "No. of Votes"],
            Section::PollingUnitData => &["Name", "Count"],
        }
    }

    pub fn error_message(self) -> &'static str {
        match self {
            Section::ElectionType => "Ooops! Failed to extract the election type.",
            Section::RegistrationInfo => {
                "Ooops! Failed to extract the polling unit registration info."
            }
            Section::VotingResults => "Ooops! Failed to extract the political parties result.",
            Section::PollingUnitData => {
                "Ooops! Failed to extract the polling unit data from the image."
            }
        }
    }

    fn mapping(self, data: &OcrData) -> Option<&SectionMap> {
        match self {
            Section::ElectionType => None,
            Section::RegistrationInfo => data.pu_reg_info_results.as_ref(),
            Section::VotingResults => data.political_parties_vote_results.as_ref(),
            Section::PollingUnitData => data.pu_data_results.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedImage {
    pub src: String,
    pub alt: String,
}

/// A fully laid-out report: image slot plus exactly one card per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub annotated_image: Option<AnnotatedImage>,
    pub cards: Vec<Card>,
}

impl Report {
    pub fn error_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_error()).count()
    }

    pub fn success_count(&self) -> usize {
        self.cards.len() - self.error_count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer;

impl ResultRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Build the report for one response. Same input, same report.
    pub fn render(&self, data: &OcrData) -> Report {
        let annotated_image = data
            .output_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| AnnotatedImage {
                src: url.to_string(),
                alt: ANNOTATED_IMAGE_ALT.to_string(),
            });

        let cards = Section::ALL
            .iter()
            .map(|&section| render_section(section, data))
            .collect();

        Report {
            annotated_image,
            cards,
        }
    }
}

fn render_section(section: Section, data: &OcrData) -> Card {
    if section == Section::ElectionType {
        return match data.election_type.as_deref() {
            Some(kind) if !kind.is_empty() => {
                build_card(section.title(), CardBody::Text(kind.to_string()))
            }
            _ => build_error_card(section.error_message()),
        };
    }

    // An empty mapping carries no more information than an absent one
    match section.mapping(data) {
        Some(map) if !map.is_empty() => {
            build_key_value_table_card(section.title(), section.column_headers(), map)
        }
        _ => build_error_card(section.error_message()),
    }
}
