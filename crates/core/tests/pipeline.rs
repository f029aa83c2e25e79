//! End-to-end export through a recording writer.

use deck_core::{
    Block, DeckWriter, Error, Exporter, Frame, ImageSource, Placard, PlacardSource,
    PresentationMetadata, SlideHandle, SlideMapper, SnapshotSource, TextOptions, TextStyle,
};
use futures::executor::block_on;

#[derive(Debug, Default)]
struct RecordedSlide {
    texts: Vec<String>,
    links: Vec<String>,
    images: usize,
}

impl SlideHandle for RecordedSlide {
    fn add_text(
        &mut self,
        text: &str,
        _frame: Frame,
        _style: &TextStyle,
        options: TextOptions<'_>,
    ) {
        self.texts.push(text.to_string());
        if let Some(url) = options.hyperlink {
            self.links.push(url.to_string());
        }
    }

    fn add_image(&mut self, _source: &ImageSource, _frame: Frame, _alt: &str) {
        self.images += 1;
    }
}

#[derive(Debug, Default)]
struct RecordingWriter {
    slides: Vec<RecordedSlide>,
}

impl DeckWriter for RecordingWriter {
    type Slide = RecordedSlide;
    type Output = Vec<RecordedSlide>;

    fn add_slide(&mut self) -> &mut RecordedSlide {
        self.slides.push(RecordedSlide::default());
        self.slides.last_mut().unwrap()
    }

    async fn save(self, _file_name: &str) -> deck_core::Result<Self::Output> {
        Ok(self.slides)
    }
}

/// Extraction results where `None` stands for a placard with no title.
struct Fixture(Vec<Option<Placard>>);

impl PlacardSource for Fixture {
    fn placards(&self) -> deck_core::Result<Vec<deck_core::Result<Placard>>> {
        Ok(self
            .0
            .iter()
            .enumerate()
            .map(|(index, placard)| {
                placard.clone().ok_or(Error::MissingElement {
                    index,
                    element: "title",
                })
            })
            .collect())
    }
}

#[test]
fn test_cells_export() {
    let source = vec![
        Placard::text("Reading", "Start at https://example.com/cells today."),
        Placard::video("Broken clip", "https://www.youtube.com/embed/", "", ""),
    ];
    let exporter = Exporter::new(SlideMapper::new());
    let metadata = PresentationMetadata::new("Cells", "9");

    let report = block_on(exporter.export(&source, &metadata, RecordingWriter::default())).unwrap();

    assert_eq!(report.file_name, "cells.pptx");
    assert_eq!(report.slide_count, 3);
    let slides = report.output;
    assert_eq!(slides.len(), 3);

    assert_eq!(slides[0].texts, vec!["Cells", "Grade Level: 9"]);
    assert_eq!(slides[1].links, vec!["https://example.com/cells"]);
    assert!(slides[1].texts.contains(&"Start at [Link] today.".to_string()));
    assert_eq!(slides[2].images, 0);
    assert!(slides[2]
        .texts
        .contains(&"No content available for this slide.".to_string()));
}

#[test]
fn test_slide_count_matches_extracted_placards() {
    let source = Fixture(vec![
        Some(Placard::text("One", "- a\n- b")),
        None,
        Some(Placard::text("Three", "")),
        None,
    ]);
    let exporter = Exporter::new(SlideMapper::new());

    let (_, plan) = exporter
        .plan(&source, &PresentationMetadata::default())
        .unwrap();

    assert_eq!(plan.slides.len(), 1 + 2);
    assert_eq!(plan.skipped, 2);
}

#[test]
fn test_snapshot_export_uses_stored_metadata() {
    let snapshot = SnapshotSource::from_json(
        r#"{
            "metadata": { "topic": "Photosynthesis", "gradeLevel": "7" },
            "placards": [
                { "title": "Video", "content": "Light reactions", "embedSrc": "https://www.youtube.com/embed/abc123?x=1" }
            ]
        }"#,
    )
    .unwrap();
    let exporter = Exporter::new(SlideMapper::new());

    let (metadata, plan) = exporter
        .plan(&snapshot, &PresentationMetadata::default())
        .unwrap();
    assert_eq!(metadata.topic(), Some("Photosynthesis"));
    assert!(plan.slides[1].has_image());
    assert!(matches!(plan.slides[1].blocks[1], Block::Image(_)));

    let report = block_on(exporter.export(
        &snapshot,
        &PresentationMetadata::default(),
        RecordingWriter::default(),
    ))
    .unwrap();
    assert_eq!(report.file_name, "photosynthesis.pptx");
    assert_eq!(report.output[1].images, 1);
    assert_eq!(
        report.output[1].links,
        vec!["https://www.youtube.com/watch?v=abc123"]
    );
}
