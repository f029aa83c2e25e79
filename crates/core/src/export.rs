//! The export pipeline: source, mapper, optional thumbnails, writer.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::mapper::{SlideMapper, SlidePlan};
use crate::source::PlacardSource;
use crate::thumbnail::{embed_thumbnails, ImageFetch, ThumbnailFetcher};
use crate::types::PresentationMetadata;
use crate::writer::{render_slides, DeckProperties, DeckWriter};

/// Receives progress of an export, in place of shared UI flags.
pub trait StatusSink {
    /// The export started (`true`) or finished either way (`false`).
    fn loading(&self, active: bool);

    /// The deck was saved under `file_name`.
    fn succeeded(&self, file_name: &str);

    /// The export failed; `message` is fit to show the user.
    fn failed(&self, message: &str);
}

/// Reports export progress through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn loading(&self, active: bool) {
        log::debug!("Export {}", if active { "started" } else { "finished" });
    }

    fn succeeded(&self, file_name: &str) {
        log::info!("PowerPoint saved as {}", file_name);
    }

    fn failed(&self, message: &str) {
        log::error!("{}", message);
    }
}

/// File naming and document properties for exports.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Stem used when the metadata has no topic.
    pub fallback_file_stem: String,
    /// File extension without the dot.
    pub extension: String,
    /// Author written to the document properties.
    pub author: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fallback_file_stem: "presentation".to_string(),
            extension: "pptx".to_string(),
            author: "Teaching Materials Generator".to_string(),
        }
    }
}

impl ExportOptions {
    /// Set the stem used when there is no topic.
    pub fn with_fallback_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.fallback_file_stem = stem.into();
        self
    }

    /// Set the author written to the deck.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}

/// Derive the output file name from the topic.
///
/// The topic is lower-cased and every character that is not an ASCII letter
/// or digit becomes `_`, surrounding whitespace included. A blank topic uses
/// the fallback stem.
pub fn export_file_name(metadata: &PresentationMetadata, options: &ExportOptions) -> String {
    let topic = metadata.topic.as_deref().filter(|t| !t.trim().is_empty());
    let stem = match topic {
        Some(topic) => topic
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect(),
        None => options.fallback_file_stem.clone(),
    };
    format!("{}.{}", stem, options.extension)
}

/// Summary of a finished export.
#[derive(Debug, Clone)]
pub struct ExportReport<O> {
    pub file_name: String,
    /// Slides written, title slide included.
    pub slide_count: usize,
    /// Placards skipped because they could not be extracted.
    pub skipped: usize,
    /// Thumbnails replaced by a placeholder.
    pub missing_thumbnails: usize,
    /// Whatever the writer returned from `save`.
    pub output: O,
}

/// Marks an export as in flight until dropped.
///
/// Dropping clears the flag and reports `loading(false)`, whichever way the
/// export ended.
pub struct ExportGuard<'a, S: StatusSink> {
    in_flight: &'a AtomicBool,
    status: &'a S,
}

impl<S: StatusSink> Drop for ExportGuard<'_, S> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
        self.status.loading(false);
    }
}

/// Fetcher type for exports that keep thumbnails as links.
struct LinkedThumbnails;

impl ThumbnailFetcher for LinkedThumbnails {
    async fn fetch(&self, _url: &str) -> ImageFetch {
        ImageFetch::Missing("thumbnail embedding disabled".to_string())
    }
}

/// Runs exports one at a time.
pub struct Exporter<S: StatusSink = LogStatus> {
    mapper: SlideMapper,
    options: ExportOptions,
    status: S,
    in_flight: AtomicBool,
}

impl Exporter<LogStatus> {
    /// Create an exporter that logs its progress.
    pub fn new(mapper: SlideMapper) -> Self {
        Self::with_status(mapper, LogStatus)
    }
}

impl<S: StatusSink> Exporter<S> {
    /// Create an exporter reporting to `status`.
    pub fn with_status(mapper: SlideMapper, status: S) -> Self {
        Self {
            mapper,
            options: ExportOptions::default(),
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Replace the export options.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// The export options in use.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Claim the exporter, or fail if another export is running.
    pub fn try_begin(&self) -> Result<ExportGuard<'_, S>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| Error::ExportInProgress)?;
        self.status.loading(true);
        Ok(ExportGuard {
            in_flight: &self.in_flight,
            status: &self.status,
        })
    }

    /// Read the source and map it to slides without writing anything.
    ///
    /// Metadata fields missing from `metadata` are taken from the source.
    pub fn plan<P: PlacardSource>(
        &self,
        source: &P,
        metadata: &PresentationMetadata,
    ) -> Result<(PresentationMetadata, SlidePlan)> {
        let metadata = metadata
            .clone()
            .or(source.metadata().unwrap_or_default());
        let placards = source.placards()?;
        log::debug!("Found {} placard candidate(s)", placards.len());
        let plan = self.mapper.map_all(&metadata, placards);
        Ok((metadata, plan))
    }

    /// Export with thumbnails linked by URL.
    pub async fn export<P, W>(
        &self,
        source: &P,
        metadata: &PresentationMetadata,
        writer: W,
    ) -> Result<ExportReport<W::Output>>
    where
        P: PlacardSource,
        W: DeckWriter,
    {
        self.run::<P, W, LinkedThumbnails>(source, metadata, writer, None)
            .await
    }

    /// Export with every thumbnail fetched and embedded.
    pub async fn export_with_thumbnails<P, W, F>(
        &self,
        source: &P,
        metadata: &PresentationMetadata,
        writer: W,
        fetcher: &F,
    ) -> Result<ExportReport<W::Output>>
    where
        P: PlacardSource,
        W: DeckWriter,
        F: ThumbnailFetcher,
    {
        self.run(source, metadata, writer, Some(fetcher)).await
    }

    async fn run<P, W, F>(
        &self,
        source: &P,
        metadata: &PresentationMetadata,
        writer: W,
        fetcher: Option<&F>,
    ) -> Result<ExportReport<W::Output>>
    where
        P: PlacardSource,
        W: DeckWriter,
        F: ThumbnailFetcher,
    {
        let _guard = self.try_begin()?;

        let result = self.assemble(source, metadata, writer, fetcher).await;
        match &result {
            Ok(report) => self.status.succeeded(&report.file_name),
            Err(e) => self.status.failed(&e.to_string()),
        }
        result
    }

    async fn assemble<P, W, F>(
        &self,
        source: &P,
        metadata: &PresentationMetadata,
        mut writer: W,
        fetcher: Option<&F>,
    ) -> Result<ExportReport<W::Output>>
    where
        P: PlacardSource,
        W: DeckWriter,
        F: ThumbnailFetcher,
    {
        let (metadata, mut plan) = self.plan(source, metadata)?;

        let missing_thumbnails = match fetcher {
            Some(fetcher) => embed_thumbnails(&mut plan.slides, fetcher, self.mapper.theme()).await,
            None => 0,
        };

        writer.set_properties(DeckProperties {
            title: metadata.display_title().to_string(),
            subject: metadata
                .subject()
                .map(str::to_string)
                .unwrap_or_else(|| metadata.grade_line()),
            author: self.options.author.clone(),
        });
        render_slides(&mut writer, &plan.slides);

        let file_name = export_file_name(&metadata, &self.options);
        let output = writer.save(&file_name).await.map_err(|e| match e {
            Error::WriterError(_) => e,
            other => Error::WriterError(other.to_string()),
        })?;

        Ok(ExportReport {
            file_name,
            slide_count: plan.slides.len(),
            skipped: plan.skipped,
            missing_thumbnails,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::{Frame, ImageSource, TextStyle};
    use crate::types::Placard;
    use crate::writer::{SlideHandle, TextOptions};
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingStatus {
        events: RefCell<Vec<String>>,
    }

    impl StatusSink for &RecordingStatus {
        fn loading(&self, active: bool) {
            self.events.borrow_mut().push(format!("loading:{}", active));
        }

        fn succeeded(&self, file_name: &str) {
            self.events.borrow_mut().push(format!("ok:{}", file_name));
        }

        fn failed(&self, message: &str) {
            self.events.borrow_mut().push(format!("err:{}", message));
        }
    }

    struct NullSlide;

    impl SlideHandle for NullSlide {
        fn add_text(&mut self, _: &str, _: Frame, _: &TextStyle, _: TextOptions<'_>) {}
        fn add_image(&mut self, _: &ImageSource, _: Frame, _: &str) {}
    }

    /// Counts slides and optionally fails on save.
    #[derive(Default)]
    struct CountingWriter {
        slides: Vec<NullSlide>,
        properties: DeckProperties,
        fail: bool,
    }

    impl DeckWriter for CountingWriter {
        type Slide = NullSlide;
        type Output = (usize, DeckProperties);

        fn set_properties(&mut self, properties: DeckProperties) {
            self.properties = properties;
        }

        fn add_slide(&mut self) -> &mut NullSlide {
            self.slides.push(NullSlide);
            self.slides.last_mut().unwrap()
        }

        async fn save(self, _file_name: &str) -> Result<Self::Output> {
            if self.fail {
                return Err(Error::IoError(std::io::Error::other("disk full")));
            }
            Ok((self.slides.len(), self.properties))
        }
    }

    #[test]
    fn test_export_file_name() {
        let options = ExportOptions::default();
        let metadata = PresentationMetadata::new("Cells & Tissues 101", "9");
        assert_eq!(export_file_name(&metadata, &options), "cells___tissues_101.pptx");
        assert_eq!(
            export_file_name(&PresentationMetadata::default(), &options),
            "presentation.pptx"
        );
        let options = options.with_fallback_file_stem("educational_presentation");
        assert_eq!(
            export_file_name(&PresentationMetadata::default(), &options),
            "educational_presentation.pptx"
        );
    }

    #[test]
    fn test_export_file_name_keeps_surrounding_whitespace() {
        let options = ExportOptions::default();
        let padded = PresentationMetadata::new(" Cells ", "9");
        assert_eq!(export_file_name(&padded, &options), "_cells_.pptx");
        let blank = PresentationMetadata::new("   ", "9");
        assert_eq!(export_file_name(&blank, &options), "presentation.pptx");
    }

    #[test]
    fn test_export_reports_success() {
        let status = RecordingStatus::default();
        let exporter = Exporter::with_status(SlideMapper::new(), &status);
        let source = vec![Placard::text("A", "a"), Placard::text("B", "b")];

        let report = block_on(exporter.export(
            &source,
            &PresentationMetadata::new("Cells", "9").with_subject("Biology"),
            CountingWriter::default(),
        ))
        .unwrap();

        assert_eq!(report.file_name, "cells.pptx");
        assert_eq!(report.slide_count, 3);
        assert_eq!(report.output.0, 3);
        assert_eq!(report.output.1.title, "Cells");
        assert_eq!(report.output.1.subject, "Biology");
        assert_eq!(
            *status.events.borrow(),
            vec!["loading:true", "ok:cells.pptx", "loading:false"]
        );
    }

    #[test]
    fn test_writer_failure_is_fatal_and_clears_loading() {
        let status = RecordingStatus::default();
        let exporter = Exporter::with_status(SlideMapper::new(), &status);
        let writer = CountingWriter {
            fail: true,
            ..Default::default()
        };

        let err = block_on(exporter.export(
            &Vec::<Placard>::new(),
            &PresentationMetadata::default(),
            writer,
        ))
        .unwrap_err();

        assert!(matches!(err, Error::WriterError(_)));
        assert!(err.to_string().starts_with("Error saving PowerPoint:"));
        let events = status.events.borrow();
        assert_eq!(events.last().map(String::as_str), Some("loading:false"));
        assert!(events[1].starts_with("err:Error saving PowerPoint"));
    }

    #[test]
    fn test_second_export_is_rejected_while_in_flight() {
        let exporter = Exporter::new(SlideMapper::new());
        let guard = exporter.try_begin().unwrap();

        let err = block_on(exporter.export(
            &Vec::<Placard>::new(),
            &PresentationMetadata::default(),
            CountingWriter::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::ExportInProgress));

        drop(guard);
        assert!(block_on(exporter.export(
            &Vec::<Placard>::new(),
            &PresentationMetadata::default(),
            CountingWriter::default(),
        ))
        .is_ok());
    }
}
