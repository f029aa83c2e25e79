//! PPTX deck writer.
//!
//! Slides are collected in memory as shapes plus per-slide relationships and
//! serialized into a ZIP package on save. Frames arrive in percent of the
//! slide and are converted to EMUs (914400 per inch) against the layout.

use deck_core::slide::{normalize_color, Align, TextFit};
use deck_core::{
    DeckProperties, DeckWriter, Error, Frame, ImageFormat, ImageSource, Result, SlideHandle,
    SlideLayout, TextOptions, TextStyle, Theme,
};
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::template::{self, escape_xml, MasterStyle, Relationship};

/// Bullet character used for list paragraphs.
const BULLET_CHAR: &str = "•";

/// Left margin and hanging indent of bulleted paragraphs, in EMU.
const BULLET_INDENT: i64 = 285_750;

/// Where a saved deck ends up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveTarget {
    /// Keep the package in memory only.
    #[default]
    Memory,
    /// Write `<dir>/<file_name>`, replacing any existing file atomically.
    #[cfg(feature = "fs")]
    Directory(PathBuf),
}

/// A serialized deck.
#[derive(Debug, Clone)]
pub struct SavedDeck {
    pub file_name: String,
    /// Where the deck was written, for directory targets.
    pub path: Option<PathBuf>,
    /// The complete .pptx package.
    pub bytes: Vec<u8>,
}

/// A rectangle in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EmuRect {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl EmuRect {
    fn from_frame(frame: Frame, width: i64, height: i64) -> Self {
        let scale = |percent: f64, total: i64| (percent / 100.0 * total as f64).round() as i64;
        Self {
            x: scale(frame.x, width),
            y: scale(frame.y, height),
            cx: scale(frame.w, width),
            cy: scale(frame.h, height),
        }
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Text {
        rect: EmuRect,
        text: String,
        style: TextStyle,
        bullet: bool,
        link_rel: Option<String>,
    },
    Picture {
        rect: EmuRect,
        alt: String,
        blip: Blip,
    },
}

/// How a picture references its image.
#[derive(Debug, Clone)]
enum Blip {
    /// Image stored in the package (`r:embed`).
    Embedded(String),
    /// Image fetched by the viewer from a URL (`r:link`).
    Linked(String),
}

/// An image part stored under `ppt/media/`.
#[derive(Debug, Clone)]
struct MediaPart {
    name: String,
    bytes: Vec<u8>,
}

/// One slide of a [`PptxWriter`].
#[derive(Debug, Clone)]
pub struct PptxSlide {
    index: usize,
    width: i64,
    height: i64,
    background: String,
    shapes: Vec<Shape>,
    rels: Vec<Relationship>,
    media: Vec<MediaPart>,
}

impl PptxSlide {
    fn new(index: usize, width: i64, height: i64, background: String) -> Self {
        Self {
            index,
            width,
            height,
            background,
            shapes: Vec::new(),
            // rId1 is always the slide layout.
            rels: vec![Relationship::internal(
                "rId1",
                template::REL_SLIDE_LAYOUT,
                "../slideLayouts/slideLayout1.xml",
            )],
            media: Vec::new(),
        }
    }

    /// Number of shapes added so far.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn next_rel_id(&self) -> String {
        format!("rId{}", self.rels.len() + 1)
    }

    fn hyperlink_rel(&mut self, url: &str) -> String {
        if let Some(rel) = self
            .rels
            .iter()
            .find(|rel| {
                rel.external && rel.rel_type == template::REL_HYPERLINK && rel.target == url
            })
        {
            return rel.id.clone();
        }
        let id = self.next_rel_id();
        self.rels
            .push(Relationship::external(id.clone(), template::REL_HYPERLINK, url));
        id
    }

    fn rect(&self, frame: Frame) -> EmuRect {
        EmuRect::from_frame(frame, self.width, self.height)
    }

    fn to_xml(&self) -> std::result::Result<String, std::fmt::Error> {
        let mut xml = String::with_capacity(2048 + self.shapes.len() * 1024);
        xml.push_str(&template::slide_open_tag());
        xml.push_str("<p:cSld>");
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            self.background
        )?;
        xml.push_str("<p:spTree>");
        xml.push_str(template::SP_TREE_HEADER);

        for (idx, shape) in self.shapes.iter().enumerate() {
            // Id 1 belongs to the group shape.
            let id = idx + 2;
            match shape {
                Shape::Text {
                    rect,
                    text,
                    style,
                    bullet,
                    link_rel,
                } => write_text_shape(
                    &mut xml,
                    id,
                    *rect,
                    text,
                    style,
                    *bullet,
                    link_rel.as_deref(),
                )?,
                Shape::Picture { rect, alt, blip } => {
                    write_picture(&mut xml, id, *rect, alt, blip)?
                }
            }
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

impl SlideHandle for PptxSlide {
    fn add_text(&mut self, text: &str, frame: Frame, style: &TextStyle, options: TextOptions<'_>) {
        let rect = self.rect(frame);
        let link_rel = options.hyperlink.map(|url| self.hyperlink_rel(url));
        self.shapes.push(Shape::Text {
            rect,
            text: text.to_string(),
            style: style.clone(),
            bullet: options.bullet,
            link_rel,
        });
    }

    fn add_image(&mut self, source: &ImageSource, frame: Frame, alt: &str) {
        let rect = self.rect(frame);
        let id = self.next_rel_id();
        let blip = match source {
            ImageSource::Url { url } => {
                self.rels
                    .push(Relationship::external(id.clone(), template::REL_IMAGE, url.as_str()));
                Blip::Linked(id)
            }
            ImageSource::Embedded { bytes, format } => {
                let name = media_name(self.index, self.media.len(), *format);
                self.rels.push(Relationship::internal(
                    id.clone(),
                    template::REL_IMAGE,
                    format!("../media/{}", name),
                ));
                self.media.push(MediaPart {
                    name,
                    bytes: bytes.clone(),
                });
                Blip::Embedded(id)
            }
        };
        self.shapes.push(Shape::Picture {
            rect,
            alt: alt.to_string(),
            blip,
        });
    }
}

fn media_name(slide_index: usize, image_index: usize, format: ImageFormat) -> String {
    format!(
        "image{}_{}.{}",
        slide_index + 1,
        image_index + 1,
        format.extension()
    )
}

fn align_attr(align: Align) -> &'static str {
    match align {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Right => "r",
    }
}

fn write_xfrm(xml: &mut String, rect: EmuRect) -> std::fmt::Result {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

fn write_text_shape(
    xml: &mut String,
    id: usize,
    rect: EmuRect,
    text: &str,
    style: &TextStyle,
    bullet: bool,
    link_rel: Option<&str>,
) -> std::fmt::Result {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="TextBox {}"/>"#, id, id)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr>");
    write_xfrm(xml, rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    xml.push_str(r#"<a:bodyPr wrap="square" rtlCol="0" anchor="t">"#);
    match style.fit {
        TextFit::Shrink => xml.push_str("<a:normAutofit/>"),
        TextFit::None => xml.push_str("<a:noAutofit/>"),
    }
    xml.push_str("</a:bodyPr><a:lstStyle/>");

    let size = (style.font_size * 100.0).round() as u32;
    for line in text.split('\n') {
        xml.push_str("<a:p>");
        if bullet {
            write!(
                xml,
                r#"<a:pPr marL="{}" indent="-{}" algn="{}"><a:buFont typeface="Arial"/><a:buChar char="{}"/></a:pPr>"#,
                BULLET_INDENT,
                BULLET_INDENT,
                align_attr(style.align),
                BULLET_CHAR
            )?;
        } else {
            write!(xml, r#"<a:pPr algn="{}"><a:buNone/></a:pPr>"#, align_attr(style.align))?;
        }

        if line.is_empty() {
            write!(xml, r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#, size)?;
        } else {
            xml.push_str("<a:r>");
            write!(xml, r#"<a:rPr lang="en-US" sz="{}""#, size)?;
            if style.bold {
                xml.push_str(r#" b="1""#);
            }
            if style.italic {
                xml.push_str(r#" i="1""#);
            }
            if style.underline {
                xml.push_str(r#" u="sng""#);
            }
            xml.push_str(r#" dirty="0">"#);
            write!(
                xml,
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                normalize_color(&style.color)
            )?;
            if let Some(face) = &style.font_face {
                write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(face))?;
            }
            if let Some(rel_id) = link_rel {
                write!(xml, r#"<a:hlinkClick r:id="{}"/>"#, rel_id)?;
            }
            xml.push_str("</a:rPr>");
            write!(xml, "<a:t>{}</a:t>", escape_xml(line))?;
            xml.push_str("</a:r>");
        }
        xml.push_str("</a:p>");
    }

    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(
    xml: &mut String,
    id: usize,
    rect: EmuRect,
    alt: &str,
    blip: &Blip,
) -> std::fmt::Result {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        id,
        id,
        escape_xml(alt)
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);

    xml.push_str("<p:blipFill>");
    match blip {
        Blip::Embedded(rel_id) => write!(xml, r#"<a:blip r:embed="{}"/>"#, rel_id)?,
        Blip::Linked(rel_id) => write!(xml, r#"<a:blip r:link="{}"/>"#, rel_id)?,
    }
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr></p:pic>");
    Ok(())
}

/// Writes slides into a .pptx package.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    layout: SlideLayout,
    background: String,
    master: MasterStyle,
    properties: DeckProperties,
    target: SaveTarget,
    slides: Vec<PptxSlide>,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new(SlideLayout::default())
    }
}

impl PptxWriter {
    /// Create an in-memory writer with a white background.
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            background: "FFFFFF".to_string(),
            master: MasterStyle::default(),
            properties: DeckProperties::default(),
            target: SaveTarget::Memory,
            slides: Vec::new(),
        }
    }

    /// Use the background and accent colours of `theme`.
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.background = normalize_color(&theme.background);
        self.master = MasterStyle::from_theme(theme);
        self
    }

    /// Choose where `save` writes the package.
    pub fn with_target(mut self, target: SaveTarget) -> Self {
        self.target = target;
        self
    }

    /// The slide dimensions in use.
    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    /// Number of slides added so far.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Serialize the whole package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let xml_err = |e: std::fmt::Error| Error::XmlError(format!("Failed to build XML: {}", e));
        let count = self.slides.len();

        let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, path: &str, data: &[u8]| -> Result<()> {
            zip.start_file(path, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", path, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put(
            &mut zip,
            "[Content_Types].xml",
            template::content_types_xml(count).map_err(xml_err)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "_rels/.rels",
            template::root_rels_xml().map_err(xml_err)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "docProps/core.xml",
            template::core_props_xml(&self.properties)
                .map_err(xml_err)?
                .as_bytes(),
        )?;
        put(
            &mut zip,
            "docProps/app.xml",
            template::app_props_xml(count).map_err(xml_err)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/presentation.xml",
            template::presentation_xml(count, self.layout.width_emu(), self.layout.height_emu())
                .map_err(xml_err)?
                .as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            template::presentation_rels_xml(count).map_err(xml_err)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            template::slide_master_xml(
                &self.master,
                self.layout.width_emu(),
                self.layout.height_emu(),
            )
            .map_err(xml_err)?
            .as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            template::slide_master_rels_xml().map_err(xml_err)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            template::slide_layout_xml().as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            template::slide_layout_rels_xml().map_err(xml_err)?.as_bytes(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", template::theme_xml().as_bytes())?;

        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            put(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                slide.to_xml().map_err(xml_err)?.as_bytes(),
            )?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                template::relationships_xml(&slide.rels).map_err(xml_err)?.as_bytes(),
            )?;
            for media in &slide.media {
                put(&mut zip, &format!("ppt/media/{}", media.name), &media.bytes)?;
            }
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish package: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl DeckWriter for PptxWriter {
    type Slide = PptxSlide;
    type Output = SavedDeck;

    fn set_properties(&mut self, properties: DeckProperties) {
        self.properties = properties;
    }

    fn add_slide(&mut self) -> &mut PptxSlide {
        let slide = PptxSlide::new(
            self.slides.len(),
            self.layout.width_emu(),
            self.layout.height_emu(),
            self.background.clone(),
        );
        self.slides.push(slide);
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    async fn save(self, file_name: &str) -> Result<SavedDeck> {
        let bytes = self.to_bytes()?;
        log::debug!(
            "Serialized {} slide(s) into {} bytes",
            self.slides.len(),
            bytes.len()
        );

        let path = match &self.target {
            SaveTarget::Memory => None,
            #[cfg(feature = "fs")]
            SaveTarget::Directory(dir) => Some(persist(dir, file_name, &bytes)?),
        };

        Ok(SavedDeck {
            file_name: file_name.to_string(),
            path,
            bytes,
        })
    }
}

/// Write through a temp file in `dir` and move it into place only once the
/// whole package is on disk.
#[cfg(feature = "fs")]
fn persist(dir: &std::path::Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| Error::IoError(e.error))?;

    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn style() -> TextStyle {
        TextStyle::new(18.0, "#333333")
    }

    #[test]
    fn test_frame_to_emu() {
        let rect = EmuRect::from_frame(Frame::new(10.0, 50.0, 80.0, 10.0), 9_144_000, 5_143_500);
        assert_eq!(rect.x, 914_400);
        assert_eq!(rect.y, 2_571_750);
        assert_eq!(rect.cx, 7_315_200);
        assert_eq!(rect.cy, 514_350);
    }

    #[test]
    fn test_text_shape_xml() {
        let mut writer = PptxWriter::default();
        let slide = writer.add_slide();
        slide.add_text(
            "Cells & more",
            Frame::new(5.0, 5.0, 90.0, 10.0),
            &style().bold().centered().shrink_to_fit(),
            TextOptions::default(),
        );
        let xml = slide.to_xml().unwrap();

        assert!(xml.contains(r#"<a:pPr algn="ctr">"#));
        assert!(xml.contains("<a:normAutofit/>"));
        assert!(xml.contains(r#"sz="1800" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="333333"/>"#));
        assert!(xml.contains("<a:t>Cells &amp; more</a:t>"));
    }

    #[test]
    fn test_control_characters_are_not_written() {
        let mut writer = PptxWriter::default();
        let slide = writer.add_slide();
        let frame = Frame::new(5.0, 5.0, 90.0, 10.0);
        slide.add_text("Bell\u{7}", frame, &style(), TextOptions::default());
        slide.add_text(
            "form\u{C}feed and \u{8}backspace",
            frame,
            &style(),
            TextOptions::default(),
        );
        let xml = slide.to_xml().unwrap();

        let forbidden = |c: char| c < ' ' && !matches!(c, '\t' | '\n' | '\r');
        assert!(!xml.chars().any(forbidden));

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut texts = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                quick_xml::events::Event::Text(t) => texts.push(t.unescape().unwrap().into_owned()),
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(texts, vec!["Bell", "formfeed and backspace"]);
    }

    #[test]
    fn test_bullet_and_hyperlink() {
        let mut writer = PptxWriter::default();
        let slide = writer.add_slide();
        let frame = Frame::new(8.0, 22.0, 84.0, 8.0);
        slide.add_text(
            "item",
            frame,
            &style(),
            TextOptions {
                bullet: true,
                ..Default::default()
            },
        );
        let link = TextOptions {
            hyperlink: Some("https://example.com/a"),
            ..Default::default()
        };
        slide.add_text("1. first", frame, &style().underline(), link);
        slide.add_text("2. again", frame, &style().underline(), link);

        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<a:buChar char="•"/>"#));
        assert!(xml.contains(r#"<a:hlinkClick r:id="rId2"/>"#));
        // Identical targets share one relationship.
        assert_eq!(slide.rels.len(), 2);
        assert!(slide.rels[1].external);
    }

    #[test]
    fn test_multiline_text_gets_one_paragraph_per_line() {
        let mut writer = PptxWriter::default();
        let slide = writer.add_slide();
        slide.add_text(
            "one\n\ntwo",
            Frame::new(0.0, 0.0, 50.0, 50.0),
            &style(),
            TextOptions::default(),
        );
        let xml = slide.to_xml().unwrap();
        assert_eq!(xml.matches("<a:p>").count(), 3);
        assert!(xml.contains("<a:endParaRPr"));
    }

    #[test]
    fn test_linked_and_embedded_pictures() {
        let mut writer = PptxWriter::default();
        let slide = writer.add_slide();
        let frame = Frame::new(15.0, 22.0, 70.0, 40.0);
        slide.add_image(
            &ImageSource::Url {
                url: "https://img.youtube.com/vi/abc/hqdefault.jpg".to_string(),
            },
            frame,
            "thumb",
        );
        slide.add_image(
            &ImageSource::Embedded {
                bytes: PNG.to_vec(),
                format: ImageFormat::Png,
            },
            frame,
            "local",
        );

        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<a:blip r:link="rId2"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId3"/>"#));
        assert_eq!(slide.media[0].name, "image1_1.png");
        assert_eq!(slide.rels[2].target, "../media/image1_1.png");
    }

    #[test]
    fn test_save_in_memory() {
        let mut writer = PptxWriter::new(SlideLayout::Wide).with_theme(&Theme::modern());
        writer.set_properties(DeckProperties {
            title: "Cells".to_string(),
            subject: "Grade Level: 9".to_string(),
            author: "Tester".to_string(),
        });
        writer.add_slide();
        writer.add_slide();
        assert_eq!(writer.slide_count(), 2);

        let saved = block_on(writer.save("cells.pptx")).unwrap();
        assert_eq!(saved.file_name, "cells.pptx");
        assert!(saved.path.is_none());
        assert!(saved.bytes.starts_with(b"PK"));
    }

    #[cfg(feature = "fs")]
    #[test]
    fn test_save_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            PptxWriter::default().with_target(SaveTarget::Directory(dir.path().to_path_buf()));
        writer.add_slide();

        let saved = block_on(writer.save("deck.pptx")).unwrap();
        let path = saved.path.unwrap();
        assert_eq!(path, dir.path().join("deck.pptx"));
        assert_eq!(std::fs::read(&path).unwrap(), saved.bytes);
        // Only the final file remains.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
