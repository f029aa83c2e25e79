//! Reading generated decks back.
//!
//! Lists the text of every slide in presentation order, along with the
//! hyperlink and picture targets each slide references.

use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// What one slide of a package contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectedSlide {
    /// 1-based position in the deck.
    pub number: usize,
    /// Text of each shape, in document order. Paragraphs are joined by `\n`.
    pub texts: Vec<String>,
    /// External hyperlink targets.
    pub links: Vec<String>,
    /// Number of pictures on the slide.
    pub pictures: usize,
}

/// Reader for PPTX packages.
pub struct PptxInspector;

impl PptxInspector {
    /// Create a new inspector.
    pub fn new() -> Self {
        Self
    }

    /// Per-slide text in slide order.
    pub fn slide_texts<R: Read + Seek>(&self, reader: R) -> Result<Vec<Vec<String>>> {
        Ok(self
            .inspect(reader)?
            .into_iter()
            .map(|slide| slide.texts)
            .collect())
    }

    /// Read every slide of a package.
    pub fn inspect<R: Read + Seek>(&self, reader: R) -> Result<Vec<InspectedSlide>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Package lists {} slide(s)", slide_order.len());

        slide_order
            .iter()
            .enumerate()
            .map(|(idx, path)| self.inspect_slide(&mut archive, path, idx + 1))
            .collect()
    }

    /// Get the ordered list of slide paths.
    ///
    /// `p:sldIdLst` in `ppt/presentation.xml` decides the order. Packages
    /// without one fall back to the digits in the relationship ids.
    fn get_slide_order<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<String>> {
        let rels = self.read_relationships(archive, "ppt/_rels/presentation.xml.rels")?;
        let slide_rels: HashMap<String, String> = rels
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/slide"))
            .map(|rel| (rel.id, slide_part_path(&rel.target)))
            .collect();

        let listed = self.read_slide_id_list(archive)?;
        if !listed.is_empty() {
            return Ok(listed
                .iter()
                .filter_map(|id| slide_rels.get(id).cloned())
                .collect());
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_iter()
            .map(|(id, path)| {
                let order = extract_slide_number(&id).or_else(|| extract_slide_number(&path));
                (path, order)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Relationship ids of `p:sldId` entries, in presentation order.
    fn read_slide_id_list<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<String>> {
        let path = "ppt/presentation.xml";
        if archive.by_name(path).is_err() {
            return Ok(Vec::new());
        }
        let content = self.read_file_from_archive(archive, path)?;
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);
        let mut ids = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    let rel_id = e
                        .attributes()
                        .flatten()
                        // The prefixed `r:id`, not the numeric `id`.
                        .find(|attr| {
                            attr.key.as_ref() != b"id" && local_name(attr.key.as_ref()) == b"id"
                        })
                        .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                    if let Some(rel_id) = rel_id {
                        ids.push(rel_id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation.xml: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(ids)
    }

    fn inspect_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<InspectedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let rels_path = slide_rels_path(slide_path);
        let has_rels = archive.by_name(&rels_path).is_ok();
        let rels: HashMap<String, Relationship> = if has_rels {
            self.read_relationships(archive, &rels_path)?
                .into_iter()
                .map(|rel| (rel.id.clone(), rel))
                .collect()
        } else {
            HashMap::new()
        };

        let mut slide = InspectedSlide {
            number,
            ..Default::default()
        };
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        let mut in_text_body = false;
        let mut current_text = String::new();
        let mut paragraphs = 0;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"txBody" => {
                        in_text_body = true;
                        paragraphs = 0;
                    }
                    b"p" if in_text_body => {
                        if paragraphs > 0 {
                            current_text.push('\n');
                        }
                        paragraphs += 1;
                    }
                    b"pic" => slide.pictures += 1,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if local_name(e.name().as_ref()) == b"hlinkClick" {
                        let target = e
                            .attributes()
                            .flatten()
                            .find(|attr| local_name(attr.key.as_ref()) == b"id")
                            .and_then(|attr| rels.get(&*String::from_utf8_lossy(&attr.value)))
                            .map(|rel| rel.target.clone());
                        if let Some(target) = target {
                            if !slide.links.contains(&target) {
                                slide.links.push(target);
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_text_body {
                        let text = e.unescape().unwrap_or_default();
                        current_text.push_str(&text);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if local_name(e.name().as_ref()) == b"txBody" {
                        in_text_body = false;
                        let text = current_text.trim().to_string();
                        if !text.is_empty() {
                            slide.texts.push(text);
                        }
                        current_text.clear();
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing {}: {}",
                        slide_path, e
                    )));
                }
                _ => {}
            }
        }

        Ok(slide)
    }

    fn read_relationships<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Vec<Relationship>> {
        let content = self.read_file_from_archive(archive, path)?;
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);
        let mut rels = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut rel = Relationship::default();
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = unescape_attr(&value),
                            _ => {}
                        }
                    }
                    rels.push(rel);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(rels)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

/// Resolve a presentation relationship target to a package path.
fn slide_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn slide_rels_path(slide_path: &str) -> String {
    match slide_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", slide_path),
    }
}

fn unescape_attr(value: &str) -> String {
    quick_xml::escape::unescape(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
