//! Fixed package parts and the small generated ones around them.
//!
//! Every deck uses one slide master, one blank layout and one theme; only the
//! slide list, document properties and media types vary.

use deck_core::slide::normalize_color;
use deck_core::{DeckProperties, ImageFormat, Theme};
use std::fmt::Write as FmtWrite;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Relationship id of the slide master in `presentation.xml.rels`.
pub(crate) const MASTER_REL_ID: &str = "rId1";
/// Relationship id of the theme in `presentation.xml.rels`.
const THEME_REL_ID: &str = "rId2";
/// Slide relationships in `presentation.xml.rels` start after master and theme.
const FIRST_SLIDE_REL: usize = 3;

/// First id handed out in `p:sldIdLst`.
const FIRST_SLIDE_ID: usize = 256;

/// Escape XML special characters.
///
/// Characters XML 1.0 cannot carry at all (C0 controls other than tab, line
/// feed and carriage return, and the `U+FFFE`/`U+FFFF` non-characters) are
/// dropped.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => {}
        }
    }
    escaped
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn internal(
        id: impl Into<String>,
        rel_type: &'static str,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type,
            target: target.into(),
            external: false,
        }
    }

    pub fn external(
        id: impl Into<String>,
        rel_type: &'static str,
        target: impl Into<String>,
    ) -> Self {
        Self {
            external: true,
            ..Self::internal(id, rel_type, target)
        }
    }
}

/// Serialize a relationships part.
pub(crate) fn relationships_xml(rels: &[Relationship]) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_HEADER);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_PACKAGE_REL)?;
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            rel.id,
            rel.rel_type,
            escape_xml(&rel.target)
        )?;
        if rel.external {
            xml.push_str(r#" TargetMode="External""#);
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

pub(crate) fn content_types_xml(slide_count: usize) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_HEADER);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif] {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        )?;
    }
    xml.push_str(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    );
    xml.push_str(
        r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
    );
    xml.push_str(
        r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
    );
    xml.push_str(
        r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
    );
    for n in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        )?;
    }
    xml.push_str(
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    );
    xml.push_str(
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    );
    xml.push_str("</Types>");
    Ok(xml)
}

pub(crate) fn root_rels_xml() -> Result<String, std::fmt::Error> {
    relationships_xml(&[
        Relationship::internal(
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "ppt/presentation.xml",
        ),
        Relationship::internal(
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        Relationship::internal(
            "rId3",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            "docProps/app.xml",
        ),
    ])
}

pub(crate) fn core_props_xml(properties: &DeckProperties) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_HEADER);
    xml.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    write!(xml, "<dc:title>{}</dc:title>", escape_xml(&properties.title))?;
    write!(xml, "<dc:subject>{}</dc:subject>", escape_xml(&properties.subject))?;
    write!(xml, "<dc:creator>{}</dc:creator>", escape_xml(&properties.author))?;
    write!(
        xml,
        "<cp:lastModifiedBy>{}</cp:lastModifiedBy>",
        escape_xml(&properties.author)
    )?;
    xml.push_str("<cp:revision>1</cp:revision>");
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

pub(crate) fn app_props_xml(slide_count: usize) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_HEADER);
    xml.push_str(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
    );
    xml.push_str("<Application>deck-pptx</Application>");
    xml.push_str("<PresentationFormat>On-screen Show</PresentationFormat>");
    write!(xml, "<Slides>{}</Slides>", slide_count)?;
    xml.push_str("</Properties>");
    Ok(xml)
}

/// Relationship id of slide `index` (0-based) in `presentation.xml.rels`.
pub(crate) fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + FIRST_SLIDE_REL)
}

pub(crate) fn presentation_xml(
    slide_count: usize,
    width: i64,
    height: i64,
) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_HEADER);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_DRAWING, NS_REL, NS_MAIN
    )?;
    write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="{}"/></p:sldMasterIdLst>"#,
        MASTER_REL_ID
    )?;
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + index,
                slide_rel_id(index)
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, width, height)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

pub(crate) fn presentation_rels_xml(slide_count: usize) -> Result<String, std::fmt::Error> {
    let mut rels = vec![
        Relationship::internal(MASTER_REL_ID, REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        Relationship::internal(THEME_REL_ID, REL_THEME, "theme/theme1.xml"),
    ];
    rels.extend((0..slide_count).map(|index| {
        Relationship::internal(
            slide_rel_id(index),
            REL_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        )
    }));
    relationships_xml(&rels)
}

/// The shared group-shape header every `p:spTree` starts with.
pub(crate) const SP_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Opening tag of a slide part.
pub(crate) fn slide_open_tag() -> String {
    format!(
        r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        XML_HEADER, NS_DRAWING, NS_REL, NS_MAIN
    )
}

/// Decoration drawn by the slide master on every slide: an accent rule under
/// the title area and the slide number in the bottom-right corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MasterStyle {
    /// Rule colour, `RRGGBB`.
    pub accent: String,
    /// Slide-number colour, `RRGGBB`.
    pub number_color: String,
    pub number_font: Option<String>,
}

impl MasterStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            accent: normalize_color(&theme.primary),
            number_color: normalize_color(&theme.subtitle),
            number_font: theme.body_font.clone(),
        }
    }
}

impl Default for MasterStyle {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

/// Accent rule: 0.5in from the left, 0.7in from the top, 95% of the width.
const RULE_X: i64 = 457_200;
const RULE_Y: i64 = 640_080;
/// 1.5pt.
const RULE_WIDTH: i64 = 19_050;
/// 20% transparency.
const RULE_ALPHA: u32 = 80_000;
/// Slide-number size in hundredths of a point.
const NUMBER_SIZE: u32 = 1000;

/// Master shapes for a slide of `width` x `height` EMU.
fn master_shapes(
    style: &MasterStyle,
    width: i64,
    height: i64,
) -> Result<String, std::fmt::Error> {
    let mut xml = String::new();
    write!(
        xml,
        concat!(
            r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="2" name="Accent Rule"/><p:cNvCxnSpPr/>"#,
            r#"<p:nvPr userDrawn="1"/></p:nvCxnSpPr><p:spPr>"#,
            r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="0"/></a:xfrm>"#,
            r#"<a:prstGeom prst="line"><a:avLst/></a:prstGeom>"#,
            r#"<a:ln w="{w}"><a:solidFill><a:srgbClr val="{color}"><a:alpha val="{alpha}"/>"#,
            r#"</a:srgbClr></a:solidFill></a:ln></p:spPr></p:cxnSp>"#
        ),
        x = RULE_X,
        y = RULE_Y,
        cx = width * 95 / 100,
        w = RULE_WIDTH,
        color = style.accent,
        alpha = RULE_ALPHA,
    )?;

    let font = match &style.number_font {
        Some(face) => format!(r#"<a:latin typeface="{}"/>"#, escape_xml(face)),
        None => String::new(),
    };
    write!(
        xml,
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Slide Number"/><p:cNvSpPr txBox="1"/>"#,
            r#"<p:nvPr userDrawn="1"/></p:nvSpPr><p:spPr>"#,
            r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="none" lIns="0" tIns="0" rIns="0" bIns="0"/>"#,
            r#"<a:lstStyle/><a:p><a:pPr algn="r"/>"#,
            r#"<a:fld id="{{B6F15528-21DE-4FAA-801E-634DDDAF4B2B}}" type="slidenum">"#,
            r#"<a:rPr lang="en-US" sz="{size}"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill>"#,
            r#"{font}</a:rPr><a:t>‹#›</a:t></a:fld></a:p></p:txBody></p:sp>"#
        ),
        x = width * 89 / 100,
        y = height * 93 / 100,
        cx = width * 8 / 100,
        cy = height * 5 / 100,
        size = NUMBER_SIZE,
        color = style.number_color,
        font = font,
    )?;
    Ok(xml)
}

pub(crate) fn slide_master_xml(
    style: &MasterStyle,
    width: i64,
    height: i64,
) -> Result<String, std::fmt::Error> {
    Ok(format!(
        concat!(
            "{header}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{tree}{shapes}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>",
            "</p:sldMaster>"
        ),
        header = XML_HEADER,
        a = NS_DRAWING,
        r = NS_REL,
        p = NS_MAIN,
        tree = SP_TREE_HEADER,
        shapes = master_shapes(style, width, height)?,
    ))
}

pub(crate) fn slide_master_rels_xml() -> Result<String, std::fmt::Error> {
    relationships_xml(&[
        Relationship::internal("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
        Relationship::internal("rId2", REL_THEME, "../theme/theme1.xml"),
    ])
}

pub(crate) fn slide_layout_xml() -> String {
    format!(
        concat!(
            "{header}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{tree}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        header = XML_HEADER,
        a = NS_DRAWING,
        r = NS_REL,
        p = NS_MAIN,
        tree = SP_TREE_HEADER,
    )
}

pub(crate) fn slide_layout_rels_xml() -> Result<String, std::fmt::Error> {
    relationships_xml(&[Relationship::internal(
        "rId1",
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml",
    )])
}

/// Office default colour, font and format schemes.
pub(crate) fn theme_xml() -> String {
    const FILL: &str = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    const LINE: &str =
        r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    const EFFECT: &str = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{}" name="Office Theme">"#, NS_DRAWING));
    xml.push_str("<a:themeElements>");
    xml.push_str(concat!(
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2>"#,
        r#"<a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1>"#,
        r#"<a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3>"#,
        r#"<a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5>"#,
        r#"<a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink>"#,
        r#"<a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
        "</a:clrScheme>"
    ));
    xml.push_str(concat!(
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        "</a:fontScheme>"
    ));
    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    xml.push_str("<a:fillStyleLst>");
    xml.push_str(&FILL.repeat(3));
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    xml.push_str(&LINE.repeat(3));
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    xml.push_str(&EFFECT.repeat(3));
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    xml.push_str(&FILL.repeat(3));
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");
    xml.push_str("</a:themeElements>");
    xml.push_str("</a:theme>");
    xml
}
