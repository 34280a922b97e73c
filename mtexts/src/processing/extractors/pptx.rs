//! PPTX extractor using zip + quick-xml

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{MtextsError, Result};
use crate::processing::scratch::ScratchFile;

pub struct PptxExtractor;

impl PptxExtractor {
    pub fn extract(bytes: &[u8]) -> Result<String> {
        Self::extract_in(bytes, &std::env::temp_dir())
    }

    pub fn extract_in(bytes: &[u8], scratch_dir: &Path) -> Result<String> {
        let scratch = ScratchFile::create_in(scratch_dir, ".pptx", bytes)?;
        Self::extract_file(scratch.path())
    }

    /// Slide texts in presentation order joined by blank lines. Within a
    /// slide, every text-bearing shape contributes one block; slides
    /// without text are left out.
    pub fn extract_file(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| MtextsError::Processing(format!("PPTX parse error: {e}")))?;

        let slide_order = Self::get_slide_order(&mut archive)?;
        let slide_mapping = Self::get_slide_mapping(&mut archive)?;

        let mut slides = Vec::new();
        for (index, r_id) in slide_order.iter().enumerate() {
            let slide_path = match slide_mapping.get(r_id) {
                Some(path) => path.clone(),
                None => format!("ppt/slides/slide{}.xml", index + 1),
            };

            let xml = match Self::read_file_from_archive(&mut archive, &slide_path) {
                Ok(xml) => xml,
                Err(e) => {
                    tracing::warn!("Skipping slide {}: {}", index + 1, e);
                    continue;
                }
            };

            let text = Self::extract_slide_text(&xml)?;
            if !text.trim().is_empty() {
                slides.push(text);
            }
        }

        Ok(slides.join("\n\n"))
    }

    fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let xml = Self::read_file_from_archive(archive, "ppt/presentation.xml")?;

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut slide_ids = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"p:sldId" => {
                    let r_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"r:id")
                        .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(String::from));
                    if let Some(r_id) = r_id {
                        slide_ids.push(r_id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(MtextsError::Processing(format!(
                        "Error parsing presentation.xml: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(slide_ids)
    }

    /// Relationship id to archive path, for slide relationships only.
    fn get_slide_mapping<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<HashMap<String, String>> {
        let xml = match Self::read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels") {
            Ok(xml) => xml,
            Err(_) => return Ok(HashMap::new()),
        };

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut mapping = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = std::str::from_utf8(&attr.value).ok().map(String::from);
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/slide") {
                            let target = target.trim_start_matches('/');
                            let full_path = if target.starts_with("ppt/") {
                                target.to_string()
                            } else {
                                format!("ppt/{target}")
                            };
                            mapping.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(mapping)
    }

    /// Shape texts of one slide joined by newlines. A shape's text is its
    /// paragraphs joined by newlines, with `a:br` rendered as a newline.
    /// Only top-level shapes count; shapes inside a `p:grpSp` are ignored.
    fn extract_slide_text(xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);

        let mut shapes: Vec<String> = Vec::new();
        let mut paragraphs: Vec<String> = Vec::new();
        let mut paragraph = String::new();
        let mut in_shape = false;
        let mut has_text_body = false;
        let mut in_text = false;
        let mut group_depth: usize = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"p:grpSp" => group_depth += 1,
                    b"p:sp" if group_depth == 0 => {
                        in_shape = true;
                        has_text_body = false;
                        paragraphs.clear();
                        paragraph.clear();
                    }
                    b"p:txBody" if in_shape => has_text_body = true,
                    b"a:t" => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"a:br" && in_shape && has_text_body {
                        paragraph.push('\n');
                    }
                }
                Ok(Event::Text(e)) if in_text && in_shape => {
                    paragraph.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::GeneralRef(e)) if in_text && in_shape => {
                    let name = std::str::from_utf8(&e).unwrap_or_default();
                    match Self::resolve_reference(name) {
                        Some(c) => paragraph.push(c),
                        None => {
                            paragraph.push('&');
                            paragraph.push_str(name);
                            paragraph.push(';');
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"a:t" => in_text = false,
                    b"a:p" if in_shape && has_text_body => {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    }
                    b"p:grpSp" => group_depth = group_depth.saturating_sub(1),
                    b"p:sp" if group_depth == 0 => {
                        if has_text_body {
                            let text = paragraphs.join("\n");
                            if !text.trim().is_empty() {
                                shapes.push(text);
                            }
                        }
                        in_shape = false;
                        has_text_body = false;
                        paragraphs.clear();
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(MtextsError::Processing(format!(
                        "Error parsing slide XML: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(shapes.join("\n"))
    }

    /// Resolves the predefined XML entities and numeric character references.
    fn resolve_reference(name: &str) -> Option<char> {
        match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let code = if let Some(hex) = name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    name.strip_prefix('#')?.parse::<u32>().ok()?
                };
                char::from_u32(code)
            }
        }
    }

    fn read_file_from_archive<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| MtextsError::Processing(format!("Failed to read {path} from PPTX: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| MtextsError::Processing(format!("Failed to read {path} content: {e}")))?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!("<p:sp><p:nvSpPr/><p:txBody><a:bodyPr/>{body}</p:txBody></p:sp>")
    }

    fn slide(shapes: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            shapes.concat()
        )
    }

    #[test]
    fn test_shapes_and_paragraphs_are_newline_joined() {
        let xml = slide(&[shape(&["Title"]), shape(&["Line one", "Line two"])]);
        assert_eq!(
            PptxExtractor::extract_slide_text(&xml).unwrap(),
            "Title\nLine one\nLine two"
        );
    }

    #[test]
    fn test_entities_and_line_breaks() {
        let xml = slide(&[
            "<p:sp><p:txBody><a:p><a:r><a:t>R&amp;D &lt;3</a:t></a:r><a:br/><a:r><a:t>&#x263A; &#65;</a:t></a:r></a:p></p:txBody></p:sp>"
                .to_string(),
        ]);
        assert_eq!(
            PptxExtractor::extract_slide_text(&xml).unwrap(),
            "R&D <3\n\u{263A} A"
        );
    }

    #[test]
    fn test_whitespace_inside_runs_is_kept() {
        let xml = slide(&[shape(&["  indented  text "])]);
        assert_eq!(
            PptxExtractor::extract_slide_text(&xml).unwrap(),
            "  indented  text "
        );
    }

    #[test]
    fn test_empty_shapes_are_skipped() {
        let xml = slide(&[shape(&[""]), shape(&["Only"])]);
        assert_eq!(PptxExtractor::extract_slide_text(&xml).unwrap(), "Only");
    }

    #[test]
    fn test_text_outside_shapes_is_ignored() {
        let xml = slide(&[
            "<p:graphicFrame><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></p:graphicFrame>"
                .to_string(),
            shape(&["Body"]),
        ]);
        assert_eq!(PptxExtractor::extract_slide_text(&xml).unwrap(), "Body");
    }

    #[test]
    fn test_grouped_shapes_are_ignored() {
        let group = format!(
            "<p:grpSp><p:nvGrpSpPr/><p:grpSpPr/>{}<p:grpSp>{}</p:grpSp></p:grpSp>",
            shape(&["Inside group"]),
            shape(&["Nested deeper"])
        );
        let xml = slide(&[shape(&["Before"]), group, shape(&["After"])]);
        assert_eq!(
            PptxExtractor::extract_slide_text(&xml).unwrap(),
            "Before\nAfter"
        );
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(PptxExtractor::resolve_reference("amp"), Some('&'));
        assert_eq!(PptxExtractor::resolve_reference("#10"), Some('\n'));
        assert_eq!(PptxExtractor::resolve_reference("#x41"), Some('A'));
        assert_eq!(PptxExtractor::resolve_reference("nbsp"), None);
    }
}
