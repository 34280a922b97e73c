#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use zip::write::SimpleFileOptions;

use mtexts::drive::PayloadFetcher;
use mtexts::error::{MtextsError, Result};
use mtexts::llm::Summarizer;
use mtexts::models::{FileDescriptor, SummaryResult};

/// Build an in-memory DOCX from a docx-rs builder chain
pub fn create_test_docx<F>(builder_fn: F) -> Vec<u8>
where
    F: FnOnce(docx_rs::Docx) -> docx_rs::Docx,
{
    let docx = builder_fn(docx_rs::Docx::new());
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).expect("Failed to pack DOCX");
    buffer.into_inner()
}

/// One slide: the text of each shape, in order, plus optional speaker notes.
pub struct SlideContent {
    pub shapes: Vec<String>,
    pub notes: Option<String>,
}

impl SlideContent {
    pub fn new(shapes: &[&str]) -> Self {
        Self {
            shapes: shapes.iter().map(|s| s.to_string()).collect(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Build an in-memory PPTX package with one text box per shape
pub fn create_test_pptx(slides: &[SlideContent]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(generate_content_types(slides).as_bytes())
            .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(PPTX_RELS_XML.as_bytes()).unwrap();

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(generate_presentation_xml(slides).as_bytes())
            .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        zip.write_all(generate_presentation_rels(slides).as_bytes())
            .unwrap();

        for (i, slide) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(generate_slide_xml(&slide.shapes).as_bytes())
                .unwrap();

            if let Some(notes) = &slide.notes {
                zip.start_file(format!("ppt/notesSlides/notesSlide{}.xml", i + 1), options)
                    .unwrap();
                zip.write_all(generate_notes_xml(notes).as_bytes()).unwrap();
            }
        }

        zip.finish().unwrap();
    }
    buffer.into_inner()
}

const PPTX_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

fn generate_content_types(slides: &[SlideContent]) -> String {
    let overrides: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
{overrides}</Types>"#
    )
}

fn generate_presentation_xml(slides: &[SlideContent]) -> String {
    let slide_ids: String = (0..slides.len())
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{slide_ids}</p:sldIdLst>
</p:presentation>"#
    )
}

/// rId1 is the master; slides start at rId2 so ids and file numbers differ.
fn generate_presentation_rels(slides: &[SlideContent]) -> String {
    let relationships: String = (0..slides.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i + 2,
                i + 1
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
{relationships}</Relationships>"#
    )
}

fn generate_slide_xml(shapes: &[String]) -> String {
    let body: String = shapes
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let paragraphs: String = text
                .split('\n')
                .map(|line| format!("<a:p><a:r><a:t>{line}</a:t></a:r></a:p>"))
                .collect();
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{paragraphs}</p:txBody></p:sp>"#,
                i + 2,
                i + 1
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr/>
{body}
</p:spTree></p:cSld>
</p:sld>"#
    )
}

fn generate_notes_xml(notes_text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>{notes_text}</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld>
</p:notes>"#
    )
}

/// Build a PDF with one page per entry, each showing its text in Courier
pub fn create_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to save PDF");
    buffer
}

/// What the fake store answers for one download or export.
#[derive(Clone)]
pub enum FetchOutcome {
    Bytes(Vec<u8>),
    Missing,
    Fail(String),
    Panic,
}

/// In-memory document store that records every call it receives.
#[derive(Default)]
pub struct FakeFetcher {
    files: Vec<FileDescriptor>,
    downloads: HashMap<String, FetchOutcome>,
    exports: HashMap<(String, String), FetchOutcome>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, descriptor: FileDescriptor) -> Self {
        self.files.push(descriptor);
        self
    }

    pub fn with_download(mut self, id: &str, outcome: FetchOutcome) -> Self {
        self.downloads.insert(id.to_string(), outcome);
        self
    }

    pub fn with_export(mut self, id: &str, mime_type: &str, outcome: FetchOutcome) -> Self {
        self.exports
            .insert((id.to_string(), mime_type.to_string()), outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(outcome: Option<&FetchOutcome>) -> Result<Option<Vec<u8>>> {
        match outcome {
            Some(FetchOutcome::Bytes(bytes)) => Ok(Some(bytes.clone())),
            Some(FetchOutcome::Missing) | None => Ok(None),
            Some(FetchOutcome::Fail(message)) => Err(MtextsError::Drive(message.clone())),
            Some(FetchOutcome::Panic) => panic!("fake store blew up"),
        }
    }
}

#[async_trait]
impl PayloadFetcher for FakeFetcher {
    async fn list(&self, folder_id: Option<&str>) -> Result<Vec<FileDescriptor>> {
        self.record(format!("list:{}", folder_id.unwrap_or("")));
        Ok(self.files.clone())
    }

    async fn download(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        self.record(format!("download:{file_id}"));
        Self::answer(self.downloads.get(file_id))
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Option<Vec<u8>>> {
        self.record(format!("export:{file_id}:{mime_type}"));
        Self::answer(
            self.exports
                .get(&(file_id.to_string(), mime_type.to_string())),
        )
    }
}

/// Summarizer that echoes the text length and remembers what it was given.
#[derive(Default)]
pub struct EchoSummarizer {
    seen: Mutex<Vec<(String, usize)>>,
}

impl EchoSummarizer {
    pub fn seen(&self) -> Vec<(String, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, text: &str, max_length_hint: usize) -> SummaryResult {
        self.seen
            .lock()
            .unwrap()
            .push((text.to_string(), max_length_hint));
        SummaryResult::new(
            format!("Summary of {} characters.", text.chars().count()),
            vec!["echo".to_string()],
        )
    }
}
