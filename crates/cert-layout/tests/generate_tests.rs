use cert_layout::*;
use image::{ImageFormat, Rgb as Pixel, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

fn record(name: &str, course_time: &str) -> Record {
    let mut record = Record::new();
    record.insert("studentName".into(), name.into());
    record.insert("courseTime".into(), course_time.into());
    record
}

fn records(count: usize) -> Vec<Record> {
    (0..count).map(|i| record(&format!("STUDENT {}", i), "4 hr")).collect()
}

fn template(per_page: f64) -> Template {
    let mut template = default_template();
    template.certificates_per_page = CertificatesPerPage::from_raw(per_page);
    template
}

fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().values().next().unwrap()
}

fn page_xobjects(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    resources
        .get(b"XObject")
        .ok()
        .and_then(|x| x.as_dict().ok())
        .cloned()
}

fn page_content(doc: &Document, page_id: ObjectId) -> String {
    let page = doc.get_dictionary(page_id).unwrap();
    let content_id = page.get(b"Contents").unwrap().as_reference().unwrap();
    let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn create_background_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"0 0 1 rg 0 0 100 100 re f".to_vec(),
    ));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(306),
                Object::Integer(396),
            ]),
        ),
        ("Resources", Object::Dictionary(Dictionary::new())),
        ("Contents", Object::Reference(content_id)),
    ]));
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Pixel([10, 20, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_records_are_packed_per_page() {
    for (per_page, count, expected_pages) in [(1.0, 4, 4), (2.0, 5, 3), (3.0, 7, 3), (3.0, 6, 2)] {
        let bytes = generate_pdf(&template(per_page), &records(count), &GenerateOptions::default())
            .await
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), expected_pages, "{} per page, {} records", per_page, count);

        let stats = calculate_statistics(&template(per_page), count).unwrap();
        assert_eq!(stats.pages, expected_pages);
    }
}

#[tokio::test]
async fn test_page_content_holds_each_record_once() {
    let bytes = generate_pdf(&template(3.0), &records(3), &GenerateOptions::default())
        .await
        .unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let content = page_content(&doc, first_page(&doc));
    for i in 0..3 {
        assert_eq!(content.matches(&format!("(STUDENT {})", i)).count(), 1);
    }
    // Output never carries preview dividers unless asked to
    assert!(!content.contains("[4 4] 0 d"));
}

#[tokio::test]
async fn test_fill_page_replicates_record() {
    let options = GenerateOptions {
        fill_page: true,
        draw_dividers: true,
        ..Default::default()
    };
    let bytes = generate_pdf(&template(3.0), &records(1), &options).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let content = page_content(&doc, first_page(&doc));
    assert_eq!(content.matches("(STUDENT 0)").count(), 3);
    assert_eq!(content.matches("[4 4] 0 d").count(), 2);
}

#[tokio::test]
async fn test_no_records_is_an_error() {
    let result = generate_pdf(&template(1.0), &[], &GenerateOptions::default()).await;
    assert!(matches!(result, Err(CertError::NoRecords)));
    assert!(matches!(
        calculate_statistics(&template(1.0), 0),
        Err(CertError::NoRecords)
    ));
}

#[tokio::test]
async fn test_missing_background_degrades_to_white() {
    let mut template = template(1.0);
    template.background = Background::Image("does-not-exist.png".into());
    let bytes = generate_pdf(&template, &records(1), &GenerateOptions::default())
        .await
        .unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let xobjects = page_xobjects(&doc, first_page(&doc));
    assert!(xobjects.is_none_or(|x| !x.has(b"Bg")));
}

#[tokio::test]
async fn test_pdf_background_is_embedded_and_scaled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.pdf"), create_background_pdf()).unwrap();

    let mut template = template(2.0);
    template.background = Background::Pdf("base.pdf".into());
    let options = GenerateOptions {
        asset_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let bytes = generate_pdf(&template, &records(4), &options).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    for page_id in doc.get_pages().into_values() {
        let xobjects = page_xobjects(&doc, page_id).unwrap();
        assert!(xobjects.has(b"Bg"));
        let content = page_content(&doc, page_id);
        // Drawn once per page, scaled from 306x396 to 612x792
        assert_eq!(content.matches("/Bg Do").count(), 1);
        assert!(content.starts_with("q 2 0 0 2 0 0 cm /Bg Do Q"));
    }
}

#[tokio::test]
async fn test_color_background_fills_page() {
    let mut template = template(1.0);
    template.background = Background::Color("#ff0000".into());
    let bytes = generate_pdf(&template, &records(1), &GenerateOptions::default())
        .await
        .unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let content = page_content(&doc, first_page(&doc));
    assert!(content.starts_with("q 1 0 0 rg 0 0 612 792 re f Q"));
}

#[tokio::test]
async fn test_image_elements_embed_and_missing_ones_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("seal.png"), png_bytes()).unwrap();

    let image = |id: &str, url: &str| ImageElement {
        id: id.into(),
        url: url.into(),
        x: 400.0,
        y: 600.0,
        width: 80.0,
        height: 80.0,
        grayscale: true,
        binding: None,
    };
    let template = template(1.0)
        .with_image_element(image("seal", "seal.png"))
        .with_image_element(image("logo", "missing.png"));
    let options = GenerateOptions {
        asset_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let bytes = generate_pdf(&template, &records(2), &options).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    for page_id in doc.get_pages().into_values() {
        let xobjects = page_xobjects(&doc, page_id).unwrap();
        assert!(xobjects.has(b"Im1"));
        assert!(!xobjects.has(b"Im2"));
        let content = page_content(&doc, page_id);
        assert!(content.contains("(STUDENT"));
    }
}

#[tokio::test]
async fn test_preview_is_one_page_of_examples() {
    let bytes = generate_preview(&template(2.0), &GenerateOptions::default())
        .await
        .unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let content = page_content(&doc, first_page(&doc));
    assert_eq!(content.matches("(JOHN DOE)").count(), 2);
}

#[tokio::test]
async fn test_save_and_load_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");

    let bytes = generate_pdf(&template(2.0), &records(3), &GenerateOptions::default())
        .await
        .unwrap();
    save_pdf(&bytes, &path).await.unwrap();

    assert!(!dir.path().join("out.pdf.tmp").exists());
    let doc = load_pdf(&path).await.unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}
