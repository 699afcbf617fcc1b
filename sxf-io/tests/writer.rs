use chrono::{DateTime, Utc};
use encoding_rs::SHIFT_JIS;
use sxf_core::drawing::{SubfigureKind, TextLayout};
use sxf_core::geometry::{Point2, Vector2};
use sxf_core::style::{Stroke, Style};
use sxf_engine::{Document, Numbering, NullSink, SxfError, serialize};
use sxf_io::{Destination, DocumentSaver, IoError, SfcWriter, WriterOptions};
use tempfile::tempdir;

fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-02T03:04:05.678Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn circle_document() -> Document {
    let mut doc = Document::new();
    let style = Style::new("layer1", "black", "continuous", 0.13);
    doc.root()
        .draw_circle(&style, Point2::new(100.0, 100.0), 10.0)
        .unwrap();
    doc
}

#[test]
fn envelope_wraps_data_section() {
    let mut doc = circle_document();
    doc.prepare().unwrap();
    let writer = SfcWriter::default();
    let mut bytes = Vec::new();
    let summary = writer
        .write_to(&doc, &mut bytes, "drawing.sfc", fixed_time())
        .unwrap();
    assert_eq!(summary.records, 6);
    assert_eq!(summary.last_instance, Some(60));

    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        &lines[..7],
        &[
            "ISO-10303-21;",
            "HEADER;",
            "FILE_DESCRIPTION(('SCADEC level2 feature_mode'),'2;1');",
            "FILE_NAME('drawing.sfc','2024-01-02T03:04:05.678Z',('author'),('organization'),'SCADEC_API_Ver3.10$$3.1','translator');",
            "FILE_SCHEMA(('ASSOCIATIVE_DRAUGHTING'));",
            "ENDSEC;",
            "DATA;",
        ]
    );
    assert_eq!(&lines[lines.len() - 2..], &["ENDSEC;", "END-ISO-10303-21;"]);
    assert!(text.contains("#40 = circle_feature('1','1','1','1','100','100','10')"));
    let last_record = lines[lines.len() - 4];
    assert!(last_record.starts_with("#60 = layer_feature("));
}

#[test]
fn header_fields_and_numbering_are_configurable() {
    let mut doc = circle_document();
    doc.prepare().unwrap();
    let writer = SfcWriter::new(WriterOptions {
        numbering: Numbering { base: 1, step: 1 },
        author: "yamada".into(),
        organization: "works".into(),
        translator: "sxf-rs".into(),
    });
    let mut bytes = Vec::new();
    writer
        .write_to(&doc, &mut bytes, "a.sfc", fixed_time())
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("('yamada'),('works'),'SCADEC_API_Ver3.10$$3.1','sxf-rs');"));
    assert!(text.contains("#1 = pre_defined_colour_feature("));
    assert!(text.contains("#6 = layer_feature("));
}

#[test]
fn file_output_is_shift_jis() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kanji.sfc");
    let mut doc = Document::new();
    let style = Style::new("図枠", "black", "continuous", 0.13);
    doc.root()
        .draw_text(&style, "ＭＳ ゴシック", "漢字", Point2::origin(), &TextLayout::new(5.0, 10.0))
        .unwrap();

    let summary = SfcWriter::default()
        .output(&mut doc, &Destination::File(path.clone()))
        .unwrap();
    assert_eq!(summary.destination, Destination::File(path.clone()));

    let bytes = std::fs::read(&path).unwrap();
    let (expected, _, _) = SHIFT_JIS.encode("\\'漢字\\'");
    assert!(
        bytes
            .windows(expected.len())
            .any(|window| window == &expected[..])
    );
    let (decoded, _, had_errors) = SHIFT_JIS.decode(&bytes);
    assert!(!had_errors);
    assert!(decoded.starts_with("ISO-10303-21;\n"));
    assert!(decoded.contains("layer_feature('\\'図枠\\'','1')"));
}

#[test]
fn placement_cycle_creates_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cycle.sfc");
    let mut doc = Document::new();
    let a = doc
        .root()
        .define_subfigure("A", SubfigureKind::default())
        .unwrap();
    let b = doc
        .root()
        .define_subfigure("B", SubfigureKind::default())
        .unwrap();
    doc.node(a)
        .place_subfigure("layer1", "B", Point2::origin(), 0.0, Vector2::unit_scale())
        .unwrap();
    doc.node(b)
        .place_subfigure("layer1", "A", Point2::origin(), 0.0, Vector2::unit_scale())
        .unwrap();

    let err = SfcWriter::default().save(&mut doc, &path).unwrap_err();
    assert!(matches!(
        err,
        IoError::Document(SxfError::PlacementCycle { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn unsupported_feature_aborts_before_file_creation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unsupported.sfc");
    let mut doc = circle_document();
    doc.root().record("solid_feature", Vec::new());

    let err = SfcWriter::default()
        .output(&mut doc, &Destination::File(path.clone()))
        .unwrap_err();
    assert!(matches!(
        err,
        IoError::Document(SxfError::UnsupportedFeature { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn null_destination_traverses_without_writing() {
    let mut doc = circle_document();
    let summary = SfcWriter::default()
        .output(&mut doc, &Destination::Null)
        .unwrap();
    assert_eq!(summary.records, 6);
    assert_eq!(summary.destination, Destination::Null);
}

#[test]
fn missing_directory_is_a_create_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.sfc");
    let mut doc = circle_document();
    let err = SfcWriter::default()
        .output(&mut doc, &Destination::File(path))
        .unwrap_err();
    assert!(matches!(err, IoError::CreateError { .. }));
}

#[test]
fn nested_subfigures_are_written_leaves_first() {
    let mut doc = Document::new();
    let style = Style::new("layer1", "red", "continuous", 0.13);
    let outer = doc
        .root()
        .define_subfigure("outer", SubfigureKind::DrawingGroup)
        .unwrap();
    let inner = doc
        .node(outer)
        .define_subfigure("inner", SubfigureKind::default())
        .unwrap();
    doc.node(inner)
        .draw_circle(&style, Point2::origin(), 1.0)
        .unwrap();
    doc.node(inner)
        .put("layer1", Point2::new(5.0, 0.0), 0.0, Vector2::unit_scale())
        .unwrap();
    doc.node(outer)
        .put("layer1", Point2::new(0.0, 5.0), 0.0, Vector2::unit_scale())
        .unwrap();
    doc.prepare().unwrap();

    let mut bytes = Vec::new();
    SfcWriter::default()
        .write_to(&doc, &mut bytes, "nested.sfc", fixed_time())
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let inner_def = text.find("sfig_org_feature('\\'inner\\''").unwrap();
    let outer_def = text.find("sfig_org_feature('\\'outer\\''").unwrap();
    let inner_use = text.find("sfig_locate_feature('1','\\'inner\\''").unwrap();
    assert!(inner_def < inner_use);
    assert!(inner_use < outer_def);
}

fn layered_document() -> Document {
    let mut doc = circle_document();
    let style = Style::new("layer2", [10, 20, 30], "continuous", 0.25);
    let part = doc
        .root()
        .define_subfigure("part", SubfigureKind::default())
        .unwrap();
    doc.node(part)
        .draw_line(&style, Point2::origin(), Point2::new(10.0, 0.0))
        .unwrap();
    doc.node(part)
        .put("layer1", Point2::new(5.0, 5.0), 0.0, Vector2::unit_scale())
        .unwrap();
    let curve = doc
        .node(part)
        .define_composite_curve(&Stroke::new("blue", "dashed", 0.35), false)
        .unwrap();
    doc.node(curve)
        .draw_line(&style, Point2::origin(), Point2::new(0.0, 10.0))
        .unwrap();
    doc.root()
        .draw_text(&style, "Meiryo UI", "abc", Point2::origin(), &TextLayout::new(5.0, 10.0))
        .unwrap();
    doc
}

#[test]
fn written_records_match_the_dry_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layered.sfc");
    let writer = SfcWriter::new(WriterOptions {
        numbering: Numbering { base: 7, step: 3 },
        ..WriterOptions::default()
    });
    let mut doc = layered_document();
    doc.prepare().unwrap();

    let dry = serialize(&doc, writer.options().numbering, &mut NullSink).unwrap();
    let mut bytes = Vec::new();
    let written = writer
        .write_to(&doc, &mut bytes, "layered.sfc", fixed_time())
        .unwrap();
    assert_eq!(written, dry);
    assert_eq!(dry.last_instance, Some(7 + 3 * (dry.records as u64 - 1)));

    let summary = writer
        .output(&mut doc, &Destination::File(path.clone()))
        .unwrap();
    assert_eq!(summary.records, dry.records);
    assert_eq!(summary.last_instance, dry.last_instance);
    let text = String::from_utf8(std::fs::read(&path).unwrap()).unwrap();
    let records = text.lines().filter(|line| line.starts_with('#')).count();
    assert_eq!(records, dry.records);
}

#[test]
fn numbering_overflow_creates_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("overflow.sfc");
    let writer = SfcWriter::new(WriterOptions {
        numbering: Numbering {
            base: u64::MAX - 5,
            step: 10,
        },
        ..WriterOptions::default()
    });
    let mut doc = circle_document();

    let err = writer
        .output(&mut doc, &Destination::File(path.clone()))
        .unwrap_err();
    assert!(matches!(
        err,
        IoError::Document(SxfError::InstanceOverflow { .. })
    ));
    assert!(!path.exists());
}
