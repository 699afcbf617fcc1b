use chrono::NaiveDate;
use sxf_core::drawing::{
    ArcDirection, DrawingAttributes, Orientation, Sheet, SheetSize, SubfigureKind, TextLayout,
};
use sxf_core::geometry::{Point2, Vector2};
use sxf_core::style::{Stroke, Style};
use sxf_engine::{Document, SxfError};
use tracing::debug;

/// 构建示例图面：三层嵌套的部分图、复合曲线、文字与折线。
pub fn build_document(date: NaiveDate) -> Result<Document, SxfError> {
    let mut doc = Document::new();
    let basic = Style::new("layer1", "red", "continuous", 0.13);
    let accent = Style::new("layer1", "blue", "continuous", 0.13);

    doc.set_sheet(&Sheet::new("sample", SheetSize::A3, Orientation::Landscape))?;
    doc.set_attributes(&DrawingAttributes {
        office_name: "a".into(),
        construction_name: "b".into(),
        contract_class: "c".into(),
        figure_name: "d".into(),
        figure_number: "1".into(),
        figure_type: "e".into(),
        scale: "f".into(),
        date,
        receiving_organization: "g".into(),
        ordering_organization: "h".into(),
    })?;
    doc.registry_mut()
        .define_line_type("rail", &[10.0, 2.0, 2.0, 2.0])?;

    let mut root = doc.root();
    root.draw_arc(&basic, Point2::new(100.0, 100.0), 100.0, 0.0, 180.0, ArcDirection::Clockwise)?;
    root.draw_circle(&basic, Point2::new(100.0, 100.0), 10.0)?;

    let part1 = doc.root().define_subfigure("part1", SubfigureKind::default())?;
    doc.node(part1).draw_circle(&basic, Point2::new(100.0, 100.0), 50.0)?;
    doc.node(part1)
        .put("layer1", Point2::origin(), 0.0, Vector2::new(1.5, 2.0))?;

    let part2 = doc.node(part1).define_subfigure("part2", SubfigureKind::default())?;
    doc.node(part2)
        .put("layer2", Point2::origin(), 0.0, Vector2::unit_scale())?;
    doc.node(part2).draw_circle(&accent, Point2::new(50.0, 50.0), 10.0)?;

    let part3 = doc.node(part2).define_subfigure("part3", SubfigureKind::default())?;
    doc.node(part3).draw_circle(&accent, Point2::new(10.0, 10.0), 30.0)?;
    doc.node(part3)
        .put("layer3", Point2::origin(), 0.0, Vector2::unit_scale())?;
    doc.node(part1)
        .place_subfigure("layer1", "part3", Point2::origin(), 0.0, Vector2::unit_scale())?;

    let outline = Style::new("frame", [0, 128, 64], "rail", 0.35);
    let curve = doc
        .root()
        .define_composite_curve(&Stroke::new([0, 128, 64], "rail", 0.35), false)?;
    let mut edge = doc.node(curve);
    edge.draw_line(&outline, Point2::new(0.0, 0.0), Point2::new(200.0, 0.0))?;
    edge.draw_arc(
        &outline,
        Point2::new(200.0, 20.0),
        20.0,
        270.0,
        90.0,
        ArcDirection::CounterClockwise,
    )?;
    edge.draw_line(&outline, Point2::new(200.0, 40.0), Point2::new(0.0, 40.0))?;

    let mut root = doc.root();
    root.draw_text(
        &basic,
        "Meiryo UI",
        "漢字",
        Point2::new(100.0, 100.0),
        &TextLayout::new(5.0, 100.0).with_spacing(1.4),
    )?;
    root.draw_polyline(
        &basic,
        &[
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 500.0),
        ],
    )?;

    doc.registry_mut().set_layer_visibility("layer3", false)?;

    debug!(subfigures = doc.subfigures().len(), "示例图面已构建");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_orders_nested_subfigures_leaves_first() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut doc = build_document(date).unwrap();
        doc.prepare().unwrap();
        let order: Vec<&str> = doc.subfigure_names_in_order().collect();
        assert_eq!(order, vec!["part3", "part2", "part1"]);
    }
}
