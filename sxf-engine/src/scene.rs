use sxf_core::drawing::{ArcDirection, DrawingAttributes, Sheet, SubfigureKind, TextLayout};
use sxf_core::geometry::{Point2, Vector2};
use sxf_core::style::{ColorSpec, Stroke, Style};
use tracing::debug;

use crate::errors::SxfError;
use crate::order;
use crate::record::{Feature, Param};
use crate::registry::ResourceRegistry;

/// 场景节点句柄，仅在创建它的文档内有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// 部分图定义的登记序号（定义顺序，不随输出重排改变）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubfigureId(pub(crate) usize);

impl SubfigureId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    Subfigure(SubfigureId),
    CompositeCurve,
}

/// 场景节点：根节点、部分图或复合曲线。保存待输出的特征队列。
#[derive(Debug, Clone)]
pub struct SceneNode {
    parent: Option<NodeId>,
    role: NodeRole,
    features: Vec<Feature>,
    composite_curves: Vec<(NodeId, Feature)>,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, role: NodeRole) -> Self {
        Self {
            parent,
            role,
            features: Vec::new(),
            composite_curves: Vec::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn role(&self) -> NodeRole {
        self.role
    }

    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// 复合曲线子节点及其定义记录，按创建顺序。
    #[inline]
    pub fn composite_curves(&self) -> &[(NodeId, Feature)] {
        &self.composite_curves
    }
}

/// 全局唯一命名的部分图定义，以及它所配置的其它部分图。
#[derive(Debug, Clone)]
pub struct SubfigureDef {
    name: String,
    kind: SubfigureKind,
    node: NodeId,
    places: Vec<SubfigureId>,
}

impl SubfigureDef {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> SubfigureKind {
        self.kind
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// 该部分图内直接配置的部分图（去重，保持首次配置顺序）。
    #[inline]
    pub fn places(&self) -> &[SubfigureId] {
        &self.places
    }

    pub fn definition_feature(&self) -> Feature {
        Feature::new(
            "sfig_org_feature",
            vec![
                Param::from(self.name.as_str()),
                Param::Int(self.kind.code()),
            ],
        )
    }
}

/// 一份 SXF 图面：资源登记表 + 场景节点树 + 部分图定义。
#[derive(Debug, Clone)]
pub struct Document {
    registry: ResourceRegistry,
    nodes: Vec<SceneNode>,
    subfigures: Vec<SubfigureDef>,
    emission_order: Vec<SubfigureId>,
    attributes: Option<Feature>,
    sheet: Feature,
    sheet_assigned: bool,
}

impl Document {
    pub fn new() -> Self {
        Self {
            registry: ResourceRegistry::new(),
            nodes: vec![SceneNode::new(None, NodeRole::Root)],
            subfigures: Vec::new(),
            emission_order: Vec::new(),
            attributes: None,
            sheet: sheet_feature(&Sheet::default()),
            sheet_assigned: false,
        }
    }

    #[inline]
    pub fn root(&mut self) -> SceneCursor<'_> {
        self.node(NodeId::ROOT)
    }

    /// 取得节点游标。`id` 必须来自本文档。
    #[inline]
    pub fn node(&mut self, id: NodeId) -> SceneCursor<'_> {
        SceneCursor { doc: self, id }
    }

    #[inline]
    pub fn scene_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    #[inline]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    #[inline]
    pub fn subfigures(&self) -> &[SubfigureDef] {
        &self.subfigures
    }

    pub fn subfigure(&self, id: SubfigureId) -> &SubfigureDef {
        &self.subfigures[id.0]
    }

    pub fn find_subfigure(&self, name: &str) -> Option<SubfigureId> {
        self.subfigures
            .iter()
            .position(|def| def.name == name)
            .map(SubfigureId)
    }

    /// 当前的部分图输出顺序。
    #[inline]
    pub fn emission_order(&self) -> &[SubfigureId] {
        &self.emission_order
    }

    pub fn subfigure_names_in_order(&self) -> impl Iterator<Item = &str> {
        self.emission_order
            .iter()
            .map(|id| self.subfigures[id.0].name.as_str())
    }

    #[inline]
    pub fn attributes(&self) -> Option<&Feature> {
        self.attributes.as_ref()
    }

    #[inline]
    pub fn sheet(&self) -> &Feature {
        &self.sheet
    }

    pub fn set_attributes(&mut self, attributes: &DrawingAttributes) -> Result<(), SxfError> {
        if self.attributes.is_some() {
            return Err(SxfError::AlreadySet {
                record: "drawing_attribute_feature",
            });
        }
        let (year, month, day) = attributes.date_parts();
        self.attributes = Some(Feature::new(
            "drawing_attribute_feature",
            vec![
                Param::from(attributes.office_name.as_str()),
                Param::from(attributes.construction_name.as_str()),
                Param::from(attributes.contract_class.as_str()),
                Param::from(attributes.figure_name.as_str()),
                Param::from(attributes.figure_number.as_str()),
                Param::from(attributes.figure_type.as_str()),
                Param::from(attributes.scale.as_str()),
                Param::from(year),
                Param::from(month),
                Param::from(day),
                Param::from(attributes.receiving_organization.as_str()),
                Param::from(attributes.ordering_organization.as_str()),
            ],
        ));
        Ok(())
    }

    /// 替换构造时的默认图纸，仅允许一次。
    pub fn set_sheet(&mut self, sheet: &Sheet) -> Result<(), SxfError> {
        if self.sheet_assigned {
            return Err(SxfError::AlreadySet {
                record: "drawing_sheet_feature",
            });
        }
        self.sheet = sheet_feature(sheet);
        self.sheet_assigned = true;
        Ok(())
    }

    /// 检查配置关系中的循环，并按依赖关系重排部分图的输出顺序。
    pub fn prepare(&mut self) -> Result<(), SxfError> {
        order::check_cycles(&self.subfigures)?;
        self.emission_order = order::dependency_order(&self.subfigures)?;
        debug!(
            subfigures = self.emission_order.len(),
            "部分图输出顺序已确定"
        );
        Ok(())
    }

    fn push_node(&mut self, parent: NodeId, role: NodeRole) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(Some(parent), role));
        id
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn sheet_feature(sheet: &Sheet) -> Feature {
    let (width, height) = sheet
        .dimensions
        .map(|size| (size.x(), size.y()))
        .unwrap_or((0.0, 0.0));
    Feature::new(
        "drawing_sheet_feature",
        vec![
            Param::from(sheet.name.as_str()),
            Param::Int(sheet.size.code()),
            Param::Int(sheet.orientation.code()),
            Param::Real(width),
            Param::Real(height),
        ],
    )
}

/// 指向文档中某个节点的可变游标。所有绘图调用都经由它解析样式并排入特征。
pub struct SceneCursor<'a> {
    doc: &'a mut Document,
    id: NodeId,
}

impl SceneCursor<'_> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn node_mut(&mut self) -> &mut SceneNode {
        &mut self.doc.nodes[self.id.0]
    }

    fn push(&mut self, feature: Feature) {
        debug!(node = self.id.0, keyword = feature.keyword(), "排入特征");
        self.node_mut().features.push(feature);
    }

    fn styled(&mut self, keyword: &str, style: &Style, tail: Vec<Param>) -> Result<(), SxfError> {
        let mut params: Vec<Param> = self
            .doc
            .registry
            .style(style)?
            .into_iter()
            .map(Param::from)
            .collect();
        params.extend(tail);
        self.push(Feature::new(keyword, params));
        Ok(())
    }

    /// 新建全局唯一命名的部分图，返回其节点。
    pub fn define_subfigure(
        &mut self,
        name: &str,
        kind: SubfigureKind,
    ) -> Result<NodeId, SxfError> {
        if self.doc.find_subfigure(name).is_some() {
            return Err(SxfError::DuplicateSubfigure {
                name: name.to_string(),
            });
        }
        let subfigure = SubfigureId(self.doc.subfigures.len());
        let node = self.doc.push_node(self.id, NodeRole::Subfigure(subfigure));
        self.doc.subfigures.push(SubfigureDef {
            name: name.to_string(),
            kind,
            node,
            places: Vec::new(),
        });
        self.doc.emission_order.push(subfigure);
        debug!(name, parent = self.id.0, "定义部分图");
        Ok(node)
    }

    /// 新建匿名复合曲线，仅属于当前节点。
    pub fn define_composite_curve(
        &mut self,
        stroke: &Stroke,
        invisible: bool,
    ) -> Result<NodeId, SxfError> {
        let [colour, line_type, width] = self.doc.registry.stroke(stroke)?;
        let definition = Feature::new(
            "composite_curve_feature",
            vec![
                Param::from(colour),
                Param::from(line_type),
                Param::from(width),
                Param::Int(i64::from(invisible)),
            ],
        );
        let node = self.doc.push_node(self.id, NodeRole::CompositeCurve);
        self.node_mut().composite_curves.push((node, definition));
        Ok(node)
    }

    /// 在当前节点配置已定义的部分图。当前节点本身为部分图时记录依赖边。
    pub fn place_subfigure(
        &mut self,
        layer: &str,
        name: &str,
        position: Point2,
        angle: f64,
        scale: Vector2,
    ) -> Result<(), SxfError> {
        let target = self
            .doc
            .find_subfigure(name)
            .ok_or_else(|| SxfError::UnknownSubfigure {
                name: name.to_string(),
            })?;
        let layer = self.doc.registry.layer(layer)?;
        self.push(Feature::new(
            "sfig_locate_feature",
            vec![
                Param::from(layer),
                Param::from(name),
                Param::Real(position.x()),
                Param::Real(position.y()),
                Param::Real(angle),
                Param::Real(scale.x()),
                Param::Real(scale.y()),
            ],
        ));
        let role = self.doc.nodes[self.id.0].role;
        if let NodeRole::Subfigure(owner) = role {
            let places = &mut self.doc.subfigures[owner.0].places;
            if !places.contains(&target) {
                places.push(target);
            }
        }
        Ok(())
    }

    /// 把当前部分图配置到创建它的父节点中。
    pub fn put(
        &mut self,
        layer: &str,
        position: Point2,
        angle: f64,
        scale: Vector2,
    ) -> Result<(), SxfError> {
        let node = &self.doc.nodes[self.id.0];
        let (parent, subfigure) = match (node.parent, node.role) {
            (Some(parent), NodeRole::Subfigure(subfigure)) => (parent, subfigure),
            (None, _) => return Err(SxfError::PutOnRoot),
            (Some(_), _) => return Err(SxfError::NotASubfigure),
        };
        let name = self.doc.subfigures[subfigure.0].name.clone();
        self.doc
            .node(parent)
            .place_subfigure(layer, &name, position, angle, scale)
    }

    /// 点标记，`marker` 为 1..=7 的标记码。
    pub fn draw_point_marker(
        &mut self,
        layer: &str,
        color: &ColorSpec,
        position: Point2,
        marker: i64,
        rotation: f64,
        scale: f64,
    ) -> Result<(), SxfError> {
        let [layer, colour] = self.doc.registry.layer_colour(layer, color)?;
        self.push(Feature::new(
            "point_marker_feature",
            vec![
                Param::from(layer),
                Param::from(colour),
                Param::Real(position.x()),
                Param::Real(position.y()),
                Param::Int(marker),
                Param::Real(rotation),
                Param::Real(scale),
            ],
        ));
        Ok(())
    }

    pub fn draw_line(&mut self, style: &Style, start: Point2, end: Point2) -> Result<(), SxfError> {
        self.styled(
            "line_feature",
            style,
            vec![
                Param::Real(start.x()),
                Param::Real(start.y()),
                Param::Real(end.x()),
                Param::Real(end.y()),
            ],
        )
    }

    pub fn draw_polyline(&mut self, style: &Style, points: &[Point2]) -> Result<(), SxfError> {
        let xs: Vec<f64> = points.iter().map(|p| p.x()).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y()).collect();
        self.styled(
            "polyline_feature",
            style,
            vec![
                Param::Int(points.len() as i64),
                Param::from(xs),
                Param::from(ys),
            ],
        )
    }

    pub fn draw_circle(
        &mut self,
        style: &Style,
        center: Point2,
        radius: f64,
    ) -> Result<(), SxfError> {
        self.styled(
            "circle_feature",
            style,
            vec![
                Param::Real(center.x()),
                Param::Real(center.y()),
                Param::Real(radius),
            ],
        )
    }

    pub fn draw_arc(
        &mut self,
        style: &Style,
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        direction: ArcDirection,
    ) -> Result<(), SxfError> {
        self.styled(
            "arc_feature",
            style,
            vec![
                Param::Real(center.x()),
                Param::Real(center.y()),
                Param::Real(radius),
                Param::Int(direction.code()),
                Param::Real(start_angle),
                Param::Real(end_angle),
            ],
        )
    }

    pub fn draw_ellipse(
        &mut self,
        style: &Style,
        center: Point2,
        radii: Vector2,
        rotation: f64,
    ) -> Result<(), SxfError> {
        self.styled(
            "ellipse_feature",
            style,
            vec![
                Param::Real(center.x()),
                Param::Real(center.y()),
                Param::Real(radii.x()),
                Param::Real(radii.y()),
                Param::Real(rotation),
            ],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_ellipse_arc(
        &mut self,
        style: &Style,
        center: Point2,
        radii: Vector2,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        direction: ArcDirection,
    ) -> Result<(), SxfError> {
        self.styled(
            "ellipse_arc_feature",
            style,
            vec![
                Param::Real(center.x()),
                Param::Real(center.y()),
                Param::Real(radii.x()),
                Param::Real(radii.y()),
                Param::Int(direction.code()),
                Param::Real(rotation),
                Param::Real(start_angle),
                Param::Real(end_angle),
            ],
        )
    }

    /// 文字。只使用样式中的图层与颜色，字体另行登记。
    pub fn draw_text(
        &mut self,
        style: &Style,
        font: &str,
        text: &str,
        position: Point2,
        layout: &TextLayout,
    ) -> Result<(), SxfError> {
        let [layer, colour, font] = self
            .doc
            .registry
            .text_style(&style.layer, &style.stroke.color, font)?;
        self.push(Feature::new(
            "text_string_feature",
            vec![
                Param::from(layer),
                Param::from(colour),
                Param::from(font),
                Param::from(text),
                Param::Real(position.x()),
                Param::Real(position.y()),
                Param::Real(layout.height),
                Param::Real(layout.width),
                Param::Real(layout.spacing),
                Param::Real(layout.angle),
                Param::Real(layout.slant),
                Param::Int(layout.base_point.code()),
                Param::Int(layout.direction_code()),
            ],
        ));
        Ok(())
    }

    /// 直接排入任意特征。关键字在输出时对照版本表检查。
    pub fn record(&mut self, keyword: &str, params: Vec<Param>) {
        self.push(Feature::new(keyword, params));
    }
}
