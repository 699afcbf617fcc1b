use std::fmt;

use sxf_core::style::{ColorSpec, Stroke, Style};
use tracing::debug;

use crate::errors::SxfError;
use crate::record::{Feature, Param};

pub const COLOUR_LIMIT: usize = 256;
pub const LINE_TYPE_LIMIT: usize = 32;
pub const LINE_WIDTH_LIMIT: usize = 16;
pub const FONT_LIMIT: usize = 1024;
pub const LAYER_LIMIT: usize = 256;
/// 用户线型的最大线段数。
pub const MAX_PITCH_SEGMENTS: usize = 8;

const RESERVED_SLOT: &str = "未使用";

const PREDEFINED_COLOURS: [&str; 16] = [
    "black",
    "red",
    "green",
    "blue",
    "yellow",
    "magenta",
    "cyan",
    "white",
    "deeppink",
    "brown",
    "orange",
    "lightgreen",
    "lightblue",
    "lavender",
    "lightgray",
    "darkgray",
];

const PREDEFINED_LINE_TYPES: [&str; 16] = [
    "continuous",
    "dashed",
    "dashed spaced",
    "long dashed dotted",
    "long dashed double-dotted",
    "long dashed triplicate-dotted",
    "dotted",
    "chain",
    "chain double dash",
    "dashed dotted",
    "Double-dashed dotted",
    "dashed double-dotted",
    "double-dashed double-dotted",
    "dashed triplicate-dotted",
    "double-dashed triplicate-dotted",
    RESERVED_SLOT,
];

const PREDEFINED_LINE_WIDTHS: [f64; 9] = [0.13, 0.18, 0.25, 0.35, 0.5, 0.7, 1.0, 1.4, 2.0];

/// 资源表中的 1 起始编号。一旦分配便不再改变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u32);

impl ResourceId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    fn from_index(index: usize) -> Self {
        // 表容量上限远小于 u32::MAX
        Self(index as u32 + 1)
    }
}

impl From<ResourceId> for Param {
    fn from(value: ResourceId) -> Self {
        Param::Int(i64::from(value.get()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Colour,
    LineType,
    LineWidth,
    Font,
    Layer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Colour => "colour",
            ResourceKind::LineType => "line type",
            ResourceKind::LineWidth => "line width",
            ResourceKind::Font => "font",
            ResourceKind::Layer => "layer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry<V> {
    pub value: V,
    pub predefined: bool,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColourValue {
    Predefined(String),
    Rgb([u8; 3]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineTypeValue {
    pub name: String,
    pub pitch: Option<Vec<f64>>,
}

impl LineTypeValue {
    #[inline]
    pub fn segments(&self) -> Option<usize> {
        self.pitch.as_ref().map(Vec::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineWidthValue {
    Millimetres(f64),
    /// 既定义表的保留槽位，不会被任何数值匹配。
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerValue {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone)]
struct Table<V> {
    kind: ResourceKind,
    limit: usize,
    entries: Vec<ResourceEntry<V>>,
}

impl<V> Table<V> {
    fn new(kind: ResourceKind, limit: usize) -> Self {
        Self {
            kind,
            limit,
            entries: Vec::new(),
        }
    }

    /// 初始化阶段写入既定义项，不标记为已使用。
    fn seed(&mut self, value: V) {
        self.entries.push(ResourceEntry {
            value,
            predefined: true,
            used: false,
        });
    }

    fn position(&self, matches: impl Fn(&ResourceEntry<V>) -> bool) -> Option<usize> {
        self.entries.iter().position(matches)
    }

    fn touch(&mut self, index: usize) -> ResourceId {
        self.entries[index].used = true;
        ResourceId::from_index(index)
    }

    fn ensure_room(&self) -> Result<(), SxfError> {
        if self.entries.len() >= self.limit {
            return Err(SxfError::CapacityExceeded {
                kind: self.kind,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// 已存在则无需检查；否则确认仍有空位。
    fn check(&self, found: Option<usize>) -> Result<(), SxfError> {
        match found {
            Some(_) => Ok(()),
            None => self.ensure_room(),
        }
    }

    fn append(&mut self, value: V) -> Result<ResourceId, SxfError> {
        self.ensure_room()?;
        self.entries.push(ResourceEntry {
            value,
            predefined: false,
            used: true,
        });
        let id = ResourceId::from_index(self.entries.len() - 1);
        debug!(kind = %self.kind, id = id.get(), "追加资源定义");
        Ok(id)
    }

    fn used(&self) -> impl Iterator<Item = (ResourceId, &ResourceEntry<V>)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.used)
            .map(|(index, entry)| (ResourceId::from_index(index), entry))
    }

    fn all(&self) -> impl Iterator<Item = (ResourceId, &ResourceEntry<V>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (ResourceId::from_index(index), entry))
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn validate_pitch(name: &str, pitch: &[f64]) -> Result<(), SxfError> {
    if pitch.is_empty() || pitch.len() > MAX_PITCH_SEGMENTS || pitch.len() % 2 != 0 {
        return Err(SxfError::InvalidPitch {
            name: name.to_string(),
            segments: pitch.len(),
        });
    }
    Ok(())
}

/// 文档级资源登记表：颜色、线型、线宽、字体、图层。
///
/// 相同的值只会得到一个编号；输出时仅列出被引用过的颜色、线型与线宽，
/// 但不会重新编号。
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    colours: Table<ColourValue>,
    line_types: Table<LineTypeValue>,
    line_widths: Table<LineWidthValue>,
    fonts: Table<String>,
    layers: Table<LayerValue>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            colours: Table::new(ResourceKind::Colour, COLOUR_LIMIT),
            line_types: Table::new(ResourceKind::LineType, LINE_TYPE_LIMIT),
            line_widths: Table::new(ResourceKind::LineWidth, LINE_WIDTH_LIMIT),
            fonts: Table::new(ResourceKind::Font, FONT_LIMIT),
            layers: Table::new(ResourceKind::Layer, LAYER_LIMIT),
        };
        for name in PREDEFINED_COLOURS {
            registry
                .colours
                .seed(ColourValue::Predefined(name.to_string()));
        }
        for name in PREDEFINED_LINE_TYPES {
            registry.line_types.seed(LineTypeValue {
                name: name.to_string(),
                pitch: None,
            });
        }
        for width in PREDEFINED_LINE_WIDTHS {
            registry
                .line_widths
                .seed(LineWidthValue::Millimetres(width));
        }
        registry.line_widths.seed(LineWidthValue::Reserved);
        registry
    }

    /// 解析颜色。既定义颜色按名称（忽略大小写）匹配，用户颜色按 RGB 精确匹配。
    pub fn colour(&mut self, spec: &ColorSpec) -> Result<ResourceId, SxfError> {
        match (self.find_colour(spec)?, spec) {
            (Some(index), _) => Ok(self.colours.touch(index)),
            (None, ColorSpec::Rgb(rgb)) => self.colours.append(ColourValue::Rgb(*rgb)),
            (None, ColorSpec::Named(name)) => Err(SxfError::UnknownColour {
                name: name.clone(),
            }),
        }
    }

    fn find_colour(&self, spec: &ColorSpec) -> Result<Option<usize>, SxfError> {
        match spec {
            ColorSpec::Named(name) => self
                .colours
                .position(|entry| match &entry.value {
                    ColourValue::Predefined(existing) => {
                        entry.predefined && same_name(existing, name)
                    }
                    ColourValue::Rgb(_) => false,
                })
                .map(Some)
                .ok_or_else(|| SxfError::UnknownColour { name: name.clone() }),
            ColorSpec::Rgb(rgb) => Ok(self.colours.position(|entry| {
                !entry.predefined && entry.value == ColourValue::Rgb(*rgb)
            })),
        }
    }

    fn check_colour(&self, spec: &ColorSpec) -> Result<(), SxfError> {
        let found = self.find_colour(spec)?;
        self.colours.check(found)
    }

    /// 按名称引用已有线型。
    pub fn line_type(&mut self, name: &str) -> Result<ResourceId, SxfError> {
        self.register_line_type(name, None)
    }

    /// 定义（或再次引用）带线段间距的用户线型。
    pub fn define_line_type(&mut self, name: &str, pitch: &[f64]) -> Result<ResourceId, SxfError> {
        self.register_line_type(name, Some(pitch))
    }

    fn register_line_type(
        &mut self,
        name: &str,
        pitch: Option<&[f64]>,
    ) -> Result<ResourceId, SxfError> {
        let Some(index) = self.find_line_type(name) else {
            let Some(pitch) = pitch else {
                return Err(SxfError::MissingPitch {
                    name: name.to_string(),
                });
            };
            validate_pitch(name, pitch)?;
            return self.line_types.append(LineTypeValue {
                name: name.to_string(),
                pitch: Some(pitch.to_vec()),
            });
        };

        if let Some(pitch) = pitch {
            let entry = &mut self.line_types.entries[index];
            match &entry.value.pitch {
                Some(existing) => {
                    if existing.as_slice() != pitch {
                        return Err(SxfError::PitchMismatch {
                            name: name.to_string(),
                        });
                    }
                }
                None => {
                    if entry.predefined {
                        return Err(SxfError::PredefinedPitch {
                            name: name.to_string(),
                        });
                    }
                    validate_pitch(name, pitch)?;
                    entry.value.pitch = Some(pitch.to_vec());
                }
            }
        }
        Ok(self.line_types.touch(index))
    }

    fn find_line_type(&self, name: &str) -> Option<usize> {
        self.line_types
            .position(|entry| same_name(&entry.value.name, name))
    }

    /// 仅按名称引用时，新线型缺少间距必然失败。
    fn check_line_type(&self, name: &str) -> Result<(), SxfError> {
        match self.find_line_type(name) {
            Some(_) => Ok(()),
            None => Err(SxfError::MissingPitch {
                name: name.to_string(),
            }),
        }
    }

    /// 线宽（mm）按数值精确匹配。
    pub fn line_width(&mut self, millimetres: f64) -> Result<ResourceId, SxfError> {
        match self.find_line_width(millimetres) {
            Some(index) => Ok(self.line_widths.touch(index)),
            None => self
                .line_widths
                .append(LineWidthValue::Millimetres(millimetres)),
        }
    }

    fn find_line_width(&self, millimetres: f64) -> Option<usize> {
        self.line_widths
            .position(|entry| entry.value == LineWidthValue::Millimetres(millimetres))
    }

    pub fn font(&mut self, name: &str) -> Result<ResourceId, SxfError> {
        match self.find_font(name) {
            Some(index) => Ok(self.fonts.touch(index)),
            None => self.fonts.append(name.to_string()),
        }
    }

    fn find_font(&self, name: &str) -> Option<usize> {
        self.fonts.position(|entry| entry.value == name)
    }

    /// 引用图层，不存在时以可见状态新建。
    pub fn layer(&mut self, name: &str) -> Result<ResourceId, SxfError> {
        match self.find_layer(name) {
            Some(index) => Ok(self.layers.touch(index)),
            None => self.layers.append(LayerValue {
                name: name.to_string(),
                visible: true,
            }),
        }
    }

    fn find_layer(&self, name: &str) -> Option<usize> {
        self.layers.position(|entry| entry.value.name == name)
    }

    fn check_stroke(&self, stroke: &Stroke) -> Result<(), SxfError> {
        self.check_colour(&stroke.color)?;
        self.check_line_type(&stroke.line_type)?;
        self.line_widths
            .check(self.find_line_width(stroke.line_width))
    }

    /// 解析线条外观（颜色、线型、线宽）。任一项失败时登记表保持不变。
    pub fn stroke(&mut self, stroke: &Stroke) -> Result<[ResourceId; 3], SxfError> {
        self.check_stroke(stroke)?;
        Ok([
            self.colour(&stroke.color)?,
            self.line_type(&stroke.line_type)?,
            self.line_width(stroke.line_width)?,
        ])
    }

    /// 解析图层与线条外观，返回 [图层, 颜色, 线型, 线宽]。任一项失败时登记表保持不变。
    pub fn style(&mut self, style: &Style) -> Result<[ResourceId; 4], SxfError> {
        self.layers.check(self.find_layer(&style.layer))?;
        self.check_stroke(&style.stroke)?;
        let [colour, line_type, width] = self.stroke(&style.stroke)?;
        Ok([self.layer(&style.layer)?, colour, line_type, width])
    }

    /// 点标记等只需图层与颜色的图元。
    pub fn layer_colour(
        &mut self,
        layer: &str,
        colour: &ColorSpec,
    ) -> Result<[ResourceId; 2], SxfError> {
        self.layers.check(self.find_layer(layer))?;
        self.check_colour(colour)?;
        Ok([self.layer(layer)?, self.colour(colour)?])
    }

    /// 文字使用的图层、颜色与字体。
    pub fn text_style(
        &mut self,
        layer: &str,
        colour: &ColorSpec,
        font: &str,
    ) -> Result<[ResourceId; 3], SxfError> {
        self.fonts.check(self.find_font(font))?;
        let [layer, colour] = self.layer_colour(layer, colour)?;
        Ok([layer, colour, self.font(font)?])
    }

    /// 设置图层的显示状态，图层不存在时一并创建。
    pub fn set_layer_visibility(
        &mut self,
        name: &str,
        visible: bool,
    ) -> Result<ResourceId, SxfError> {
        let id = self.layer(name)?;
        self.layers.entries[id.get() as usize - 1].value.visible = visible;
        Ok(id)
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Colour => self.colours.entries.len(),
            ResourceKind::LineType => self.line_types.entries.len(),
            ResourceKind::LineWidth => self.line_widths.entries.len(),
            ResourceKind::Font => self.fonts.entries.len(),
            ResourceKind::Layer => self.layers.entries.len(),
        }
    }

    pub fn used_colours(&self) -> impl Iterator<Item = (ResourceId, &ResourceEntry<ColourValue>)> {
        self.colours.used()
    }

    pub fn used_line_types(
        &self,
    ) -> impl Iterator<Item = (ResourceId, &ResourceEntry<LineTypeValue>)> {
        self.line_types.used()
    }

    pub fn used_line_widths(
        &self,
    ) -> impl Iterator<Item = (ResourceId, &ResourceEntry<LineWidthValue>)> {
        self.line_widths.used()
    }

    pub fn fonts(&self) -> impl Iterator<Item = (ResourceId, &ResourceEntry<String>)> {
        self.fonts.all()
    }

    pub fn layers(&self) -> impl Iterator<Item = (ResourceId, &ResourceEntry<LayerValue>)> {
        self.layers.all()
    }

    /// 文档开头的定义表：颜色、线型、线宽、字体，各表保持登记顺序。
    pub fn style_features(&self) -> Vec<Feature> {
        let colours = self.used_colours().map(|(_, entry)| match &entry.value {
            ColourValue::Predefined(name) => {
                Feature::new("pre_defined_colour_feature", vec![Param::from(name.as_str())])
            }
            ColourValue::Rgb([r, g, b]) => Feature::new(
                "user_defined_colour_feature",
                vec![
                    Param::Int(i64::from(*r)),
                    Param::Int(i64::from(*g)),
                    Param::Int(i64::from(*b)),
                ],
            ),
        });
        let line_types = self.used_line_types().map(|(_, entry)| {
            let value = &entry.value;
            match (&value.pitch, entry.predefined) {
                (Some(pitch), false) => Feature::new(
                    "user_defined_font_feature",
                    vec![
                        Param::from(value.name.as_str()),
                        Param::Int(pitch.len() as i64),
                        Param::from(pitch.clone()),
                    ],
                ),
                _ => Feature::new(
                    "pre_defined_font_feature",
                    vec![Param::from(value.name.as_str())],
                ),
            }
        });
        let widths = self.used_line_widths().map(|(_, entry)| {
            let param = match entry.value {
                LineWidthValue::Millimetres(width) => Param::Real(width),
                LineWidthValue::Reserved => Param::from(RESERVED_SLOT),
            };
            Feature::new("width_feature", vec![param])
        });
        let fonts = self.fonts().map(|(_, entry)| {
            Feature::new("text_font_feature", vec![Param::from(entry.value.as_str())])
        });

        colours.chain(line_types).chain(widths).chain(fonts).collect()
    }

    /// 文档末尾的图层表。
    pub fn layer_features(&self) -> Vec<Feature> {
        self.layers()
            .map(|(_, entry)| {
                Feature::new(
                    "layer_feature",
                    vec![
                        Param::from(entry.value.name.as_str()),
                        Param::Int(i64::from(entry.value.visible)),
                    ],
                )
            })
            .collect()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_entries_exist_but_are_unused() {
        let registry = ResourceRegistry::new();
        assert_eq!(registry.len(ResourceKind::Colour), 16);
        assert_eq!(registry.len(ResourceKind::LineType), 16);
        assert_eq!(registry.len(ResourceKind::LineWidth), 10);
        assert_eq!(registry.len(ResourceKind::Font), 0);
        assert_eq!(registry.len(ResourceKind::Layer), 0);
        assert!(registry.style_features().is_empty());
    }

    #[test]
    fn interning_is_idempotent_and_case_insensitive() {
        let mut registry = ResourceRegistry::new();
        let red = registry.colour(&"red".into()).unwrap();
        assert_eq!(red, ResourceId::new(2));
        assert_eq!(registry.colour(&"RED".into()).unwrap(), red);

        let user = registry.colour(&ColorSpec::Rgb([1, 2, 3])).unwrap();
        assert_eq!(user, ResourceId::new(17));
        assert_eq!(registry.colour(&ColorSpec::Rgb([1, 2, 3])).unwrap(), user);
        assert_eq!(registry.len(ResourceKind::Colour), 17);

        let dashed = registry.line_type("Dashed").unwrap();
        assert_eq!(dashed, ResourceId::new(2));
        assert_eq!(registry.line_type("DASHED").unwrap(), dashed);

        let width = registry.line_width(0.13).unwrap();
        assert_eq!(width, ResourceId::new(1));
        let custom = registry.line_width(0.3).unwrap();
        assert_eq!(custom, ResourceId::new(11));
        assert_eq!(registry.line_width(0.3).unwrap(), custom);
        assert_eq!(registry.len(ResourceKind::LineWidth), 11);
    }

    #[test]
    fn unknown_colour_name_is_rejected() {
        let mut registry = ResourceRegistry::new();
        let err = registry.colour(&"chartreuse".into()).unwrap_err();
        assert!(matches!(err, SxfError::UnknownColour { .. }));
        assert_eq!(registry.len(ResourceKind::Colour), 16);
    }

    #[test]
    fn colour_capacity_is_enforced() {
        let mut registry = ResourceRegistry::new();
        for i in 0..240u32 {
            let rgb = [(i % 256) as u8, (i / 256) as u8, 7];
            registry.colour(&ColorSpec::Rgb(rgb)).unwrap();
        }
        assert_eq!(registry.len(ResourceKind::Colour), 256);
        let err = registry.colour(&ColorSpec::Rgb([255, 255, 255])).unwrap_err();
        assert!(matches!(
            err,
            SxfError::CapacityExceeded {
                kind: ResourceKind::Colour,
                limit: 256
            }
        ));
        assert_eq!(registry.len(ResourceKind::Colour), 256);
    }

    #[test]
    fn line_type_capacity_is_enforced() {
        let mut registry = ResourceRegistry::new();
        for i in 0..16 {
            registry
                .define_line_type(&format!("user-{i}"), &[1.0, 0.5])
                .unwrap();
        }
        let err = registry.define_line_type("one-too-many", &[1.0, 0.5]).unwrap_err();
        assert!(matches!(err, SxfError::CapacityExceeded { limit: 32, .. }));
        assert_eq!(registry.len(ResourceKind::LineType), 32);
    }

    #[test]
    fn width_font_and_layer_capacities_are_enforced() {
        let mut registry = ResourceRegistry::new();
        for i in 0..6 {
            registry.line_width(3.0 + f64::from(i)).unwrap();
        }
        assert!(registry.line_width(42.0).is_err());
        assert_eq!(registry.len(ResourceKind::LineWidth), 16);

        for i in 0..1024 {
            registry.font(&format!("font-{i}")).unwrap();
        }
        assert!(matches!(
            registry.font("font-overflow"),
            Err(SxfError::CapacityExceeded {
                kind: ResourceKind::Font,
                ..
            })
        ));
        assert_eq!(registry.len(ResourceKind::Font), 1024);

        for i in 0..256 {
            registry.layer(&format!("layer-{i}")).unwrap();
        }
        assert!(registry.layer("layer-overflow").is_err());
        assert_eq!(registry.len(ResourceKind::Layer), 256);
        // 已存在的项仍可引用
        assert_eq!(registry.layer("layer-0").unwrap(), ResourceId::new(1));
    }

    #[test]
    fn pitch_rules() {
        let mut registry = ResourceRegistry::new();
        assert!(matches!(
            registry.line_type("custom"),
            Err(SxfError::MissingPitch { .. })
        ));
        assert!(matches!(
            registry.define_line_type("odd", &[1.0, 2.0, 3.0]),
            Err(SxfError::InvalidPitch { segments: 3, .. })
        ));
        assert!(matches!(
            registry.define_line_type("long", &[1.0; 10]),
            Err(SxfError::InvalidPitch { segments: 10, .. })
        ));
        assert!(matches!(
            registry.define_line_type("empty", &[]),
            Err(SxfError::InvalidPitch { segments: 0, .. })
        ));
        assert!(matches!(
            registry.define_line_type("continuous", &[1.0, 1.0]),
            Err(SxfError::PredefinedPitch { .. })
        ));

        let id = registry.define_line_type("custom", &[2.0, 1.0]).unwrap();
        assert_eq!(id, ResourceId::new(17));
        assert_eq!(registry.define_line_type("CUSTOM", &[2.0, 1.0]).unwrap(), id);
        assert_eq!(registry.line_type("custom").unwrap(), id);
        assert!(matches!(
            registry.define_line_type("custom", &[2.0, 3.0]),
            Err(SxfError::PitchMismatch { .. })
        ));
        assert!(matches!(
            registry.define_line_type("custom", &[2.0, 1.0, 2.0, 1.0]),
            Err(SxfError::PitchMismatch { .. })
        ));
    }

    #[test]
    fn style_resolution_is_all_or_nothing() {
        let mut registry = ResourceRegistry::new();
        for index in 0..(COLOUR_LIMIT - PREDEFINED_COLOURS.len()) {
            registry
                .colour(&ColorSpec::Rgb([1, (index / 256) as u8, (index % 256) as u8]))
                .unwrap();
        }
        let before = registry.used_colours().count();

        let style = Style::new("fresh", [200, 200, 200], "continuous", 0.6);
        let err = registry.style(&style).unwrap_err();
        assert!(matches!(
            err,
            SxfError::CapacityExceeded {
                kind: ResourceKind::Colour,
                ..
            }
        ));
        assert_eq!(registry.len(ResourceKind::Layer), 0);
        assert_eq!(registry.len(ResourceKind::LineWidth), 10);
        assert_eq!(registry.used_colours().count(), before);
        assert_eq!(registry.used_line_types().count(), 0);

        let stroke = Stroke::new("red", "undefined", 0.13);
        assert!(matches!(
            registry.stroke(&stroke),
            Err(SxfError::MissingPitch { .. })
        ));
        assert!(
            registry
                .used_colours()
                .all(|(_, entry)| entry.value != ColourValue::Predefined("red".into()))
        );
        assert_eq!(registry.used_line_widths().count(), 0);

        assert!(matches!(
            registry.text_style("fresh", &"nope".into(), "Meiryo UI"),
            Err(SxfError::UnknownColour { .. })
        ));
        assert_eq!(registry.len(ResourceKind::Font), 0);
        assert_eq!(registry.len(ResourceKind::Layer), 0);

        let ids = registry
            .style(&Style::new("fresh", "red", "continuous", 0.6))
            .unwrap();
        assert_eq!(
            ids,
            [
                ResourceId::new(1),
                ResourceId::new(2),
                ResourceId::new(1),
                ResourceId::new(11),
            ]
        );
    }

    #[test]
    fn emission_filters_unused_without_renumbering() {
        let mut registry = ResourceRegistry::new();
        registry.colour(&"blue".into()).unwrap();
        registry.colour(&ColorSpec::Rgb([9, 8, 7])).unwrap();
        registry.define_line_type("custom", &[2.0, 1.0]).unwrap();
        registry.line_width(0.5).unwrap();
        registry.font("Meiryo UI").unwrap();

        let ids: Vec<u32> = registry.used_colours().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![4, 17]);

        let keywords: Vec<String> = registry
            .style_features()
            .iter()
            .map(|feature| feature.keyword().to_string())
            .collect();
        assert_eq!(
            keywords,
            vec![
                "pre_defined_colour_feature",
                "user_defined_colour_feature",
                "user_defined_font_feature",
                "width_feature",
                "text_font_feature",
            ]
        );
        let line_type = &registry.style_features()[2];
        assert_eq!(
            line_type.params(),
            &[
                Param::Text("custom".into()),
                Param::Int(2),
                Param::List(vec![Param::Real(2.0), Param::Real(1.0)]),
            ]
        );
    }

    #[test]
    fn layer_visibility_updates_in_place() {
        let mut registry = ResourceRegistry::new();
        let id = registry.layer("frame").unwrap();
        assert_eq!(registry.set_layer_visibility("frame", false).unwrap(), id);
        let hidden = registry.set_layer_visibility("hidden", false).unwrap();
        assert_eq!(hidden, ResourceId::new(2));

        let layers = registry.layer_features();
        assert_eq!(layers.len(), 2);
        assert_eq!(
            layers[0].params(),
            &[Param::Text("frame".into()), Param::Int(0)]
        );
    }
}
