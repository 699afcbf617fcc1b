pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn origin() -> Self {
            Self(DVec2::ZERO)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl From<[f64; 2]> for Point2 {
        fn from([x, y]: [f64; 2]) -> Self {
            Self::new(x, y)
        }
    }

    impl From<(f64, f64)> for Point2 {
        fn from((x, y): (f64, f64)) -> Self {
            Self::new(x, y)
        }
    }

    /// 二维向量。用于缩放比、椭圆半径与自由尺寸图纸的宽高。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        /// 等比缩放 (1, 1)。
        #[inline]
        pub fn unit_scale() -> Self {
            Self(DVec2::ONE)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl From<[f64; 2]> for Vector2 {
        fn from([x, y]: [f64; 2]) -> Self {
            Self::new(x, y)
        }
    }

    impl From<(f64, f64)> for Vector2 {
        fn from((x, y): (f64, f64)) -> Self {
            Self::new(x, y)
        }
    }
}

pub mod coords {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use crate::geometry::{Point2, Vector2};

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum CoordinateError {
        #[error("coordinate object is missing the `{0}` component")]
        MissingAxis(char),
    }

    /// 外部传入的坐标：`[x, y]` 数对，或键名大小写不敏感的 `{x, y}` 对象。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum XyInput {
        Pair([f64; 2]),
        Keyed(BTreeMap<String, f64>),
    }

    impl XyInput {
        /// 归一化为 (x, y)。对象形式下同名键（忽略大小写）以最后出现者为准。
        pub fn components(&self) -> Result<(f64, f64), CoordinateError> {
            match self {
                XyInput::Pair([x, y]) => Ok((*x, *y)),
                XyInput::Keyed(map) => {
                    let mut x = None;
                    let mut y = None;
                    for (key, value) in map {
                        match key.to_lowercase().as_str() {
                            "x" => x = Some(*value),
                            "y" => y = Some(*value),
                            _ => {}
                        }
                    }
                    Ok((
                        x.ok_or(CoordinateError::MissingAxis('x'))?,
                        y.ok_or(CoordinateError::MissingAxis('y'))?,
                    ))
                }
            }
        }

        pub fn to_point(&self) -> Result<Point2, CoordinateError> {
            self.components().map(|(x, y)| Point2::new(x, y))
        }

        pub fn to_vector(&self) -> Result<Vector2, CoordinateError> {
            self.components().map(|(x, y)| Vector2::new(x, y))
        }
    }

    impl From<[f64; 2]> for XyInput {
        fn from(value: [f64; 2]) -> Self {
            XyInput::Pair(value)
        }
    }

    impl TryFrom<XyInput> for Point2 {
        type Error = CoordinateError;

        fn try_from(value: XyInput) -> Result<Self, Self::Error> {
            value.to_point()
        }
    }

    impl TryFrom<XyInput> for Vector2 {
        type Error = CoordinateError;

        fn try_from(value: XyInput) -> Result<Self, Self::Error> {
            value.to_vector()
        }
    }
}

pub mod style {
    use serde::{Deserialize, Serialize};

    /// 颜色输入：既定义颜色名（大小写不敏感）或用户定义的 RGB。
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum ColorSpec {
        Named(String),
        Rgb([u8; 3]),
    }

    impl From<&str> for ColorSpec {
        fn from(value: &str) -> Self {
            ColorSpec::Named(value.to_string())
        }
    }

    impl From<String> for ColorSpec {
        fn from(value: String) -> Self {
            ColorSpec::Named(value)
        }
    }

    impl From<[u8; 3]> for ColorSpec {
        fn from(value: [u8; 3]) -> Self {
            ColorSpec::Rgb(value)
        }
    }

    /// 线条外观：颜色、线型、线宽（mm）。复合曲线只使用这一部分。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Stroke {
        pub color: ColorSpec,
        pub line_type: String,
        pub line_width: f64,
    }

    impl Stroke {
        pub fn new(
            color: impl Into<ColorSpec>,
            line_type: impl Into<String>,
            line_width: f64,
        ) -> Self {
            Self {
                color: color.into(),
                line_type: line_type.into(),
                line_width,
            }
        }
    }

    /// 图元的基本设定：图层 + 线条外观。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Style {
        pub layer: String,
        pub stroke: Stroke,
    }

    impl Style {
        pub fn new(
            layer: impl Into<String>,
            color: impl Into<ColorSpec>,
            line_type: impl Into<String>,
            line_width: f64,
        ) -> Self {
            Self {
                layer: layer.into(),
                stroke: Stroke::new(color, line_type, line_width),
            }
        }
    }
}

pub mod drawing {
    use chrono::{Datelike, NaiveDate};
    use serde::{Deserialize, Serialize};

    use crate::geometry::Vector2;

    /// 部分图的种别。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum SubfigureKind {
        /// 部分图（数学坐标系）
        MathPart,
        /// 部分图（测地坐标系）
        GeodeticPart,
        /// 作图组
        DrawingGroup,
        /// 作图部件
        #[default]
        DrawingPart,
    }

    impl SubfigureKind {
        #[inline]
        pub fn code(self) -> i64 {
            match self {
                SubfigureKind::MathPart => 1,
                SubfigureKind::GeodeticPart => 2,
                SubfigureKind::DrawingGroup => 3,
                SubfigureKind::DrawingPart => 4,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum ArcDirection {
        #[default]
        CounterClockwise,
        Clockwise,
    }

    impl ArcDirection {
        #[inline]
        pub fn code(self) -> i64 {
            match self {
                ArcDirection::CounterClockwise => 0,
                ArcDirection::Clockwise => 1,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum TextDirection {
        #[default]
        Horizontal,
        Vertical,
    }

    /// 文字配置基准点，编号 1..=9 自左下起按行排列。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum BasePoint {
        #[default]
        BottomLeft,
        BottomCenter,
        BottomRight,
        MiddleLeft,
        MiddleCenter,
        MiddleRight,
        TopLeft,
        TopCenter,
        TopRight,
    }

    impl BasePoint {
        #[inline]
        pub fn code(self) -> i64 {
            self as i64 + 1
        }
    }

    /// 文字排版参数。高度与宽度必须给出，其余沿用默认值。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct TextLayout {
        pub height: f64,
        pub width: f64,
        pub spacing: f64,
        /// 文字方向角，[0, 360)
        pub angle: f64,
        /// 字体倾斜角，[-85, 85]
        pub slant: f64,
        pub base_point: BasePoint,
        pub direction: TextDirection,
    }

    impl TextLayout {
        pub fn new(height: f64, width: f64) -> Self {
            Self {
                height,
                width,
                spacing: 0.0,
                angle: 0.0,
                slant: 0.0,
                base_point: BasePoint::default(),
                direction: TextDirection::default(),
            }
        }

        pub fn with_spacing(mut self, spacing: f64) -> Self {
            self.spacing = spacing;
            self
        }

        pub fn with_angle(mut self, angle: f64) -> Self {
            self.angle = angle;
            self
        }

        pub fn direction_code(&self) -> i64 {
            match self.direction {
                TextDirection::Horizontal => 1,
                TextDirection::Vertical => 2,
            }
        }
    }

    /// 图面表题栏属性，原样写入 `drawing_attribute_feature`。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DrawingAttributes {
        pub office_name: String,
        pub construction_name: String,
        pub contract_class: String,
        pub figure_name: String,
        pub figure_number: String,
        pub figure_type: String,
        pub scale: String,
        pub date: NaiveDate,
        pub receiving_organization: String,
        pub ordering_organization: String,
    }

    impl DrawingAttributes {
        /// 日期拆分为 (年, 月, 日)。
        pub fn date_parts(&self) -> (i32, u32, u32) {
            (self.date.year(), self.date.month(), self.date.day())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum SheetSize {
        A0,
        A1,
        A2,
        A3,
        A4,
        Free,
    }

    impl SheetSize {
        #[inline]
        pub fn code(self) -> i64 {
            match self {
                SheetSize::A0 => 0,
                SheetSize::A1 => 1,
                SheetSize::A2 => 2,
                SheetSize::A3 => 3,
                SheetSize::A4 => 4,
                SheetSize::Free => 9,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Orientation {
        Portrait,
        Landscape,
    }

    impl Orientation {
        #[inline]
        pub fn code(self) -> i64 {
            match self {
                Orientation::Portrait => 0,
                Orientation::Landscape => 1,
            }
        }
    }

    /// 图纸设定。`dimensions` 仅在自由尺寸时有意义，缺省按 (0, 0) 输出。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Sheet {
        pub name: String,
        pub size: SheetSize,
        pub orientation: Orientation,
        #[serde(default)]
        pub dimensions: Option<Vector2>,
    }

    impl Sheet {
        pub fn new(name: impl Into<String>, size: SheetSize, orientation: Orientation) -> Self {
            Self {
                name: name.into(),
                size,
                orientation,
                dimensions: None,
            }
        }

        pub fn free(name: impl Into<String>, width: f64, height: f64) -> Self {
            Self {
                name: name.into(),
                size: SheetSize::Free,
                orientation: Orientation::Landscape,
                dimensions: Some(Vector2::new(width, height)),
            }
        }
    }

    impl Default for Sheet {
        fn default() -> Self {
            Self::new("paper", SheetSize::A3, Orientation::Landscape)
        }
    }
}
