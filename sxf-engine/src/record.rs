use crate::errors::SxfError;

/// 本库支持的最高格式版本。
pub const SXF_VERSION: &str = "Ver.3.1";

/// 特征记录的版本标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureVersion {
    Base,
    V3,
    V3_1,
}

impl FeatureVersion {
    /// 注释块中 `SXF` 之后的标记文本。
    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            FeatureVersion::Base => "",
            FeatureVersion::V3 => "3",
            FeatureVersion::V3_1 => "3.1",
        }
    }
}

const BASE_FEATURES: &[&str] = &[
    "drawing_sheet_feature",
    "layer_feature",
    "pre_defined_font_feature",
    "user_defined_font_feature",
    "pre_defined_colour_feature",
    "user_defined_colour_feature",
    "width_feature",
    "text_font_feature",
    "point_marker_feature",
    "line_feature",
    "polyline_feature",
    "circle_feature",
    "arc_feature",
    "ellipse_feature",
    "ellipse_arc_feature",
    "text_string_feature",
    "spline_feature",
    "sfig_org_feature",
    "sfig_locate_feature",
    "symbol_externally_defined_feature",
    "linear_dim_feature",
    "angular_dim_feature",
    "radius_dim_feature",
    "diameter_dim_feature",
    "label_feature",
    "balloon_feature",
    "externally_defined_hatch_feature",
    "fill_area_style_colour_feature",
    "fill_area_style_hatching_feature",
    "fill_area_style_tiles_hatching_feature",
    "composite_curve_feature",
];

const V3_FEATURES: &[&str] = &["drawing_attribute_feature"];

const V3_1_FEATURES: &[&str] = &["clothoid_feature", "curve_dim_feature"];

/// 查询特征关键字所需的格式版本，不在 3.1 以内的关键字报错。
pub fn feature_version(keyword: &str) -> Result<FeatureVersion, SxfError> {
    if V3_1_FEATURES.contains(&keyword) {
        Ok(FeatureVersion::V3_1)
    } else if V3_FEATURES.contains(&keyword) {
        Ok(FeatureVersion::V3)
    } else if BASE_FEATURES.contains(&keyword) {
        Ok(FeatureVersion::Base)
    } else {
        Err(SxfError::UnsupportedFeature {
            keyword: keyword.to_string(),
        })
    }
}

/// 特征记录的单个属性值。
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Real(f64),
    Text(String),
    List(Vec<Param>),
}

impl Param {
    fn write_bare(&self, out: &mut String) {
        match self {
            Param::Int(value) => out.push_str(&value.to_string()),
            Param::Real(value) => out.push_str(&value.to_string()),
            Param::Text(value) => {
                out.push_str("\\'");
                out.push_str(value);
                out.push_str("\\'");
            }
            Param::List(items) => {
                out.push('(');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    item.write_bare(out);
                }
                out.push(')');
            }
        }
    }

    /// 以属性值的形式输出：外层单引号包裹。
    fn write_attribute(&self, out: &mut String) {
        out.push('\'');
        self.write_bare(out);
        out.push('\'');
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(i64::from(value))
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(i64::from(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Real(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<Vec<f64>> for Param {
    fn from(values: Vec<f64>) -> Self {
        Param::List(values.into_iter().map(Param::Real).collect())
    }
}

/// 延迟输出的特征：关键字 + 有序参数。实例编号在序列化时才分配。
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    keyword: String,
    params: Vec<Param>,
}

impl Feature {
    pub fn new(keyword: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            keyword: keyword.into(),
            params,
        }
    }

    #[inline]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// 以给定实例编号渲染为特征注释块（不含末尾换行）。
    pub fn render(&self, instance: u64) -> Result<String, SxfError> {
        let tag = feature_version(&self.keyword)?.tag();
        let mut attributes = String::new();
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                attributes.push(',');
            }
            param.write_attribute(&mut attributes);
        }
        Ok(format!(
            "/*SXF{tag}\n#{instance} = {keyword}({attributes})\nSXF{tag}*/",
            keyword = self.keyword
        ))
    }
}
