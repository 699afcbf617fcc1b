pub mod order;
pub mod record;
pub mod registry;
pub mod scene;
pub mod serialize;

pub mod errors {
    use sxf_core::coords::CoordinateError;
    use thiserror::Error;

    use crate::registry::ResourceKind;

    /// 错误的大类，供调用方决定如何报告。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ErrorCategory {
        /// 资源表已满。
        Capacity,
        /// 同名资源的定义互相矛盾。
        Consistency,
        /// 部分图未定义、重名或配置成环。
        Structural,
        /// 调用方式或输入不被支持。
        Configuration,
        Io,
    }

    #[derive(Debug, Error)]
    pub enum SxfError {
        #[error("{kind} table is full ({limit} entries)")]
        CapacityExceeded { kind: ResourceKind, limit: usize },
        #[error("line type `{name}` already exists with a different pitch")]
        PitchMismatch { name: String },
        #[error("predefined line type `{name}` does not accept a pitch")]
        PredefinedPitch { name: String },
        #[error("line type `{name}` pitch has {segments} segments, expected 2, 4, 6 or 8")]
        InvalidPitch { name: String, segments: usize },
        #[error("user line type `{name}` requires a pitch")]
        MissingPitch { name: String },
        #[error("subfigure `{name}` is not defined")]
        UnknownSubfigure { name: String },
        #[error("subfigure `{name}` is already defined")]
        DuplicateSubfigure { name: String },
        #[error("subfigure `{name}` is part of a placement cycle")]
        PlacementCycle { name: String },
        #[error("feature `{keyword}` is not supported up to SXF Ver.3.1")]
        UnsupportedFeature { keyword: String },
        #[error("the root node cannot be placed")]
        PutOnRoot,
        #[error("only subfigure nodes can be placed into their parent")]
        NotASubfigure,
        #[error("`{name}` is not a predefined colour")]
        UnknownColour { name: String },
        #[error("{record} has already been set")]
        AlreadySet { record: &'static str },
        #[error("instance number overflows after #{last}")]
        InstanceOverflow { last: u64 },
        #[error(transparent)]
        Coordinate(#[from] CoordinateError),
        #[error("failed to write records: {0}")]
        Io(#[from] std::io::Error),
    }

    impl SxfError {
        pub fn category(&self) -> ErrorCategory {
            match self {
                SxfError::CapacityExceeded { .. } => ErrorCategory::Capacity,
                SxfError::PitchMismatch { .. }
                | SxfError::PredefinedPitch { .. }
                | SxfError::InvalidPitch { .. }
                | SxfError::MissingPitch { .. } => ErrorCategory::Consistency,
                SxfError::UnknownSubfigure { .. }
                | SxfError::DuplicateSubfigure { .. }
                | SxfError::PlacementCycle { .. } => ErrorCategory::Structural,
                SxfError::UnsupportedFeature { .. }
                | SxfError::UnknownColour { .. }
                | SxfError::PutOnRoot
                | SxfError::NotASubfigure
                | SxfError::AlreadySet { .. }
                | SxfError::InstanceOverflow { .. }
                | SxfError::Coordinate(_) => ErrorCategory::Configuration,
                SxfError::Io(_) => ErrorCategory::Io,
            }
        }
    }

}

pub use errors::{ErrorCategory, SxfError};
pub use record::{Feature, FeatureVersion, Param, SXF_VERSION};
pub use registry::{ResourceId, ResourceKind, ResourceRegistry};
pub use scene::{Document, NodeId, SceneCursor, SubfigureId};
pub use serialize::{Numbering, NullSink, RecordSink, SerializeSummary, serialize};
