use std::io;

use crate::errors::SxfError;
use crate::record::Feature;
use crate::scene::{Document, NodeId};

/// 记录输出目标。每次调用写入一行（或一个多行记录块），由实现追加换行。
pub trait RecordSink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// 丢弃所有输出，用于预演。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

impl RecordSink for String {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push_str(line);
        self.push('\n');
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// 实例编号的起始值与步长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numbering {
    pub base: u64,
    pub step: u64,
}

impl Default for Numbering {
    fn default() -> Self {
        Self { base: 10, step: 10 }
    }
}

/// 一次序列化的统计。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeSummary {
    pub records: usize,
    pub last_instance: Option<u64>,
}

struct Emitter<'s, S: RecordSink + ?Sized> {
    sink: &'s mut S,
    /// 下一个实例编号；加法溢出后为 None。
    next: Option<u64>,
    step: u64,
    summary: SerializeSummary,
}

impl<S: RecordSink + ?Sized> Emitter<'_, S> {
    fn emit(&mut self, feature: &Feature) -> Result<(), SxfError> {
        let instance = self.next.ok_or(SxfError::InstanceOverflow {
            last: self.summary.last_instance.unwrap_or_default(),
        })?;
        let text = feature.render(instance)?;
        self.sink.write_line(&text)?;
        self.next = instance.checked_add(self.step);
        self.summary.records += 1;
        self.summary.last_instance = Some(instance);
        Ok(())
    }
}

/// 深度优先、后序遍历整份文档，按共享计数器为每条记录分配实例编号并写出。
///
/// 部分图按当前输出顺序输出，调用前应先执行 [`Document::prepare`]。
pub fn serialize<S: RecordSink + ?Sized>(
    document: &Document,
    numbering: Numbering,
    sink: &mut S,
) -> Result<SerializeSummary, SxfError> {
    let mut emitter = Emitter {
        sink,
        next: Some(numbering.base),
        step: numbering.step,
        summary: SerializeSummary::default(),
    };

    for feature in document.registry().style_features() {
        emitter.emit(&feature)?;
    }
    for id in document.emission_order() {
        let def = document.subfigure(*id);
        emit_node(document, def.node(), &mut emitter)?;
        emitter.emit(&def.definition_feature())?;
    }
    emit_node(document, NodeId::ROOT, &mut emitter)?;
    if let Some(attributes) = document.attributes() {
        emitter.emit(attributes)?;
    }
    emitter.emit(document.sheet())?;
    for feature in document.registry().layer_features() {
        emitter.emit(&feature)?;
    }
    Ok(emitter.summary)
}

fn emit_node<S: RecordSink + ?Sized>(
    document: &Document,
    id: NodeId,
    emitter: &mut Emitter<'_, S>,
) -> Result<(), SxfError> {
    let Some(node) = document.scene_node(id) else {
        return Ok(());
    };
    for (curve, definition) in node.composite_curves() {
        emit_node(document, *curve, emitter)?;
        emitter.emit(definition)?;
    }
    for feature in node.features() {
        emitter.emit(feature)?;
    }
    Ok(())
}

/// 序列化到字符串，便于比较与测试。
pub fn serialize_to_string(
    document: &Document,
    numbering: Numbering,
) -> Result<String, SxfError> {
    let mut out = String::new();
    serialize(document, numbering, &mut out)?;
    Ok(out)
}
