use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use encoding_rs::SHIFT_JIS;
use sxf_engine::serialize::{Numbering, NullSink, RecordSink, SerializeSummary, serialize};
use sxf_engine::{Document, SxfError};
use thiserror::Error;
use tracing::{info, warn};

/// 空设备路径。写到这里时只执行遍历，不产生任何输出。
#[cfg(windows)]
pub const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("invalid document: {0}")]
    Document(#[from] SxfError),
    #[error("failed to create file {path:?}: {source}")]
    CreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    /// 把遍历期间的写入错误与路径关联，其余错误原样保留。
    fn from_traversal(err: SxfError, path: &Path) -> Self {
        match err {
            SxfError::Io(source) => IoError::WriteError {
                path: path.to_path_buf(),
                source,
            },
            other => IoError::Document(other),
        }
    }
}

pub trait DocumentSaver {
    fn save(&self, document: &mut Document, path: &Path) -> Result<OutputSummary, IoError>;
}

/// 输出目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    /// 完整遍历但不写出任何内容。
    Null,
    /// 未指定路径时逐行写入日志。
    Log,
}

impl Destination {
    /// `None` 或 `-` 表示日志；本平台的空设备（[`NULL_DEVICE`]）表示只做检查。
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            None => Destination::Log,
            Some(path) if path.as_os_str() == "-" => Destination::Log,
            Some(path) if path.as_os_str() == NULL_DEVICE => Destination::Null,
            Some(path) => Destination::File(path.to_path_buf()),
        }
    }

    /// 写入 FILE_NAME 头部的名字。
    fn header_name(&self) -> String {
        match self {
            Destination::File(path) => path.display().to_string(),
            Destination::Null => NULL_DEVICE.to_string(),
            Destination::Log => String::new(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Null => f.write_str(NULL_DEVICE),
            Destination::Log => f.write_str("log"),
        }
    }
}

/// 以 Shift_JIS 编码写出。无法表示的字符会被替换为数值字符引用并记录警告。
pub struct ShiftJisSink<W: Write> {
    writer: W,
}

impl<W: Write> ShiftJisSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> RecordSink for ShiftJisSink<W> {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let (bytes, _, lossy) = SHIFT_JIS.encode(line);
        if lossy {
            warn!(line, "存在无法以 Shift_JIS 表示的字符");
        }
        self.writer.write_all(&bytes)?;
        self.writer.write_all(b"\n")
    }
}

/// 把每一行写入 `tracing` 日志。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        for part in line.lines() {
            info!(target: "sxf_io::output", "{part}");
        }
        Ok(())
    }
}

/// 头部字段与实例编号设置。
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    pub numbering: Numbering,
    pub author: String,
    pub organization: String,
    pub translator: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            numbering: Numbering::default(),
            author: "author".to_string(),
            organization: "organization".to_string(),
            translator: "translator".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSummary {
    pub records: usize,
    pub last_instance: Option<u64>,
    pub destination: Destination,
}

/// 头部使用的时间戳：UTC、毫秒精度。
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Default)]
pub struct SfcWriter {
    options: WriterOptions,
}

impl SfcWriter {
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// 两阶段输出：先在空输出上完整预演，任何错误都不会创建目标文件；
    /// 预演通过后再写出头部、数据段与结尾。
    pub fn output(
        &self,
        document: &mut Document,
        destination: &Destination,
    ) -> Result<OutputSummary, IoError> {
        info!(destination = %destination, "预演输出");
        document.prepare()?;
        let rehearsal = serialize(document, self.options.numbering, &mut NullSink)?;

        let document = &*document;
        let now = Utc::now();
        let written = match destination {
            Destination::File(path) => {
                let file = File::create(path).map_err(|source| IoError::CreateError {
                    path: path.clone(),
                    source,
                })?;
                let mut sink = ShiftJisSink::new(BufWriter::new(file));
                let summary = self
                    .write_envelope(document, &destination.header_name(), now, &mut sink)
                    .map_err(|err| IoError::from_traversal(err, path))?;
                sink.flush().map_err(|source| IoError::WriteError {
                    path: path.clone(),
                    source,
                })?;
                summary
            }
            Destination::Null => {
                self.write_envelope(document, &destination.header_name(), now, &mut NullSink)?
            }
            Destination::Log => {
                self.write_envelope(document, &destination.header_name(), now, &mut LogSink)?
            }
        };
        debug_assert_eq!(written.records, rehearsal.records);
        info!(
            destination = %destination,
            records = written.records,
            "输出完成"
        );

        Ok(OutputSummary {
            records: written.records,
            last_instance: written.last_instance,
            destination: destination.clone(),
        })
    }

    /// 以 Shift_JIS 写出到任意 writer。文档须已执行 [`Document::prepare`]。
    pub fn write_to<W: Write>(
        &self,
        document: &Document,
        writer: W,
        file_name: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<SerializeSummary, IoError> {
        let mut sink = ShiftJisSink::new(writer);
        let summary = self
            .write_envelope(document, file_name, timestamp, &mut sink)
            .map_err(|err| IoError::from_traversal(err, Path::new(file_name)))?;
        sink.flush().map_err(|source| IoError::WriteError {
            path: PathBuf::from(file_name),
            source,
        })?;
        Ok(summary)
    }

    fn write_envelope<S: RecordSink + ?Sized>(
        &self,
        document: &Document,
        file_name: &str,
        timestamp: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<SerializeSummary, SxfError> {
        let options = &self.options;
        sink.write_line("ISO-10303-21;")?;
        sink.write_line("HEADER;")?;
        sink.write_line("FILE_DESCRIPTION(('SCADEC level2 feature_mode'),'2;1');")?;
        sink.write_line(&format!(
            "FILE_NAME('{file_name}','{time}',('{author}'),('{organization}'),'SCADEC_API_Ver3.10$$3.1','{translator}');",
            time = format_timestamp(timestamp),
            author = options.author,
            organization = options.organization,
            translator = options.translator,
        ))?;
        sink.write_line("FILE_SCHEMA(('ASSOCIATIVE_DRAUGHTING'));")?;
        sink.write_line("ENDSEC;")?;
        sink.write_line("DATA;")?;
        let summary = serialize(document, options.numbering, sink)?;
        sink.write_line("ENDSEC;")?;
        sink.write_line("END-ISO-10303-21;")?;
        Ok(summary)
    }
}

impl DocumentSaver for SfcWriter {
    fn save(&self, document: &mut Document, path: &Path) -> Result<OutputSummary, IoError> {
        self.output(document, &Destination::from_path(Some(path)))
    }
}
