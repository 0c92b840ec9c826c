//! Binary payload assembly with explicit buffer view bookkeeping.

use crate::error::{ConvertError, Result};
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

/// Alignment of every segment in the binary payload.
pub const ALIGNMENT: usize = 4;

/// Number of padding bytes needed to bring `len` to a multiple of [`ALIGNMENT`].
pub fn padding_for(len: usize) -> usize {
    (ALIGNMENT - len % ALIGNMENT) % ALIGNMENT
}

/// What a segment of the payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    /// Vertex attributes (`ARRAY_BUFFER`).
    Vertices,
    /// Triangle indices (`ELEMENT_ARRAY_BUFFER`).
    Indices,
}

impl SegmentRole {
    fn target(self) -> json::buffer::Target {
        match self {
            SegmentRole::Vertices => json::buffer::Target::ArrayBuffer,
            SegmentRole::Indices => json::buffer::Target::ElementArrayBuffer,
        }
    }
}

/// One payload segment: its bytes and the view that describes them.
#[derive(Debug, Clone)]
pub struct Segment {
    pub bytes: Vec<u8>,
    pub byte_offset: usize,
    pub role: SegmentRole,
}

/// The binary payload as an ordered list of segments.
///
/// Segments are appended left to right. Each one starts at the running offset,
/// which then advances by the segment length plus its padding.
#[derive(Debug, Default)]
pub struct BufferLayout {
    segments: Vec<Segment>,
    running_offset: usize,
}

impl BufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment and return the index of its buffer view.
    pub fn push(&mut self, bytes: Vec<u8>, role: SegmentRole) -> u32 {
        let index = self.segments.len() as u32;
        let len = bytes.len();
        self.segments.push(Segment {
            bytes,
            byte_offset: self.running_offset,
            role,
        });
        self.running_offset += len + padding_for(len);
        index
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total payload length including padding.
    pub fn byte_length(&self) -> usize {
        self.running_offset
    }

    /// Buffer views for every segment, in push order.
    pub fn buffer_views(&self) -> Vec<json::buffer::View> {
        self.segments
            .iter()
            .map(|segment| json::buffer::View {
                buffer: json::Index::new(0),
                byte_length: USize64(segment.bytes.len() as u64),
                byte_offset: Some(USize64(segment.byte_offset as u64)),
                byte_stride: None,
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
                target: Some(Valid(segment.role.target())),
            })
            .collect()
    }

    /// Concatenate every segment with its padding.
    ///
    /// Fails if a segment does not start where its view says it does, or if the
    /// final length disagrees with the running offset.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(self.running_offset);
        for (i, segment) in self.segments.iter().enumerate() {
            if payload.len() != segment.byte_offset {
                return Err(ConvertError::Layout(format!(
                    "segment {} starts at byte {} but its view declares {}",
                    i,
                    payload.len(),
                    segment.byte_offset
                )));
            }
            payload.extend_from_slice(&segment.bytes);
            payload.resize(payload.len() + padding_for(segment.bytes.len()), 0);
        }

        if payload.len() != self.running_offset {
            return Err(ConvertError::Layout(format!(
                "payload is {} bytes but the layout accounts for {}",
                payload.len(),
                self.running_offset
            )));
        }
        Ok(payload)
    }
}
