//! Command payloads and the collaborator records they carry.
//!
//! A [`Payload`] is validated when the command is applied, not when it is
//! sent: each typed accessor returns a [`PayloadError`] if the payload has a
//! different shape. Large collaborator results (directory trees, row sets,
//! parsed presets) travel behind an `Arc` so a producer can hand over a
//! finished object without copying it.

use crate::components::color::Color;
use crate::components::geometry::Vec2;
use crate::error::PayloadError;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Node of a directory tree delivered by the scanner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TreeNode {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    pub fn dir(name: impl Into<String>, path: impl Into<PathBuf>, children: Vec<TreeNode>) -> Self {
        TreeNode {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            children,
        }
    }

    /// Number of non-directory nodes in this subtree.
    pub fn file_count(&self) -> usize {
        if self.is_dir {
            self.children.iter().map(TreeNode::file_count).sum()
        } else {
            1
        }
    }
}

/// One row of a flat result set (search results, file lists).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// A detected storage location (drive, volume, mount point).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StorageLocation {
    pub name: String,
    pub mount: PathBuf,
    pub removable: bool,
}

/// A parsed preset, built off-thread by the preset parser.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Preset {
    pub name: String,
    pub path: PathBuf,
    pub samples: Vec<PathBuf>,
}

/// Status line for a scan of `root`, checked against the current root when applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanStatus {
    pub root: PathBuf,
    pub text: String,
}

/// Duration/sample-rate snapshot served by the audio metadata cache.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AudioMeta {
    pub duration_secs: f32,
    pub sample_rate: u32,
}

/// Shape of a payload, used for mismatch reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    None,
    Bool,
    Int,
    Float,
    Index,
    Text,
    Color,
    Size,
    Tree,
    Rows,
    Locations,
    Preset,
    Scan,
}

/// Data carried by a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    None,
    Bool(bool),
    Int(i64),
    Float(f32),
    Index(usize),
    Text(String),
    Color(Color),
    Size(Vec2),
    Tree(Arc<TreeNode>),
    Rows(Arc<Vec<Row>>),
    Locations(Arc<Vec<StorageLocation>>),
    Preset(Arc<Preset>),
    Scan(Arc<ScanStatus>),
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<$ty, PayloadError> {
            match self {
                Payload::$variant(v) => Ok(v.clone()),
                other => Err(PayloadError::Mismatch {
                    expected: PayloadKind::$variant,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::None => PayloadKind::None,
            Payload::Bool(_) => PayloadKind::Bool,
            Payload::Int(_) => PayloadKind::Int,
            Payload::Float(_) => PayloadKind::Float,
            Payload::Index(_) => PayloadKind::Index,
            Payload::Text(_) => PayloadKind::Text,
            Payload::Color(_) => PayloadKind::Color,
            Payload::Size(_) => PayloadKind::Size,
            Payload::Tree(_) => PayloadKind::Tree,
            Payload::Rows(_) => PayloadKind::Rows,
            Payload::Locations(_) => PayloadKind::Locations,
            Payload::Preset(_) => PayloadKind::Preset,
            Payload::Scan(_) => PayloadKind::Scan,
        }
    }

    accessor!(as_bool, Bool, bool);
    accessor!(as_int, Int, i64);
    accessor!(as_index, Index, usize);
    accessor!(as_color, Color, Color);
    accessor!(as_size, Size, Vec2);
    accessor!(as_tree, Tree, Arc<TreeNode>);
    accessor!(as_rows, Rows, Arc<Vec<Row>>);
    accessor!(as_locations, Locations, Arc<Vec<StorageLocation>>);
    accessor!(as_preset, Preset, Arc<Preset>);
    accessor!(as_scan, Scan, Arc<ScanStatus>);

    /// Floats accept integer payloads as well.
    pub fn as_float(&self) -> Result<f32, PayloadError> {
        match self {
            Payload::Float(v) => Ok(*v),
            Payload::Int(v) => Ok(*v as f32),
            other => Err(PayloadError::Mismatch {
                expected: PayloadKind::Float,
                found: other.kind(),
            }),
        }
    }

    pub fn as_text(&self) -> Result<&str, PayloadError> {
        match self {
            Payload::Text(s) => Ok(s),
            other => Err(PayloadError::Mismatch {
                expected: PayloadKind::Text,
                found: other.kind(),
            }),
        }
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<f32> for Payload {
    fn from(v: f32) -> Self {
        Payload::Float(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Text(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::Text(v)
    }
}

impl From<Color> for Payload {
    fn from(v: Color) -> Self {
        Payload::Color(v)
    }
}

impl From<Vec2> for Payload {
    fn from(v: Vec2) -> Self {
        Payload::Size(v)
    }
}
