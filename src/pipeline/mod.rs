// src/pipeline/mod.rs

use chrono::NaiveDate;

use crate::snapshot::SnapshotStore;

pub mod oews;
pub mod onet;

pub use oews::{oews_extract, oews_load, oews_transform};
pub use onet::{onet_extract, onet_load, onet_transform};

/// Everything a stage needs to agree with its neighbours about which run it belongs to.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_date: NaiveDate,
    pub snapshots: SnapshotStore,
}

impl RunContext {
    pub fn new(run_date: NaiveDate, snapshots: SnapshotStore) -> Self {
        Self {
            run_date,
            snapshots,
        }
    }
}

/// One schedulable step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    OewsExtract,
    OewsTransform,
    OewsLoad,
    OnetExtract,
    OnetTransform,
    OnetLoad,
}

impl Stage {
    pub const OEWS_CHAIN: [Stage; 3] = [Stage::OewsExtract, Stage::OewsTransform, Stage::OewsLoad];
    pub const ONET_CHAIN: [Stage; 3] = [Stage::OnetExtract, Stage::OnetTransform, Stage::OnetLoad];

    pub fn as_str(&self) -> &str {
        match self {
            Stage::OewsExtract => "oews-extract",
            Stage::OewsTransform => "oews-transform",
            Stage::OewsLoad => "oews-load",
            Stage::OnetExtract => "onet-extract",
            Stage::OnetTransform => "onet-transform",
            Stage::OnetLoad => "onet-load",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "oews-extract" => Some(Stage::OewsExtract),
            "oews-transform" => Some(Stage::OewsTransform),
            "oews-load" => Some(Stage::OewsLoad),
            "onet-extract" => Some(Stage::OnetExtract),
            "onet-transform" => Some(Stage::OnetTransform),
            "onet-load" => Some(Stage::OnetLoad),
            _ => None,
        }
    }
}
