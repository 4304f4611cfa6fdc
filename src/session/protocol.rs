//! Counterbalanced condition orderings
//!
//! Two stages (visual, audio-visual) each split into a former and a latter
//! sub-block give four measured blocks per session. Participants are
//! assigned one of four fixed total orderings forming a Latin square, so
//! every block occupies every serial position exactly once across the
//! protocol types.

use crate::error::{Error, Result};

/// Stimulus stage; the stage decides the modality of its blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Photo only
    Stage1,
    /// Photo plus spoken clip
    Stage2,
}

/// Which half of a stage's stimulus table a block draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubBlock {
    Former,
    Latter,
}

/// One measured block of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub stage: Stage,
    pub sub: SubBlock,
}

impl BlockId {
    pub const fn new(stage: Stage, sub: SubBlock) -> Self {
        BlockId { stage, sub }
    }

    /// Name used to key block results and output rows
    pub fn name(&self) -> &'static str {
        match (self.stage, self.sub) {
            (Stage::Stage1, SubBlock::Former) => "stage1_former",
            (Stage::Stage1, SubBlock::Latter) => "stage1_latter",
            (Stage::Stage2, SubBlock::Former) => "stage2_former",
            (Stage::Stage2, SubBlock::Latter) => "stage2_latter",
        }
    }
}

const S1F: BlockId = BlockId::new(Stage::Stage1, SubBlock::Former);
const S1L: BlockId = BlockId::new(Stage::Stage1, SubBlock::Latter);
const S2F: BlockId = BlockId::new(Stage::Stage2, SubBlock::Former);
const S2L: BlockId = BlockId::new(Stage::Stage2, SubBlock::Latter);

/// One of the four fixed block orderings, chosen per participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Type1,
    Type2,
    Type3,
    Type4,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::Type1,
        Protocol::Type2,
        Protocol::Type3,
        Protocol::Type4,
    ];

    /// Parses the 1-4 ordering code passed on the command line
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Protocol::Type1),
            2 => Ok(Protocol::Type2),
            3 => Ok(Protocol::Type3),
            4 => Ok(Protocol::Type4),
            other => Err(Error::Config(format!(
                "protocol code must be 1-4, got {other}"
            ))),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Protocol::Type1 => 1,
            Protocol::Type2 => 2,
            Protocol::Type3 => 3,
            Protocol::Type4 => 4,
        }
    }

    /// The measured blocks of a session, in presentation order
    pub fn order(&self) -> [BlockId; 4] {
        match self {
            Protocol::Type1 => [S1F, S1L, S2F, S2L],
            Protocol::Type2 => [S1L, S1F, S2L, S2F],
            Protocol::Type3 => [S2F, S2L, S1L, S1F],
            Protocol::Type4 => [S2L, S2F, S1F, S1L],
        }
    }
}
