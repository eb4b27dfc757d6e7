use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CKD stage, 1 (mild) through 5 (kidney failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CkdStage {
    #[serde(rename = "STAGE_1")]
    Stage1,
    #[serde(rename = "STAGE_2")]
    Stage2,
    #[serde(rename = "STAGE_3")]
    Stage3,
    #[serde(rename = "STAGE_4")]
    Stage4,
    #[serde(rename = "STAGE_5")]
    Stage5,
}

impl CkdStage {
    pub const ALL: [Self; 5] = [
        Self::Stage1,
        Self::Stage2,
        Self::Stage3,
        Self::Stage4,
        Self::Stage5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage1 => "STAGE_1",
            Self::Stage2 => "STAGE_2",
            Self::Stage3 => "STAGE_3",
            Self::Stage4 => "STAGE_4",
            Self::Stage5 => "STAGE_5",
        }
    }
}

impl fmt::Display for CkdStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CkdStage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown CKD stage: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_names() {
        for stage in CkdStage::ALL {
            assert_eq!(stage.to_string().parse::<CkdStage>().unwrap(), stage);
        }
        assert!("STAGE_6".parse::<CkdStage>().is_err());
        assert!("stage_1".parse::<CkdStage>().is_err());
    }

    #[test]
    fn serde_uses_underscored_names() {
        assert_eq!(serde_json::to_string(&CkdStage::Stage3).unwrap(), r#""STAGE_3""#);
        let s: CkdStage = serde_json::from_str(r#""STAGE_5""#).unwrap();
        assert_eq!(s, CkdStage::Stage5);
    }

    #[test]
    fn stages_order_by_severity() {
        assert!(CkdStage::Stage1 < CkdStage::Stage5);
    }
}
