use serde::{Deserialize, Serialize};

/// Logical search indexes. The physical index name comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    Seller,
}

impl IndexType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seller => "seller",
        }
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
