use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    Open,
    Closed,
}

/// A pricing tier attendees register against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub limit: u32,
    pub status: LotStatus,
}

impl Lot {
    pub fn is_open(&self) -> bool {
        self.status == LotStatus::Open
    }

    /// Lots seeded on first load when nothing is stored yet.
    pub fn defaults() -> Vec<Lot> {
        (1..=3)
            .map(|id| Lot {
                id,
                name: format!("Lote {}", id),
                price: Decimal::ZERO,
                limit: 50,
                status: if id == 1 {
                    LotStatus::Open
                } else {
                    LotStatus::Closed
                },
            })
            .collect()
    }
}
