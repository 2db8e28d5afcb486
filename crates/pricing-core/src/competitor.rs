//! 競品報價模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 競品報價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorOffer {
    pub seller_id: String,
    pub seller_name: String,
    pub price: Decimal,
    /// 是否由平台倉配送
    pub is_fba: bool,
    /// 是否持有 Buy Box
    pub has_buy_box: bool,
    /// 是否為自家報價
    pub is_own_offer: bool,
}

impl CompetitorOffer {
    /// 創建新的競品報價
    pub fn new(seller_id: &str, seller_name: &str, price: Decimal) -> Self {
        Self {
            seller_id: seller_id.to_string(),
            seller_name: seller_name.to_string(),
            price,
            is_fba: false,
            has_buy_box: false,
            is_own_offer: false,
        }
    }

    /// 建構器模式：設置 FBA
    pub fn with_fba(mut self, is_fba: bool) -> Self {
        self.is_fba = is_fba;
        self
    }

    /// 建構器模式：設置 Buy Box
    pub fn with_buy_box(mut self, has_buy_box: bool) -> Self {
        self.has_buy_box = has_buy_box;
        self
    }

    /// 建構器模式：標記為自家報價
    pub fn own(mut self) -> Self {
        self.is_own_offer = true;
        self
    }
}

/// 一次抓取的競品資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSnapshot {
    /// 報價列表（價格遞增，同價時 Buy Box 持有者優先）
    pub offers: Vec<CompetitorOffer>,
    /// 抓取時間
    pub fetched_at: DateTime<Utc>,
}

impl CompetitorSnapshot {
    /// 創建快照並依規則排序報價
    pub fn new(mut offers: Vec<CompetitorOffer>, fetched_at: DateTime<Utc>) -> Self {
        sort_offers(&mut offers);
        Self { offers, fetched_at }
    }

    /// 快照年齡（分鐘）
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_minutes()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

/// 報價排序：價格遞增，同價時持有 Buy Box 者在前
pub fn sort_offers(offers: &mut [CompetitorOffer]) {
    offers.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then_with(|| b.has_buy_box.cmp(&a.has_buy_box))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_sorts_by_price_then_buy_box() {
        let now = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();
        let snapshot = CompetitorSnapshot::new(
            vec![
                CompetitorOffer::new("S3", "Tercero", dec!(30)),
                CompetitorOffer::new("S1", "Primero", dec!(25)),
                CompetitorOffer::new("S2", "Segundo", dec!(25)).with_buy_box(true),
            ],
            now,
        );

        let ids: Vec<_> = snapshot.offers.iter().map(|o| o.seller_id.as_str()).collect();
        assert_eq!(ids, vec!["S2", "S1", "S3"]);
    }

    #[test]
    fn test_snapshot_age() {
        let fetched = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();
        let snapshot = CompetitorSnapshot::new(Vec::new(), fetched);

        assert_eq!(snapshot.age_minutes(fetched + Duration::minutes(90)), 90);
        assert!(snapshot.is_empty());
    }
}
