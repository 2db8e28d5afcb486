//! 競品分析：Buy Box 狀態與建議售價

use pricing_core::CompetitorOffer;
use rust_decimal::Decimal;

/// 競品分析結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompetitorAnalysis {
    /// 自家報價是否持有 Buy Box
    pub has_buy_box: bool,
    /// 最低競品價（排除自家報價）
    pub lowest_competitor_price: Option<Decimal>,
    /// 建議售價（已保證 >= PVPM）
    pub recommended_price: Option<Decimal>,
    /// 目前自家售價
    pub own_price: Option<Decimal>,
}

impl CompetitorAnalysis {
    /// 有競品但最低價不高於 PVPM：不違反底價就無法搶 Buy Box
    pub fn buy_box_unreachable(&self) -> bool {
        self.lowest_competitor_price.is_some() && self.recommended_price.is_none()
    }

    /// 自家售價與最低競品價的差距
    pub fn gap_to_lowest(&self) -> Option<Decimal> {
        match (self.own_price, self.lowest_competitor_price) {
            (Some(own), Some(lowest)) => Some(own - lowest),
            _ => None,
        }
    }
}

/// 競品分析器
pub struct CompetitorAnalyzer;

impl CompetitorAnalyzer {
    /// 分析競品報價
    ///
    /// `offers` 須已依價格遞增排序（同價時 Buy Box 持有者在前）。
    /// 最低競品價高於 PVPM 時建議 max(最低價 - undercut, pvpm)，否則不給建議。
    pub fn analyze(
        own_price: Option<Decimal>,
        offers: &[CompetitorOffer],
        pvpm: Decimal,
        undercut: Decimal,
    ) -> CompetitorAnalysis {
        let has_buy_box = offers.iter().any(|o| o.is_own_offer && o.has_buy_box);

        let lowest_competitor_price = offers
            .iter()
            .find(|o| !o.is_own_offer)
            .map(|o| o.price);

        let recommended_price = match lowest_competitor_price {
            Some(lowest) if lowest > pvpm => Some((lowest - undercut).max(pvpm)),
            Some(lowest) => {
                tracing::debug!("最低競品價 {} <= PVPM {}，無法搶 Buy Box", lowest, pvpm);
                None
            }
            None => None,
        };

        CompetitorAnalysis {
            has_buy_box,
            lowest_competitor_price,
            recommended_price,
            own_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offers() -> Vec<CompetitorOffer> {
        vec![
            CompetitorOffer::new("OWN", "Nosotros", dec!(24)).own(),
            CompetitorOffer::new("S1", "Rival", dec!(25)).with_buy_box(true),
            CompetitorOffer::new("S2", "Otro", dec!(28)).with_fba(true),
        ]
    }

    #[test]
    fn test_undercut_lowest_competitor() {
        let analysis = CompetitorAnalyzer::analyze(Some(dec!(24)), &offers(), dec!(20.31), dec!(2));

        assert!(!analysis.has_buy_box);
        assert_eq!(analysis.lowest_competitor_price, Some(dec!(25)));
        assert_eq!(analysis.recommended_price, Some(dec!(23)));
        assert_eq!(analysis.gap_to_lowest(), Some(dec!(-1)));
    }

    #[test]
    fn test_recommendation_clamped_to_floor() {
        let analysis = CompetitorAnalyzer::analyze(None, &offers(), dec!(24.5), dec!(2));

        assert_eq!(analysis.recommended_price, Some(dec!(24.5)));
    }

    #[test]
    fn test_competitor_at_floor_gives_no_recommendation() {
        let analysis = CompetitorAnalyzer::analyze(None, &offers(), dec!(25), dec!(2));

        assert_eq!(analysis.lowest_competitor_price, Some(dec!(25)));
        assert_eq!(analysis.recommended_price, None);
        assert!(analysis.buy_box_unreachable());
    }

    #[test]
    fn test_own_buy_box_detected() {
        let offers = vec![
            CompetitorOffer::new("OWN", "Nosotros", dec!(22)).own().with_buy_box(true),
            CompetitorOffer::new("S1", "Rival", dec!(25)),
        ];

        let analysis = CompetitorAnalyzer::analyze(Some(dec!(22)), &offers, dec!(20), dec!(2));
        assert!(analysis.has_buy_box);
    }

    #[test]
    fn test_buy_box_on_other_offer_is_not_ours() {
        let offers = vec![
            CompetitorOffer::new("OWN", "Nosotros", dec!(22)).own(),
            CompetitorOffer::new("S1", "Rival", dec!(25)).with_buy_box(true),
        ];

        let analysis = CompetitorAnalyzer::analyze(None, &offers, dec!(20), dec!(2));
        assert!(!analysis.has_buy_box);
    }

    #[test]
    fn test_no_competitors() {
        let offers = vec![CompetitorOffer::new("OWN", "Nosotros", dec!(22)).own()];

        let analysis = CompetitorAnalyzer::analyze(Some(dec!(22)), &offers, dec!(20), dec!(2));
        assert_eq!(analysis.lowest_competitor_price, None);
        assert_eq!(analysis.recommended_price, None);
        assert!(!analysis.buy_box_unreachable());

        let empty = CompetitorAnalyzer::analyze(None, &[], dec!(20), dec!(2));
        assert_eq!(empty.lowest_competitor_price, None);
    }
}
