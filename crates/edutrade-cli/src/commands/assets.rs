//! 지원 자산 목록 출력.

use edutrade_core::{AssetInfo, MarketType, SupportedAssets};
use serde::Serialize;

/// 자산 목록. 시장을 지정하면 해당 시장만 출력합니다.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AssetsOutput {
    All(SupportedAssets),
    Market {
        market: MarketType,
        assets: &'static [AssetInfo],
    },
}

pub fn run_assets(market: Option<MarketType>) -> AssetsOutput {
    match market {
        Some(market) => AssetsOutput::Market {
            market,
            assets: SupportedAssets::for_market(market),
        },
        None => AssetsOutput::All(SupportedAssets::all()),
    }
}
