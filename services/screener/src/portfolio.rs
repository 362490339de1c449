//! Portfolio construction from a completed scan

use std::collections::HashMap;

use crate::config::PortfolioConfig;
use crate::models::{
    round1, CriteriaBreakdown, Diversification, PortfolioEntry, PortfolioReport, ScanReport,
    StockAnalysis,
};

/// Build a ranked, sector-diversified allocation list from a scan's
/// qualifying symbols. Pure transformation, recomputed on demand.
pub fn build(report: &ScanReport, config: &PortfolioConfig) -> PortfolioReport {
    let tier = |count: u32| -> Vec<&StockAnalysis> {
        report
            .qualified
            .iter()
            .filter(|s| s.criteria_met == count)
            .collect()
    };

    let perfect = tier(5);
    let strong = tier(4);
    let good = tier(3);
    let moderate = tier(2);

    let criteria_breakdown = CriteriaBreakdown {
        perfect: perfect.len(),
        strong: strong.len(),
        good: good.len(),
        moderate: moderate.len(),
        total_qualified: report.qualified.len(),
    };

    // strongest tiers first, then greedy selection under the sector cap
    let prioritized = perfect
        .into_iter()
        .chain(strong)
        .chain(good)
        .chain(moderate);

    let mut selected: Vec<&StockAnalysis> = Vec::new();
    let mut sector_counts: HashMap<&str, usize> = HashMap::new();

    for stock in prioritized {
        if selected.len() >= config.max_positions {
            break;
        }
        let sector_count = sector_counts.get(stock.sector.as_str()).copied().unwrap_or(0);
        let bypass = config.perfect_bypasses_sector_cap && stock.criteria_met == 5;
        if sector_count < config.max_per_sector || bypass {
            selected.push(stock);
            *sector_counts.entry(stock.sector.as_str()).or_insert(0) += 1;
        }
    }

    let mut entries = Vec::with_capacity(selected.len());
    let mut total_allocation = 0.0;

    for (index, stock) in selected.iter().enumerate() {
        let (allocation, risk_category) = match stock.criteria_met {
            5 => (config.allocation_perfect, "HIGHEST CONFIDENCE"),
            4 => (config.allocation_strong, "HIGH CONFIDENCE"),
            3 => (config.allocation_good, "MODERATE CONFIDENCE"),
            _ => (config.allocation_moderate, "CONSERVATIVE"),
        };
        total_allocation += allocation;

        entries.push(PortfolioEntry {
            rank: index + 1,
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            sector: stock.sector.clone(),
            current_price: stock.current_price,
            allocation_percent: allocation,
            stop_loss: stock.stop_loss,
            target: stock.target,
            risk_reward: stock.risk_reward,
            criteria_met: stock.criteria_met,
            setup_strength: stock.setup_strength,
            risk_category: risk_category.to_string(),
            entry_reason: format!(
                "{}/5 criteria met ({} setup)",
                stock.criteria_met, stock.setup_strength
            ),
        });
    }

    let mut sector_breakdown: HashMap<String, usize> = HashMap::new();
    for entry in &entries {
        *sector_breakdown.entry(entry.sector.clone()).or_insert(0) += 1;
    }

    PortfolioReport {
        portfolio_size: entries.len(),
        total_allocation: round1(total_allocation),
        max_positions: config.max_positions,
        entries,
        diversification: Diversification {
            sectors_represented: sector_breakdown.len(),
            sector_breakdown,
            max_per_sector: config.max_per_sector,
        },
        criteria_breakdown,
    }
}
