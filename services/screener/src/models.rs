//! Scan records - per-symbol analysis, scan reports, portfolio output

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

/// Setup strength, derived from how many criteria a symbol met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetupStrength {
    Perfect,
    Strong,
    Good,
    Moderate,
    Weak,
}

impl SetupStrength {
    pub fn from_criteria_met(count: u32) -> Self {
        match count {
            5 => SetupStrength::Perfect,
            4 => SetupStrength::Strong,
            3 => SetupStrength::Good,
            2 => SetupStrength::Moderate,
            _ => SetupStrength::Weak,
        }
    }

    pub fn confidence_label(&self) -> &'static str {
        match self {
            SetupStrength::Perfect => "VERY HIGH",
            SetupStrength::Strong => "HIGH",
            SetupStrength::Good => "MODERATE",
            SetupStrength::Moderate => "CAUTIOUS",
            SetupStrength::Weak => "LOW",
        }
    }
}

impl fmt::Display for SetupStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SetupStrength::Perfect => "PERFECT",
            SetupStrength::Strong => "STRONG",
            SetupStrength::Good => "GOOD",
            SetupStrength::Moderate => "MODERATE",
            SetupStrength::Weak => "WEAK",
        };
        f.write_str(label)
    }
}

/// Outcome of each of the five checks, keyed by criterion name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaDetails {
    pub hma_trend: bool,
    pub price_position: bool,
    pub macd_setup: bool,
    pub rsi_crossover: bool,
    pub weekly_timeframe: bool,
}

impl CriteriaDetails {
    /// Number of criteria met (0..=5)
    pub fn count(&self) -> u32 {
        [
            self.hma_trend,
            self.price_position,
            self.macd_setup,
            self.rsi_crossover,
            self.weekly_timeframe,
        ]
        .iter()
        .filter(|&&met| met)
        .count() as u32
    }
}

/// Full five-criteria analysis for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub current_price: f64,
    /// Latest short HMA value, 0.0 while the window is still filling
    pub hma_short: f64,
    /// Latest long HMA value, 0.0 while the window is still filling
    pub hma_long: f64,
    pub criteria_met: u32,
    pub criteria_details: CriteriaDetails,
    pub qualified: bool,
    pub setup_strength: SetupStrength,
    pub confidence_level: String,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward: f64,
    pub analysis_date: Option<NaiveDate>,
}

/// Scanner lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

/// Aggregate result of one completed scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub scan_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub min_criteria: u32,
    pub total_stocks_to_scan: usize,
    pub total_stocks_analyzed: usize,
    /// Qualifying symbols, sorted by (criteria_met, risk_reward) descending
    pub qualified: Vec<StockAnalysis>,
    pub criteria_distribution: BTreeMap<u32, usize>,
    pub sector_distribution: HashMap<String, usize>,
    pub errors: Vec<String>,
}

/// One ranked portfolio position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub rank: usize,
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub current_price: f64,
    pub allocation_percent: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward: f64,
    pub criteria_met: u32,
    pub setup_strength: SetupStrength,
    pub risk_category: String,
    pub entry_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diversification {
    pub sectors_represented: usize,
    pub sector_breakdown: HashMap<String, usize>,
    pub max_per_sector: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaBreakdown {
    pub perfect: usize,
    pub strong: usize,
    pub good: usize,
    pub moderate: usize,
    pub total_qualified: usize,
}

/// Position-sized portfolio derived from a completed scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub portfolio_size: usize,
    pub total_allocation: f64,
    pub max_positions: usize,
    pub entries: Vec<PortfolioEntry>,
    pub diversification: Diversification,
    pub criteria_breakdown: CriteriaBreakdown,
}

/// Per-sector rollup of a completed scan
#[derive(Debug, Clone, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub total_stocks: usize,
    pub average_criteria: f64,
    pub perfect_setups: usize,
    pub strong_setups: usize,
    pub stocks: Vec<SectorMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorMember {
    pub symbol: String,
    pub name: String,
    pub criteria_met: u32,
    pub setup_strength: SetupStrength,
    pub current_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorAnalysisReport {
    pub sectors_with_qualified_stocks: usize,
    pub sectors: Vec<SectorSummary>,
}

impl SectorAnalysisReport {
    /// Group a scan's qualifying list by sector, largest sectors first
    pub fn from_report(report: &ScanReport) -> Self {
        let mut by_sector: HashMap<&str, Vec<&StockAnalysis>> = HashMap::new();
        for stock in &report.qualified {
            by_sector.entry(stock.sector.as_str()).or_default().push(stock);
        }

        let mut sectors: Vec<SectorSummary> = by_sector
            .into_iter()
            .map(|(sector, stocks)| {
                let criteria_sum: u32 = stocks.iter().map(|s| s.criteria_met).sum();
                SectorSummary {
                    sector: sector.to_string(),
                    total_stocks: stocks.len(),
                    average_criteria: round2(criteria_sum as f64 / stocks.len() as f64),
                    perfect_setups: stocks.iter().filter(|s| s.criteria_met == 5).count(),
                    strong_setups: stocks.iter().filter(|s| s.criteria_met == 4).count(),
                    stocks: stocks
                        .iter()
                        .map(|s| SectorMember {
                            symbol: s.symbol.clone(),
                            name: s.name.clone(),
                            criteria_met: s.criteria_met,
                            setup_strength: s.setup_strength,
                            current_price: s.current_price,
                        })
                        .collect(),
                }
            })
            .collect();

        sectors.sort_by(|a, b| {
            b.total_stocks
                .cmp(&a.total_stocks)
                .then_with(|| a.sector.cmp(&b.sector))
        });

        Self {
            sectors_with_qualified_stocks: sectors.len(),
            sectors,
        }
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
