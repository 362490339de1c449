//! Static NIFTY 50 scan universe with sector classification

use crate::types::{SymbolInfo, SymbolListing};
use phf::phf_map;
use std::collections::HashMap;

/// Symbol -> (company name, sector)
static NIFTY_50: phf::Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "ADANIPORTS.NS" => ("Adani Ports and SEZ Ltd", "Infrastructure"),
    "ASIANPAINT.NS" => ("Asian Paints Ltd", "Consumer Goods"),
    "AXISBANK.NS" => ("Axis Bank Ltd", "Financial Services"),
    "BAJAJ-AUTO.NS" => ("Bajaj Auto Ltd", "Automobile"),
    "BAJFINANCE.NS" => ("Bajaj Finance Ltd", "Financial Services"),
    "BAJAJFINSV.NS" => ("Bajaj Finserv Ltd", "Financial Services"),
    "BHARTIARTL.NS" => ("Bharti Airtel Ltd", "Telecom"),
    "BPCL.NS" => ("Bharat Petroleum Corporation Ltd", "Energy"),
    "BRITANNIA.NS" => ("Britannia Industries Ltd", "FMCG"),
    "CIPLA.NS" => ("Cipla Ltd", "Pharmaceuticals"),
    "COALINDIA.NS" => ("Coal India Ltd", "Energy"),
    "DIVISLAB.NS" => ("Divi's Laboratories Ltd", "Pharmaceuticals"),
    "DRREDDY.NS" => ("Dr. Reddy's Laboratories Ltd", "Pharmaceuticals"),
    "EICHERMOT.NS" => ("Eicher Motors Ltd", "Automobile"),
    "GRASIM.NS" => ("Grasim Industries Ltd", "Cement"),
    "HCLTECH.NS" => ("HCL Technologies Ltd", "Information Technology"),
    "HDFCBANK.NS" => ("HDFC Bank Ltd", "Financial Services"),
    "HDFCLIFE.NS" => ("HDFC Life Insurance Company Ltd", "Insurance"),
    "HEROMOTOCO.NS" => ("Hero MotoCorp Ltd", "Automobile"),
    "HINDALCO.NS" => ("Hindalco Industries Ltd", "Metals"),
    "HINDUNILVR.NS" => ("Hindustan Unilever Ltd", "FMCG"),
    "ICICIBANK.NS" => ("ICICI Bank Ltd", "Financial Services"),
    "ITC.NS" => ("ITC Ltd", "FMCG"),
    "INDUSINDBK.NS" => ("IndusInd Bank Ltd", "Financial Services"),
    "INFY.NS" => ("Infosys Ltd", "Information Technology"),
    "JSWSTEEL.NS" => ("JSW Steel Ltd", "Metals"),
    "KOTAKBANK.NS" => ("Kotak Mahindra Bank Ltd", "Financial Services"),
    "LT.NS" => ("Larsen & Toubro Ltd", "Infrastructure"),
    "M&M.NS" => ("Mahindra & Mahindra Ltd", "Automobile"),
    "MARUTI.NS" => ("Maruti Suzuki India Ltd", "Automobile"),
    "NESTLEIND.NS" => ("Nestle India Ltd", "FMCG"),
    "NTPC.NS" => ("NTPC Ltd", "Energy"),
    "ONGC.NS" => ("Oil & Natural Gas Corporation Ltd", "Energy"),
    "POWERGRID.NS" => ("Power Grid Corporation of India Ltd", "Energy"),
    "RELIANCE.NS" => ("Reliance Industries Ltd", "Energy"),
    "SBILIFE.NS" => ("SBI Life Insurance Company Ltd", "Insurance"),
    "SBIN.NS" => ("State Bank of India", "Financial Services"),
    "SUNPHARMA.NS" => ("Sun Pharmaceutical Industries Ltd", "Pharmaceuticals"),
    "TATACONSUM.NS" => ("Tata Consumer Products Ltd", "FMCG"),
    "TATAMOTORS.NS" => ("Tata Motors Ltd", "Automobile"),
    "TATASTEEL.NS" => ("Tata Steel Ltd", "Metals"),
    "TCS.NS" => ("Tata Consultancy Services Ltd", "Information Technology"),
    "TECHM.NS" => ("Tech Mahindra Ltd", "Information Technology"),
    "TITAN.NS" => ("Titan Company Ltd", "Consumer Goods"),
    "ULTRACEMCO.NS" => ("UltraTech Cement Ltd", "Cement"),
    "UPL.NS" => ("UPL Ltd", "Chemicals"),
    "WIPRO.NS" => ("Wipro Ltd", "Information Technology"),
};

/// Full scan universe, sorted by symbol
pub fn listings() -> Vec<SymbolListing> {
    let mut all: Vec<SymbolListing> = NIFTY_50
        .entries()
        .map(|(symbol, meta)| SymbolListing {
            symbol: symbol.to_string(),
            name: meta.0.to_string(),
        })
        .collect();
    all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    all
}

/// Number of symbols in the universe
pub fn stock_count() -> usize {
    NIFTY_50.len()
}

/// Metadata lookup. Unknown symbols get their own ticker as the display
/// name and an "Unknown" sector.
pub fn info(symbol: &str) -> SymbolInfo {
    match NIFTY_50.get(symbol) {
        Some(meta) => SymbolInfo {
            symbol: symbol.to_string(),
            name: meta.0.to_string(),
            sector: meta.1.to_string(),
        },
        None => SymbolInfo {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: "Unknown".to_string(),
        },
    }
}

/// Sector -> symbol count across the whole universe
pub fn sector_breakdown() -> HashMap<String, usize> {
    let mut breakdown = HashMap::new();
    for (_, meta) in NIFTY_50.entries() {
        *breakdown.entry(meta.1.to_string()).or_insert(0) += 1;
    }
    breakdown
}
