// src/render/mod.rs

use crate::kpi::KpiCard;
use chrono::Utc;
use std::fmt::Write;

/// The "Retention Overview" text block: one section per headline card, with
/// N/A already baked into the card fields.
pub fn kpi_block(cards: &[KpiCard]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Retention Overview");
    let _ = writeln!(out, "==================");
    for card in cards {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", card.category);
        let _ = writeln!(out, "  Base Year:              {}", card.base_year);
        let _ = writeln!(out, "  Retention Year:         {}", card.retention_year);
        let _ = writeln!(out, "  Retention Rate:         {}", card.rate);
        let _ = writeln!(out, "  Retention Rate Reg:     {}", card.reg_rate);
        let _ = writeln!(out, "  Retention Rate Non Reg: {}", card.non_reg_rate);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_block_lists_every_card_field() {
        let cards = vec![
            KpiCard {
                category: "Chicago".to_string(),
                base_year: "2022-23 School Year".to_string(),
                retention_year: "2023-24 School Year".to_string(),
                rate: "81.23%".to_string(),
                reg_rate: "90.00%".to_string(),
                non_reg_rate: "N/A".to_string(),
            },
            KpiCard {
                category: "Cleveland".to_string(),
                base_year: "N/A".to_string(),
                retention_year: "N/A".to_string(),
                rate: "N/A".to_string(),
                reg_rate: "N/A".to_string(),
                non_reg_rate: "N/A".to_string(),
            },
        ];
        let block = kpi_block(&cards);

        assert!(block.contains("Retention Overview"));
        assert!(block.contains("Chicago"));
        assert!(block.contains("Base Year:              2022-23 School Year"));
        assert!(block.contains("Retention Rate:         81.23%"));
        assert!(block.contains("Retention Rate Reg:     90.00%"));
        assert!(block.contains("Cleveland"));
        assert!(block.contains("Retention Rate:         N/A"));
    }
}
