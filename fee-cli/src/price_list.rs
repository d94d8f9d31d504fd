//! Plain-text listings of the price tables.

use std::fmt::{self, Write};

use fee_core::calculations::common::{format_amount, format_quantity};
use fee_core::tables::{
    ConstructionTypeTable, DEVELOPMENT_PLANS, NEW_BUILDINGS, PriceCategory, PriceTable,
    STRUCTURAL_CURRENCY, StructuralPricing,
};
use fee_core::{BuildingType, Currency, DesignerType, PlanType};

/// Architectural tables: new buildings, development plans and hourly rates.
pub fn architectural() -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_table(&mut out, &NEW_BUILDINGS, |k: BuildingType| k.name())?;
    writeln!(out)?;
    write_table(&mut out, &DEVELOPMENT_PLANS, |k: PlanType| k.name())?;
    writeln!(out)?;
    writeln!(out, "Часова ставка ({}/ч.)", Currency::Bgn.symbol())?;
    for designer in DesignerType::ALL {
        writeln!(out, "  {:<32} {:>10}", designer.name(), format_amount(designer.hourly_rate()))?;
    }
    Ok(out)
}

fn write_table<K, const N: usize>(
    out: &mut String,
    table: &PriceTable<K, N>,
    name: impl Fn(K) -> &'static str,
) -> fmt::Result
where
    K: Copy + Eq + fmt::Debug,
{
    let symbol = table.currency.symbol();
    writeln!(out, "{} ({symbol}, за {})", table.title, table.unit)?;
    for (key, category) in table.categories() {
        writeln!(out, "{}", name(key))?;
        write_header(out, &table.column_labels)?;
        write_category(out, category, table.unit)?;
    }
    Ok(())
}

fn write_header<const N: usize>(
    out: &mut String,
    labels: &[&str; N],
) -> fmt::Result {
    write!(out, "  {:<18}", "")?;
    for label in labels {
        write!(out, " {:>24}", label)?;
    }
    writeln!(out)
}

fn write_category<const N: usize>(
    out: &mut String,
    category: &PriceCategory<N>,
    unit: &str,
) -> fmt::Result {
    let mut write_row = |label: String, values: &[rust_decimal::Decimal; N]| -> fmt::Result {
        write!(out, "  {label:<18}")?;
        for value in values {
            write!(out, " {:>24}", format_amount(*value))?;
        }
        writeln!(out)
    };

    write_row(
        format!("до {} {unit} (мин.)", format_quantity(category.min_threshold)),
        &category.min_fees,
    )?;
    for tier in &category.tiers {
        let label = match tier.up_to {
            Some(bound) => format!("до {} {unit}", format_quantity(bound)),
            None => "над".to_string(),
        };
        write_row(label, &tier.rates)?;
    }
    Ok(())
}

/// One line per construction type with its pricing rule.
pub fn structural(types: &ConstructionTypeTable) -> Result<String, fmt::Error> {
    let symbol = STRUCTURAL_CURRENCY.symbol();
    let mut out = String::new();
    writeln!(out, "Конструкции ({symbol})")?;
    for ty in types.types() {
        let rule = match &ty.pricing {
            StructuralPricing::Fixed { fee } => format!("{} {symbol} фиксирано", format_amount(*fee)),
            StructuralPricing::PerSquareMetre {
                rate,
                min_area,
                max_area,
            } => {
                let mut rule = format!("{} {symbol}/м²", format_amount(*rate));
                if let Some(min) = min_area {
                    write!(rule, ", мин. {} м²", format_quantity(*min))?;
                }
                if let Some(max) = max_area {
                    write!(rule, ", макс. {} м²", format_quantity(*max))?;
                }
                rule
            }
            StructuralPricing::RetainingWall {
                section_fee,
                per_metre,
            } => format!(
                "{} {symbol}/секция + {} {symbol}/м",
                format_amount(*section_fee),
                format_amount(*per_metre)
            ),
        };
        writeln!(out, "  {:<8} {:<48} {rule}", ty.code.as_str(), ty.name)?;
    }
    Ok(out)
}
