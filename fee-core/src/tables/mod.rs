//! Static reference data: architectural price tables and structural
//! construction types.

pub mod architectural;
pub mod price_table;
pub mod structural;

pub use architectural::{DEVELOPMENT_PLANS, NEW_BUILDINGS};
pub use price_table::{PriceCategory, PriceTable, PriceTableError, RateTier, Resolution};
pub use structural::{
    ConstructionTableError, ConstructionType, ConstructionTypeTable, STRUCTURAL_CURRENCY,
    StructuralPricing,
};
