use std::collections::HashSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

pub const COL_ORDER_DATE: &str = "Tanggal_Pesanan";
pub const COL_REGION: &str = "Wilayah";
pub const COL_CATEGORY: &str = "Kategori";
pub const COL_PRODUCT: &str = "Produk";
pub const COL_QUANTITY: &str = "Jumlah";
pub const COL_TOTAL: &str = "Total_Penjualan";
pub const COL_ORDER_ID: &str = "OrderID";
pub const COL_PAYMENT: &str = "Metode_Pembayaran";

/// Every column a sales table must carry, in the order the loader reads
/// cells for one record.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_ORDER_ID,
    COL_ORDER_DATE,
    COL_REGION,
    COL_CATEGORY,
    COL_PRODUCT,
    COL_QUANTITY,
    COL_TOTAL,
    COL_PAYMENT,
];

// ---------------------------------------------------------------------------
// SalesRecord – one row of the sales table
// ---------------------------------------------------------------------------

/// A single order line item.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub order_id: String,
    /// `None` when the source value could not be parsed as a date.
    pub order_date: Option<NaiveDate>,
    pub region: String,
    pub category: String,
    pub product: String,
    pub quantity: i64,
    pub total: f64,
    pub payment_method: String,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed option lists and date bounds.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All records, in source order.
    pub records: Vec<SalesRecord>,
    /// Distinct regions in first-seen order.
    pub regions: Vec<String>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
    /// Distinct payment methods in first-seen order.
    pub payment_methods: Vec<String>,
    /// Earliest and latest parseable order date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Rows whose order date failed to parse.
    pub unparsed_dates: usize,
}

impl SalesDataset {
    /// Build the option lists and date bounds from the loaded records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut regions = Vec::new();
        let mut categories = Vec::new();
        let mut seen_regions = HashSet::new();
        let mut seen_categories = HashSet::new();
        let mut payment_methods = Vec::new();
        let mut seen_payments = HashSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;
        let mut unparsed_dates = 0;

        for rec in &records {
            if seen_regions.insert(rec.region.as_str()) {
                regions.push(rec.region.clone());
            }
            if seen_categories.insert(rec.category.as_str()) {
                categories.push(rec.category.clone());
            }
            if seen_payments.insert(rec.payment_method.as_str()) {
                payment_methods.push(rec.payment_method.clone());
            }
            match rec.order_date {
                Some(d) => {
                    date_bounds = Some(match date_bounds {
                        Some((lo, hi)) => (lo.min(d), hi.max(d)),
                        None => (d, d),
                    });
                }
                None => unparsed_dates += 1,
            }
        }

        SalesDataset {
            records,
            regions,
            categories,
            payment_methods,
            date_bounds,
            unparsed_dates,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        order_id: &str,
        date: Option<(i32, u32, u32)>,
        region: &str,
        category: &str,
        product: &str,
        quantity: i64,
        total: f64,
        payment: &str,
    ) -> SalesRecord {
        SalesRecord {
            order_id: order_id.to_string(),
            order_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            region: region.to_string(),
            category: category.to_string(),
            product: product.to_string(),
            quantity,
            total,
            payment_method: payment.to_string(),
        }
    }

    #[test]
    fn from_records_collects_options_in_first_seen_order() {
        let ds = SalesDataset::from_records(vec![
            record("1", Some((2024, 3, 1)), "Timur", "Fashion", "Kaos", 1, 10.0, "card"),
            record("2", Some((2024, 1, 5)), "Barat", "Elektronik", "TV", 1, 10.0, "cash"),
            record("3", None, "Timur", "Fashion", "Topi", 1, 10.0, "cash"),
        ]);

        assert_eq!(ds.regions, vec!["Timur", "Barat"]);
        assert_eq!(ds.categories, vec!["Fashion", "Elektronik"]);
        assert_eq!(ds.payment_methods, vec!["card", "cash"]);
        assert_eq!(
            ds.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            ))
        );
        assert_eq!(ds.unparsed_dates, 1);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = SalesDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.date_bounds.is_none());
    }
}
