use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use super::model::SalesRecord;

/// How many products the top-products chart shows.
pub const TOP_PRODUCTS: usize = 10;

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// The four headline numbers of the overview page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryMetrics {
    pub total_sales: f64,
    /// Distinct order identifiers.
    pub order_count: usize,
    /// `total_sales / order_count`, or 0 when there are no orders.
    pub average_order_value: f64,
    pub units_sold: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: f64,
}

/// Monthly bucket keyed by the first day of the month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySales {
    pub month: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySales {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRegionSales {
    pub payment_method: String,
    pub region: String,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

impl SummaryMetrics {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Self {
        let mut total_sales = 0.0;
        let mut units_sold: i64 = 0;
        let mut orders: HashSet<&str> = HashSet::new();

        for rec in records {
            total_sales += rec.total;
            units_sold = units_sold.saturating_add(rec.quantity);
            orders.insert(rec.order_id.as_str());
        }

        let order_count = orders.len();
        let average_order_value = if order_count > 0 {
            total_sales / order_count as f64
        } else {
            0.0
        };

        SummaryMetrics {
            total_sales,
            order_count,
            average_order_value,
            units_sold,
        }
    }
}

/// Total sales per order date, ascending. Records without a date are skipped.
pub fn sales_trend<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Vec<DailySales> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for rec in records {
        if let Some(date) = rec.order_date {
            *by_date.entry(date).or_default() += rec.total;
        }
    }
    by_date
        .into_iter()
        .map(|(date, total)| DailySales { date, total })
        .collect()
}

/// Total sales per calendar month, ascending. Records without a date are skipped.
pub fn monthly_sales<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for rec in records {
        if let Some(date) = rec.order_date {
            *by_month.entry((date.year(), date.month())).or_default() += rec.total;
        }
    }
    by_month
        .into_iter()
        .filter_map(|((year, month), total)| {
            NaiveDate::from_ymd_opt(year, month, 1).map(|month| MonthlySales { month, total })
        })
        .collect()
}

/// The `n` products with the highest total sales, descending.
/// Equal totals keep the order in which the products first appear.
pub fn top_products<'a>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
    n: usize,
) -> Vec<ProductSales> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<ProductSales> = Vec::new();

    for rec in records {
        let slot = *position.entry(rec.product.as_str()).or_insert_with(|| {
            totals.push(ProductSales {
                product: rec.product.clone(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].total += rec.total;
    }

    // `sort_by` is stable, which gives the first-seen tie break.
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(n);
    totals
}

/// Total sales per category present in the records, ordered by name.
pub fn sales_by_category<'a>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
) -> Vec<CategorySales> {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in records {
        *by_category.entry(rec.category.as_str()).or_default() += rec.total;
    }
    by_category
        .into_iter()
        .map(|(category, total)| CategorySales {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// Total sales per (payment method, region), ordered by payment then region.
pub fn sales_by_payment_region<'a>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
) -> Vec<PaymentRegionSales> {
    let mut by_pair: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for rec in records {
        *by_pair
            .entry((rec.payment_method.as_str(), rec.region.as_str()))
            .or_default() += rec.total;
    }
    by_pair
        .into_iter()
        .map(|((payment, region), total)| PaymentRegionSales {
            payment_method: payment.to_string(),
            region: region.to_string(),
            total,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AggregateResult – everything the overview page displays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub summary: SummaryMetrics,
    pub trend: Vec<DailySales>,
    pub monthly: Vec<MonthlySales>,
    pub top_products: Vec<ProductSales>,
    pub categories: Vec<CategorySales>,
    pub payment_region: Vec<PaymentRegionSales>,
}

impl AggregateResult {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Self {
        let rows: Vec<&SalesRecord> = records.into_iter().collect();
        AggregateResult {
            summary: SummaryMetrics::compute(rows.iter().copied()),
            trend: sales_trend(rows.iter().copied()),
            monthly: monthly_sales(rows.iter().copied()),
            top_products: top_products(rows.iter().copied(), TOP_PRODUCTS),
            categories: sales_by_category(rows.iter().copied()),
            payment_region: sales_by_payment_region(rows.iter().copied()),
        }
    }
}
