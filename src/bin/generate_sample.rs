use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// One CSV row, with the column names the dashboard expects.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "OrderID")]
    order_id: String,
    #[serde(rename = "Tanggal_Pesanan")]
    order_date: String,
    #[serde(rename = "Wilayah")]
    region: &'static str,
    #[serde(rename = "Kategori")]
    category: &'static str,
    #[serde(rename = "Produk")]
    product: &'static str,
    #[serde(rename = "Jumlah")]
    quantity: u32,
    #[serde(rename = "Harga_Satuan")]
    unit_price: f64,
    #[serde(rename = "Total_Penjualan")]
    total: f64,
    #[serde(rename = "Metode_Pembayaran")]
    payment: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

const REGIONS: [&str; 5] = ["Jakarta", "Bandung", "Surabaya", "Medan", "Makassar"];
const PAYMENTS: [&str; 4] = ["Kartu Kredit", "Transfer Bank", "E-Wallet", "Tunai"];

/// (category, [(product, unit price)])
const CATALOG: [(&str, [(&str, f64); 3]); 4] = [
    (
        "Elektronik",
        [
            ("Laptop", 8_500_000.0),
            ("Smartphone", 3_200_000.0),
            ("Headphone", 450_000.0),
        ],
    ),
    (
        "Fashion",
        [
            ("Kemeja", 180_000.0),
            ("Sepatu", 420_000.0),
            ("Tas", 350_000.0),
        ],
    ),
    (
        "Rumah Tangga",
        [
            ("Blender", 550_000.0),
            ("Panci", 210_000.0),
            ("Lampu", 85_000.0),
        ],
    ),
    (
        "Olahraga",
        [
            ("Raket", 300_000.0),
            ("Bola", 150_000.0),
            ("Matras Yoga", 200_000.0),
        ],
    ),
];

const ORDERS: u32 = 1500;

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("start date")?;
    let days = 366;

    let mut rows = Vec::new();
    for order in 0..ORDERS {
        // Later orders skew towards later dates, giving the trend a slope.
        let t = (rng.next_f64() + f64::from(order) / f64::from(ORDERS)) / 2.0;
        let date = start + Days::new((t * f64::from(days)) as u64);
        let region = *rng.pick(&REGIONS);
        let payment = *rng.pick(&PAYMENTS);

        let line_items = 1 + rng.below(3);
        for _ in 0..line_items {
            let (category, products) = *rng.pick(&CATALOG);
            let (product, price) = *rng.pick(&products);
            let quantity = 1 + rng.below(4) as u32;

            // A handful of rows carry a broken date to exercise the loader.
            let order_date = if rng.below(200) == 0 {
                "N/A".to_string()
            } else {
                date.format("%Y-%m-%d").to_string()
            };

            rows.push(Row {
                order_id: format!("ORD-{:05}", order + 1),
                order_date,
                region,
                category,
                product,
                quantity,
                unit_price: price,
                total: price * f64::from(quantity),
                payment,
            });
        }
    }

    fs::create_dir_all("data").context("creating data/")?;
    let data_path = "data/data_dummy_retail_store.csv";
    let mut writer = csv::Writer::from_path(data_path).context("creating CSV")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;

    // Least-squares line through the monthly totals: total ≈ a + b·month_index.
    let mut monthly: BTreeMap<i64, f64> = BTreeMap::new();
    for row in &rows {
        if let Ok(date) = NaiveDate::parse_from_str(&row.order_date, "%Y-%m-%d") {
            *monthly.entry(month_ordinal(date)).or_default() += row.total;
        }
    }
    let base = monthly.keys().next().copied().unwrap_or_else(|| month_ordinal(start));
    let points: Vec<(f64, f64)> = monthly
        .iter()
        .map(|(&m, &total)| ((m - base) as f64, total))
        .collect();
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let artifact = serde_json::json!({
        "model": { "intercept": intercept, "coefficients": [slope] },
        "features": ["month_index"],
        "base_month_ordinal": base,
    });

    fs::create_dir_all("models").context("creating models/")?;
    let model_path = "models/model_sales.json";
    fs::write(model_path, serde_json::to_string_pretty(&artifact)?).context("writing model")?;

    println!(
        "Wrote {} rows ({ORDERS} orders) to {data_path} and a {}-month model to {model_path}",
        rows.len(),
        points.len()
    );
    Ok(())
}
