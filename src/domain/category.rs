use serde::{Deserialize, Serialize};

/// Closed set of labels for what a transaction was for.
///
/// Month files spell categories with their Japanese label (`cat = "食費"`);
/// the command line and CSV output use the ASCII key (`food`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "家賃")]
    Rent,
    #[serde(rename = "保険")]
    Insurance,
    #[serde(rename = "光熱費")]
    Utilities,
    #[serde(rename = "通信費")]
    Communications,
    #[serde(rename = "食費")]
    Food,
    #[serde(rename = "日用品費")]
    DailyGoods,
    #[serde(rename = "交通費")]
    Transport,
    #[serde(rename = "医療費")]
    Medical,
    #[serde(rename = "娯楽費")]
    Entertainment,
    #[serde(rename = "教育費")]
    Education,
    #[serde(rename = "家電")]
    Appliances,
    #[serde(rename = "手数料")]
    Fees,
    #[serde(rename = "給与")]
    Salary,
    #[serde(rename = "売却")]
    AssetSale,
    #[serde(rename = "利子")]
    Interest,
    #[serde(rename = "ポイント交換")]
    PointConversion,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Rent,
        Category::Insurance,
        Category::Utilities,
        Category::Communications,
        Category::Food,
        Category::DailyGoods,
        Category::Transport,
        Category::Medical,
        Category::Entertainment,
        Category::Education,
        Category::Appliances,
        Category::Fees,
        Category::Salary,
        Category::AssetSale,
        Category::Interest,
        Category::PointConversion,
    ];

    /// Label as written in month files.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Rent => "家賃",
            Category::Insurance => "保険",
            Category::Utilities => "光熱費",
            Category::Communications => "通信費",
            Category::Food => "食費",
            Category::DailyGoods => "日用品費",
            Category::Transport => "交通費",
            Category::Medical => "医療費",
            Category::Entertainment => "娯楽費",
            Category::Education => "教育費",
            Category::Appliances => "家電",
            Category::Fees => "手数料",
            Category::Salary => "給与",
            Category::AssetSale => "売却",
            Category::Interest => "利子",
            Category::PointConversion => "ポイント交換",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Rent => "rent",
            Category::Insurance => "insurance",
            Category::Utilities => "utilities",
            Category::Communications => "communications",
            Category::Food => "food",
            Category::DailyGoods => "daily-goods",
            Category::Transport => "transport",
            Category::Medical => "medical",
            Category::Entertainment => "entertainment",
            Category::Education => "education",
            Category::Appliances => "appliances",
            Category::Fees => "fees",
            Category::Salary => "salary",
            Category::AssetSale => "asset-sale",
            Category::Interest => "interest",
            Category::PointConversion => "point-conversion",
        }
    }

    /// Look up a category by ASCII key (case-insensitive) or Japanese label.
    pub fn lookup(s: &str) -> Option<Self> {
        let s = s.trim();
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == lowered || c.label() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("unknown category '{}'", s))
    }
}
