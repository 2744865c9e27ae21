use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or takes from the balance. Each kind is stored in its own remote
/// collection, under its own amount column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(Kind);
serde_plain::derive_fromstr_from_deserialize!(Kind);

impl Kind {
    /// Both kinds, in the order their collections are loaded and concatenated.
    pub const ALL: [Kind; 2] = [Kind::Income, Kind::Expense];

    /// The name of the remote column that holds the amount for this kind.
    pub fn amount_field(&self) -> &'static str {
        match self {
            Kind::Income => "valorEntrada",
            Kind::Expense => "valorSaida",
        }
    }

    /// The sign shown next to amounts of this kind.
    pub fn sign(&self) -> char {
        match self {
            Kind::Income => '+',
            Kind::Expense => '-',
        }
    }
}
