use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, MAX_AMOUNT, amount_units, format_brl, parse_cents};

/// Opaque identifier. Freshly created transactions get a UUID v4; ids read
/// back from storage are kept as-is.
pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Some(TransactionType::Income),
            "expense" | "despesa" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    /// Sign applied to the amount when folding into a balance.
    pub fn sign(&self) -> Cents {
        match self {
            TransactionType::Income => 1,
            TransactionType::Expense => -1,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of categories. The serialized value is the pt-BR label used by
/// the stored ledger format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Moradia")]
    Housing,
    #[serde(rename = "Alimentação")]
    Food,
    #[serde(rename = "Transporte")]
    Transport,
    #[serde(rename = "Saúde")]
    Health,
    #[serde(rename = "Educação")]
    Education,
    #[serde(rename = "Lazer")]
    Leisure,
    #[serde(rename = "Salário")]
    Salary,
    #[serde(rename = "Investimento")]
    Investment,
    #[serde(rename = "Outros")]
    Others,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Housing,
        Category::Food,
        Category::Transport,
        Category::Health,
        Category::Education,
        Category::Leisure,
        Category::Salary,
        Category::Investment,
        Category::Others,
    ];

    /// Stable English key, used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Housing => "housing",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Health => "health",
            Category::Education => "education",
            Category::Leisure => "leisure",
            Category::Salary => "salary",
            Category::Investment => "investment",
            Category::Others => "others",
        }
    }

    /// Display label, identical to the stored value.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Housing => "Moradia",
            Category::Food => "Alimentação",
            Category::Transport => "Transporte",
            Category::Health => "Saúde",
            Category::Education => "Educação",
            Category::Leisure => "Lazer",
            Category::Salary => "Salário",
            Category::Investment => "Investimento",
            Category::Others => "Outros",
        }
    }

    /// Accepts either the English key or the label, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == needle || c.label().to_lowercase() == needle)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single income or expense entry. Immutable once recorded; the only
/// lifecycle event after creation is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    /// Amount in cents, never negative. The direction lives in `transaction_type`.
    #[serde(with = "amount_units")]
    pub amount: Cents,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Category,
    pub date: NaiveDate,
}

impl Transaction {
    /// Signed contribution to the balance.
    pub fn signed_amount(&self) -> Cents {
        self.transaction_type.sign() * self.amount
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// Validated user input for a new transaction.
///
/// Fields are private: the only way to obtain one is through
/// [`NewTransaction::new`] or [`NewTransaction::parse`], so the ledger store
/// never sees an empty description or a non-positive amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    description: String,
    amount: Cents,
    transaction_type: TransactionType,
    category: Category,
    date: Option<NaiveDate>,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: Cents,
        transaction_type: TransactionType,
        category: Category,
    ) -> Result<Self, InputError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(InputError::EmptyDescription);
        }
        if amount <= 0 {
            return Err(InputError::NonPositiveAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(InputError::AmountTooLarge(amount));
        }

        Ok(Self {
            description,
            amount,
            transaction_type,
            category,
            date: None,
        })
    }

    /// Validate raw form fields. `date` defaults to today when omitted.
    pub fn parse(
        description: &str,
        amount: &str,
        transaction_type: &str,
        category: &str,
        date: Option<&str>,
    ) -> Result<Self, InputError> {
        if description.trim().is_empty() {
            return Err(InputError::EmptyDescription);
        }
        let amount =
            parse_cents(amount).map_err(|_| InputError::InvalidAmount(amount.to_string()))?;
        let transaction_type = TransactionType::from_str(transaction_type)
            .ok_or_else(|| InputError::UnknownTransactionType(transaction_type.to_string()))?;
        let category = Category::from_str(category)
            .ok_or_else(|| InputError::UnknownCategory(category.to_string()))?;

        let draft = Self::new(description, amount, transaction_type, category)?;
        match date {
            Some(raw) => Ok(draft.with_date(parse_date(raw)?)),
            None => Ok(draft),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Turn the draft into a ledger entry with a fresh id, dated `today`
    /// unless an explicit date was given.
    pub fn into_transaction(self, today: NaiveDate) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            description: self.description,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category,
            date: self.date.unwrap_or(today),
        }
    }
}

/// Today's calendar date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an ISO 8601 calendar date (YYYY-MM-DD).
pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(s.to_string()))
}

/// Rejected form input. None of these reach the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    EmptyDescription,
    InvalidAmount(String),
    NonPositiveAmount(Cents),
    AmountTooLarge(Cents),
    InvalidDate(String),
    UnknownTransactionType(String),
    UnknownCategory(String),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::EmptyDescription => write!(f, "description must not be empty"),
            InputError::InvalidAmount(raw) => {
                write!(f, "invalid amount '{}', use '50.00' or '50'", raw)
            }
            InputError::NonPositiveAmount(cents) => {
                write!(f, "amount must be positive (got {} cents)", cents)
            }
            InputError::AmountTooLarge(cents) => write!(
                f,
                "amount {} exceeds the limit of {}",
                format_brl(*cents),
                format_brl(MAX_AMOUNT)
            ),
            InputError::InvalidDate(raw) => {
                write!(f, "invalid date '{}', use YYYY-MM-DD", raw)
            }
            InputError::UnknownTransactionType(raw) => {
                write!(f, "unknown transaction type '{}', use income or expense", raw)
            }
            InputError::UnknownCategory(raw) => write!(f, "unknown category '{}'", raw),
        }
    }
}

impl std::error::Error for InputError {}
