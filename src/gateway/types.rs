use serde::{Deserialize, Serialize, Serializer};

/// Canonical transaction status as observed from the payment terminal.
///
/// The gateway's `unknown` folds into `Started`: it means the terminal has
/// not reached an outcome yet, which is indistinguishable from a freshly
/// started transaction as far as the POS caller is concerned. Anything
/// outside the known set is carried verbatim so an unexpected gateway answer
/// surfaces in logs and the ledger instead of aborting the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Started,
    Success,
    Failed,
    Timeout,
    Other(String),
}

impl TerminalStatus {
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "started" | "unknown" => TerminalStatus::Started,
            "success" => TerminalStatus::Success,
            "failed" => TerminalStatus::Failed,
            "timeout" => TerminalStatus::Timeout,
            other => TerminalStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TerminalStatus::Started => "started",
            TerminalStatus::Success => "success",
            TerminalStatus::Failed => "failed",
            TerminalStatus::Timeout => "timeout",
            TerminalStatus::Other(raw) => raw,
        }
    }

    /// Whether the terminal has reached a final outcome and polling can stop.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TerminalStatus::Success | TerminalStatus::Failed | TerminalStatus::Timeout
        )
    }
}

impl std::fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TerminalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized payment outcome handed back to callers and to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub status: TerminalStatus,
    pub error_message: Option<String>,
    pub receipt: Option<String>,
}

/// Reply to a start-transaction call.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayStartReply {
    #[serde(alias = "transactionId")]
    pub transaction_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw status-check reply.
///
/// The gateway has been observed answering the same status call in three
/// incompatible shapes: a nested `transaction` object carrying the payment
/// state, a slimmer `data` envelope carrying only a status, and legacy flat
/// top-level fields. All three are decoded here; precedence between them is
/// applied in [`super::normalize`], not by field-lookup accident.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatusReply {
    #[serde(default)]
    pub transaction: Option<NestedTransaction>,
    #[serde(default)]
    pub data: Option<NestedData>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "errorMsg")]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedTransaction {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "errorMsg")]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedData {
    #[serde(default)]
    pub status: Option<String>,
}
