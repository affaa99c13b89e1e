use super::order::OrderPayloadModel;

/// request of invoice creation sent to external payment processor,
/// independent of any specific processor's wire format
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceCreateReqModel {
    pub amount: u64,
    pub currency: u16,
    pub reference: String,
    pub destination: String,
    pub comment: String,
}

impl From<&OrderPayloadModel> for InvoiceCreateReqModel {
    fn from(value: &OrderPayloadModel) -> Self {
        Self {
            amount: value.form.amount,
            currency: value.form.currency,
            reference: value.reference.clone(),
            destination: format!("Оплата замовлення №{}", value.reference),
            comment: value.form.buyer.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceEventStatus {
    Success,
    // terminal failure, label kept for logging
    Failure(String),
    Other(String),
}

impl From<&str> for InvoiceEventStatus {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "success" | "paid" => Self::Success,
            "failure" | "expired" | "reversed" | "refund" | "refunded" | "canceled" => {
                Self::Failure(normalized)
            }
            _others => Self::Other(normalized),
        }
    }
}

/// Processor response kept as-is, the caller decides which status codes
/// count as success.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorRawRespModel {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl ProcessorRawRespModel {
    /// body which is not valid JSON is kept as raw text
    pub fn from_raw(status_code: u16, raw: &[u8]) -> Self {
        let body = serde_json::from_slice::<serde_json::Value>(raw).unwrap_or_else(|_e| {
            let text = String::from_utf8_lossy(raw).to_string();
            serde_json::json!({"text": text})
        });
        Self { status_code, body }
    }

    pub fn str_field(&self, name: &str) -> Option<String> {
        self.body
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.body.get(name).and_then(|v| v.as_u64())
    }
}
