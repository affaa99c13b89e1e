use serde::{Deserialize, Serialize};
use serde_json::Value as JsnVal;

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ProductItemReqDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub number_of_items: Option<i64>,
    #[serde(default)]
    pub price_with_discount: Option<i64>,
}

// every field is optional at the deserialisation stage, so that absent
// fields are reported along with other field errors in one response
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct CreateInvoiceReqDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub full_amount: Option<i64>,
    #[serde(default)]
    pub ccy: Option<i64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub telegram_name: Option<String>,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub payment_option: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<ProductItemReqDto>>,
    #[serde(default)]
    pub promocode: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum FieldErrorReason {
    Required,
    Empty,
    TooShort,
    TooLong,
    BelowMinimum,
    OutOfRange,
    InvalidChoice,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ProductItemErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_items: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_with_discount: Option<FieldErrorReason>,
}

impl ProductItemErrorDto {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.article.is_none()
            && self.number_of_items.is_none()
            && self.price_with_discount.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ProductsErrorDto {
    List(FieldErrorReason),
    // indexed by position in the request, `None` for valid items
    Items(Vec<Option<ProductItemErrorDto>>),
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CreateInvoiceErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_amount: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccy: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_name: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_option: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<ProductsErrorDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promocode: Option<FieldErrorReason>,
}

impl CreateInvoiceErrorDto {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInvoiceRespDto {
    pub invoice_id: String,
    pub page_url: String,
    pub reference: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvoiceStatusRespDto {
    pub invoice_id: String,
    pub status: String,
    pub amount: Option<u64>,
    pub currency: Option<u16>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GatewayErrorDto {
    pub detail: String,
    pub processor: JsnVal,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DetailDto {
    pub detail: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookAckDto {
    pub ok: bool,
}

/// invoice status payload sent by the payment processor, only the
/// fields this service reacts to are declared.
///
/// `invoiceId` and `status` are typed strictly, the rest is kept as raw
/// JSON and read leniently, a field of unexpected type must not drop the
/// whole event.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWebhookReqDto {
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<JsnVal>,
    #[serde(default)]
    pub ccy: Option<JsnVal>,
    #[serde(default)]
    pub reference: Option<JsnVal>,
    #[serde(default)]
    pub products: Option<JsnVal>,
}

// accepts JSON number or numeric string
fn lenient_u64(raw: Option<&JsnVal>) -> Option<u64> {
    match raw? {
        JsnVal::Number(n) => n.as_u64(),
        JsnVal::String(s) => s.trim().parse::<u64>().ok(),
        _others => None,
    }
}

impl InvoiceWebhookReqDto {
    pub fn amount_minor(&self) -> Option<u64> {
        lenient_u64(self.amount.as_ref())
    }

    pub fn currency(&self) -> Option<u16> {
        lenient_u64(self.ccy.as_ref()).and_then(|v| u16::try_from(v).ok())
    }

    pub fn reference_str(&self) -> Option<&str> {
        self.reference.as_ref().and_then(JsnVal::as_str)
    }

    pub fn product_items(&self) -> &[JsnVal] {
        match self.products.as_ref() {
            Some(JsnVal::Array(items)) => items.as_slice(),
            _others => &[],
        }
    }
}
