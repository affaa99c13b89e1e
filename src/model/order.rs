use serde::{Deserialize, Serialize};

use super::ReferenceCodeModel;
use crate::api::web::dto::{
    CreateInvoiceErrorDto, CreateInvoiceReqDto, FieldErrorReason, InvoiceWebhookReqDto,
    ProductItemErrorDto, ProductItemReqDto, ProductsErrorDto,
};

/// ISO-4217 numeric code of Ukrainian hryvnia
pub const DEFAULT_CURRENCY: u16 = 980;
pub(crate) const PLACEHOLDER: &str = "-";

struct TextRule {
    required: bool,
    min: usize,
    max: usize,
}

const RULE_NAME: TextRule = TextRule { required: true, min: 1, max: 128 };
const RULE_PHONE: TextRule = TextRule { required: true, min: 10, max: 20 };
const RULE_TELEGRAM: TextRule = TextRule { required: false, min: 0, max: 64 };
const RULE_SETTLEMENT: TextRule = TextRule { required: false, min: 0, max: 128 };
const RULE_WAREHOUSE: TextRule = TextRule { required: false, min: 0, max: 64 };
const RULE_COMMENT: TextRule = TextRule { required: false, min: 0, max: 512 };
const RULE_PROMOCODE: TextRule = TextRule { required: false, min: 0, max: 64 };
const RULE_PRODUCT_NAME: TextRule = TextRule { required: true, min: 1, max: 255 };
const RULE_ARTICLE: TextRule = TextRule { required: true, min: 1, max: 100 };

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerModel {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub telegram_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DeliveryModel {
    Pickup,
    CarrierDelivery { settlement: String, warehouse: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOptionModel {
    Full,
    Partial,
}

impl PaymentOptionModel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Partial => "Partial",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineModel {
    pub name: String,
    pub article: String,
    pub quantity: u32,
    // minor units of the order currency
    pub unit_price: u64,
}

/// validated order form submitted by the buyer, before any reference
/// code is reserved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderFormModel {
    pub buyer: BuyerModel,
    pub delivery: DeliveryModel,
    pub comment: Option<String>,
    pub amount: u64,
    pub full_amount: u64,
    pub currency: u16,
    pub payment_option: PaymentOptionModel,
    pub lines: Vec<OrderLineModel>,
    pub promocode: Option<String>,
}

/// everything required to notify store admins once the invoice is paid,
/// stored in cache between invoice creation and the processor webhook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderPayloadModel {
    pub form: OrderFormModel,
    pub reference: String,
}

fn check_text(raw: Option<String>, rule: &TextRule) -> Result<Option<String>, FieldErrorReason> {
    match raw.map(|s| s.trim().to_string()) {
        None if rule.required => Err(FieldErrorReason::Required),
        Some(s) if s.is_empty() && rule.required => Err(FieldErrorReason::Empty),
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => {
            let nchars = s.chars().count();
            if nchars < rule.min {
                Err(FieldErrorReason::TooShort)
            } else if nchars > rule.max {
                Err(FieldErrorReason::TooLong)
            } else {
                Ok(Some(s))
            }
        }
    }
}

fn check_positive(raw: Option<i64>) -> Result<u64, FieldErrorReason> {
    let v = raw.ok_or(FieldErrorReason::Required)?;
    if v < 1 {
        Err(FieldErrorReason::BelowMinimum)
    } else {
        Ok(v as u64)
    }
}

fn check_currency(raw: Option<i64>) -> Result<u16, FieldErrorReason> {
    match raw {
        None => Ok(DEFAULT_CURRENCY),
        Some(v) if (1..=999).contains(&v) => Ok(v as u16),
        Some(_) => Err(FieldErrorReason::OutOfRange),
    }
}

#[derive(PartialEq)]
enum DeliveryChoice {
    Pickup,
    Carrier,
}

fn check_delivery_method(raw: Option<&str>) -> Result<DeliveryChoice, FieldErrorReason> {
    match raw.map(str::trim) {
        None | Some("pickup") => Ok(DeliveryChoice::Pickup),
        Some("carrier_delivery") | Some("nova_poshta") => Ok(DeliveryChoice::Carrier),
        Some(_) => Err(FieldErrorReason::InvalidChoice),
    }
}

fn check_payment_option(raw: Option<&str>) -> Result<PaymentOptionModel, FieldErrorReason> {
    match raw.map(str::trim) {
        None | Some("full") => Ok(PaymentOptionModel::Full),
        Some("partial") => Ok(PaymentOptionModel::Partial),
        Some(_) => Err(FieldErrorReason::InvalidChoice),
    }
}

impl TryFrom<ProductItemReqDto> for OrderLineModel {
    type Error = ProductItemErrorDto;

    fn try_from(value: ProductItemReqDto) -> Result<Self, Self::Error> {
        let mut e = ProductItemErrorDto::default();
        let name = check_text(value.name, &RULE_PRODUCT_NAME)
            .map_err(|r| e.name = Some(r))
            .ok()
            .flatten();
        let article = check_text(value.article, &RULE_ARTICLE)
            .map_err(|r| e.article = Some(r))
            .ok()
            .flatten();
        let quantity = check_positive(value.number_of_items)
            .and_then(|v| u32::try_from(v).map_err(|_| FieldErrorReason::OutOfRange))
            .map_err(|r| e.number_of_items = Some(r))
            .ok();
        let unit_price = check_positive(value.price_with_discount)
            .map_err(|r| e.price_with_discount = Some(r))
            .ok();
        if e.is_empty() {
            Ok(Self {
                name: name.unwrap_or_default(),
                article: article.unwrap_or_default(),
                quantity: quantity.unwrap_or_default(),
                unit_price: unit_price.unwrap_or_default(),
            })
        } else {
            Err(e)
        }
    }
}

fn check_products(
    raw: Option<Vec<ProductItemReqDto>>,
) -> Result<Vec<OrderLineModel>, ProductsErrorDto> {
    let items = raw.ok_or(ProductsErrorDto::List(FieldErrorReason::Required))?;
    if items.is_empty() {
        return Err(ProductsErrorDto::List(FieldErrorReason::Empty));
    }
    let results = items
        .into_iter()
        .map(OrderLineModel::try_from)
        .collect::<Vec<_>>();
    if results.iter().any(Result::is_err) {
        let errors = results.into_iter().map(|r| r.err()).collect::<Vec<_>>();
        Err(ProductsErrorDto::Items(errors))
    } else {
        Ok(results.into_iter().filter_map(Result::ok).collect())
    }
}

impl TryFrom<CreateInvoiceReqDto> for OrderFormModel {
    type Error = CreateInvoiceErrorDto;

    fn try_from(value: CreateInvoiceReqDto) -> Result<Self, Self::Error> {
        let CreateInvoiceReqDto {
            name,
            last_name,
            amount,
            full_amount,
            ccy,
            phone,
            telegram_name,
            delivery_method,
            settlement,
            warehouse,
            comment,
            payment_option,
            products,
            promocode,
        } = value;
        let mut e = CreateInvoiceErrorDto::default();
        let first_name = check_text(name, &RULE_NAME)
            .map_err(|r| e.name = Some(r))
            .ok()
            .flatten();
        let last_name = check_text(last_name, &RULE_NAME)
            .map_err(|r| e.last_name = Some(r))
            .ok()
            .flatten();
        let phone = check_text(phone, &RULE_PHONE)
            .map_err(|r| e.phone = Some(r))
            .ok()
            .flatten();
        let telegram_name = check_text(telegram_name, &RULE_TELEGRAM)
            .map_err(|r| e.telegram_name = Some(r))
            .ok()
            .flatten();
        let amount = check_positive(amount)
            .map_err(|r| e.amount = Some(r))
            .ok();
        let full_amount = check_positive(full_amount)
            .map_err(|r| e.full_amount = Some(r))
            .ok();
        let currency = check_currency(ccy).map_err(|r| e.ccy = Some(r)).ok();
        let delivery_choice = check_delivery_method(delivery_method.as_deref())
            .map_err(|r| e.delivery_method = Some(r))
            .ok();
        let settlement = check_text(settlement, &RULE_SETTLEMENT)
            .map_err(|r| e.settlement = Some(r))
            .ok()
            .flatten();
        let warehouse = check_text(warehouse, &RULE_WAREHOUSE)
            .map_err(|r| e.warehouse = Some(r))
            .ok()
            .flatten();
        let comment = check_text(comment, &RULE_COMMENT)
            .map_err(|r| e.comment = Some(r))
            .ok()
            .flatten();
        let payment_option = check_payment_option(payment_option.as_deref())
            .map_err(|r| e.payment_option = Some(r))
            .ok();
        let lines = check_products(products)
            .map_err(|r| e.products = Some(r))
            .ok();
        let promocode = check_text(promocode, &RULE_PROMOCODE)
            .map_err(|r| e.promocode = Some(r))
            .ok()
            .flatten();

        let delivery = match delivery_choice {
            Some(DeliveryChoice::Carrier) => {
                if settlement.is_none() && e.settlement.is_none() {
                    e.settlement = Some(FieldErrorReason::Required);
                }
                if warehouse.is_none() && e.warehouse.is_none() {
                    e.warehouse = Some(FieldErrorReason::Required);
                }
                DeliveryModel::CarrierDelivery {
                    settlement: settlement.unwrap_or_default(),
                    warehouse: warehouse.unwrap_or_default(),
                }
            } // settlement and warehouse are discarded for pickup
            Some(DeliveryChoice::Pickup) | None => DeliveryModel::Pickup,
        };
        if !e.is_empty() {
            return Err(e);
        }
        let buyer = BuyerModel {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            telegram_name,
        };
        Ok(Self {
            buyer,
            delivery,
            comment,
            promocode,
            amount: amount.unwrap_or_default(),
            full_amount: full_amount.unwrap_or_default(),
            currency: currency.unwrap_or(DEFAULT_CURRENCY),
            payment_option: payment_option.unwrap_or(PaymentOptionModel::Full),
            lines: lines.unwrap_or_default(),
        })
    } // end of fn try_from
} // end of impl TryFrom for OrderFormModel

fn degraded_line(raw: &serde_json::Value) -> Option<OrderLineModel> {
    let item = serde_json::from_value::<ProductItemReqDto>(raw.clone()).ok()?;
    let quantity = item
        .number_of_items
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default();
    let unit_price = item
        .price_with_discount
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default();
    Some(OrderLineModel {
        name: item.name.unwrap_or_else(|| PLACEHOLDER.to_string()),
        article: item.article.unwrap_or_default(),
        quantity,
        unit_price,
    })
}

impl OrderPayloadModel {
    pub fn new(form: OrderFormModel, reference: String) -> Self {
        Self { form, reference }
    }

    /// Build placeholder payload from the fields carried by the webhook
    /// itself, used when the cached payload has been consumed or expired.
    pub fn degraded(event: &InvoiceWebhookReqDto) -> Self {
        let amount = event.amount_minor().unwrap_or_default();
        let lines = event
            .product_items()
            .iter()
            .filter_map(degraded_line)
            .collect::<Vec<_>>();
        let buyer = BuyerModel {
            first_name: PLACEHOLDER.to_string(),
            last_name: PLACEHOLDER.to_string(),
            phone: PLACEHOLDER.to_string(),
            telegram_name: None,
        };
        let form = OrderFormModel {
            buyer,
            lines,
            amount,
            full_amount: amount,
            delivery: DeliveryModel::Pickup,
            comment: None,
            currency: event.currency().unwrap_or(DEFAULT_CURRENCY),
            payment_option: PaymentOptionModel::Full,
            promocode: None,
        };
        let reference = Self::webhook_reference(event)
            .map(ReferenceCodeModel::into_string)
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        Self { form, reference }
    }

    /// reference code echoed by the processor, discarded if it is not
    /// a code this service could have generated
    pub fn webhook_reference(event: &InvoiceWebhookReqDto) -> Option<ReferenceCodeModel> {
        event
            .reference_str()
            .and_then(|r| ReferenceCodeModel::try_from(r.trim()).ok())
    }
} // end of impl OrderPayloadModel
